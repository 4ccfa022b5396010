use std::process::ExitCode;

use clap::Parser;

use dent_proxy::cli::Cli;
use dent_proxy::conf::ProxyConfig;
use dent_proxy::error::ProxyResult;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dent_proxy::init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("dent-proxy: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ProxyResult<()> {
    let mut config = ProxyConfig::load()?;
    cli.apply(&mut config);

    if cli.check {
        dent_proxy::ping::ping(&config.target).await?;
        println!("OK");
        return Ok(());
    }

    dent_proxy::run(&config).await
}
