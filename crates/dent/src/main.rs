use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;

use dent::cli::Cli;
use dent::enter;
use dent::error::DentResult;
use dent::runtime::boot;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    boot::init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code.clamp(0, 255) as u8),
        Err(e) => {
            eprintln!("dent: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> DentResult<i32> {
    let mut stdout = std::io::stdout();
    let config_path = cli.config.clone();
    let host = cli.host.clone();

    if cli.list {
        let (_, docker) = boot::boot(config_path.as_deref(), host.as_deref()).await?;
        enter::list(&docker, &mut stdout).await?;
        return Ok(0);
    }

    let cwd = std::env::current_dir().ok();
    let request = cli.into_request(std::io::stdin().is_terminal(), cwd);
    request.validate()?;

    let (config, docker) = boot::boot(config_path.as_deref(), host.as_deref()).await?;
    enter::run(&docker, &request, &config, &mut stdout).await
}
