// Module structure for dent-proxy, the user socket to Docker daemon forwarder.

pub mod cli;
pub mod conf;
pub mod error;
pub mod ping;
pub mod relay;
pub mod socat;
pub mod socket;
pub mod stop;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::{Backend, ProxyConfig};
use crate::error::ProxyResult;
use crate::socket::BoundSocket;

/// Initialise the tracing / logging subsystem on stderr.
pub fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "dent_proxy=info",
        1 => "dent_proxy=debug",
        _ => "dent_proxy=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Run the configured backend. The native relay serves until a shutdown
/// signal; the socat backend returns as soon as socat is launched.
pub async fn run(config: &ProxyConfig) -> ProxyResult<()> {
    config.validate()?;
    let mode = config.mode_bits()?;
    let owner = config.owner()?;
    tracing::info!(
        listen = %config.listen.display(),
        target = %config.target.display(),
        backend = ?config.backend,
        "Starting dent-proxy v{}",
        env!("CARGO_PKG_VERSION")
    );

    match config.backend {
        Backend::Native => {
            let bound = BoundSocket::bind(&config.listen, mode, owner).await?;
            relay::serve(
                &bound.listener,
                config.target.clone(),
                config.max_connections,
                stop::shutdown_signal(),
            )
            .await
        }
        Backend::Socat => {
            let pid = socat::spawn(&config.listen, &config.target, mode, owner).await?;
            println!("{}", pid);
            Ok(())
        }
    }
}
