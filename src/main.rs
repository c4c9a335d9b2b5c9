use oauth2_bearer::cli::{self, Command};
use oauth2_bearer::config::Config;
use oauth2_bearer::logging::Logger;
use oauth2_bearer::transport::HttpTransport;
use std::env;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match cli::parse_args(env::args().skip(1)) {
        Command::Version => {
            println!("{}", cli::version_text());
            return Ok(());
        }
        Command::Help => {
            println!("{}", cli::help_text());
            return Ok(());
        }
        Command::Invalid(arg) => {
            eprintln!("{}", cli::invalid_arg_text(&arg));
            std::process::exit(1);
        }
        Command::Serve => {}
    }

    let config = Config::from_env()?;
    let logger = Logger::new(config.log_level);
    logger.debug(&format!("Log level set to: {}", config.log_level));

    let addr = HttpTransport::new(config)
        .start()
        .await
        .map_err(|e| format!("Failed to start HTTP transport: {e}"))?;
    logger.info(&format!("Listening on http://{addr}"));

    wait_for_shutdown(&logger).await?;

    logger.info("Shutting down");
    Ok(())
}

async fn wait_for_shutdown(logger: &Logger) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => logger.info("Received SIGTERM"),
            _ = sigint.recv() => logger.info("Received SIGINT"),
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        logger.info("Received Ctrl+C");
    }

    Ok(())
}
