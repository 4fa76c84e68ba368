//! kubegate - log in to groups of Kubernetes clusters.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kubegate::cli::output;
use kubegate::cli::{execute, Cli};
use kubegate::error::{ConfigError, Error, LoginError};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("KUBEGATE_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("kubegate=debug")
        } else {
            EnvFilter::new("kubegate=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .init();

    if let Err(e) = execute(cli) {
        let suggestion = match &e {
            Error::Config(ConfigError::NotFound(path)) => Some(format!(
                "create {} or pass --config",
                path.display()
            )),
            Error::Login(LoginError::UnknownGroup(_)) => Some("run: kubegate groups".to_string()),
            Error::Login(LoginError::NoDefaultGroup) => {
                Some("pass --group or set default-group in the config".to_string())
            }
            Error::Login(LoginError::UnsupportedProvider(provider)) => {
                Some(format!("add a [providers.{}] section to the config", provider))
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(&hint);
        }
        std::process::exit(1);
    }
}
