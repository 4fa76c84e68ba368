//! Login command.

use tracing::debug;

use crate::cli::output;
use crate::core::config::LoginConfig;
use crate::core::login::{login, Event};
use crate::core::resolve::{active_group_label, resolve};
use crate::core::retriever::RetrieverFactory;
use crate::core::sink::Kubeconfig;
use crate::error::Result;

/// Log in to every target of the requested (or default) group.
///
/// Prints one line per target in group order, then fails if any target did.
pub fn execute(mut config: LoginConfig, group: Option<&str>, interactive: bool) -> Result<()> {
    config.interactive = interactive;

    let mut kubeconfig = Kubeconfig::load(&config.kubeconfig)?;
    let resolved = resolve(group, &config)?;

    output::dimmed(&active_group_label(group, config.default_group.as_deref()));
    debug!(interactive, kubeconfig = %kubeconfig.path().display(), "starting login");

    let factory = RetrieverFactory::from_config(&config);
    let outcome = login(resolved, &factory, &mut kubeconfig, |event| match event {
        Event::LoggedIn { target, sink_error } => {
            if let Some(e) = sink_error {
                output::warn(&format!("Failed to update config for {}: {}", target.name, e));
            }
            output::success(&format!("Logged in to: {}", target.display_name()));
        }
        Event::Failed { target, error } => {
            output::error(&format!("Failed to log in to {}: {}", target.name, error));
        }
        // The abort reason is printed once by main.
        Event::Aborted { .. } => {}
    });

    outcome.into_result()?;
    Ok(())
}
