//! Groups command - list configured groups and their targets.

use crate::cli::output;
use crate::core::config::LoginConfig;
use crate::error::Result;

/// List groups in name order, marking the default.
pub fn execute(config: &LoginConfig) -> Result<()> {
    if config.groups.is_empty() {
        output::dimmed("no groups configured");
        return Ok(());
    }

    for (i, (name, group)) in config.groups.iter().enumerate() {
        if i > 0 {
            println!();
        }
        if config.default_group.as_deref() == Some(name.as_str()) {
            output::header(&format!("{} (default)", name));
        } else {
            output::header(name);
        }
        for target in group.targets() {
            output::list_item(&format!("{} [{}]", target.display_name(), target.provider));
        }
    }

    Ok(())
}
