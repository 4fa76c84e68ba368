//! Group resolution.

use tracing::debug;

use crate::core::config::LoginConfig;
use crate::core::domain::Group;
use crate::error::LoginError;

/// Pick the group for this run.
///
/// An explicitly requested group wins; otherwise the configured default is
/// used.
///
/// # Errors
///
/// `LoginError::UnknownGroup` if the chosen name has no targets,
/// `LoginError::NoDefaultGroup` if nothing was requested and no default is set.
pub fn resolve<'a>(requested: Option<&str>, config: &'a LoginConfig) -> Result<&'a Group, LoginError> {
    let name = match requested {
        Some(name) => name,
        None => config
            .default_group
            .as_deref()
            .ok_or(LoginError::NoDefaultGroup)?,
    };

    let group = config
        .group(name)
        .ok_or_else(|| LoginError::UnknownGroup(name.to_string()))?;

    debug!(group = %group.name(), targets = group.targets().len(), "resolved group");
    Ok(group)
}

/// Line describing which group a run uses.
pub fn active_group_label(requested: Option<&str>, default: Option<&str>) -> String {
    match (requested, default) {
        (Some(group), _) => format!("Active group: {}", group),
        (None, Some(default)) => format!("Active group (default): {}", default),
        (None, None) => "Active group: none".to_string(),
    }
}
