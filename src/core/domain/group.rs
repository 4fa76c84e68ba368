//! Named, ordered collections of targets.

use super::Target;

/// A group of targets processed together in one login run.
///
/// Targets keep the order in which they were declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    name: String,
    targets: Vec<Target>,
}

impl Group {
    pub fn new(name: impl Into<String>, targets: Vec<Target>) -> Self {
        Self {
            name: name.into(),
            targets,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub(crate) fn push(&mut self, target: Target) {
        self.targets.push(target);
    }
}
