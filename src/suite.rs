use tracing::warn;

use crate::group::TestGroup;

/// Ordered, caller-owned registry of test groups. No global state: each
/// suite is independent and runs see groups in registration order.
#[derive(Debug, Clone, Default)]
pub struct Suite {
    groups: Vec<TestGroup>,
}

impl Suite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `group`. Identity is the group name; registering a name twice
    /// keeps the first registration and drops the rest.
    pub fn register(&mut self, group: TestGroup) {
        if self.contains(group.name()) {
            warn!(group = group.name(), "already registered, ignoring");
            return;
        }
        self.groups.push(group);
    }

    /// Removes every registration, for reuse between independent runs.
    pub fn clear(&mut self) {
        self.groups.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.iter().any(|group| group.name() == name)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[TestGroup] {
        &self.groups
    }
}
