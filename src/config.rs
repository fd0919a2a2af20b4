//! Container configuration.

use serde::{Deserialize, Serialize};

/// What [`AnnotationContainer::remove`](crate::AnnotationContainer::remove)
/// does about surviving annotations that point into the removed layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Leave the stale handles in place. They resolve to nothing afterwards.
    #[default]
    Keep,
    /// Fail without removing anything.
    Refuse,
    /// Strip stale handles from survivors. Survivors that lose a mandatory
    /// reference (or drop below their minimum targets) are removed as well.
    Detach,
}

/// Behaviour switches of an [`AnnotationContainer`](crate::AnnotationContainer).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub removal_policy: RemovalPolicy,
}

impl ContainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = policy;
        self
    }
}
