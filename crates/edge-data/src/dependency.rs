//! Dependency tagging for semantic categorization.

/// Well-known categories of outbound collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyTag {
    /// Hosted structured-content database.
    Cms,
    /// Customer-messaging (chat widget) service.
    Messaging,
    /// Error collector.
    ErrorTracking,
}

impl DependencyTag {
    /// Get the name of this dependency.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cms => "cms",
            Self::Messaging => "messaging",
            Self::ErrorTracking => "error-tracking",
        }
    }
}

impl std::fmt::Display for DependencyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
