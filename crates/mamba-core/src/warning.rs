use std::fmt;

/// Non-fatal lifecycle failures.
///
/// Every variant is absorbed by the registry at the point of detection: it is
/// logged at `warn` level and surfaced as an [`Event::ModuleWarning`](crate::event::Event)
/// so callers can react, but no operation ever fails because of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleWarning {
    /// A load was requested with an absent or dangling module reference.
    InvalidModule,
    /// The selected module has no content to instantiate.
    MissingContent { id: String, name: String },
    /// A name or id lookup matched no catalog entry.
    NotFound { key: String },
    /// The content host refused to instantiate the module's content.
    InstantiateFailed { id: String, reason: String },
}

impl fmt::Display for LifecycleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidModule => write!(f, "cannot load an invalid module reference"),
            Self::MissingContent { name, .. } => write!(f, "module {name} has no content assigned"),
            Self::NotFound { key } => write!(f, "module not found: {key}"),
            Self::InstantiateFailed { id, reason } => {
                write!(f, "module {id} failed to instantiate: {reason}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            LifecycleWarning::InvalidModule.to_string(),
            "cannot load an invalid module reference"
        );
        assert_eq!(
            LifecycleWarning::MissingContent { id: "v".into(), name: "Vault".into() }.to_string(),
            "module Vault has no content assigned"
        );
        assert_eq!(
            LifecycleWarning::NotFound { key: "Unknown".into() }.to_string(),
            "module not found: Unknown"
        );
        assert!(LifecycleWarning::InstantiateFailed { id: "a".into(), reason: "boom".into() }
            .to_string()
            .contains("boom"));
    }
}
