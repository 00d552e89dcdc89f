//! Error types for manifest validation and codec operations

use thiserror::Error;

/// Errors that can occur while validating or encoding manifest records
#[derive(Debug, Clone, Error)]
pub enum ComidError {
    /// Environment carries neither class nor instance information
    #[error("environment validation failed: no class or instance set")]
    EmptyEnvironment,

    /// Class carries no identifying attribute at all
    #[error("class validation failed: no identifying attributes set")]
    EmptyClass,

    /// Class has an attribute that is present but malformed
    #[error("class validation failed: {0}")]
    InvalidClass(String),

    /// Instance identifier is malformed
    #[error("instance validation failed: {0}")]
    InvalidInstance(String),

    /// The domain environment of a membership triple is invalid
    #[error("domain-id validation failed: {source}")]
    InvalidDomainId {
        /// The underlying environment failure
        source: Box<ComidError>,
    },

    /// A membership triple has an empty member sequence
    #[error("members validation failed: no member environments")]
    NoMemberEnvironments,

    /// A member environment of a membership triple is invalid
    #[error("members validation failed: member at index {index}: {source}")]
    InvalidMember {
        /// Zero-based position of the first invalid member
        index: usize,
        /// The underlying environment failure
        source: Box<ComidError>,
    },

    /// A triple within a membership triple collection is invalid
    #[error("domain membership triple at index {index}: {source}")]
    InvalidTriple {
        /// Zero-based position of the first invalid triple
        index: usize,
        /// The underlying triple failure
        source: Box<ComidError>,
    },

    /// The domain membership triples section of a manifest is invalid
    #[error("domain membership triples validation failed: {source}")]
    InvalidTriplesSection {
        /// The underlying collection failure
        source: Box<ComidError>,
    },

    /// Tag identity is malformed
    #[error("tag identity validation failed: {0}")]
    InvalidTagIdentity(String),

    /// An entity within the manifest's entity list is invalid
    #[error("entity at index {index}: {source}")]
    InvalidEntity {
        /// Zero-based position of the first invalid entity
        index: usize,
        /// The underlying entity failure
        source: Box<ComidError>,
    },

    /// Entity has an empty name
    #[error("entity validation failed: empty entity name")]
    EmptyEntityName,

    /// Entity claims no roles
    #[error("entity validation failed: no roles")]
    NoRoles,

    /// Encoding to the binary or textual form failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Decoding from the binary or textual form failed
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl ComidError {
    /// Wrap this error as the domain-id failure of a membership triple
    pub(crate) fn into_domain_id(self) -> Self {
        ComidError::InvalidDomainId {
            source: Box::new(self),
        }
    }

    /// Wrap this error as a member failure at the given position
    pub(crate) fn into_member(self, index: usize) -> Self {
        ComidError::InvalidMember {
            index,
            source: Box::new(self),
        }
    }

    /// Wrap this error as a collection failure at the given position
    pub(crate) fn into_triple(self, index: usize) -> Self {
        ComidError::InvalidTriple {
            index,
            source: Box::new(self),
        }
    }
}

/// Result type alias for manifest operations
pub type ComidResult<T> = Result<T, ComidError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_failing_phase() {
        let err = ComidError::EmptyEnvironment.into_domain_id();
        assert!(err.to_string().contains("domain-id validation failed"));

        let err = ComidError::NoMemberEnvironments;
        assert!(err.to_string().contains("no member environments"));

        let err = ComidError::EmptyEnvironment.into_member(3);
        assert!(err.to_string().contains("member at index 3"));

        let err = ComidError::NoMemberEnvironments.into_triple(0);
        assert!(err
            .to_string()
            .contains("domain membership triple at index 0"));
    }

    #[test]
    fn test_wrapping_preserves_the_innermost_cause() {
        let err = ComidError::EmptyEnvironment.into_member(0).into_triple(1);
        let text = err.to_string();
        assert!(text.contains("domain membership triple at index 1"));
        assert!(text.contains("member at index 0"));
        assert!(text.contains("no class or instance set"));
    }
}
