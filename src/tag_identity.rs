//! Tag identity of a manifest

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

use crate::errors::{ComidError, ComidResult};

/// Identifier of a manifest tag, either a UUID or a free-form string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagId {
    /// UUID-based tag identifier
    Uuid(Uuid),
    /// String tag identifier
    Str(String),
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagId::Uuid(id) => write!(f, "{id}"),
            TagId::Str(s) => f.write_str(s),
        }
    }
}

impl From<Uuid> for TagId {
    fn from(id: Uuid) -> Self {
        TagId::Uuid(id)
    }
}

impl From<&str> for TagId {
    fn from(s: &str) -> Self {
        match Uuid::parse_str(s) {
            Ok(id) => TagId::Uuid(id),
            Err(_) => TagId::Str(s.to_string()),
        }
    }
}

// Textual form: a plain string, parsed back as a UUID when it is one.
// Binary form: UUIDs as a byte string, other identifiers as text, which
// the codec keeps distinct.
impl Serialize for TagId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            match self {
                TagId::Uuid(id) => id.serialize(serializer),
                TagId::Str(s) => serializer.serialize_str(s),
            }
        }
    }
}

impl<'de> Deserialize<'de> for TagId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TagIdVisitor;

        impl<'de> Visitor<'de> for TagIdVisitor {
            type Value = TagId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a tag identifier string or UUID byte string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(TagId::from(v))
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                let id = Uuid::from_slice(v).map_err(de::Error::custom)?;
                Ok(TagId::Uuid(id))
            }
        }

        deserializer.deserialize_any(TagIdVisitor)
    }
}

/// Identity of a manifest tag: the identifier plus a version counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagIdentity {
    /// The tag identifier
    #[serde(rename = "id")]
    pub tag_id: TagId,
    /// Tag version, starts at zero
    #[serde(rename = "version", default)]
    pub tag_version: u32,
}

impl TagIdentity {
    /// Create a tag identity at version zero
    pub fn new(tag_id: impl Into<TagId>) -> Self {
        Self {
            tag_id: tag_id.into(),
            tag_version: 0,
        }
    }

    /// Set the tag version
    pub fn with_version(mut self, version: u32) -> Self {
        self.tag_version = version;
        self
    }

    /// Check that a string tag identifier is non-empty
    pub fn validate(&self) -> ComidResult<()> {
        if let TagId::Str(s) = &self.tag_id {
            if s.is_empty() {
                return Err(ComidError::InvalidTagIdentity(
                    "empty tag id".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_uuid_strings_parse_as_uuid_tag_ids() {
        let id = TagId::from("31fb5abf-023e-4992-aa4e-95f9c1503bfa");
        assert!(matches!(id, TagId::Uuid(_)));
    }

    #[test]
    fn test_other_strings_stay_strings() {
        let id = TagId::from("example.acme.roadrunner-sw-v1-0-0");
        assert!(matches!(id, TagId::Str(_)));
    }

    #[test]
    fn test_empty_string_tag_id_is_invalid() {
        let identity = TagIdentity::new("x");
        assert!(identity.validate().is_ok());

        let identity = TagIdentity {
            tag_id: TagId::Str(String::new()),
            tag_version: 0,
        };
        assert!(identity.validate().is_err());
    }

    #[test]
    fn test_tag_identity_json_round_trip() {
        let identity = TagIdentity::new("test-tag").with_version(3);
        let json = serde_json::to_string(&identity).unwrap();
        let back: TagIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(identity, back);
    }

    #[test]
    fn test_version_defaults_to_zero_when_absent() {
        let identity: TagIdentity = serde_json::from_str("{\"id\": \"test-tag\"}").unwrap();
        assert_eq!(identity.tag_version, 0);
    }
}
