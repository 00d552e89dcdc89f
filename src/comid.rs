//! The manifest tag aggregate
//!
//! A [`Comid`] composes a tag identity, the entities responsible for the
//! tag, and the relationship sections holding the tag's claims. Validation
//! fans out to every present part; encoding covers the whole tree in both
//! a compact binary form and a textual form, and round-trips losslessly.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::{Entities, Entity, Role};
use crate::errors::{ComidError, ComidResult};
use crate::tag_identity::{TagId, TagIdentity};
use crate::triples::{DomainMembershipTriple, Triples};

/// A manifest tag describing one measured module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comid {
    /// Language of the tag's text fields, as a BCP 47 tag
    #[serde(rename = "lang", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Identity of this tag
    #[serde(rename = "tag-identity")]
    pub tag_identity: TagIdentity,
    /// Entities responsible for the tag, if any are named
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<Entities>,
    /// The tag's relationship claims
    pub triples: Triples,
}

impl Comid {
    /// Create a tag with the given identity and no claims
    pub fn new(tag_id: impl Into<TagId>) -> Self {
        Self {
            language: None,
            tag_identity: TagIdentity::new(tag_id),
            entities: None,
            triples: Triples::new(),
        }
    }

    /// Set the language tag
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the tag identity version
    pub fn with_tag_version(mut self, version: u32) -> Self {
        self.tag_identity = self.tag_identity.with_version(version);
        self
    }

    /// Append an entity, creating the entity list if absent
    pub fn add_entity(
        mut self,
        name: impl Into<String>,
        reg_id: Option<&str>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        let mut entity = Entity::new(name);
        if let Some(reg_id) = reg_id {
            entity = entity.with_reg_id(reg_id);
        }
        for role in roles {
            entity = entity.add_role(role);
        }
        self.entities
            .get_or_insert_with(Entities::new)
            .add(entity);
        self
    }

    /// Append a domain membership triple, creating its section if absent
    pub fn add_domain_membership_triple(mut self, triple: DomainMembershipTriple) -> Self {
        self.triples.add_domain_membership_triple(triple);
        self
    }

    /// Validate the whole tag
    ///
    /// Checks the tag identity, then the entity list if present, then
    /// every present relationship section, stopping at the first failure.
    pub fn validate(&self) -> ComidResult<()> {
        self.tag_identity.validate()?;

        if let Some(entities) = &self.entities {
            entities.validate()?;
        }

        self.triples.validate()?;

        Ok(())
    }

    /// Encode to the compact binary form
    pub fn to_cbor(&self) -> ComidResult<Vec<u8>> {
        let bytes =
            serde_cbor::to_vec(self).map_err(|e| ComidError::Serialization(e.to_string()))?;
        debug!(len = bytes.len(), "encoded manifest tag to CBOR");
        Ok(bytes)
    }

    /// Decode from the compact binary form
    pub fn from_cbor(bytes: &[u8]) -> ComidResult<Self> {
        let comid: Self =
            serde_cbor::from_slice(bytes).map_err(|e| ComidError::Deserialization(e.to_string()))?;
        debug!(len = bytes.len(), "decoded manifest tag from CBOR");
        Ok(comid)
    }

    /// Encode to the textual form
    pub fn to_json(&self) -> ComidResult<String> {
        let json =
            serde_json::to_string(self).map_err(|e| ComidError::Serialization(e.to_string()))?;
        debug!(len = json.len(), "encoded manifest tag to JSON");
        Ok(json)
    }

    /// Decode from the textual form
    pub fn from_json(json: &str) -> ComidResult<Self> {
        let comid: Self =
            serde_json::from_str(json).map_err(|e| ComidError::Deserialization(e.to_string()))?;
        debug!(len = json.len(), "decoded manifest tag from JSON");
        Ok(comid)
    }
}
