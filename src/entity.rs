//! Entities responsible for a manifest tag

use serde::{Deserialize, Serialize};

use crate::errors::{ComidError, ComidResult};

/// Role an entity plays with respect to a manifest tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Created the tag itself
    TagCreator,
    /// Created the module the tag describes
    Creator,
    /// Maintains the module the tag describes
    Maintainer,
}

/// One organization or person named by a manifest tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity name
    pub name: String,
    /// Registration identifier, typically a URI
    #[serde(rename = "regid", skip_serializing_if = "Option::is_none")]
    pub reg_id: Option<String>,
    /// Roles the entity claims, at least one required
    pub roles: Vec<Role>,
}

impl Entity {
    /// Create an entity with the given name and no roles yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reg_id: None,
            roles: Vec::new(),
        }
    }

    /// Set the registration identifier
    pub fn with_reg_id(mut self, reg_id: impl Into<String>) -> Self {
        self.reg_id = Some(reg_id.into());
        self
    }

    /// Append a role, chainable
    pub fn add_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    /// Check that the entity has a name and at least one role
    pub fn validate(&self) -> ComidResult<()> {
        if self.name.is_empty() {
            return Err(ComidError::EmptyEntityName);
        }
        if self.roles.is_empty() {
            return Err(ComidError::NoRoles);
        }
        Ok(())
    }
}

/// Ordered collection of entities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities(Vec<Entity>);

impl Entities {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff the collection holds no entities
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entities held
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Append an entity, chainable
    pub fn add(&mut self, entity: Entity) -> &mut Self {
        self.0.push(entity);
        self
    }

    /// Validate every entity in order, stopping at the first failure
    pub fn validate(&self) -> ComidResult<()> {
        for (i, entity) in self.0.iter().enumerate() {
            entity.validate().map_err(|e| ComidError::InvalidEntity {
                index: i,
                source: Box::new(e),
            })?;
        }
        Ok(())
    }
}
