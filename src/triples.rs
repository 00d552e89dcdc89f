//! Domain membership triples
//!
//! A [`DomainMembershipTriple`] asserts that one domain environment
//! contains a set of member environments, describing the topology of a
//! composite attester: the domain is the subject, "contains" the
//! predicate, and each member an object of the claim.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde::ser::{SerializeStruct, SerializeTuple};

use crate::environment::Environment;
use crate::errors::{ComidError, ComidResult};

/// A record linking one domain environment to its member environments
///
/// Members are stored by value and in insertion order. Order carries no
/// validity meaning but is preserved through encoding for deterministic
/// round trips.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainMembershipTriple {
    /// The containing domain
    pub domain_id: Environment,
    /// The environments contained in the domain
    pub members: Vec<Environment>,
}

impl DomainMembershipTriple {
    /// Create a triple for the given domain with no members yet
    ///
    /// The triple only becomes valid once at least one member is added.
    pub fn new(domain_id: Environment) -> Self {
        Self {
            domain_id,
            members: Vec::new(),
        }
    }

    /// Append a member environment, chainable
    pub fn add_member(&mut self, member: Environment) -> &mut Self {
        self.members.push(member);
        self
    }

    /// Check the triple's cross-entity invariants
    ///
    /// Checks run in dependency order and stop at the first failure: the
    /// domain must be a valid environment, the member sequence must be
    /// non-empty, and every member must be a valid environment. Member
    /// failures report the zero-based index of the first invalid member.
    pub fn validate(&self) -> ComidResult<()> {
        self.domain_id
            .validate()
            .map_err(ComidError::into_domain_id)?;

        if self.members.is_empty() {
            return Err(ComidError::NoMemberEnvironments);
        }

        for (i, member) in self.members.iter().enumerate() {
            member.validate().map_err(|e| e.into_member(i))?;
        }

        Ok(())
    }
}

// Binary form: a fixed two-element array [domain, members] with no field
// tags. Textual form: a keyed object with `domain-id` and `members`.
impl Serialize for DomainMembershipTriple {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            let mut record = serializer.serialize_struct("DomainMembershipTriple", 2)?;
            record.serialize_field("domain-id", &self.domain_id)?;
            record.serialize_field("members", &self.members)?;
            record.end()
        } else {
            let mut pair = serializer.serialize_tuple(2)?;
            pair.serialize_element(&self.domain_id)?;
            pair.serialize_element(&self.members)?;
            pair.end()
        }
    }
}

impl<'de> Deserialize<'de> for DomainMembershipTriple {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            #[derive(Deserialize)]
            struct Keyed {
                #[serde(rename = "domain-id")]
                domain_id: Environment,
                members: Vec<Environment>,
            }

            let keyed = Keyed::deserialize(deserializer)?;
            Ok(Self {
                domain_id: keyed.domain_id,
                members: keyed.members,
            })
        } else {
            let (domain_id, members) =
                <(Environment, Vec<Environment>)>::deserialize(deserializer)?;
            Ok(Self { domain_id, members })
        }
    }
}

/// Ordered collection of domain membership triples
///
/// Triples keep their insertion order and duplicates are permitted; the
/// collection never deduplicates or removes elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainMembershipTriples(Vec<DomainMembershipTriple>);

impl DomainMembershipTriples {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff the collection holds no triples
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of triples held
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Append a triple, chainable
    pub fn add(&mut self, triple: DomainMembershipTriple) -> &mut Self {
        self.0.push(triple);
        self
    }

    /// Iterate over the triples in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &DomainMembershipTriple> {
        self.0.iter()
    }

    /// Validate every triple in order, stopping at the first failure
    ///
    /// The failing triple's zero-based index is attached to the underlying
    /// cause. An empty collection is vacuously valid.
    pub fn validate(&self) -> ComidResult<()> {
        for (i, triple) in self.0.iter().enumerate() {
            triple.validate().map_err(|e| e.into_triple(i))?;
        }
        Ok(())
    }
}

/// The relationship sections of a manifest tag
///
/// Each section is optional; a manifest that makes no claims of a given
/// kind simply leaves that section absent. The absent state is modeled
/// explicitly as an `Option`, and the attach paths lazily create the
/// section on first use, so appending through an absent holder is never
/// an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Triples {
    /// Claims about the composition of domains, if any
    #[serde(
        rename = "domain-membership-triples",
        skip_serializing_if = "Option::is_none"
    )]
    pub domain_membership_triples: Option<DomainMembershipTriples>,
}

impl Triples {
    /// Create a holder with every section absent
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a domain membership triple, creating the section if absent
    pub fn add_domain_membership_triple(&mut self, triple: DomainMembershipTriple) -> &mut Self {
        self.domain_membership_triples
            .get_or_insert_with(DomainMembershipTriples::new)
            .add(triple);
        self
    }

    /// Validate every present section
    ///
    /// Absent sections are skipped; a present section's failure is wrapped
    /// so the report names the section as well as the failing element.
    pub fn validate(&self) -> ComidResult<()> {
        if let Some(triples) = &self.domain_membership_triples {
            triples
                .validate()
                .map_err(|e| ComidError::InvalidTriplesSection {
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }
}
