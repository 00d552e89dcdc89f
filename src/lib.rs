//! # CoMID
//!
//! Data model for CoMID-style reference integrity manifests, the records
//! used in remote-attestation workflows to make verifiable claims about
//! the composition of measured computing environments.
//!
//! This crate provides the building blocks for assembling and validating
//! manifest tags:
//! - **Environment**: identity of one measured component, by class and/or
//!   instance
//! - **DomainMembershipTriple**: a claim that one domain environment
//!   contains a set of member environments
//! - **Triples**: the relationship sections of a manifest tag, each
//!   optional and lazily created
//! - **Entity / TagIdentity**: who made the tag and which tag it is
//! - **Comid**: the tag aggregate, with fan-out validation and a dual
//!   binary (CBOR) / textual (JSON) codec
//!
//! ## Design Principles
//!
//! 1. **Value Semantics**: records own their parts; storing an environment
//!    copies it, so callers and records never alias
//! 2. **Fail-Fast Validation**: validation stops at the first failure and
//!    reports the section and index on the way out
//! 3. **Explicit Absence**: optional sections are `Option` values created
//!    lazily on first append, never implicit null states
//! 4. **Round-Trip Fidelity**: decoding an encoded tag yields a tag that
//!    validates identically to the original
//!
//! ## Example
//!
//! ```rust
//! use comid::{Class, Comid, DomainMembershipTriple, Environment, Role};
//!
//! let mut triple = DomainMembershipTriple::new(
//!     Environment::new()
//!         .with_class(Class::new().with_vendor("ACME").with_model("Composite Device")),
//! );
//! triple.add_member(
//!     Environment::new()
//!         .with_class(Class::new().with_vendor("TPM Vendor").with_model("TPM 2.0")),
//! );
//!
//! let comid = Comid::new("acme-composite-device")
//!     .with_language("en-US")
//!     .add_entity("ACME", None, [Role::TagCreator])
//!     .add_domain_membership_triple(triple);
//!
//! assert!(comid.validate().is_ok());
//! let encoded = comid.to_cbor().unwrap();
//! let decoded = Comid::from_cbor(&encoded).unwrap();
//! assert!(decoded.validate().is_ok());
//! ```

#![warn(missing_docs)]

mod comid;
mod entity;
mod environment;
mod errors;
mod tag_identity;
mod triples;

// Re-export core types
pub use comid::Comid;
pub use entity::{Entities, Entity, Role};
pub use environment::{Class, ClassId, Environment, Instance};
pub use errors::{ComidError, ComidResult};
pub use tag_identity::{TagId, TagIdentity};
pub use triples::{DomainMembershipTriple, DomainMembershipTriples, Triples};
