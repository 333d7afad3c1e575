//! # sadm-graph
//!
//! Schema-validated in-memory ADM graph.
//!
//! This crate provides:
//! - `SchemaRegistry` (attribute and relationship descriptor tables)
//! - `EntityStore` (records, typed attribute values, lifecycle)
//! - `RelationshipStore` (typed directed edges kept with their inverses)
//! - `GraphContainer` (both stores behind one surface, plus id minting)
//! - `GraphSnapshot` (JSON export/import through the container surface)
//!
//! Parsing and writing XML is not done here; the XML layer talks to a
//! container through `add_entity`, `add_relationship`, `set_value` and the
//! `for_each_*` family, resolving attribute names through the registry.
//!
//! ## Data model
//!
//! ```text
//! SchemaRegistry (immutable, shared by Arc)
//!     |  validates
//! GraphContainer
//!     +-- EntityStore        id -> { status, tag -> value }
//!     +-- RelationshipStore  (from, kind, to_type, to), both directions
//!     +-- SequenceMap        per-type counters for fresh ids
//! ```

pub mod arity;
pub mod container;
pub mod entity;
pub mod error;
pub mod relationship;
pub mod schema;
pub mod sequence;
pub mod snapshot;
pub mod value;

pub use arity::{ArityReport, ArityViolation};
pub use container::GraphContainer;
pub use entity::{EntityRecord, EntityStatus, EntityStore};
pub use error::{ErrorKind, GraphError};
pub use relationship::{RelationshipRecord, RelationshipStore};
pub use schema::{
    Arity, AttributeDescriptor, AttributeTag, RelationshipDescriptor, RelationshipKind,
    SchemaRegistry, build_registry,
};
pub use sequence::{FIRST_ADM_SEQUENCE, SequenceMap};
pub use snapshot::{EntitySnapshot, GraphSnapshot, RelationshipSnapshot};
pub use value::{AdmTime, AttributeValue, ValueType};
