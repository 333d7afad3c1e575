//! Error types for identity composition and parsing.

use crate::entity_type::EntityType;

/// Errors raised while composing, decomposing, or parsing entity ids.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The entity type does not use the requested id layout.
    #[error("{entity_type} does not carry a {layout} id")]
    WrongLayout {
        entity_type: EntityType,
        layout: &'static str,
    },

    /// A numeric field does not fit the width reserved for it.
    #[error("value {value:#x} does not fit the {bits}-bit field of {entity_type}")]
    FieldOverflow {
        entity_type: EntityType,
        value: u64,
        bits: u32,
    },

    /// Subcomponent ids only exist below channel formats and objects.
    #[error("{0} has no subcomponent id family")]
    NoSubcomponents(EntityType),

    /// The high byte of a raw id names no known entity type.
    #[error("id {0:#018x} carries an illegal entity type tag")]
    IllegalTag(u64),

    /// Audio types outside the standard range (1..=5) are not representable.
    #[error("audio type {0:#06x} is outside the standard range")]
    UnknownAudioType(u64),

    /// The id string does not match any canonical form.
    #[error("malformed id string: {0:?}")]
    Malformed(String),
}
