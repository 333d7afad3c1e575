//! # sadm-id
//!
//! Identity codec for Audio Definition Model entities.
//!
//! Every entity in an ADM graph is named by a 64-bit [`EntityId`]. The high
//! byte is the [`EntityType`] tag and alone decides how the remaining bits
//! are read:
//!
//! ```text
//! 63      56 55      48 47               32 31                0
//! +---------+----------+-------------------+------------------+
//! |  type   |   part   |        frame sequence (48 bits)      |  FF_
//! |  type   |  audio   |    xw (16 bits)   |   z (8/32 bits)  |  AP_ AS_ AC_ AT_ AB_
//! |  type   |    0     |    xw (16 bits)   |   z (0/16 bits)  |  TP_ APR_ ACO_ AO_ AFC_ AVS_
//! |  type   |    0     |         0         |  sequence (32)   |  ATU_ and generic ids
//! +---------+----------+-------------------+------------------+
//! ```
//!
//! The canonical string form (`AO_1001`, `AB_00011001_00000001`, ...) is the
//! compatibility surface consumed by the XML layer; [`parse_id_string`] and
//! [`format_id`] are exact inverses over it.

pub mod codec;
pub mod entity_type;
pub mod error;
pub mod id;

pub use codec::{format_id, parse_id_string};
pub use entity_type::{AudioType, EntityType};
pub use error::IdError;
pub use id::{
    EntityId, IdFields, compose_generic, compose_subcomponent, compose_typed, compose_untyped,
    decompose, subcomponent_references_component,
};
