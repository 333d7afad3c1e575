//! Bit-packed entity ids: composition, decomposition, subcomponents.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entity_type::{AudioType, EntityType};
use crate::error::IdError;

const ENTITY_TYPE_SHIFT: u32 = 56;
const PART_SHIFT: u32 = 48;
const XW_SHIFT: u32 = 32;
const MASK_8: u64 = 0xFF;
const MASK_16: u64 = 0xFFFF;
const MASK_32: u64 = 0xFFFF_FFFF;
const MASK_48: u64 = 0xFFFF_FFFF_FFFF;

/// Sequence number of the well-known top-level entity.
const TOP_LEVEL_SEQUENCE: u32 = 0x1001;

/// A 64-bit entity identifier.
///
/// The raw layout is a compatibility format; use the constructors and
/// [`EntityId::fields`] rather than shifting bits directly.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct EntityId(u64);

impl EntityId {
    /// The distinguished null id (`0`).
    pub const NULL: EntityId = EntityId(0);

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Entity type named by the high byte; `Illegal` for unknown tags.
    pub fn entity_type(self) -> EntityType {
        EntityType::from_tag((self.0 >> ENTITY_TYPE_SHIFT) as u8)
    }

    /// The fixed root id of every graph container.
    pub fn top_level() -> Self {
        Self(tag_bits(EntityType::TopLevel) | u64::from(TOP_LEVEL_SEQUENCE))
    }

    /// Decompose into typed fields. See [`decompose`].
    pub fn fields(self) -> Result<IdFields, IdError> {
        decompose(self)
    }

    /// The number minted by per-type sequence counters for this id.
    ///
    /// Generic ids report their 32-bit sequence, `xw`-family ids their `xw`
    /// number, frame formats their frame sequence.
    pub fn sequence(self) -> Option<u64> {
        match decompose(self).ok()? {
            IdFields::Null => None,
            IdFields::Generic { sequence, .. } => Some(u64::from(sequence)),
            IdFields::FrameFormat { frame, .. } => Some(frame),
            IdFields::Untyped { sequence, .. }
            | IdFields::Typed { sequence, .. }
            | IdFields::AltValueSet { sequence, .. } => Some(u64::from(sequence)),
        }
    }

    /// Lowest id of `entity_type` in raw ordering.
    pub fn type_floor(entity_type: EntityType) -> Self {
        Self(tag_bits(entity_type))
    }

    /// Highest id of `entity_type` in raw ordering.
    pub fn type_ceiling(entity_type: EntityType) -> Self {
        Self(tag_bits(entity_type) | (u64::MAX >> 8))
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({self})")
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for EntityId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Typed view of the fields packed into an [`EntityId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdFields {
    Null,
    /// `tag + 32-bit sequence` (track UIDs and component types).
    Generic {
        entity_type: EntityType,
        sequence: u32,
    },
    FrameFormat {
        frame: u64,
        part: u8,
    },
    /// Single `xw` number (transport track, programme, content, object,
    /// format custom set).
    Untyped {
        entity_type: EntityType,
        sequence: u16,
    },
    /// Audio type + `xw` number, plus a `z` sub-sequence for track and block
    /// formats.
    Typed {
        entity_type: EntityType,
        audio_type: AudioType,
        sequence: u16,
        sub: u32,
    },
    AltValueSet {
        sequence: u16,
        sub: u16,
    },
}

impl IdFields {
    pub fn entity_type(&self) -> EntityType {
        match self {
            IdFields::Null => EntityType::Void,
            IdFields::Generic { entity_type, .. }
            | IdFields::Untyped { entity_type, .. }
            | IdFields::Typed { entity_type, .. } => *entity_type,
            IdFields::FrameFormat { .. } => EntityType::FrameFormat,
            IdFields::AltValueSet { .. } => EntityType::AlternativeValueSet,
        }
    }
}

fn tag_bits(entity_type: EntityType) -> u64 {
    u64::from(entity_type.tag()) << ENTITY_TYPE_SHIFT
}

fn check_width(entity_type: EntityType, value: u64, bits: u32) -> Result<u64, IdError> {
    if bits < 64 && value >> bits != 0 {
        return Err(IdError::FieldOverflow {
            entity_type,
            value,
            bits,
        });
    }
    Ok(value)
}

/// Width of the `z` field for typed families, `None` when absent.
fn typed_sub_bits(entity_type: EntityType) -> Option<u32> {
    match entity_type {
        EntityType::TrackFormat => Some(8),
        EntityType::BlockFormat => Some(32),
        _ => None,
    }
}

/// Compose a generic id: `tag + 32-bit sequence`.
pub fn compose_generic(entity_type: EntityType, sequence: u32) -> Result<EntityId, IdError> {
    if !entity_type.is_generic() {
        return Err(IdError::WrongLayout {
            entity_type,
            layout: "generic",
        });
    }
    Ok(EntityId(tag_bits(entity_type) | u64::from(sequence)))
}

/// Compose an id for a type without an audio-type field.
///
/// - frame formats: `sequence` is the 48-bit frame number, `sub` the 8-bit part
/// - alt-value-sets: `sequence` is `xw`, `sub` the 16-bit `z`
/// - `xw` types: `sequence` is `xw`, `sub` must be zero
pub fn compose_untyped(
    entity_type: EntityType,
    sequence: u64,
    sub: u32,
) -> Result<EntityId, IdError> {
    let sub = u64::from(sub);
    let raw = match entity_type {
        EntityType::FrameFormat => {
            let frame = check_width(entity_type, sequence, 48)?;
            let part = check_width(entity_type, sub, 8)?;
            (part << PART_SHIFT) | frame
        }
        EntityType::AlternativeValueSet => {
            let xw = check_width(entity_type, sequence, 16)?;
            let z = check_width(entity_type, sub, 16)?;
            (xw << XW_SHIFT) | z
        }
        t if t.is_untyped_xw() => {
            let xw = check_width(entity_type, sequence, 16)?;
            check_width(entity_type, sub, 0)?;
            xw << XW_SHIFT
        }
        _ => {
            return Err(IdError::WrongLayout {
                entity_type,
                layout: "untyped",
            });
        }
    };
    Ok(EntityId(tag_bits(entity_type) | raw))
}

/// Compose an audio-format id: pack, stream, channel, track or block format.
pub fn compose_typed(
    entity_type: EntityType,
    audio_type: AudioType,
    sequence: u16,
    sub: u32,
) -> Result<EntityId, IdError> {
    if !entity_type.is_typed() {
        return Err(IdError::WrongLayout {
            entity_type,
            layout: "typed",
        });
    }
    let z = check_width(
        entity_type,
        u64::from(sub),
        typed_sub_bits(entity_type).unwrap_or(0),
    )?;
    Ok(EntityId(
        tag_bits(entity_type)
            | (u64::from(audio_type.code()) << PART_SHIFT)
            | (u64::from(sequence) << XW_SHIFT)
            | z,
    ))
}

/// Derive a child id from its parent: channel format → block format, object
/// → alternative value set. The parent's shared fields are kept and `sequence`
/// becomes the child's `z`.
pub fn compose_subcomponent(parent: EntityId, sequence: u32) -> Result<EntityId, IdError> {
    match decompose(parent)? {
        IdFields::Typed {
            entity_type: EntityType::ChannelFormat,
            audio_type,
            sequence: xw,
            ..
        } => compose_typed(EntityType::BlockFormat, audio_type, xw, sequence),
        IdFields::Untyped {
            entity_type: EntityType::Object,
            sequence: xw,
        } => compose_untyped(EntityType::AlternativeValueSet, u64::from(xw), sequence),
        other => Err(IdError::NoSubcomponents(other.entity_type())),
    }
}

/// Whether `sub` is a subcomponent id derived from `component`.
pub fn subcomponent_references_component(component: EntityId, sub: EntityId) -> bool {
    match (decompose(component), decompose(sub)) {
        (
            Ok(IdFields::Untyped {
                entity_type: EntityType::Object,
                sequence: object,
            }),
            Ok(IdFields::AltValueSet { sequence, .. }),
        ) => object == sequence,
        (
            Ok(IdFields::Typed {
                entity_type: EntityType::ChannelFormat,
                audio_type: channel_type,
                sequence: channel,
                ..
            }),
            Ok(IdFields::Typed {
                entity_type: EntityType::BlockFormat,
                audio_type,
                sequence,
                ..
            }),
        ) => channel_type == audio_type && channel == sequence,
        _ => false,
    }
}

/// Split an id into its typed fields.
///
/// Fails with [`IdError::IllegalTag`] when the tag is unknown and with
/// [`IdError::UnknownAudioType`] when a typed id carries a non-standard
/// audio type.
pub fn decompose(id: EntityId) -> Result<IdFields, IdError> {
    if id.is_null() {
        return Ok(IdFields::Null);
    }
    let raw = id.raw();
    let entity_type = id.entity_type();
    let fields = match entity_type {
        EntityType::Illegal | EntityType::Void => return Err(IdError::IllegalTag(raw)),
        EntityType::FrameFormat => IdFields::FrameFormat {
            frame: raw & MASK_48,
            part: ((raw >> PART_SHIFT) & MASK_8) as u8,
        },
        EntityType::AlternativeValueSet => IdFields::AltValueSet {
            sequence: ((raw >> XW_SHIFT) & MASK_16) as u16,
            sub: (raw & MASK_16) as u16,
        },
        t if t.is_untyped_xw() => IdFields::Untyped {
            entity_type,
            sequence: ((raw >> XW_SHIFT) & MASK_16) as u16,
        },
        t if t.is_typed() => {
            let audio_type = AudioType::from_code((raw >> PART_SHIFT) & MASK_8)?;
            let sub_mask = match typed_sub_bits(entity_type) {
                Some(8) => MASK_8,
                Some(_) => MASK_32,
                None => 0,
            };
            IdFields::Typed {
                entity_type,
                audio_type,
                sequence: ((raw >> XW_SHIFT) & MASK_16) as u16,
                sub: (raw & sub_mask) as u32,
            }
        }
        _ => IdFields::Generic {
            entity_type,
            sequence: (raw & MASK_32) as u32,
        },
    };
    Ok(fields)
}
