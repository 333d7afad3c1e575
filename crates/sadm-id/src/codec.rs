//! Canonical id strings: `<PREFIX>_<hex>[_<hex>]`.
//!
//! | prefix                       | fields                               |
//! |------------------------------|--------------------------------------|
//! | `FF_`                        | 11-digit frame, optional `_` + part  |
//! | `TP_` `APR_` `ACO_` `AO_` `AFC_` | 4-digit `xw`                     |
//! | `AP_` `AS_` `AC_`            | 4-digit audio type + 4-digit `xw`    |
//! | `AT_`                        | audio type + `xw`, `_` + 2-digit `z` |
//! | `AB_`                        | audio type + `xw`, `_` + 8-digit `z` |
//! | `AVS_`                       | 4-digit `xw`, `_` + 4-digit `z`      |
//! | `ATU_`                       | 8-digit sequence                     |
//!
//! Prefixes are case-sensitive. Hex digits parse in either case and always
//! format as uppercase.

use std::fmt;
use std::str::FromStr;

use crate::entity_type::{AudioType, EntityType};
use crate::error::IdError;
use crate::id::{
    EntityId, IdFields, compose_generic, compose_typed, compose_untyped, decompose,
};

const FF_WIDTH: usize = 11;

/// Parse a canonical id string; any malformed input yields [`EntityId::NULL`].
pub fn parse_id_string(text: &str) -> EntityId {
    parse_canonical(text).unwrap_or(EntityId::NULL)
}

/// Canonical string of an id-bearing entity; empty for every other id.
pub fn format_id(id: EntityId) -> String {
    format_canonical(id).unwrap_or_default()
}

fn hex_field(text: &str, width: usize) -> Option<u64> {
    if text.len() != width || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(text, 16).ok()
}

fn malformed(text: &str) -> IdError {
    IdError::Malformed(text.to_string())
}

fn parse_canonical(text: &str) -> Result<EntityId, IdError> {
    let (prefix, body) = text.split_once('_').ok_or_else(|| malformed(text))?;
    let entity_type = EntityType::from_id_prefix(prefix).ok_or_else(|| malformed(text))?;
    let field = |part: &str, width: usize| hex_field(part, width).ok_or_else(|| malformed(text));

    match entity_type {
        EntityType::FrameFormat => {
            let (frame, part) = match body.split_once('_') {
                Some((frame, part)) => (field(frame, FF_WIDTH)?, field(part, 2)?),
                None => (field(body, FF_WIDTH)?, 0),
            };
            compose_untyped(entity_type, frame, part as u32)
        }
        EntityType::AlternativeValueSet => {
            let (xw, z) = body.split_once('_').ok_or_else(|| malformed(text))?;
            compose_untyped(entity_type, field(xw, 4)?, field(z, 4)? as u32)
        }
        EntityType::TrackUid => compose_generic(entity_type, field(body, 8)? as u32),
        t if t.is_untyped_xw() => compose_untyped(entity_type, field(body, 4)?, 0),
        t if t.is_typed() => {
            let (head, z) = match (entity_type, body.split_once('_')) {
                (EntityType::TrackFormat, Some((head, z))) => (head, field(z, 2)?),
                (EntityType::BlockFormat, Some((head, z))) => (head, field(z, 8)?),
                (EntityType::TrackFormat | EntityType::BlockFormat, None) => {
                    return Err(malformed(text));
                }
                (_, Some(_)) => return Err(malformed(text)),
                (_, None) => (body, 0),
            };
            if head.len() != 8 || !head.is_ascii() {
                return Err(malformed(text));
            }
            let audio_type = AudioType::from_code(field(&head[..4], 4)?)?;
            compose_typed(entity_type, audio_type, field(&head[4..], 4)? as u16, z as u32)
        }
        _ => Err(malformed(text)),
    }
}

fn format_canonical(id: EntityId) -> Option<String> {
    let entity_type = id.entity_type();
    let prefix = entity_type.id_prefix()?;
    let body = match decompose(id).ok()? {
        IdFields::FrameFormat { frame, part: 0 } => {
            format!("{frame:0width$X}", width = FF_WIDTH)
        }
        IdFields::FrameFormat { frame, part } => {
            format!("{frame:0width$X}_{part:02X}", width = FF_WIDTH)
        }
        IdFields::Untyped { sequence, .. } => format!("{sequence:04X}"),
        IdFields::AltValueSet { sequence, sub } => format!("{sequence:04X}_{sub:04X}"),
        IdFields::Generic { sequence, .. } => format!("{sequence:08X}"),
        IdFields::Typed {
            entity_type,
            audio_type,
            sequence,
            sub,
        } => match entity_type {
            EntityType::TrackFormat => format!("{audio_type}{sequence:04X}_{sub:02X}"),
            EntityType::BlockFormat => format!("{audio_type}{sequence:04X}_{sub:08X}"),
            _ => format!("{audio_type}{sequence:04X}"),
        },
        IdFields::Null => return None,
    };
    Some(format!("{prefix}_{body}"))
}

impl fmt::Display for EntityId {
    /// Canonical form for id-bearing types, `0x`-prefixed raw hex otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match format_canonical(*self) {
            Some(canonical) => f.write_str(&canonical),
            None => write!(f, "0x{:016X}", self.raw()),
        }
    }
}

impl FromStr for EntityId {
    type Err = IdError;

    /// Accepts the canonical form and the raw `0x` hex form used by
    /// [`Display`](fmt::Display) for generic ids.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(raw) = s.strip_prefix("0x") {
            let raw = hex_field(raw, raw.len())
                .filter(|_| (1..=16).contains(&raw.len()))
                .ok_or_else(|| malformed(s))?;
            return Ok(EntityId::from_raw(raw));
        }
        parse_canonical(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(text: &str) {
        let id = parse_id_string(text);
        assert!(!id.is_null(), "{text} should parse");
        assert_eq!(format_id(id), text);
    }

    #[test]
    fn canonical_forms_round_trip() {
        for text in [
            "FF_00000000001",
            "FF_0000000ABCD_01",
            "TP_0001",
            "APR_1001",
            "ACO_1001",
            "AO_1001",
            "AFC_1001",
            "AP_00011001",
            "AS_00031001",
            "AC_00051001",
            "AT_00011001_01",
            "AB_00011001_00000001",
            "AVS_1001_0001",
            "ATU_00000001",
        ] {
            round_trip(text);
        }
    }

    #[test]
    fn composed_ids_round_trip_through_strings() {
        for audio_type in AudioType::ALL {
            for (entity_type, sub) in [
                (EntityType::PackFormat, 0),
                (EntityType::StreamFormat, 0),
                (EntityType::ChannelFormat, 0),
                (EntityType::TrackFormat, 0xFF),
                (EntityType::BlockFormat, 0xDEAD_BEEF),
            ] {
                let id = compose_typed(entity_type, audio_type, 0x1ABC, sub).expect("typed id");
                assert_eq!(parse_id_string(&format_id(id)), id);
            }
        }
        let uid = compose_generic(EntityType::TrackUid, 0xFFFF_FFFF).expect("uid");
        assert_eq!(parse_id_string(&format_id(uid)), uid);
    }

    #[test]
    fn lowercase_hex_parses_and_formats_uppercase() {
        let id = parse_id_string("AB_0001abcd_0000000f");
        assert_eq!(format_id(id), "AB_0001ABCD_0000000F");
    }

    #[test]
    fn malformed_strings_yield_null() {
        for text in [
            "",
            "AO",
            "AO_",
            "AO_101",
            "AO_10011",
            "AO_10G1",
            "XX_1001",
            "APR_+101",
            "FF_0000000001",
            "FF_00000000001_1",
            "AP_0001100",
            "AP_00011001_01",
            "AP_10001001",
            "AP_00061001",
            "AP_00001001",
            "AT_00011001",
            "AT_00011001_001",
            "AB_00011001_0001",
            "AVS_1001",
            "AVS_1001_01",
            "ATU_0000001",
        ] {
            assert!(parse_id_string(text).is_null(), "{text:?} should be rejected");
        }
    }

    #[test]
    fn generic_ids_have_no_canonical_string() {
        let label = compose_generic(EntityType::ProgrammeLabel, 3).expect("label");
        assert_eq!(format_id(label), "");
        assert_eq!(label.to_string(), "0x1800000000000003");
        assert_eq!(label.to_string().parse::<EntityId>(), Ok(label));
    }

    #[test]
    fn ids_serialize_as_strings() {
        let object = parse_id_string("AO_1002");
        let json = serde_json::to_string(&object).expect("serialize");
        assert_eq!(json, "\"AO_1002\"");
        let back: EntityId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, object);
    }
}
