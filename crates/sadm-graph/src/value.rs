//! Typed attribute values and their text forms.

use regex::Regex;
use sadm_id::{AudioType, EntityId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::GraphError;

/// Declared value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Bool,
    Uint,
    Int,
    Float,
    AudioType,
    Time,
    String,
    Ref,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Uint => "uint",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::AudioType => "audio_type",
            ValueType::Time => "time",
            ValueType::String => "string",
            ValueType::Ref => "ref",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ADM time: `hh:mm:ss` plus a decimal or rational fraction of a second.
///
/// A zero `fraction_denominator` means the numerator is the decimal digits
/// after the point (`00:00:01.50000`); otherwise the fraction is
/// `numerator / denominator` (`00:00:01.00024S48000`). `fraction_digits`
/// is how many digits the numerator was written with, leading zeros
/// included, so `.050000` and `.50000` stay apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdmTime {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub fraction_numerator: u32,
    pub fraction_denominator: u32,
    #[serde(default)]
    pub fraction_digits: u8,
}

const MIN_FRACTION_DIGITS: usize = 5;

fn clock_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d\d):(\d\d):(\d\d)\.(\d{5,})(?:S(\d{5,}))?$")
            .expect("clock time regex must compile")
    })
}

fn fraction_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{5,})S(\d{5,})$").expect("fraction regex must compile"))
}

impl FromStr for AdmTime {
    type Err = GraphError;

    /// Accepts `hh:mm:ss.zzzzz`, `hh:mm:ss.zzzzzSfffff` and `zzzzzSfffff`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GraphError::InvalidArgument(format!("malformed time: {s:?}"));
        let number = |text: &str| text.parse::<u32>().map_err(|_| invalid());
        let small = |text: &str| text.parse::<u8>().map_err(|_| invalid());
        let digits = |text: &str| u8::try_from(text.len()).map_err(|_| invalid());

        let time = if let Some(caps) = clock_regex().captures(s) {
            AdmTime {
                hours: small(&caps[1])?,
                minutes: small(&caps[2])?,
                seconds: small(&caps[3])?,
                fraction_numerator: number(&caps[4])?,
                fraction_denominator: match caps.get(5) {
                    Some(denominator) => number(denominator.as_str())?,
                    None => 0,
                },
                fraction_digits: digits(&caps[4])?,
            }
        } else if let Some(caps) = fraction_regex().captures(s) {
            AdmTime {
                fraction_numerator: number(&caps[1])?,
                fraction_denominator: number(&caps[2])?,
                fraction_digits: digits(&caps[1])?,
                ..AdmTime::default()
            }
        } else {
            return Err(invalid());
        };

        if time.minutes >= 60 || time.seconds >= 60 {
            return Err(invalid());
        }
        Ok(time)
    }
}

fn digit_count(value: u32) -> usize {
    value.checked_ilog10().map_or(1, |log| log as usize + 1)
}

impl fmt::Display for AdmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}.",
            self.hours, self.minutes, self.seconds
        )?;
        let written = usize::from(self.fraction_digits);
        if self.fraction_denominator == 0 {
            write!(
                f,
                "{:0width$}",
                self.fraction_numerator,
                width = written.max(MIN_FRACTION_DIGITS)
            )
        } else {
            let width = if written > 0 {
                written
            } else {
                digit_count(self.fraction_denominator)
            }
            .max(MIN_FRACTION_DIGITS);
            write!(
                f,
                "{:0width$}S{:0min$}",
                self.fraction_numerator,
                self.fraction_denominator,
                min = MIN_FRACTION_DIGITS
            )
        }
    }
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Bool(bool),
    Uint(u32),
    Int(i32),
    Float(f32),
    AudioType(AudioType),
    Time(AdmTime),
    String(String),
    /// Id of another entity (complementary object references).
    Ref(EntityId),
}

impl AttributeValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            AttributeValue::Bool(_) => ValueType::Bool,
            AttributeValue::Uint(_) => ValueType::Uint,
            AttributeValue::Int(_) => ValueType::Int,
            AttributeValue::Float(_) => ValueType::Float,
            AttributeValue::AudioType(_) => ValueType::AudioType,
            AttributeValue::Time(_) => ValueType::Time,
            AttributeValue::String(_) => ValueType::String,
            AttributeValue::Ref(_) => ValueType::Ref,
        }
    }

    /// Parse the XML text form of a value of the given type.
    pub fn parse(value_type: ValueType, text: &str) -> Result<Self, GraphError> {
        let invalid = || GraphError::InvalidArgument(format!("malformed {value_type}: {text:?}"));
        let value = match value_type {
            ValueType::Bool => match text.to_ascii_lowercase().as_str() {
                "true" | "1" => AttributeValue::Bool(true),
                "false" | "0" => AttributeValue::Bool(false),
                _ => return Err(invalid()),
            },
            ValueType::Uint => AttributeValue::Uint(text.trim().parse().map_err(|_| invalid())?),
            ValueType::Int => AttributeValue::Int(text.trim().parse().map_err(|_| invalid())?),
            ValueType::Float => AttributeValue::Float(text.trim().parse().map_err(|_| invalid())?),
            ValueType::AudioType => {
                AttributeValue::AudioType(text.trim().parse().map_err(|_| invalid())?)
            }
            ValueType::Time => AttributeValue::Time(text.trim().parse()?),
            ValueType::String => AttributeValue::String(text.to_string()),
            ValueType::Ref => {
                let id = sadm_id::parse_id_string(text.trim());
                if id.is_null() {
                    return Err(invalid());
                }
                AttributeValue::Ref(id)
            }
        };
        Ok(value)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_ref_id(&self) -> Option<EntityId> {
        match self {
            AttributeValue::Ref(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(value) => write!(f, "{value}"),
            AttributeValue::Uint(value) => write!(f, "{value}"),
            AttributeValue::Int(value) => write!(f, "{value}"),
            AttributeValue::Float(value) => write!(f, "{value}"),
            AttributeValue::AudioType(value) => write!(f, "{value}"),
            AttributeValue::Time(value) => write!(f, "{value}"),
            AttributeValue::String(value) => f.write_str(value),
            AttributeValue::Ref(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        AttributeValue::Uint(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<f32> for AttributeValue {
    fn from(value: f32) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<AudioType> for AttributeValue {
    fn from(value: AudioType) -> Self {
        AttributeValue::AudioType(value)
    }
}

impl From<AdmTime> for AttributeValue {
    fn from(value: AdmTime) -> Self {
        AttributeValue::Time(value)
    }
}

impl From<EntityId> for AttributeValue {
    fn from(value: EntityId) -> Self {
        AttributeValue::Ref(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_accepts_three_forms() {
        let clock: AdmTime = "01:02:03.50000".parse().expect("clock time");
        assert_eq!(
            clock,
            AdmTime {
                hours: 1,
                minutes: 2,
                seconds: 3,
                fraction_numerator: 50000,
                fraction_denominator: 0,
                fraction_digits: 5,
            }
        );

        let rational: AdmTime = "00:00:01.01001S48000".parse().expect("rational time");
        assert_eq!(rational.fraction_numerator, 1001);
        assert_eq!(rational.fraction_denominator, 48000);

        let bare: AdmTime = "01001S48000".parse().expect("bare fraction");
        assert_eq!(bare.seconds, 0);
        assert_eq!(bare.fraction_denominator, 48000);
    }

    #[test]
    fn time_rejects_out_of_range_and_short_fractions() {
        for text in ["00:60:00.00000", "00:00:60.00000", "00:00:00.0000", "1S48000", "garbage"] {
            assert!(text.parse::<AdmTime>().is_err(), "{text} should be rejected");
        }
    }

    #[test]
    fn time_formats_back_to_a_parseable_form() {
        for text in ["00:00:00.00000", "10:20:30.12345", "00:00:01.01001S48000"] {
            let time: AdmTime = text.parse().expect("time");
            assert_eq!(time.to_string(), text);
        }
        let bare: AdmTime = "01001S48000".parse().expect("bare fraction");
        assert_eq!(bare.to_string(), "00:00:00.01001S48000");
    }

    #[test]
    fn long_decimal_fractions_keep_their_leading_zeros() {
        for text in ["00:00:00.050000", "00:00:00.0000100", "00:00:02.000000001"] {
            let value = AttributeValue::parse(ValueType::Time, text).expect("time");
            assert_eq!(value.to_string(), text);
            assert_eq!(AttributeValue::parse(ValueType::Time, &value.to_string()), Ok(value));
        }
        let tenth: AdmTime = "00:00:00.100000".parse().expect("time");
        let half: AdmTime = "00:00:00.50000".parse().expect("time");
        assert_eq!(tenth.fraction_digits, 6);
        assert_ne!(tenth.to_string(), half.to_string());
    }

    #[test]
    fn composed_times_pad_to_the_minimum_width() {
        let time = AdmTime {
            seconds: 1,
            fraction_numerator: 24,
            fraction_denominator: 48000,
            ..AdmTime::default()
        };
        assert_eq!(time.to_string(), "00:00:01.00024S48000");
    }

    #[test]
    fn bool_accepts_words_and_digits() {
        for (text, expected) in [("true", true), ("TRUE", true), ("1", true), ("false", false), ("0", false)] {
            assert_eq!(
                AttributeValue::parse(ValueType::Bool, text).expect("bool"),
                AttributeValue::Bool(expected)
            );
        }
        assert!(AttributeValue::parse(ValueType::Bool, "yes").is_err());
    }

    #[test]
    fn refs_parse_through_the_identity_codec() {
        let value = AttributeValue::parse(ValueType::Ref, "AO_1002").expect("ref");
        assert_eq!(value.as_ref_id(), Some(sadm_id::parse_id_string("AO_1002")));
        assert!(AttributeValue::parse(ValueType::Ref, "AO_12").is_err());
    }

    #[test]
    fn display_and_parse_agree_for_scalars() {
        for value in [
            AttributeValue::Uint(48000),
            AttributeValue::Int(-3),
            AttributeValue::Float(0.5),
            AttributeValue::AudioType(AudioType::Objects),
        ] {
            let text = value.to_string();
            assert_eq!(
                AttributeValue::parse(value.value_type(), &text).expect("parse back"),
                value
            );
        }
    }
}
