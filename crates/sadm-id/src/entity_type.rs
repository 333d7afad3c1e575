//! Entity type tags and audio type labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IdError;

/// The closed set of ADM schema elements an id or record can represent.
///
/// The discriminant is the tag stored in the high byte of an [`EntityId`].
/// Types `FrameFormat..=FormatCustomSet` carry ADM ids with a canonical
/// string form; everything else is named by a generic id.
///
/// [`EntityId`]: crate::EntityId
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EntityType {
    Void = 0,
    TopLevel = 1,
    Xml = 2,
    FrameFormat = 3,
    TransportTrackFormat = 4,
    Programme = 5,
    Content = 6,
    Object = 7,
    PackFormat = 8,
    StreamFormat = 9,
    ChannelFormat = 10,
    TrackFormat = 11,
    BlockFormat = 12,
    AlternativeValueSet = 13,
    TrackUid = 14,
    FormatCustomSet = 15,
    ItuAdm = 16,
    CoreMetadata = 17,
    Format = 18,
    Frame = 19,
    FrameHeader = 20,
    ChangedIds = 21,
    AudioTrack = 22,
    AudioFormatExtended = 23,
    ProgrammeLabel = 24,
    ContentLabel = 25,
    ObjectLabel = 26,
    SpeakerLabel = 27,
    Gain = 28,
    Dialogue = 29,
    Cartesian = 30,
    Position = 31,
    Equation = 32,
    Degree = 33,
    Order = 34,
    Normalization = 35,
    Frequency = 36,
    FormatCustom = 37,
    ProfileList = 38,
    ProfileListSpecification = 39,
    ComplementaryObjectRef = 40,
    ComplementaryObjectGroupLabel = 41,
    ObjectInteraction = 42,
    PositionOffset = 43,
    GainInteractionRange = 44,
    PositionInteractionRange = 45,
    AdmInformation = 46,
    Profile = 47,
    LoudnessMetadata = 48,
    IntegratedLoudness = 49,
    DialogueLoudness = 50,
    /// Decode result for tags that name no known type.
    Illegal = 0xFF,
}

impl EntityType {
    /// Every legal entity type in tag order (excludes `Illegal`).
    pub const ALL: [EntityType; 51] = [
        EntityType::Void,
        EntityType::TopLevel,
        EntityType::Xml,
        EntityType::FrameFormat,
        EntityType::TransportTrackFormat,
        EntityType::Programme,
        EntityType::Content,
        EntityType::Object,
        EntityType::PackFormat,
        EntityType::StreamFormat,
        EntityType::ChannelFormat,
        EntityType::TrackFormat,
        EntityType::BlockFormat,
        EntityType::AlternativeValueSet,
        EntityType::TrackUid,
        EntityType::FormatCustomSet,
        EntityType::ItuAdm,
        EntityType::CoreMetadata,
        EntityType::Format,
        EntityType::Frame,
        EntityType::FrameHeader,
        EntityType::ChangedIds,
        EntityType::AudioTrack,
        EntityType::AudioFormatExtended,
        EntityType::ProgrammeLabel,
        EntityType::ContentLabel,
        EntityType::ObjectLabel,
        EntityType::SpeakerLabel,
        EntityType::Gain,
        EntityType::Dialogue,
        EntityType::Cartesian,
        EntityType::Position,
        EntityType::Equation,
        EntityType::Degree,
        EntityType::Order,
        EntityType::Normalization,
        EntityType::Frequency,
        EntityType::FormatCustom,
        EntityType::ProfileList,
        EntityType::ProfileListSpecification,
        EntityType::ComplementaryObjectRef,
        EntityType::ComplementaryObjectGroupLabel,
        EntityType::ObjectInteraction,
        EntityType::PositionOffset,
        EntityType::GainInteractionRange,
        EntityType::PositionInteractionRange,
        EntityType::AdmInformation,
        EntityType::Profile,
        EntityType::LoudnessMetadata,
        EntityType::IntegratedLoudness,
        EntityType::DialogueLoudness,
    ];

    /// Tag stored in the high byte of an id.
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Resolve a tag byte; unknown tags map to `Illegal`.
    pub fn from_tag(tag: u8) -> EntityType {
        Self::ALL
            .get(usize::from(tag))
            .copied()
            .unwrap_or(EntityType::Illegal)
    }

    /// Whether ids of this type carry an ADM id with a canonical string form.
    pub fn has_adm_id(self) -> bool {
        (EntityType::FrameFormat..=EntityType::FormatCustomSet).contains(&self)
    }

    /// Whether ids of this type are `tag + 32-bit sequence` only.
    pub fn is_generic(self) -> bool {
        match self {
            EntityType::TrackUid => true,
            EntityType::Void | EntityType::Illegal => false,
            other => !other.has_adm_id(),
        }
    }

    /// Types whose ADM id is a single 16-bit `xw` number.
    pub fn is_untyped_xw(self) -> bool {
        matches!(
            self,
            EntityType::TransportTrackFormat
                | EntityType::Programme
                | EntityType::Content
                | EntityType::Object
                | EntityType::FormatCustomSet
        )
    }

    /// Types whose ADM id embeds an audio type next to the `xw` number.
    pub fn is_typed(self) -> bool {
        matches!(
            self,
            EntityType::PackFormat
                | EntityType::StreamFormat
                | EntityType::ChannelFormat
                | EntityType::TrackFormat
                | EntityType::BlockFormat
        )
    }

    /// Canonical id-string prefix, without the trailing underscore.
    pub fn id_prefix(self) -> Option<&'static str> {
        let prefix = match self {
            EntityType::FrameFormat => "FF",
            EntityType::TransportTrackFormat => "TP",
            EntityType::Programme => "APR",
            EntityType::Content => "ACO",
            EntityType::Object => "AO",
            EntityType::PackFormat => "AP",
            EntityType::StreamFormat => "AS",
            EntityType::ChannelFormat => "AC",
            EntityType::TrackFormat => "AT",
            EntityType::BlockFormat => "AB",
            EntityType::AlternativeValueSet => "AVS",
            EntityType::TrackUid => "ATU",
            EntityType::FormatCustomSet => "AFC",
            _ => return None,
        };
        Some(prefix)
    }

    /// Inverse of [`EntityType::id_prefix`].
    pub fn from_id_prefix(prefix: &str) -> Option<EntityType> {
        Self::ALL
            .into_iter()
            .find(|t| t.id_prefix() == Some(prefix))
    }

    /// XML element name of this type, if it appears as an element.
    pub fn element_name(self) -> Option<&'static str> {
        let name = match self {
            EntityType::Void | EntityType::TopLevel | EntityType::Illegal => return None,
            EntityType::Xml => "xml",
            EntityType::FrameFormat => "frameFormat",
            EntityType::TransportTrackFormat => "transportTrackFormat",
            EntityType::Programme => "audioProgramme",
            EntityType::Content => "audioContent",
            EntityType::Object => "audioObject",
            EntityType::PackFormat => "audioPackFormat",
            EntityType::StreamFormat => "audioStreamFormat",
            EntityType::ChannelFormat => "audioChannelFormat",
            EntityType::TrackFormat => "audioTrackFormat",
            EntityType::BlockFormat => "audioBlockFormat",
            EntityType::AlternativeValueSet => "alternativeValueSet",
            EntityType::TrackUid => "audioTrackUID",
            EntityType::FormatCustomSet => "audioFormatCustomSet",
            EntityType::ItuAdm => "ituADM",
            EntityType::CoreMetadata => "coreMetadata",
            EntityType::Format => "format",
            EntityType::Frame => "frame",
            EntityType::FrameHeader => "frameHeader",
            EntityType::ChangedIds => "changedIDs",
            EntityType::AudioTrack => "audioTrack",
            EntityType::AudioFormatExtended => "audioFormatExtended",
            EntityType::ProgrammeLabel => "audioProgrammeLabel",
            EntityType::ContentLabel => "audioContentLabel",
            EntityType::ObjectLabel => "audioObjectLabel",
            EntityType::SpeakerLabel => "speakerLabel",
            EntityType::Gain => "gain",
            EntityType::Dialogue => "dialogue",
            EntityType::Cartesian => "cartesian",
            EntityType::Position => "position",
            EntityType::Equation => "equation",
            EntityType::Degree => "degree",
            EntityType::Order => "order",
            EntityType::Normalization => "normalization",
            EntityType::Frequency => "frequency",
            EntityType::FormatCustom => "audioFormatCustom",
            EntityType::ProfileList => "profileList",
            EntityType::ProfileListSpecification => "profile",
            EntityType::ComplementaryObjectRef => "audioComplementaryObjectIDRef",
            EntityType::ComplementaryObjectGroupLabel => "audioComplementaryObjectGroupLabel",
            EntityType::ObjectInteraction => "audioObjectInteraction",
            EntityType::PositionOffset => "positionOffset",
            EntityType::GainInteractionRange => "gainInteractionRange",
            EntityType::PositionInteractionRange => "positionInteractionRange",
            EntityType::AdmInformation => "admInformation",
            EntityType::Profile => "profile",
            EntityType::LoudnessMetadata => "loudnessMetadata",
            EntityType::IntegratedLoudness => "integratedLoudness",
            EntityType::DialogueLoudness => "dialogueLoudness",
        };
        Some(name)
    }

    /// Stable snake_case name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Void => "void",
            EntityType::TopLevel => "top_level",
            EntityType::Xml => "xml",
            EntityType::FrameFormat => "frame_format",
            EntityType::TransportTrackFormat => "transport_track_format",
            EntityType::Programme => "programme",
            EntityType::Content => "content",
            EntityType::Object => "object",
            EntityType::PackFormat => "pack_format",
            EntityType::StreamFormat => "stream_format",
            EntityType::ChannelFormat => "channel_format",
            EntityType::TrackFormat => "track_format",
            EntityType::BlockFormat => "block_format",
            EntityType::AlternativeValueSet => "alternative_value_set",
            EntityType::TrackUid => "track_uid",
            EntityType::FormatCustomSet => "format_custom_set",
            EntityType::ItuAdm => "itu_adm",
            EntityType::CoreMetadata => "core_metadata",
            EntityType::Format => "format",
            EntityType::Frame => "frame",
            EntityType::FrameHeader => "frame_header",
            EntityType::ChangedIds => "changed_ids",
            EntityType::AudioTrack => "audio_track",
            EntityType::AudioFormatExtended => "audio_format_extended",
            EntityType::ProgrammeLabel => "programme_label",
            EntityType::ContentLabel => "content_label",
            EntityType::ObjectLabel => "object_label",
            EntityType::SpeakerLabel => "speaker_label",
            EntityType::Gain => "gain",
            EntityType::Dialogue => "dialogue",
            EntityType::Cartesian => "cartesian",
            EntityType::Position => "position",
            EntityType::Equation => "equation",
            EntityType::Degree => "degree",
            EntityType::Order => "order",
            EntityType::Normalization => "normalization",
            EntityType::Frequency => "frequency",
            EntityType::FormatCustom => "format_custom",
            EntityType::ProfileList => "profile_list",
            EntityType::ProfileListSpecification => "profile_list_specification",
            EntityType::ComplementaryObjectRef => "complementary_object_ref",
            EntityType::ComplementaryObjectGroupLabel => "complementary_object_group_label",
            EntityType::ObjectInteraction => "object_interaction",
            EntityType::PositionOffset => "position_offset",
            EntityType::GainInteractionRange => "gain_interaction_range",
            EntityType::PositionInteractionRange => "position_interaction_range",
            EntityType::AdmInformation => "adm_information",
            EntityType::Profile => "profile",
            EntityType::LoudnessMetadata => "loudness_metadata",
            EntityType::IntegratedLoudness => "integrated_loudness",
            EntityType::DialogueLoudness => "dialogue_loudness",
            EntityType::Illegal => "illegal",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown entity type: {s}"))
    }
}

/// Standard ADM audio type labels (`typeLabel` / `formatLabel`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AudioType {
    DirectSpeakers = 1,
    Matrix = 2,
    Objects = 3,
    Hoa = 4,
    Binaural = 5,
}

impl AudioType {
    pub const ALL: [AudioType; 5] = [
        AudioType::DirectSpeakers,
        AudioType::Matrix,
        AudioType::Objects,
        AudioType::Hoa,
        AudioType::Binaural,
    ];

    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Resolve a numeric label; custom (>= 0x1000) and undefined labels fail.
    pub fn from_code(code: u64) -> Result<AudioType, IdError> {
        Self::ALL
            .into_iter()
            .find(|t| u64::from(t.code()) == code)
            .ok_or(IdError::UnknownAudioType(code))
    }

    /// `typeDefinition` text for this label.
    pub fn definition(self) -> &'static str {
        match self {
            AudioType::DirectSpeakers => "DirectSpeakers",
            AudioType::Matrix => "Matrix",
            AudioType::Objects => "Objects",
            AudioType::Hoa => "HOA",
            AudioType::Binaural => "Binaural",
        }
    }
}

impl fmt::Display for AudioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.code())
    }
}

impl FromStr for AudioType {
    type Err = IdError;

    /// Accepts either the 4-hex-digit label (`0003`) or the definition
    /// (`Objects`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(found) = Self::ALL.into_iter().find(|t| t.definition() == s) {
            return Ok(found);
        }
        if s.len() == 4 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            let code = u64::from_str_radix(s, 16).map_err(|_| IdError::Malformed(s.to_string()))?;
            return Self::from_code(code);
        }
        Err(IdError::Malformed(s.to_string()))
    }
}
