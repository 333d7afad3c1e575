//! Attribute tags and the declarative attribute table.

use sadm_id::EntityType;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::ValueType;

/// Every attribute of the format. Declaration order is tag order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AttributeTag {
    XmlVersion,
    XmlEncoding,
    ItuAdmXmlns,
    FrameFormatId,
    FrameFormatType,
    FrameFormatStart,
    FrameFormatDuration,
    FrameFormatTimeReference,
    FrameFormatFlowId,
    TransportTrackFormatId,
    TransportTrackFormatName,
    TransportTrackFormatNumIds,
    TransportTrackFormatNumTracks,
    ProgrammeId,
    ProgrammeName,
    ProgrammeLanguage,
    ContentId,
    ContentName,
    ContentLanguage,
    ObjectId,
    ObjectName,
    ObjectStart,
    ObjectDuration,
    TrackUidUid,
    TrackUidSampleRate,
    TrackUidBitDepth,
    PackFormatId,
    PackFormatName,
    PackFormatTypeLabel,
    PackFormatTypeDefinition,
    StreamFormatId,
    StreamFormatName,
    StreamFormatFormatLabel,
    StreamFormatFormatDefinition,
    ChannelFormatId,
    ChannelFormatName,
    ChannelFormatTypeLabel,
    ChannelFormatTypeDefinition,
    TrackFormatId,
    TrackFormatName,
    TrackFormatFormatLabel,
    TrackFormatFormatDefinition,
    BlockFormatId,
    BlockFormatRtime,
    BlockFormatDuration,
    AltValueSetId,
    FormatCustomSetId,
    FormatCustomSetType,
    AudioTrackId,
    AudioFormatExtendedVersion,
    ProgrammeLabelValue,
    ProgrammeLabelLanguage,
    ContentLabelValue,
    ContentLabelLanguage,
    ObjectLabelValue,
    ObjectLabelLanguage,
    GainValue,
    GainUnit,
    SpeakerLabelValue,
    DialogueValue,
    DialogueNonDialogueKind,
    DialogueDialogueKind,
    DialogueMixedKind,
    CartesianValue,
    PositionValue,
    PositionCoordinate,
    PositionScreenEdgeLock,
    EquationValue,
    DegreeValue,
    OrderValue,
    NormalizationValue,
    FrequencyValue,
    FrequencyTypeDefinition,
    ProfileListSpecificationValue,
    ProfileListSpecificationName,
    ProfileListSpecificationVersion,
    ProfileListSpecificationLevel,
    ComplementaryObjectIdRef,
    ComplementaryObjectGroupLabelValue,
    ComplementaryObjectGroupLabelLanguage,
    ObjectInteractionOnOff,
    ObjectInteractionGain,
    ObjectInteractionPosition,
    PositionOffsetValue,
    PositionOffsetCoordinate,
    GainInteractionRangeValue,
    GainInteractionRangeBound,
    PositionInteractionRangeValue,
    PositionInteractionRangeCoordinate,
    PositionInteractionRangeBound,
    ProfileValue,
    ProfileName,
    ProfileVersion,
    ProfileLevel,
    LoudnessMethod,
    LoudnessRecType,
    LoudnessCorrectionType,
    IntegratedLoudnessValue,
    DialogueLoudnessValue,
}

impl fmt::Display for AttributeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub(crate) struct AttributeEntry {
    pub entity_type: EntityType,
    pub name: &'static str,
    pub tag: AttributeTag,
    pub value_type: ValueType,
}

const fn attr(
    entity_type: EntityType,
    name: &'static str,
    tag: AttributeTag,
    value_type: ValueType,
) -> AttributeEntry {
    AttributeEntry {
        entity_type,
        name,
        tag,
        value_type,
    }
}

use AttributeTag as A;
use EntityType as E;
use ValueType as V;

pub(crate) const ATTRIBUTE_TABLE: &[AttributeEntry] = &[
    attr(E::Xml, "version", A::XmlVersion, V::String),
    attr(E::Xml, "encoding", A::XmlEncoding, V::String),
    attr(E::ItuAdm, "xmlns", A::ItuAdmXmlns, V::String),
    // frameHeader
    attr(E::FrameFormat, "frameFormatID", A::FrameFormatId, V::String),
    attr(E::FrameFormat, "type", A::FrameFormatType, V::String),
    attr(E::FrameFormat, "start", A::FrameFormatStart, V::Time),
    attr(E::FrameFormat, "duration", A::FrameFormatDuration, V::Time),
    attr(E::FrameFormat, "timeReference", A::FrameFormatTimeReference, V::String),
    attr(E::FrameFormat, "flowID", A::FrameFormatFlowId, V::String),
    attr(E::TransportTrackFormat, "transportID", A::TransportTrackFormatId, V::String),
    attr(E::TransportTrackFormat, "transportName", A::TransportTrackFormatName, V::String),
    attr(E::TransportTrackFormat, "numIDs", A::TransportTrackFormatNumIds, V::Uint),
    attr(E::TransportTrackFormat, "numTracks", A::TransportTrackFormatNumTracks, V::Uint),
    // content side
    attr(E::Programme, "audioProgrammeID", A::ProgrammeId, V::String),
    attr(E::Programme, "audioProgrammeName", A::ProgrammeName, V::String),
    attr(E::Programme, "audioProgrammeLanguage", A::ProgrammeLanguage, V::String),
    attr(E::Content, "audioContentID", A::ContentId, V::String),
    attr(E::Content, "audioContentName", A::ContentName, V::String),
    attr(E::Content, "audioContentLanguage", A::ContentLanguage, V::String),
    attr(E::Object, "audioObjectID", A::ObjectId, V::String),
    attr(E::Object, "audioObjectName", A::ObjectName, V::String),
    attr(E::Object, "start", A::ObjectStart, V::Time),
    attr(E::Object, "duration", A::ObjectDuration, V::Time),
    attr(E::TrackUid, "UID", A::TrackUidUid, V::String),
    attr(E::TrackUid, "sampleRate", A::TrackUidSampleRate, V::Uint),
    attr(E::TrackUid, "bitDepth", A::TrackUidBitDepth, V::Uint),
    // format side
    attr(E::PackFormat, "audioPackFormatID", A::PackFormatId, V::String),
    attr(E::PackFormat, "audioPackFormatName", A::PackFormatName, V::String),
    attr(E::PackFormat, "typeLabel", A::PackFormatTypeLabel, V::AudioType),
    attr(E::PackFormat, "typeDefinition", A::PackFormatTypeDefinition, V::String),
    attr(E::StreamFormat, "audioStreamFormatID", A::StreamFormatId, V::String),
    attr(E::StreamFormat, "audioStreamFormatName", A::StreamFormatName, V::String),
    attr(E::StreamFormat, "formatLabel", A::StreamFormatFormatLabel, V::AudioType),
    attr(E::StreamFormat, "formatDefinition", A::StreamFormatFormatDefinition, V::String),
    attr(E::ChannelFormat, "audioChannelFormatID", A::ChannelFormatId, V::String),
    attr(E::ChannelFormat, "audioChannelFormatName", A::ChannelFormatName, V::String),
    attr(E::ChannelFormat, "typeLabel", A::ChannelFormatTypeLabel, V::AudioType),
    attr(E::ChannelFormat, "typeDefinition", A::ChannelFormatTypeDefinition, V::String),
    attr(E::TrackFormat, "audioTrackFormatID", A::TrackFormatId, V::String),
    attr(E::TrackFormat, "audioTrackFormatName", A::TrackFormatName, V::String),
    attr(E::TrackFormat, "formatLabel", A::TrackFormatFormatLabel, V::AudioType),
    attr(E::TrackFormat, "formatDefinition", A::TrackFormatFormatDefinition, V::String),
    attr(E::BlockFormat, "audioBlockFormatID", A::BlockFormatId, V::String),
    attr(E::BlockFormat, "rtime", A::BlockFormatRtime, V::Time),
    attr(E::BlockFormat, "duration", A::BlockFormatDuration, V::Time),
    attr(E::AlternativeValueSet, "alternativeValueSetID", A::AltValueSetId, V::String),
    attr(E::FormatCustomSet, "audioFormatCustomSetID", A::FormatCustomSetId, V::String),
    attr(E::FormatCustomSet, "audioFormatCustomSetType", A::FormatCustomSetType, V::String),
    attr(E::AudioTrack, "trackID", A::AudioTrackId, V::Uint),
    attr(E::AudioFormatExtended, "version", A::AudioFormatExtendedVersion, V::String),
    // sub-elements
    attr(E::ProgrammeLabel, "audioProgrammeLabelValue", A::ProgrammeLabelValue, V::String),
    attr(E::ProgrammeLabel, "language", A::ProgrammeLabelLanguage, V::String),
    attr(E::ContentLabel, "audioContentLabelValue", A::ContentLabelValue, V::String),
    attr(E::ContentLabel, "language", A::ContentLabelLanguage, V::String),
    attr(E::ObjectLabel, "audioObjectLabelValue", A::ObjectLabelValue, V::String),
    attr(E::ObjectLabel, "language", A::ObjectLabelLanguage, V::String),
    attr(E::Gain, "gainValue", A::GainValue, V::Float),
    attr(E::Gain, "gainUnit", A::GainUnit, V::String),
    attr(E::SpeakerLabel, "speakerLabelValue", A::SpeakerLabelValue, V::String),
    attr(E::Dialogue, "dialogueValue", A::DialogueValue, V::Uint),
    attr(E::Dialogue, "nonDialogueContentKind", A::DialogueNonDialogueKind, V::Uint),
    attr(E::Dialogue, "dialogueContentKind", A::DialogueDialogueKind, V::Uint),
    attr(E::Dialogue, "mixedContentKind", A::DialogueMixedKind, V::Uint),
    attr(E::Cartesian, "cartesianValue", A::CartesianValue, V::Bool),
    attr(E::Position, "positionValue", A::PositionValue, V::Float),
    attr(E::Position, "coordinate", A::PositionCoordinate, V::String),
    attr(E::Position, "screenEdgeLock", A::PositionScreenEdgeLock, V::String),
    attr(E::Equation, "equationValue", A::EquationValue, V::String),
    attr(E::Degree, "degreeValue", A::DegreeValue, V::Int),
    attr(E::Order, "orderValue", A::OrderValue, V::Uint),
    attr(E::Normalization, "normalizationValue", A::NormalizationValue, V::String),
    attr(E::Frequency, "frequencyValue", A::FrequencyValue, V::Float),
    attr(E::Frequency, "typeDefinition", A::FrequencyTypeDefinition, V::String),
    attr(E::ProfileListSpecification, "profileValue", A::ProfileListSpecificationValue, V::String),
    attr(E::ProfileListSpecification, "profileName", A::ProfileListSpecificationName, V::String),
    attr(E::ProfileListSpecification, "profileVersion", A::ProfileListSpecificationVersion, V::String),
    attr(E::ProfileListSpecification, "profileLevel", A::ProfileListSpecificationLevel, V::Uint),
    attr(E::ComplementaryObjectRef, "audioComplementaryObjectIDRef", A::ComplementaryObjectIdRef, V::Ref),
    attr(
        E::ComplementaryObjectGroupLabel,
        "audioComplementaryObjectGroupLabelValue",
        A::ComplementaryObjectGroupLabelValue,
        V::String,
    ),
    attr(
        E::ComplementaryObjectGroupLabel,
        "language",
        A::ComplementaryObjectGroupLabelLanguage,
        V::String,
    ),
    attr(E::ObjectInteraction, "onOffInteract", A::ObjectInteractionOnOff, V::Bool),
    attr(E::ObjectInteraction, "gainInteract", A::ObjectInteractionGain, V::Bool),
    attr(E::ObjectInteraction, "positionInteract", A::ObjectInteractionPosition, V::Bool),
    attr(E::PositionOffset, "positionOffsetValue", A::PositionOffsetValue, V::Float),
    attr(E::PositionOffset, "coordinate", A::PositionOffsetCoordinate, V::String),
    attr(E::GainInteractionRange, "gainInteractionRangeValue", A::GainInteractionRangeValue, V::Float),
    attr(E::GainInteractionRange, "bound", A::GainInteractionRangeBound, V::String),
    attr(
        E::PositionInteractionRange,
        "positionInteractionRangeValue",
        A::PositionInteractionRangeValue,
        V::Float,
    ),
    attr(E::PositionInteractionRange, "coordinate", A::PositionInteractionRangeCoordinate, V::String),
    attr(E::PositionInteractionRange, "bound", A::PositionInteractionRangeBound, V::String),
    attr(E::Profile, "profileValue", A::ProfileValue, V::String),
    attr(E::Profile, "profileName", A::ProfileName, V::String),
    attr(E::Profile, "profileVersion", A::ProfileVersion, V::String),
    attr(E::Profile, "profileLevel", A::ProfileLevel, V::Uint),
    attr(E::LoudnessMetadata, "loudnessMethod", A::LoudnessMethod, V::String),
    attr(E::LoudnessMetadata, "loudnessRecType", A::LoudnessRecType, V::String),
    attr(E::LoudnessMetadata, "loudnessCorrectionType", A::LoudnessCorrectionType, V::String),
    attr(E::IntegratedLoudness, "integratedLoudnessValue", A::IntegratedLoudnessValue, V::Float),
    attr(E::DialogueLoudness, "dialogueLoudnessValue", A::DialogueLoudnessValue, V::Float),
];
