//! Declarative relationship table.
//!
//! Each entry is declared once, from the parent or referrer's side, as the
//! `[min, max]` number of `to` entities allowed under one `from` entity.
//! Inverse entries are derived when the registry is built.

use sadm_id::EntityType;

use super::{Arity, RelationshipKind};

pub(crate) struct RelationshipEntry {
    pub from: EntityType,
    pub to: EntityType,
    pub kind: RelationshipKind,
    pub arity: Arity,
}

const ANY: Option<u32> = None;

const fn contains(from: EntityType, to: EntityType, min: u32, max: Option<u32>) -> RelationshipEntry {
    RelationshipEntry {
        from,
        to,
        kind: RelationshipKind::Contains,
        arity: Arity { min, max },
    }
}

const fn references(
    from: EntityType,
    to: EntityType,
    min: u32,
    max: Option<u32>,
) -> RelationshipEntry {
    RelationshipEntry {
        from,
        to,
        kind: RelationshipKind::References,
        arity: Arity { min, max },
    }
}

const ONE: Option<u32> = Some(1);
const TWO: Option<u32> = Some(2);

use EntityType as E;

pub(crate) const RELATIONSHIP_TABLE: &[RelationshipEntry] = &[
    // document skeleton; a document is either an ituADM tree or a frame
    // sequence, so none of the root's children is mandatory
    contains(E::TopLevel, E::Xml, 0, ONE),
    contains(E::TopLevel, E::ItuAdm, 0, ONE),
    contains(E::TopLevel, E::Frame, 0, ANY),
    contains(E::ItuAdm, E::CoreMetadata, 1, ONE),
    contains(E::CoreMetadata, E::Format, 1, ONE),
    contains(E::Format, E::AudioFormatExtended, 1, ONE),
    contains(E::Frame, E::FrameHeader, 1, ONE),
    contains(E::Frame, E::AudioFormatExtended, 0, ONE),
    contains(E::Frame, E::CoreMetadata, 1, ONE),
    contains(E::Frame, E::FormatCustom, 0, ONE),
    // frame header
    contains(E::FrameHeader, E::FrameFormat, 1, ONE),
    contains(E::FrameHeader, E::TransportTrackFormat, 0, ONE),
    contains(E::FrameHeader, E::ProfileList, 0, ONE),
    contains(E::ProfileList, E::ProfileListSpecification, 1, ANY),
    contains(E::FrameFormat, E::ChangedIds, 0, ONE),
    contains(E::FrameFormat, E::TransportTrackFormat, 0, ONE),
    references(E::ChangedIds, E::ChannelFormat, 0, ANY),
    references(E::ChangedIds, E::PackFormat, 0, ANY),
    references(E::ChangedIds, E::TrackUid, 0, ANY),
    references(E::ChangedIds, E::TrackFormat, 0, ANY),
    references(E::ChangedIds, E::StreamFormat, 0, ANY),
    references(E::ChangedIds, E::Object, 0, ANY),
    references(E::ChangedIds, E::Content, 0, ANY),
    references(E::ChangedIds, E::Programme, 0, ANY),
    contains(E::TransportTrackFormat, E::AudioTrack, 0, ANY),
    references(E::AudioTrack, E::TrackUid, 0, ANY),
    // audioFormatExtended
    contains(E::AudioFormatExtended, E::Programme, 0, ANY),
    contains(E::AudioFormatExtended, E::Content, 0, ANY),
    contains(E::AudioFormatExtended, E::Object, 0, ANY),
    contains(E::AudioFormatExtended, E::PackFormat, 0, ANY),
    contains(E::AudioFormatExtended, E::ChannelFormat, 0, ANY),
    contains(E::AudioFormatExtended, E::StreamFormat, 0, ANY),
    contains(E::AudioFormatExtended, E::TrackFormat, 0, ANY),
    contains(E::AudioFormatExtended, E::TrackUid, 0, ANY),
    // programme
    contains(E::Programme, E::ProgrammeLabel, 0, ANY),
    contains(E::Programme, E::LoudnessMetadata, 0, ANY),
    references(E::Programme, E::Content, 1, ANY),
    references(E::Programme, E::AlternativeValueSet, 0, ANY),
    // content
    contains(E::Content, E::ContentLabel, 0, ANY),
    contains(E::Content, E::Dialogue, 0, ONE),
    contains(E::Content, E::LoudnessMetadata, 0, ANY),
    references(E::Content, E::Object, 1, ANY),
    // object
    contains(E::Object, E::ObjectLabel, 0, ANY),
    contains(E::Object, E::Gain, 0, ONE),
    contains(E::Object, E::ComplementaryObjectRef, 0, ANY),
    contains(E::Object, E::AlternativeValueSet, 0, ANY),
    contains(E::Object, E::ComplementaryObjectGroupLabel, 0, ANY),
    contains(E::Object, E::ObjectInteraction, 0, ONE),
    contains(E::Object, E::PositionOffset, 0, ONE),
    references(E::Object, E::PackFormat, 0, ANY),
    references(E::Object, E::TrackUid, 0, ANY),
    references(E::Object, E::Object, 0, ANY),
    contains(E::ObjectInteraction, E::GainInteractionRange, 0, TWO),
    contains(E::ObjectInteraction, E::PositionInteractionRange, 0, TWO),
    // track UID and formats
    references(E::TrackUid, E::TrackFormat, 0, ONE),
    references(E::TrackUid, E::ChannelFormat, 0, ONE),
    references(E::TrackUid, E::PackFormat, 0, ONE),
    references(E::PackFormat, E::ChannelFormat, 0, ANY),
    references(E::PackFormat, E::PackFormat, 0, ANY),
    references(E::StreamFormat, E::ChannelFormat, 0, ONE),
    references(E::StreamFormat, E::PackFormat, 0, ONE),
    references(E::StreamFormat, E::TrackFormat, 0, ANY),
    contains(E::ChannelFormat, E::BlockFormat, 1, ANY),
    contains(E::ChannelFormat, E::Frequency, 0, TWO),
    references(E::TrackFormat, E::StreamFormat, 1, ONE),
    contains(E::BlockFormat, E::Gain, 0, ONE),
    contains(E::BlockFormat, E::SpeakerLabel, 0, ANY),
    contains(E::BlockFormat, E::Cartesian, 0, ONE),
    contains(E::BlockFormat, E::Position, 2, Some(11)),
    contains(E::BlockFormat, E::Equation, 0, ONE),
    contains(E::BlockFormat, E::Order, 0, ONE),
    contains(E::BlockFormat, E::Degree, 0, ONE),
    contains(E::BlockFormat, E::Normalization, 0, ONE),
    // alternative value set overrides
    contains(E::AlternativeValueSet, E::Gain, 0, ONE),
    contains(E::AlternativeValueSet, E::PositionOffset, 0, ONE),
    contains(E::AlternativeValueSet, E::ObjectLabel, 0, ANY),
    // audioFormatCustom
    contains(E::FormatCustom, E::FormatCustomSet, 1, ANY),
    contains(E::FormatCustomSet, E::AdmInformation, 1, ONE),
    contains(E::AdmInformation, E::Profile, 1, ANY),
    // loudness
    contains(E::LoudnessMetadata, E::IntegratedLoudness, 0, ONE),
    contains(E::LoudnessMetadata, E::DialogueLoudness, 0, ONE),
];
