//! Integration tests: flattening small hand-built documents with both
//! strategies.

use insta::assert_json_snapshot;
use sadm_flatten::{FlattenConfig, FlattenStrategy, ProfileFlattener, flatten};
use sadm_graph::{
    AttributeTag, AttributeValue, EntityStatus, ErrorKind, GraphContainer, RelationshipKind,
};
use sadm_id::{EntityId, EntityType, compose_untyped, parse_id_string};
use std::collections::BTreeSet;
use uuid::Uuid;

const SOURCE_FLOW: &str = "6f1c2d3e-4b5a-4c7d-8e9f-0a1b2c3d4e5f";

fn id(text: &str) -> EntityId {
    parse_id_string(text)
}

struct Document {
    graph: GraphContainer,
    afe: EntityId,
}

impl Document {
    /// Root -> frame -> { header -> frame format, audioFormatExtended }.
    fn new() -> Self {
        let mut graph = GraphContainer::default();
        let root = graph.top_level_id();
        let frame = graph.generic_id(EntityType::Frame).expect("frame id");
        graph.add_entity_with_relationship(root, frame).expect("frame");
        let header = graph.generic_id(EntityType::FrameHeader).expect("header id");
        graph.add_entity_with_relationship(frame, header).expect("header");
        let frame_format = compose_untyped(EntityType::FrameFormat, 1, 0).expect("ff id");
        graph
            .add_entity_with_relationship(header, frame_format)
            .expect("frame format");
        graph
            .set_value(frame_format, AttributeTag::FrameFormatFlowId, SOURCE_FLOW)
            .expect("flow id");
        let afe = graph
            .generic_id(EntityType::AudioFormatExtended)
            .expect("afe id");
        graph.add_entity_with_relationship(frame, afe).expect("afe");
        Self { graph, afe }
    }

    fn object(&mut self, object: &str, name: &str) -> EntityId {
        let object = id(object);
        self.graph
            .add_entity_with_relationship(self.afe, object)
            .expect("object");
        self.graph
            .set_value(object, AttributeTag::ObjectName, name)
            .expect("object name");
        object
    }

    fn content(&mut self, content: &str, language: Option<&str>, objects: &[&str]) -> EntityId {
        let content = id(content);
        self.graph
            .add_entity_with_relationship(self.afe, content)
            .expect("content");
        if let Some(language) = language {
            self.graph
                .set_value(content, AttributeTag::ContentLanguage, language)
                .expect("content language");
        }
        for object in objects {
            self.graph
                .add_relationship(content, id(object))
                .expect("content object");
        }
        content
    }

    fn programme(&mut self, programme: &str, contents: &[&str]) -> EntityId {
        let text = programme;
        let programme = id(programme);
        self.graph
            .add_entity_with_relationship(self.afe, programme)
            .expect("programme");
        self.graph
            .set_value(programme, AttributeTag::ProgrammeId, text)
            .expect("programme id");
        self.graph
            .set_value(programme, AttributeTag::ProgrammeName, "Main")
            .expect("programme name");
        for content in contents {
            self.graph
                .add_relationship(programme, id(content))
                .expect("programme content");
        }
        programme
    }

    fn programme_label(&mut self, programme: EntityId, language: &str, text: &str) {
        let label = self
            .graph
            .generic_id(EntityType::ProgrammeLabel)
            .expect("label id");
        self.graph
            .add_entity_with_relationship(programme, label)
            .expect("label");
        self.graph
            .set_value(label, AttributeTag::ProgrammeLabelLanguage, language)
            .expect("label language");
        self.graph
            .set_value(label, AttributeTag::ProgrammeLabelValue, text)
            .expect("label value");
    }

    fn complementary(&mut self, leader: &str, members: &[&str]) {
        for member in members {
            let reference = self
                .graph
                .generic_id(EntityType::ComplementaryObjectRef)
                .expect("ref id");
            self.graph
                .add_entity_with_relationship(id(leader), reference)
                .expect("ref");
            self.graph
                .set_value(reference, AttributeTag::ComplementaryObjectIdRef, id(member))
                .expect("ref value");
        }
    }

    fn group_label(&mut self, object: &str, language: &str, text: &str) {
        let label = self
            .graph
            .generic_id(EntityType::ComplementaryObjectGroupLabel)
            .expect("group label id");
        self.graph
            .add_entity_with_relationship(id(object), label)
            .expect("group label");
        self.graph
            .set_value(
                label,
                AttributeTag::ComplementaryObjectGroupLabelLanguage,
                language,
            )
            .expect("group label language");
        self.graph
            .set_value(label, AttributeTag::ComplementaryObjectGroupLabelValue, text)
            .expect("group label value");
    }

    fn gain(&mut self, parent: EntityId, value: f32) {
        let gain = self.graph.generic_id(EntityType::Gain).expect("gain id");
        self.graph
            .add_entity_with_relationship(parent, gain)
            .expect("gain");
        self.graph
            .set_value(gain, AttributeTag::GainValue, value)
            .expect("gain value");
    }

    /// changedIDs under the frame format, referencing `targets`.
    fn changed_ids(&mut self, targets: &[&str]) -> EntityId {
        let frame_format = compose_untyped(EntityType::FrameFormat, 1, 0).expect("ff id");
        let changed = self
            .graph
            .generic_id(EntityType::ChangedIds)
            .expect("changed ids id");
        self.graph
            .add_entity_with_relationship(frame_format, changed)
            .expect("changed ids");
        for target in targets {
            self.graph
                .add_relationship(changed, id(target))
                .expect("changed id reference");
        }
        changed
    }
}

/// Dialogue in two languages offered as a complementary pair, plus music.
fn dialogue_pair() -> Document {
    let mut doc = Document::new();
    doc.object("AO_2001", "Dialogue EN");
    doc.object("AO_2002", "Dialogue DE");
    doc.object("AO_1003", "Music");
    doc.complementary("AO_2001", &["AO_2002"]);
    doc.group_label("AO_2001", "en", "English");
    doc.group_label("AO_2001", "de", "Deutsch");
    doc.content("ACO_1001", Some("en"), &["AO_2001"]);
    doc.content("ACO_1002", Some("de"), &["AO_2002"]);
    doc.content("ACO_1003", Some("und"), &["AO_1003"]);
    let programme = doc.programme("APR_1001", &["ACO_1001", "ACO_1002", "ACO_1003"]);
    doc.programme_label(programme, "en", "Original");
    doc
}

fn flow_id(graph: &GraphContainer) -> Option<String> {
    let frame_format = compose_untyped(EntityType::FrameFormat, 1, 0).expect("ff id");
    graph
        .value(frame_format, AttributeTag::FrameFormatFlowId)
        .expect("flow id read")
        .and_then(|value| value.as_str())
        .map(str::to_string)
}

fn text(graph: &GraphContainer, id: EntityId, tag: AttributeTag) -> Option<String> {
    graph
        .value(id, tag)
        .expect("read")
        .and_then(|value| value.as_str())
        .map(str::to_string)
}

fn programmes(graph: &GraphContainer) -> Vec<EntityId> {
    graph
        .entities_of(EntityType::Programme)
        .map(|record| record.id)
        .collect()
}

fn contents_of(graph: &GraphContainer, programme: EntityId) -> Vec<EntityId> {
    graph
        .related_of_type(programme, EntityType::Content)
        .collect()
}

fn labels_of(graph: &GraphContainer, programme: EntityId) -> Vec<(String, String)> {
    graph
        .related_of_type(programme, EntityType::ProgrammeLabel)
        .map(|label| {
            (
                text(graph, label, AttributeTag::ProgrammeLabelLanguage).unwrap_or_default(),
                text(graph, label, AttributeTag::ProgrammeLabelValue).unwrap_or_default(),
            )
        })
        .collect()
}

fn label(language: &str, text: &str) -> (String, String) {
    (language.to_string(), text.to_string())
}

fn with_strategy(strategy: FlattenStrategy) -> ProfileFlattener {
    ProfileFlattener::new(FlattenConfig {
        strategy,
        ..FlattenConfig::default()
    })
}

#[test]
fn a_graph_without_alternatives_keeps_its_ids_and_values() {
    let mut doc = Document::new();
    let object = doc.object("AO_1001", "Dialogue");
    doc.gain(object, 0.8);
    doc.content("ACO_1001", Some("en"), &["AO_1001"]);
    let programme = doc.programme("APR_1001", &["ACO_1001"]);
    doc.programme_label(programme, "en", "Main mix");

    let flattened = flatten(&doc.graph).expect("flatten");
    let out = &flattened.graph;

    assert_eq!(programmes(out), [id("APR_1001")]);
    assert!(!flattened.report.flow_id_regenerated);
    assert_eq!(flattened.report.expanded_programmes, 0);
    for record in doc.graph.entities() {
        if !record.entity_type().has_adm_id() {
            continue;
        }
        let copied = out
            .entity(record.id)
            .unwrap_or_else(|| panic!("{} missing from output", record.id));
        assert_eq!(
            copied.attributes().collect::<Vec<_>>(),
            record.attributes().collect::<Vec<_>>(),
            "{}",
            record.id
        );
    }
    assert_eq!(contents_of(out, id("APR_1001")), [id("ACO_1001")]);
    assert_eq!(
        out.related_of_type(id("ACO_1001"), EntityType::Object)
            .collect::<Vec<_>>(),
        [id("AO_1001")]
    );
    assert_eq!(labels_of(out, id("APR_1001")), [label("en", "Main mix")]);
    let gains: Vec<_> = out.related_of_type(id("AO_1001"), EntityType::Gain).collect();
    assert_eq!(gains.len(), 1);
    assert_eq!(
        out.get_value(gains[0], AttributeTag::GainValue),
        Ok(&AttributeValue::Float(0.8))
    );
    assert_eq!(flow_id(out).as_deref(), Some(SOURCE_FLOW));
}

#[test]
fn emission_splits_a_complementary_pair_into_labelled_programmes() {
    let doc = dialogue_pair();
    let flattened = flatten(&doc.graph).expect("flatten");
    let out = &flattened.graph;

    assert_json_snapshot!(flattened.report, @r###"
    {
      "strategy": "emission",
      "programmes_in": 1,
      "programmes_out": 2,
      "expanded_programmes": 1,
      "synthesized_contents": 0,
      "flow_id_regenerated": true
    }
    "###);

    // counters continue past the source's APR_1001
    assert_eq!(programmes(out), [id("APR_1002"), id("APR_1003")]);
    let english = id("APR_1002");
    let german = id("APR_1003");
    assert_eq!(contents_of(out, english), [id("ACO_1001"), id("ACO_1003")]);
    assert_eq!(contents_of(out, german), [id("ACO_1002"), id("ACO_1003")]);
    assert_eq!(labels_of(out, english), [label("en", "English")]);
    assert_eq!(labels_of(out, german), [label("de", "Deutsch")]);
    assert_eq!(
        text(out, english, AttributeTag::ProgrammeLanguage).as_deref(),
        Some("en")
    );
    assert_eq!(
        text(out, german, AttributeTag::ProgrammeLanguage).as_deref(),
        Some("de")
    );
    assert_eq!(
        text(out, german, AttributeTag::ProgrammeId).as_deref(),
        Some("APR_1003")
    );
    assert_eq!(
        text(out, german, AttributeTag::ProgrammeName).as_deref(),
        Some("Main")
    );
    assert_eq!(out.entity_count(EntityType::ComplementaryObjectGroupLabel), 0);

    // the source is left as it was
    assert_eq!(programmes(&doc.graph), [id("APR_1001")]);
    assert_eq!(flow_id(&doc.graph).as_deref(), Some(SOURCE_FLOW));
}

#[test]
fn regenerated_flow_ids_are_fresh_v4_uuids() {
    let doc = dialogue_pair();
    let first = flatten(&doc.graph).expect("flatten");
    let second = flatten(&doc.graph).expect("flatten");

    let first_flow = flow_id(&first.graph).expect("flow id");
    let parsed = Uuid::parse_str(&first_flow).expect("uuid");
    assert_eq!(parsed.get_version_num(), 4);
    assert_eq!(first_flow, first_flow.to_lowercase());
    assert_ne!(first_flow, SOURCE_FLOW);
    assert_ne!(Some(first_flow), flow_id(&second.graph));
}

#[test]
fn flow_id_is_kept_when_regeneration_is_disabled() {
    let doc = dialogue_pair();
    let flattener = ProfileFlattener::new(FlattenConfig {
        regenerate_flow_id: false,
        ..FlattenConfig::default()
    });
    let flattened = flattener.flatten(&doc.graph).expect("flatten");
    assert!(!flattened.report.flow_id_regenerated);
    assert_eq!(flattened.report.programmes_out, 2);
    assert_eq!(flow_id(&flattened.graph).as_deref(), Some(SOURCE_FLOW));
}

#[test]
fn combinatorial_renumbers_from_the_minting_floor() {
    let doc = dialogue_pair();
    let flattened = with_strategy(FlattenStrategy::Combinatorial)
        .flatten(&doc.graph)
        .expect("flatten");
    let out = &flattened.graph;

    assert_eq!(programmes(out), [id("APR_1001"), id("APR_1002")]);
    assert_eq!(contents_of(out, id("APR_1001")), [id("ACO_1001"), id("ACO_1003")]);
    assert_eq!(contents_of(out, id("APR_1002")), [id("ACO_1002"), id("ACO_1003")]);
    assert_eq!(
        text(out, id("APR_1001"), AttributeTag::ProgrammeLanguage).as_deref(),
        Some("en")
    );
    assert_eq!(
        text(out, id("APR_1002"), AttributeTag::ProgrammeLanguage).as_deref(),
        Some("de")
    );
    // labels are copied, not synthesized
    for programme in programmes(out) {
        assert_eq!(labels_of(out, programme), [label("en", "Original")]);
    }
    // every content and object survives
    for entity in ["ACO_1001", "ACO_1002", "ACO_1003", "AO_2001", "AO_2002", "AO_1003"] {
        assert!(out.entity_exists(id(entity)), "{entity}");
    }
    assert!(flattened.report.flow_id_regenerated);
}

#[test]
fn independent_groups_expand_to_their_product() {
    let mut doc = Document::new();
    let objects = ["AO_2001", "AO_2002", "AO_3001", "AO_3002", "AO_3003"];
    let contents = ["ACO_2001", "ACO_2002", "ACO_3001", "ACO_3002", "ACO_3003"];
    for (object, content) in objects.iter().zip(contents) {
        doc.object(object, "Stem");
        doc.content(content, None, &[*object]);
    }
    doc.complementary("AO_2001", &["AO_2002"]);
    doc.complementary("AO_3001", &["AO_3002", "AO_3003"]);
    doc.programme("APR_1001", &contents);

    for strategy in [FlattenStrategy::Emission, FlattenStrategy::Combinatorial] {
        let flattened = with_strategy(strategy).flatten(&doc.graph).expect("flatten");
        let out = &flattened.graph;
        assert_eq!(flattened.report.programmes_out, 6, "{strategy}");

        let selections: BTreeSet<Vec<EntityId>> = programmes(out)
            .into_iter()
            .map(|programme| contents_of(out, programme))
            .collect();
        assert_eq!(selections.len(), 6, "{strategy}");
        for selection in &selections {
            assert_eq!(selection.len(), 2, "{strategy}");
        }
    }
}

#[test]
fn unmatched_group_labels_fall_back_to_the_configured_label() {
    let mut doc = Document::new();
    doc.object("AO_2001", "Dialogue A");
    doc.object("AO_2002", "Dialogue B");
    doc.complementary("AO_2001", &["AO_2002"]);
    doc.group_label("AO_2001", "fr", "Français");
    doc.content("ACO_1001", Some("en"), &["AO_2001"]);
    doc.content("ACO_1002", None, &["AO_2002"]);
    doc.programme("APR_1001", &["ACO_1001", "ACO_1002"]);

    let flattened = flatten(&doc.graph).expect("flatten");
    let out = &flattened.graph;
    for programme in programmes(out) {
        assert_eq!(labels_of(out, programme), [label("und", "None")]);
    }
}

#[test]
fn emission_bakes_alternative_value_sets_into_new_content() {
    let mut doc = Document::new();
    let object = doc.object("AO_1001", "Commentary");
    doc.gain(object, 1.0);
    let avs = doc.graph.next_subcomponent_id(object).expect("avs id");
    doc.graph
        .add_entity_with_relationship(object, avs)
        .expect("avs");
    doc.gain(avs, 0.5);
    doc.content("ACO_1001", Some("en"), &["AO_1001"]);
    for programme in ["APR_1001", "APR_1002"] {
        let programme = doc.programme(programme, &["ACO_1001"]);
        doc.graph.add_relationship(programme, avs).expect("avs ref");
    }

    let flattened = flatten(&doc.graph).expect("flatten");
    let out = &flattened.graph;

    assert_eq!(programmes(out), [id("APR_1001"), id("APR_1002")]);
    assert_eq!(flattened.report.synthesized_contents, 1);
    assert!(flattened.report.flow_id_regenerated);

    let new_content = id("ACO_1002");
    let new_object = id("AO_1002");
    for programme in programmes(out) {
        assert_eq!(contents_of(out, programme), [new_content]);
        assert_eq!(
            out.related_of_type(programme, EntityType::AlternativeValueSet)
                .count(),
            0
        );
    }
    assert_eq!(
        text(out, new_content, AttributeTag::ContentId).as_deref(),
        Some("ACO_1002")
    );
    assert_eq!(
        text(out, new_content, AttributeTag::ContentLanguage).as_deref(),
        Some("en")
    );
    assert_eq!(
        out.related_of_type(new_content, EntityType::Object)
            .collect::<Vec<_>>(),
        [new_object]
    );
    assert_eq!(
        text(out, new_object, AttributeTag::ObjectId).as_deref(),
        Some("AO_1002")
    );
    assert_eq!(
        text(out, new_object, AttributeTag::ObjectName).as_deref(),
        Some("Commentary")
    );
    let gains: Vec<_> = out.related_of_type(new_object, EntityType::Gain).collect();
    assert_eq!(gains.len(), 1);
    assert_eq!(
        out.get_value(gains[0], AttributeTag::GainValue),
        Ok(&AttributeValue::Float(0.5))
    );
    assert!(!out.entity_exists(id("ACO_1001")));
    assert!(!out.entity_exists(id("AO_1001")));
    assert_eq!(out.entity_count(EntityType::AlternativeValueSet), 0);
}

#[test]
fn common_definitions_stay_common() {
    let mut doc = Document::new();
    let pack = id("AP_00031001");
    doc.graph
        .add_entity_with_relationship(doc.afe, pack)
        .expect("pack");
    doc.graph
        .set_value(pack, AttributeTag::PackFormatName, "Objects")
        .expect("pack name");
    doc.graph.set_is_common(pack).expect("common");
    let object = doc.object("AO_1001", "Dialogue");
    doc.graph.add_relationship(object, pack).expect("pack ref");
    doc.content("ACO_1001", None, &["AO_1001"]);
    doc.programme("APR_1001", &["ACO_1001"]);

    let out = flatten(&doc.graph).expect("flatten").graph;
    assert_eq!(out.status(pack), Ok(EntityStatus::CommonDefinition));
    assert!(out.relationship_exists(object, pack));
    assert_eq!(
        text(&out, pack, AttributeTag::PackFormatName).as_deref(),
        Some("Objects")
    );
}

#[test]
fn combinatorial_rejects_an_object_shared_by_two_contents() {
    let mut doc = Document::new();
    doc.object("AO_1001", "Shared");
    doc.content("ACO_1001", None, &["AO_1001"]);
    doc.content("ACO_1002", None, &["AO_1001"]);
    doc.programme("APR_1001", &["ACO_1001", "ACO_1002"]);

    let err = with_strategy(FlattenStrategy::Combinatorial)
        .flatten(&doc.graph)
        .expect_err("shared object");
    assert_eq!(err.graph_kind(), Some(ErrorKind::NotUnique));

    // emission tolerates it
    assert!(flatten(&doc.graph).is_ok());
}

#[test]
fn an_alternative_value_set_outside_the_programme_is_not_found() {
    let mut doc = Document::new();
    doc.object("AO_1001", "Inside");
    let outside = doc.object("AO_1002", "Outside");
    let avs = doc.graph.next_subcomponent_id(outside).expect("avs id");
    doc.graph
        .add_entity_with_relationship(outside, avs)
        .expect("avs");
    doc.content("ACO_1001", None, &["AO_1001"]);
    doc.content("ACO_1002", None, &["AO_1002"]);
    let programme = doc.programme("APR_1001", &["ACO_1001"]);
    doc.graph.add_relationship(programme, avs).expect("avs ref");

    for strategy in [FlattenStrategy::Emission, FlattenStrategy::Combinatorial] {
        let err = with_strategy(strategy)
            .flatten(&doc.graph)
            .expect_err("foreign avs");
        assert_eq!(err.graph_kind(), Some(ErrorKind::NotFound), "{strategy}");
    }
}

#[test]
fn containment_edges_are_mirrored_for_copied_entities() {
    let doc = dialogue_pair();
    let out = flatten(&doc.graph).expect("flatten").graph;
    for record in out.relationships() {
        if record.kind == RelationshipKind::Contains {
            assert_eq!(out.container_of(record.to), Some(record.from));
        }
    }
}

#[test]
fn changed_ids_point_at_the_emitted_programmes() {
    for (strategy, expected) in [
        (FlattenStrategy::Emission, [id("APR_1002"), id("APR_1003")]),
        (FlattenStrategy::Combinatorial, [id("APR_1001"), id("APR_1002")]),
    ] {
        let mut doc = dialogue_pair();
        doc.content("ACO_1009", Some("fr"), &[]);
        doc.changed_ids(&["APR_1001", "ACO_1002", "ACO_1009"]);

        let flattened = with_strategy(strategy)
            .flatten(&doc.graph)
            .expect("flatten");
        let out = &flattened.graph;
        assert_eq!(flattened.report.programmes_out, 2, "{strategy}");
        assert_eq!(programmes(out), expected, "{strategy}");
        assert!(
            out.entities_of(EntityType::Programme)
                .all(|record| record.status != EntityStatus::ForwardReference),
            "{strategy}"
        );

        let changed: Vec<EntityId> = out
            .entities_of(EntityType::ChangedIds)
            .map(|record| record.id)
            .collect();
        assert_eq!(changed.len(), 1, "{strategy}");
        assert_eq!(
            out.related_of_type(changed[0], EntityType::Programme)
                .collect::<Vec<_>>(),
            expected,
            "{strategy}"
        );
        let contents: Vec<EntityId> = out
            .related_of_type(changed[0], EntityType::Content)
            .collect();
        match strategy {
            // ACO_1009 belongs to no programme and is not emitted
            FlattenStrategy::Emission => {
                assert_eq!(contents, [id("ACO_1002")]);
                assert!(!out.entity_exists(id("ACO_1009")));
            }
            FlattenStrategy::Combinatorial => {
                assert_eq!(contents, [id("ACO_1002"), id("ACO_1009")]);
            }
        }
    }
}

#[test]
fn a_programme_holding_only_the_leader_still_expands_its_group() {
    let mut doc = Document::new();
    doc.object("AO_2001", "Dialogue EN");
    doc.object("AO_2002", "Dialogue DE");
    doc.complementary("AO_2001", &["AO_2002"]);
    doc.group_label("AO_2001", "en", "English");
    doc.group_label("AO_2001", "de", "Deutsch");
    doc.content("ACO_1001", Some("en"), &["AO_2001"]);
    doc.content("ACO_1002", Some("de"), &["AO_2002"]);
    doc.programme("APR_1001", &["ACO_1001"]);

    let flattened = flatten(&doc.graph).expect("flatten");
    let out = &flattened.graph;
    assert_eq!(flattened.report.programmes_out, 2);
    assert_eq!(flattened.report.expanded_programmes, 1);
    assert!(flattened.report.flow_id_regenerated);
    assert_eq!(programmes(out), [id("APR_1002"), id("APR_1003")]);
    assert_eq!(contents_of(out, id("APR_1002")), [id("ACO_1001")]);
    assert_eq!(contents_of(out, id("APR_1003")), [id("ACO_1002")]);
    assert_eq!(labels_of(out, id("APR_1002")), [label("en", "English")]);
    assert_eq!(labels_of(out, id("APR_1003")), [label("de", "Deutsch")]);

    let combined = with_strategy(FlattenStrategy::Combinatorial)
        .flatten(&doc.graph)
        .expect("flatten");
    let out = &combined.graph;
    assert_eq!(programmes(out), [id("APR_1001"), id("APR_1002")]);
    assert_eq!(contents_of(out, id("APR_1001")), [id("ACO_1001")]);
    assert_eq!(contents_of(out, id("APR_1002")), [id("ACO_1002")]);
}
