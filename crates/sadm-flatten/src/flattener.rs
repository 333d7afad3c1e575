//! Rewrites a graph so that every programme is a single fixed mix.
//!
//! The walk starts at the root and follows containment. Programmes are
//! handled by the active [`FlattenStrategy`]; contents and objects reachable
//! from programmes are copied on demand, everything else is copied as a
//! subtree. Ids of ADM-id types are preserved unless an entity has to be
//! synthesized, generic ids are always re-minted in the output.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

use sadm_graph::{AttributeTag, EntityStatus, GraphContainer, GraphError, RelationshipKind};
use sadm_id::{EntityId, EntityType, compose_untyped};

use crate::config::{FlattenConfig, FlattenStrategy};
use crate::error::FlattenError;
use crate::odometer::Odometer;

/// Counters describing one flatten run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlattenReport {
    pub strategy: FlattenStrategy,
    pub programmes_in: usize,
    pub programmes_out: usize,
    /// Source programmes that were split into variants.
    pub expanded_programmes: usize,
    /// Contents synthesized to bake in an alternative value set.
    pub synthesized_contents: usize,
    pub flow_id_regenerated: bool,
}

/// A flattened graph plus what happened while building it.
#[derive(Debug)]
pub struct Flattened {
    pub graph: GraphContainer,
    pub report: FlattenReport,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileFlattener {
    config: FlattenConfig,
}

impl ProfileFlattener {
    pub fn new(config: FlattenConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FlattenConfig {
        &self.config
    }

    /// Build a new container from `source`. The source is never modified and
    /// any failure discards the partial output.
    pub fn flatten(&self, source: &GraphContainer) -> Result<Flattened, FlattenError> {
        let registry = source.shared_registry();
        let mut dest = match self.config.strategy {
            FlattenStrategy::Emission => GraphContainer::seeded_from(registry, source),
            FlattenStrategy::Combinatorial => GraphContainer::new(registry),
        };
        for entity_type in [EntityType::Programme, EntityType::Content, EntityType::Object] {
            dest.raise_sequence_floor(entity_type, self.config.first_minted_sequence);
        }

        let mut run = Run {
            source,
            dest,
            config: &self.config,
            content_cache: BTreeMap::new(),
            copied_objects: BTreeSet::new(),
            emitted: BTreeMap::new(),
            deferred: Vec::new(),
            expanded_programmes: 0,
            synthesized_contents: 0,
        };
        let root = source.top_level_id();
        run.copy_children(root, root, |_| true)?;
        run.resolve_deferred()?;

        let flow_id_regenerated = if run.expanded_programmes > 0 && self.config.regenerate_flow_id {
            run.regenerate_flow_id()?
        } else {
            false
        };

        let report = FlattenReport {
            strategy: self.config.strategy,
            programmes_in: source.entity_count(EntityType::Programme),
            programmes_out: run.dest.entity_count(EntityType::Programme),
            expanded_programmes: run.expanded_programmes,
            synthesized_contents: run.synthesized_contents,
            flow_id_regenerated,
        };
        info!(
            strategy = %report.strategy,
            programmes_in = report.programmes_in,
            programmes_out = report.programmes_out,
            expanded = report.expanded_programmes,
            "profile flattened"
        );
        Ok(Flattened {
            graph: run.dest,
            report,
        })
    }
}

/// Flatten with the default configuration.
pub fn flatten(source: &GraphContainer) -> Result<Flattened, FlattenError> {
    ProfileFlattener::default().flatten(source)
}

/// What one programme selects, resolved against the source graph.
#[derive(Debug, Default)]
struct ProgrammeLayout {
    contents: Vec<EntityId>,
    /// Objects in programme order.
    objects: Vec<EntityId>,
    content_of: BTreeMap<EntityId, EntityId>,
    /// Complementary groups, leader first. A member outside the programme
    /// brings along the content referencing it; an object belongs to at
    /// most one group.
    groups: Vec<Vec<EntityId>>,
    grouped: BTreeSet<EntityId>,
    /// Alternative value set bound by the programme, keyed by its object.
    alternatives: BTreeMap<EntityId, EntityId>,
}

impl ProgrammeLayout {
    fn content(&self, object: EntityId) -> Result<EntityId, GraphError> {
        self.content_of
            .get(&object)
            .copied()
            .ok_or_else(|| GraphError::Invariant(format!("object {object} has no content")))
    }

    fn has_grouped_object(&self, content: EntityId) -> bool {
        self.grouped
            .iter()
            .any(|object| self.content_of.get(object) == Some(&content))
    }
}

struct Run<'s> {
    source: &'s GraphContainer,
    dest: GraphContainer,
    config: &'s FlattenConfig,
    /// (content, alternative value set or NULL) -> content emitted for it.
    content_cache: BTreeMap<(EntityId, EntityId), EntityId>,
    copied_objects: BTreeSet<EntityId>,
    /// Source programme, content or object -> ids emitted for it.
    emitted: BTreeMap<EntityId, Vec<EntityId>>,
    /// References to programmes, contents and objects, linked once every
    /// programme has been emitted.
    deferred: Vec<(EntityId, EntityId)>,
    expanded_programmes: usize,
    synthesized_contents: usize,
}

fn is_programme_part(entity_type: EntityType) -> bool {
    matches!(
        entity_type,
        EntityType::Programme | EntityType::Content | EntityType::Object
    )
}

impl Run<'_> {
    fn copy_children(
        &mut self,
        source_parent: EntityId,
        dest_parent: EntityId,
        keep: impl Fn(EntityId) -> bool,
    ) -> Result<(), GraphError> {
        let source = self.source;
        for child in source
            .related(source_parent, RelationshipKind::Contains)
            .filter(|child| keep(*child))
        {
            self.process_child(child, dest_parent)?;
        }
        Ok(())
    }

    fn process_child(&mut self, child: EntityId, dest_parent: EntityId) -> Result<(), GraphError> {
        use EntityType as E;
        match (self.config.strategy, child.entity_type()) {
            (FlattenStrategy::Emission, E::Programme) => self.emit_programme(child, dest_parent),
            (FlattenStrategy::Combinatorial, E::Programme) => {
                self.combine_programme(child, dest_parent)
            }
            // reached through programmes, or consumed by them
            (
                FlattenStrategy::Emission,
                E::Content | E::Object | E::AlternativeValueSet | E::ComplementaryObjectGroupLabel,
            ) => Ok(()),
            (
                FlattenStrategy::Combinatorial,
                E::ComplementaryObjectRef | E::ComplementaryObjectGroupLabel,
            ) => Ok(()),
            _ => {
                let copied = self.copy_subtree(child, dest_parent)?;
                self.restore_common(child, copied)
            }
        }
    }

    /// Id to use in the output: preserved for ADM-id types, minted otherwise.
    fn output_id(&mut self, id: EntityId) -> Result<EntityId, GraphError> {
        let entity_type = id.entity_type();
        if entity_type.has_adm_id() {
            Ok(id)
        } else {
            self.dest.generic_id(entity_type)
        }
    }

    fn copy_subtree(&mut self, id: EntityId, dest_parent: EntityId) -> Result<EntityId, GraphError> {
        let copied = self.output_id(id)?;
        self.copy_entity(id, copied, dest_parent, |_| true, |_| true)?;
        self.copy_references(id, copied)?;
        self.note_emitted(id, copied);
        Ok(copied)
    }

    fn note_emitted(&mut self, id: EntityId, emitted: EntityId) {
        if is_programme_part(id.entity_type()) {
            self.emitted.entry(id).or_default().push(emitted);
        }
    }

    /// Create `copied`, copy the kept attributes of `id` onto it, hang it off
    /// `dest_parent` and process the kept children.
    fn copy_entity(
        &mut self,
        id: EntityId,
        copied: EntityId,
        dest_parent: EntityId,
        keep_child: impl Fn(EntityId) -> bool,
        keep_attribute: impl Fn(AttributeTag) -> bool,
    ) -> Result<(), GraphError> {
        self.dest.add_entity(copied)?;
        self.copy_attributes(id, copied, keep_attribute)?;
        self.dest.add_relationship(dest_parent, copied)?;
        self.copy_children(id, copied, keep_child)
    }

    fn copy_attributes(
        &mut self,
        id: EntityId,
        copied: EntityId,
        keep: impl Fn(AttributeTag) -> bool,
    ) -> Result<(), GraphError> {
        let source = self.source;
        let record = source
            .entity(id)
            .ok_or_else(|| GraphError::NotFound(format!("entity {id}")))?;
        for (tag, value) in record.attributes().filter(|(tag, _)| keep(*tag)) {
            self.dest.set_value(copied, tag, value.clone())?;
        }
        Ok(())
    }

    /// Mirror the outgoing references of `id`. Other targets not yet copied
    /// are left as forward references; programmes, contents and objects
    /// wait for [`Run::resolve_deferred`] since their output ids are only
    /// known once they are emitted.
    fn copy_references(&mut self, id: EntityId, copied: EntityId) -> Result<(), GraphError> {
        let source = self.source;
        for target in source.related(id, RelationshipKind::References) {
            if is_programme_part(target.entity_type()) {
                self.deferred.push((copied, target));
            } else {
                self.reference(copied, target)?;
            }
        }
        Ok(())
    }

    /// Point each deferred reference at whatever was emitted for its
    /// target: the same id, a renumbered programme or every variant of an
    /// expanded one. Targets that were never emitted are dropped.
    fn resolve_deferred(&mut self) -> Result<(), GraphError> {
        for (from, target) in std::mem::take(&mut self.deferred) {
            let Some(outputs) = self.emitted.get(&target) else {
                debug!(%from, %target, "reference to an entity that was not emitted dropped");
                continue;
            };
            for &output in outputs {
                self.dest.add_relationship(from, output)?;
            }
        }
        Ok(())
    }

    fn reference(&mut self, from: EntityId, to: EntityId) -> Result<(), GraphError> {
        self.dest.add_entity(to)?;
        self.dest.add_relationship(from, to)
    }

    fn restore_common(&mut self, id: EntityId, copied: EntityId) -> Result<(), GraphError> {
        if self.source.status(id)? == EntityStatus::CommonDefinition {
            self.dest.set_is_common(copied)?;
        }
        Ok(())
    }

    /// Copy each object once, together with every object it references.
    fn copy_objects(
        &mut self,
        roots: impl IntoIterator<Item = EntityId>,
        dest_parent: EntityId,
    ) -> Result<(), GraphError> {
        let source = self.source;
        let mut pending: Vec<EntityId> = roots.into_iter().collect();
        while let Some(object) = pending.pop() {
            if !self.copied_objects.insert(object) {
                continue;
            }
            let copied = self.copy_subtree(object, dest_parent)?;
            self.restore_common(object, copied)?;
            pending.extend(source.related_of_type(object, EntityType::Object));
        }
        Ok(())
    }

    fn layout(&self, programme: EntityId) -> Result<ProgrammeLayout, GraphError> {
        let source = self.source;
        let mut layout = ProgrammeLayout::default();

        for content in source.related_of_type(programme, EntityType::Content) {
            layout.contents.push(content);
            for object in source.related_of_type(content, EntityType::Object) {
                if let Some(first) = layout.content_of.get(&object) {
                    if self.config.strategy == FlattenStrategy::Combinatorial {
                        return Err(GraphError::NotUnique(format!(
                            "object {object} is referenced by both {first} and {content}"
                        )));
                    }
                    continue;
                }
                layout.content_of.insert(object, content);
                layout.objects.push(object);
            }
        }

        for avs in source.related_of_type(programme, EntityType::AlternativeValueSet) {
            let owner = source
                .container_of(avs)
                .filter(|object| layout.content_of.contains_key(object))
                .ok_or_else(|| {
                    GraphError::NotFound(format!(
                        "alternative value set {avs} is not owned by an object of {programme}"
                    ))
                })?;
            layout.alternatives.insert(owner, avs);
        }

        for &leader in &layout.objects {
            if layout.grouped.contains(&leader) {
                continue;
            }
            let mut members = vec![leader];
            for reference in source.related_of_type(leader, EntityType::ComplementaryObjectRef) {
                let Some(member) = source
                    .value(reference, AttributeTag::ComplementaryObjectIdRef)?
                    .and_then(|value| value.as_ref_id())
                else {
                    continue;
                };
                if layout.grouped.contains(&member) || members.contains(&member) {
                    continue;
                }
                if !layout.content_of.contains_key(&member) {
                    let Some(content) = source.related_of_type(member, EntityType::Content).next()
                    else {
                        debug!(%leader, %member, "complementary object has no content, skipped");
                        continue;
                    };
                    layout.content_of.insert(member, content);
                }
                members.push(member);
            }
            if members.len() > 1 {
                layout.grouped.extend(members.iter().copied());
                layout.groups.push(members);
            }
        }
        Ok(layout)
    }

    fn text(&self, id: EntityId, tag: AttributeTag) -> Result<Option<String>, GraphError> {
        Ok(self
            .source
            .value(id, tag)?
            .and_then(|value| value.as_str())
            .map(str::to_string))
    }

    /// First defined, non-undefined language among `contents`.
    fn first_language(&self, contents: &[EntityId]) -> Result<Option<String>, GraphError> {
        for &content in contents {
            if let Some(language) = self.text(content, AttributeTag::ContentLanguage)? {
                if !language.is_empty() && language != self.config.undefined_language {
                    return Ok(Some(language));
                }
            }
        }
        Ok(None)
    }

    fn stamp_programme_id(&mut self, programme: EntityId, copied: EntityId) -> Result<(), GraphError> {
        if self.source.value(programme, AttributeTag::ProgrammeId)?.is_some() {
            self.dest
                .set_value(copied, AttributeTag::ProgrammeId, copied.to_string())?;
        }
        Ok(())
    }

    fn emit_programme(&mut self, programme: EntityId, dest_parent: EntityId) -> Result<(), GraphError> {
        let layout = self.layout(programme)?;
        if !layout.groups.is_empty() {
            return self.emit_variants(programme, dest_parent, &layout);
        }

        self.copy_entity(programme, programme, dest_parent, |_| true, |_| true)?;
        self.note_emitted(programme, programme);
        for &content in &layout.contents {
            self.attach_content(programme, content, dest_parent, &layout)?;
        }
        if !layout.alternatives.is_empty() {
            self.expanded_programmes += 1;
        }
        self.restore_common(programme, programme)
    }

    /// One programme per combination of group members, each labelled from
    /// the chosen member's group label.
    fn emit_variants(
        &mut self,
        programme: EntityId,
        dest_parent: EntityId,
        layout: &ProgrammeLayout,
    ) -> Result<(), GraphError> {
        let fixed: Vec<EntityId> = layout
            .contents
            .iter()
            .copied()
            .filter(|content| !layout.has_grouped_object(*content))
            .collect();
        let odometer = Odometer::new(layout.groups.iter().map(Vec::len).collect());
        debug!(%programme, variants = odometer.combinations(), "expanding programme");

        for choice in odometer {
            let variant = self.dest.generic_id(EntityType::Programme)?;
            self.copy_entity(
                programme,
                variant,
                dest_parent,
                |child| child.entity_type() != EntityType::ProgrammeLabel,
                |tag| tag != AttributeTag::ProgrammeId && tag != AttributeTag::ProgrammeLanguage,
            )?;
            self.stamp_programme_id(programme, variant)?;
            self.note_emitted(programme, variant);
            for &content in &fixed {
                self.attach_content(variant, content, dest_parent, layout)?;
            }

            let mut chosen = Vec::with_capacity(choice.len());
            for (group, &index) in layout.groups.iter().zip(&choice) {
                let member = group[index];
                let content = layout.content(member)?;
                self.attach_content(variant, content, dest_parent, layout)?;
                self.add_group_label(variant, group, member, content)?;
                chosen.push(content);
            }
            if let Some(language) = self.first_language(&chosen)? {
                self.dest
                    .set_value(variant, AttributeTag::ProgrammeLanguage, language)?;
            }
        }
        self.expanded_programmes += 1;
        Ok(())
    }

    /// Label `variant` with the group label matching the chosen content's
    /// language, looking at the member's labels before the leader's.
    fn add_group_label(
        &mut self,
        variant: EntityId,
        group: &[EntityId],
        member: EntityId,
        content: EntityId,
    ) -> Result<(), GraphError> {
        let source = self.source;
        let mut found = None;
        if let Some(language) = self.text(content, AttributeTag::ContentLanguage)? {
            let mut owners = vec![member];
            if group[0] != member {
                owners.push(group[0]);
            }
            'search: for owner in owners {
                for label in source.related_of_type(owner, EntityType::ComplementaryObjectGroupLabel) {
                    let label_language =
                        self.text(label, AttributeTag::ComplementaryObjectGroupLabelLanguage)?;
                    if label_language.as_deref() == Some(language.as_str()) {
                        let text = self
                            .text(label, AttributeTag::ComplementaryObjectGroupLabelValue)?
                            .unwrap_or_default();
                        found = Some((language.clone(), text));
                        break 'search;
                    }
                }
            }
        }

        let (language, text) = match found {
            Some(label) => label,
            None => {
                warn!(%variant, %member, "no group label matches the content language");
                (
                    self.config.undefined_language.clone(),
                    self.config.fallback_label.clone(),
                )
            }
        };
        let label = self.dest.generic_id(EntityType::ProgrammeLabel)?;
        self.dest.add_entity_with_relationship(variant, label)?;
        self.dest
            .set_value(label, AttributeTag::ProgrammeLabelLanguage, language)?;
        self.dest
            .set_value(label, AttributeTag::ProgrammeLabelValue, text)
    }

    /// Copy `content` (or its alternative-value-set variant) and reference
    /// it from `programme`.
    fn attach_content(
        &mut self,
        programme: EntityId,
        content: EntityId,
        dest_parent: EntityId,
        layout: &ProgrammeLayout,
    ) -> Result<(), GraphError> {
        let source = self.source;
        let alternative = source
            .related_of_type(content, EntityType::Object)
            .find_map(|object| layout.alternatives.get(&object).copied());
        let attached = match alternative {
            Some(avs) => self.content_with_alternative(content, avs, dest_parent)?,
            None => self.plain_content(content, dest_parent)?,
        };
        self.dest.add_relationship(programme, attached)
    }

    fn plain_content(&mut self, content: EntityId, dest_parent: EntityId) -> Result<EntityId, GraphError> {
        let key = (content, EntityId::NULL);
        if let Some(&done) = self.content_cache.get(&key) {
            return Ok(done);
        }
        let source = self.source;
        let copied = self.copy_subtree(content, dest_parent)?;
        self.restore_common(content, copied)?;
        self.copy_objects(source.related_of_type(content, EntityType::Object), dest_parent)?;
        self.content_cache.insert(key, copied);
        Ok(copied)
    }

    /// New content and object with the alternative value set's children
    /// replacing the object's children of the same type.
    fn content_with_alternative(
        &mut self,
        content: EntityId,
        avs: EntityId,
        dest_parent: EntityId,
    ) -> Result<EntityId, GraphError> {
        let key = (content, avs);
        if let Some(&done) = self.content_cache.get(&key) {
            return Ok(done);
        }
        let source = self.source;
        let object = source
            .container_of(avs)
            .ok_or_else(|| GraphError::NotFound(format!("owner of {avs}")))?;

        let new_content = self.dest.generic_id(EntityType::Content)?;
        self.copy_entity(content, new_content, dest_parent, |_| true, |_| true)?;
        self.dest
            .set_value(new_content, AttributeTag::ContentId, new_content.to_string())?;

        let new_object = self.dest.generic_id(EntityType::Object)?;
        self.dest.add_entity(new_object)?;
        self.copy_attributes(object, new_object, |_| true)?;
        self.dest
            .set_value(new_object, AttributeTag::ObjectId, new_object.to_string())?;
        self.dest.add_relationship(dest_parent, new_object)?;
        self.copy_references(object, new_object)?;

        let mut overridden = BTreeSet::new();
        for child in source.related(avs, RelationshipKind::Contains) {
            overridden.insert(child.entity_type());
            self.copy_subtree(child, new_object)?;
        }
        for child in source.related(object, RelationshipKind::Contains) {
            let child_type = child.entity_type();
            if child_type == EntityType::AlternativeValueSet || overridden.contains(&child_type) {
                continue;
            }
            self.copy_subtree(child, new_object)?;
        }
        self.copy_objects(source.related_of_type(object, EntityType::Object), dest_parent)?;

        self.dest.add_relationship(new_content, new_object)?;
        let siblings: Vec<EntityId> = source
            .related_of_type(content, EntityType::Object)
            .filter(|sibling| *sibling != object)
            .collect();
        self.copy_objects(siblings.iter().copied(), dest_parent)?;
        for sibling in siblings {
            self.dest.add_relationship(new_content, sibling)?;
        }

        debug!(%content, %avs, %new_content, %new_object, "alternative value set applied");
        self.synthesized_contents += 1;
        self.content_cache.insert(key, new_content);
        Ok(new_content)
    }

    fn combine_programme(&mut self, programme: EntityId, dest_parent: EntityId) -> Result<(), GraphError> {
        let layout = self.layout(programme)?;
        if layout.groups.is_empty() {
            let renumbered = self.dest.generic_id(EntityType::Programme)?;
            self.copy_entity(
                programme,
                renumbered,
                dest_parent,
                |_| true,
                |tag| tag != AttributeTag::ProgrammeId,
            )?;
            self.stamp_programme_id(programme, renumbered)?;
            self.note_emitted(programme, renumbered);
            return self.copy_references(programme, renumbered);
        }

        let standalone: Vec<EntityId> = layout
            .objects
            .iter()
            .copied()
            .filter(|object| !layout.grouped.contains(object))
            .collect();
        let odometer = Odometer::new(layout.groups.iter().map(Vec::len).collect());
        debug!(%programme, variants = odometer.combinations(), "expanding programme");

        for choice in odometer {
            let variant = self.dest.generic_id(EntityType::Programme)?;
            self.copy_entity(
                programme,
                variant,
                dest_parent,
                |_| true,
                |tag| tag != AttributeTag::ProgrammeId && tag != AttributeTag::ProgrammeLanguage,
            )?;
            self.stamp_programme_id(programme, variant)?;
            self.note_emitted(programme, variant);

            let chosen = standalone.iter().copied().chain(
                layout
                    .groups
                    .iter()
                    .zip(&choice)
                    .map(|(group, &index)| group[index]),
            );
            let mut contents = Vec::new();
            for object in chosen {
                let content = layout.content(object)?;
                self.reference(variant, content)?;
                if !contents.contains(&content) {
                    contents.push(content);
                }
                if let Some(&avs) = layout.alternatives.get(&object) {
                    self.reference(variant, avs)?;
                }
            }
            let language = self
                .first_language(&contents)?
                .unwrap_or_else(|| self.config.undefined_language.clone());
            self.dest
                .set_value(variant, AttributeTag::ProgrammeLanguage, language)?;
        }
        self.expanded_programmes += 1;
        Ok(())
    }

    /// Write a fresh random flow id on the first frame format, when the
    /// output has one.
    fn regenerate_flow_id(&mut self) -> Result<bool, GraphError> {
        let frame_format = compose_untyped(EntityType::FrameFormat, 1, 0)?;
        if !self.dest.entity_exists(frame_format) {
            debug!("no frame format, flow id left alone");
            return Ok(false);
        }
        let flow_id = Uuid::new_v4().hyphenated().to_string();
        self.dest
            .set_value(frame_format, AttributeTag::FrameFormatFlowId, flow_id.clone())?;
        info!(%flow_id, "flow id regenerated");
        Ok(true)
    }
}
