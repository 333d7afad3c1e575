//! Per-type sequence counters for minting fresh ids.

use sadm_id::{
    EntityId, EntityType, IdFields, compose_generic, compose_subcomponent, compose_typed,
    compose_untyped,
};
use std::collections::BTreeMap;

use crate::error::GraphError;

/// First `xw` number handed out for programmes, contents, objects and the
/// other single-number ADM id families (`APR_1001`, ...).
pub const FIRST_ADM_SEQUENCE: u64 = 0x1001;

/// Monotonic counters: one per entity type, plus one per subcomponent parent.
#[derive(Debug, Clone, Default)]
pub struct SequenceMap {
    next: BTreeMap<EntityType, u64>,
    subcomponents: BTreeMap<EntityId, u32>,
}

fn first_sequence(entity_type: EntityType) -> u64 {
    if entity_type.is_untyped_xw() {
        FIRST_ADM_SEQUENCE
    } else {
        1
    }
}

/// Parent of a subcomponent id (block format -> channel format,
/// alternative value set -> object) and its sub-sequence.
fn subcomponent_parent(id: EntityId) -> Option<(EntityId, u32)> {
    match id.fields().ok()? {
        IdFields::Typed {
            entity_type: EntityType::BlockFormat,
            audio_type,
            sequence,
            sub,
        } => {
            let parent = compose_typed(EntityType::ChannelFormat, audio_type, sequence, 0).ok()?;
            Some((parent, sub))
        }
        IdFields::AltValueSet { sequence, sub } => {
            let parent = compose_untyped(EntityType::Object, u64::from(sequence), 0).ok()?;
            Some((parent, u32::from(sub)))
        }
        _ => None,
    }
}

impl SequenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sequence [`SequenceMap::next`] would return for `entity_type`.
    pub fn peek(&self, entity_type: EntityType) -> u64 {
        self.next
            .get(&entity_type)
            .copied()
            .unwrap_or_else(|| first_sequence(entity_type))
    }

    /// Return the current sequence for `entity_type` and advance it.
    pub fn next(&mut self, entity_type: EntityType) -> u64 {
        let slot = self
            .next
            .entry(entity_type)
            .or_insert_with(|| first_sequence(entity_type));
        let current = *slot;
        *slot += 1;
        current
    }

    /// Never hand out `floor - 1` or anything below it for `entity_type`.
    pub fn raise_floor(&mut self, entity_type: EntityType, floor: u64) {
        let slot = self
            .next
            .entry(entity_type)
            .or_insert_with(|| first_sequence(entity_type));
        *slot = (*slot).max(floor);
    }

    /// Advance counters past an id that already exists.
    pub fn observe(&mut self, id: EntityId) {
        if let Some(sequence) = id.sequence() {
            self.raise_floor(id.entity_type(), sequence.saturating_add(1));
        }
        if let Some((parent, sub)) = subcomponent_parent(id) {
            let slot = self.subcomponents.entry(parent).or_insert(1);
            *slot = (*slot).max(sub.saturating_add(1));
        }
    }

    /// Mint the next id of `entity_type` for which `taken` is false.
    ///
    /// Generic types get `tag + sequence`; single-number ADM families get
    /// `xw = sequence`. Typed formats need an audio type and cannot be
    /// minted here.
    pub fn mint(
        &mut self,
        entity_type: EntityType,
        taken: impl Fn(EntityId) -> bool,
    ) -> Result<EntityId, GraphError> {
        if !entity_type.is_generic() && !entity_type.is_untyped_xw() {
            return Err(GraphError::InvalidArgument(format!(
                "cannot mint ids for {entity_type}"
            )));
        }
        loop {
            let sequence = self.next(entity_type);
            let id = if entity_type.is_generic() {
                let sequence = u32::try_from(sequence).map_err(|_| {
                    GraphError::InvalidArgument(format!("{entity_type} sequence exhausted"))
                })?;
                compose_generic(entity_type, sequence)?
            } else {
                compose_untyped(entity_type, sequence, 0)?
            };
            if !taken(id) {
                return Ok(id);
            }
        }
    }

    /// Mint the next subcomponent of `parent` for which `taken` is false.
    pub fn mint_subcomponent(
        &mut self,
        parent: EntityId,
        taken: impl Fn(EntityId) -> bool,
    ) -> Result<EntityId, GraphError> {
        loop {
            let slot = self.subcomponents.entry(parent).or_insert(1);
            let sub = *slot;
            *slot = sub.checked_add(1).ok_or_else(|| {
                GraphError::InvalidArgument(format!("subcomponents of {parent} exhausted"))
            })?;
            let id = compose_subcomponent(parent, sub)?;
            if !taken(id) {
                return Ok(id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.next.clear();
        self.subcomponents.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sadm_id::parse_id_string;

    #[test]
    fn adm_families_start_at_0x1001() {
        let mut sequences = SequenceMap::new();
        assert_eq!(sequences.next(EntityType::Programme), 0x1001);
        assert_eq!(sequences.next(EntityType::Programme), 0x1002);
        assert_eq!(sequences.next(EntityType::Gain), 1);
        assert_eq!(sequences.peek(EntityType::Content), 0x1001);
    }

    #[test]
    fn observe_only_moves_forward() {
        let mut sequences = SequenceMap::new();
        sequences.observe(parse_id_string("AO_1005"));
        sequences.observe(parse_id_string("AO_1002"));
        assert_eq!(sequences.peek(EntityType::Object), 0x1006);
    }

    #[test]
    fn mint_skips_taken_ids() {
        let mut sequences = SequenceMap::new();
        let taken = parse_id_string("APR_1001");
        let id = sequences
            .mint(EntityType::Programme, |id| id == taken)
            .expect("mint programme");
        assert_eq!(id, parse_id_string("APR_1002"));
    }

    #[test]
    fn typed_formats_cannot_be_minted() {
        let err = SequenceMap::new()
            .mint(EntityType::ChannelFormat, |_| false)
            .expect_err("typed format");
        assert!(matches!(err, GraphError::InvalidArgument(_)));
    }

    #[test]
    fn subcomponents_count_per_parent_and_observe_existing_children() {
        let mut sequences = SequenceMap::new();
        let channel = parse_id_string("AC_00031001");
        sequences.observe(parse_id_string("AB_00031001_00000002"));
        let block = sequences
            .mint_subcomponent(channel, |_| false)
            .expect("block");
        assert_eq!(block, parse_id_string("AB_00031001_00000003"));

        let object = parse_id_string("AO_1001");
        let avs = sequences
            .mint_subcomponent(object, |_| false)
            .expect("alternative value set");
        assert_eq!(avs, parse_id_string("AVS_1001_0001"));
    }
}
