use crate::cases::stage::StageFlags;
use crate::shader::slot::ShaderSlot;
use crate::shader::source::ShaderCode;
use std::collections::BTreeMap;

/// Complete GLSL source set of one case, keyed by shader slot. Iteration
/// order is the slot declaration order, so dumps are deterministic.
#[derive(Clone, Debug, Default)]
pub struct ShaderSet {
    sources: BTreeMap<ShaderSlot, ShaderCode>,
}

impl ShaderSet {
    #[must_use]
    pub fn new() -> Self {
        Self { sources: BTreeMap::new() }
    }

    pub(crate) fn add(&mut self, slot: ShaderSlot, source: ShaderCode) {
        let previous = self.sources.insert(slot, source);
        assert!(previous.is_none(), "slot {} filled twice", slot.token());
    }

    #[must_use]
    pub fn get(&self, slot: ShaderSlot) -> Option<&ShaderCode> {
        self.sources.get(&slot)
    }

    #[must_use]
    pub fn contains(&self, slot: ShaderSlot) -> bool {
        self.sources.contains_key(&slot)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShaderSlot, &ShaderCode)> {
        self.sources.iter().map(|(slot, source)| (*slot, source))
    }

    /// Stage masks of the primary and secondary slot sets, the input of the
    /// shader group layout computation.
    #[must_use]
    pub fn stage_masks(&self) -> (StageFlags, StageFlags) {
        let mut primary = StageFlags::empty();
        let mut secondary = StageFlags::empty();

        for slot in self.sources.keys() {
            if slot.is_secondary() {
                secondary |= slot.stage().flag();
            } else {
                primary |= slot.stage().flag();
            }
        }

        (primary, secondary)
    }
}
