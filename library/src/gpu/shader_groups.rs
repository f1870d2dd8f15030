use crate::cases::stage::StageFlags;
use crate::shader::shader_set::ShaderSet;
use crate::shader::slot::ShaderSlot;

/// Consecutive shader group indices owned by one group class. A zero count
/// marks an absent class; its binding table region stays null.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupRange {
    first_group: u32,
    group_count: u32,
}

impl GroupRange {
    const ABSENT: GroupRange = GroupRange { first_group: u32::MAX, group_count: 0 };

    #[must_use]
    pub fn first_group(&self) -> u32 {
        self.first_group
    }

    #[must_use]
    pub fn group_count(&self) -> u32 {
        self.group_count
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        self.group_count != 0
    }
}

/// Shader group indices of one pipeline, assigned per class in the fixed
/// order raygen, miss, hit, callable. The three hit stages share one group;
/// a secondary shader of a class occupies the group after the primary one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShaderGroupLayout {
    raygen: GroupRange,
    miss: GroupRange,
    hit: GroupRange,
    callable: GroupRange,
    total_group_count: u32,
}

impl ShaderGroupLayout {
    #[must_use]
    pub fn from_shader_set(shaders: &ShaderSet) -> Self {
        let (primary, secondary) = shaders.stage_masks();
        let mut counter = 0;

        let raygen = Self::class_range(&mut counter, primary, secondary, StageFlags::RAYGEN);
        let miss = Self::class_range(&mut counter, primary, secondary, StageFlags::MISS);
        let hit = Self::class_range(&mut counter, primary, secondary, StageFlags::HIT_GROUP_STAGES);
        let callable = Self::class_range(&mut counter, primary, secondary, StageFlags::CALLABLE);

        Self { raygen, miss, hit, callable, total_group_count: counter }
    }

    #[must_use]
    fn class_range(counter: &mut u32, primary: StageFlags, secondary: StageFlags, class: StageFlags) -> GroupRange {
        let primary_count = u32::from(primary.intersects(class));
        let secondary_count = u32::from(secondary.intersects(class));
        let group_count = primary_count + secondary_count;

        if group_count == 0 {
            return GroupRange::ABSENT;
        }

        let first_group = *counter;
        *counter += group_count;

        GroupRange { first_group, group_count }
    }

    /// Group index the shader of the given slot is attached to. The driving
    /// callable shader sits after the callee so the launcher reaches it at
    /// binding table entry 1 while the control flow calls entry 0.
    #[must_use]
    pub fn group_for_slot(&self, slot: ShaderSlot) -> u32 {
        match slot {
            ShaderSlot::Rgen => self.raygen.first_group,
            ShaderSlot::Miss => self.miss.first_group,
            ShaderSlot::Ahit | ShaderSlot::Chit | ShaderSlot::Sect => self.hit.first_group,
            ShaderSlot::Call => self.callable.first_group + 1,
            ShaderSlot::Cal0 => self.callable.first_group,
            ShaderSlot::Miss2 => self.miss.first_group + 1,
            ShaderSlot::Ahit2 | ShaderSlot::Chit2 | ShaderSlot::Sect2 => self.hit.first_group + 1,
        }
    }

    #[must_use]
    pub fn raygen(&self) -> GroupRange {
        self.raygen
    }

    #[must_use]
    pub fn miss(&self) -> GroupRange {
        self.miss
    }

    #[must_use]
    pub fn hit(&self) -> GroupRange {
        self.hit
    }

    #[must_use]
    pub fn callable(&self) -> GroupRange {
        self.callable
    }

    #[must_use]
    pub fn total_group_count(&self) -> u32 {
        self.total_group_count
    }
}
