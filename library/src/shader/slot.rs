use crate::cases::stage::Stage;
use serde::Serialize;
use strum_macros::{EnumCount, EnumIter};

/// Position of a shader inside the generated source set. Primary slots hold
/// the shader reached through binding table entry 0 of their group; the
/// secondary slots are reached through entry 1 (the `hit_ofs`/`miss` offsets
/// or an explicit callable index).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, EnumCount, EnumIter, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderSlot {
    Rgen,
    Ahit,
    Chit,
    Miss,
    Sect,
    Call,
    Cal0,
    Ahit2,
    Chit2,
    Miss2,
    Sect2,
}

impl ShaderSlot {
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            ShaderSlot::Rgen => "rgen",
            ShaderSlot::Ahit => "ahit",
            ShaderSlot::Chit => "chit",
            ShaderSlot::Miss => "miss",
            ShaderSlot::Sect => "sect",
            ShaderSlot::Call => "call",
            ShaderSlot::Cal0 => "cal0",
            ShaderSlot::Ahit2 => "ahit2",
            ShaderSlot::Chit2 => "chit2",
            ShaderSlot::Miss2 => "miss2",
            ShaderSlot::Sect2 => "sect2",
        }
    }

    #[must_use]
    pub const fn stage(self) -> Stage {
        match self {
            ShaderSlot::Rgen => Stage::Raygen,
            ShaderSlot::Ahit | ShaderSlot::Ahit2 => Stage::AnyHit,
            ShaderSlot::Chit | ShaderSlot::Chit2 => Stage::ClosestHit,
            ShaderSlot::Miss | ShaderSlot::Miss2 => Stage::Miss,
            ShaderSlot::Sect | ShaderSlot::Sect2 => Stage::Intersection,
            ShaderSlot::Call | ShaderSlot::Cal0 => Stage::Callable,
        }
    }

    /// The callable callee `cal0` sits in the secondary set: it occupies the
    /// first callable group while the driving `call` shader, when present,
    /// is placed one group later.
    #[must_use]
    pub const fn is_secondary(self) -> bool {
        matches!(
            self,
            ShaderSlot::Cal0 | ShaderSlot::Ahit2 | ShaderSlot::Chit2 | ShaderSlot::Miss2 | ShaderSlot::Sect2
        )
    }
}
