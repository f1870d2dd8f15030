use bitflags::bitflags;
use serde::Serialize;
use strum_macros::{EnumCount, EnumIter};

bitflags! {
    /// Shader stage bit set, mirroring the pipeline stage mask layout.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct StageFlags: u32 {
        const RAYGEN       = 1 << 0;
        const ANY_HIT      = 1 << 1;
        const CLOSEST_HIT  = 1 << 2;
        const MISS         = 1 << 3;
        const INTERSECTION = 1 << 4;
        const CALLABLE     = 1 << 5;
    }
}

impl StageFlags {
    pub const ALL_RAY_TRACING: StageFlags = StageFlags::all();

    /// Stages sharing one hit shader group in the binding table.
    pub const HIT_GROUP_STAGES: StageFlags = StageFlags::ANY_HIT
        .union(StageFlags::CLOSEST_HIT)
        .union(StageFlags::INTERSECTION);
}

/// Shader stage hosting the control flow under test.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, EnumCount, EnumIter, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Raygen,
    ClosestHit,
    AnyHit,
    Intersection,
    Miss,
    Callable,
}

impl Stage {
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Stage::Raygen => "rgen",
            Stage::ClosestHit => "chit",
            Stage::AnyHit => "ahit",
            Stage::Intersection => "sect",
            Stage::Miss => "miss",
            Stage::Callable => "call",
        }
    }

    #[must_use]
    pub const fn flag(self) -> StageFlags {
        match self {
            Stage::Raygen => StageFlags::RAYGEN,
            Stage::ClosestHit => StageFlags::CLOSEST_HIT,
            Stage::AnyHit => StageFlags::ANY_HIT,
            Stage::Intersection => StageFlags::INTERSECTION,
            Stage::Miss => StageFlags::MISS,
            Stage::Callable => StageFlags::CALLABLE,
        }
    }
}
