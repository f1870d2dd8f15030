use crate::cases::stage::{Stage, StageFlags};
use serde::Serialize;
use strum_macros::{EnumCount, EnumIter};

/// Ray tracing call instruction placed inside the generated control flow.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, EnumCount, EnumIter, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestOp {
    ExecuteCallable,
    TraceRay,
    ReportIntersection,
}

impl TestOp {
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            TestOp::ExecuteCallable => "execute_callable",
            TestOp::TraceRay => "trace_ray",
            TestOp::ReportIntersection => "report_intersection",
        }
    }

    /// Stages the operation may legally be issued from. Combinations outside
    /// this mask are rejected at registration time, never at run time.
    #[must_use]
    pub const fn applicable_stages(self) -> StageFlags {
        match self {
            TestOp::ExecuteCallable => StageFlags::RAYGEN
                .union(StageFlags::CLOSEST_HIT)
                .union(StageFlags::MISS)
                .union(StageFlags::CALLABLE),
            TestOp::TraceRay => StageFlags::RAYGEN
                .union(StageFlags::CLOSEST_HIT)
                .union(StageFlags::MISS),
            TestOp::ReportIntersection => StageFlags::INTERSECTION,
        }
    }

    #[must_use]
    pub fn is_applicable_in(self, stage: Stage) -> bool {
        self.applicable_stages().contains(stage.flag())
    }

    /// Report-intersection has no return trip through the payload, so the
    /// callee-side increment never happens for it.
    #[must_use]
    pub const fn mutates_payload_on_return(self) -> bool {
        !matches!(self, TestOp::ReportIntersection)
    }
}
