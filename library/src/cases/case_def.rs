use crate::cases::stage::Stage;
use crate::cases::test_op::TestOp;
use crate::cases::test_type::TestType;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Immutable parameters of one conformance case, fixed at registration time.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CaseDef {
    pub test_type: TestType,
    pub test_op: TestOp,
    pub stage: Stage,
    pub width: u32,
    pub height: u32,
}

impl CaseDef {
    #[must_use]
    pub fn new(test_type: TestType, test_op: TestOp, stage: Stage, width: u32, height: u32) -> Self {
        assert!(width > 0);
        assert!(height > 0);
        Self { test_type, test_op, stage, width, height }
    }

    #[must_use]
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

impl Display for CaseDef {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}.{}.{}",
            self.test_type.token(),
            self.test_op.token(),
            self.stage.token(),
        )
    }
}
