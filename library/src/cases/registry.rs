use crate::cases::case_def::CaseDef;
use crate::cases::stage::Stage;
use crate::cases::test_op::TestOp;
use crate::cases::test_type::TestType;
use serde::Serialize;
use strum::IntoEnumIterator;

const GROUP_NAME: &str = "complexcontrolflow";

const DEFAULT_GRID_WIDTH: u32 = 4;
const DEFAULT_GRID_HEIGHT: u32 = 4;

/// One registered case: the full dotted address plus its parameters.
#[derive(Clone, Debug, Serialize)]
pub struct CaseDescriptor {
    pub name: String,
    pub case: CaseDef,
}

/// Enumerates every legal (test type, operation, stage) combination. Stages
/// outside an operation's applicability mask are skipped here, so an
/// inapplicable combination never reaches shader generation.
#[must_use]
pub fn registered_cases() -> Vec<CaseDescriptor> {
    let mut result = Vec::new();

    for test_type in TestType::iter() {
        for test_op in TestOp::iter() {
            for stage in Stage::iter() {
                if !test_op.is_applicable_in(stage) {
                    continue;
                }

                let case = CaseDef::new(test_type, test_op, stage, DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT);
                result.push(CaseDescriptor { name: format!("{GROUP_NAME}.{case}"), case });
            }
        }
    }

    result
}

#[must_use]
pub fn find_case(name: &str) -> Option<CaseDef> {
    registered_cases()
        .into_iter()
        .find(|descriptor| descriptor.name == name)
        .map(|descriptor| descriptor.case)
}
