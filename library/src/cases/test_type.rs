use serde::Serialize;
use strum_macros::{EnumCount, EnumIter};

/// Control flow shape wrapped around the ray tracing call instruction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, EnumCount, EnumIter, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    If,
    Loop,
    Switch,
    LoopDoubleCall,
    LoopDoubleCallSparse,
    NestedLoop,
    NestedLoopBefore,
    NestedLoopAfter,
    FunctionCall,
    NestedFunctionCall,
}

impl TestType {
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            TestType::If => "if",
            TestType::Loop => "loop",
            TestType::Switch => "switch",
            TestType::LoopDoubleCall => "loop_double_call",
            TestType::LoopDoubleCallSparse => "loop_double_call_sparse",
            TestType::NestedLoop => "nested_loop",
            TestType::NestedLoopBefore => "nested_loop_loop_before",
            TestType::NestedLoopAfter => "nested_loop_loop_after",
            TestType::FunctionCall => "function_call",
            TestType::NestedFunctionCall => "nested_function_call",
        }
    }
}
