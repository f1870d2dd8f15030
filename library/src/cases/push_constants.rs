use crate::cases::test_type::TestType;
use bytemuck::{Pod, Zeroable};
use serde::Serialize;

/// Small integer constants parameterizing the generated control flow: trip
/// counts, bit masks and the two shader binding table offsets. Pushed to all
/// ray tracing stages and consumed identically by the host oracle.
#[repr(C)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Pod, Zeroable, Serialize)]
pub struct PushConstants {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub d: u32,
    pub hit_ofs: u32,
    pub miss: u32,
}

impl PushConstants {
    pub const MEMBER_COUNT: usize = 6;

    #[must_use]
    pub const fn for_test_type(test_type: TestType) -> Self {
        let hit_ofs = 1;
        let miss = 1;

        match test_type {
            TestType::If => Self { a: 32 | 8 | 1, b: 10000, c: 0x0F, d: 0xF0, hit_ofs, miss },
            TestType::Loop => Self { a: 8, b: 10000, c: 0x0F, d: 100000, hit_ofs, miss },
            TestType::Switch => Self { a: 3, b: 10000, c: 0x07, d: 100000, hit_ofs, miss },
            TestType::LoopDoubleCall => Self { a: 7, b: 10000, c: 0x0F, d: 0xF0, hit_ofs, miss },
            TestType::LoopDoubleCallSparse => Self { a: 16, b: 5, c: 0x0F, d: 0xF0, hit_ofs, miss },
            TestType::NestedLoop => Self { a: 8, b: 5, c: 0x0F, d: 0x09, hit_ofs, miss },
            TestType::NestedLoopBefore => Self { a: 9, b: 16, c: 0x0F, d: 10, hit_ofs, miss },
            TestType::NestedLoopAfter => Self { a: 9, b: 16, c: 0x0F, d: 10, hit_ofs, miss },
            TestType::FunctionCall => Self { a: 0xFFB, b: 16, c: 10, d: 100000, hit_ofs, miss },
            TestType::NestedFunctionCall => Self { a: 0xFFB, b: 16, c: 10, d: 100000, hit_ofs, miss },
        }
    }

    /// Member values in declaration order, matching the layout of the
    /// push constant block in the generated shaders.
    #[must_use]
    pub const fn as_array(&self) -> [u32; Self::MEMBER_COUNT] {
        [self.a, self.b, self.c, self.d, self.hit_ofs, self.miss]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    const SLOT_A: usize = 0;
    const SLOT_B: usize = 1;
    const SLOT_C: usize = 2;
    const SLOT_D: usize = 3;
    const SLOT_HIT_OFS: usize = 4;
    const SLOT_MISS: usize = 5;

    #[rstest]
    #[case(TestType::If, 41, 10000, 0x0F, 0xF0)]
    #[case(TestType::Loop, 8, 10000, 0x0F, 100000)]
    #[case(TestType::Switch, 3, 10000, 0x07, 100000)]
    #[case(TestType::LoopDoubleCall, 7, 10000, 0x0F, 0xF0)]
    #[case(TestType::LoopDoubleCallSparse, 16, 5, 0x0F, 0xF0)]
    #[case(TestType::NestedLoop, 8, 5, 0x0F, 0x09)]
    #[case(TestType::NestedLoopBefore, 9, 16, 0x0F, 10)]
    #[case(TestType::NestedLoopAfter, 9, 16, 0x0F, 10)]
    #[case(TestType::FunctionCall, 0xFFB, 16, 10, 100000)]
    #[case(TestType::NestedFunctionCall, 0xFFB, 16, 10, 100000)]
    fn test_derivation_table(
        #[case] test_type: TestType,
        #[case] a: u32,
        #[case] b: u32,
        #[case] c: u32,
        #[case] d: u32,
    ) {
        let system_under_test = PushConstants::for_test_type(test_type);

        assert_eq!(system_under_test.a, a);
        assert_eq!(system_under_test.b, b);
        assert_eq!(system_under_test.c, c);
        assert_eq!(system_under_test.d, d);
    }

    #[test]
    fn test_table_offsets_are_always_one() {
        for test_type in TestType::iter() {
            let constants = PushConstants::for_test_type(test_type);
            assert_eq!(constants.hit_ofs, 1);
            assert_eq!(constants.miss, 1);
        }
    }

    #[test]
    fn test_byte_layout_matches_member_order() {
        let system_under_test = PushConstants::for_test_type(TestType::If);

        let words: &[u32] = bytemuck::cast_slice(bytemuck::bytes_of(&system_under_test));
        assert_eq!(words.len(), PushConstants::MEMBER_COUNT);
        assert_eq!(words[SLOT_A], system_under_test.a);
        assert_eq!(words[SLOT_B], system_under_test.b);
        assert_eq!(words[SLOT_C], system_under_test.c);
        assert_eq!(words[SLOT_D], system_under_test.d);
        assert_eq!(words[SLOT_HIT_OFS], system_under_test.hit_ofs);
        assert_eq!(words[SLOT_MISS], system_under_test.miss);
    }
}
