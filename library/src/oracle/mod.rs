//! Host-side re-execution of the generated control flow. Each function here
//! mirrors, by name, the shader template of the same shape; the two encodings
//! are kept deliberately independent so a defect in either shows up as a
//! comparison failure.

use crate::cases::case_def::CaseDef;
use crate::cases::push_constants::PushConstants;
use crate::cases::test_type::TestType;
use crate::gpu::result_image::{DEFAULT_CLEAR_VALUE, PIXEL_ID_SLICE, RESULT_IMAGE_DEPTH, ring_slice};

/// Computes the exact texel values a conformant device must produce for the
/// case: `width*height*16` words, row-major, x fastest. Pure function of the
/// case definition.
#[must_use]
pub fn expected_values(case: &CaseDef) -> Vec<u32> {
    let p = PushConstants::for_test_type(case.test_type);
    let plain_size = case.pixel_count();
    let fixed = !case.test_op.mutates_payload_on_return();
    let mut result = vec![DEFAULT_CLEAR_VALUE; (plain_size * RESULT_IMAGE_DEPTH) as usize];

    {
        let shape = Shape { p: &p, plain_size, fixed, result: &mut result };

        match case.test_type {
            TestType::If => control_flow_if(shape),
            TestType::Loop => control_flow_loop(shape),
            TestType::Switch => control_flow_switch(shape),
            TestType::LoopDoubleCall => control_flow_loop_double_call(shape),
            TestType::LoopDoubleCallSparse => control_flow_loop_double_call_sparse(shape),
            TestType::NestedLoop => control_flow_nested_loop(shape),
            TestType::NestedLoopBefore => control_flow_nested_loop_before(shape),
            TestType::NestedLoopAfter => control_flow_nested_loop_after(shape),
            TestType::FunctionCall => control_flow_function_call(shape),
            TestType::NestedFunctionCall => control_flow_nested_function_call(shape),
        }
    }

    let pixel_id_offset = (PIXEL_ID_SLICE * plain_size) as usize;
    for id in 0..plain_size {
        result[pixel_id_offset + id as usize] = id;
    }

    for (slice, constant) in p.as_array().iter().enumerate() {
        let start = (slice + 1) * plain_size as usize;
        result[start..start + plain_size as usize].fill(*constant);
    }

    result
}

/// Per-shape working state: the push constants, the pixel count of one
/// slice, the report-intersection flag suppressing the post-call increment,
/// and the output array being filled.
struct Shape<'a> {
    p: &'a PushConstants,
    plain_size: u32,
    fixed: bool,
    result: &'a mut [u32],
}

/// Texel index of the ring slice the callee selects when it observes the
/// payload tag `tag` from the invocation `id`.
#[must_use]
fn ring_index(plain_size: u32, tag: u32, id: u32) -> usize {
    (ring_slice(tag) * plain_size + id) as usize
}

fn control_flow_if(shape: Shape<'_>) {
    let Shape { p, plain_size, fixed, result } = shape;

    for id in 0..plain_size {
        let ring = ring_index(plain_size, 0, id);
        let v2 = p.b;
        let v3 = p.b;
        let mut v0;
        let mut v1;

        if (p.a & id) != 0 {
            v0 = p.c & id;
            v1 = (p.d & id) + 1;

            result[ring] = v0;
            if !fixed {
                v0 += 1;
            }
        } else {
            v0 = p.d & id;
            v1 = (p.c & id) + 1;

            if !fixed {
                result[ring] = v1;
                v1 += 1;
            } else {
                result[ring] = v0;
            }
        }

        result[id as usize] = v0 + v1 + v2 + v3;
    }
}

fn control_flow_loop(shape: Shape<'_>) {
    let Shape { p, plain_size, fixed, result } = shape;

    for id in 0..plain_size {
        result[id as usize] = 0;

        let v1 = p.b;
        let v3 = p.b;

        for n in 0..p.a {
            let mut v0 = (p.c & id) + n;

            result[ring_index(plain_size, n, id)] = v0;
            if !fixed {
                v0 += 1;
            }

            result[id as usize] += v0 + v1 + v3;
        }
    }
}

fn control_flow_switch(shape: Shape<'_>) {
    let Shape { p, plain_size, fixed, result } = shape;

    for id in 0..plain_size {
        let ring = ring_index(plain_size, 0, id);
        let (v0, v1, v2, v3) = match p.a & id {
            0 => (p.c & id, p.b, p.b, p.b),
            1 => (p.b, p.c & id, p.b, p.b),
            2 => (p.b, p.b, p.c & id, p.b),
            3 => (p.b, p.b, p.b, p.c & id),
            _ => (0, 0, 0, 0),
        };

        result[ring] = if fixed { v0 } else { p.c & id };

        result[id as usize] = v0 + v1 + v2 + v3;

        if !fixed {
            result[id as usize] += 1;
        }
    }
}

fn control_flow_loop_double_call(shape: Shape<'_>) {
    let Shape { p, plain_size, fixed, result } = shape;

    for id in 0..plain_size {
        result[id as usize] = 0;

        let v3 = p.b;

        for x in 0..p.a {
            let mut v0 = (p.c & id) + x;
            let mut v1 = (p.d & id) + x + 1;

            result[ring_index(plain_size, 2 * x, id)] = v0;
            if !fixed {
                v0 += 1;
            }

            if !fixed {
                result[ring_index(plain_size, 2 * x + 1, id)] = v1;
                v1 += 1;
            }

            result[id as usize] += v0 + v1 + v3;
        }
    }
}

fn control_flow_loop_double_call_sparse(shape: Shape<'_>) {
    let Shape { p, plain_size, fixed, result } = shape;

    for id in 0..plain_size {
        result[id as usize] = 0;

        let v3 = p.a + p.b;

        for x in 0..p.a {
            if (x & p.b) != 0 {
                let mut v0 = (p.c & id) + x;
                let mut v1 = (p.d & id) + x + 1;

                result[ring_index(plain_size, 2 * x, id)] = v0;
                if !fixed {
                    v0 += 1;
                }

                if !fixed {
                    result[ring_index(plain_size, 2 * x + 1, id)] = v1;
                    v1 += 1;
                }

                result[id as usize] += v0 + v1 + v3;
            }
        }
    }
}

fn control_flow_nested_loop(shape: Shape<'_>) {
    let Shape { p, plain_size, fixed, result } = shape;

    for id in 0..plain_size {
        result[id as usize] = 0;

        let v1 = p.b;
        let v3 = p.b;

        for y in 0..p.a {
            for x in 0..p.a {
                let n = x + y * p.a;

                if (n & p.d) != 0 {
                    let mut v0 = (p.c & id) + n;

                    result[ring_index(plain_size, n, id)] = v0;
                    if !fixed {
                        v0 += 1;
                    }

                    result[id as usize] += v0 + v1 + v3;
                }
            }
        }
    }
}

fn control_flow_nested_loop_before(shape: Shape<'_>) {
    let Shape { p, plain_size, fixed, result } = shape;

    for id in 0..plain_size {
        result[id as usize] = 0;

        for y in 0..p.d {
            for x in 0..p.d {
                if ((x + y * p.a) & p.b) != 0 {
                    result[id as usize] += x + y;
                }
            }
        }

        let v1 = p.a;
        let v3 = p.a;

        for x in 0..p.b {
            if (x & p.a) != 0 {
                let mut v0 = p.c & id;

                result[ring_index(plain_size, x, id)] = v0;
                if !fixed {
                    v0 += 1;
                }

                result[id as usize] += v0 + v1 + v3;
            }
        }
    }
}

fn control_flow_nested_loop_after(shape: Shape<'_>) {
    let Shape { p, plain_size, fixed, result } = shape;

    for id in 0..plain_size {
        result[id as usize] = 0;

        let v1 = p.a;
        let v3 = p.a;

        for x in 0..p.b {
            if (x & p.a) != 0 {
                let mut v0 = p.c & id;

                result[ring_index(plain_size, x, id)] = v0;
                if !fixed {
                    v0 += 1;
                }

                result[id as usize] += v0 + v1 + v3;
            }
        }

        for y in 0..p.d {
            for x in 0..p.d {
                if ((x + y * p.a) & p.b) != 0 {
                    result[id as usize] += x + y;
                }
            }
        }
    }
}

fn control_flow_function_call(shape: Shape<'_>) {
    let Shape { p, plain_size, fixed, result } = shape;
    let mut a = [0u32; 42];

    for id in 0..plain_size {
        let mut v0 = p.a & id;
        let v1 = p.d;
        let v3 = p.d;

        for (i, element) in a.iter_mut().enumerate() {
            *element = p.c * i as u32;
        }

        result[ring_index(plain_size, 0, id)] = v0;
        if !fixed {
            v0 += 1;
        }

        let r: u32 = a.iter().sum();
        let i = a.len() as u32;

        result[id as usize] = (r + i) + v0 + v1 + v3;
    }
}

fn control_flow_nested_function_call(shape: Shape<'_>) {
    let Shape { p, plain_size, fixed, result } = shape;
    let mut a = [0u32; 14];
    let mut b = [0u32; 256];

    for id in 0..plain_size {
        let mut v0 = p.a & id;
        let v3 = p.d;

        for (j, element) in b.iter_mut().enumerate() {
            *element = p.c * j as u32;
        }

        let v1 = p.b;

        for (i, element) in a.iter_mut().enumerate() {
            *element = p.c * i as u32;
        }

        result[ring_index(plain_size, 0, id)] = v0;
        if !fixed {
            v0 += 1;
        }

        let r: u32 = a.iter().sum();
        let i = a.len() as u32;
        let t: u32 = b.iter().sum();
        let j = b.len() as u32;

        result[id as usize] = (r + i) + (t + j) + v0 + v1 + v3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::registry::registered_cases;
    use crate::cases::stage::Stage;
    use crate::cases::test_op::TestOp;
    use crate::gpu::result_image::RING_FIRST_SLICE;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    fn case(test_type: TestType, test_op: TestOp) -> CaseDef {
        let stage = match test_op {
            TestOp::ReportIntersection => Stage::Intersection,
            _ => Stage::Raygen,
        };
        CaseDef::new(test_type, test_op, stage, 4, 4)
    }

    #[test]
    fn test_push_constant_and_pixel_id_slices_hold_for_every_shape_and_operation() {
        for descriptor in registered_cases() {
            let expected = expected_values(&descriptor.case);
            let p = PushConstants::for_test_type(descriptor.case.test_type).as_array();
            let plain_size = descriptor.case.pixel_count() as usize;

            for id in 0..plain_size {
                for (slice, constant) in p.iter().enumerate() {
                    assert_eq!(expected[(slice + 1) * plain_size + id], *constant, "{}", descriptor.name);
                }
                assert_eq!(expected[PIXEL_ID_SLICE as usize * plain_size + id], id as u32, "{}", descriptor.name);
            }
        }
    }

    #[test]
    fn test_oracle_is_pure() {
        for test_type in TestType::iter() {
            let first = expected_values(&case(test_type, TestOp::ExecuteCallable));
            let second = expected_values(&case(test_type, TestOp::ExecuteCallable));
            assert_eq!(first, second, "{}", test_type.token());
        }
    }

    /// End-to-end scenario: if/execute_callable/rgen on a 4x4 grid, pixel 5.
    #[test]
    fn test_if_taken_branch_at_pixel_five() {
        let case = case(TestType::If, TestOp::ExecuteCallable);
        let expected = expected_values(&case);
        let p = PushConstants::for_test_type(TestType::If);
        let plain_size = case.pixel_count();

        let id = 5;
        assert_ne!(p.a & id, 0, "pixel 5 must take the branch");

        let ring = (RING_FIRST_SLICE * plain_size + id) as usize;
        assert_eq!(expected[ring], p.c & id);
        assert_eq!(expected[ring], 5);

        // v0 = (c & id) + 1 after the callee increment, v1 = (d & id) + 1.
        let v0 = (p.c & id) + 1;
        let v1 = (p.d & id) + 1;
        assert_eq!(expected[id as usize], v0 + v1 + p.b + p.b);
    }

    #[test]
    fn test_if_untaken_branch_records_incremented_v1() {
        let case = case(TestType::If, TestOp::ExecuteCallable);
        let expected = expected_values(&case);
        let p = PushConstants::for_test_type(TestType::If);
        let plain_size = case.pixel_count();

        let id = 2;
        assert_eq!(p.a & id, 0, "pixel 2 must fall into the else arm");

        let ring = (RING_FIRST_SLICE * plain_size + id) as usize;
        assert_eq!(expected[ring], (p.c & id) + 1);
    }

    /// End-to-end scenario: switch/report_intersection/sect. The fixed path
    /// records v0 itself and omits the trailing increment of the result.
    #[test]
    fn test_switch_fixed_operation_asymmetry() {
        let reported = expected_values(&case(TestType::Switch, TestOp::ReportIntersection));
        let called = expected_values(&case(TestType::Switch, TestOp::ExecuteCallable));
        let p = PushConstants::for_test_type(TestType::Switch);
        let plain_size = 16;

        for id in 0..plain_size {
            assert_eq!(called[id as usize], reported[id as usize] + 1);

            let ring = (RING_FIRST_SLICE * plain_size + id) as usize;
            assert_eq!(called[ring], p.c & id);
            let arm_selects_v0 = (p.a & id) == 0;
            if arm_selects_v0 {
                assert_eq!(reported[ring], p.c & id);
            } else {
                assert_eq!(reported[ring], p.b);
            }
        }
    }

    #[rstest]
    #[case(TestType::If)]
    #[case(TestType::Loop)]
    #[case(TestType::NestedLoop)]
    #[case(TestType::FunctionCall)]
    fn test_fixed_operation_suppresses_the_increment(#[case] test_type: TestType) {
        let mutated = expected_values(&case(test_type, TestOp::ExecuteCallable));
        let fixed = expected_values(&case(test_type, TestOp::ReportIntersection));

        assert_ne!(mutated, fixed, "{}", test_type.token());
    }

    #[test]
    fn test_loop_ring_slices_hold_final_iteration_values() {
        let case = case(TestType::Loop, TestOp::ExecuteCallable);
        let expected = expected_values(&case);
        let p = PushConstants::for_test_type(TestType::Loop);
        let plain_size = case.pixel_count();

        // Eight iterations land on eight distinct ring slices.
        for id in 0..plain_size {
            for n in 0..p.a {
                let ring = (ring_slice(n) * plain_size + id) as usize;
                assert_eq!(expected[ring], (p.c & id) + n);
            }
        }
    }

    #[test]
    fn test_nested_loop_ring_slices_are_last_write_wins() {
        let case = case(TestType::NestedLoop, TestOp::ExecuteCallable);
        let expected = expected_values(&case);
        let p = PushConstants::for_test_type(TestType::NestedLoop);
        let plain_size = case.pixel_count();

        // 64 iterations fold onto 8 ring slices; the survivor in each slice
        // is the last gated iteration mapping there.
        for id in 0..plain_size {
            for slot in 0..8u32 {
                let survivor = (0..p.a * p.a).filter(|n| n % 8 == slot && (n & p.d) != 0).next_back();
                let ring = ((RING_FIRST_SLICE + slot) * plain_size + id) as usize;

                match survivor {
                    Some(n) => assert_eq!(expected[ring], (p.c & id) + n),
                    None => assert_eq!(expected[ring], DEFAULT_CLEAR_VALUE),
                }
            }
        }
    }

    #[test]
    fn test_sparse_loop_skips_ungated_ring_slices() {
        let case = case(TestType::LoopDoubleCallSparse, TestOp::ExecuteCallable);
        let expected = expected_values(&case);
        let p = PushConstants::for_test_type(TestType::LoopDoubleCallSparse);
        let plain_size = case.pixel_count();

        // Tags 2x and 2x+1 select the slices, but only gated x values write.
        for id in 0..plain_size {
            let mut touched = [false; 8];
            for x in 0..p.a {
                if (x & p.b) != 0 {
                    touched[((2 * x) % 8) as usize] = true;
                    touched[((2 * x + 1) % 8) as usize] = true;
                }
            }

            for (slot, was_touched) in touched.iter().enumerate() {
                let ring = ((RING_FIRST_SLICE + slot as u32) * plain_size + id) as usize;
                if !was_touched {
                    assert_eq!(expected[ring], DEFAULT_CLEAR_VALUE);
                }
            }
        }
    }

    #[test]
    fn test_function_call_accumulates_array_sums() {
        let case = case(TestType::FunctionCall, TestOp::ExecuteCallable);
        let expected = expected_values(&case);
        let p = PushConstants::for_test_type(TestType::FunctionCall);

        let id = 0;
        let r: u32 = (0..42).map(|i| p.c * i).sum();
        let v0 = (p.a & id) + 1;
        assert_eq!(expected[id as usize], (r + 42) + v0 + p.d + p.d);
    }

    #[test]
    fn test_nested_function_call_accumulates_both_frames() {
        let case = case(TestType::NestedFunctionCall, TestOp::ExecuteCallable);
        let expected = expected_values(&case);
        let p = PushConstants::for_test_type(TestType::NestedFunctionCall);

        let id = 3;
        let r: u32 = (0..14).map(|i| p.c * i).sum();
        let t: u32 = (0..256).map(|j| p.c * j).sum();
        let v0 = (p.a & id) + 1;
        assert_eq!(expected[id as usize], (r + 14) + (t + 256) + v0 + p.b + p.d);
    }
}
