use crate::CaseError;
use crate::cases::case_def::CaseDef;
use crate::cases::stage::Stage;
use crate::cases::test_op::TestOp;
use crate::shader::call_instruction::call_instruction;
use crate::shader::shader_set::ShaderSet;
use crate::shader::slot::ShaderSlot;
use crate::shader::source::{Complete, ShaderCode};
use crate::shader::templates::ControlFlow;

const SOURCE_PROLOG: &str = "#version 460 core\n\
    #extension GL_EXT_nonuniform_qualifier : enable\n\
    #extension GL_EXT_ray_tracing : require\n";

const RESULT_BINDINGS: &str = "\n\
    layout(set = 0, binding = 0, r32ui) uniform uimage3D resultImage;\n\
    layout(set = 0, binding = 1) uniform accelerationStructureEXT as;\n\
    \n\
    layout(push_constant) uniform TestParams\n\
    {\n\
    \x20   uint a;\n\
    \x20   uint b;\n\
    \x20   uint c;\n\
    \x20   uint d;\n\
    \x20   uint hitOfs;\n\
    \x20   uint miss;\n\
    } p;\n";

const MAIN_BEFORE_OP: &str = "  uint result = 0;\n\
    \x20 uint id = uint(gl_LaunchIDEXT.x + gl_LaunchSizeEXT.x * gl_LaunchIDEXT.y);\n";

const MAIN_AFTER_OP: &str = "  imageStore(resultImage, ivec3(gl_LaunchIDEXT.x, gl_LaunchIDEXT.y, 0), uvec4(result, 0, 0, 1));\n\
    \x20 imageStore(resultImage, ivec3(gl_LaunchIDEXT.x, gl_LaunchIDEXT.y, 1), uvec4(p.a, 0, 0, 1));\n\
    \x20 imageStore(resultImage, ivec3(gl_LaunchIDEXT.x, gl_LaunchIDEXT.y, 2), uvec4(p.b, 0, 0, 1));\n\
    \x20 imageStore(resultImage, ivec3(gl_LaunchIDEXT.x, gl_LaunchIDEXT.y, 3), uvec4(p.c, 0, 0, 1));\n\
    \x20 imageStore(resultImage, ivec3(gl_LaunchIDEXT.x, gl_LaunchIDEXT.y, 4), uvec4(p.d, 0, 0, 1));\n\
    \x20 imageStore(resultImage, ivec3(gl_LaunchIDEXT.x, gl_LaunchIDEXT.y, 5), uvec4(p.hitOfs, 0, 0, 1));\n\
    \x20 imageStore(resultImage, ivec3(gl_LaunchIDEXT.x, gl_LaunchIDEXT.y, 6), uvec4(p.miss, 0, 0, 1));\n";

/// Body shared by every callee variant: record the payload value into the
/// ring slice selected by its tag, and the invocation id into slice 7.
const CALLEE_MAIN_PART: &str = "  uint z = (inValue.x % 8) + 8;\n\
    \x20 uint v = inValue.y;\n\
    \x20 uint n = gl_LaunchIDEXT.x + gl_LaunchSizeEXT.x * gl_LaunchIDEXT.y;\n\
    \x20 imageStore(resultImage, ivec3(gl_LaunchIDEXT.x, gl_LaunchIDEXT.y, z), uvec4(v, 0, 0, 1));\n\
    \x20 imageStore(resultImage, ivec3(gl_LaunchIDEXT.x, gl_LaunchIDEXT.y, 7), uvec4(n, 0, 0, 1));\n";

#[must_use]
fn intersection_passthrough() -> ShaderCode {
    ShaderCode::<Complete>::new(format!(
        "{SOURCE_PROLOG}\
         hitAttributeEXT vec3 hitAttribute;\n\
         \n\
         void main()\n\
         {{\n\
         \x20 reportIntersectionEXT(0.95f, 0u);\n\
         }}\n"
    ))
}

#[must_use]
fn miss_passthrough() -> ShaderCode {
    ShaderCode::<Complete>::new(format!(
        "{SOURCE_PROLOG}\
         layout(location = 0) rayPayloadInEXT vec3 hitValue;\n\
         \n\
         void main()\n\
         {{\n\
         }}\n"
    ))
}

#[must_use]
fn hit_passthrough() -> ShaderCode {
    ShaderCode::<Complete>::new(format!(
        "{SOURCE_PROLOG}\
         hitAttributeEXT vec3 attribs;\n\
         layout(location = 0) rayPayloadInEXT vec3 hitValue;\n\
         \n\
         void main()\n\
         {{\n\
         }}\n"
    ))
}

/// Ray generation shader used whenever the stage under test is reached by a
/// primary ray: one ray per pixel, straight along -z.
#[must_use]
fn common_ray_generation() -> ShaderCode {
    ShaderCode::<Complete>::new(format!(
        "{SOURCE_PROLOG}\
         layout(location = 0) rayPayloadEXT vec3 hitValue;\n\
         layout(set = 0, binding = 1) uniform accelerationStructureEXT topLevelAS;\n\
         \n\
         void main()\n\
         {{\n\
         \x20 uint  rayFlags = 0;\n\
         \x20 uint  cullMask = 0xFF;\n\
         \x20 float tmin     = 0.0;\n\
         \x20 float tmax     = 9.0;\n\
         \x20 vec3  origin   = vec3((float(gl_LaunchIDEXT.x) + 0.5f) / float(gl_LaunchSizeEXT.x), (float(gl_LaunchIDEXT.y) + 0.5f) / float(gl_LaunchSizeEXT.y), 0.0);\n\
         \x20 vec3  direct   = vec3(0.0, 0.0, -1.0);\n\
         \x20 traceRayEXT(topLevelAS, rayFlags, cullMask, 0, 0, 0, origin, tmin, direct, tmax, 0);\n\
         }}\n"
    ))
}

/// Assembles the driving shader: prolog, payload declarations, control flow
/// helpers, then a main that runs the shape and stores the result slices.
#[must_use]
fn driving_shader(payload_declarations: &str, extra_declarations: &str, control_flow: &ControlFlow) -> ShaderCode {
    ShaderCode::<Complete>::new(format!(
        "{SOURCE_PROLOG}{RESULT_BINDINGS}{payload_declarations}{extra_declarations}\
         {pre_main}\
         \n\
         void main()\n\
         {{\n\
         {MAIN_BEFORE_OP}\
         {in_main}\
         {MAIN_AFTER_OP}\
         }}\n",
        pre_main = control_flow.pre_main,
        in_main = control_flow.in_main,
    ))
}

#[must_use]
fn callable_callee() -> ShaderCode {
    ShaderCode::<Complete>::new(format!(
        "{SOURCE_PROLOG}\
         \n\
         layout(set = 0, binding = 0, r32ui) uniform uimage3D resultImage;\n\
         layout(location = 0) callableDataInEXT uvec2 inValue;\n\
         \n\
         void main()\n\
         {{\n\
         {CALLEE_MAIN_PART}\
         \x20 inValue.y++;\n\
         }}\n"
    ))
}

#[must_use]
fn trace_ray_callee() -> ShaderCode {
    ShaderCode::<Complete>::new(format!(
        "{SOURCE_PROLOG}\
         \n\
         layout(set = 0, binding = 0, r32ui) uniform uimage3D resultImage;\n\
         layout(location = 0) rayPayloadInEXT uvec2 inValue;\n\
         \n\
         void main()\n\
         {{\n\
         {CALLEE_MAIN_PART}\
         \x20 inValue.y++;\n\
         }}\n"
    ))
}

/// The report-intersection recorder: reads the hit attribute block written
/// by the intersection shader. Hit attributes have no return trip, so there
/// is no increment here.
#[must_use]
fn intersection_callee() -> ShaderCode {
    ShaderCode::<Complete>::new(format!(
        "{SOURCE_PROLOG}\
         \n\
         layout(set = 0, binding = 0, r32ui) uniform uimage3D resultImage;\n\
         hitAttributeEXT block {{ uvec2 inValue; }};\n\
         \n\
         void main()\n\
         {{\n\
         {CALLEE_MAIN_PART}\
         }}\n"
    ))
}

/// Ray generation shader for the callable-stage cases: forwards straight
/// into the driving callable shader sitting at binding table entry 1.
#[must_use]
fn callable_launcher() -> ShaderCode {
    ShaderCode::<Complete>::new(format!(
        "{SOURCE_PROLOG}\
         \n\
         layout(location = 4) callableDataEXT float dummy;\n\
         layout(set = 0, binding = 0, r32ui) uniform uimage3D resultImage;\n\
         \n\
         void main()\n\
         {{\n\
         \x20 executeCallableEXT(1, 4);\n\
         }}\n"
    ))
}

const CALLABLE_PAYLOADS: &str = "layout(location = 0) callableDataEXT uvec2 v0;\n\
    layout(location = 1) callableDataEXT uvec2 v1;\n\
    layout(location = 2) callableDataEXT uvec2 v2;\n\
    layout(location = 3) callableDataEXT uvec2 v3;\n\
    \n";

const RAY_PAYLOADS: &str = "layout(location = 0) rayPayloadEXT uvec2 v0;\n\
    layout(location = 1) rayPayloadEXT uvec2 v1;\n\
    layout(location = 2) rayPayloadEXT uvec2 v2;\n\
    layout(location = 3) rayPayloadEXT uvec2 v3;\n";

const HIT_ATTRIBUTE_PAYLOADS: &str = "hitAttributeEXT block { uvec2 v0; };\n\
    uvec2 v1;\n\
    uvec2 v2;\n\
    uvec2 v3;\n";

/// Produces the complete source set for the case: the driving shader at the
/// selected stage, the callee recording shader, and pass-through stubs for
/// every other stage the pipeline needs.
pub fn generate(case: &CaseDef) -> Result<ShaderSet, CaseError> {
    let control_flow = ControlFlow::for_test_type(case.test_type, &call_instruction(case.test_op));
    let mut set = ShaderSet::new();

    match case.test_op {
        TestOp::ExecuteCallable => match case.stage {
            Stage::Raygen => {
                set.add(ShaderSlot::Rgen, driving_shader(CALLABLE_PAYLOADS, "", &control_flow));
                set.add(ShaderSlot::Cal0, callable_callee());
            }
            Stage::ClosestHit => {
                let incoming = "layout(location = 0) rayPayloadInEXT vec3 hitValue;\n\
                                hitAttributeEXT vec3 attribs;\n\
                                \n";
                set.add(ShaderSlot::Rgen, common_ray_generation());
                set.add(ShaderSlot::Chit, driving_shader(CALLABLE_PAYLOADS, incoming, &control_flow));
                set.add(ShaderSlot::Cal0, callable_callee());
                set.add(ShaderSlot::Ahit, hit_passthrough());
                set.add(ShaderSlot::Miss, miss_passthrough());
                set.add(ShaderSlot::Sect, intersection_passthrough());
            }
            Stage::Miss => {
                set.add(ShaderSlot::Rgen, common_ray_generation());
                set.add(ShaderSlot::Miss, driving_shader(CALLABLE_PAYLOADS, "", &control_flow));
                set.add(ShaderSlot::Cal0, callable_callee());
                set.add(ShaderSlot::Ahit, hit_passthrough());
                set.add(ShaderSlot::Chit, hit_passthrough());
                set.add(ShaderSlot::Sect, intersection_passthrough());
            }
            Stage::Callable => {
                let incoming = "layout(location = 4) callableDataInEXT float dummyIn;\n";
                set.add(ShaderSlot::Rgen, callable_launcher());
                set.add(ShaderSlot::Call, driving_shader(CALLABLE_PAYLOADS, incoming, &control_flow));
                set.add(ShaderSlot::Cal0, callable_callee());
            }
            _ => {
                return Err(CaseError::internal(format!(
                    "execute_callable cannot drive the {} stage",
                    case.stage.token(),
                )));
            }
        },
        TestOp::TraceRay => {
            let driving = driving_shader(RAY_PAYLOADS, "", &control_flow);

            match case.stage {
                Stage::Raygen => set.add(ShaderSlot::Rgen, driving),
                Stage::ClosestHit => {
                    set.add(ShaderSlot::Rgen, common_ray_generation());
                    set.add(ShaderSlot::Chit, driving);
                }
                Stage::Miss => {
                    set.add(ShaderSlot::Rgen, common_ray_generation());
                    set.add(ShaderSlot::Miss, driving);
                }
                _ => {
                    return Err(CaseError::internal(format!(
                        "trace_ray cannot drive the {} stage",
                        case.stage.token(),
                    )));
                }
            }

            if !set.contains(ShaderSlot::Miss) {
                set.add(ShaderSlot::Miss, miss_passthrough());
            }
            if !set.contains(ShaderSlot::Chit) {
                set.add(ShaderSlot::Chit, hit_passthrough());
            }
            set.add(ShaderSlot::Ahit, hit_passthrough());
            set.add(ShaderSlot::Sect, intersection_passthrough());

            set.add(ShaderSlot::Miss2, trace_ray_callee());
            set.add(ShaderSlot::Ahit2, hit_passthrough());
            set.add(ShaderSlot::Chit2, hit_passthrough());
            set.add(ShaderSlot::Sect2, intersection_passthrough());
        }
        TestOp::ReportIntersection => match case.stage {
            Stage::Intersection => {
                set.add(ShaderSlot::Rgen, common_ray_generation());
                set.add(ShaderSlot::Sect, driving_shader(HIT_ATTRIBUTE_PAYLOADS, "", &control_flow));
                set.add(ShaderSlot::Ahit, intersection_callee());
                set.add(ShaderSlot::Chit, hit_passthrough());
                set.add(ShaderSlot::Miss, miss_passthrough());
            }
            _ => {
                return Err(CaseError::internal(format!(
                    "report_intersection cannot drive the {} stage",
                    case.stage.token(),
                )));
            }
        },
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::registry::registered_cases;
    use crate::cases::test_type::TestType;
    use rstest::rstest;

    fn case(test_type: TestType, test_op: TestOp, stage: Stage) -> CaseDef {
        CaseDef::new(test_type, test_op, stage, 4, 4)
    }

    #[test]
    fn test_every_registered_case_generates() {
        for descriptor in registered_cases() {
            let set = generate(&descriptor.case).expect("registered case must generate");
            assert!(!set.is_empty(), "{}", descriptor.name);
        }
    }

    #[test]
    fn test_every_source_is_a_glsl_translation_unit() {
        for descriptor in registered_cases() {
            let set = generate(&descriptor.case).expect("registered case must generate");
            for (slot, source) in set.iter() {
                assert!(
                    source.as_str().starts_with("#version 460 core\n"),
                    "{}: {}",
                    descriptor.name,
                    slot.token(),
                );
                assert!(source.as_str().contains("void main()"));
            }
        }
    }

    #[rstest]
    #[case(TestOp::ExecuteCallable, Stage::Raygen, vec![ShaderSlot::Rgen, ShaderSlot::Cal0])]
    #[case(TestOp::ExecuteCallable, Stage::ClosestHit,
        vec![ShaderSlot::Ahit, ShaderSlot::Chit, ShaderSlot::Miss, ShaderSlot::Sect, ShaderSlot::Rgen, ShaderSlot::Cal0])]
    #[case(TestOp::ExecuteCallable, Stage::Callable, vec![ShaderSlot::Rgen, ShaderSlot::Call, ShaderSlot::Cal0])]
    #[case(TestOp::TraceRay, Stage::Raygen,
        vec![ShaderSlot::Ahit, ShaderSlot::Chit, ShaderSlot::Miss, ShaderSlot::Sect, ShaderSlot::Rgen,
             ShaderSlot::Ahit2, ShaderSlot::Chit2, ShaderSlot::Miss2, ShaderSlot::Sect2])]
    #[case(TestOp::TraceRay, Stage::Miss,
        vec![ShaderSlot::Ahit, ShaderSlot::Chit, ShaderSlot::Miss, ShaderSlot::Sect, ShaderSlot::Rgen,
             ShaderSlot::Ahit2, ShaderSlot::Chit2, ShaderSlot::Miss2, ShaderSlot::Sect2])]
    #[case(TestOp::ReportIntersection, Stage::Intersection,
        vec![ShaderSlot::Ahit, ShaderSlot::Chit, ShaderSlot::Miss, ShaderSlot::Sect, ShaderSlot::Rgen])]
    fn test_slot_matrix(#[case] test_op: TestOp, #[case] stage: Stage, #[case] mut expected: Vec<ShaderSlot>) {
        let set = generate(&case(TestType::Loop, test_op, stage)).expect("generation failed");

        let mut actual: Vec<ShaderSlot> = set.iter().map(|(slot, _)| slot).collect();
        actual.sort();
        expected.sort();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_driving_shader_lands_in_selected_stage() {
        let set = generate(&case(TestType::Loop, TestOp::ExecuteCallable, Stage::Miss)).expect("generation failed");

        let driving = set.get(ShaderSlot::Miss).expect("miss slot missing");
        assert!(driving.as_str().contains("executeCallableEXT(0, 0)"));
        assert!(driving.as_str().contains("uimage3D resultImage"));

        let stub = set.get(ShaderSlot::Chit).expect("chit stub missing");
        assert!(!stub.as_str().contains("executeCallableEXT"));
    }

    #[test]
    fn test_callable_stage_launcher_reaches_entry_one() {
        let set = generate(&case(TestType::If, TestOp::ExecuteCallable, Stage::Callable)).expect("generation failed");

        let launcher = set.get(ShaderSlot::Rgen).expect("rgen slot missing");
        assert!(launcher.as_str().contains("executeCallableEXT(1, 4)"));
        assert!(launcher.as_str().contains("layout(location = 4) callableDataEXT float dummy;"));

        let driving = set.get(ShaderSlot::Call).expect("call slot missing");
        assert!(driving.as_str().contains("layout(location = 4) callableDataInEXT float dummyIn;"));
    }

    #[test]
    fn test_trace_ray_callee_is_the_secondary_miss() {
        let set = generate(&case(TestType::Loop, TestOp::TraceRay, Stage::Raygen)).expect("generation failed");

        let callee = set.get(ShaderSlot::Miss2).expect("miss2 slot missing");
        assert!(callee.as_str().contains("rayPayloadInEXT uvec2 inValue"));
        assert!(callee.as_str().contains("inValue.y++;"));
    }

    #[test]
    fn test_report_intersection_callee_never_mutates_the_payload() {
        let set = generate(&case(TestType::Switch, TestOp::ReportIntersection, Stage::Intersection))
            .expect("generation failed");

        let callee = set.get(ShaderSlot::Ahit).expect("ahit slot missing");
        assert!(callee.as_str().contains("hitAttributeEXT block { uvec2 inValue; };"));
        assert!(!callee.as_str().contains("inValue.y++"));

        let driving = set.get(ShaderSlot::Sect).expect("sect slot missing");
        assert!(driving.as_str().contains("hitAttributeEXT block { uvec2 v0; };"));
        assert!(driving.as_str().contains("reportIntersectionEXT(1.0f, 0u)"));
    }

    #[test]
    fn test_inapplicable_combination_is_an_internal_error() {
        let result = generate(&case(TestType::Loop, TestOp::ReportIntersection, Stage::Raygen));
        assert!(matches!(result, Err(CaseError::Internal { .. })));
    }
}
