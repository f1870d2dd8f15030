use crate::cases::test_op::TestOp;
use crate::shader::source::{CallSite, ShaderCode};

/// The call instruction inserted into the control flow templates. The `$`
/// placeholder marks where the payload location index goes; report
/// intersection takes no payload argument, so its instruction carries none.
#[must_use]
pub(crate) fn call_instruction(test_op: TestOp) -> ShaderCode<CallSite> {
    let value = match test_op {
        TestOp::ExecuteCallable => "executeCallableEXT(0, $)",
        TestOp::TraceRay => {
            "traceRayEXT(as, 0, 0xFF, p.hitOfs, 0, p.miss, \
             vec3((gl_LaunchIDEXT.x) + vec3(0.5f)) / vec3(gl_LaunchSizeEXT), \
             1.0f, vec3(0.0f, 0.0f, 1.0f), 100.0f, $)"
        }
        TestOp::ReportIntersection => "reportIntersectionEXT(1.0f, 0u)",
    };

    ShaderCode::<CallSite>::new(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_callable_addresses_table_entry_zero() {
        let instruction = call_instruction(TestOp::ExecuteCallable);
        assert_eq!(instruction.at_payload_slot(2), "executeCallableEXT(0, 2)");
    }

    #[test]
    fn test_trace_ray_uses_push_constant_table_offsets() {
        let instruction = call_instruction(TestOp::TraceRay).at_payload_slot(0);
        assert!(instruction.starts_with("traceRayEXT(as, 0, 0xFF, p.hitOfs, 0, p.miss,"));
        assert!(instruction.ends_with("100.0f, 0)"));
    }

    #[test]
    fn test_report_intersection_has_no_payload_argument() {
        let instruction = call_instruction(TestOp::ReportIntersection);
        assert_eq!(instruction.at_payload_slot(7), "reportIntersectionEXT(1.0f, 0u)");
    }
}
