use crate::cases::test_type::TestType;
use crate::shader::source::{CallSite, ShaderCode};

/// GLSL emitted for one control flow shape: helper functions placed before
/// `main` and the statement block placed inside it. Each shape threads the
/// payload variables v0..v3 through the call instruction and mirrors, line
/// for line, its oracle counterpart of the same name.
#[derive(Clone, Debug)]
pub(crate) struct ControlFlow {
    pub(crate) pre_main: String,
    pub(crate) in_main: String,
}

impl ControlFlow {
    #[must_use]
    pub(crate) fn for_test_type(test_type: TestType, call: &ShaderCode<CallSite>) -> Self {
        match test_type {
            TestType::If => control_flow_if(call),
            TestType::Loop => control_flow_loop(call),
            TestType::Switch => control_flow_switch(call),
            TestType::LoopDoubleCall => control_flow_loop_double_call(call),
            TestType::LoopDoubleCallSparse => control_flow_loop_double_call_sparse(call),
            TestType::NestedLoop => control_flow_nested_loop(call),
            TestType::NestedLoopBefore => control_flow_nested_loop_before(call),
            TestType::NestedLoopAfter => control_flow_nested_loop_after(call),
            TestType::FunctionCall => control_flow_function_call(call),
            TestType::NestedFunctionCall => control_flow_nested_function_call(call),
        }
    }

    #[must_use]
    fn in_main_only(in_main: String) -> Self {
        Self { pre_main: String::new(), in_main }
    }
}

#[must_use]
fn control_flow_if(call: &ShaderCode<CallSite>) -> ControlFlow {
    ControlFlow::in_main_only(format!(
        "  v2 = v3 = uvec2(0, p.b);\n\
         \n\
         \x20 if ((p.a & id) != 0)\n\
         \x20     {{ v0 = uvec2(0, p.c & id); v1 = uvec2(0, (p.d & id) + 1); {call_0}; }}\n\
         \x20 else\n\
         \x20     {{ v0 = uvec2(0, p.d & id); v1 = uvec2(0, (p.c & id) + 1); {call_1}; }}\n\
         \n\
         \x20 result = v0.y + v1.y + v2.y + v3.y;\n",
        call_0 = call.at_payload_slot(0),
        call_1 = call.at_payload_slot(1),
    ))
}

#[must_use]
fn control_flow_loop(call: &ShaderCode<CallSite>) -> ControlFlow {
    ControlFlow::in_main_only(format!(
        "  v1 = v3 = uvec2(0, p.b);\n\
         \n\
         \x20 for (uint x = 0; x < p.a; x++)\n\
         \x20 {{\n\
         \x20   v0 = uvec2(x, (p.c & id) + x);\n\
         \x20   {call_0};\n\
         \x20   result += v0.y + v1.y + v3.y;\n\
         \x20 }}\n",
        call_0 = call.at_payload_slot(0),
    ))
}

#[must_use]
fn control_flow_switch(call: &ShaderCode<CallSite>) -> ControlFlow {
    ControlFlow::in_main_only(format!(
        "  switch (p.a & id)\n\
         \x20 {{\n\
         \x20   case 0: {{ v1 = v2 = v3 = uvec2(0, p.b); v0 = uvec2(0, p.c & id); {call_0}; break; }}\n\
         \x20   case 1: {{ v0 = v2 = v3 = uvec2(0, p.b); v1 = uvec2(0, p.c & id); {call_1}; break; }}\n\
         \x20   case 2: {{ v0 = v1 = v3 = uvec2(0, p.b); v2 = uvec2(0, p.c & id); {call_2}; break; }}\n\
         \x20   case 3: {{ v0 = v1 = v2 = uvec2(0, p.b); v3 = uvec2(0, p.c & id); {call_3}; break; }}\n\
         \x20   default: break;\n\
         \x20 }}\n\
         \n\
         \x20 result = v0.y + v1.y + v2.y + v3.y;\n",
        call_0 = call.at_payload_slot(0),
        call_1 = call.at_payload_slot(1),
        call_2 = call.at_payload_slot(2),
        call_3 = call.at_payload_slot(3),
    ))
}

#[must_use]
fn control_flow_loop_double_call(call: &ShaderCode<CallSite>) -> ControlFlow {
    ControlFlow::in_main_only(format!(
        "  v3 = uvec2(0, p.b);\n\
         \x20 for (uint x = 0; x < p.a; x++)\n\
         \x20 {{\n\
         \x20   v0 = uvec2(2 * x + 0, (p.c & id) + x);\n\
         \x20   v1 = uvec2(2 * x + 1, (p.d & id) + x + 1);\n\
         \x20   {call_0};\n\
         \x20   {call_1};\n\
         \x20   result += v0.y + v1.y + v3.y;\n\
         \x20 }}\n",
        call_0 = call.at_payload_slot(0),
        call_1 = call.at_payload_slot(1),
    ))
}

#[must_use]
fn control_flow_loop_double_call_sparse(call: &ShaderCode<CallSite>) -> ControlFlow {
    ControlFlow::in_main_only(format!(
        "  v3 = uvec2(0, p.a + p.b);\n\
         \x20 for (uint x = 0; x < p.a; x++)\n\
         \x20   if ((x & p.b) != 0)\n\
         \x20   {{\n\
         \x20     v0 = uvec2(2 * x + 0, (p.c & id) + x + 0);\n\
         \x20     v1 = uvec2(2 * x + 1, (p.d & id) + x + 1);\n\
         \x20     {call_0};\n\
         \x20     {call_1};\n\
         \x20     result += v0.y + v1.y + v3.y;\n\
         \x20   }}\n",
        call_0 = call.at_payload_slot(0),
        call_1 = call.at_payload_slot(1),
    ))
}

#[must_use]
fn control_flow_nested_loop(call: &ShaderCode<CallSite>) -> ControlFlow {
    ControlFlow::in_main_only(format!(
        "  v1 = v3 = uvec2(0, p.b);\n\
         \x20 for (uint y = 0; y < p.a; y++)\n\
         \x20 for (uint x = 0; x < p.a; x++)\n\
         \x20 {{\n\
         \x20   uint n = x + y * p.a;\n\
         \x20   if ((n & p.d) != 0)\n\
         \x20   {{\n\
         \x20     v0 = uvec2(n, (p.c & id) + (x + y * p.a));\n\
         \x20     {call_0};\n\
         \x20     result += v0.y + v1.y + v3.y;\n\
         \x20   }}\n\
         \x20 }}\n",
        call_0 = call.at_payload_slot(0),
    ))
}

#[must_use]
fn control_flow_nested_loop_before(call: &ShaderCode<CallSite>) -> ControlFlow {
    ControlFlow::in_main_only(format!(
        "  for (uint y = 0; y < p.d; y++)\n\
         \x20 for (uint x = 0; x < p.d; x++)\n\
         \x20   if (((x + y * p.a) & p.b) != 0)\n\
         \x20     result += (x + y);\n\
         \n\
         \x20 v1 = v3 = uvec2(0, p.a);\n\
         \n\
         \x20 for (uint x = 0; x < p.b; x++)\n\
         \x20   if ((x & p.a) != 0)\n\
         \x20   {{\n\
         \x20     v0 = uvec2(x, p.c & id);\n\
         \x20     {call_0};\n\
         \x20     result += v0.y + v1.y + v3.y;\n\
         \x20   }}\n",
        call_0 = call.at_payload_slot(0),
    ))
}

#[must_use]
fn control_flow_nested_loop_after(call: &ShaderCode<CallSite>) -> ControlFlow {
    ControlFlow::in_main_only(format!(
        "  v1 = v3 = uvec2(0, p.a);\n\
         \x20 for (uint x = 0; x < p.b; x++)\n\
         \x20   if ((x & p.a) != 0)\n\
         \x20   {{\n\
         \x20     v0 = uvec2(x, p.c & id);\n\
         \x20     {call_0};\n\
         \x20     result += v0.y + v1.y + v3.y;\n\
         \x20   }}\n\
         \n\
         \x20 for (uint y = 0; y < p.d; y++)\n\
         \x20 for (uint x = 0; x < p.d; x++)\n\
         \x20   if (((x + y * p.a) & p.b) != 0)\n\
         \x20     result += x + y;\n",
        call_0 = call.at_payload_slot(0),
    ))
}

#[must_use]
fn control_flow_function_call(call: &ShaderCode<CallSite>) -> ControlFlow {
    let pre_main = format!(
        "uint f1(void)\n\
         {{\n\
         \x20 uint i, r = 0;\n\
         \x20 uint a[42];\n\
         \n\
         \x20 for (i = 0; i < a.length(); i++) a[i] = p.c * i;\n\
         \n\
         \x20 {call_0};\n\
         \n\
         \x20 for (i = 0; i < a.length(); i++) r += a[i];\n\
         \n\
         \x20 return r + i;\n\
         }}\n",
        call_0 = call.at_payload_slot(0),
    );
    let in_main = "  v0 = uvec2(0, p.a & id); v1 = v3 = uvec2(0, p.d);\n\
                   \x20 result = f1() + v0.y + v1.y + v3.y;\n"
        .to_string();

    ControlFlow { pre_main, in_main }
}

#[must_use]
fn control_flow_nested_function_call(call: &ShaderCode<CallSite>) -> ControlFlow {
    let pre_main = format!(
        "uint f0(void)\n\
         {{\n\
         \x20 uint i, r = 0;\n\
         \x20 uint a[14];\n\
         \n\
         \x20 for (i = 0; i < a.length(); i++) a[i] = p.c * i;\n\
         \n\
         \x20 {call_0};\n\
         \n\
         \x20 for (i = 0; i < a.length(); i++) r += a[i];\n\
         \n\
         \x20 return r + i;\n\
         }}\n\
         \n\
         uint f1(void)\n\
         {{\n\
         \x20 uint j, t = 0;\n\
         \x20 uint b[256];\n\
         \n\
         \x20 for (j = 0; j < b.length(); j++) b[j] = p.c * j;\n\
         \n\
         \x20 v1 = uvec2(0, p.b);\n\
         \n\
         \x20 t += f0();\n\
         \n\
         \x20 for (j = 0; j < b.length(); j++) t += b[j];\n\
         \n\
         \x20 return t + j;\n\
         }}\n",
        call_0 = call.at_payload_slot(0),
    );
    let in_main = "  v0 = uvec2(0, p.a & id); v3 = uvec2(0, p.d);\n\
                   \x20 result = f1() + v0.y + v1.y + v3.y;\n"
        .to_string();

    ControlFlow { pre_main, in_main }
}
