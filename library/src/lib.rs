pub mod cases;
pub mod compare;
pub mod geometry;
pub mod gpu;
pub mod oracle;
pub mod shader;
mod tests;

use crate::cases::case_def::CaseDef;
use crate::cases::push_constants::PushConstants;
use crate::cases::stage::Stage;
use crate::cases::test_op::TestOp;
use crate::compare::Verdict;
use crate::gpu::backend::{DeviceError, RayTracingDevice};
use crate::gpu::driver;
use crate::gpu::result_image::ImageExtent;
use crate::gpu::shader_groups::ShaderGroupLayout;
use crate::shader::generator;
use crate::shader::shader_set::ShaderSet;
use log::error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaseError {
    /// The device lacks a required feature or property; the case is to be
    /// skipped, not failed.
    #[error("not supported: {what:?}")]
    NotSupported { what: String },
    /// A defect in the harness itself, never actionable by the user.
    #[error("internal error: {what:?}")]
    Internal { what: String },
    #[error(transparent)]
    Device(#[from] DeviceError),
}

impl CaseError {
    #[must_use]
    pub(crate) fn internal(what: impl Into<String>) -> Self {
        CaseError::Internal { what: what.into() }
    }
}

/// One instantiated conformance case: generated shader sources, the shader
/// group layout derived from them, and the push constants both the pipeline
/// and the oracle consume.
pub struct CaseInstance {
    case: CaseDef,
    push_constants: PushConstants,
    shaders: ShaderSet,
    shader_groups: ShaderGroupLayout,
}

impl CaseInstance {
    pub fn new(case: CaseDef) -> Result<CaseInstance, CaseError> {
        let shaders = generator::generate(&case)?;
        let shader_groups = ShaderGroupLayout::from_shader_set(&shaders);

        if !shader_groups.raygen().is_present() {
            return Err(CaseError::internal(format!("{case} produced no ray generation group")));
        }

        Ok(CaseInstance {
            push_constants: PushConstants::for_test_type(case.test_type),
            case,
            shaders,
            shader_groups,
        })
    }

    #[must_use]
    pub fn case(&self) -> &CaseDef {
        &self.case
    }

    #[must_use]
    pub fn push_constants(&self) -> &PushConstants {
        &self.push_constants
    }

    #[must_use]
    pub fn shaders(&self) -> &ShaderSet {
        &self.shaders
    }

    #[must_use]
    pub fn shader_groups(&self) -> &ShaderGroupLayout {
        &self.shader_groups
    }

    #[must_use]
    pub fn result_extent(&self) -> ImageExtent {
        ImageExtent::for_case_grid(self.case.width, self.case.height)
    }

    /// Values a conformant device must produce, computed without touching
    /// the device.
    #[must_use]
    pub fn expected_values(&self) -> Vec<u32> {
        oracle::expected_values(&self.case)
    }

    /// Feature and property gate, checked before any device work.
    pub fn check_support(&self, device: &impl RayTracingDevice) -> Result<(), CaseError> {
        let features = device.features();

        if !features.acceleration_structure {
            return Err(CaseError::NotSupported { what: "acceleration structures are unavailable".to_string() });
        }
        if !features.ray_tracing_pipeline {
            return Err(CaseError::NotSupported { what: "ray tracing pipelines are unavailable".to_string() });
        }

        let recursive_trace = self.case.test_op == TestOp::TraceRay && self.case.stage != Stage::Raygen;
        if recursive_trace && device.properties().max_ray_recursion_depth < 2 {
            return Err(CaseError::NotSupported {
                what: "the case needs a ray recursion depth of at least 2".to_string(),
            });
        }

        Ok(())
    }

    /// Runs the case on the device and compares the readback against the
    /// oracle. The side-by-side dump goes to the log on any mismatch.
    pub fn run(&self, device: &mut impl RayTracingDevice) -> Result<Verdict, CaseError> {
        self.check_support(device)?;

        let actual = driver::execute(device, &self.case, &self.push_constants, &self.shaders, &self.shader_groups)?;
        let expected = self.expected_values();
        let extent = self.result_extent();

        let verdict = compare::compare(&actual, &expected, &extent);
        if !verdict.passed() {
            error!(
                "{case}: {verdict}\n{dump}",
                case = self.case,
                dump = compare::format_side_by_side(&actual, &expected, &extent),
            );
        }

        Ok(verdict)
    }
}
