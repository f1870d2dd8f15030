use crate::CaseError;
use crate::cases::case_def::CaseDef;
use crate::cases::push_constants::PushConstants;
use crate::cases::stage::{Stage, StageFlags};
use crate::cases::test_op::TestOp;
use crate::geometry::alias::Point;
use crate::gpu::backend::{
    AabbGeometry, AccessScope, BindingTableRegions, CommandRecorder, RayTracingDevice, StridedRegion,
};
use crate::gpu::result_image::{DEFAULT_CLEAR_VALUE, ImageExtent};
use crate::gpu::shader_groups::{GroupRange, ShaderGroupLayout};
use crate::shader::shader_set::ShaderSet;
use log::debug;

/// Trace calls issued from below the ray generation stage consume one extra
/// recursion level.
#[must_use]
fn required_recursion_depth(case: &CaseDef) -> u32 {
    if case.test_op == TestOp::TraceRay && case.stage != Stage::Raygen { 2 } else { 1 }
}

/// The hit-or-miss switch: the box sits in front of the primary ray except
/// for the miss stage cases, where it is moved behind the origin.
#[must_use]
fn case_geometry(case: &CaseDef) -> AabbGeometry {
    let z = if case.stage == Stage::Miss { 1.0 } else { -1.0 };

    AabbGeometry {
        min: Point::new(0.0, 0.0, z),
        max: Point::new(1.0, 1.0, z),
    }
}

fn binding_table_region<Device: RayTracingDevice>(
    device: &mut Device,
    range: GroupRange,
) -> Result<StridedRegion, CaseError> {
    if !range.is_present() {
        return Ok(StridedRegion::null());
    }

    Ok(device.create_shader_binding_table(range.first_group(), range.group_count())?)
}

/// Runs one case on the device: builds the pipeline and binding tables,
/// records the command sequence, submits it and returns the host-visible
/// copy of the result image.
pub fn execute<Device: RayTracingDevice>(
    device: &mut Device,
    case: &CaseDef,
    push_constants: &PushConstants,
    shaders: &ShaderSet,
    layout: &ShaderGroupLayout,
) -> Result<Vec<u32>, CaseError> {
    let extent = ImageExtent::for_case_grid(case.width, case.height);

    debug!("creating pipeline for {case} with {} shader groups", layout.total_group_count());
    device.create_pipeline(shaders, layout, required_recursion_depth(case))?;

    let regions = BindingTableRegions {
        raygen: binding_table_region(device, layout.raygen())?,
        miss: binding_table_region(device, layout.miss())?,
        hit: binding_table_region(device, layout.hit())?,
        callable: binding_table_region(device, layout.callable())?,
    };

    let mut commands = device.begin_recording();
    commands.push_constants(StageFlags::ALL_RAY_TRACING, bytemuck::bytes_of(push_constants));

    commands.clear_result_image(extent, DEFAULT_CLEAR_VALUE);

    commands.build_bottom_acceleration_structure(&case_geometry(case));
    commands.build_top_acceleration_structure(1);
    commands.memory_barrier(AccessScope::TransferWrite, AccessScope::ShaderReadWrite);

    commands.bind_pipeline_resources();
    commands.trace_rays(&regions, case.width, case.height, 1);
    commands.memory_barrier(AccessScope::ShaderReadWrite, AccessScope::TransferRead);

    commands.copy_image_to_buffer();
    commands.memory_barrier(AccessScope::TransferWrite, AccessScope::HostRead);

    debug!("submitting {case}");
    device.submit_and_wait(commands)?;

    let buffer = device.read_result_buffer()?;
    if buffer.len() != extent.texel_count() as usize {
        return Err(CaseError::internal(format!(
            "device returned {} words, the result image holds {}",
            buffer.len(),
            extent.texel_count(),
        )));
    }

    Ok(buffer)
}
