//! Interfaces of the external device layer. Acceleration structure builds,
//! pipeline and binding table creation, descriptor management and command
//! submission are collaborators supplied by the embedding runner; the
//! harness drives them through these traits and never implements them.

use crate::cases::stage::StageFlags;
use crate::geometry::alias::Point;
use crate::gpu::result_image::ImageExtent;
use crate::gpu::shader_groups::ShaderGroupLayout;
use crate::shader::shader_set::ShaderSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("pipeline creation failed: {what:?}")]
    PipelineCreationError { what: String },
    #[error("shader binding table creation failed: {what:?}")]
    BindingTableCreationError { what: String },
    #[error("command submission failed: {what:?}")]
    SubmissionError { what: String },
    #[error("result readback failed: {what:?}")]
    ReadbackError { what: String },
}

/// Feature bits the case support check consumes before any device work.
#[derive(Clone, Copy, Debug)]
pub struct DeviceFeatures {
    pub acceleration_structure: bool,
    pub ray_tracing_pipeline: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct DeviceProperties {
    pub shader_group_handle_size: u32,
    pub shader_group_base_alignment: u32,
    pub max_ray_recursion_depth: u32,
}

/// One shader binding table region: a device address plus the record
/// stride. The null region stands for an absent group class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StridedRegion {
    pub address: u64,
    pub stride: u32,
    pub size: u32,
}

impl StridedRegion {
    #[must_use]
    pub const fn null() -> Self {
        Self { address: 0, stride: 0, size: 0 }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.address == 0
    }
}

/// Binding table regions handed to the trace call, one per group class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BindingTableRegions {
    pub raygen: StridedRegion,
    pub miss: StridedRegion,
    pub hit: StridedRegion,
    pub callable: StridedRegion,
}

/// Bottom level geometry: one procedural axis-aligned box given by two
/// corner points. Its z coordinate decides whether the primary ray hits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AabbGeometry {
    pub min: Point,
    pub max: Point,
}

/// Memory access scopes joined by a pipeline barrier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessScope {
    TransferWrite,
    TransferRead,
    ShaderReadWrite,
    HostRead,
}

/// Command recording surface. Implementations append to a command buffer;
/// nothing executes until `submit_and_wait`. Layout transitions of the
/// result image are owned by the implementation of `clear_result_image`.
pub trait CommandRecorder {
    fn push_constants(&mut self, stages: StageFlags, data: &[u8]);
    fn clear_result_image(&mut self, extent: ImageExtent, value: u32);
    fn memory_barrier(&mut self, source: AccessScope, destination: AccessScope);
    fn build_bottom_acceleration_structure(&mut self, geometry: &AabbGeometry);
    fn build_top_acceleration_structure(&mut self, instance_count: u32);
    /// Binds the ray tracing pipeline together with the descriptor set:
    /// storage image at binding 0, acceleration structure at binding 1.
    fn bind_pipeline_resources(&mut self);
    fn trace_rays(&mut self, regions: &BindingTableRegions, width: u32, height: u32, depth: u32);
    fn copy_image_to_buffer(&mut self);
}

/// The device-side collaborator. One result image and one host-visible
/// readback buffer exist per case run.
pub trait RayTracingDevice {
    type Recorder: CommandRecorder;

    fn features(&self) -> DeviceFeatures;
    fn properties(&self) -> DeviceProperties;

    fn create_pipeline(
        &mut self,
        shaders: &ShaderSet,
        layout: &ShaderGroupLayout,
        max_recursion_depth: u32,
    ) -> Result<(), DeviceError>;

    fn create_shader_binding_table(&mut self, first_group: u32, group_count: u32) -> Result<StridedRegion, DeviceError>;

    fn begin_recording(&mut self) -> Self::Recorder;
    fn submit_and_wait(&mut self, commands: Self::Recorder) -> Result<(), DeviceError>;

    /// Contents of the host-visible copy after submission, invalidated for
    /// host access: `texel_count` words, row-major, x fastest.
    fn read_result_buffer(&mut self) -> Result<Vec<u32>, DeviceError>;
}
