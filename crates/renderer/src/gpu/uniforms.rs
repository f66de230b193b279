use bytemuck::{Pod, Zeroable};
use hexfield::FrameParams;
use winit::dpi::PhysicalSize;

/// Host mirror of the `HexwipeParams` std140 block in `hexwipe.frag`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct HexwipeUniforms {
    pub aspect: [f32; 2],
    pub time: f32,
    pub transition: f32,
    pub resolution: [f32; 2],
    pub padding: [f32; 2],
}

impl HexwipeUniforms {
    pub fn new(size: PhysicalSize<u32>) -> Self {
        Self::from_params(&FrameParams::for_viewport(size.width, size.height), size)
    }

    pub fn from_params(params: &FrameParams, size: PhysicalSize<u32>) -> Self {
        Self {
            aspect: params.aspect.to_array(),
            time: params.time,
            transition: params.transition,
            resolution: [size.width.max(1) as f32, size.height.max(1) as f32],
            padding: [0.0; 2],
        }
    }

    /// Refreshes the viewport-dependent fields only.
    pub fn set_viewport(&mut self, size: PhysicalSize<u32>) {
        let params = FrameParams::for_viewport(size.width, size.height);
        self.aspect = params.aspect.to_array();
        self.resolution = [size.width.max(1) as f32, size.height.max(1) as f32];
    }

    pub fn set_frame(&mut self, time: f32, transition: f32) {
        self.time = time;
        self.transition = transition;
    }
}
