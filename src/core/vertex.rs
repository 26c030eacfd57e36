use bytemuck::{Pod, Zeroable};

/// Interleaved vertex handed to the renderer for upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}
