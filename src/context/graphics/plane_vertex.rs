use cgmath::Vector2;

/// One quad corner in texture space. The same coordinates feed the
/// sampler and, through the to_worldview matrix, the world position.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PlaneVertex {
    pub position: Vector2<f32>,
}

unsafe impl bytemuck::Pod for PlaneVertex {}
unsafe impl bytemuck::Zeroable for PlaneVertex {}

impl PlaneVertex {
    pub fn new(u: f32, v: f32) -> Self {
        Self {
            position: Vector2::new(u, v),
        }
    }

    pub fn desc<'a>() -> wgpu::VertexBufferDescriptor<'a> {
        use std::mem;
        wgpu::VertexBufferDescriptor {
            stride: mem::size_of::<PlaneVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::InputStepMode::Vertex,
            attributes: &[wgpu::VertexAttributeDescriptor {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float2,
            }],
        }
    }
}
