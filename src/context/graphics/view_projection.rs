use cgmath::{Deg, Matrix4, One, Point3, Vector3};

/// Camera uniforms, laid out exactly as the shader block expects:
/// projection first, modelview second.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ViewProjection {
    pub projection: Matrix4<f32>,
    pub modelview: Matrix4<f32>,
}

unsafe impl bytemuck::Pod for ViewProjection {}
unsafe impl bytemuck::Zeroable for ViewProjection {}

impl ViewProjection {
    pub fn new(aspect: f32, fovy: f32, eye: Point3<f32>, target: Point3<f32>) -> Self {
        // Remaps the OpenGL-convention clip-space z range [-1, 1] that
        // cgmath::perspective produces onto wgpu's [0, 1].
        #[rustfmt::skip]
        let opengl_to_wgpu_matrix = Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 0.5, 0.0,
            0.0, 0.0, 0.5, 1.0,
        );

        Self {
            projection: opengl_to_wgpu_matrix * cgmath::perspective(Deg(fovy), aspect, 0.1, 100.0),
            modelview: Matrix4::look_at(eye, target, Vector3::unit_z()),
        }
    }
}

impl Default for ViewProjection {
    fn default() -> Self {
        Self {
            projection: Matrix4::one(),
            modelview: Matrix4::one(),
        }
    }
}
