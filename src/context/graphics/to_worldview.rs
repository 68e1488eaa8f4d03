use cgmath::{Matrix4, One};

use crate::geometry::PlaneTransform;

/// Per-plane uniform carrying the texture-to-world matrix.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ToWorldview {
    matrix: Matrix4<f32>,
}

unsafe impl bytemuck::Pod for ToWorldview {}
unsafe impl bytemuck::Zeroable for ToWorldview {}

impl From<&PlaneTransform> for ToWorldview {
    fn from(transform: &PlaneTransform) -> Self {
        Self {
            matrix: transform.to_worldview,
        }
    }
}

impl Default for ToWorldview {
    fn default() -> Self {
        Self {
            matrix: Matrix4::one(),
        }
    }
}
