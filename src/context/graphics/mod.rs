pub mod context;
pub mod plane_pipeline;
pub mod plane_vertex;
pub mod texture;
pub mod to_worldview;
pub mod view_projection;

pub use context::*;
pub use plane_pipeline::*;
pub use plane_vertex::*;
pub use texture::*;
pub use to_worldview::*;
pub use view_projection::*;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
