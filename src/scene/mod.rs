pub mod plane_component;
pub mod plane_data;

pub use plane_component::*;
pub use plane_data::*;
