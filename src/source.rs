use anyhow::{anyhow, Result};
use cgmath::{InnerSpace, Vector3};

use crate::geometry::{PlaneError, PlaneSpec, SourceKind, EPSILON};

/// Principal coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::new(1.0, 0.0, 0.0),
            Axis::Y => Vector3::new(0.0, 1.0, 0.0),
            Axis::Z => Vector3::new(0.0, 0.0, 1.0),
        }
    }
}

/// What an external data source reports about its own geometry. Kinds we
/// do not know how to place carry their name in `Unsupported` so the
/// failure is a typed error rather than a silent skip.
#[derive(Debug, Clone)]
pub enum SourceDescriptor {
    AxisSlice {
        axis: Axis,
        coord: f64,
    },
    CuttingPlane {
        normal: Vector3<f64>,
        north: Vector3<f64>,
        center: Vector3<f64>,
    },
    Projection {
        axis: Axis,
    },
    Unsupported {
        kind: String,
    },
}

/// Derives the plane spec for a source descriptor.
///
/// Slices sit on their axis at the slice coordinate; projections sit at
/// the unit point on their axis; cutting planes keep the center the
/// source reported and carry a right-handed (east, north, normal) frame
/// built from the source's normal and north vectors. A nonzero
/// `translate` nudges the center along the normal, which keeps a plane
/// off a cell boundary where it would z-fight. Planes are always derived
/// as squares of the requested width.
pub fn derive_plane_spec(
    descriptor: &SourceDescriptor,
    width: f64,
    translate: f64,
) -> Result<PlaneSpec, PlaneError> {
    let mut spec = match descriptor {
        SourceDescriptor::AxisSlice { axis, coord } => PlaneSpec::new(
            SourceKind::AxisSlice,
            axis.unit(),
            axis.unit() * *coord,
            width,
            width,
        ),
        SourceDescriptor::CuttingPlane {
            normal,
            north,
            center,
        } => {
            let north = normalized(*north)?;
            let normal = normalized(*normal)?;
            let east = normal.cross(north);
            PlaneSpec::new(SourceKind::CuttingPlane, normal, *center, width, width)
                .with_basis(east, north)
        }
        SourceDescriptor::Projection { axis } => PlaneSpec::new(
            SourceKind::Projection,
            axis.unit(),
            axis.unit(),
            width,
            width,
        ),
        SourceDescriptor::Unsupported { kind } => {
            return Err(PlaneError::UnsupportedSourceKind(kind.clone()));
        }
    };

    if translate != 0.0 {
        spec.center += spec.normal * translate;
    }

    Ok(spec)
}

fn normalized(v: Vector3<f64>) -> Result<Vector3<f64>, PlaneError> {
    let magnitude = v.magnitude();
    if !magnitude.is_finite() || magnitude < EPSILON {
        return Err(PlaneError::DegenerateNormal(v));
    }
    Ok(v / magnitude)
}

/// A fixed-resolution buffer: one field of a data source resampled on a
/// regular grid over the plane's sample window. Row-major, row 0 at
/// texture coordinate v = 0.
#[derive(Debug, Clone)]
pub struct Frb {
    pub data: Vec<f32>,
    pub dims: (u32, u32),
}

impl Frb {
    pub fn new(data: Vec<f32>, dims: (u32, u32)) -> Result<Self> {
        if dims.0 == 0 || dims.1 == 0 {
            return Err(anyhow!("FRB dimensions {}x{} are empty", dims.0, dims.1));
        }
        if data.len() != (dims.0 as usize) * (dims.1 as usize) {
            return Err(anyhow!(
                "FRB holds {} samples but dimensions are {}x{}",
                data.len(),
                dims.0,
                dims.1
            ));
        }
        Ok(Self { data, dims })
    }
}

/// External data backend for one plane. Resampling, slicing and
/// integration all happen behind `to_frb`; this side only places the
/// result in world space.
pub trait FrbSource {
    fn descriptor(&self) -> SourceDescriptor;

    fn to_frb(&self, field: &str, width: f64, resolution: (u32, u32)) -> Result<Frb>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::build_transform;

    #[test]
    fn axis_slice_sits_on_its_axis() {
        let descriptor = SourceDescriptor::AxisSlice {
            axis: Axis::Y,
            coord: 0.25,
        };
        let spec = derive_plane_spec(&descriptor, 2.0, 0.0).unwrap();
        assert_eq!(spec.kind, SourceKind::AxisSlice);
        assert_eq!(spec.normal, Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(spec.center, Vector3::new(0.0, 0.25, 0.0));
        assert_eq!(spec.width, 2.0);
        assert_eq!(spec.height, 2.0);
        assert!(spec.east.is_none() && spec.north.is_none());
    }

    #[test]
    fn projection_sits_at_unit_point() {
        let descriptor = SourceDescriptor::Projection { axis: Axis::Z };
        let spec = derive_plane_spec(&descriptor, 1.5, 0.0).unwrap();
        assert_eq!(spec.kind, SourceKind::Projection);
        assert_eq!(spec.normal, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(spec.center, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn cutting_plane_builds_right_handed_frame() {
        let descriptor = SourceDescriptor::CuttingPlane {
            normal: Vector3::new(2.0, 0.0, 0.0),
            north: Vector3::new(0.0, 0.0, 3.0),
            center: Vector3::new(3.0, 3.0, 3.0),
        };
        let spec = derive_plane_spec(&descriptor, 2.0, 0.0).unwrap();
        assert_eq!(spec.kind, SourceKind::CuttingPlane);
        assert_eq!(spec.normal, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(spec.north, Some(Vector3::new(0.0, 0.0, 1.0)));
        assert_eq!(spec.east, Some(Vector3::new(0.0, -1.0, 0.0)));
        assert_eq!(spec.center, Vector3::new(3.0, 3.0, 3.0));

        // The derived spec carries the kind tag that re-centers the quad.
        let transform = build_transform(&spec).unwrap();
        let centroid = transform.apply(0.5, 0.5);
        assert!((centroid.x - 3.0).abs() < 1e-5);
        assert!((centroid.y - 3.0).abs() < 1e-5);
        assert!((centroid.z - 3.0).abs() < 1e-5);
    }

    #[test]
    fn translate_nudges_center_along_normal() {
        let descriptor = SourceDescriptor::AxisSlice {
            axis: Axis::X,
            coord: 0.5,
        };
        let spec = derive_plane_spec(&descriptor, 1.0, 0.25).unwrap();
        assert_eq!(spec.center, Vector3::new(0.75, 0.0, 0.0));

        let descriptor = SourceDescriptor::CuttingPlane {
            normal: Vector3::new(0.0, 2.0, 0.0),
            north: Vector3::new(0.0, 0.0, 1.0),
            center: Vector3::new(1.0, 1.0, 1.0),
        };
        let spec = derive_plane_spec(&descriptor, 1.0, 0.5).unwrap();
        assert_eq!(spec.center, Vector3::new(1.0, 1.5, 1.0));
    }

    #[test]
    fn unsupported_kind_is_a_typed_error() {
        let descriptor = SourceDescriptor::Unsupported {
            kind: "particle_cloud".to_string(),
        };
        match derive_plane_spec(&descriptor, 1.0, 0.0) {
            Err(PlaneError::UnsupportedSourceKind(kind)) => assert_eq!(kind, "particle_cloud"),
            other => panic!("expected UnsupportedSourceKind, got {:?}", other),
        }
    }

    #[test]
    fn degenerate_cutting_plane_vectors_rejected() {
        let descriptor = SourceDescriptor::CuttingPlane {
            normal: Vector3::new(1.0, 0.0, 0.0),
            north: Vector3::new(0.0, 0.0, 0.0),
            center: Vector3::new(0.0, 0.0, 0.0),
        };
        assert!(matches!(
            derive_plane_spec(&descriptor, 1.0, 0.0),
            Err(PlaneError::DegenerateNormal(_))
        ));
    }

    #[test]
    fn frb_checks_its_dimensions() {
        assert!(Frb::new(vec![0.0; 6], (3, 2)).is_ok());
        assert!(Frb::new(vec![0.0; 5], (3, 2)).is_err());
        assert!(Frb::new(vec![], (0, 0)).is_err());
    }
}
