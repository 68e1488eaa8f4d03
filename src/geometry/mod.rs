use cgmath::{InnerSpace, Matrix4, Vector3, Vector4};
use thiserror::Error;

/// Vectors shorter than this cannot be normalized meaningfully.
pub const EPSILON: f64 = 1e-12;

/// Which kind of data source a plane came from. Cutting planes get their
/// transform re-anchored on the quad centroid; everything else keeps the
/// supplied center as the texture-origin corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    AxisSlice,
    CuttingPlane,
    Projection,
    Unspecified,
}

#[derive(Error, Debug)]
pub enum PlaneError {
    #[error("cannot normalize near-zero vector {0:?}")]
    DegenerateNormal(Vector3<f64>),
    #[error("plane is not normal to a coordinate axis; set east and north vectors explicitly")]
    NonAxisAligned,
    #[error("unsupported data source kind: {0}")]
    UnsupportedSourceKind(String),
}

/// Geometric description of a data plane, before any GPU state exists.
/// `normal` need not be pre-normalized. `east`/`north`, when given, must be
/// unit vectors orthogonal to each other and to the normal; they are used
/// as-is.
#[derive(Debug, Clone)]
pub struct PlaneSpec {
    pub kind: SourceKind,
    pub normal: Vector3<f64>,
    pub center: Vector3<f64>,
    pub width: f64,
    pub height: f64,
    pub east: Option<Vector3<f64>>,
    pub north: Option<Vector3<f64>>,
}

impl PlaneSpec {
    pub fn new(
        kind: SourceKind,
        normal: Vector3<f64>,
        center: Vector3<f64>,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            kind,
            normal,
            center,
            width,
            height,
            east: None,
            north: None,
        }
    }

    pub fn with_basis(mut self, east: Vector3<f64>, north: Vector3<f64>) -> Self {
        self.east = Some(east);
        self.north = Some(north);
        self
    }
}

/// Right-handed in-plane frame: `east` is the texture u axis, `north` the
/// texture v axis, `normal` the unit plane normal.
#[derive(Debug, Clone, Copy)]
pub struct PlaneBasis {
    pub east: Vector3<f64>,
    pub north: Vector3<f64>,
    pub normal: Vector3<f64>,
}

/// Homogeneous transform taking texture-space (u, v, 0, 1) to world space,
/// plus the basis it was built from. Derived fresh whenever the spec
/// changes; never mutated in place.
#[derive(Debug, Clone)]
pub struct PlaneTransform {
    pub to_worldview: Matrix4<f32>,
    pub basis: PlaneBasis,
}

impl PlaneTransform {
    /// World position that texture coordinate (u, v) maps to.
    pub fn apply(&self, u: f32, v: f32) -> Vector3<f32> {
        (self.to_worldview * Vector4::new(u, v, 0.0, 1.0)).truncate()
    }
}

/// Picks the in-plane frame for a spec. Explicit east/north pass through
/// untouched; otherwise the normal must lie exactly on a coordinate axis
/// and the frame is a fixed pair per axis.
pub fn resolve_basis(spec: &PlaneSpec) -> Result<PlaneBasis, PlaneError> {
    let magnitude = spec.normal.magnitude();
    if !magnitude.is_finite() || magnitude < EPSILON {
        return Err(PlaneError::DegenerateNormal(spec.normal));
    }
    let normal = spec.normal / magnitude;

    let (east, north) = match (spec.east, spec.north) {
        (Some(east), Some(north)) => (east, north),
        _ => {
            if normal.x == 0.0 && normal.y == 0.0 {
                (Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0))
            } else if normal.y == 0.0 && normal.z == 0.0 {
                (Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 0.0, 1.0))
            } else if normal.x == 0.0 && normal.z == 0.0 {
                (Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0))
            } else {
                return Err(PlaneError::NonAxisAligned);
            }
        }
    };

    Ok(PlaneBasis {
        east,
        north,
        normal,
    })
}

/// Builds the texture-to-world transform for a plane spec.
///
/// Scale by (width, height) first, then rotate the texture axes onto
/// (east, north, normal), then translate to the center point. For cutting
/// planes the supplied center is not the true center of the mapped quad,
/// so the texture-space centroid is pushed through the transform and the
/// difference translated away afterwards.
pub fn build_transform(spec: &PlaneSpec) -> Result<PlaneTransform, PlaneError> {
    let basis = resolve_basis(spec)?;

    let scale = Matrix4::from_nonuniform_scale(spec.width, spec.height, 1.0);
    let orient = Matrix4::from_cols(
        basis.east.extend(0.0),
        basis.north.extend(0.0),
        basis.normal.extend(0.0),
        Vector4::new(0.0, 0.0, 0.0, 1.0),
    );
    let translate = Matrix4::from_translation(spec.center);

    let mut to_worldview = translate * orient * scale;

    if spec.kind == SourceKind::CuttingPlane {
        let true_center = to_worldview * Vector4::new(0.5, 0.5, 0.0, 1.0);
        let extra = spec.center - true_center.truncate();
        to_worldview = Matrix4::from_translation(extra) * to_worldview;
    }

    Ok(PlaneTransform {
        to_worldview: matrix_to_f32(to_worldview),
        basis,
    })
}

fn matrix_to_f32(m: Matrix4<f64>) -> Matrix4<f32> {
    Matrix4::from_cols(
        m.x.map(|v| v as f32),
        m.y.map(|v| v as f32),
        m.z.map(|v| v as f32),
        m.w.map(|v| v as f32),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: Vector3<f32>, x: f64, y: f64, z: f64) -> bool {
        (actual.x as f64 - x).abs() < 1e-5
            && (actual.y as f64 - y).abs() < 1e-5
            && (actual.z as f64 - z).abs() < 1e-5
    }

    fn orthonormal(basis: &PlaneBasis) {
        assert!((basis.east.magnitude() - 1.0).abs() < 1e-12);
        assert!((basis.north.magnitude() - 1.0).abs() < 1e-12);
        assert!((basis.normal.magnitude() - 1.0).abs() < 1e-12);
        assert!(basis.east.dot(basis.north).abs() < 1e-12);
        assert!(basis.east.dot(basis.normal).abs() < 1e-12);
        assert!(basis.north.dot(basis.normal).abs() < 1e-12);
    }

    #[test]
    fn axis_normals_use_fixed_bases() {
        let cases = [
            // normal, expected east, expected north
            (
                Vector3::new(0.0, 0.0, 4.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            ),
            (
                Vector3::new(-2.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(0.0, 0.0, 1.0),
            ),
            (
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 0.0, 1.0),
            ),
        ];
        for (normal, east, north) in cases.iter() {
            let spec = PlaneSpec::new(
                SourceKind::AxisSlice,
                *normal,
                Vector3::new(0.0, 0.0, 0.0),
                1.0,
                1.0,
            );
            let basis = resolve_basis(&spec).unwrap();
            assert_eq!(basis.east, *east);
            assert_eq!(basis.north, *north);
            assert_eq!(basis.normal, normal / normal.magnitude());
            orthonormal(&basis);
        }
    }

    #[test]
    fn explicit_basis_passes_through() {
        let east = Vector3::new(0.0, -1.0, 0.0);
        let north = Vector3::new(0.0, 0.0, 1.0);
        let spec = PlaneSpec::new(
            SourceKind::CuttingPlane,
            Vector3::new(3.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
            1.0,
            1.0,
        )
        .with_basis(east, north);
        let basis = resolve_basis(&spec).unwrap();
        assert_eq!(basis.east, east);
        assert_eq!(basis.north, north);
        assert_eq!(basis.normal, Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn oblique_normal_needs_explicit_basis() {
        let spec = PlaneSpec::new(
            SourceKind::AxisSlice,
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
            1.0,
            1.0,
        );
        assert!(matches!(
            resolve_basis(&spec),
            Err(PlaneError::NonAxisAligned)
        ));
        assert!(matches!(
            build_transform(&spec),
            Err(PlaneError::NonAxisAligned)
        ));
    }

    #[test]
    fn degenerate_normal_rejected() {
        for normal in [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1e-13),
            Vector3::new(0.0, std::f64::INFINITY, 0.0),
        ]
        .iter()
        {
            let spec = PlaneSpec::new(
                SourceKind::AxisSlice,
                *normal,
                Vector3::new(0.0, 0.0, 0.0),
                1.0,
                1.0,
            );
            assert!(matches!(
                resolve_basis(&spec),
                Err(PlaneError::DegenerateNormal(_))
            ));
        }
    }

    #[test]
    fn slice_anchors_texture_origin_at_center() {
        // 2x2 slice through z = 5: corners land on a square whose (0, 0)
        // corner sits at the supplied center, not its centroid.
        let spec = PlaneSpec::new(
            SourceKind::AxisSlice,
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 0.0, 5.0),
            2.0,
            2.0,
        );
        let transform = build_transform(&spec).unwrap();
        assert!(close(transform.apply(0.0, 0.0), 0.0, 0.0, 5.0));
        assert!(close(transform.apply(1.0, 0.0), 2.0, 0.0, 5.0));
        assert!(close(transform.apply(0.0, 1.0), 0.0, 2.0, 5.0));
        assert!(close(transform.apply(1.0, 1.0), 2.0, 2.0, 5.0));
        // centroid = center + (w/2) east + (h/2) north
        assert!(close(transform.apply(0.5, 0.5), 1.0, 1.0, 5.0));
    }

    #[test]
    fn projection_behaves_like_slice() {
        let spec = PlaneSpec::new(
            SourceKind::Projection,
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            3.0,
            3.0,
        );
        let transform = build_transform(&spec).unwrap();
        assert!(close(transform.apply(0.0, 0.0), 0.0, 1.0, 0.0));
        assert!(close(transform.apply(1.0, 1.0), 3.0, 1.0, 3.0));
    }

    #[test]
    fn cutting_plane_centroid_lands_on_center() {
        let center = Vector3::new(3.0, 3.0, 3.0);
        let normal = Vector3::new(1.0, 0.0, 0.0);
        let north = Vector3::new(0.0, 0.0, 1.0);
        let east = normal.cross(north); // (0, -1, 0)
        assert_eq!(east, Vector3::new(0.0, -1.0, 0.0));

        // Without the correction the centroid sits at center + east + north.
        let uncorrected = build_transform(
            &PlaneSpec::new(SourceKind::Unspecified, normal, center, 2.0, 2.0)
                .with_basis(east, north),
        )
        .unwrap();
        assert!(close(uncorrected.apply(0.5, 0.5), 3.0, 2.0, 4.0));

        let corrected = build_transform(
            &PlaneSpec::new(SourceKind::CuttingPlane, normal, center, 2.0, 2.0)
                .with_basis(east, north),
        )
        .unwrap();
        assert!(close(corrected.apply(0.5, 0.5), 3.0, 3.0, 3.0));
    }

    #[test]
    fn cutting_plane_center_fixed_under_resize() {
        let center = Vector3::new(3.0, 3.0, 3.0);
        let normal = Vector3::new(1.0, 0.0, 0.0);
        let north = Vector3::new(0.0, 0.0, 1.0);
        let east = normal.cross(north);

        for width in [2.0, 5.0].iter() {
            let transform = build_transform(
                &PlaneSpec::new(SourceKind::CuttingPlane, normal, center, *width, *width)
                    .with_basis(east, north),
            )
            .unwrap();
            assert!(close(transform.apply(0.5, 0.5), 3.0, 3.0, 3.0));
            let edge = transform.apply(1.0, 0.0) - transform.apply(0.0, 0.0);
            assert!((edge.magnitude() as f64 - width).abs() < 1e-5);
        }
    }
}
