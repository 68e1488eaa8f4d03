use anyhow::{Context, Result};

use crate::context::graphics::{
    Boundary, GraphicsContext, PlaneBinding, PlaneParams, PlanePipeline, PlaneVertex, Texture2D,
    ToWorldview,
};
use crate::geometry::{build_transform, PlaneSpec, PlaneTransform};
use crate::source::{derive_plane_spec, Frb, FrbSource};

// Texture-space quad, split on the (0,0)-(1,1) diagonal.
fn quad_vertices() -> [PlaneVertex; 4] {
    [
        PlaneVertex::new(1.0, 0.0),
        PlaneVertex::new(0.0, 0.0),
        PlaneVertex::new(0.0, 1.0),
        PlaneVertex::new(1.0, 1.0),
    ]
}

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Value range of an FRB, scanned once per upload. The log range only
/// considers positive samples; either range falls back to [0, 1] when no
/// usable sample exists.
#[derive(Debug, Clone, Copy)]
pub struct DataBounds {
    pub min: f32,
    pub max: f32,
    pub log_min: f32,
    pub log_max: f32,
}

impl DataBounds {
    pub fn scan(frb: &Frb) -> Self {
        let mut min = std::f32::INFINITY;
        let mut max = std::f32::NEG_INFINITY;
        let mut log_min = std::f32::INFINITY;
        let mut log_max = std::f32::NEG_INFINITY;

        for &sample in &frb.data {
            if sample.is_nan() {
                continue;
            }
            min = min.min(sample);
            max = max.max(sample);
            if sample > 0.0 {
                let log = sample.log10();
                log_min = log_min.min(log);
                log_max = log_max.max(log);
            }
        }

        // min > max means the scan never saw a usable sample.
        if min > max {
            min = 0.0;
            max = 1.0;
        }
        if log_min > log_max {
            log_min = 0.0;
            log_max = 1.0;
        }

        DataBounds {
            min,
            max,
            log_min,
            log_max,
        }
    }
}

/// One plane's scene data: its spec, the derived placement transform, the
/// scanned value bounds and all GPU-side state.
pub struct PlaneData {
    pub spec: PlaneSpec,
    pub transform: PlaneTransform,
    pub bounds: DataBounds,
    pub binding: PlaneBinding,
}

impl PlaneData {
    /// Builds GPU state for an already-derived spec.
    pub fn new(
        ctx: &mut GraphicsContext,
        pipeline: &PlanePipeline,
        spec: PlaneSpec,
        frb: &Frb,
    ) -> Result<Self> {
        let transform = build_transform(&spec)
            .with_context(|| format!("Failed to place {:?} plane", spec.kind))?;
        let bounds = DataBounds::scan(frb);
        let texture = Texture2D::from_frb(ctx, frb, Boundary::Clamp, Boundary::Clamp)?;

        let params = PlaneParams {
            vmin: bounds.min,
            vmax: bounds.max,
            log_vmin: bounds.log_min,
            log_vmax: bounds.log_max,
            ..Default::default()
        };
        let binding = pipeline.create_binding(
            ctx,
            &quad_vertices(),
            &QUAD_INDICES,
            texture,
            ToWorldview::from(&transform),
            params,
        );

        Ok(Self {
            spec,
            transform,
            bounds,
            binding,
        })
    }

    /// Fetches a source's FRB and places it the way the source describes
    /// itself.
    pub fn from_source(
        ctx: &mut GraphicsContext,
        pipeline: &PlanePipeline,
        source: &dyn FrbSource,
        field: &str,
        width: f64,
        frb_dims: (u32, u32),
        translate: f64,
    ) -> Result<Self> {
        let frb = source
            .to_frb(field, width, frb_dims)
            .with_context(|| format!("Failed to resample field '{}'", field))?;
        let spec = derive_plane_spec(&source.descriptor(), width, translate)?;
        log::info!(
            "Placing {:?} plane for field '{}' ({}x{} FRB)",
            spec.kind,
            field,
            frb.dims.0,
            frb.dims.1
        );
        Self::new(ctx, pipeline, spec, &frb)
    }

    /// Replaces the spec and FRB contents in place. The new FRB must match
    /// the resolution this plane was created at; the transform is derived
    /// fresh and re-uploaded.
    pub fn reload(
        &mut self,
        ctx: &mut GraphicsContext,
        pipeline: &PlanePipeline,
        spec: PlaneSpec,
        frb: &Frb,
    ) -> Result<()> {
        self.transform = build_transform(&spec)
            .with_context(|| format!("Failed to place {:?} plane", spec.kind))?;
        self.spec = spec;
        self.bounds = DataBounds::scan(frb);
        self.binding.texture.upload(ctx, frb)?;
        pipeline.update_to_worldview(ctx, &self.binding, &ToWorldview::from(&self.transform));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_skip_nans() {
        let frb = Frb::new(
            vec![std::f32::NAN, 2.0, -1.0, std::f32::NAN, 0.5, 8.0],
            (3, 2),
        )
        .unwrap();
        let bounds = DataBounds::scan(&frb);
        assert_eq!(bounds.min, -1.0);
        assert_eq!(bounds.max, 8.0);
    }

    #[test]
    fn log_bounds_use_positive_samples_only() {
        let frb = Frb::new(vec![0.01, 100.0, -5.0, 0.0], (2, 2)).unwrap();
        let bounds = DataBounds::scan(&frb);
        assert!((bounds.log_min + 2.0).abs() < 1e-6);
        assert!((bounds.log_max - 2.0).abs() < 1e-6);
        assert_eq!(bounds.min, -5.0);
        assert_eq!(bounds.max, 100.0);
    }

    #[test]
    fn unusable_data_falls_back_to_unit_range() {
        let frb = Frb::new(vec![std::f32::NAN; 4], (2, 2)).unwrap();
        let bounds = DataBounds::scan(&frb);
        assert_eq!((bounds.min, bounds.max), (0.0, 1.0));
        assert_eq!((bounds.log_min, bounds.log_max), (0.0, 1.0));

        // All-negative data still has linear bounds, but no log range.
        let frb = Frb::new(vec![-3.0, -1.0], (2, 1)).unwrap();
        let bounds = DataBounds::scan(&frb);
        assert_eq!((bounds.min, bounds.max), (-3.0, -1.0));
        assert_eq!((bounds.log_min, bounds.log_max), (0.0, 1.0));
    }
}
