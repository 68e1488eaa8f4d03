mod context;
mod geometry;
mod scene;
mod source;

use anyhow::Result;
use cgmath::{InnerSpace, Point3, Vector3};
use imgui::{im_str, Condition, Window};
use rand::Rng;
use winit::event::WindowEvent;

use context::graphics::{GraphicsContext, PlanePipeline, ViewProjection};
use context::{Application, Ctx};
use geometry::{build_transform, SourceKind};
use scene::{Plane, PlaneData, COLORMAPS};
use source::{derive_plane_spec, Axis, Frb, FrbSource, SourceDescriptor};

const PLANE_WIDTH: f64 = 1.0;
const FRB_DIMS: (u32, u32) = (256, 256);
// Keeps the movable slice just off the sampled coordinate.
const SLICE_NUDGE: f64 = 0.001;

/// Synthetic "density" field: a handful of Gaussian blobs in the unit
/// cube, with a small floor so the log display stays finite everywhere.
struct BlobField {
    blobs: Vec<(Vector3<f64>, f64, f64)>,
}

impl BlobField {
    fn new(count: usize) -> Self {
        let mut rng = rand::thread_rng();
        let blobs = (0..count)
            .map(|_| {
                (
                    Vector3::new(
                        rng.gen_range(0.2, 0.8),
                        rng.gen_range(0.2, 0.8),
                        rng.gen_range(0.2, 0.8),
                    ),
                    rng.gen_range(0.05, 0.25),
                    rng.gen_range(0.5, 4.0),
                )
            })
            .collect();
        Self { blobs }
    }

    fn density(&self, p: Vector3<f64>) -> f64 {
        let mut total = 1e-6;
        for (center, radius, amplitude) in &self.blobs {
            let d2 = (p - center).magnitude2();
            total += amplitude * (-d2 / (2.0 * radius * radius)).exp();
        }
        total
    }

    /// Column average of the field along `direction` through the unit
    /// cube, for the point whose perpendicular foot is on `through`.
    fn integrate(&self, through: Vector3<f64>, direction: Vector3<f64>) -> f64 {
        let steps = 32;
        let foot = through - direction * through.dot(direction);
        let mut total = 0.0;
        for k in 0..steps {
            let t = (k as f64 + 0.5) / steps as f64;
            total += self.density(foot + direction * t);
        }
        total / steps as f64
    }
}

/// Demo data backend: answers `to_frb` by resampling the analytic field
/// across the same placement the viewer derives for the descriptor.
struct DemoSource<'a> {
    field: &'a BlobField,
    descriptor: SourceDescriptor,
}

impl FrbSource for DemoSource<'_> {
    fn descriptor(&self) -> SourceDescriptor {
        self.descriptor.clone()
    }

    fn to_frb(&self, _field: &str, width: f64, resolution: (u32, u32)) -> Result<Frb> {
        let spec = derive_plane_spec(&self.descriptor, width, 0.0)?;
        let transform = build_transform(&spec)?;

        let (w, h) = resolution;
        let mut data = Vec::with_capacity(w as usize * h as usize);
        for j in 0..h {
            for i in 0..w {
                let u = (i as f32 + 0.5) / w as f32;
                let v = (j as f32 + 0.5) / h as f32;
                let p = transform.apply(u, v);
                let p = Vector3::new(p.x as f64, p.y as f64, p.z as f64);

                let value = match spec.kind {
                    SourceKind::Projection => self.field.integrate(p, spec.normal),
                    _ => self.field.density(p),
                };
                data.push(value as f32);
            }
        }

        Frb::new(data, resolution)
    }
}

fn build_planes(
    ctx: &mut GraphicsContext,
    pipeline: &PlanePipeline,
    field: &BlobField,
    slice_coord: f64,
) -> Result<Vec<Plane>> {
    let descriptors = vec![
        (
            "z slice",
            SourceDescriptor::AxisSlice {
                axis: Axis::Z,
                coord: slice_coord,
            },
            SLICE_NUDGE,
        ),
        (
            "oblique cut",
            SourceDescriptor::CuttingPlane {
                normal: Vector3::new(1.0, 1.0, 0.0),
                north: Vector3::new(0.0, 0.0, 1.0),
                center: Vector3::new(0.5, 0.5, 0.5),
            },
            0.0,
        ),
        (
            "x projection",
            SourceDescriptor::Projection { axis: Axis::X },
            0.0,
        ),
    ];

    descriptors
        .into_iter()
        .map(|(name, descriptor, translate)| {
            let source = DemoSource { field, descriptor };
            let data = PlaneData::from_source(
                ctx,
                pipeline,
                &source,
                "density",
                PLANE_WIDTH,
                FRB_DIMS,
                translate,
            )?;
            Ok(Plane::new(name, data, &COLORMAPS))
        })
        .collect()
}

fn reload_slice(
    ctx: &mut GraphicsContext,
    pipeline: &PlanePipeline,
    field: &BlobField,
    plane: &mut Plane,
    coord: f64,
) -> Result<()> {
    let descriptor = SourceDescriptor::AxisSlice {
        axis: Axis::Z,
        coord,
    };
    let source = DemoSource {
        field,
        descriptor: descriptor.clone(),
    };
    let frb = source.to_frb("density", PLANE_WIDTH, FRB_DIMS)?;
    let spec = derive_plane_spec(&descriptor, PLANE_WIDTH, SLICE_NUDGE)?;
    plane.data.reload(ctx, pipeline, spec, &frb)?;
    plane.sync_params(ctx, pipeline);
    Ok(())
}

struct PlaneViewer {
    pipeline: PlanePipeline,
    depth_texture_view: wgpu::TextureView,
    field: BlobField,
    planes: Vec<Plane>,
    slice_coord: f64,
    frames: usize,
}

impl Application for PlaneViewer {
    fn init(ctx: &mut Ctx) -> Self {
        let pipeline = PlanePipeline::new(&ctx.graphics_ctx).unwrap();
        let depth_texture_view = pipeline.create_depth_texture(&ctx.graphics_ctx);

        let field = BlobField::new(6);
        let slice_coord = 0.5;
        let planes =
            build_planes(&mut ctx.graphics_ctx, &pipeline, &field, slice_coord).unwrap();

        PlaneViewer {
            pipeline,
            depth_texture_view,
            field,
            planes,
            slice_coord,
            frames: 0,
        }
    }

    fn resize(&mut self, ctx: &mut Ctx) {
        self.depth_texture_view = self.pipeline.create_depth_texture(&ctx.graphics_ctx);
    }

    fn on_event(&mut self, _ctx: &mut Ctx, _event: WindowEvent) {}

    fn update(&mut self, _ctx: &mut Ctx) {
        self.frames += 1;
    }

    fn render<'ui>(
        &mut self,
        ctx: &mut GraphicsContext,
        frame: &wgpu::SwapChainOutput,
        ui: &imgui::Ui<'ui>,
    ) {
        // slow orbit around the cube
        let angle = self.frames as f32 * 0.003;
        let eye = Point3::new(0.5 + 2.2 * angle.cos(), 0.5 + 2.2 * angle.sin(), 1.6);
        let target = Point3::new(0.5, 0.5, 0.5);
        let view_proj = ViewProjection::new(ctx.aspect_ratio(), 45.0, eye, target);
        self.pipeline.update_view_proj(ctx, &view_proj);

        let pipeline = &self.pipeline;
        let field = &self.field;
        let planes = &mut self.planes;
        let slice_coord = &mut self.slice_coord;

        Window::new(im_str!("Planes"))
            .size([330.0, 420.0], Condition::FirstUseEver)
            .build(ui, || {
                ui.text(im_str!("Slice coordinate"));
                let mut step = 0.0;
                if ui.small_button(im_str!("-")) {
                    step = -0.05;
                }
                ui.same_line(0.0);
                if ui.small_button(im_str!("+")) {
                    step = 0.05;
                }
                ui.same_line(0.0);
                ui.text(format!("z = {:.2}", *slice_coord));

                if step != 0.0 {
                    *slice_coord = (*slice_coord + step).max(0.0).min(1.0);
                    if let Err(e) =
                        reload_slice(ctx, pipeline, field, &mut planes[0], *slice_coord)
                    {
                        log::error!("Failed to rebuild slice: {}", e);
                    }
                }

                for plane in planes.iter_mut() {
                    ui.separator();
                    if plane.render_gui(ui) {
                        plane.sync_params(ctx, pipeline);
                    }
                }
            });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("plane_render_encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                color_attachments: &[wgpu::RenderPassColorAttachmentDescriptor {
                    attachment: &frame.view,
                    resolve_target: None,
                    load_op: wgpu::LoadOp::Clear,
                    store_op: wgpu::StoreOp::Store,
                    clear_color: wgpu::Color {
                        r: 0.02,
                        g: 0.02,
                        b: 0.03,
                        a: 1.0,
                    },
                }],
                depth_stencil_attachment: Some(
                    wgpu::RenderPassDepthStencilAttachmentDescriptor {
                        attachment: &self.depth_texture_view,
                        depth_load_op: wgpu::LoadOp::Clear,
                        depth_store_op: wgpu::StoreOp::Store,
                        clear_depth: 1.0,
                        stencil_load_op: wgpu::LoadOp::Clear,
                        stencil_store_op: wgpu::StoreOp::Store,
                        clear_stencil: 0,
                    },
                ),
            });

            for plane in self.planes.iter() {
                plane.draw(&self.pipeline, &mut render_pass);
            }
        }

        ctx.queue.submit(&[encoder.finish()]);
    }
}

fn main() -> Result<()> {
    env_logger::init();
    futures::executor::block_on(context::run::<PlaneViewer>("planevis", (1024, 768)))
}
