use imgui::{ImStr, ImString};

use super::PlaneData;
use crate::context::graphics::{GraphicsContext, PlaneParams, PlanePipeline};

/// Shader colormap ramps, indexed by the `colormap` uniform.
pub const COLORMAPS: [&str; 3] = ["grey", "fire", "ice"];

/// A drawable plane plus its display controls. The imgui widgets mutate
/// the display state; `sync_params` pushes it to the GPU when something
/// changed.
pub struct Plane {
    pub name: String,
    pub data: PlaneData,
    pub visible: bool,
    take_log: bool,
    colormap: i32,

    visible_label: ImString,
    take_log_label: ImString,
    colormap_label: ImString,
    colormap_items: Vec<ImString>,
}

impl Plane {
    pub fn new(name: &str, data: PlaneData, colormaps: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            data,
            visible: true,
            take_log: false,
            colormap: 0,
            // Labels carry a hidden ##suffix so identical widgets on
            // different planes stay distinct to imgui.
            visible_label: ImString::new(format!("Visible##{}", name)),
            take_log_label: ImString::new(format!("Take log##{}", name)),
            colormap_label: ImString::new(format!("Colormap##{}", name)),
            colormap_items: colormaps.iter().map(|&s| ImString::new(s)).collect(),
        }
    }

    /// Checkbox and listbox block for this plane. Returns whether any
    /// display parameter changed and needs a `sync_params`.
    pub fn render_gui(&mut self, ui: &imgui::Ui) -> bool {
        ui.text(&self.name);
        ui.checkbox(&self.visible_label, &mut self.visible);

        let mut changed = ui.checkbox(&self.take_log_label, &mut self.take_log);

        let items: Vec<&ImStr> = self.colormap_items.iter().map(|s| s.as_ref()).collect();
        changed |= ui.list_box(
            &self.colormap_label,
            &mut self.colormap,
            &items,
            items.len() as i32,
        );

        changed
    }

    pub fn params(&self) -> PlaneParams {
        PlaneParams {
            take_log: self.take_log as u32,
            colormap: self.colormap,
            vmin: self.data.bounds.min,
            vmax: self.data.bounds.max,
            log_vmin: self.data.bounds.log_min,
            log_vmax: self.data.bounds.log_max,
            _pad: [0; 2],
        }
    }

    pub fn sync_params(&self, ctx: &mut GraphicsContext, pipeline: &PlanePipeline) {
        pipeline.update_params(ctx, &self.data.binding, &self.params());
    }

    pub fn draw<'a>(&'a self, pipeline: &'a PlanePipeline, render_pass: &mut wgpu::RenderPass<'a>) {
        if self.visible {
            pipeline.render(render_pass, &self.data.binding);
        }
    }
}
