use anyhow::{anyhow, Result};

use super::GraphicsContext;
use crate::source::Frb;

// Buffer-to-texture copies require row strides in multiples of 256 bytes.
const ROW_ALIGNMENT: u32 = 256;

/// How texture samples extend past the [0, 1] texture coordinate range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Clamp,
    Repeat,
    Mirror,
}

impl Boundary {
    fn address_mode(self) -> wgpu::AddressMode {
        match self {
            Boundary::Clamp => wgpu::AddressMode::ClampToEdge,
            Boundary::Repeat => wgpu::AddressMode::Repeat,
            Boundary::Mirror => wgpu::AddressMode::MirrorRepeat,
        }
    }
}

/// An FRB uploaded to the GPU as a single-channel float texture. Sampled
/// with nearest filtering so data values arrive in the shader untouched.
pub struct Texture2D {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub dims: (u32, u32),
}

impl Texture2D {
    pub fn from_frb(
        ctx: &mut GraphicsContext,
        frb: &Frb,
        boundary_u: Boundary,
        boundary_v: Boundary,
    ) -> Result<Self> {
        let (width, height) = frb.dims;

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("frb_texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth: 1,
            },
            array_layer_count: 1,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R32Float,
            usage: wgpu::TextureUsage::SAMPLED | wgpu::TextureUsage::COPY_DST,
        });
        let view = texture.create_default_view();

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: boundary_u.address_mode(),
            address_mode_v: boundary_v.address_mode(),
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            lod_min_clamp: 0.0,
            lod_max_clamp: 0.0,
            compare: wgpu::CompareFunction::Undefined,
        });

        let this = Self {
            texture,
            view,
            sampler,
            dims: (width, height),
        };
        this.upload(ctx, frb)?;
        Ok(this)
    }

    /// Copies FRB samples into the texture. The FRB must match the
    /// resolution the texture was created at.
    pub fn upload(&self, ctx: &mut GraphicsContext, frb: &Frb) -> Result<()> {
        if frb.dims != self.dims {
            return Err(anyhow!(
                "FRB is {}x{} but the texture was created at {}x{}",
                frb.dims.0,
                frb.dims.1,
                self.dims.0,
                self.dims.1
            ));
        }

        let (width, height) = self.dims;
        let (padded, bytes_per_row) = pad_rows(&frb.data, width, height);

        let staging = ctx
            .device
            .create_buffer_with_data(&padded, wgpu::BufferUsage::COPY_SRC);

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("texture_upload_encoder"),
            });
        encoder.copy_buffer_to_texture(
            wgpu::BufferCopyView {
                buffer: &staging,
                offset: 0,
                bytes_per_row,
                rows_per_image: height,
            },
            wgpu::TextureCopyView {
                texture: &self.texture,
                mip_level: 0,
                array_layer: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::Extent3d {
                width,
                height,
                depth: 1,
            },
        );
        ctx.queue.submit(&[encoder.finish()]);

        Ok(())
    }
}

/// Repacks row-major f32 samples with each row padded out to the copy
/// alignment. Returns the padded bytes and the stride used.
fn pad_rows(data: &[f32], width: u32, height: u32) -> (Vec<u8>, u32) {
    let row_bytes = width as usize * 4;
    let bytes_per_row = (width * 4 + ROW_ALIGNMENT - 1) / ROW_ALIGNMENT * ROW_ALIGNMENT;

    let mut padded = vec![0u8; bytes_per_row as usize * height as usize];
    for (row, samples) in data.chunks(width as usize).enumerate() {
        let offset = row * bytes_per_row as usize;
        padded[offset..offset + row_bytes].copy_from_slice(bytemuck::cast_slice(samples));
    }

    (padded, bytes_per_row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_pad_to_copy_alignment() {
        // 5 texels = 20 bytes per row, padded to 256.
        let data = vec![1.0f32; 5 * 3];
        let (padded, bytes_per_row) = pad_rows(&data, 5, 3);
        assert_eq!(bytes_per_row, 256);
        assert_eq!(padded.len(), 256 * 3);

        // 64 texels = 256 bytes exactly, no padding added.
        let data = vec![2.0f32; 64 * 2];
        let (padded, bytes_per_row) = pad_rows(&data, 64, 2);
        assert_eq!(bytes_per_row, 256);
        assert_eq!(padded.len(), 256 * 2);

        // 400 texels = 1600 bytes, padded up to 1664.
        let data = vec![0.0f32; 400];
        let (_, bytes_per_row) = pad_rows(&data, 400, 1);
        assert_eq!(bytes_per_row, 1664);
    }

    #[test]
    fn row_data_lands_at_padded_offsets() {
        let data = vec![1.0f32, 2.0, 3.0, 4.0];
        let (padded, bytes_per_row) = pad_rows(&data, 2, 2);

        let row0 = [1.0f32, 2.0];
        let row1 = [3.0f32, 4.0];
        assert_eq!(&padded[0..8], bytemuck::cast_slice::<f32, u8>(&row0));
        let start = bytes_per_row as usize;
        assert_eq!(&padded[start..start + 8], bytemuck::cast_slice::<f32, u8>(&row1));
    }
}
