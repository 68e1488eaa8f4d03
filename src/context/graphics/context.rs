use anyhow::{anyhow, Result};
use winit::window::Window;

pub struct GraphicsContext {
    pub surface: wgpu::Surface,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub sc_desc: wgpu::SwapChainDescriptor,
}

impl GraphicsContext {
    pub async fn new(window: &Window) -> Result<(Self, wgpu::SwapChain)> {
        let size = window.inner_size();
        let surface = wgpu::Surface::create(window);
        let adapter = wgpu::Adapter::request(
            &wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
            },
            wgpu::BackendBit::PRIMARY,
        )
        .await
        .ok_or(anyhow!("Could not acquire adapter"))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                extensions: wgpu::Extensions {
                    anisotropic_filtering: false,
                },
                limits: Default::default(),
            })
            .await;

        let sc_desc = wgpu::SwapChainDescriptor {
            usage: wgpu::TextureUsage::OUTPUT_ATTACHMENT,
            format: wgpu::TextureFormat::Bgra8UnormSrgb,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
        };
        let swap_chain = device.create_swap_chain(&surface, &sc_desc);
        log::info!("Graphics device ready, {}x{} swap chain", size.width, size.height);

        Ok((
            Self {
                surface,
                adapter,
                device,
                queue,
                sc_desc,
            },
            swap_chain,
        ))
    }

    /// Rebuilds the swap chain at a new window size.
    pub fn resize(&mut self, width: u32, height: u32) -> wgpu::SwapChain {
        self.sc_desc.width = width;
        self.sc_desc.height = height;
        self.device.create_swap_chain(&self.surface, &self.sc_desc)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.sc_desc.width as f32 / self.sc_desc.height as f32
    }
}
