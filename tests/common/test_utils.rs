use lattice_ngin::{
    camera::{CameraResources, CameraRig, Projection},
    config::SceneConfig,
    context::{headless_device, read_buffer},
    data_structures::texture::Texture,
};

pub(crate) const SIZE: [u32; 2] = [64, 64];
pub(crate) const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Device, queue and a camera, enough to build any drawable without a window.
pub(crate) struct Gpu {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub camera: CameraResources,
}

impl Gpu {
    pub async fn new() -> Self {
        let (device, queue) = headless_device()
            .await
            .expect("integration tests need a graphics adapter");
        let config = SceneConfig::default();
        let camera = CameraResources::new(
            &device,
            CameraRig::new(config.camera_translation),
            Projection::new(SIZE[0], SIZE[1], &config.projection),
        );
        Self {
            device,
            queue,
            camera,
        }
    }

    pub async fn read_floats(&self, buffer: &wgpu::Buffer) -> Vec<f32> {
        let bytes = read_buffer(&self.device, &self.queue, buffer)
            .await
            .expect("readback failed");
        bytemuck::pod_collect_to_vec(&bytes)
    }
}

/// Offscreen colour and depth targets of [`SIZE`].
pub(crate) struct Target {
    pub color: wgpu::TextureView,
    pub depth: Texture,
}

impl Target {
    pub fn new(device: &wgpu::Device) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test target"),
            size: wgpu::Extent3d {
                width: SIZE[0],
                height: SIZE[1],
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Self {
            color: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            depth: Texture::create_depth_texture(device, SIZE, "test depth"),
        }
    }

    /// Runs `record` inside a cleared render pass and submits it.
    pub fn pass<R>(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        record: impl FnOnce(&mut wgpu::RenderPass<'_>) -> R,
    ) -> R {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("test encoder"),
        });
        let result = {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("test pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            record(&mut pass)
        };
        queue.submit(std::iter::once(encoder.finish()));
        result
    }
}

pub(crate) fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Runtime::new()
        .expect("tokio runtime")
        .block_on(future)
}
