//! Application event loop.
//!
//! The driver owns the window and the [`Scene`] and calls [`Scene::render`]
//! once per redraw with the milliseconds elapsed since start-up. Keyboard
//! input is resolved into pose deltas by [`InputState`] and pushed into the
//! scene immediately.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window and the GPU [`Context`]
//! 2. the [`SceneBuilder`] adds the scene's objects
//! 3. every `RedrawRequested` renders one frame and requests the next one
//!
//! A frame that fails with a device error is logged and the next frame tries
//! again; a configuration error stops the loop.

use std::{fmt::Debug, future::Future, iter, pin::Pin, sync::Arc};

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::Window,
};

use crate::{
    config::{InputConfig, SceneConfig},
    context::Context,
    error::SceneError,
    input::InputState,
    scene::Scene,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Handles a scene builder needs to create its objects.
#[derive(Clone, Debug)]
pub struct SceneInit {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub color_format: wgpu::TextureFormat,
    pub size: [u32; 2],
    pub config: SceneConfig,
}

impl SceneInit {
    /// An empty scene for this surface. Builders add their objects to it.
    pub fn empty_scene(&self) -> Scene {
        Scene::new(&self.device, self.color_format, self.size, self.config.clone())
    }
}

/// Builds the scene once the device exists. May load assets asynchronously.
pub type SceneBuilder =
    Box<dyn FnOnce(SceneInit) -> Pin<Box<dyn Future<Output = anyhow::Result<Scene>>>>>;

/// Window, context, scene and input, bundled once initialization completed.
pub struct AppState {
    pub(crate) ctx: Context,
    scene: Scene,
    input: InputState,
    is_surface_configured: bool,
    start: Instant,
}

impl Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("ctx", &self.ctx)
            .field("objects", &self.scene.objects().len())
            .field("is_surface_configured", &self.is_surface_configured)
            .finish()
    }
}

impl AppState {
    async fn new(
        window: Arc<Window>,
        config: SceneConfig,
        input: InputConfig,
        builder: SceneBuilder,
    ) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        let init = SceneInit {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            color_format: ctx.config.format,
            size: ctx.size(),
            config: config.clone(),
        };
        let scene = builder(init).await?;
        log::info!("scene ready with {} objects", scene.objects().len());
        let input = InputState::new(input, config.camera_translation);
        Ok(Self {
            ctx,
            scene,
            input,
            is_surface_configured: false,
            start: Instant::now(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.is_surface_configured = true;
        }
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        if let PhysicalKey::Code(code) = event.physical_key
            && self.input.handle_key(code)
        {
            self.input.apply_to(&mut self.scene);
        }
    }

    fn render(&mut self) -> Result<(), SceneError> {
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.scene.config().clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            let time = self.start.elapsed().as_secs_f64() * 1000.0;
            self.scene.render(&self.ctx.queue, &mut render_pass, time)?;
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub(crate) enum FlowEvent {
    #[allow(dead_code)]
    Initialized(Box<AppState>),
    #[allow(dead_code)]
    Failed(anyhow::Error),
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    state: Option<AppState>,
    config: SceneConfig,
    input: InputConfig,
    // Taken once the window exists.
    builder: Option<SceneBuilder>,
}

impl App {
    fn new(
        event_loop: &EventLoop<FlowEvent>,
        config: SceneConfig,
        input: InputConfig,
        builder: SceneBuilder,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            state: None,
            config,
            input,
            builder: Some(builder),
        })
    }

    fn initialized(&mut self, mut state: AppState) {
        let size = state.ctx.window.inner_size();
        state.resize(size.width, size.height);
        state.input.apply_to(&mut state.scene);
        state.ctx.window.request_redraw();
        self.state = Some(state);
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(builder) = self.builder.take() else {
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("lattice");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("cannot create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let init_future = AppState::new(window, self.config.clone(), self.input, builder);

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(state) => self.initialized(state),
                Err(e) => {
                    log::error!("initialization failed: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok(state) => FlowEvent::Initialized(Box::new(state)),
                    Err(e) => FlowEvent::Failed(e),
                };
                if proxy.send_event(event).is_err() {
                    log::error!("event loop closed before initialization finished");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            // This is the message from our wasm `spawn_local`
            FlowEvent::Initialized(state) => self.initialized(*state),
            FlowEvent::Failed(e) => {
                log::error!("initialization failed: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::KeyboardInput { event, .. } => state.handle_key(&event),
            WindowEvent::RedrawRequested => match state.render() {
                Ok(()) => {}
                // Reconfigure the surface if it's lost or outdated
                Err(SceneError::Surface(
                    wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                )) => {
                    let size = state.ctx.window.inner_size();
                    state.resize(size.width, size.height);
                }
                Err(e) if e.is_configuration() => {
                    log::error!("scene is misconfigured, stopping: {}", e);
                    event_loop.exit();
                }
                Err(e) => {
                    log::warn!("dropped frame: {}", e);
                }
            },
            _ => {}
        }
    }
}

/// Opens a window and drives `builder`'s scene until the window closes.
pub fn run(config: SceneConfig, input: InputConfig, builder: SceneBuilder) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config, input, builder)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
