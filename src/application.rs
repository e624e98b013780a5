use wgpu::SurfaceError;
use winit::{
    dpi::PhysicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    window::{Window, WindowBuilder},
};

/// Window plus the wgpu surface state needed to present a frame. This is the
/// whole "surface provider" seam: the tracer core only ever hands it a
/// finished pixel buffer.
pub struct Screen {
    pub surface: wgpu::Surface,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    window: Window,
}

impl Screen {
    pub async fn new(event_loop: &EventLoopWindowTarget<()>, instance: &wgpu::Instance) -> Self {
        let window = WindowBuilder::new()
            .with_title("sphere-tracer".to_owned())
            .build(event_loop)
            .unwrap();

        // SAFETY:
        // The surface needs to live as long as the window that created it.
        // Screen owns the window so this should be safe.
        let surface = unsafe { instance.create_surface(&window) }.unwrap();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .unwrap();
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    features: adapter.features(),
                    limits: wgpu::Limits::default(),
                    label: None,
                },
                None,
            )
            .await
            .unwrap();
        let size = window.inner_size();
        let config = surface
            .get_default_config(&adapter, size.width, size.height)
            .unwrap();
        surface.configure(&device, &config);

        Self {
            window,
            surface,
            device,
            queue,
            config,
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Resize the screen to new window size.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Resize the screen to current window inner size.
    pub fn resize_to_current(&mut self) {
        self.resize(self.window.inner_size());
    }
}

pub trait Layer: Sized {
    fn start(screen: &mut Screen) -> Self;
    /// Handle one window event; return true when the frame content changed
    /// and a redraw is needed.
    fn process_event(&mut self, event: &WindowEvent, screen: &mut Screen) -> bool;
    fn resize(&mut self, new_size: PhysicalSize<u32>, screen: &mut Screen);
    fn render(&mut self, screen: &mut Screen) -> Result<(), SurfaceError>;
}

pub struct Application<L: Layer + 'static> {
    layer: Option<L>,
    screen: Screen,
}

impl<L: Layer + 'static> Application<L> {
    pub fn new(screen: Screen) -> Self {
        Self {
            screen,
            layer: None,
        }
    }

    /// Waits for input rather than animating. A camera command applies, runs
    /// its full render pass inside `process_event`, and only then asks for a
    /// redraw, so passes never overlap: the event loop is single-threaded and
    /// each pass runs to completion before the next event is taken.
    fn run(
        &mut self,
        event: Event<()>,
        _event_loop: &EventLoopWindowTarget<()>,
        control_flow: &mut ControlFlow,
    ) {
        control_flow.set_wait();

        match event {
            Event::NewEvents(StartCause::Init) => {
                self.layer = Some(L::start(&mut self.screen));
                self.screen.window().request_redraw();
            }
            Event::WindowEvent {
                window_id,
                ref event,
            } if self.screen.window().id() == window_id => {
                let dirty = self
                    .layer
                    .as_mut()
                    .map(|layer| layer.process_event(event, &mut self.screen))
                    .unwrap_or(false);
                if dirty {
                    self.screen.window().request_redraw();
                }

                match event {
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                state: ElementState::Pressed,
                                virtual_keycode: Some(VirtualKeyCode::Escape),
                                ..
                            },
                        ..
                    } => {
                        tracing::info!("exiting");
                        control_flow.set_exit_with_code(0);
                    }
                    WindowEvent::Resized(physical_size) => {
                        self.screen.resize(*physical_size);
                        if let Some(layer) = self.layer.as_mut() {
                            layer.resize(*physical_size, &mut self.screen);
                        }
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.screen.resize(**new_inner_size);
                        if let Some(layer) = self.layer.as_mut() {
                            layer.resize(**new_inner_size, &mut self.screen);
                        }
                    }
                    _ => {}
                }
            }
            Event::RedrawRequested(window_id) if self.screen.window().id() == window_id => {
                match self.layer.as_mut().unwrap().render(&mut self.screen) {
                    Ok(_) => {}
                    Err(SurfaceError::Lost) => self.screen.resize_to_current(),
                    Err(SurfaceError::OutOfMemory) => control_flow.set_exit_with_code(137),
                    Err(e) => tracing::error!("{:?}", e),
                }
            }
            _ => {}
        }
    }

    pub async fn init() {
        let event_loop = EventLoop::new();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let screen = Screen::new(&event_loop, &instance).await;
        let mut application = Self::new(screen);
        event_loop.run(move |event, event_loop, control_flow| {
            application.run(event, event_loop, control_flow);
        });
    }
}
