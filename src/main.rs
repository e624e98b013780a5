use image::RgbaImage;
use sphere_tracer::{
    application::{Application, Layer, Screen},
    camera::{Camera, CameraController},
    render::{render_pass, Viewport},
    renderer::{IndexBuffer, Vertex, VertexBuffer, QUAD_INDICES, QUAD_VERTICES},
    scene::{Light, Scene, Sphere},
    texture::Texture,
};
use wgpu::{
    include_wgsl, CommandEncoderDescriptor, PipelineLayoutDescriptor, RenderPassColorAttachment,
    RenderPassDescriptor, RenderPipelineDescriptor, TextureViewDescriptor,
};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, KeyboardInput, VirtualKeyCode, WindowEvent},
};

const IMG_WIDTH: u32 = 800;
const IMG_HEIGHT: u32 = 800;

const MOVE_STEP: f32 = 0.1;
const TURN_STEP: f32 = 5.0;

fn demo_scene() -> Scene {
    Scene::new(
        vec![
            Sphere::new(
                glam::Vec3::new(0.0, -1.0, 3.0),
                1.0,
                glam::Vec3::new(255.0, 0.0, 0.0),
                Some(500.0),
            ),
            Sphere::new(
                glam::Vec3::new(2.0, 0.0, 4.0),
                1.0,
                glam::Vec3::new(0.0, 0.0, 255.0),
                Some(500.0),
            ),
            Sphere::new(
                glam::Vec3::new(-2.0, 0.0, 4.0),
                1.0,
                glam::Vec3::new(0.0, 255.0, 0.0),
                Some(10.0),
            ),
            // Ground: a huge sphere just below the visible three.
            Sphere::new(
                glam::Vec3::new(0.0, -5001.0, 0.0),
                5000.0,
                glam::Vec3::new(255.0, 255.0, 0.0),
                Some(1000.0),
            ),
        ],
        vec![
            Light::Ambient { intensity: 0.2 },
            Light::Point {
                intensity: 0.6,
                position: glam::Vec3::new(2.0, 1.0, 0.0),
            },
            Light::Directional {
                intensity: 0.2,
                direction: glam::Vec3::new(1.0, 4.0, 4.0),
            },
        ],
    )
    .expect("demo scene is statically valid")
}

struct SphereTracer {
    scene: Scene,
    camera: Camera,
    camera_controller: CameraController,
    viewport: Viewport,
    frame: RgbaImage,
    texture: Texture,
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: VertexBuffer,
    index_buffer: IndexBuffer,
    frame_bind_group: wgpu::BindGroup,
}

impl SphereTracer {
    /// Full sweep into the pixel buffer, then refresh the GPU copy.
    fn retrace(&mut self, screen: &Screen) {
        render_pass(&self.scene, &self.camera, self.viewport, &mut self.frame);
        self.texture
            .update_data(&screen.queue, &self.frame, IMG_WIDTH, IMG_HEIGHT);
    }
}

impl Layer for SphereTracer {
    fn start(screen: &mut Screen) -> Self {
        let shader = screen
            .device
            .create_shader_module(include_wgsl!("asset/shader/fullscreen_quad.wgsl"));

        let vertex_buffer = VertexBuffer::init_immediate(
            &screen.device,
            bytemuck::cast_slice(QUAD_VERTICES),
            Some("Vertex Buffer"),
        );
        let index_buffer =
            IndexBuffer::init_immediate_u16(&screen.device, QUAD_INDICES, Some("Index Buffer"));

        let frame = RgbaImage::new(IMG_WIDTH, IMG_HEIGHT);
        let texture = Texture::from_image(
            &screen.device,
            &screen.queue,
            &frame,
            IMG_WIDTH,
            IMG_HEIGHT,
            Some("Frame texture"),
        );

        let texture_bind_group_layout =
            screen
                .device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                multisampled: false,
                                view_dimension: wgpu::TextureViewDimension::D2,
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                    label: Some("texture_bind_group_layout"),
                });

        let frame_bind_group = screen.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
            label: Some("frame_bind_group"),
        });

        let render_pipeline_layout =
            screen
                .device
                .create_pipeline_layout(&PipelineLayoutDescriptor {
                    label: Some("Render Pipeline Layout"),
                    bind_group_layouts: &[&texture_bind_group_layout],
                    push_constant_ranges: &[],
                });

        let render_pipeline = screen
            .device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: Some("Render Pipeline"),
                layout: Some(&render_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_main",
                    buffers: &[Vertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: screen.config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
            });

        let mut layer = Self {
            scene: demo_scene(),
            camera: Camera::default(),
            camera_controller: CameraController::new(MOVE_STEP, TURN_STEP),
            viewport: Viewport::default(),
            frame,
            texture,
            render_pipeline,
            vertex_buffer,
            index_buffer,
            frame_bind_group,
        };
        // First pass at startup; afterwards only camera commands retrace.
        layer.retrace(screen);
        layer
    }

    fn process_event(&mut self, event: &WindowEvent, screen: &mut Screen) -> bool {
        if self
            .camera_controller
            .process_events(&mut self.camera, event)
        {
            self.retrace(screen);
            return true;
        }

        if let WindowEvent::KeyboardInput {
            input:
                KeyboardInput {
                    state: ElementState::Pressed,
                    virtual_keycode: Some(VirtualKeyCode::P),
                    ..
                },
            ..
        } = event
        {
            match self.frame.save("frame.png") {
                Ok(()) => tracing::info!("saved frame.png"),
                Err(e) => tracing::error!("failed to save frame.png: {e}"),
            }
        }
        false
    }

    fn resize(&mut self, _new_size: PhysicalSize<u32>, _screen: &mut Screen) {
        // The traced image has a fixed resolution; the quad stretches with
        // the surface, which Screen already reconfigured.
    }

    fn render(&mut self, screen: &mut Screen) -> Result<(), wgpu::SurfaceError> {
        let output = screen.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&TextureViewDescriptor::default());
        let mut encoder = screen
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.buffer().slice(..));
            render_pass.set_index_buffer(
                self.index_buffer.buffer().slice(..),
                self.index_buffer.format(),
            );
            render_pass.draw_indexed(0..self.index_buffer.count(), 0, 0..1);
        }

        screen.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt::init();
    pollster::block_on(Application::<SphereTracer>::init());
}
