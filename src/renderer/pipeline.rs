//! WebGPU render pipeline setup

use super::vertex::{Vertex, colors};

/// Map a canvas-space point to NDC, letterboxed into the viewport so the
/// playfield keeps its aspect ratio. Canvas y grows downward.
pub fn canvas_to_ndc(x: f32, y: f32, canvas: (f32, f32), viewport: (u32, u32)) -> [f32; 2] {
    let (cw, ch) = canvas;
    let (vw, vh) = (viewport.0 as f32, viewport.1 as f32);
    let scale = (vw / cw).min(vh / ch);
    [
        (x - cw / 2.0) * scale / (vw / 2.0),
        -(y - ch / 2.0) * scale / (vh / 2.0),
    ]
}

/// Initial vertex capacity; a busy frame is a few hundred triangles
const INITIAL_VERTICES: u64 = 4096;

/// GPU side of the playfield: surface, one pipeline, one growable vertex buffer
pub struct RenderState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    vertices: wgpu::Buffer,
    /// Logical playfield size the scene is built in
    canvas: (f32, f32),
}

fn vertex_buffer(device: &wgpu::Device, capacity: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("playfield_vertices"),
        size: capacity * std::mem::size_of::<Vertex>() as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

impl RenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        canvas: (f32, f32),
    ) -> Result<Self, wgpu::RequestDeviceError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("lane-rush-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        // Palette is authored as display hex values, so skip the sRGB encode
        let caps = surface.get_capabilities(adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(caps.formats[0]);
        log::info!("Playfield surface {:?} at {}x{}", format, width, height);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("flat_color"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("flat_color_layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("flat_color_pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            // Shapes are wound either way, so no culling
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let vertices = vertex_buffer(&device, INITIAL_VERTICES);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            vertices,
            canvas,
        })
    }

    /// Reapply the current configuration after the surface was lost
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Grow the vertex buffer to at least `count` vertices
    fn reserve(&mut self, count: usize) {
        let capacity = self.vertices.size() / std::mem::size_of::<Vertex>() as u64;
        if count as u64 > capacity {
            let grown = (count as u64).next_power_of_two();
            log::debug!("Growing vertex buffer to {} vertices", grown);
            self.vertices = vertex_buffer(&self.device, grown);
        }
    }

    /// Upload canvas-space triangles and draw them over the background
    pub fn render(&mut self, triangles: &[Vertex]) -> Result<(), wgpu::SurfaceError> {
        let viewport = (self.config.width, self.config.height);
        let ndc: Vec<Vertex> = triangles
            .iter()
            .map(|v| {
                let [x, y] = canvas_to_ndc(v.position[0], v.position[1], self.canvas, viewport);
                Vertex::new(x, y, v.color)
            })
            .collect();
        self.reserve(ndc.len());
        self.queue
            .write_buffer(&self.vertices, 0, bytemuck::cast_slice(&ndc));

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("playfield_frame"),
            });

        let [r, g, b, a] = colors::BACKGROUND.map(f64::from);
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("playfield_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            if !ndc.is_empty() {
                pass.set_pipeline(&self.pipeline);
                pass.set_vertex_buffer(0, self.vertices.slice(..));
                pass.draw(0..ndc.len() as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: (f32, f32) = (480.0, 720.0);

    fn close(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-5 && (a[1] - b[1]).abs() < 1e-5
    }

    #[test]
    fn test_exact_fit_maps_corners() {
        let vp = (480, 720);
        assert!(close(canvas_to_ndc(0.0, 0.0, CANVAS, vp), [-1.0, 1.0]));
        assert!(close(canvas_to_ndc(480.0, 720.0, CANVAS, vp), [1.0, -1.0]));
        assert!(close(canvas_to_ndc(240.0, 360.0, CANVAS, vp), [0.0, 0.0]));
    }

    #[test]
    fn test_wide_viewport_pillarboxes() {
        // Twice as wide as needed: height fills, width uses half
        let vp = (960 * 2, 720 * 2);
        let left = canvas_to_ndc(0.0, 0.0, CANVAS, vp);
        assert!(close(left, [-0.5, 1.0]));
    }

    #[test]
    fn test_tall_viewport_letterboxes() {
        let vp = (480, 1440);
        let top = canvas_to_ndc(0.0, 0.0, CANVAS, vp);
        assert!(close(top, [-1.0, 0.5]));
    }
}
