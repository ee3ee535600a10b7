// ABOUTME: Presents the software canvas and HUD layer through a wgpu fullscreen pass.
// ABOUTME: Static noise, scanlines, and glitch tearing are drawn by the shader.

use bytemuck::{Pod, Zeroable};
use glitch_core::Bitmap;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::gpu::GpuState;

/// Scanline darkening when the scan effect is on
const SCANLINE_STRENGTH: f32 = 0.18;
/// Scanline period in logical pixels
const SCANLINE_PERIOD: f32 = 3.0;
const GLITCH_STRENGTH: f32 = 1.0;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("Failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Surface reports no texture formats")]
    NoSurfaceFormat,
}

/// Overlay state for one presented frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlayParams {
    /// Static noise opacity; 0 hides it
    pub static_opacity: f32,
    pub scanlines: bool,
    pub glitch: bool,
    pub pixel_ratio: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct PresentUniforms {
    screen_size: [f32; 2],
    canvas_size: [f32; 2],
    hud_size: [f32; 2],
    time: f32,
    static_opacity: f32,
    scanline_strength: f32,
    scanline_period: f32,
    glitch_strength: f32,
    _pad: f32,
}

/// A sampled RGBA texture that follows the size of the bitmaps uploaded to it.
struct Layer {
    label: &'static str,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
}

impl Layer {
    fn new(device: &wgpu::Device, label: &'static str, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            label,
            texture,
            view,
            size: (width, height),
        }
    }

    /// Copy the bitmap in. Returns true when the texture had to be recreated.
    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bitmap: &Bitmap) -> bool {
        let size = (bitmap.width(), bitmap.height());
        let recreated = size != self.size;
        if recreated {
            *self = Layer::new(device, self.label, size.0, size.1);
        }

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bitmap.pixels(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * size.0),
                rows_per_image: Some(size.1),
            },
            wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
        );
        recreated
    }
}

pub struct Presenter {
    gpu: GpuState,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    canvas: Layer,
    hud: Layer,
    bind_group: wgpu::BindGroup,
    time: f32,
}

impl Presenter {
    pub async fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        let gpu = GpuState::new(window).await?;
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Present Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/present.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Present Uniform Buffer"),
            contents: bytemuck::cast_slice(&[PresentUniforms::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // Canvas pixels map 1:1 to window pixels
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Present Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Present Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1),
                texture_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Present Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Present Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let canvas = Layer::new(device, "Canvas Texture", 1, 1);
        let hud = Layer::new(device, "HUD Texture", 1, 1);
        let bind_group =
            Self::create_bind_group(device, &bind_group_layout, &uniform_buffer, &sampler, &canvas, &hud);

        Ok(Self {
            gpu,
            pipeline,
            bind_group_layout,
            uniform_buffer,
            sampler,
            canvas,
            hud,
            bind_group,
            time: 0.0,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniforms: &wgpu::Buffer,
        sampler: &wgpu::Sampler,
        canvas: &Layer,
        hud: &Layer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Present Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&canvas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&hud.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn rebind(&mut self) {
        self.bind_group = Self::create_bind_group(
            &self.gpu.device,
            &self.bind_group_layout,
            &self.uniform_buffer,
            &self.sampler,
            &self.canvas,
            &self.hud,
        );
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    pub fn upload_canvas(&mut self, bitmap: &Bitmap) {
        if self.canvas.upload(&self.gpu.device, &self.gpu.queue, bitmap) {
            tracing::debug!("Canvas texture resized to {}x{}", bitmap.width(), bitmap.height());
            self.rebind();
        }
    }

    pub fn upload_hud(&mut self, bitmap: &Bitmap) {
        if self.hud.upload(&self.gpu.device, &self.gpu.queue, bitmap) {
            self.rebind();
        }
    }

    /// Draw one frame to the window.
    pub fn render(&mut self, overlay: OverlayParams, dt_secs: f32) -> Result<(), RenderError> {
        self.time += dt_secs;

        let (width, height) = self.gpu.surface_size();
        let uniforms = PresentUniforms {
            screen_size: [width as f32, height as f32],
            canvas_size: [self.canvas.size.0 as f32, self.canvas.size.1 as f32],
            hud_size: [self.hud.size.0 as f32, self.hud.size.1 as f32],
            time: self.time,
            static_opacity: overlay.static_opacity,
            scanline_strength: if overlay.scanlines { SCANLINE_STRENGTH } else { 0.0 },
            scanline_period: SCANLINE_PERIOD * overlay.pixel_ratio.max(1.0),
            glitch_strength: if overlay.glitch { GLITCH_STRENGTH } else { 0.0 },
            _pad: 0.0,
        };
        self.gpu
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("Surface lost, reconfiguring");
                self.gpu.reconfigure();
                self.gpu.surface.get_current_texture()?
            }
            Err(e) => return Err(e.into()),
        };
        let screen_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Present Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Present Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &screen_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
