// ABOUTME: CRT post-processing pipeline for the oscilloscope look.
// ABOUTME: Renders a fullscreen triangle that samples the scene with curvature, scanlines and bloom.

use bytemuck::{Pod, Zeroable};
use vcrt_core::EffectSettings;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct CrtUniforms {
    screen_size: [f32; 2],
    scene_size: [f32; 2],
    time: f32,
    curvature: f32,
    scanline_intensity: f32,
    bloom_intensity: f32,
    vignette: f32,
    brightness: f32,
    enabled: u32,
    _pad: f32,
}

impl CrtUniforms {
    fn new(screen: (u32, u32), scene: (u32, u32), time: f32, effects: &EffectSettings) -> Self {
        Self {
            screen_size: [screen.0 as f32, screen.1 as f32],
            scene_size: [scene.0 as f32, scene.1 as f32],
            time,
            curvature: effects.screen_curvature,
            scanline_intensity: effects.scanline_intensity,
            bloom_intensity: effects.bloom,
            vignette: effects.vignette,
            brightness: effects.brightness,
            enabled: u32::from(effects.enabled),
            _pad: 0.0,
        }
    }
}

pub struct CrtPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    time: f32,
}

impl CrtPipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("crt shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../../shaders/crt.wgsl").into()),
        });

        let initial = CrtUniforms::new((1, 1), (1, 1), 0.0, &EffectSettings::flat());
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("crt uniforms"),
            contents: bytemuck::bytes_of(&initial),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // Scene pixels are magnified, so filter linearly; edges clamp by default
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("scene sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("crt bind group layout"),
            entries: &[
                fragment_entry(
                    0,
                    wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<CrtUniforms>() as u64,
                        ),
                    },
                ),
                fragment_entry(
                    1,
                    wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                ),
                fragment_entry(
                    2,
                    wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                ),
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("crt pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        // No vertex buffers: the shader derives a covering triangle from the vertex index
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("crt pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(format.into())],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
            sampler,
            time: 0.0,
        }
    }

    /// Bind the scene texture as the pass input. The pass only ever reads it.
    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        scene_view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("crt bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(scene_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    pub fn update(
        &mut self,
        queue: &wgpu::Queue,
        screen: (u32, u32),
        scene: (u32, u32),
        dt: f32,
        effects: &EffectSettings,
    ) {
        self.time += dt;
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&CrtUniforms::new(screen, scene, self.time, effects)),
        );
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>, bind_group: &wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

fn fragment_entry(binding: u32, ty: wgpu::BindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty,
        count: None,
    }
}
