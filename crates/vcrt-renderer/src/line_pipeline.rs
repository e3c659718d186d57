// ABOUTME: Thick-line pipeline for the legacy display mode.
// ABOUTME: Expands each line into a quad in scene pixel space and draws it in the beam color.

use bytemuck::{Pod, Zeroable};
use vcrt_core::Point;
use wgpu::util::DeviceExt;

/// Matches the legacy display's point limit (two points per line)
pub const MAX_LINES: usize = 32_768;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct LineVertex {
    position: [f32; 2],
}

impl LineVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct Uniforms {
    color: [f32; 4],
    scene_size: [f32; 2],
    _padding: [f32; 2],
}

pub struct LinePipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: u32,
    thickness: f32,
}

impl LinePipeline {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        scene_size: (u32, u32),
        color: [f32; 3],
        thickness: f32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../../shaders/line.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("line uniforms"),
            contents: bytemuck::bytes_of(&Uniforms {
                color: [color[0], color[1], color[2], 1.0],
                scene_size: [scene_size.0 as f32, scene_size.1 as f32],
                _padding: [0.0, 0.0],
            }),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("line bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("line bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("line pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        // Lines overwrite the cleared scene; no blending needed
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[LineVertex::desc()],
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

        let vertex_buffer = streaming_buffer(
            device,
            "line vertices",
            MAX_LINES * 4 * std::mem::size_of::<LineVertex>(),
            wgpu::BufferUsages::VERTEX,
        );
        let index_buffer = streaming_buffer(
            device,
            "line indices",
            MAX_LINES * 6 * std::mem::size_of::<u32>(),
            wgpu::BufferUsages::INDEX,
        );

        Self {
            pipeline,
            bind_group,
            vertex_buffer,
            index_buffer,
            num_indices: 0,
            thickness,
        }
    }

    /// Build quads for this frame's lines (scene pixel coordinates)
    pub fn prepare(&mut self, queue: &wgpu::Queue, lines: impl Iterator<Item = (Point, Point)>) {
        let (vertices, indices) = build_quads(lines.take(MAX_LINES), self.thickness);

        if !vertices.is_empty() {
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
            queue.write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&indices));
        }

        self.num_indices = indices.len() as u32;
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.num_indices == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.num_indices, 0, 0..1);
    }
}

/// A buffer rewritten from the CPU every frame
fn streaming_buffer(
    device: &wgpu::Device,
    label: &str,
    size: usize,
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: size as wgpu::BufferAddress,
        usage: usage | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn build_quads(
    lines: impl Iterator<Item = (Point, Point)>,
    thickness: f32,
) -> (Vec<LineVertex>, Vec<u32>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let half = thickness.max(1.0) / 2.0;

    for (a, b) in lines {
        let vertex = |p: Point| LineVertex {
            position: [p.x, p.y],
        };
        let base = vertices.len() as u32;

        match (b - a).try_normalize() {
            Some(direction) => {
                let normal = Point::new(-direction.y, direction.x) * half;
                vertices.extend([a + normal, a - normal, b - normal, b + normal].map(vertex));
            }
            // A zero-length line still shows as a dot
            None => {
                vertices.extend(
                    [
                        a + Point::new(-half, -half),
                        a + Point::new(half, -half),
                        a + Point::new(half, half),
                        a + Point::new(-half, half),
                    ]
                    .map(vertex),
                );
            }
        }
        indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_quad_per_line() {
        let lines = vec![
            (Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
            (Point::new(5.0, 5.0), Point::new(5.0, 9.0)),
        ];
        let (vertices, indices) = build_quads(lines.into_iter(), 2.0);
        assert_eq!(vertices.len(), 8);
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn quad_is_offset_by_half_thickness() {
        let lines = vec![(Point::new(0.0, 0.0), Point::new(10.0, 0.0))];
        let (vertices, _) = build_quads(lines.into_iter(), 4.0);
        assert_eq!(vertices[0].position, [0.0, 2.0]);
        assert_eq!(vertices[1].position, [0.0, -2.0]);
        assert_eq!(vertices[2].position, [10.0, -2.0]);
        assert_eq!(vertices[3].position, [10.0, 2.0]);
    }

    #[test]
    fn degenerate_line_becomes_dot() {
        let p = Point::new(3.0, 3.0);
        let (vertices, indices) = build_quads(std::iter::once((p, p)), 2.0);
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices.len(), 6);
        assert_eq!(vertices[0].position, [2.0, 2.0]);
        assert_eq!(vertices[2].position, [4.0, 4.0]);
    }
}
