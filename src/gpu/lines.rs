//! Link segment rendering.
//!
//! Draws the linker's segment buffer as thin quads. The segment data is
//! produced on the CPU each frame and uploaded into a storage buffer; the
//! vertex shader expands each segment into six vertices by instance index,
//! and the draw call's instance count is the frame's used count, so slots
//! past it are never touched.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::{blend_mode_to_state, DEPTH_FORMAT};
use crate::linker::LineSegment;
use crate::visuals::{BlendMode, Theme};

/// Opacity of link segments.
const LINK_ALPHA: f32 = 0.1;

/// Uniform parameters for the line shader.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct LineParams {
    color: [f32; 3],
    alpha: f32,
}

impl LineParams {
    fn for_theme(theme: Theme) -> Self {
        Self {
            color: theme.link_color().to_array(),
            alpha: LINK_ALPHA,
        }
    }
}

/// GPU resources for link rendering.
pub(crate) struct LineState {
    /// Storage buffer of segment endpoints, two vec4 per segment.
    buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    capacity: u32,
    /// CPU staging for the endpoint pairs, reused across frames.
    scratch: Vec<[f32; 4]>,
}

impl LineState {
    pub(crate) fn new(
        device: &wgpu::Device,
        uniform_buffer: &wgpu::Buffer,
        capacity: u32,
        theme: Theme,
        blend_mode: BlendMode,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Link Segment Buffer"),
            size: capacity as u64 * 2 * 16,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Link Params Buffer"),
            contents: bytemuck::bytes_of(&LineParams::for_theme(theme)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Link Shader"),
            source: wgpu::ShaderSource::Wgsl(LINK_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Link Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Link Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Link Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Link Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(blend_mode_to_state(blend_mode)),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
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
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            buffer,
            params_buffer,
            pipeline,
            bind_group,
            capacity,
            scratch: Vec::with_capacity(capacity as usize * 2),
        }
    }

    /// Upload this frame's segments, truncated to capacity.
    pub(crate) fn upload(&mut self, queue: &wgpu::Queue, segments: &[LineSegment]) -> u32 {
        let used = segments.len().min(self.capacity as usize);

        self.scratch.clear();
        for seg in &segments[..used] {
            self.scratch.push([seg.a.x, seg.a.y, seg.a.z, 0.0]);
            self.scratch.push([seg.b.x, seg.b.y, seg.b.z, 0.0]);
        }
        if used > 0 {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&self.scratch));
        }
        used as u32
    }

    /// Rewrite the color uniform for a theme change.
    pub(crate) fn set_theme(&self, queue: &wgpu::Queue, theme: Theme) {
        queue.write_buffer(
            &self.params_buffer,
            0,
            bytemuck::bytes_of(&LineParams::for_theme(theme)),
        );
    }

    /// Record the draw for `used` segments into an open render pass.
    pub(crate) fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, used: u32) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.draw(0..6, 0..used);
    }
}

pub(crate) const LINK_SHADER: &str = r#"
struct Uniforms {
    proj: mat4x4<f32>,
    view: mat4x4<f32>,
    viewport: vec2<f32>,
    pixel_ratio: f32,
    time: f32,
};

struct LineParams {
    color: vec3<f32>,
    alpha: f32,
};

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(0) @binding(1) var<storage, read> segments: array<vec4<f32>>;
@group(0) @binding(2) var<uniform> params: LineParams;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @builtin(instance_index) instance_index: u32,
) -> VertexOutput {
    let pos_a = segments[instance_index * 2u].xyz;
    let pos_b = segments[instance_index * 2u + 1u].xyz;

    let line_dir = normalize(pos_b - pos_a);

    var perp = cross(line_dir, vec3<f32>(0.0, 1.0, 0.0));
    if length(perp) < 0.001 {
        perp = cross(line_dir, vec3<f32>(1.0, 0.0, 0.0));
    }
    perp = normalize(perp) * 0.15;

    var pos: vec3<f32>;
    switch vertex_index {
        case 0u: { pos = pos_a - perp; }
        case 1u: { pos = pos_a + perp; }
        case 2u: { pos = pos_b - perp; }
        case 3u: { pos = pos_a + perp; }
        case 4u: { pos = pos_b - perp; }
        default: { pos = pos_b + perp; }
    }

    var out: VertexOutput;
    out.clip_position = uniforms.proj * uniforms.view * vec4<f32>(pos, 1.0);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(params.color, params.alpha);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_shader_validates() {
        let module = naga::front::wgsl::parse_str(LINK_SHADER).expect("link shader should parse");
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .expect("link shader should validate");
    }
}
