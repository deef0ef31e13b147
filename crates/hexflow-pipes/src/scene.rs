//! The animated pipes scene.

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use hexflow_engine::device::{Gpu, Program, ProgramLayout};
use hexflow_engine::host::Scene;
use hexflow_engine::time::FrameTime;

use crate::mesh::{PipeMesh, PipeVertex};

const VERTEX_SHADER: &str = include_str!("shaders/pipes_vertex.wgsl");
const FRAGMENT_SHADER: &str = include_str!("shaders/pipes_fragment.wgsl");

// ── blend ─────────────────────────────────────────────────────────────────

/// Non-premultiplied "over": `src * a + dst * (1 - a)` on every channel.
fn straight_alpha_blend() -> wgpu::BlendState {
    let over = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: over,
        alpha: over,
    }
}

// ── time uniform ──────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct TimeUniform {
    seconds: f32,
    _pad: [f32; 3], // 16-byte alignment
}

impl TimeUniform {
    fn new(seconds: f32) -> Self {
        Self {
            seconds,
            _pad: [0.0; 3],
        }
    }
}

// ── scene ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct PipeSceneConfig {
    /// Background behind the pipes.
    pub clear: wgpu::Color,
}

impl Default for PipeSceneConfig {
    fn default() -> Self {
        Self {
            clear: wgpu::Color::WHITE,
        }
    }
}

/// Seven hexagons of rainbow pipes, hue cycling with time.
///
/// The mesh is built once up front; every session uploads it to a fresh
/// context.
pub struct PipeScene {
    config: PipeSceneConfig,
    mesh: PipeMesh,
}

impl PipeScene {
    pub fn new(config: PipeSceneConfig) -> Self {
        Self {
            config,
            mesh: PipeMesh::build(),
        }
    }

    pub fn mesh(&self) -> &PipeMesh {
        &self.mesh
    }
}

impl Default for PipeScene {
    fn default() -> Self {
        Self::new(PipeSceneConfig::default())
    }
}

/// GPU objects for one session. Dropped on context loss.
pub struct PipeState {
    program: Program,
    vertices: wgpu::Buffer,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_count: u32,
}

impl Scene<Gpu> for PipeScene {
    type State = PipeState;

    async fn setup(&mut self, gpu: &mut Gpu) -> Result<PipeState> {
        let buffers = [PipeVertex::layout()];
        let program = gpu
            .build_program(
                VERTEX_SHADER,
                FRAGMENT_SHADER,
                &ProgramLayout {
                    label: Some("pipes pipeline"),
                    vertex_buffers: &buffers,
                    blend: Some(straight_alpha_blend()),
                    topology: wgpu::PrimitiveTopology::TriangleList,
                },
            )
            .await
            .context("failed to build pipes program")?;

        let device = gpu.device();

        // COPY_DST keeps the buffer rewritable.
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pipes vertices"),
            contents: self.mesh.as_bytes(),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pipes time uniform"),
            contents: bytemuck::bytes_of(&TimeUniform::new(0.0)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pipes bind group"),
            layout: &program.bind_group_layout(0),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });

        log::info!(
            "pipes scene ready: {} vertices ({} bytes)",
            self.mesh.vertex_count(),
            self.mesh.as_bytes().len()
        );

        Ok(PipeState {
            program,
            vertices,
            uniforms,
            bind_group,
            vertex_count: self.mesh.vertex_count(),
        })
    }

    async fn paint(&mut self, gpu: &mut Gpu, state: &mut PipeState, time: FrameTime) -> Result<()> {
        gpu.queue()
            .write_buffer(&state.uniforms, 0, bytemuck::bytes_of(&TimeUniform::new(time.elapsed)));

        gpu.render(self.config.clear, |rpass| {
            rpass.set_pipeline(state.program.pipeline());
            rpass.set_bind_group(0, &state.bind_group, &[]);
            rpass.set_vertex_buffer(0, state.vertices.slice(..));
            rpass.draw(0..state.vertex_count, 0..1);
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hexflow_engine::device::ShaderKind;

    use super::*;

    #[test]
    fn time_uniform_is_one_vec4() {
        assert_eq!(std::mem::size_of::<TimeUniform>(), 16);
        let uniform = TimeUniform::new(1.5);
        let bytes = bytemuck::bytes_of(&uniform);
        assert_eq!(&bytes[..4], &1.5f32.to_ne_bytes());
    }

    // ── shaders ───────────────────────────────────────────────────────────

    fn validate_wgsl(source: &str) -> Result<naga::Module, String> {
        let module =
            naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .map_err(|e| format!("{e:?}"))?;
        Ok(module)
    }

    fn has_entry(module: &naga::Module, stage: naga::ShaderStage, name: &str) -> bool {
        module
            .entry_points
            .iter()
            .any(|ep| ep.stage == stage && ep.name == name)
    }

    #[test]
    fn vertex_shader_validates() {
        let module = validate_wgsl(VERTEX_SHADER).unwrap();
        assert!(has_entry(&module, naga::ShaderStage::Vertex, ShaderKind::Vertex.entry_point()));
    }

    #[test]
    fn fragment_shader_validates() {
        let module = validate_wgsl(FRAGMENT_SHADER).unwrap();
        assert!(has_entry(
            &module,
            naga::ShaderStage::Fragment,
            ShaderKind::Fragment.entry_point()
        ));
    }

    #[test]
    fn malformed_wgsl_is_rejected() {
        let broken = FRAGMENT_SHADER.replace("let d = min(", "let d = min(;");
        assert!(validate_wgsl(&broken).is_err());
        assert!(validate_wgsl("@fragment fn fs_main() -> @location(0) vec4<f32> { return 1.0; }").is_err());
    }

    #[test]
    fn blend_is_straight_alpha_over() {
        let blend = straight_alpha_blend();
        assert_eq!(blend.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
        assert_eq!(blend.alpha, blend.color);
    }

    #[test]
    fn default_scene_clears_to_white() {
        let scene = PipeScene::default();
        assert_eq!(scene.config.clear, wgpu::Color::WHITE);
        assert_eq!(scene.mesh().vertex_count(), 69);
    }
}
