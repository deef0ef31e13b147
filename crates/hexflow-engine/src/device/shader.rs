use std::fmt;

use super::error::check_build;
use super::{BuildError, Gpu};

/// Shader stage. Each WGSL source holds exactly one stage, with a fixed
/// entry point name.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    pub const fn entry_point(self) -> &'static str {
        match self {
            ShaderKind::Vertex => "vs_main",
            ShaderKind::Fragment => "fs_main",
        }
    }

    const fn label(self) -> &'static str {
        match self {
            ShaderKind::Vertex => "hexflow vertex shader",
            ShaderKind::Fragment => "hexflow fragment shader",
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderKind::Vertex => "vertex",
            ShaderKind::Fragment => "fragment",
        })
    }
}

/// A compiled shader module for one stage.
#[derive(Debug)]
pub struct Shader {
    kind: ShaderKind,
    module: wgpu::ShaderModule,
}

impl Shader {
    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }
}

/// Fixed-function state supplied at link time.
///
/// The pipeline layout itself is derived from the shaders; bind group layouts
/// are read back with `Program::bind_group_layout`.
#[derive(Debug, Clone)]
pub struct ProgramLayout<'a> {
    pub label: Option<&'a str>,
    pub vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub blend: Option<wgpu::BlendState>,
    pub topology: wgpu::PrimitiveTopology,
}

impl Default for ProgramLayout<'_> {
    fn default() -> Self {
        Self {
            label: None,
            vertex_buffers: &[],
            blend: None,
            topology: wgpu::PrimitiveTopology::TriangleList,
        }
    }
}

/// A linked vertex + fragment pair targeting the surface format.
#[derive(Debug)]
pub struct Program {
    pipeline: wgpu::RenderPipeline,
}

impl Program {
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Bind group layout `index` as inferred from the shaders.
    pub fn bind_group_layout(&self, index: u32) -> wgpu::BindGroupLayout {
        self.pipeline.get_bind_group_layout(index)
    }
}

impl Gpu {
    /// Compiles one shader stage from WGSL source.
    ///
    /// Fails with `BuildError::Compile` unless the context is already lost.
    pub async fn build_shader(&self, kind: ShaderKind, source: &str) -> Result<Shader, BuildError> {
        let scope = self.device().push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self.device().create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(kind.label()),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let failure = scope.pop().await.map(|e| BuildError::Compile {
            kind,
            log: e.to_string(),
        });

        check_build(failure, self.is_lost())?;
        log::debug!("{kind} shader compiled");

        Ok(Shader { kind, module })
    }

    /// Links two compiled stages into a render pipeline.
    ///
    /// Fails with `BuildError::Link` unless the context is already lost.
    pub async fn link_program(
        &self,
        vertex: &Shader,
        fragment: &Shader,
        layout: &ProgramLayout<'_>,
    ) -> Result<Program, BuildError> {
        if vertex.kind() != ShaderKind::Vertex || fragment.kind() != ShaderKind::Fragment {
            return Err(BuildError::Link {
                log: format!(
                    "expected vertex + fragment stages, got {} + {}",
                    vertex.kind(),
                    fragment.kind()
                ),
            });
        }

        let scope = self.device().push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self.device().create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: layout.label,
            layout: None,
            vertex: wgpu::VertexState {
                module: vertex.module(),
                entry_point: Some(ShaderKind::Vertex.entry_point()),
                compilation_options: Default::default(),
                buffers: layout.vertex_buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: fragment.module(),
                entry_point: Some(ShaderKind::Fragment.entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format(),
                    blend: layout.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: layout.topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });
        let failure = scope
            .pop()
            .await
            .map(|e| BuildError::Link { log: e.to_string() });

        check_build(failure, self.is_lost())?;
        log::debug!("program {:?} linked", layout.label.unwrap_or("<unnamed>"));

        Ok(Program { pipeline })
    }

    /// Compiles both stages and links them.
    pub async fn build_program(
        &self,
        vertex_src: &str,
        fragment_src: &str,
        layout: &ProgramLayout<'_>,
    ) -> Result<Program, BuildError> {
        let vertex = self.build_shader(ShaderKind::Vertex, vertex_src).await?;
        let fragment = self.build_shader(ShaderKind::Fragment, fragment_src).await?;
        self.link_program(&vertex, &fragment, layout).await
    }
}
