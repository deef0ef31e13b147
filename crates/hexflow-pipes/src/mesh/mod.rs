//! Procedural pipe mesh.
//!
//! The honeycomb topology in [`layout`] is expanded once into a flat triangle
//! list. Every vertex carries, besides its position, the two circles bounding
//! the pipe it belongs to; the fragment shader turns those into a distance
//! field.

pub mod layout;

use bytemuck::{Pod, Zeroable};

use layout::{ArcPair, HexCell, Lattice, Segment, CELLS};

/// Vertex layout (32 bytes):
///
///  offset  0  position   [f32; 2]   loc 0
///  offset  8  outer_arc  [f32; 3]   loc 1  (.xy = center, .z = radius)
///  offset 20  inner_arc  [f32; 3]   loc 2  (.xy = center, .z = radius)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PipeVertex {
    pub position: [f32; 2],
    pub outer_arc: [f32; 3],
    pub inner_arc: [f32; 3],
}

impl PipeVertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x3, // outer_arc
        2 => Float32x3  // inner_arc
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PipeVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }

    fn at(point: Lattice, arcs: ArcPair) -> Self {
        Self {
            position: point.to_clip(),
            outer_arc: arcs.outer.to_clip(),
            inner_arc: arcs.inner.to_clip(),
        }
    }
}

/// The complete, immutable triangle list for the scene.
#[derive(Debug, Clone)]
pub struct PipeMesh {
    vertices: Vec<PipeVertex>,
}

impl PipeMesh {
    /// Expands the honeycomb table.
    pub fn build() -> Self {
        Self::from_cells(&CELLS)
    }

    pub fn from_cells(cells: &[HexCell]) -> Self {
        let capacity = cells.iter().map(HexCell::triangle_count).sum::<usize>() * 3;
        let mut vertices = Vec::with_capacity(capacity);

        for segment in cells.iter().flat_map(|c| c.segments) {
            emit_segment(segment, &mut vertices);
        }

        debug_assert_eq!(vertices.len(), capacity);
        Self { vertices }
    }

    pub fn vertices(&self) -> &[PipeVertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn triangles(&self) -> impl Iterator<Item = &[PipeVertex; 3]> {
        self.vertices
            .chunks_exact(3)
            .filter_map(|tri| <&[PipeVertex; 3]>::try_from(tri).ok())
    }

    /// Upload format: 8 packed f32 per vertex.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

impl Default for PipeMesh {
    fn default() -> Self {
        Self::build()
    }
}

fn emit_segment(segment: &Segment, out: &mut Vec<PipeVertex>) {
    match segment {
        Segment::Fan { hub, rim, arcs } => {
            for pair in rim.windows(2) {
                out.push(PipeVertex::at(*hub, *arcs));
                out.push(PipeVertex::at(pair[0], *arcs));
                out.push(PipeVertex::at(pair[1], *arcs));
            }
        }
        Segment::Straight { from, to } => {
            let [f0, f1] = from.ends;
            let [t0, t1] = to.ends;
            out.extend([
                PipeVertex::at(f0, from.arcs),
                PipeVertex::at(f1, from.arcs),
                PipeVertex::at(t0, to.arcs),
                PipeVertex::at(f1, from.arcs),
                PipeVertex::at(t1, to.arcs),
                PipeVertex::at(t0, to.arcs),
            ]);
        }
    }
}
