//! Topology of the seven-hexagon honeycomb.
//!
//! Points live on the sketch lattice: one `x` step is 15/90 of the scene, one
//! `y` step is 26/90, so hexagon corners and edge midpoints land on (mostly)
//! integral coordinates. Radii are in 1/90 units.

/// Scene units per clip-space unit.
pub const SCALE: f64 = 90.0;

/// Tight bend hugging a hexagon corner.
pub const TIGHT_OUTER: u8 = 20;
pub const TIGHT_INNER: u8 = 10;

/// Wide bend sweeping across a whole hexagon.
pub const WIDE_OUTER: u8 = 50;
pub const WIDE_INNER: u8 = 40;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Lattice {
    pub x: f64,
    pub y: f64,
}

const fn lp(x: f64, y: f64) -> Lattice {
    Lattice { x, y }
}

impl Lattice {
    /// Position in clip space, narrowed to f32 only after the arithmetic.
    pub fn to_clip(self) -> [f32; 2] {
        [
            ((15.0 * self.x - 15.0) / SCALE - 0.5) as f32,
            ((26.0 * self.y - 7.0) / SCALE - 0.5) as f32,
        ]
    }
}

/// Circle bounding one side of a pipe.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ArcSpec {
    pub center: Lattice,
    pub radius: u8,
}

impl ArcSpec {
    /// `[center.x, center.y, radius]` in clip space.
    pub fn to_clip(self) -> [f32; 3] {
        let [x, y] = self.center.to_clip();
        [x, y, (f64::from(self.radius) / SCALE) as f32]
    }
}

/// Outer and inner boundary of a pipe band.
///
/// A fragment is inside the pipe when it is within `outer` and outside
/// `inner`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ArcPair {
    pub outer: ArcSpec,
    pub inner: ArcSpec,
}

const fn arcs(outer: Lattice, outer_r: u8, inner: Lattice, inner_r: u8) -> ArcPair {
    ArcPair {
        outer: ArcSpec { center: outer, radius: outer_r },
        inner: ArcSpec { center: inner, radius: inner_r },
    }
}

const fn tight(center: Lattice) -> ArcPair {
    arcs(center, TIGHT_OUTER, center, TIGHT_INNER)
}

const fn wide(center: Lattice) -> ArcPair {
    arcs(center, WIDE_OUTER, center, WIDE_INNER)
}

/// Junction half: the wide outer sweep, cut by the tight circle of the
/// corner this half wraps.
const fn junction(outer: Lattice, corner: Lattice) -> ArcPair {
    arcs(outer, WIDE_OUTER, corner, TIGHT_INNER)
}

/// One end of a straight band; `arcs` are carried by both corners.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Edge {
    pub ends: [Lattice; 2],
    pub arcs: ArcPair,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Triangles `hub, rim[i], rim[i + 1]`, all sharing `arcs`.
    Fan {
        hub: Lattice,
        rim: &'static [Lattice],
        arcs: ArcPair,
    },
    /// Two triangles spanning a hexagon. Each end carries its own arcs and
    /// interpolation across the band keeps the walls straight.
    Straight { from: Edge, to: Edge },
}

impl Segment {
    pub fn triangle_count(&self) -> usize {
        match self {
            Segment::Fan { rim, .. } => rim.len().saturating_sub(1),
            Segment::Straight { .. } => 2,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CellKind {
    /// Bend between two adjacent edges.
    Corner,
    /// Three-way connector, split around a synthetic midpoint.
    Junction,
    /// A straight through-pipe plus a bend sharing the cell.
    Crossing,
}

/// Position of a cell in the honeycomb, axial coordinates (q, r).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Axial {
    pub q: i8,
    pub r: i8,
}

const fn ax(q: i8, r: i8) -> Axial {
    Axial { q, r }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HexCell {
    pub name: &'static str,
    pub axial: Axial,
    pub kind: CellKind,
    pub segments: &'static [Segment],
}

impl HexCell {
    pub fn triangle_count(&self) -> usize {
        self.segments.iter().map(Segment::triangle_count).sum()
    }
}

/// Synthetic midpoints splitting the two junction cells.
pub const NORTH_WEST_MIDPOINT: Lattice = lp(2.5, 2.5);
pub const NORTH_EAST_MIDPOINT: Lattice = lp(5.5, 2.5);

/// The scene, in draw order.
pub const CELLS: [HexCell; 7] = [
    HexCell {
        name: "south-west",
        axial: ax(-1, 1),
        kind: CellKind::Corner,
        segments: &[Segment::Fan {
            hub: lp(1.0, 1.0),
            rim: &[lp(3.0, 1.0), lp(2.0, 2.0), lp(0.0, 2.0)],
            arcs: tight(lp(2.0, 2.0)),
        }],
    },
    HexCell {
        name: "north-west",
        axial: ax(-1, 0),
        kind: CellKind::Junction,
        segments: &[
            Segment::Fan {
                hub: lp(1.0, 3.0),
                rim: &[lp(2.0, 2.0), NORTH_WEST_MIDPOINT],
                arcs: junction(lp(4.0, 2.0), lp(2.0, 2.0)),
            },
            Segment::Fan {
                hub: lp(1.0, 3.0),
                rim: &[NORTH_WEST_MIDPOINT, lp(3.0, 3.0), lp(2.0, 4.0)],
                arcs: junction(lp(4.0, 2.0), lp(3.0, 3.0)),
            },
            Segment::Fan {
                hub: lp(1.0, 3.0),
                rim: &[lp(0.0, 2.0), lp(2.0, 2.0)],
                arcs: junction(lp(4.0, 2.0), lp(2.0, 2.0)),
            },
        ],
    },
    HexCell {
        name: "south",
        axial: ax(0, 1),
        kind: CellKind::Corner,
        segments: &[Segment::Fan {
            hub: lp(4.0, 0.0),
            rim: &[lp(6.0, 0.0), lp(5.0, 1.0), lp(3.0, 1.0)],
            arcs: tight(lp(5.0, 1.0)),
        }],
    },
    HexCell {
        name: "center",
        axial: ax(0, 0),
        kind: CellKind::Crossing,
        segments: &[
            Segment::Straight {
                from: Edge {
                    ends: [lp(2.0, 2.0), lp(3.0, 1.0)],
                    arcs: tight(lp(2.0, 2.0)),
                },
                to: Edge {
                    ends: [lp(5.0, 3.0), lp(6.0, 2.0)],
                    arcs: tight(lp(5.0, 3.0)),
                },
            },
            Segment::Fan {
                hub: lp(4.0, 2.0),
                rim: &[lp(3.0, 3.0), lp(2.0, 2.0), lp(3.0, 1.0), lp(5.0, 1.0)],
                arcs: wide(lp(1.0, 1.0)),
            },
        ],
    },
    HexCell {
        name: "north",
        axial: ax(0, -1),
        kind: CellKind::Corner,
        segments: &[
            Segment::Fan {
                hub: lp(4.0, 4.0),
                rim: &[lp(5.0, 3.0), lp(6.0, 4.0)],
                arcs: wide(lp(4.0, 2.0)),
            },
            Segment::Fan {
                hub: lp(4.0, 4.0),
                rim: &[lp(2.0, 4.0), lp(3.0, 3.0), lp(5.0, 3.0)],
                arcs: wide(lp(4.0, 2.0)),
            },
        ],
    },
    HexCell {
        name: "south-east",
        axial: ax(1, 0),
        kind: CellKind::Corner,
        segments: &[Segment::Fan {
            hub: lp(7.0, 1.0),
            rim: &[lp(8.0, 2.0), lp(6.0, 2.0), lp(5.0, 1.0), lp(6.0, 0.0)],
            arcs: wide(lp(4.0, 2.0)),
        }],
    },
    HexCell {
        name: "north-east",
        axial: ax(1, -1),
        kind: CellKind::Junction,
        segments: &[
            Segment::Fan {
                hub: lp(7.0, 3.0),
                rim: &[lp(6.0, 4.0), lp(5.0, 3.0), NORTH_EAST_MIDPOINT],
                arcs: junction(lp(4.0, 2.0), lp(5.0, 3.0)),
            },
            Segment::Fan {
                hub: lp(7.0, 3.0),
                rim: &[NORTH_EAST_MIDPOINT, lp(6.0, 2.0), lp(8.0, 2.0)],
                arcs: junction(lp(4.0, 2.0), lp(6.0, 2.0)),
            },
        ],
    },
];
