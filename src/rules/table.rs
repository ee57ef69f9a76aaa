//! Birth/survival lookup tables for totalistic-like rules.
//!
//! One physical array holds both halves: entries with the centre bit clear
//! answer "is a dead cell born", entries with it set answer "does a live cell
//! survive". Cells outside the neighborhood are don't-care bits and every
//! entry is replicated across them, so the engine can index with a raw 3x3
//! (or 13-bit triangular) pattern without masking.

use std::fmt;

/// Neighborhood shape of a rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Neighborhood {
    Moore,
    VonNeumann,
    Hex,
    TriangularAll,
    TriangularEdges,
    TriangularVertices,
    /// Range rules only.
    Circular,
}

// 3x3 index layout:
//   NW=256 N=128 NE=64
//   W=32   C=16  E=8
//   SW=4   S=2   SE=1
pub const NW: u16 = 256;
pub const N: u16 = 128;
pub const NE: u16 = 64;
pub const W: u16 = 32;
pub const CENTER: u16 = 16;
pub const E: u16 = 8;
pub const SW: u16 = 4;
pub const S: u16 = 2;
pub const SE: u16 = 1;

pub const MOORE_MASK: u16 = NW | N | NE | W | E | SW | S | SE;
pub const VON_NEUMANN_MASK: u16 = N | W | E | S;
pub const HEX_MASK: u16 = NW | N | W | E | S | SE;

/// Triangular index: bits 0..=2 edge neighbors, 3..=11 vertex neighbors.
pub const TRI_EDGE_MASK: u16 = 0x007;
pub const TRI_VERTEX_MASK: u16 = 0xff8;
pub const TRI_ALL_MASK: u16 = 0xfff;
pub const TRI_CENTER: u16 = 0x1000;

impl Neighborhood {
    /// Number of neighbors a cell has (range rules report range 1).
    pub const fn max_count(self) -> u8 {
        match self {
            Neighborhood::Moore | Neighborhood::Circular => 8,
            Neighborhood::VonNeumann => 4,
            Neighborhood::Hex => 6,
            Neighborhood::TriangularAll => 12,
            Neighborhood::TriangularEdges => 3,
            Neighborhood::TriangularVertices => 9,
        }
    }

    pub const fn is_triangular(self) -> bool {
        matches!(
            self,
            Neighborhood::TriangularAll
                | Neighborhood::TriangularEdges
                | Neighborhood::TriangularVertices
        )
    }

    /// Bits of the table index that belong to the neighborhood.
    pub const fn neighbor_mask(self) -> u16 {
        match self {
            Neighborhood::Moore | Neighborhood::Circular => MOORE_MASK,
            Neighborhood::VonNeumann => VON_NEUMANN_MASK,
            Neighborhood::Hex => HEX_MASK,
            Neighborhood::TriangularAll => TRI_ALL_MASK,
            Neighborhood::TriangularEdges => TRI_EDGE_MASK,
            Neighborhood::TriangularVertices => TRI_VERTEX_MASK,
        }
    }

    pub const fn center_bit(self) -> u16 {
        if self.is_triangular() { TRI_CENTER } else { CENTER }
    }

    pub const fn table_len(self) -> usize {
        if self.is_triangular() { 8192 } else { 512 }
    }

    /// Postfix used in B/S rule names.
    pub const fn postfix(self) -> &'static str {
        match self {
            Neighborhood::Moore | Neighborhood::Circular => "",
            Neighborhood::VonNeumann => "V",
            Neighborhood::Hex => "H",
            Neighborhood::TriangularAll => "L",
            Neighborhood::TriangularEdges => "LE",
            Neighborhood::TriangularVertices => "LV",
        }
    }

    /// Letter used by range rules (`NM`, `NN`, `NC`).
    pub const fn range_code(self) -> char {
        match self {
            Neighborhood::VonNeumann => 'N',
            Neighborhood::Circular => 'C',
            _ => 'M',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Neighborhood::Moore => "Moore",
            Neighborhood::VonNeumann => "von Neumann",
            Neighborhood::Hex => "hexagonal",
            Neighborhood::TriangularAll => "triangular",
            Neighborhood::TriangularEdges => "triangular edges",
            Neighborhood::TriangularVertices => "triangular vertices",
            Neighborhood::Circular => "circular",
        }
    }
}

/// Combined birth/survival table.
#[derive(Clone, PartialEq, Eq)]
pub struct RuleTable {
    neighborhood: Neighborhood,
    cells: Box<[u8]>,
}

impl RuleTable {
    pub(crate) fn from_cells(neighborhood: Neighborhood, cells: Box<[u8]>) -> Self {
        debug_assert_eq!(cells.len(), neighborhood.table_len());
        Self {
            neighborhood,
            cells,
        }
    }

    pub fn neighborhood(&self) -> Neighborhood {
        self.neighborhood
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Raw entries, one byte per index (0 or 1).
    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }

    /// Next state for a full index (neighbors plus centre bit).
    #[inline(always)]
    pub fn lookup(&self, index: usize) -> bool {
        self.cells[index] != 0
    }

    /// Is a dead cell with this neighbor configuration born.
    #[inline(always)]
    pub fn is_birth(&self, config: usize) -> bool {
        let center = self.neighborhood.center_bit() as usize;
        self.cells[config & !center] != 0
    }

    /// Does a live cell with this neighbor configuration survive.
    #[inline(always)]
    pub fn is_survival(&self, config: usize) -> bool {
        let center = self.neighborhood.center_bit() as usize;
        self.cells[config | center] != 0
    }

    /// Birth with no live neighbors.
    pub fn has_b0(&self) -> bool {
        self.is_birth(0)
    }

    /// Survival with every neighbor alive.
    pub fn has_full_survival(&self) -> bool {
        self.is_survival(self.neighborhood.neighbor_mask() as usize)
    }

    /// Tables that let an engine run a B0 rule without an infinite
    /// background of live cells.
    pub fn b0_emulation(&self) -> B0Emulation {
        if !self.has_b0() {
            return B0Emulation::None;
        }
        let all = self.cells.len() - 1;
        let derive = |f: &dyn Fn(usize) -> bool| -> RuleTable {
            let cells: Box<[u8]> = (0..self.cells.len()).map(|i| u8::from(f(i))).collect();
            RuleTable::from_cells(self.neighborhood, cells)
        };
        if self.has_full_survival() {
            B0Emulation::Inverted(derive(&|i| !self.lookup(i ^ all)))
        } else {
            B0Emulation::Alternating {
                even: derive(&|i| !self.lookup(i)),
                odd: derive(&|i| self.lookup(i ^ all)),
            }
        }
    }
}

impl fmt::Debug for RuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = self.cells.iter().filter(|&&c| c != 0).count();
        f.debug_struct("RuleTable")
            .field("neighborhood", &self.neighborhood)
            .field("len", &self.cells.len())
            .field("set", &set)
            .finish()
    }
}

/// How an engine should run a rule that gives birth on zero neighbors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum B0Emulation {
    /// The rule has no B0 condition.
    None,
    /// B0 with full survival: one table with inverted inputs and output.
    Inverted(RuleTable),
    /// B0 without full survival: the background strobes, so even and odd
    /// generations use different tables.
    Alternating { even: RuleTable, odd: RuleTable },
}
