//! Decision-tree rule tables (`@RULE` / `@TREE` / `@COLORS`).
//!
//! A tree has one level per neighbor plus one for the centre cell. Level-1
//! nodes hold next states; higher nodes hold child offsets premultiplied by
//! the state count, so a transition is a chain of plain array reads.

mod colors;
mod parse;

pub use colors::{Rgb, default_ramp};
pub use parse::parse;

/// Evaluation order for 8-neighbor trees.
pub const MOORE_ORDER: [&str; 9] = ["NW", "NE", "SW", "SE", "N", "W", "E", "S", "C"];
/// Evaluation order for 4-neighbor trees.
pub const VON_NEUMANN_ORDER: [&str; 5] = ["N", "W", "E", "S", "C"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleTree {
    name: String,
    neighbors: u8,
    states: u16,
    levels: Box<[u8]>,
    entries: Box<[u32]>,
    colors: Box<[Rgb]>,
}

impl RuleTree {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 4 or 8.
    pub fn neighbors(&self) -> u8 {
        self.neighbors
    }

    pub fn states(&self) -> u16 {
        self.states
    }

    pub fn node_count(&self) -> usize {
        self.levels.len()
    }

    /// Level of each node, 1 for leaf nodes.
    pub fn levels(&self) -> &[u8] {
        &self.levels
    }

    /// `node_count * states` entries: next states for level-1 nodes, child
    /// offsets for the others.
    pub fn entries(&self) -> &[u32] {
        &self.entries
    }

    /// One color per state.
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Next state of the centre cell.
    ///
    /// `cells` lists the neighbor states in evaluation order followed by the
    /// centre state (see [`MOORE_ORDER`] and [`VON_NEUMANN_ORDER`]).
    ///
    /// # Panics
    ///
    /// Panics if `cells` has the wrong length or holds a state outside the
    /// rule's state count.
    #[inline]
    pub fn transition(&self, cells: &[u8]) -> u8 {
        assert_eq!(cells.len(), self.neighbors as usize + 1);
        let root = (self.levels.len() - 1) * self.states as usize;
        let mut at = root;
        for &cell in cells {
            assert!(u16::from(cell) < self.states);
            at = self.entries[at + cell as usize] as usize;
        }
        at as u8
    }
}
