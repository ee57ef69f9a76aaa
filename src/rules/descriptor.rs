//! The decoded form of a rule string.

use std::fmt;

use super::bounded::BoundedGrid;
use super::table::{B0Emulation, Neighborhood, RuleTable};
use crate::ruletree::RuleTree;

/// Extra marker states layered on a two-state rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Marker {
    #[default]
    Plain,
    History,
    Super,
    Niemiec,
}

impl Marker {
    pub const fn states(self) -> u16 {
        match self {
            Marker::Plain => 2,
            Marker::History | Marker::Niemiec => 7,
            Marker::Super => 26,
        }
    }

    pub const fn postfix(self) -> &'static str {
        match self {
            Marker::Plain => "",
            Marker::History => "History",
            Marker::Super => "Super",
            Marker::Niemiec => "Niemiec",
        }
    }
}

/// Where a totalistic-like table came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TableSource {
    /// Built from B/S digits and letters, always isotropic.
    Isotropic,
    /// Taken verbatim from a MAP string.
    Map,
    /// Wolfram elementary rule run as a 2D rule.
    Wolfram(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TotalisticRule {
    table: RuleTable,
    source: TableSource,
}

impl TotalisticRule {
    pub(crate) fn new(table: RuleTable, source: TableSource) -> Self {
        Self { table, source }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn source(&self) -> TableSource {
        self.source
    }

    pub fn wolfram(&self) -> Option<u32> {
        match self.source {
            TableSource::Wolfram(n) => Some(n),
            _ => None,
        }
    }

    #[inline]
    pub fn is_birth(&self, config: usize) -> bool {
        self.table.is_birth(config)
    }

    #[inline]
    pub fn is_survival(&self, config: usize) -> bool {
        self.table.is_survival(config)
    }

    pub fn b0_emulation(&self) -> B0Emulation {
        self.table.b0_emulation()
    }
}

/// Dense birth/survival arrays indexed by live neighbor count (centre
/// excluded), `0..=max_count`.
#[derive(Clone, PartialEq, Eq)]
pub struct HrotCounts {
    birth: Box<[u8]>,
    survival: Box<[u8]>,
}

impl HrotCounts {
    pub(crate) fn new(birth: Box<[u8]>, survival: Box<[u8]>) -> Self {
        debug_assert_eq!(birth.len(), survival.len());
        Self { birth, survival }
    }

    pub fn max_count(&self) -> usize {
        self.birth.len() - 1
    }

    #[inline]
    pub fn is_birth(&self, count: usize) -> bool {
        self.birth.get(count).is_some_and(|&b| b != 0)
    }

    #[inline]
    pub fn is_survival(&self, count: usize) -> bool {
        self.survival.get(count).is_some_and(|&s| s != 0)
    }

    pub fn birth(&self) -> &[u8] {
        &self.birth
    }

    pub fn survival(&self) -> &[u8] {
        &self.survival
    }
}

impl fmt::Debug for HrotCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ones = |v: &[u8]| v.iter().filter(|&&x| x != 0).count();
        f.debug_struct("HrotCounts")
            .field("max_count", &self.max_count())
            .field("birth", &ones(&self.birth))
            .field("survival", &ones(&self.survival))
            .finish()
    }
}

/// Larger than Life rule. Survival bounds are stored counting the centre
/// cell; birth bounds never include it.
///
/// `counts` is indexed by neighbors excluding the centre, like HROT, so
/// survival counts `survival_min..=survival_max` land at indices
/// `survival_min - 1..=survival_max - 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LtlRule {
    pub range: u32,
    pub middle_included: bool,
    pub survival_min: u32,
    pub survival_max: u32,
    pub birth_min: u32,
    pub birth_max: u32,
    pub counts: HrotCounts,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HrotRule {
    pub range: u32,
    pub counts: HrotCounts,
}

/// A 2x2 block transition table.
///
/// Block values pack the cells as `NW=8 NE=4 SW=2 SE=1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BlockRule {
    table: [u8; 16],
}

impl BlockRule {
    pub(crate) fn new(table: [u8; 16]) -> Self {
        Self { table }
    }

    #[inline]
    pub fn next(&self, block: u8) -> u8 {
        self.table[(block & 15) as usize]
    }

    pub fn table(&self) -> &[u8; 16] {
        &self.table
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Family {
    Totalistic(TotalisticRule),
    Ltl(LtlRule),
    Hrot(HrotRule),
    Margolus(BlockRule),
    Pca(BlockRule),
    RuleTree(RuleTree),
    None,
}

impl Family {
    pub fn name(&self) -> &'static str {
        match self {
            Family::Totalistic(_) => "totalistic",
            Family::Ltl(_) => "Larger than Life",
            Family::Hrot(_) => "HROT",
            Family::Margolus(_) => "Margolus",
            Family::Pca(_) => "PCA",
            Family::RuleTree(_) => "rule tree",
            Family::None => "none",
        }
    }

    /// Neighborhood radius for range rules, 1 otherwise.
    pub fn range(&self) -> u32 {
        match self {
            Family::Ltl(ltl) => ltl.range,
            Family::Hrot(hrot) => hrot.range,
            _ => 1,
        }
    }

    pub fn has_b0(&self) -> bool {
        match self {
            Family::Totalistic(rule) => rule.table().has_b0(),
            Family::Ltl(ltl) => ltl.counts.is_birth(0),
            Family::Hrot(hrot) => hrot.counts.is_birth(0),
            _ => false,
        }
    }

    pub(crate) fn same_kind(&self, other: &Family) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// A fully decoded rule. Never mutated after a successful decode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleDescriptor {
    pub(crate) family: Family,
    pub(crate) neighborhood: Neighborhood,
    pub(crate) states: u16,
    pub(crate) marker: Marker,
    pub(crate) bounded: Option<BoundedGrid>,
    pub(crate) alternate: Option<Box<RuleDescriptor>>,
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
}

impl RuleDescriptor {
    pub fn family(&self) -> &Family {
        &self.family
    }

    pub fn neighborhood(&self) -> Neighborhood {
        self.neighborhood
    }

    /// Number of cell states including any marker states.
    pub fn states(&self) -> u16 {
        self.states
    }

    pub fn marker(&self) -> Marker {
        self.marker
    }

    pub fn is_history(&self) -> bool {
        matches!(self.marker, Marker::History | Marker::Super)
    }

    pub fn is_niemiec(&self) -> bool {
        self.marker == Marker::Niemiec
    }

    pub fn bounded(&self) -> Option<&BoundedGrid> {
        self.bounded.as_ref()
    }

    pub fn alternate(&self) -> Option<&RuleDescriptor> {
        self.alternate.as_deref()
    }

    /// Canonical name, including the alternate and bounded grid parts.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Well-known display name, when the rule has one.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn has_b0(&self) -> bool {
        self.family.has_b0()
    }

    /// Totalistic-like table, when the family has one.
    pub fn table(&self) -> Option<&RuleTable> {
        match &self.family {
            Family::Totalistic(rule) => Some(rule.table()),
            _ => None,
        }
    }

    /// HROT count arrays for range rules.
    pub fn counts(&self) -> Option<&HrotCounts> {
        match &self.family {
            Family::Ltl(ltl) => Some(&ltl.counts),
            Family::Hrot(hrot) => Some(&hrot.counts),
            _ => None,
        }
    }
}

impl fmt::Display for RuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(alias) = &self.alias {
            write!(f, " ({alias})")?;
        }
        Ok(())
    }
}
