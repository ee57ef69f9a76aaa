//! Rule-string compiler for cellular automata.
//!
//! [`RuleDecoder`] turns rule strings such as `B3/S23`, `B2-a/S12H`,
//! `R2,C0,M1,S6..9,B7..8,NM` or `MAP...` into a [`RuleDescriptor`]: a
//! canonical name plus the lookup data a simulation engine reads every
//! generation.

pub mod rules;
pub mod ruletree;

pub use rules::{
    BatchConfig, BatchDecoder, DecoderConfig, ErrorKind, Family, Neighborhood, RuleDecoder,
    RuleDescriptor, RuleError, RuleTable,
};
pub use ruletree::RuleTree;
