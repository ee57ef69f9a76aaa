//! Rule-string decoding: tables, canonical names and the decoder pipeline.

mod affix;
mod alias;
mod alloc;
mod alternate;
mod batch;
mod block;
mod bounded;
mod canonical;
mod decoder;
mod descriptor;
mod error;
mod fetch;
pub mod map;
pub mod random;
mod range;
mod scan;
pub mod symmetry;
mod table;
mod totalistic;

pub use alias::{AliasTable, BuiltinAliases, NoAliases};
pub use alloc::{HeapAllocator, TableAllocator};
pub use batch::{BatchConfig, BatchDecoder, BatchError};
pub use bounded::{BoundedGrid, Topology};
pub use canonical::{count_list, prefers_inverted, table_part};
pub use decoder::{
    DEFAULT_MAX_GRID_SIZE, DEFAULT_MAX_RANGE, DEFAULT_MAX_STATES, DecoderConfig, RuleDecoder,
};
pub use descriptor::{
    BlockRule, Family, HrotCounts, HrotRule, LtlRule, Marker, RuleDescriptor, TableSource,
    TotalisticRule,
};
pub use error::{ErrorKind, Incompatibility, RuleError};
pub use fetch::{FetchError, FetchReply, MemoryFetcher, RuleFetcher};
pub use range::max_neighbors;
pub use table::{
    B0Emulation, CENTER, E, HEX_MASK, MOORE_MASK, N, NE, NW, Neighborhood, RuleTable, S, SE, SW,
    TRI_ALL_MASK, TRI_CENTER, TRI_EDGE_MASK, TRI_VERTEX_MASK, VON_NEUMANN_MASK, W,
};
