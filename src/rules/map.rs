//! MAP rules: a full transition table spelled out as base64.
//!
//! The bit string lists the next state for every neighborhood pattern in
//! reading order (`NW N NE W C E SW S SE` for Moore, `NW N W C E S SE` for
//! hexagonal, `N W C E S` for von Neumann), most significant bit first.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use super::alloc::TableAllocator;
use super::error::RuleError;
use super::table::{CENTER, E, N, NE, NW, Neighborhood, RuleTable, S, SE, SW, W};

const MAP_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone),
);

const MOORE_ORDER: [u16; 9] = [NW, N, NE, W, CENTER, E, SW, S, SE];
const HEX_ORDER: [u16; 7] = [NW, N, W, CENTER, E, S, SE];
const VON_NEUMANN_ORDER: [u16; 5] = [N, W, CENTER, E, S];

pub const MOORE_DIGITS: usize = 86;
pub const HEX_DIGITS: usize = 22;
pub const VON_NEUMANN_DIGITS: usize = 6;

fn order(neighborhood: Neighborhood) -> &'static [u16] {
    match neighborhood {
        Neighborhood::Hex => &HEX_ORDER,
        Neighborhood::VonNeumann => &VON_NEUMANN_ORDER,
        _ => &MOORE_ORDER,
    }
}

#[inline]
fn sub_index(order: &[u16], index: usize) -> usize {
    order
        .iter()
        .fold(0, |acc, &bit| (acc << 1) | usize::from(index & bit as usize != 0))
}

#[inline]
fn full_index(order: &[u16], sub: usize) -> usize {
    let len = order.len();
    order.iter().enumerate().fold(0, |acc, (i, &bit)| {
        if (sub >> (len - 1 - i)) & 1 != 0 {
            acc | bit as usize
        } else {
            acc
        }
    })
}

/// Decode a MAP payload (the text after `MAP`, case preserved).
pub(crate) fn decode(payload: &str, alloc: &mut dyn TableAllocator) -> Result<RuleTable, RuleError> {
    let payload = payload.trim_end_matches('=');
    if let Some(bad) = payload
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '+' || *c == '/'))
    {
        return Err(RuleError::MapAlphabet(bad));
    }
    let neighborhood = match payload.len() {
        MOORE_DIGITS => Neighborhood::Moore,
        HEX_DIGITS => Neighborhood::Hex,
        VON_NEUMANN_DIGITS => Neighborhood::VonNeumann,
        found => return Err(RuleError::MapLength { found }),
    };
    let bytes = MAP_ENGINE
        .decode(payload)
        .map_err(|e| RuleError::malformed(format!("MAP rule is not valid base64: {e}")))?;
    let order = order(neighborhood);
    let bit = |i: usize| (bytes[i >> 3] >> (7 - (i & 7))) & 1;

    let mut cells = alloc.allocate(neighborhood.table_len());
    for (index, cell) in cells.iter_mut().enumerate() {
        *cell = bit(sub_index(order, index));
    }
    log::debug!(
        "decoded {} MAP rule ({} bytes)",
        neighborhood.name(),
        bytes.len()
    );
    Ok(RuleTable::from_cells(neighborhood, cells))
}

/// Encode a table back to its MAP payload (without padding).
pub fn encode(table: &RuleTable) -> String {
    let order = order(table.neighborhood());
    let entries = 1usize << order.len();
    let mut bytes = vec![0u8; entries.div_ceil(8)];
    for sub in 0..entries {
        if table.lookup(full_index(order, sub)) {
            bytes[sub >> 3] |= 0x80 >> (sub & 7);
        }
    }
    MAP_ENGINE.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::alloc::HeapAllocator;
    use crate::rules::error::ErrorKind;

    const LIFE: &str = "ARYXfhZofugWaH7oaIDogBZofuhogOiAaIDogIAAgAAWaH7oaIDogGiA6ICAAIAAaIDogIAAgACAAIAAAAAAAA";

    #[test]
    fn life_map_decodes_and_encodes() {
        let table = decode(LIFE, &mut HeapAllocator).unwrap();
        assert_eq!(table.neighborhood(), Neighborhood::Moore);
        assert!(table.is_birth((N | E | S) as usize));
        assert!(table.is_survival((N | S) as usize));
        assert!(!table.is_birth((N | S) as usize));
        assert_eq!(encode(&table), LIFE);
    }

    #[test]
    fn padding_is_accepted() {
        let padded = format!("{LIFE}==");
        assert!(decode(&padded, &mut HeapAllocator).is_ok());
    }

    #[test]
    fn hex_and_von_neumann_lengths() {
        let hex = decode("AAAAAAAAAAAAAAAAAAAAAA", &mut HeapAllocator).unwrap();
        assert_eq!(hex.neighborhood(), Neighborhood::Hex);
        assert_eq!(encode(&hex).len(), HEX_DIGITS);

        // Every pattern maps to 1.
        let vn = decode("/////w", &mut HeapAllocator).unwrap();
        assert_eq!(vn.neighborhood(), Neighborhood::VonNeumann);
        assert!(vn.as_slice().iter().all(|&c| c == 1));
        assert_eq!(encode(&vn), "/////w");
    }

    #[test]
    fn bad_lengths_and_alphabet() {
        let err = decode("AAAA", &mut HeapAllocator).unwrap_err();
        assert_eq!(err, RuleError::MapLength { found: 4 });
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert!(err.to_string().contains("6, 22 or 86"));
        let err = decode("AAAA!A", &mut HeapAllocator).unwrap_err();
        assert_eq!(err, RuleError::MapAlphabet('!'));
    }
}
