//! Symmetry orbits of neighbor configurations.
//!
//! Isotropic rules accept or reject whole equivalence classes of
//! configurations. For the Moore neighborhood a class is named by a neighbor
//! count and a Hensel letter; for the hexagonal neighborhood by a count and
//! one of `o`, `m`, `p`. Each class is generated from a fixed base
//! configuration by the dihedral group of the square (or hexagon), so a table
//! filled from orbits is closed under rotation and reflection.

use super::error::RuleError;
use super::table::{
    E, HEX_MASK, MOORE_MASK, N, NE, NW, Neighborhood, S, SE, SW, W,
};

/// Hensel letters per Moore neighbor count, in canonical output order.
pub const MOORE_LETTERS: [&str; 9] = [
    "",
    "",
    "ceaikn",
    "ceaiknjqry",
    "ceaiknjqrytwz",
    "ceaiknjqry",
    "ceaikn",
    "",
    "",
];

/// Hexagonal letters per neighbor count.
pub const HEX_LETTERS: [&str; 7] = ["", "", "omp", "omp", "omp", "", ""];

// Base configurations for 2..=4 neighbors, indexed like MOORE_LETTERS.
// Counts 5 and 6 use the complement of counts 3 and 2.
const MOORE_BASE_2: [u16; 6] = [
    SW | SE,
    E | S,
    S | SE,
    W | E,
    W | SE,
    NE | SW,
];
const MOORE_BASE_3: [u16; 10] = [
    NE | SW | SE,
    W | E | S,
    E | S | SE,
    SW | S | SE,
    NE | W | S,
    E | SW | SE,
    E | SW | S,
    NE | SW | S,
    W | E | SE,
    NE | W | SE,
];
const MOORE_BASE_4: [u16; 13] = [
    NW | NE | SW | SE,
    N | W | E | S,
    E | SW | S | SE,
    W | E | SW | SE,
    NE | W | S | SE,
    NE | SW | S | SE,
    NE | W | E | S,
    NE | W | SW | S,
    W | E | S | SE,
    NE | W | SW | SE,
    NE | W | E | SE,
    NE | E | SW | S,
    NE | W | E | SW,
];

// Hex ring in rotation order.
const HEX_RING: [u16; 6] = [N, E, SE, S, W, NW];
// Base configurations as ring positions for 2..=4 neighbors: ortho, meta, para.
const HEX_BASE: [[&[usize]; 3]; 3] = [
    [&[0, 1], &[0, 2], &[0, 3]],
    [&[0, 1, 2], &[0, 1, 3], &[0, 2, 4]],
    [&[2, 3, 4, 5], &[1, 3, 4, 5], &[1, 2, 4, 5]],
];

/// Letters available for `count` neighbors in `neighborhood`.
pub fn letters(neighborhood: Neighborhood, count: u8) -> &'static str {
    match neighborhood {
        Neighborhood::Moore => MOORE_LETTERS.get(count as usize).copied().unwrap_or(""),
        Neighborhood::Hex => HEX_LETTERS.get(count as usize).copied().unwrap_or(""),
        _ => "",
    }
}

/// Position of `letter` within the letters for `count`.
pub fn letter_index(neighborhood: Neighborhood, count: u8, letter: char) -> Option<usize> {
    letters(neighborhood, count).find(letter)
}

/// Base configuration (neighbor bits only) of a lettered class.
pub fn base_config(neighborhood: Neighborhood, count: u8, index: usize) -> Option<u16> {
    match neighborhood {
        Neighborhood::Moore => moore_base(count, index),
        Neighborhood::Hex => {
            let positions = HEX_BASE.get((count as usize).checked_sub(2)?)?.get(index)?;
            Some(positions.iter().fold(0, |acc, &p| acc | HEX_RING[p]))
        }
        _ => None,
    }
}

fn moore_base(count: u8, index: usize) -> Option<u16> {
    match count {
        2 => MOORE_BASE_2.get(index).copied(),
        3 => MOORE_BASE_3.get(index).copied(),
        4 => MOORE_BASE_4.get(index).copied(),
        5 | 6 => moore_base(8 - count, index).map(|b| b ^ MOORE_MASK),
        _ => None,
    }
}

#[inline]
fn rotate_moore(c: u16) -> u16 {
    // 90 degrees clockwise.
    let map = [
        (NW, NE),
        (N, E),
        (NE, SE),
        (E, S),
        (SE, SW),
        (S, W),
        (SW, NW),
        (W, N),
    ];
    map.iter()
        .fold(0, |acc, &(from, to)| if c & from != 0 { acc | to } else { acc })
}

#[inline]
fn reflect_moore(c: u16) -> u16 {
    let map = [
        (NW, NE),
        (NE, NW),
        (W, E),
        (E, W),
        (SW, SE),
        (SE, SW),
        (N, N),
        (S, S),
    ];
    map.iter()
        .fold(0, |acc, &(from, to)| if c & from != 0 { acc | to } else { acc })
}

fn hex_positions(c: u16) -> [bool; 6] {
    let mut out = [false; 6];
    for (slot, &bit) in out.iter_mut().zip(HEX_RING.iter()) {
        *slot = c & bit != 0;
    }
    out
}

fn hex_from_positions(positions: &[bool; 6]) -> u16 {
    positions
        .iter()
        .zip(HEX_RING.iter())
        .fold(0, |acc, (&on, &bit)| if on { acc | bit } else { acc })
}

/// Images of `config` under the symmetry group of `neighborhood`.
///
/// Only Moore and hexagonal neighborhoods have non-trivial images here; the
/// other neighborhoods are purely totalistic.
pub fn symmetry_images(neighborhood: Neighborhood, config: u16) -> Vec<u16> {
    let mut out = Vec::with_capacity(12);
    match neighborhood {
        Neighborhood::Moore => {
            let mut c = config & MOORE_MASK;
            let mut m = reflect_moore(c);
            for _ in 0..4 {
                out.push(c);
                out.push(m);
                c = rotate_moore(c);
                m = rotate_moore(m);
            }
        }
        Neighborhood::Hex => {
            let ring = hex_positions(config & HEX_MASK);
            for shift in 0..6 {
                let mut rotated = [false; 6];
                let mut mirrored = [false; 6];
                for i in 0..6 {
                    rotated[(i + shift) % 6] = ring[i];
                    mirrored[(6 - i + shift) % 6] = ring[i];
                }
                out.push(hex_from_positions(&rotated));
                out.push(hex_from_positions(&mirrored));
            }
        }
        _ => out.push(config & neighborhood.neighbor_mask()),
    }
    out.sort_unstable();
    out.dedup();
    out
}

/// Expand a configuration over the don't-care bits of the index space.
fn expand_dont_care(neighborhood: Neighborhood, config: u16, out: &mut Vec<u16>) {
    let full = (neighborhood.table_len() - 1) as u16 & !neighborhood.center_bit();
    let free = full & !neighborhood.neighbor_mask();
    // Enumerate every subset of the free bits.
    let mut subset: u16 = 0;
    loop {
        out.push(config | subset);
        if subset == free {
            break;
        }
        subset = (subset.wrapping_sub(free)) & free;
    }
}

/// Every raw configuration (centre bit clear) equivalent to the class
/// `(count, letter)`.
///
/// `letter = None` means the whole totalistic count.
pub fn orbit(
    neighborhood: Neighborhood,
    count: u8,
    letter: Option<char>,
) -> Result<Vec<u16>, RuleError> {
    let max = neighborhood.max_count();
    if count > max {
        return Err(RuleError::out_of_range(
            "neighbor count",
            i64::from(count),
            0,
            i64::from(max),
        ));
    }
    let mask = neighborhood.neighbor_mask();
    let mut core = Vec::new();
    match letter {
        None => {
            // Subsets of the neighborhood bits with the requested population.
            let mut config: u16 = 0;
            loop {
                if config.count_ones() == u32::from(count) {
                    core.push(config);
                }
                if config == mask {
                    break;
                }
                config = (config.wrapping_sub(mask)) & mask;
            }
        }
        Some(letter) => {
            if !matches!(neighborhood, Neighborhood::Moore | Neighborhood::Hex) {
                return Err(RuleError::LettersNotSupported(neighborhood.name()));
            }
            let index = letter_index(neighborhood, count, letter).ok_or_else(|| {
                RuleError::InvalidLetter {
                    token: format!("{count}{letter}"),
                    count,
                }
            })?;
            let base = base_config(neighborhood, count, index).ok_or_else(|| {
                RuleError::InvalidLetter {
                    token: format!("{count}{letter}"),
                    count,
                }
            })?;
            core = symmetry_images(neighborhood, base);
        }
    }
    let mut out = Vec::with_capacity(core.len());
    for config in core {
        expand_dont_care(neighborhood, config, &mut out);
    }
    out.sort_unstable();
    out.dedup();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_sizes(count: u8) -> Vec<usize> {
        letters(Neighborhood::Moore, count)
            .chars()
            .map(|l| {
                orbit(Neighborhood::Moore, count, Some(l))
                    .unwrap()
                    .len()
            })
            .collect()
    }

    #[test]
    fn moore_letters_partition_each_count() {
        for count in 2..=6u8 {
            let total = orbit(Neighborhood::Moore, count, None).unwrap();
            let mut union: Vec<u16> = Vec::new();
            for letter in letters(Neighborhood::Moore, count).chars() {
                let part = orbit(Neighborhood::Moore, count, Some(letter)).unwrap();
                for c in &part {
                    assert!(!union.contains(c), "{count}{letter} overlaps");
                }
                union.extend(part);
            }
            union.sort_unstable();
            assert_eq!(union, total, "letters for {count} do not cover the count");
        }
    }

    #[test]
    fn known_class_sizes() {
        assert!(class_sizes(1).is_empty());
        assert!(class_sizes(7).is_empty());
        assert_eq!(class_sizes(2), vec![4, 4, 8, 2, 8, 2]);
        assert_eq!(class_sizes(4).iter().sum::<usize>(), 70);
        // 4c is the four corners, 4e the four edges.
        assert_eq!(orbit(Neighborhood::Moore, 4, Some('c')).unwrap(), vec![NW | NE | SW | SE]);
        assert_eq!(orbit(Neighborhood::Moore, 4, Some('e')).unwrap(), vec![N | W | E | S]);
    }

    #[test]
    fn upper_counts_are_complements() {
        for (low, high) in [(2u8, 6u8), (3, 5)] {
            for letter in letters(Neighborhood::Moore, low).chars() {
                let a = orbit(Neighborhood::Moore, low, Some(letter)).unwrap();
                let mut b: Vec<u16> = orbit(Neighborhood::Moore, high, Some(letter))
                    .unwrap()
                    .into_iter()
                    .map(|c| c ^ MOORE_MASK)
                    .collect();
                b.sort_unstable();
                assert_eq!(a, b, "{high}{letter} is not the complement of {low}{letter}");
            }
        }
    }

    #[test]
    fn hex_orbits_cover_counts_and_ignore_corners() {
        for count in 2..=4u8 {
            let total = orbit(Neighborhood::Hex, count, None).unwrap();
            let mut union = Vec::new();
            for letter in "omp".chars() {
                union.extend(orbit(Neighborhood::Hex, count, Some(letter)).unwrap());
            }
            union.sort_unstable();
            assert_eq!(union, total);
        }
        // Two opposite neighbors: three axes, times four don't-care corner states.
        assert_eq!(orbit(Neighborhood::Hex, 2, Some('p')).unwrap().len(), 12);
    }

    #[test]
    fn triangular_and_von_neumann_are_totalistic() {
        assert_eq!(orbit(Neighborhood::TriangularEdges, 3, None).unwrap().len(), 512);
        assert_eq!(orbit(Neighborhood::TriangularAll, 12, None).unwrap(), vec![0xfff]);
        // Four corners are don't-care for von Neumann.
        assert_eq!(orbit(Neighborhood::VonNeumann, 4, None).unwrap().len(), 16);
        assert_eq!(
            orbit(Neighborhood::VonNeumann, 1, Some('c')).unwrap_err(),
            RuleError::LettersNotSupported("von Neumann")
        );
    }

    #[test]
    fn unknown_letters_are_reported_with_the_token() {
        assert_eq!(
            orbit(Neighborhood::Moore, 2, Some('y')).unwrap_err(),
            RuleError::InvalidLetter {
                token: "2y".to_string(),
                count: 2
            }
        );
        assert!(orbit(Neighborhood::Moore, 9, None).is_err());
    }
}
