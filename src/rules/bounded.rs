//! Bounded grid suffixes such as `:T10,5`, `:K40*,20+3` or `:S30`.
//!
//! A zero dimension leaves that axis unbounded. Shifts and twists follow the
//! usual bounded-grid conventions: twists only on Klein bottles (exactly one
//! axis), shifts on one axis of a torus or on the twisted axis of a Klein
//! bottle.

use std::fmt;

use super::error::RuleError;
use super::scan::Scanner;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Topology {
    Plane,
    Torus,
    Klein,
    CrossSurface,
    Sphere,
}

impl Topology {
    fn from_code(code: u8) -> Option<Self> {
        match code {
            b'p' => Some(Topology::Plane),
            b't' => Some(Topology::Torus),
            b'k' => Some(Topology::Klein),
            b'c' => Some(Topology::CrossSurface),
            b's' => Some(Topology::Sphere),
            _ => None,
        }
    }

    pub const fn code(self) -> char {
        match self {
            Topology::Plane => 'P',
            Topology::Torus => 'T',
            Topology::Klein => 'K',
            Topology::CrossSurface => 'C',
            Topology::Sphere => 'S',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Topology::Plane => "plane",
            Topology::Torus => "torus",
            Topology::Klein => "Klein bottle",
            Topology::CrossSurface => "cross-surface",
            Topology::Sphere => "sphere",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BoundedGrid {
    pub topology: Topology,
    /// 0 means unbounded horizontally.
    pub width: u32,
    /// 0 means unbounded vertically.
    pub height: u32,
    pub h_shift: i32,
    pub v_shift: i32,
    pub h_twist: bool,
    pub v_twist: bool,
}

impl BoundedGrid {
    pub fn is_infinite(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Default)]
struct Axis {
    size: u32,
    shift: i32,
    twist: bool,
}

fn parse_axis(scan: &mut Scanner<'_>, max_size: u32, what: &'static str) -> Result<Axis, RuleError> {
    let size = scan.number()?;
    if size > max_size {
        return Err(RuleError::out_of_range(
            what,
            i64::from(size),
            0,
            i64::from(max_size),
        ));
    }
    let mut axis = Axis {
        size,
        ..Axis::default()
    };
    // Both are read so `validate` can reject a shifted and twisted axis.
    for _ in 0..2 {
        match scan.peek() {
            Some(b'*') if !axis.twist => {
                scan.bump();
                axis.twist = true;
            }
            Some(b'+' | b'-') if axis.shift == 0 => {
                let shift = scan.signed()?;
                let limit = i64::from(size.max(1));
                if shift.abs() >= limit && shift != 0 {
                    return Err(RuleError::out_of_range(
                        "shift",
                        shift,
                        -(limit - 1),
                        limit - 1,
                    ));
                }
                axis.shift = shift as i32;
            }
            _ => break,
        }
    }
    Ok(axis)
}

/// Parse the text after `:` (lowercased).
pub(crate) fn parse(text: &str, max_size: u32) -> Result<BoundedGrid, RuleError> {
    let mut scan = Scanner::new(text, "bounded grid");
    let code = scan.bump().ok_or(RuleError::UnexpectedEnd {
        context: "bounded grid",
    })?;
    let topology = Topology::from_code(code).ok_or_else(|| {
        RuleError::malformed(format!(
            "unknown bounded grid type '{}', expected P, T, K, C or S",
            (code as char).to_ascii_uppercase()
        ))
    })?;
    let h = parse_axis(&mut scan, max_size, "bounded grid width")?;
    let v = if scan.eat(b',') {
        parse_axis(&mut scan, max_size, "bounded grid height")?
    } else {
        Axis {
            size: h.size,
            ..Axis::default()
        }
    };
    scan.finish()?;

    let grid = BoundedGrid {
        topology,
        width: h.size,
        height: v.size,
        h_shift: h.shift,
        v_shift: v.shift,
        h_twist: h.twist,
        v_twist: v.twist,
    };
    validate(&grid)?;
    Ok(grid)
}

fn validate(grid: &BoundedGrid) -> Result<(), RuleError> {
    let name = grid.topology.name();
    let shifted = grid.h_shift != 0 || grid.v_shift != 0;
    let twisted = grid.h_twist || grid.v_twist;
    if grid.is_infinite() && (shifted || twisted) {
        return Err(RuleError::unsupported(
            "shift and twist need a bounded width and height",
        ));
    }
    if (grid.h_shift != 0 && grid.h_twist) || (grid.v_shift != 0 && grid.v_twist) {
        return Err(RuleError::unsupported(
            "an axis can not be both shifted and twisted",
        ));
    }
    if grid.h_shift != 0 && grid.v_shift != 0 {
        return Err(RuleError::unsupported("only one axis can be shifted"));
    }
    match grid.topology {
        Topology::Klein => {
            if grid.h_twist == grid.v_twist {
                return Err(RuleError::unsupported(
                    "Klein bottle needs a twist on exactly one axis",
                ));
            }
        }
        _ if twisted => {
            return Err(RuleError::unsupported(format!("{name} can not be twisted")));
        }
        Topology::Torus => {}
        _ if shifted => {
            return Err(RuleError::unsupported(format!("{name} can not be shifted")));
        }
        Topology::CrossSurface | Topology::Sphere if grid.is_infinite() => {
            return Err(RuleError::unsupported(format!(
                "{name} needs a bounded width and height"
            )));
        }
        Topology::Sphere if grid.width != grid.height => {
            return Err(RuleError::unsupported("sphere needs equal width and height"));
        }
        _ => {}
    }
    Ok(())
}

fn write_axis(f: &mut fmt::Formatter<'_>, size: u32, shift: i32, twist: bool) -> fmt::Result {
    write!(f, "{size}")?;
    if shift != 0 {
        write!(f, "{shift:+}")?;
    }
    if twist {
        f.write_str("*")?;
    }
    Ok(())
}

impl fmt::Display for BoundedGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.topology.code())?;
        write_axis(f, self.width, self.h_shift, self.h_twist)?;
        if self.topology != Topology::Sphere {
            f.write_str(",")?;
            write_axis(f, self.height, self.v_shift, self.v_twist)?;
        }
        Ok(())
    }
}
