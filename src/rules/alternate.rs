//! Alternate rules: `B3/S23|B2/S` runs the first rule on even generations
//! and the second on odd ones.

use super::descriptor::{Family, RuleDescriptor};
use super::error::{Incompatibility, RuleError};

pub const DELIMITER: char = '|';

/// Split off the alternate half, allowing one delimiter at most.
pub(crate) fn split(text: &str) -> Result<(&str, Option<&str>), RuleError> {
    let mut parts = text.splitn(3, DELIMITER);
    let first = parts.next().unwrap_or_default();
    let second = parts.next();
    if parts.next().is_some() {
        return Err(RuleError::TooManyAlternates);
    }
    Ok((first, second))
}

fn check_family(family: &Family) -> Result<(), RuleError> {
    match family {
        Family::None | Family::Margolus(_) | Family::Pca(_) | Family::RuleTree(_) => {
            Err(RuleError::AlternateUnsupported(family.name()))
        }
        _ if family.has_b0() => Err(RuleError::unsupported(
            "alternate rules can not contain B0",
        )),
        _ => Ok(()),
    }
}

/// Check that two decoded halves can alternate.
pub(crate) fn check(first: &RuleDescriptor, second: &RuleDescriptor) -> Result<(), RuleError> {
    check_family(first.family())?;
    check_family(second.family())?;
    let mismatch = if !first.family().same_kind(second.family()) {
        Some(Incompatibility::Family)
    } else if first.states() != second.states() || first.marker() != second.marker() {
        Some(Incompatibility::States)
    } else if first.neighborhood() != second.neighborhood() {
        Some(Incompatibility::Neighborhood)
    } else if first.family().range() != second.family().range() {
        Some(Incompatibility::Range)
    } else {
        None
    };
    match mismatch {
        Some(reason) => {
            log::debug!(
                "rejecting alternate {} | {}: {reason}",
                first.name(),
                second.name()
            );
            Err(RuleError::Incompatible(reason))
        }
        None => Ok(()),
    }
}
