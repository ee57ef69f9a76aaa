//! Margolus (`M0,8,4,...`) and PCA (`2PCA4,...`) block rules.

use super::descriptor::BlockRule;
use super::error::RuleError;
use super::scan::Scanner;

pub(crate) const PCA_PREFIX: &str = "2pca4,";

pub(crate) fn is_margolus(text: &str) -> bool {
    text.strip_prefix('m')
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
}

pub(crate) fn is_pca(text: &str) -> bool {
    text.starts_with(PCA_PREFIX)
}

fn parse_values(text: &str, what: &'static str) -> Result<[u8; 16], RuleError> {
    let tokens: Vec<&str> = text.split(',').collect();
    if tokens.len() != 16 {
        return Err(RuleError::TokenCount {
            what,
            expected: 16,
            found: tokens.len(),
        });
    }
    let mut table = [0u8; 16];
    for (slot, token) in table.iter_mut().zip(&tokens) {
        let mut scan = Scanner::new(token, what);
        let value = scan.number()?;
        scan.finish()?;
        if value > 15 {
            return Err(RuleError::out_of_range(what, i64::from(value), 0, 15));
        }
        *slot = value as u8;
    }
    Ok(table)
}

/// Decode the list after `m`.
pub(crate) fn margolus(text: &str) -> Result<BlockRule, RuleError> {
    let table = parse_values(text, "Margolus rule")?;
    match (table[0], table[15]) {
        (0, _) | (15, 0) => Ok(BlockRule::new(table)),
        (15, _) => Err(RuleError::malformed(
            "Margolus rule with 0 -> 15 must map 15 -> 0",
        )),
        (first, _) => Err(RuleError::malformed(format!(
            "Margolus rule must map 0 to 0 or 15, not {first}"
        ))),
    }
}

/// Decode the list after `2pca4,`.
pub(crate) fn pca(text: &str) -> Result<BlockRule, RuleError> {
    parse_values(text, "PCA rule").map(BlockRule::new)
}

pub(crate) fn margolus_name(rule: &BlockRule) -> String {
    format!("M{}", join(rule.table()))
}

pub(crate) fn pca_name(rule: &BlockRule) -> String {
    format!("2PCA4,{}", join(rule.table()))
}

fn join(values: &[u8; 16]) -> String {
    values
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
