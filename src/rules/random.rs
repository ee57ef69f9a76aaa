//! Seeded random isotropic rules, used to fill benchmark and test corpora.

use rand::Rng;

use super::symmetry::letters;
use super::table::Neighborhood;

fn count_char(count: u8) -> char {
    if count < 10 {
        char::from(b'0' + count)
    } else {
        char::from(b'a' + count - 10)
    }
}

/// One B or S part over counts `first..=max_count`. Each count is present
/// with probability 1/2; a count with letters may keep a proper subset of
/// them, sometimes written inverted.
pub fn random_part<R: Rng + ?Sized>(rng: &mut R, neighborhood: Neighborhood, first: u8) -> String {
    let mut out = String::new();
    for count in first..=neighborhood.max_count() {
        if rng.gen_bool(0.5) {
            continue;
        }
        out.push(count_char(count));
        let names = letters(neighborhood, count);
        let picked: String = names.chars().filter(|_| rng.gen_bool(0.4)).collect();
        if picked.is_empty() || picked.len() == names.len() {
            continue;
        }
        if rng.gen_bool(0.3) {
            out.push('-');
        }
        out.push_str(&picked);
    }
    out
}

/// Random isotropic rule in B/S notation for `neighborhood`, never B0.
pub fn random_rule<R: Rng + ?Sized>(rng: &mut R, neighborhood: Neighborhood) -> String {
    let birth = random_part(rng, neighborhood, 1);
    let survival = random_part(rng, neighborhood, 0);
    format!("B{birth}/S{survival}{}", neighborhood.postfix())
}
