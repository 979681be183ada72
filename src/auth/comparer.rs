//! Timing-safe secret comparison.
//!
//! # Design Decisions
//! - Every byte position up to the longer input's length is visited
//! - Per-byte results are folded through `subtle::Choice`, never a branch
//! - Length is not treated as secret

use subtle::{Choice, ConstantTimeEq};

/// Returns true iff `a` and `b` are byte-for-byte identical.
pub fn secure_equals(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();

    let mut equal: Choice = (a.len() as u64).ct_eq(&(b.len() as u64));
    let len = a.len().max(b.len());
    for i in 0..len {
        // Missing positions compare as 0 against 0; the length check above
        // already fails unequal lengths.
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        equal &= x.ct_eq(&y);
    }

    equal.into()
}

/// Returns true if `candidate` equals any of `secrets`.
///
/// Every secret is compared, even after a match.
pub fn matches_any<'a, I>(candidate: &str, secrets: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    secrets
        .into_iter()
        .fold(false, |found, secret| secure_equals(candidate, secret) | found)
}
