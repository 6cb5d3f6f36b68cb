use std::collections::BTreeSet;

/// Shared keywords relative to the larger set, in `[0, 1]`.
///
/// Exact string matching. Two empty sets score `0.0`.
pub fn keyword_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let shared = a.intersection(b).count();
    let denominator = a.len().max(b.len()).max(1);
    shared as f32 / denominator as f32
}

/// `bonus` when both sides carry the flag, else `0.0`.
#[inline]
pub fn flag_bonus(query: bool, candidate: bool, bonus: f32) -> f32 {
    if query && candidate { bonus } else { 0.0 }
}
