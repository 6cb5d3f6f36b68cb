//! BLAKE3 helpers for embedding memo keys and stub embedding seeds.

use blake3::Hasher;

/// Full 32-byte BLAKE3 digest of a profile text.
///
/// Used as the key of the embedding memo cache, so two records with the same
/// description share one computed vector.
#[inline]
pub fn hash_text(text: &str) -> [u8; 32] {
    *blake3::hash(text.as_bytes()).as_bytes()
}

/// Seed for a deterministic stub embedding of `text` at `dimension`.
///
/// The dimension is mixed in so stub vectors of different sizes never share a prefix.
#[inline]
pub fn embedding_seed(dimension: usize, text: &str) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(&(dimension as u64).to_le_bytes());
    hasher.update(b"|");
    hasher.update(text.as_bytes());

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hasher.finalize().as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}
