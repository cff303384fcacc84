//! MurmurHash3, x86 32-bit variant.
//!
//! Document identifiers are pinned to this exact function and to
//! [`CORPUS_SEED`], so the output must match the reference implementation
//! bit for bit on every platform.

/// Seed used to derive document ids from image filenames.
pub const CORPUS_SEED: u32 = 999_999;

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

#[inline]
fn mix_k1(mut k1: u32) -> u32 {
    k1 = k1.wrapping_mul(C1);
    k1 = k1.rotate_left(15);
    k1.wrapping_mul(C2)
}

#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^ (h >> 16)
}

/// Hash `key` with `seed`.
pub fn murmur3_32(key: &[u8], seed: u32) -> u32 {
    let mut h1 = seed;
    let mut blocks = key.chunks_exact(4);
    for block in &mut blocks {
        let k1 = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h1 ^= mix_k1(k1);
        h1 = h1.rotate_left(13);
        h1 = h1.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let k1 = tail
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, &b)| acc | (u32::from(b) << (8 * i)));
        h1 ^= mix_k1(k1);
    }

    // The reference folds the length in as a 32-bit value.
    h1 ^= key.len() as u32;
    fmix32(h1)
}

/// Stable document id for an image filename.
pub fn stable_id(filename: &str) -> u32 {
    murmur3_32(filename.as_bytes(), CORPUS_SEED)
}
