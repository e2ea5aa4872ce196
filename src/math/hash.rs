//! Deterministic, order-sensitive hashing of parameter tuples.
//!
//! Used to name cache artifacts. Nothing here depends on the process-level
//! hasher seed, so identical inputs give identical names on every run.

use super::{Point3, Vector3};

/// Seed shared by both lanes of [`string_hash`].
const STRING_SEED: u32 = 0x1505_1505;

/// Multiplier applied to the second lane when merging.
const STRING_LANE_MIX: u32 = 0x5d58_8b65;

/// A value with a fixed 32-bit hash code.
pub trait StableHash {
    /// Returns the 32-bit hash code of `self`.
    fn stable_hash(&self) -> u32;
}

impl StableHash for f64 {
    /// XOR of the two 32-bit halves of the IEEE bit pattern.
    #[allow(clippy::cast_possible_truncation)]
    fn stable_hash(&self) -> u32 {
        let value = if *self == 0.0 { 0.0 } else { *self };
        let bits = value.to_bits();
        (bits as u32) ^ ((bits >> 32) as u32)
    }
}

impl StableHash for u32 {
    fn stable_hash(&self) -> u32 {
        *self
    }
}

impl StableHash for bool {
    fn stable_hash(&self) -> u32 {
        u32::from(*self)
    }
}

impl StableHash for str {
    fn stable_hash(&self) -> u32 {
        string_hash(self)
    }
}

impl StableHash for Vector3 {
    fn stable_hash(&self) -> u32 {
        NameHasher::new().add(&self.x).add(&self.y).add(&self.z).finish()
    }
}

impl StableHash for Point3 {
    fn stable_hash(&self) -> u32 {
        self.coords.stable_hash()
    }
}

/// Folds hash codes with `acc = rotl(acc, 7) ^ hash(value)`, seeded at zero.
///
/// Order matters: `add(a).add(b)` and `add(b).add(a)` differ.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameHasher {
    acc: u32,
}

impl NameHasher {
    /// Creates a hasher with a zero accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one value into the accumulator.
    #[must_use]
    pub fn add<T: StableHash + ?Sized>(mut self, value: &T) -> Self {
        self.acc = self.acc.rotate_left(7) ^ value.stable_hash();
        self
    }

    /// Folds each component of a vector in X, Y, Z order.
    #[must_use]
    pub fn add_vector(self, v: &Vector3) -> Self {
        self.add(&v.x).add(&v.y).add(&v.z)
    }

    /// Returns the accumulated hash.
    #[must_use]
    pub fn finish(self) -> u32 {
        self.acc
    }

    /// Formats `<kind>.<hash>`.
    #[must_use]
    pub fn name(self, kind: &str) -> String {
        format!("{kind}.{}", self.acc)
    }
}

/// Word-at-a-time string hash over UTF-16 code units.
///
/// Two independent lanes are seeded with `0x15051505` and consume alternating
/// 32-bit words (each word packs two code units, low unit first). An odd
/// trailing unit is padded with zero.
#[must_use]
#[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
pub fn string_hash(s: &str) -> u32 {
    let units: Vec<u16> = s.encode_utf16().collect();
    let words: Vec<i32> = units
        .chunks(2)
        .map(|pair| {
            let lo = u32::from(pair[0]);
            let hi = pair.get(1).copied().map_or(0, u32::from);
            (lo | (hi << 16)) as i32
        })
        .collect();

    let step = |lane: i32, word: i32| -> i32 {
        (lane << 5).wrapping_add(lane).wrapping_add(lane >> 27) ^ word
    };

    let mut num = STRING_SEED as i32;
    let mut num2 = num;
    let mut remaining = units.len();
    let mut k = 0;
    while remaining > 0 {
        num = step(num, words[k]);
        if remaining <= 2 {
            break;
        }
        num2 = step(num2, words.get(k + 1).copied().unwrap_or(0));
        k += 2;
        remaining = remaining.saturating_sub(4);
    }

    num.wrapping_add(num2.wrapping_mul(STRING_LANE_MIX as i32)) as u32
}
