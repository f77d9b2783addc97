use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x5f3c_91d2_7a4e_b80d;

/// 128-bit content hash used to deduplicate paint definitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash {
    pub hi: u64,
    pub lo: u64,
}

impl ContentHash {
    /// Short hex form, stable across runs; used as an SVG element id suffix.
    pub fn short_hex(self) -> String {
        format!("{:016x}", self.hi ^ self.lo.rotate_left(17))
    }
}

/// Seeded, endianness-stable incremental hasher.
///
/// Floats are hashed by bit pattern, so `0.0` and `-0.0` hash differently. Callers normalize
/// values they want to compare by magnitude before writing them.
pub(crate) struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    pub(crate) fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    pub(crate) fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub(crate) fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    pub(crate) fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    pub(crate) fn finish(self) -> ContentHash {
        let v = self.inner.digest128();
        ContentHash {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}
