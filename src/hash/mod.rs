//! Reimplementation of RFC 1321 MD5, parameterized by a *variant* that
//! overlays the standard round table and initialization vector with a
//! handful of deliberately corrupted constants.
//!
//! The round table and both variants' patch maps are transcribed verbatim
//! from the original `DysonSphereMD5` implementation (`_ROUND_OPS` /
//! `_ROUND_OP_PATCHES`); only the patched `T` constants differ from
//! textbook MD5, and in two rounds (19 and 27 relative to the table below)
//! the quartet assignment also changes alongside `T`.

/// Selects which constant overlay is applied on top of the standard MD5
/// round table and initialization vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Plain RFC 1321 MD5, byte-for-byte compatible with any reference
    /// implementation.
    Original,
    /// The variant used to fingerprint blueprint envelopes.
    Md5F,
    /// A further-corrupted variant provided for completeness; unused by the
    /// envelope but exercised by the bring-up test vectors.
    Md5Fc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NonlinearFn {
    F,
    G,
    H,
    I,
}

impl NonlinearFn {
    #[inline]
    fn apply(self, x: u32, y: u32, z: u32) -> u32 {
        match self {
            NonlinearFn::F => (x & y) | (!x & z),
            NonlinearFn::G => (x & z) | (y & !z),
            NonlinearFn::H => x ^ y ^ z,
            NonlinearFn::I => y ^ (x | !z),
        }
    }
}

/// One step of the 64-round compression function: which state words play
/// the role of `a`,`b`,`c`,`d` (as indices into the 4-word working state),
/// which message word `k` is mixed in, the rotation amount `s`, the
/// round constant `T`, and the nonlinear function for this round.
#[derive(Debug, Clone, Copy)]
struct RoundOp {
    a: usize,
    b: usize,
    c: usize,
    d: usize,
    k: usize,
    s: u32,
    t: u32,
    op: NonlinearFn,
}

const fn op(a: usize, b: usize, c: usize, d: usize, k: usize, s: u32, t: u32, f: NonlinearFn) -> RoundOp {
    RoundOp { a, b, c, d, k, s, t, op: f }
}

use NonlinearFn::{F, G, H, I};

/// The standard 64-round MD5 table, `T_i = floor(abs(sin(i)) * 2^32)`.
const ROUND_OPS: [RoundOp; 64] = [
    op(0, 1, 2, 3, 0, 7, 0xd76aa478, F),
    op(3, 0, 1, 2, 1, 12, 0xe8c7b756, F),
    op(2, 3, 0, 1, 2, 17, 0x242070db, F),
    op(1, 2, 3, 0, 3, 22, 0xc1bdceee, F),
    op(0, 1, 2, 3, 4, 7, 0xf57c0faf, F),
    op(3, 0, 1, 2, 5, 12, 0x4787c62a, F),
    op(2, 3, 0, 1, 6, 17, 0xa8304613, F),
    op(1, 2, 3, 0, 7, 22, 0xfd469501, F),
    op(0, 1, 2, 3, 8, 7, 0x698098d8, F),
    op(3, 0, 1, 2, 9, 12, 0x8b44f7af, F),
    op(2, 3, 0, 1, 10, 17, 0xffff5bb1, F),
    op(1, 2, 3, 0, 11, 22, 0x895cd7be, F),
    op(0, 1, 2, 3, 12, 7, 0x6b901122, F),
    op(3, 0, 1, 2, 13, 12, 0xfd987193, F),
    op(2, 3, 0, 1, 14, 17, 0xa679438e, F),
    op(1, 2, 3, 0, 15, 22, 0x49b40821, F),
    op(0, 1, 2, 3, 1, 5, 0xf61e2562, G),
    op(3, 0, 1, 2, 6, 9, 0xc040b340, G),
    op(2, 3, 0, 1, 11, 14, 0x265e5a51, G),
    op(1, 2, 3, 0, 0, 20, 0xe9b6c7aa, G),
    op(0, 1, 2, 3, 5, 5, 0xd62f105d, G),
    op(3, 0, 1, 2, 10, 9, 0x02441453, G),
    op(2, 3, 0, 1, 15, 14, 0xd8a1e681, G),
    op(1, 2, 3, 0, 4, 20, 0xe7d3fbc8, G),
    op(0, 1, 2, 3, 9, 5, 0x21e1cde6, G),
    op(3, 0, 1, 2, 14, 9, 0xc33707d6, G),
    op(2, 3, 0, 1, 3, 14, 0xf4d50d87, G),
    op(1, 2, 3, 0, 8, 20, 0x455a14ed, G),
    op(0, 1, 2, 3, 13, 5, 0xa9e3e905, G),
    op(3, 0, 1, 2, 2, 9, 0xfcefa3f8, G),
    op(2, 3, 0, 1, 7, 14, 0x676f02d9, G),
    op(1, 2, 3, 0, 12, 20, 0x8d2a4c8a, G),
    op(0, 1, 2, 3, 5, 4, 0xfffa3942, H),
    op(3, 0, 1, 2, 8, 11, 0x8771f681, H),
    op(2, 3, 0, 1, 11, 16, 0x6d9d6122, H),
    op(1, 2, 3, 0, 14, 23, 0xfde5380c, H),
    op(0, 1, 2, 3, 1, 4, 0xa4beea44, H),
    op(3, 0, 1, 2, 4, 11, 0x4bdecfa9, H),
    op(2, 3, 0, 1, 7, 16, 0xf6bb4b60, H),
    op(1, 2, 3, 0, 10, 23, 0xbebfbc70, H),
    op(0, 1, 2, 3, 13, 4, 0x289b7ec6, H),
    op(3, 0, 1, 2, 0, 11, 0xeaa127fa, H),
    op(2, 3, 0, 1, 3, 16, 0xd4ef3085, H),
    op(1, 2, 3, 0, 6, 23, 0x04881d05, H),
    op(0, 1, 2, 3, 9, 4, 0xd9d4d039, H),
    op(3, 0, 1, 2, 12, 11, 0xe6db99e5, H),
    op(2, 3, 0, 1, 15, 16, 0x1fa27cf8, H),
    op(1, 2, 3, 0, 2, 23, 0xc4ac5665, H),
    op(0, 1, 2, 3, 0, 6, 0xf4292244, I),
    op(3, 0, 1, 2, 7, 10, 0x432aff97, I),
    op(2, 3, 0, 1, 14, 15, 0xab9423a7, I),
    op(1, 2, 3, 0, 5, 21, 0xfc93a039, I),
    op(0, 1, 2, 3, 12, 6, 0x655b59c3, I),
    op(3, 0, 1, 2, 3, 10, 0x8f0ccc92, I),
    op(2, 3, 0, 1, 10, 15, 0xffeff47d, I),
    op(1, 2, 3, 0, 1, 21, 0x85845dd1, I),
    op(0, 1, 2, 3, 8, 6, 0x6fa87e4f, I),
    op(3, 0, 1, 2, 15, 10, 0xfe2ce6e0, I),
    op(2, 3, 0, 1, 6, 15, 0xa3014314, I),
    op(1, 2, 3, 0, 13, 21, 0x4e0811a1, I),
    op(0, 1, 2, 3, 4, 6, 0xf7537e82, I),
    op(3, 0, 1, 2, 11, 10, 0xbd3af235, I),
    op(2, 3, 0, 1, 2, 15, 0x2ad7d2bb, I),
    op(1, 2, 3, 0, 9, 21, 0xeb86d391, I),
];

/// Sparse overlay applied on top of [`ROUND_OPS`] for `Variant::Md5F`.
/// Keys are 0-based round indices.
const MD5F_PATCHES: [(usize, RoundOp); 8] = [
    (1, op(3, 0, 1, 2, 1, 12, 0xe8d7b756, F)),
    (6, op(2, 3, 0, 1, 6, 17, 0xa8304623, F)),
    (12, op(0, 1, 2, 3, 12, 7, 0x6b9f1122, F)),
    (15, op(1, 2, 3, 0, 15, 22, 0x39b40821, F)),
    (19, op(1, 2, 3, 0, 0, 20, 0xc9b6c7aa, G)),
    (21, op(3, 0, 1, 2, 10, 9, 0x02443453, G)),
    (24, op(0, 1, 2, 3, 9, 5, 0x21f1cde6, G)),
    (27, op(1, 2, 3, 0, 8, 20, 0x475a14ed, G)),
];

/// Sparse overlay applied on top of [`ROUND_OPS`] for `Variant::Md5Fc`:
/// everything [`MD5F_PATCHES`] has, plus rounds 3 and 34, and a different
/// `T` at round 24.
const MD5FC_PATCHES: [(usize, RoundOp); 10] = [
    (1, op(3, 0, 1, 2, 1, 12, 0xe8d7b756, F)),
    (3, op(1, 2, 3, 0, 3, 22, 0xc1bdceef, F)),
    (6, op(2, 3, 0, 1, 6, 17, 0xa8304623, F)),
    (12, op(0, 1, 2, 3, 12, 7, 0x6b9f1122, F)),
    (15, op(1, 2, 3, 0, 15, 22, 0x39b40821, F)),
    (19, op(1, 2, 3, 0, 0, 20, 0xc9b6c7aa, G)),
    (21, op(3, 0, 1, 2, 10, 9, 0x02443453, G)),
    (24, op(0, 1, 2, 3, 9, 5, 0x23f1cde6, G)),
    (27, op(1, 2, 3, 0, 8, 20, 0x475a14ed, G)),
    (34, op(2, 3, 0, 1, 11, 16, 0x6d9d6121, H)),
];

const ORIGINAL_IV: [u32; 4] = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476];
/// Shared by MD5F and MD5FC: two byte swaps relative to [`ORIGINAL_IV`],
/// visible when each word is written little-endian.
const CORRUPTED_IV: [u32; 4] = [0x67452301, 0xefdcab89, 0x98badcfe, 0x10325746];

fn patch_for(variant: Variant, round: usize) -> Option<RoundOp> {
    let patches: &[(usize, RoundOp)] = match variant {
        Variant::Original => &[],
        Variant::Md5F => &MD5F_PATCHES,
        Variant::Md5Fc => &MD5FC_PATCHES,
    };
    patches.iter().find(|(i, _)| *i == round).map(|(_, op)| *op)
}

/// Streaming MD5/MD5F/MD5FC hasher. Not safe to share across threads; each
/// thread should own its own instance.
pub struct HashEngine {
    variant: Variant,
    state: [u32; 4],
    buffer: Vec<u8>,
    length_bytes: u64,
    digest: Option<[u8; 16]>,
}

impl HashEngine {
    /// Create a new hasher for the given variant.
    pub fn new(variant: Variant) -> Self {
        let state = match variant {
            Variant::Original => ORIGINAL_IV,
            Variant::Md5F | Variant::Md5Fc => CORRUPTED_IV,
        };
        Self {
            variant,
            state,
            buffer: Vec::with_capacity(64),
            length_bytes: 0,
            digest: None,
        }
    }

    /// Feed more bytes into the hash. May be called any number of times
    /// with arbitrarily sized chunks before [`digest`](Self::digest) is
    /// called.
    ///
    /// # Panics
    /// Panics if the digest has already been finalized.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        assert!(self.digest.is_none(), "HashEngine already finalized");
        self.length_bytes += data.len() as u64;
        self.buffer.extend_from_slice(data);
        let mut offset = 0;
        while self.buffer.len() - offset >= 64 {
            let mut block = [0u8; 64];
            block.copy_from_slice(&self.buffer[offset..offset + 64]);
            self.process_block(&block);
            offset += 64;
        }
        self.buffer.drain(0..offset);
        self
    }

    fn process_block(&mut self, block: &[u8; 64]) {
        let mut x = [0u32; 16];
        for (i, word) in x.iter_mut().enumerate() {
            *word = u32::from_le_bytes(block[4 * i..4 * i + 4].try_into().unwrap());
        }

        let mut state = self.state;
        for (i, standard) in ROUND_OPS.iter().enumerate() {
            let round = patch_for(self.variant, i).unwrap_or(*standard);
            let a = state[round.a];
            let b = state[round.b];
            let c = state[round.c];
            let d = state[round.d];
            let f = round.op.apply(b, c, d);
            let sum = a
                .wrapping_add(f)
                .wrapping_add(x[round.k])
                .wrapping_add(round.t);
            state[round.a] = b.wrapping_add(sum.rotate_left(round.s));
        }

        for i in 0..4 {
            self.state[i] = self.state[i].wrapping_add(state[i]);
        }
    }

    fn finalize(&mut self) {
        if self.digest.is_some() {
            return;
        }
        let bit_length = self.length_bytes.wrapping_mul(8);
        let pad_len = {
            let used = (self.length_bytes % 64) as i64;
            let needed = (64 - used - 8).rem_euclid(64);
            (if needed == 0 { 64 } else { needed }) as usize
        };

        let mut tail = Vec::with_capacity(pad_len + 8);
        tail.push(0x80);
        tail.extend(std::iter::repeat(0u8).take(pad_len - 1));
        tail.extend_from_slice(&bit_length.to_le_bytes());

        // Feed the padding/length tail without perturbing the recorded
        // message length used to compute it.
        let recorded_length = self.length_bytes;
        self.update(&tail);
        self.length_bytes = recorded_length;

        let mut digest = [0u8; 16];
        for (i, word) in self.state.iter().enumerate() {
            digest[4 * i..4 * i + 4].copy_from_slice(&word.to_le_bytes());
        }
        self.digest = Some(digest);
    }

    /// Finalize the hash and return the 16-byte digest. Idempotent: calling
    /// this more than once returns the same value without reprocessing.
    pub fn digest(&mut self) -> [u8; 16] {
        self.finalize();
        self.digest.expect("finalize always sets digest")
    }

    /// Finalize and return the digest as 32 lowercase hex characters.
    pub fn hexdigest(&mut self) -> String {
        let digest = self.digest();
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Convenience one-shot: hash `data` with the given variant and return the
/// lowercase hex digest.
pub fn hexdigest(variant: Variant, data: &[u8]) -> String {
    let mut engine = HashEngine::new(variant);
    engine.update(data);
    engine.hexdigest()
}
