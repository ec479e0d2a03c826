//! BLS12-381 instantiation
//!
//! G1 over 𝔽p and G2 over 𝔽p² (M-twist `y² = x³ + 4(1+u)`), their
//! endomorphisms, subgroup membership tests, cofactor clearing, and the
//! Zcash-style compressed wire format (48-byte G1 / 96-byte G2).
//!
//! Deserialization walks the full state machine: flag parsing, coordinate
//! range check, curve-equation check (via decompression), then the opt-in
//! prime-subgroup check. Only points that clear every stage reach the
//! commitment layer.
//!
//! The curve seed is `x = -0xd201000000010000`; φ(x, y) = (βx, y) acts on G1
//! with eigenvalue λ = x² - 1, and ψ (untwist-Frobenius-twist) acts on G2
//! with eigenvalue x.

#![forbid(unsafe_code)]

use crate::bigint::{BigInt, CT_TRUE};
use crate::curve::{Affine, Jacobian, Projective, SwCurveParams};
use crate::field::Fp;
use crate::fields::{Fq, Fr};
use crate::status::CryptoError;
use crate::tower::Fp2;

/// |x|, the absolute value of the (negative) BLS12-381 seed.
pub const SEED_ABS: u64 = 0xd201_0000_0001_0000;

const fn fq(limbs: [u64; 6]) -> Fq {
    Fp::from_mont_unchecked(BigInt(limbs))
}
const fn fp2(c0: [u64; 6], c1: [u64; 6]) -> Fp2 {
    Fp2::new(fq(c0), fq(c1))
}

// ===========================================================================
// Curve parameter sets
// ===========================================================================

/// G1: `y² = x³ + 4` over 𝔽p.
#[derive(Clone, Copy, Debug)]
pub struct G1Params;

impl SwCurveParams for G1Params {
    type Base = Fq;
    const B: Fq = fq([
        0xaa270000000cfff3,
        0x53cc0032fc34000a,
        0x478fe97a6b0a807f,
        0xb1d37ebee6ba24d7,
        0x8ec9733bbf78ab2f,
        0x09d645513d83de7e,
    ]);
    const B3: Fq = fq([
        0x447600000027552e,
        0xdcb8009a43480020,
        0x6f7ee9ce4a6e8b59,
        0xb10330b7c0a95bc6,
        0x6140b1fcfb1e54b7,
        0x0381be097f0bb4e1,
    ]);
    const GENERATOR_X: Fq = fq([
        0x5cb38790fd530c16,
        0x7817fc679976fff5,
        0x154f95c7143ba1c1,
        0xf0ae6acdf3d0e747,
        0xedce6ecc21dbf440,
        0x120177419e0bfb75,
    ]);
    const GENERATOR_Y: Fq = fq([
        0xbaac93d50ce72271,
        0x8c22631a7918fd8e,
        0xdd595f13570725ce,
        0x51ac582950405194,
        0x0e1c8c3fad0059c0,
        0x0bbc3efc5008a26a,
    ]);
    const SCALAR_BITS: usize = 255;
}

/// G2: `y² = x³ + 4(1+u)` over 𝔽p² (the M-twist).
#[derive(Clone, Copy, Debug)]
pub struct G2Params;

const B2_LIMBS: [u64; 6] = [
    0xaa270000000cfff3,
    0x53cc0032fc34000a,
    0x478fe97a6b0a807f,
    0xb1d37ebee6ba24d7,
    0x8ec9733bbf78ab2f,
    0x09d645513d83de7e,
];
const B2_3_LIMBS: [u64; 6] = [
    0x447600000027552e,
    0xdcb8009a43480020,
    0x6f7ee9ce4a6e8b59,
    0xb10330b7c0a95bc6,
    0x6140b1fcfb1e54b7,
    0x0381be097f0bb4e1,
];

impl SwCurveParams for G2Params {
    type Base = Fp2;
    const B: Fp2 = fp2(B2_LIMBS, B2_LIMBS);
    const B3: Fp2 = fp2(B2_3_LIMBS, B2_3_LIMBS);
    const GENERATOR_X: Fp2 = fp2(
        [
            0xf5f28fa202940a10,
            0xb3f5fb2687b4961a,
            0xa1a893b53e2ae580,
            0x9894999d1a3caee9,
            0x6f67b7631863366b,
            0x058191924350bcd7,
        ],
        [
            0xa5a9c0759e23f606,
            0xaaa0c59dbccd60c3,
            0x3bb17e18e2867806,
            0x1b1ab6cc8541b367,
            0xc2b6ed0ef2158547,
            0x11922a097360edf3,
        ],
    );
    const GENERATOR_Y: Fp2 = fp2(
        [
            0x4c730af860494c4a,
            0x597cfa1f5e369c5a,
            0xe7e6856caa0a635a,
            0xbbefb5e96e0d495f,
            0x07d3a975f0ef25a2,
            0x0083fd8e7e80dae5,
        ],
        [
            0xadc0fc92df64b05d,
            0x18aa270a2b1461dc,
            0x86adac6a3be4eba0,
            0x79495c4ec93da33a,
            0xe7175850a43ccaed,
            0x0b2bc2a163de1bf2,
        ],
    );
    const SCALAR_BITS: usize = 255;
}

/// G1 point, affine form.
pub type G1Affine = Affine<G1Params>;
/// G1 point, homogeneous projective form (constant-time paths).
pub type G1Projective = Projective<G1Params>;
/// G1 point, Jacobian form (variable-time bulk paths).
pub type G1Jacobian = Jacobian<G1Params>;
/// G2 point, affine form.
pub type G2Affine = Affine<G2Params>;
/// G2 point, homogeneous projective form.
pub type G2Projective = Projective<G2Params>;
/// G2 point, Jacobian form.
pub type G2Jacobian = Jacobian<G2Params>;

// ===========================================================================
// Endomorphisms
// ===========================================================================

/// β: the cube root of unity with φ(x, y) = (βx, y) = [x²-1](x, y) on G1.
const BETA: Fq = fq([
    0xcd03c9e48671f071,
    0x5dab22461fcda5d2,
    0x587042afd3851b95,
    0x8eb60ebe01bacb9e,
    0x03f97d6e83d050d2,
    0x18f0206554638741,
]);

/// λ = x² - 1, the G1 eigenvalue of φ.
const LAMBDA: BigInt<4> = BigInt([0x00000000ffffffff, 0xac45a4010001a402, 0, 0]);

/// x², as a plain integer.
const X2: BigInt<4> = BigInt([0x0000000100000000, 0xac45a4010001a402, 0, 0]);
/// x² - 1.
const X2_MINUS_1: BigInt<4> = LAMBDA;
/// Rounding reciprocal `floor(x² * 2^256 / r)` for the Babai step.
const GLV_C1: BigInt<4> = BigInt([0x63f6e522f6cfee30, 0x7c6becf1e01faadd, 0x0000000000000001, 0]);

/// ψ x-coefficient `1/ξ^((p-1)/3)`.
const PSI_X: Fp2 = fp2(
    [0, 0, 0, 0, 0, 0],
    [
        0x890dc9e4867545c3,
        0x2af322533285a5d5,
        0x50880866309b7e2c,
        0xa20d1b8c7e881024,
        0x14e4f04fe2db9068,
        0x14e56d3f1564853a,
    ],
);
/// ψ y-coefficient `1/ξ^((p-1)/2)`.
const PSI_Y: Fp2 = fp2(
    [
        0x3e2f585da55c9ad1,
        0x4294213d86c18183,
        0x382844c88b623732,
        0x92ad2afd19103e18,
        0x1d794e4fac7cf0b9,
        0x0bd592fc7d825ec8,
    ],
    [
        0x7bcfa7a25aa30fda,
        0xdc17dec12a927e7c,
        0x2f088dd86b4ebef1,
        0xd1ca2087da74d4a7,
        0x2da2596696cebc1d,
        0x0e2b7eedbbfd87d2,
    ],
);

/// φ(x, y) = (βx, y) on G1.
pub fn phi(p: &G1Affine) -> G1Affine {
    G1Affine { x: p.x * BETA, y: p.y, infinity: p.infinity }
}

/// ψ(x, y) = (x̄·ψ_x, ȳ·ψ_y) on the twist (untwist-Frobenius-twist).
pub fn psi(q: &G2Affine) -> G2Affine {
    G2Affine {
        x: q.x.conjugate() * PSI_X,
        y: q.y.conjugate() * PSI_Y,
        infinity: q.infinity,
    }
}

// ===========================================================================
// Subgroup membership and cofactor clearing
// ===========================================================================

impl Affine<G1Params> {
    /// Prime-subgroup membership: φ(P) = [x²-1]P.
    pub fn is_in_subgroup(&self) -> bool {
        if self.infinity {
            return true;
        }
        let lhs = Jacobian::from(&phi(self));
        let rhs = Jacobian::from(self).mul_vartime(&LAMBDA);
        lhs.to_affine() == rhs.to_affine()
    }

    /// Multiply by the effective cofactor `1 - x` to land in the subgroup.
    pub fn clear_cofactor(&self) -> G1Jacobian {
        // 1 - x = |x| + 1
        let h_eff = BigInt::from_u64(SEED_ABS + 1);
        Jacobian::from(self).mul_vartime(&h_eff)
    }
}

impl Affine<G2Params> {
    /// Prime-subgroup membership: ψ(Q) = [x]Q (x negative).
    pub fn is_in_subgroup(&self) -> bool {
        if self.infinity {
            return true;
        }
        let lhs = Jacobian::from(&psi(self));
        let rhs = Jacobian::from(self)
            .mul_vartime(&BigInt::from_u64(SEED_ABS))
            .neg();
        lhs.to_affine() == rhs.to_affine()
    }

    /// Budroni–Pintore cofactor clearing:
    /// `[x²-x-1]Q + [x-1]ψ(Q) + ψ²([2]Q)`.
    pub fn clear_cofactor(&self) -> G2Jacobian {
        // x² - x - 1 = x² + |x| - 1 (positive)
        let mut e1 = X2;
        e1.cadd(&BigInt::from_u64(SEED_ABS - 1), CT_TRUE);
        let t1 = Jacobian::from(self).mul_vartime(&e1);

        // [x-1] = -[|x|+1]
        let psi_q = psi(self);
        let t2 = Jacobian::from(&psi_q)
            .mul_vartime(&BigInt::from_u64(SEED_ABS + 1))
            .neg();

        let two_q = Jacobian::from(self).double().to_affine();
        let t3 = Jacobian::from(&psi(&psi(&two_q)));

        t1.add(&t2).add(&t3)
    }
}

// ===========================================================================
// Scalar multiplication entry points
// ===========================================================================

impl Projective<G1Params> {
    /// Constant-time multiplication by a scalar-field element.
    pub fn mul_scalar(&self, k: &Fr) -> Self {
        self.mul_ct(&k.to_bigint())
    }
}

impl Projective<G2Params> {
    /// Constant-time multiplication by a scalar-field element.
    pub fn mul_scalar(&self, k: &Fr) -> Self {
        self.mul_ct(&k.to_bigint())
    }
}

/// Signed 129-bit half-scalar from the GLV split.
struct HalfScalar {
    abs: BigInt<4>,
    neg: bool,
}

/// Babai-rounded decomposition `k = k1 + k2·λ (mod r)` with |kᵢ| < 2^129.
///
/// `c1 = floor(k·x²/r)` is approximated by `(k · GLV_C1) >> 256` and
/// `c2 = floor(k/r)` by `k >> 255`; any rounding slack only widens the halves
/// by a bit, never breaks the congruence, which holds exactly by construction.
fn glv_decompose(k: &BigInt<4>) -> (HalfScalar, HalfScalar) {
    let (_, c1) = crate::bigint::mul_wide(k, &GLV_C1);
    let c2 = BigInt::from_u64(k.0[3] >> 63);

    // k1 = k - c1*(x²-1) - c2   (two's complement, 256-bit)
    let (p_lo, _) = crate::bigint::mul_wide(&c1, &X2_MINUS_1);
    let mut k1 = *k;
    k1.csub(&p_lo, CT_TRUE);
    k1.csub(&c2, CT_TRUE);

    // k2 = c1 - c2*x²
    let (q_lo, _) = crate::bigint::mul_wide(&c2, &X2);
    let mut k2 = c1;
    k2.csub(&q_lo, CT_TRUE);

    let normalize = |v: BigInt<4>| -> HalfScalar {
        if v.0[3] >> 63 == 1 {
            let mut abs = BigInt::ZERO;
            abs.csub(&v, CT_TRUE);
            HalfScalar { abs, neg: true }
        } else {
            HalfScalar { abs: v, neg: false }
        }
    };
    (normalize(k1), normalize(k2))
}

impl Affine<G1Params> {
    /// Variable-time GLV multiplication: split `k` along the φ eigenvalue and
    /// run a joint double-and-add over the two half-length scalars.
    /// Public scalars only.
    pub fn mul_glv_vartime(&self, k: &Fr) -> G1Jacobian {
        if self.infinity {
            return G1Jacobian::IDENTITY;
        }
        let (h1, h2) = glv_decompose(&k.to_bigint());
        let p1 = if h1.neg { self.neg() } else { *self };
        let phi_p = phi(self);
        let p2 = if h2.neg { phi_p.neg() } else { phi_p };

        let bits = h1.abs.num_bits_vartime().max(h2.abs.num_bits_vartime());
        let mut acc = G1Jacobian::IDENTITY;
        for i in (0..bits).rev() {
            acc = acc.double();
            if h1.abs.bit(i) {
                acc = acc.add_affine(&p1);
            }
            if h2.abs.bit(i) {
                acc = acc.add_affine(&p2);
            }
        }
        acc
    }
}

// ===========================================================================
// Compressed serialization (Zcash flags)
// ===========================================================================

const FLAG_COMPRESSED: u8 = 0x80;
const FLAG_INFINITY: u8 = 0x40;
const FLAG_Y_SIGN: u8 = 0x20;

impl Affine<G1Params> {
    /// 48-byte compressed encoding.
    pub fn to_compressed(&self) -> [u8; 48] {
        let mut out = [0u8; 48];
        if self.infinity {
            out[0] = FLAG_COMPRESSED | FLAG_INFINITY;
            return out;
        }
        self.x.write_be_bytes(&mut out);
        out[0] |= FLAG_COMPRESSED;
        if self.y.is_lexicographically_largest() == CT_TRUE {
            out[0] |= FLAG_Y_SIGN;
        }
        out
    }

    /// Full decode: flags, range, curve, subgroup.
    pub fn from_compressed(bytes: &[u8; 48]) -> Result<Self, CryptoError> {
        let point = Self::from_compressed_unchecked(bytes)?;
        if !point.is_in_subgroup() {
            return Err(CryptoError::PointNotInSubgroup);
        }
        Ok(point)
    }

    /// Decode without the subgroup check (trusted inputs such as verified
    /// setup files).
    pub fn from_compressed_unchecked(bytes: &[u8; 48]) -> Result<Self, CryptoError> {
        let flags = bytes[0] & 0xe0;
        if flags & FLAG_COMPRESSED == 0 {
            return Err(CryptoError::InvalidEncoding);
        }
        if flags & FLAG_INFINITY != 0 {
            // no other bit may survive alongside the infinity flag
            if flags != (FLAG_COMPRESSED | FLAG_INFINITY)
                || bytes[0] & 0x1f != 0
                || bytes[1..].iter().any(|&b| b != 0)
            {
                return Err(CryptoError::InvalidEncoding);
            }
            return Ok(Self::IDENTITY);
        }
        let sign_is_largest = flags & FLAG_Y_SIGN != 0;

        let mut x_bytes = *bytes;
        x_bytes[0] &= 0x1f;
        let x = Fq::from_be_bytes(&x_bytes).ok_or(CryptoError::CoordinateOutOfRange)?;

        let y2 = x.square() * x + G1Params::B;
        let (y, ok) = y2.sqrt_if_square();
        if ok != CT_TRUE {
            return Err(CryptoError::PointNotOnCurve);
        }
        let y_is_largest = y.is_lexicographically_largest() == CT_TRUE;
        let y = if y_is_largest == sign_is_largest { y } else { -y };
        Ok(Self { x, y, infinity: false })
    }
}

impl Affine<G2Params> {
    /// 96-byte compressed encoding: `flags | BE(x.c1) || BE(x.c0)`.
    pub fn to_compressed(&self) -> [u8; 96] {
        let mut out = [0u8; 96];
        if self.infinity {
            out[0] = FLAG_COMPRESSED | FLAG_INFINITY;
            return out;
        }
        self.x.c1.write_be_bytes(&mut out[..48]);
        self.x.c0.write_be_bytes(&mut out[48..]);
        out[0] |= FLAG_COMPRESSED;
        if self.x_sign_of(&self.y) {
            out[0] |= FLAG_Y_SIGN;
        }
        out
    }

    fn x_sign_of(&self, y: &Fp2) -> bool {
        y.is_lexicographically_largest() == CT_TRUE
    }

    /// Full decode: flags, range, curve, subgroup.
    pub fn from_compressed(bytes: &[u8; 96]) -> Result<Self, CryptoError> {
        let point = Self::from_compressed_unchecked(bytes)?;
        if !point.is_in_subgroup() {
            return Err(CryptoError::PointNotInSubgroup);
        }
        Ok(point)
    }

    /// Decode without the subgroup check.
    pub fn from_compressed_unchecked(bytes: &[u8; 96]) -> Result<Self, CryptoError> {
        let flags = bytes[0] & 0xe0;
        if flags & FLAG_COMPRESSED == 0 {
            return Err(CryptoError::InvalidEncoding);
        }
        if flags & FLAG_INFINITY != 0 {
            if flags != (FLAG_COMPRESSED | FLAG_INFINITY)
                || bytes[0] & 0x1f != 0
                || bytes[1..].iter().any(|&b| b != 0)
            {
                return Err(CryptoError::InvalidEncoding);
            }
            return Ok(Self::IDENTITY);
        }
        let sign_is_largest = flags & FLAG_Y_SIGN != 0;

        let mut c1_bytes = [0u8; 48];
        c1_bytes.copy_from_slice(&bytes[..48]);
        c1_bytes[0] &= 0x1f;
        let x_c1 = Fq::from_be_bytes(&c1_bytes).ok_or(CryptoError::CoordinateOutOfRange)?;
        let mut c0_bytes = [0u8; 48];
        c0_bytes.copy_from_slice(&bytes[48..]);
        let x_c0 = Fq::from_be_bytes(&c0_bytes).ok_or(CryptoError::CoordinateOutOfRange)?;
        let x = Fp2::new(x_c0, x_c1);

        let y2 = x.square() * x + G2Params::B;
        let y = y2.sqrt_vartime().ok_or(CryptoError::PointNotOnCurve)?;
        let y_is_largest = y.is_lexicographically_largest() == CT_TRUE;
        let y = if y_is_largest == sign_is_largest { y } else { -y };
        Ok(Self { x, y, infinity: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn g1_infinity_encoding_roundtrip() {
        // S1: 0xc0 || 0.. decodes to the identity
        let mut bytes = [0u8; 48];
        bytes[0] = 0xc0;
        let p = G1Affine::from_compressed(&bytes).unwrap();
        assert!(p.infinity);
        assert_eq!(G1Affine::IDENTITY.to_compressed(), bytes);
    }

    #[test]
    fn g1_flag_violations_rejected() {
        // S2: infinity without compression
        let mut bytes = [0u8; 48];
        bytes[0] = 0x40;
        assert_eq!(
            G1Affine::from_compressed(&bytes),
            Err(CryptoError::InvalidEncoding)
        );
        // infinity with stray payload bit
        let mut bytes = [0u8; 48];
        bytes[0] = 0xc0;
        bytes[47] = 1;
        assert_eq!(
            G1Affine::from_compressed(&bytes),
            Err(CryptoError::InvalidEncoding)
        );
        // infinity with the sign bit set
        let mut bytes = [0u8; 48];
        bytes[0] = 0xe0;
        assert_eq!(
            G1Affine::from_compressed(&bytes),
            Err(CryptoError::InvalidEncoding)
        );
    }

    #[test]
    fn g1_coordinate_out_of_range() {
        use crate::field::FpParams;
        let mut bytes = [0u8; 48];
        crate::fields::FqParams::MODULUS.write_be_bytes(&mut bytes);
        bytes[0] |= 0x80;
        assert_eq!(
            G1Affine::from_compressed(&bytes),
            Err(CryptoError::CoordinateOutOfRange)
        );
    }

    #[test]
    fn g1_serialization_roundtrip() {
        let mut rng = StdRng::from_seed([11u8; 32]);
        let g = G1Projective::generator();
        for _ in 0..10 {
            let k = Fr::rand(&mut rng);
            let p = g.mul_scalar(&k).to_affine();
            let bytes = p.to_compressed();
            let q = G1Affine::from_compressed(&bytes).unwrap();
            assert_eq!(p, q);
        }
    }

    #[test]
    fn g2_serialization_roundtrip() {
        let mut rng = StdRng::from_seed([12u8; 32]);
        let g = G2Projective::generator();
        for _ in 0..5 {
            let k = Fr::rand(&mut rng);
            let p = g.mul_scalar(&k).to_affine();
            let bytes = p.to_compressed();
            let q = G2Affine::from_compressed(&bytes).unwrap();
            assert_eq!(p, q);
        }
        let mut bytes = [0u8; 96];
        bytes[0] = 0xc0;
        assert!(G2Affine::from_compressed(&bytes).unwrap().infinity);
    }

    #[test]
    fn g2_flag_violations_rejected() {
        // infinity without compression
        let mut bytes = [0u8; 96];
        bytes[0] = 0x40;
        assert_eq!(
            G2Affine::from_compressed(&bytes),
            Err(CryptoError::InvalidEncoding)
        );
        // uncompressed marker on a valid x payload
        let mut bytes = G2Affine::generator().to_compressed();
        bytes[0] &= 0x7f;
        assert_eq!(
            G2Affine::from_compressed(&bytes),
            Err(CryptoError::InvalidEncoding)
        );
        // infinity with trailing payload
        let mut bytes = [0u8; 96];
        bytes[0] = 0xc0;
        bytes[95] = 1;
        assert_eq!(
            G2Affine::from_compressed(&bytes),
            Err(CryptoError::InvalidEncoding)
        );
    }

    #[test]
    fn generator_encodings_match_known_vectors() {
        use hex_literal::hex;
        assert_eq!(
            G1Affine::generator().to_compressed(),
            hex!(
                "97f1d3a73197d7942695638c4fa9ac0fc3688c4f9774b905a14e3a3f171bac58"
                "6c55e83ff97a1aeffb3af00adb22c6bb"
            )
        );
        assert_eq!(
            G2Affine::generator().to_compressed(),
            hex!(
                "93e02b6052719f607dacd3a088274f65596bd0d09920b61ab5da61bbdc7f5049"
                "334cf11213945d57e5ac7d055d042b7e024aa2b2f08f0a91260805272dc51051"
                "c6e47ad4fa403b02b4510b647ae3d1770bac0326a805bbefd48056c8c121bdb8"
            )
        );
    }

    #[test]
    fn generators_in_subgroup() {
        assert!(G1Affine::generator().is_in_subgroup());
        assert!(G2Affine::generator().is_in_subgroup());
    }

    #[test]
    fn phi_matches_lambda() {
        let g = G1Affine::generator();
        let lhs = G1Jacobian::from(&phi(&g)).to_affine();
        let rhs = G1Jacobian::from(&g).mul_vartime(&LAMBDA).to_affine();
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn psi_matches_seed() {
        let q = G2Affine::generator();
        let lhs = G2Jacobian::from(&psi(&q)).to_affine();
        let rhs = G2Jacobian::from(&q)
            .mul_vartime(&BigInt::from_u64(SEED_ABS))
            .neg()
            .to_affine();
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn glv_matches_ct_mul() {
        let mut rng = StdRng::from_seed([13u8; 32]);
        let g = G1Affine::generator();
        for _ in 0..10 {
            let k = Fr::rand(&mut rng);
            let fast = g.mul_glv_vartime(&k).to_affine();
            let slow = G1Projective::generator().mul_scalar(&k).to_affine();
            assert_eq!(fast, slow);
        }
        // edge scalars
        for k in [Fr::ZERO, Fr::ONE, -Fr::ONE] {
            let fast = g.mul_glv_vartime(&k).to_affine();
            let slow = G1Projective::generator().mul_scalar(&k).to_affine();
            assert_eq!(fast, slow);
        }
    }

    #[test]
    fn cofactor_clearing_lands_in_subgroup() {
        // walk x upward until we hit a curve point, then clear
        let mut x = Fq::from_u64(9);
        let p = loop {
            let y2 = x.square() * x + G1Params::B;
            let (y, ok) = y2.sqrt_if_square();
            if ok == CT_TRUE {
                break G1Affine { x, y, infinity: false };
            }
            x += Fq::ONE;
        };
        assert!(p.is_on_curve());
        let cleared = p.clear_cofactor().to_affine();
        assert!(cleared.is_in_subgroup());

        let mut qx = Fp2::from_base(Fq::from_u64(5));
        let q = loop {
            let y2 = qx.square() * qx + G2Params::B;
            match y2.sqrt_vartime() {
                Some(y) => break G2Affine { x: qx, y, infinity: false },
                None => qx += Fp2::ONE,
            }
        };
        assert!(q.is_on_curve());
        assert!(!q.is_in_subgroup());
        let cleared = q.clear_cofactor().to_affine();
        assert!(cleared.is_in_subgroup());
    }

    #[test]
    fn non_subgroup_encoding_rejected() {
        // a curve point outside the subgroup must fail the full decode
        let mut x = Fq::from_u64(9);
        let p = loop {
            let y2 = x.square() * x + G1Params::B;
            let (y, ok) = y2.sqrt_if_square();
            if ok == CT_TRUE {
                break G1Affine { x, y, infinity: false };
            }
            x += Fq::ONE;
        };
        if !p.is_in_subgroup() {
            let bytes = p.to_compressed();
            assert_eq!(
                G1Affine::from_compressed(&bytes),
                Err(CryptoError::PointNotInSubgroup)
            );
        }
    }
}
