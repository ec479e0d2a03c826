//! Banderwagon: the prime-order quotient of Bandersnatch
//!
//! Bandersnatch is the twisted Edwards curve `-5x² + y² = 1 + d·x²y²` over
//! the BLS12-381 scalar field. Banderwagon quotients its `2r`-subgroup by the
//! order-2 translation, identifying `(x, y)` with `(-x, -y)`; the resulting
//! group has prime order `r_bw` and a canonical 32-byte x-only encoding.
//!
//! Addition uses the unified projective formulas, which have no exceptional
//! cases among wagon points; equality, serialization and the scalar-field map
//! are all quotient-aware ((x, y) and (-x, -y) are indistinguishable through
//! the public API).

#![forbid(unsafe_code)]

use crate::bigint::{ct_mask, BigInt, Ct, CT_TRUE};
use crate::field::Fp;
use crate::fields::{Fr, FrBw};
use crate::msm::BucketGroup;
use crate::status::CryptoError;

const fn fr(limbs: [u64; 4]) -> Fr {
    Fp::from_mont_unchecked(BigInt(limbs))
}

/// `a = -5`, Montgomery form.
const TE_A: Fr = fr([
    0xfffffff40000000c,
    0xece3b023ffec4ff3,
    0x66b620607396203f,
    0x6f23d7e5f361df62,
]);

/// The Bandersnatch `d` constant, Montgomery form.
const TE_D: Fr = fr([
    0xa8dced1b47a2c730,
    0x381c065aad3cccc7,
    0x53ff52e1188351f8,
    0x362e8d63990fe940,
]);

/// Subgroup generator, affine.
const GEN_X: Fr = fr([
    0xec2627e1e7ab47f5,
    0x3e63de484f01aa9c,
    0xfe0f5c3b53946dc4,
    0x2d71920baeb2cfcd,
]);
const GEN_Y: Fr = fr([
    0x4e30593e1895bd34,
    0x156d738f32afbe4b,
    0x45ef0b1ccdeb75f4,
    0x6a7cca0037d2e71f,
]);

/// Affine twisted-Edwards point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdwardsAffine {
    pub x: Fr,
    pub y: Fr,
}

/// Projective twisted-Edwards point (`x/z`, `y/z`); `(0, 1, 1)` is neutral.
#[derive(Clone, Copy, Debug)]
pub struct EdwardsProjective {
    pub x: Fr,
    pub y: Fr,
    pub z: Fr,
}

impl EdwardsAffine {
    pub const IDENTITY: Self = Self { x: Fr::ZERO, y: Fr::ONE };

    /// Curve-equation membership: `-5x² + y² = 1 + d·x²y²`.
    pub fn is_on_curve(&self) -> bool {
        let x2 = self.x.square();
        let y2 = self.y.square();
        TE_A * x2 + y2 == Fr::ONE + TE_D * x2 * y2
    }
}

impl EdwardsProjective {
    pub const IDENTITY: Self = Self { x: Fr::ZERO, y: Fr::ONE, z: Fr::ONE };

    pub fn from_affine(a: &EdwardsAffine) -> Self {
        Self { x: a.x, y: a.y, z: Fr::ONE }
    }

    /// Unified projective addition (no exceptional wagon inputs).
    pub fn add(&self, o: &Self) -> Self {
        let a = self.z * o.z;
        let b = a.square();
        let c = self.x * o.x;
        let d = self.y * o.y;
        let e = TE_D * c * d;
        let f = b - e;
        let g = b + e;
        let x3 = a * f * ((self.x + self.y) * (o.x + o.y) - c - d);
        let y3 = a * g * (d - TE_A * c);
        let z3 = f * g;
        Self { x: x3, y: y3, z: z3 }
    }

    /// Mixed addition with an affine point (`Z2 = 1`).
    pub fn add_affine(&self, o: &EdwardsAffine) -> Self {
        let a = self.z;
        let b = a.square();
        let c = self.x * o.x;
        let d = self.y * o.y;
        let e = TE_D * c * d;
        let f = b - e;
        let g = b + e;
        let x3 = a * f * ((self.x + self.y) * (o.x + o.y) - c - d);
        let y3 = a * g * (d - TE_A * c);
        let z3 = f * g;
        Self { x: x3, y: y3, z: z3 }
    }

    /// Unified doubling.
    pub fn double(&self) -> Self {
        let b = (self.x + self.y).square();
        let c = self.x.square();
        let d = self.y.square();
        let e = TE_A * c;
        let f = e + d;
        let h = self.z.square();
        let j = f - h.double();
        let x3 = (b - c - d) * j;
        let y3 = f * (e - d);
        let z3 = f * j;
        Self { x: x3, y: y3, z: z3 }
    }

    pub fn neg(&self) -> Self {
        Self { x: -self.x, y: self.y, z: self.z }
    }

    fn conditional_select(a: &Self, b: &Self, ctl: Ct) -> Self {
        Self {
            x: Fr::conditional_select(&a.x, &b.x, ctl),
            y: Fr::conditional_select(&a.y, &b.y, ctl),
            z: Fr::conditional_select(&a.z, &b.z, ctl),
        }
    }

    /// Constant-time fixed-window scalar multiplication; unified addition
    /// makes identity table entries harmless.
    pub fn mul_ct(&self, scalar: &BigInt<4>) -> Self {
        const W: usize = 4;
        let mut table = [Self::IDENTITY; 1 << W];
        table[1] = *self;
        for i in 2..(1 << W) {
            table[i] = if i % 2 == 0 {
                table[i / 2].double()
            } else {
                table[i - 1].add(self)
            };
        }
        let windows = 256 / W;
        let mut acc = Self::IDENTITY;
        for w in (0..windows).rev() {
            for _ in 0..W {
                acc = acc.double();
            }
            let digit = scalar.window_vartime(w * W, W);
            let mut entry = Self::IDENTITY;
            for (d, candidate) in table.iter().enumerate() {
                entry = Self::conditional_select(&entry, candidate, ct_mask(d == digit));
            }
            acc = acc.add(&entry);
        }
        acc
    }

    /// Normalize (one inversion, variable time). Identity-z never occurs for
    /// wagon points.
    pub fn to_affine(&self) -> EdwardsAffine {
        let zinv = self.z.invert().expect("wagon points have nonzero z");
        EdwardsAffine { x: self.x * zinv, y: self.y * zinv }
    }
}

/// A Banderwagon group element (quotient class of a Bandersnatch point).
#[derive(Clone, Copy, Debug)]
pub struct Element(pub(crate) EdwardsProjective);

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        // quotient equality: x1/y1 == x2/y2, cross-multiplied
        let lhs = self.0.x * other.0.y;
        let rhs = other.0.x * self.0.y;
        lhs == rhs
    }
}
impl Eq for Element {}

impl Element {
    /// The neutral element.
    pub const IDENTITY: Self = Self(EdwardsProjective::IDENTITY);

    /// The fixed subgroup generator.
    pub fn generator() -> Self {
        Self(EdwardsProjective::from_affine(&EdwardsAffine { x: GEN_X, y: GEN_Y }))
    }

    pub fn add(&self, other: &Self) -> Self {
        Self(self.0.add(&other.0))
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self(self.0.add(&other.0.neg()))
    }

    pub fn double(&self) -> Self {
        Self(self.0.double())
    }

    pub fn neg(&self) -> Self {
        Self(self.0.neg())
    }

    /// Constant-time scalar multiplication by a Banderwagon scalar.
    pub fn mul(&self, k: &FrBw) -> Self {
        Self(self.0.mul_ct(&k.to_bigint()))
    }

    pub fn is_identity(&self) -> bool {
        // identity class: x = 0 (covers (0,1) and (0,-1))
        self.0.x.is_zero_vartime()
    }

    /// Canonical 32-byte encoding: big-endian `x` of the representative whose
    /// `y` is lexicographically largest.
    pub fn to_bytes(&self) -> [u8; 32] {
        let affine = self.0.to_affine();
        let flip = affine.y.is_lexicographically_largest() ^ CT_TRUE;
        let x = Fr::conditional_select(&affine.x, &(-affine.x), flip);
        let mut out = [0u8; 32];
        x.write_be_bytes(&mut out);
        out
    }

    /// Decode and validate: canonical x, curve membership, wagon membership.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let x = Fr::from_be_bytes(bytes).ok_or(CryptoError::CoordinateOutOfRange)?;
        let x2 = x.square();

        // y² = (1 - ax²) / (1 - dx²)
        let num = Fr::ONE - TE_A * x2;
        let den = Fr::ONE - TE_D * x2;
        let den_inv = den.invert().ok_or(CryptoError::PointNotOnCurve)?;
        let (y, on_curve) = (num * den_inv).sqrt_if_square();
        if on_curve != CT_TRUE {
            return Err(CryptoError::PointNotOnCurve);
        }

        // wagon membership: 1 - ax² must be a square
        if num.is_square() != CT_TRUE {
            return Err(CryptoError::PointNotInSubgroup);
        }

        // canonical representative: lexicographically largest y
        let y = Fr::conditional_select(&(-y), &y, y.is_lexicographically_largest());
        Ok(Self(EdwardsProjective::from_affine(&EdwardsAffine { x, y })))
    }

    /// `x/y` of the class in the coordinate field. Both representatives map
    /// to the same value.
    pub fn map_to_base_field(&self) -> Fr {
        let affine = self.0.to_affine();
        affine.x * affine.y.invert().expect("wagon points have nonzero y")
    }

    /// `x/y`, serialized big-endian and reduced into the scalar field.
    pub fn map_to_scalar_field(&self) -> FrBw {
        FrBw::from_be_bytes_reduce(&self.map_to_base_field().to_be_bytes())
    }

    /// Normalize a batch of elements to affine with one inversion.
    pub fn batch_normalize(elements: &[Element]) -> Vec<EdwardsAffine> {
        let mut prefix = Vec::with_capacity(elements.len());
        let mut acc = Fr::ONE;
        for e in elements {
            prefix.push(acc);
            acc *= e.0.z;
        }
        let mut inv = acc.invert().expect("wagon points have nonzero z");
        let mut out = vec![EdwardsAffine::IDENTITY; elements.len()];
        for (i, e) in elements.iter().enumerate().rev() {
            let zinv = inv * prefix[i];
            inv *= e.0.z;
            out[i] = EdwardsAffine { x: e.0.x * zinv, y: e.0.y * zinv };
        }
        out
    }
}

impl BucketGroup for EdwardsProjective {
    type Input = EdwardsAffine;

    #[inline]
    fn bucket_zero() -> Self {
        Self::IDENTITY
    }
    #[inline]
    fn bucket_add_input(&mut self, p: &Self::Input) {
        *self = self.add_affine(p);
    }
    #[inline]
    fn bucket_add(&mut self, other: &Self) {
        *self = self.add(other);
    }
    #[inline]
    fn input_is_identity(p: &Self::Input) -> bool {
        p.x.is_zero_vartime()
    }
}

/// Banderwagon MSM: `Σ kᵢ·Pᵢ` (variable-time bucket method).
pub fn msm(elements: &[Element], scalars: &[FrBw]) -> Element {
    let affine = Element::batch_normalize(elements);
    let bigints: Vec<BigInt<4>> = scalars.iter().map(|s| s.to_bigint()).collect();
    Element(crate::msm::msm_bigint::<EdwardsProjective>(&affine, &bigints))
}

/// Parallel Banderwagon MSM over an explicit pool.
pub fn msm_parallel(pool: &rayon::ThreadPool, elements: &[Element], scalars: &[FrBw]) -> Element {
    let affine = Element::batch_normalize(elements);
    let bigints: Vec<BigInt<4>> = scalars.iter().map(|s| s.to_bigint()).collect();
    Element(crate::msm::msm_bigint_parallel::<EdwardsProjective>(
        pool, &affine, &bigints,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_mul(k: u64) -> Element {
        Element::generator().mul(&FrBw::from_u64(k))
    }

    #[test]
    fn generator_on_curve() {
        assert!(EdwardsAffine { x: GEN_X, y: GEN_Y }.is_on_curve());
    }

    #[test]
    fn group_laws() {
        let g = Element::generator();
        assert_eq!(g.add(&Element::IDENTITY), g);
        assert_eq!(g.add(&g.neg()), Element::IDENTITY);
        assert!(g.add(&g.neg()).is_identity());
        assert_eq!(g.double(), g.add(&g));
        assert_eq!(small_mul(5).add(&small_mul(7)), small_mul(12));
        assert!(g.0.to_affine().is_on_curve());
        assert!(g.double().0.to_affine().is_on_curve());
    }

    #[test]
    fn scalar_mul_consistency() {
        let mut rng = StdRng::from_seed([31u8; 32]);
        let g = Element::generator();
        let a = FrBw::rand(&mut rng);
        let b = FrBw::rand(&mut rng);
        assert_eq!(g.mul(&a).add(&g.mul(&b)), g.mul(&(a + b)));
        assert_eq!(g.mul(&a).mul(&b), g.mul(&(a * b)));
    }

    #[test]
    fn serialization_roundtrip_and_quotient() {
        let mut rng = StdRng::from_seed([32u8; 32]);
        for _ in 0..10 {
            let k = FrBw::rand(&mut rng);
            let p = Element::generator().mul(&k);
            let bytes = p.to_bytes();
            let q = Element::from_bytes(&bytes).unwrap();
            assert_eq!(p, q);
            assert_eq!(q.to_bytes(), bytes);
            // the negated representative is a different class and encodes
            // differently (unless identity)
            if !p.is_identity() {
                assert_ne!(p.neg().to_bytes(), bytes);
            }
        }
    }

    #[test]
    fn map_to_scalar_is_quotient_invariant() {
        // (x, y) and (-x, -y) map identically
        let p = small_mul(981);
        let flipped = Element(EdwardsProjective {
            x: -p.0.x,
            y: -p.0.y,
            z: p.0.z,
        });
        assert_eq!(p, flipped);
        assert_eq!(p.map_to_scalar_field(), flipped.map_to_scalar_field());
        assert_eq!(p.to_bytes(), flipped.to_bytes());
    }

    #[test]
    fn non_wagon_x_rejected() {
        // scan x values; every decodable x must re-encode canonically, and at
        // least one candidate must be rejected for subgroup membership
        let mut rejected = false;
        for i in 2u64..40 {
            let mut bytes = [0u8; 32];
            Fr::from_u64(i).write_be_bytes(&mut bytes);
            match Element::from_bytes(&bytes) {
                Ok(p) => assert_eq!(p.to_bytes(), bytes),
                Err(CryptoError::PointNotInSubgroup) => rejected = true,
                Err(_) => {}
            }
        }
        assert!(rejected);
    }

    #[test]
    fn msm_matches_naive() {
        let mut rng = StdRng::from_seed([33u8; 32]);
        let points: Vec<Element> = (1u64..9).map(small_mul).collect();
        let scalars: Vec<FrBw> = (0..8).map(|_| FrBw::rand(&mut rng)).collect();
        let mut expect = Element::IDENTITY;
        for (p, s) in points.iter().zip(scalars.iter()) {
            expect = expect.add(&p.mul(s));
        }
        assert_eq!(msm(&points, &scalars), expect);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        assert_eq!(msm_parallel(&pool, &points, &scalars), expect);
    }
}
