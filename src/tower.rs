//! BLS12-381 extension tower
//!
//! 𝔽p² = 𝔽p[u]/(u² + 1), 𝔽p⁶ = 𝔽p²[v]/(v³ − ξ) with ξ = 1 + u, and
//! 𝔽p¹² = 𝔽p⁶[w]/(w² − v), the quadratic-over-cubic layout. In flattened
//! `w`-powers an 𝔽p¹² element is
//!
//! ```text
//! c0.c0 + c1.c0·w + c0.c1·w² + c1.c1·w³ + c0.c2·w⁴ + c1.c2·w⁵
//! ```
//!
//! Pairing lines occupy the sparse `{w⁰, w², w³}` subspace (M-twist), served
//! by [`Fp12::mul_by_line`]. Elements surviving the easy part of the final
//! exponentiation live in the cyclotomic subgroup where [`Fp12::cyclotomic_square`]
//! applies.

#![forbid(unsafe_code)]

use core::fmt;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::bigint::{BigInt, Ct};
use crate::field::{Field, Fp};
use crate::fields::{Fq, FqParams};

// ===========================================================================
// Fp2
// ===========================================================================

/// 𝔽p² element `c0 + c1·u`, `u² = -1`.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Fp2 {
    pub c0: Fq,
    pub c1: Fq,
}

impl fmt::Debug for Fp2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fp2({:?} + {:?}*u)", self.c0, self.c1)
    }
}

impl Fp2 {
    pub const ZERO: Self = Self { c0: Fq::ZERO, c1: Fq::ZERO };
    pub const ONE: Self = Self { c0: Fq::ONE, c1: Fq::ZERO };

    pub const fn new(c0: Fq, c1: Fq) -> Self {
        Self { c0, c1 }
    }

    /// Embed a base-field element.
    pub const fn from_base(c0: Fq) -> Self {
        Self { c0, c1: Fq::ZERO }
    }

    #[inline]
    pub fn add_assign_internal(&mut self, o: &Self) {
        self.c0 += o.c0;
        self.c1 += o.c1;
    }

    #[inline]
    pub fn sub_assign_internal(&mut self, o: &Self) {
        self.c0 -= o.c0;
        self.c1 -= o.c1;
    }

    #[inline]
    pub fn double(&self) -> Self {
        Self { c0: self.c0.double(), c1: self.c1.double() }
    }

    #[inline]
    pub fn halve(&self) -> Self {
        Self { c0: self.c0.halve(), c1: self.c1.halve() }
    }

    /// Karatsuba multiplication for `u² = -1`.
    #[inline]
    pub fn mul_internal(&self, o: &Self) -> Self {
        let aa = self.c0 * o.c0;
        let bb = self.c1 * o.c1;
        let sum = (self.c0 + self.c1) * (o.c0 + o.c1);
        Self { c0: aa - bb, c1: sum - aa - bb }
    }

    /// Complex squaring: `(a+bu)² = (a+b)(a-b) + 2ab·u`.
    #[inline]
    pub fn square(&self) -> Self {
        let c0 = (self.c0 + self.c1) * (self.c0 - self.c1);
        let c1 = (self.c0 * self.c1).double();
        Self { c0, c1 }
    }

    /// Scale by a base-field element.
    #[inline]
    pub fn mul_base(&self, s: &Fq) -> Self {
        Self { c0: self.c0 * *s, c1: self.c1 * *s }
    }

    /// Multiply by the cubic non-residue `ξ = 1 + u`.
    #[inline]
    pub fn mul_by_nonresidue(&self) -> Self {
        Self { c0: self.c0 - self.c1, c1: self.c0 + self.c1 }
    }

    /// Conjugate `a - b·u`; also the `p`-power Frobenius on 𝔽p².
    #[inline]
    pub fn conjugate(&self) -> Self {
        Self { c0: self.c0, c1: -self.c1 }
    }

    /// `(a + bu)^{-1} = (a - bu) / (a² + b²)`.
    pub fn invert(&self) -> Option<Self> {
        let norm = self.c0.square() + self.c1.square();
        let ninv = norm.invert()?;
        Some(Self { c0: self.c0 * ninv, c1: -(self.c1 * ninv) })
    }

    /// Exponentiation by a public limb-slice exponent.
    pub fn pow(&self, exp: &[u64]) -> Self {
        let mut acc = Self::ONE;
        let mut started = false;
        for limb in exp.iter().rev() {
            for i in (0..64).rev() {
                if started {
                    acc = acc.square();
                }
                if (limb >> i) & 1 == 1 {
                    acc = acc.mul_internal(self);
                    started = true;
                }
            }
        }
        acc
    }

    /// Square root (Algorithm 9, eprint 2012/685); `None` for non-squares.
    /// Variable-time; used only while decompressing public G2 encodings.
    pub fn sqrt_vartime(&self) -> Option<Self> {
        if self.is_zero_vartime() {
            return Some(Self::ZERO);
        }
        // (p - 3) / 4
        const E1: BigInt<6> = BigInt([
            0xee7fbfffffffeaaa,
            0x07aaffffac54ffff,
            0xd9cc34a83dac3d89,
            0xd91dd2e13ce144af,
            0x92c6e9ed90d2eb35,
            0x0680447a8e5ff9a6,
        ]);
        let b = self.pow(&E1.0);
        let alpha = b.square().mul_internal(self);
        let x0 = b.mul_internal(self);
        let minus_one = Self::from_base(-Fq::ONE);
        let cand = if alpha == minus_one {
            // multiply by u
            Self { c0: -x0.c1, c1: x0.c0 }
        } else {
            let e = <FqParams as crate::field::FpParams<6>>::MODULUS_MINUS_ONE_DIV_TWO;
            (alpha + Self::ONE).pow(&e.0).mul_internal(&x0)
        };
        if cand.square() == *self {
            Some(cand)
        } else {
            None
        }
    }

    /// Sign rule for compressed G2 encodings: decided by `c1` when non-zero,
    /// else by `c0`.
    pub fn is_lexicographically_largest(&self) -> Ct {
        let c1_zero = self.c1.ct_is_zero();
        (self.c1.is_lexicographically_largest() & !c1_zero)
            | (self.c0.is_lexicographically_largest() & c1_zero)
    }
}

impl Add for Fp2 {
    type Output = Self;
    #[inline]
    fn add(mut self, o: Self) -> Self {
        self.add_assign_internal(&o);
        self
    }
}
impl AddAssign for Fp2 {
    #[inline]
    fn add_assign(&mut self, o: Self) {
        self.add_assign_internal(&o);
    }
}
impl Sub for Fp2 {
    type Output = Self;
    #[inline]
    fn sub(mut self, o: Self) -> Self {
        self.sub_assign_internal(&o);
        self
    }
}
impl SubAssign for Fp2 {
    #[inline]
    fn sub_assign(&mut self, o: Self) {
        self.sub_assign_internal(&o);
    }
}
impl Mul for Fp2 {
    type Output = Self;
    #[inline]
    fn mul(self, o: Self) -> Self {
        self.mul_internal(&o)
    }
}
impl MulAssign for Fp2 {
    #[inline]
    fn mul_assign(&mut self, o: Self) {
        *self = self.mul_internal(&o);
    }
}
impl Neg for Fp2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self { c0: -self.c0, c1: -self.c1 }
    }
}

impl Field for Fp2 {
    const ZERO: Self = Self::ZERO;
    const ONE: Self = Self::ONE;

    #[inline]
    fn double(&self) -> Self {
        Fp2::double(self)
    }
    #[inline]
    fn square(&self) -> Self {
        Fp2::square(self)
    }
    #[inline]
    fn invert(&self) -> Option<Self> {
        Fp2::invert(self)
    }
    #[inline]
    fn conditional_select(a: &Self, b: &Self, ctl: Ct) -> Self {
        Self {
            c0: Fq::conditional_select(&a.c0, &b.c0, ctl),
            c1: Fq::conditional_select(&a.c1, &b.c1, ctl),
        }
    }
    #[inline]
    fn ct_eq(&self, other: &Self) -> Ct {
        self.c0.ct_eq(&other.c0) & self.c1.ct_eq(&other.c1)
    }
    #[inline]
    fn is_zero_vartime(&self) -> bool {
        self.c0.is_zero_vartime() && self.c1.is_zero_vartime()
    }
}

// helper for the constant tables below
const fn fq(limbs: [u64; 6]) -> Fq {
    Fp::from_mont_unchecked(BigInt(limbs))
}
const fn fp2(c0: [u64; 6], c1: [u64; 6]) -> Fp2 {
    Fp2::new(fq(c0), fq(c1))
}

/// `ξ^((p^k - 1)/3)` for k = 1..3 (coefficient of `c1` under Frobenius in 𝔽p⁶).
pub(crate) const FROB6_C1: [Fp2; 3] = [
    fp2(
        [0, 0, 0, 0, 0, 0],
        [
            0xcd03c9e48671f071,
            0x5dab22461fcda5d2,
            0x587042afd3851b95,
            0x8eb60ebe01bacb9e,
            0x03f97d6e83d050d2,
            0x18f0206554638741,
        ],
    ),
    fp2(
        [
            0x30f1361b798a64e8,
            0xf3b8ddab7ece5a2a,
            0x16a8ca3ac61577f7,
            0xc26a2ff874fd029b,
            0x3636b76660701c6e,
            0x051ba4ab241b6160,
        ],
        [0, 0, 0, 0, 0, 0],
    ),
    fp2(
        [0, 0, 0, 0, 0, 0],
        [
            0x760900000002fffd,
            0xebf4000bc40c0002,
            0x5f48985753c758ba,
            0x77ce585370525745,
            0x5c071a97a256ec6d,
            0x15f65ec3fa80e493,
        ],
    ),
];

/// `ξ^(2(p^k - 1)/3)` for k = 1..3 (coefficient of `c2`).
pub(crate) const FROB6_C2: [Fp2; 3] = [
    fp2(
        [
            0x890dc9e4867545c3,
            0x2af322533285a5d5,
            0x50880866309b7e2c,
            0xa20d1b8c7e881024,
            0x14e4f04fe2db9068,
            0x14e56d3f1564853a,
        ],
        [0, 0, 0, 0, 0, 0],
    ),
    fp2(
        [
            0xcd03c9e48671f071,
            0x5dab22461fcda5d2,
            0x587042afd3851b95,
            0x8eb60ebe01bacb9e,
            0x03f97d6e83d050d2,
            0x18f0206554638741,
        ],
        [0, 0, 0, 0, 0, 0],
    ),
    fp2(
        [
            0x43f5fffffffcaaae,
            0x32b7fff2ed47fffd,
            0x07e83a49a2e99d69,
            0xeca8f3318332bb7a,
            0xef148d1ea0f4c069,
            0x040ab3263eff0206,
        ],
        [0, 0, 0, 0, 0, 0],
    ),
];

/// `ξ^((p^k - 1)/6)` for k = 1..3 (coefficient of the 𝔽p⁶ `c1` in 𝔽p¹²).
pub(crate) const FROB12_C1: [Fp2; 3] = [
    fp2(
        [
            0x07089552b319d465,
            0xc6695f92b50a8313,
            0x97e83cccd117228f,
            0xa35baecab2dc29ee,
            0x1ce393ea5daace4d,
            0x08f2220fb0fb66eb,
        ],
        [
            0xb2f66aad4ce5d646,
            0x5842a06bfc497cec,
            0xcf4895d42599d394,
            0xc11b9cba40a8e8d0,
            0x2e3813cbe5a0de89,
            0x110eefda88847faf,
        ],
    ),
    fp2(
        [
            0xecfb361b798dba3a,
            0xc100ddb891865a2c,
            0x0ec08ff1232bda8e,
            0xd5c13cc6f1ca4721,
            0x47222a47bf7b5c04,
            0x0110f184e51c5f59,
        ],
        [0, 0, 0, 0, 0, 0],
    ),
    fp2(
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
    ),
];

// ===========================================================================
// Fp6
// ===========================================================================

/// 𝔽p⁶ element `c0 + c1·v + c2·v²`, `v³ = ξ`.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Fp6 {
    pub c0: Fp2,
    pub c1: Fp2,
    pub c2: Fp2,
}

impl Fp6 {
    pub const ZERO: Self = Self { c0: Fp2::ZERO, c1: Fp2::ZERO, c2: Fp2::ZERO };
    pub const ONE: Self = Self { c0: Fp2::ONE, c1: Fp2::ZERO, c2: Fp2::ZERO };

    pub const fn new(c0: Fp2, c1: Fp2, c2: Fp2) -> Self {
        Self { c0, c1, c2 }
    }

    #[inline]
    pub fn add(&self, o: &Self) -> Self {
        Self { c0: self.c0 + o.c0, c1: self.c1 + o.c1, c2: self.c2 + o.c2 }
    }

    #[inline]
    pub fn sub(&self, o: &Self) -> Self {
        Self { c0: self.c0 - o.c0, c1: self.c1 - o.c1, c2: self.c2 - o.c2 }
    }

    #[inline]
    pub fn neg(&self) -> Self {
        Self { c0: -self.c0, c1: -self.c1, c2: -self.c2 }
    }

    #[inline]
    pub fn double(&self) -> Self {
        Self { c0: self.c0.double(), c1: self.c1.double(), c2: self.c2.double() }
    }

    #[inline]
    pub fn halve(&self) -> Self {
        Self { c0: self.c0.halve(), c1: self.c1.halve(), c2: self.c2.halve() }
    }

    /// Toom/Karatsuba-style full multiplication.
    pub fn mul(&self, o: &Self) -> Self {
        let t0 = self.c0 * o.c0;
        let t1 = self.c1 * o.c1;
        let t2 = self.c2 * o.c2;

        let c0 = ((self.c1 + self.c2) * (o.c1 + o.c2) - t1 - t2).mul_by_nonresidue() + t0;
        let c1 = (self.c0 + self.c1) * (o.c0 + o.c1) - t0 - t1 + t2.mul_by_nonresidue();
        let c2 = (self.c0 + self.c2) * (o.c0 + o.c2) - t0 - t2 + t1;
        Self { c0, c1, c2 }
    }

    #[inline]
    pub fn square(&self) -> Self {
        self.mul(self)
    }

    /// Multiply by `v`: `(c0, c1, c2) -> (ξ·c2, c0, c1)`.
    #[inline]
    pub fn mul_by_v(&self) -> Self {
        Self { c0: self.c2.mul_by_nonresidue(), c1: self.c0, c2: self.c1 }
    }

    /// Sparse multiply by `b0 + b1·v`.
    pub fn mul_by_01(&self, b0: &Fp2, b1: &Fp2) -> Self {
        let aa = self.c0 * *b0;
        let bb = self.c1 * *b1;
        let c0 = ((self.c1 + self.c2) * *b1 - bb).mul_by_nonresidue() + aa;
        let c1 = (self.c0 + self.c1) * (*b0 + *b1) - aa - bb;
        let c2 = (self.c0 + self.c2) * *b0 - aa + bb;
        Self { c0, c1, c2 }
    }

    /// Sparse multiply by `b1·v`.
    pub fn mul_by_1(&self, b1: &Fp2) -> Self {
        Self {
            c0: (self.c2 * *b1).mul_by_nonresidue(),
            c1: self.c0 * *b1,
            c2: self.c1 * *b1,
        }
    }

    pub fn invert(&self) -> Option<Self> {
        let c0 = self.c0.square() - (self.c1 * self.c2).mul_by_nonresidue();
        let c1 = self.c2.square().mul_by_nonresidue() - self.c0 * self.c1;
        let c2 = self.c1.square() - self.c0 * self.c2;
        let norm = (self.c2 * c1 + self.c1 * c2).mul_by_nonresidue() + self.c0 * c0;
        let t = norm.invert()?;
        Some(Self { c0: t * c0, c1: t * c1, c2: t * c2 })
    }

    /// `x -> x^(p^k)` for k in 1..=3.
    pub fn frobenius_map(&self, k: usize) -> Self {
        debug_assert!((1..=3).contains(&k));
        let conj = k % 2 == 1;
        let map = |c: Fp2| if conj { c.conjugate() } else { c };
        Self {
            c0: map(self.c0),
            c1: map(self.c1) * FROB6_C1[k - 1],
            c2: map(self.c2) * FROB6_C2[k - 1],
        }
    }

    pub fn is_zero_vartime(&self) -> bool {
        self.c0.is_zero_vartime() && self.c1.is_zero_vartime() && self.c2.is_zero_vartime()
    }
}

// ===========================================================================
// Fp12
// ===========================================================================

/// 𝔽p¹² element `c0 + c1·w`, `w² = v`.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Fp12 {
    pub c0: Fp6,
    pub c1: Fp6,
}

impl Fp12 {
    pub const ONE: Self = Self { c0: Fp6::ONE, c1: Fp6::ZERO };

    pub fn mul(&self, o: &Self) -> Self {
        let t0 = self.c0.mul(&o.c0);
        let t1 = self.c1.mul(&o.c1);
        let c1 = self.c0.add(&self.c1).mul(&o.c0.add(&o.c1)).sub(&t0).sub(&t1);
        let c0 = t0.add(&t1.mul_by_v());
        Self { c0, c1 }
    }

    pub fn square(&self) -> Self {
        let ab = self.c0.mul(&self.c1);
        let t = self.c0.add(&self.c1).mul(&self.c0.add(&self.c1.mul_by_v()));
        let c0 = t.sub(&ab).sub(&ab.mul_by_v());
        let c1 = ab.double();
        Self { c0, c1 }
    }

    /// Conjugation over 𝔽p⁶; equals `x^(p^6)`, and inversion in the
    /// cyclotomic subgroup.
    #[inline]
    pub fn conjugate(&self) -> Self {
        Self { c0: self.c0, c1: self.c1.neg() }
    }

    #[inline]
    pub fn neg(&self) -> Self {
        Self { c0: self.c0.neg(), c1: self.c1.neg() }
    }

    #[inline]
    pub fn halve(&self) -> Self {
        Self { c0: self.c0.halve(), c1: self.c1.halve() }
    }

    pub fn invert(&self) -> Option<Self> {
        let norm = self.c0.square().sub(&self.c1.square().mul_by_v());
        let t = norm.invert()?;
        Some(Self { c0: self.c0.mul(&t), c1: self.c1.mul(&t).neg() })
    }

    /// `x -> x^(p^k)` for k in 1..=3.
    pub fn frobenius_map(&self, k: usize) -> Self {
        debug_assert!((1..=3).contains(&k));
        let c0 = self.c0.frobenius_map(k);
        let c1 = self.c1.frobenius_map(k);
        Self {
            c0,
            c1: Fp6 {
                c0: c1.c0 * FROB12_C1[k - 1],
                c1: c1.c1 * FROB12_C1[k - 1],
                c2: c1.c2 * FROB12_C1[k - 1],
            },
        }
    }

    /// Multiply by a pairing line `l0 + l2·w² + l3·w³` (M-twist sparse shape):
    /// in tower coordinates the line is `Fp6(l0, l2, 0) + Fp6(0, l3, 0)·w`.
    pub fn mul_by_line(&self, l0: &Fp2, l2: &Fp2, l3: &Fp2) -> Self {
        let aa = self.c0.mul_by_01(l0, l2);
        let bb = self.c1.mul_by_1(l3);
        let o = *l2 + *l3;
        let c1 = self.c1.add(&self.c0).mul_by_01(l0, &o).sub(&aa).sub(&bb);
        let c0 = bb.mul_by_v().add(&aa);
        Self { c0, c1 }
    }

    /// Compressed squaring in the cyclotomic subgroup
    /// (Granger–Scott, via 𝔽p⁴ squarings).
    pub fn cyclotomic_square(&self) -> Self {
        fn fp4_square(a: Fp2, b: Fp2) -> (Fp2, Fp2) {
            let t0 = a.square();
            let t1 = b.square();
            let c0 = t1.mul_by_nonresidue() + t0;
            let c1 = (a + b).square() - t0 - t1;
            (c0, c1)
        }

        let z0 = self.c0.c0;
        let z4 = self.c0.c1;
        let z3 = self.c0.c2;
        let z2 = self.c1.c0;
        let z1 = self.c1.c1;
        let z5 = self.c1.c2;

        let (t0, t1) = fp4_square(z0, z1);
        let nz0 = (t0 - z0).double() + t0;
        let nz1 = (t1 + z1).double() + t1;

        let (t0, t1) = fp4_square(z2, z3);
        let (t2, t3) = fp4_square(z4, z5);

        let nz4 = (t0 - z4).double() + t0;
        let nz5 = (t1 + z5).double() + t1;

        let t0 = t3.mul_by_nonresidue();
        let nz2 = (t0 + z2).double() + t0;
        let nz3 = (t2 - z3).double() + t2;

        Self {
            c0: Fp6::new(nz0, nz4, nz3),
            c1: Fp6::new(nz2, nz1, nz5),
        }
    }

    pub fn is_one(&self) -> bool {
        *self == Self::ONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rand_fp2(rng: &mut StdRng) -> Fp2 {
        Fp2::new(Fq::rand(rng), Fq::rand(rng))
    }
    fn rand_fp6(rng: &mut StdRng) -> Fp6 {
        Fp6::new(rand_fp2(rng), rand_fp2(rng), rand_fp2(rng))
    }
    fn rand_fp12(rng: &mut StdRng) -> Fp12 {
        Fp12 { c0: rand_fp6(rng), c1: rand_fp6(rng) }
    }

    #[test]
    fn fp2_mul_square_inverse() {
        let mut rng = StdRng::from_seed([1u8; 32]);
        for _ in 0..20 {
            let a = rand_fp2(&mut rng);
            let b = rand_fp2(&mut rng);
            assert_eq!(a * b, b * a);
            assert_eq!(a.square(), a * a);
            if !a.is_zero_vartime() {
                assert_eq!(a * a.invert().unwrap(), Fp2::ONE);
            }
        }
    }

    #[test]
    fn fp2_nonresidue_is_one_plus_u() {
        let mut rng = StdRng::from_seed([2u8; 32]);
        let xi = Fp2::new(Fq::ONE, Fq::ONE);
        for _ in 0..10 {
            let a = rand_fp2(&mut rng);
            assert_eq!(a.mul_by_nonresidue(), a * xi);
        }
    }

    #[test]
    fn fp2_sqrt_roundtrip() {
        let mut rng = StdRng::from_seed([3u8; 32]);
        for _ in 0..10 {
            let a = rand_fp2(&mut rng);
            let sq = a.square();
            let root = sq.sqrt_vartime().expect("square has a root");
            assert_eq!(root.square(), sq);
        }
    }

    #[test]
    fn fp6_sparse_mul_agrees_with_full() {
        let mut rng = StdRng::from_seed([4u8; 32]);
        for _ in 0..10 {
            let a = rand_fp6(&mut rng);
            let b0 = rand_fp2(&mut rng);
            let b1 = rand_fp2(&mut rng);
            assert_eq!(a.mul_by_01(&b0, &b1), a.mul(&Fp6::new(b0, b1, Fp2::ZERO)));
            assert_eq!(a.mul_by_1(&b1), a.mul(&Fp6::new(Fp2::ZERO, b1, Fp2::ZERO)));
            assert_eq!(a.mul_by_v(), a.mul(&Fp6::new(Fp2::ZERO, Fp2::ONE, Fp2::ZERO)));
        }
    }

    #[test]
    fn fp6_inverse() {
        let mut rng = StdRng::from_seed([5u8; 32]);
        let a = rand_fp6(&mut rng);
        assert_eq!(a.mul(&a.invert().unwrap()), Fp6::ONE);
    }

    #[test]
    fn fp12_mul_inverse_line() {
        let mut rng = StdRng::from_seed([6u8; 32]);
        let a = rand_fp12(&mut rng);
        assert_eq!(a.mul(&a.invert().unwrap()), Fp12::ONE);
        let (l0, l2, l3) = (rand_fp2(&mut rng), rand_fp2(&mut rng), rand_fp2(&mut rng));
        let sparse = Fp12 {
            c0: Fp6::new(l0, l2, Fp2::ZERO),
            c1: Fp6::new(Fp2::ZERO, l3, Fp2::ZERO),
        };
        assert_eq!(a.mul_by_line(&l0, &l2, &l3), a.mul(&sparse));
    }

    #[test]
    fn frobenius_composes() {
        let mut rng = StdRng::from_seed([7u8; 32]);
        let a = rand_fp12(&mut rng);
        assert_eq!(a.frobenius_map(1).frobenius_map(1), a.frobenius_map(2));
        assert_eq!(a.frobenius_map(2).frobenius_map(1), a.frobenius_map(3));
        let mut t = a;
        for _ in 0..12 {
            t = t.frobenius_map(1);
        }
        assert_eq!(t, a);
    }

    #[test]
    fn frobenius_multiplicative() {
        let mut rng = StdRng::from_seed([8u8; 32]);
        let a = rand_fp12(&mut rng);
        let b = rand_fp12(&mut rng);
        for k in 1..=3 {
            assert_eq!(a.mul(&b).frobenius_map(k), a.frobenius_map(k).mul(&b.frobenius_map(k)));
        }
    }
}
