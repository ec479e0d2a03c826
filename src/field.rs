//! Montgomery-form prime fields
//!
//! A prime field is described entirely at compile time by an [`FpParams`]
//! implementation: the modulus, `R^2 mod p`, `-p^{-1} mod 2^64`, spare top
//! bits, and the two-adicity data driving square roots. [`Fp`] stores the
//! Montgomery residue `a * R mod p` and keeps the invariant that the stored
//! value is fully reduced.
//!
//! Constant-time policy: arithmetic on field elements performs no
//! data-dependent branches or indexing. Inversion uses the little-Fermat
//! exponentiation with the fixed public exponent `p - 2`; exponent scanning
//! is data-independent because exponents on these paths are compile-time
//! public constants. Square roots are only taken while decoding public
//! encodings and may be variable-time in the two-adic (Tonelli–Shanks) case.

#![forbid(unsafe_code)]

use core::fmt;
use core::marker::PhantomData;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use rand::RngCore;
use zeroize::Zeroize;

use crate::bigint::{ct_mask, mont_mul, BigInt, Ct, CT_TRUE};

/// Compile-time description of a prime field.
pub trait FpParams<const N: usize>: 'static + Copy + Send + Sync {
    /// The prime modulus `p`.
    const MODULUS: BigInt<N>;
    /// `R^2 mod p` with `R = 2^(64*N)`.
    const R2: BigInt<N>;
    /// `R mod p`, i.e. the Montgomery form of one.
    const ONE: BigInt<N>;
    /// `-p^{-1} mod 2^64`.
    const INV: u64;
    /// Unused top bits in the most significant limb.
    const SPARE_BITS: u32;
    /// Significant bits of `p`.
    const NUM_BITS: u32;
    /// `(p - 1) / 2`, plain form, for quadratic-residue tests.
    const MODULUS_MINUS_ONE_DIV_TWO: BigInt<N>;
    /// `(p + 1) / 4` when `p = 3 (mod 4)`; drives the cheap square root.
    const SQRT_EXPONENT: Option<BigInt<N>>;
    /// `s` with `p - 1 = 2^s * t`, `t` odd.
    const TWO_ADICITY: u32;
    /// `g^t` in Montgomery form for a multiplicative generator `g`
    /// (a `2^s`-th primitive root of unity).
    const TWO_ADIC_ROOT: BigInt<N>;
    /// `(t - 1) / 2`, plain form, for Tonelli–Shanks.
    const TRACE_MINUS_ONE_DIV_TWO: BigInt<N>;
    /// A multiplicative generator of the field, Montgomery form.
    const GENERATOR: BigInt<N>;
}

/// Prime-field element in Montgomery representation.
pub struct Fp<P: FpParams<N>, const N: usize> {
    mont: BigInt<N>,
    _params: PhantomData<P>,
}

impl<P: FpParams<N>, const N: usize> Clone for Fp<P, N> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<P: FpParams<N>, const N: usize> Copy for Fp<P, N> {}

impl<P: FpParams<N>, const N: usize> PartialEq for Fp<P, N> {
    fn eq(&self, other: &Self) -> bool {
        self.mont == other.mont
    }
}
impl<P: FpParams<N>, const N: usize> Eq for Fp<P, N> {}

impl<P: FpParams<N>, const N: usize> Default for Fp<P, N> {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<P: FpParams<N>, const N: usize> fmt::Debug for Fp<P, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let canonical = self.to_bigint();
        write!(f, "Fp({:?})", canonical)
    }
}

impl<P: FpParams<N>, const N: usize> Fp<P, N> {
    /// Additive identity.
    pub const ZERO: Self = Self { mont: BigInt::ZERO, _params: PhantomData };
    /// Multiplicative identity.
    pub const ONE: Self = Self { mont: P::ONE, _params: PhantomData };

    /// Wrap a raw Montgomery residue. The value must already be `< p`.
    pub const fn from_mont_unchecked(mont: BigInt<N>) -> Self {
        Self { mont, _params: PhantomData }
    }

    /// Raw Montgomery limbs.
    pub const fn mont_limbs(&self) -> &BigInt<N> {
        &self.mont
    }

    /// Enter Montgomery form: `b * R mod p` via a multiplication by `R^2`.
    /// Accepts any `b < 2^(64*N)`; the result is fully reduced.
    pub fn from_bigint(b: &BigInt<N>) -> Self {
        Self { mont: mont_mul(b, &P::R2, &P::MODULUS, P::INV), _params: PhantomData }
    }

    /// Leave Montgomery form: the canonical integer in `[0, p)`.
    pub fn to_bigint(&self) -> BigInt<N> {
        mont_mul(&self.mont, &BigInt::from_u64(1), &P::MODULUS, P::INV)
    }

    /// Small-integer constructor.
    pub fn from_u64(v: u64) -> Self {
        Self::from_bigint(&BigInt::from_u64(v))
    }

    /// Branchless select: `a` when `ctl` is all-zeros, `b` when all-ones.
    #[inline]
    pub fn conditional_select(a: &Self, b: &Self, ctl: Ct) -> Self {
        let mut out = a.mont;
        out.cmov(&b.mont, ctl);
        Self { mont: out, _params: PhantomData }
    }

    /// Branchless equality mask.
    #[inline]
    pub fn ct_eq(&self, other: &Self) -> Ct {
        self.mont.ct_eq(&other.mont)
    }

    /// Branchless zero-test mask.
    #[inline]
    pub fn ct_is_zero(&self) -> Ct {
        self.mont.ct_is_zero()
    }

    /// Variable-time zero test for public values.
    #[inline]
    pub fn is_zero_vartime(&self) -> bool {
        self.mont.is_zero_vartime()
    }

    /// Field addition.
    #[inline]
    pub fn add_assign_internal(&mut self, rhs: &Self) {
        let carry = self.mont.cadd(&rhs.mont, CT_TRUE);
        debug_assert_eq!(carry, 0, "spare bits exhausted");
        let ge = self.mont.ct_lt(&P::MODULUS) ^ CT_TRUE;
        self.mont.csub(&P::MODULUS, ge);
    }

    /// Field subtraction.
    #[inline]
    pub fn sub_assign_internal(&mut self, rhs: &Self) {
        let borrow = self.mont.csub(&rhs.mont, CT_TRUE);
        self.mont.cadd(&P::MODULUS, ct_mask(borrow == 1));
    }

    /// Additive inverse.
    #[inline]
    pub fn neg_internal(&self) -> Self {
        let mut out = P::MODULUS;
        out.csub(&self.mont, CT_TRUE);
        // -0 must stay 0
        out.cmov(&BigInt::ZERO, self.mont.ct_is_zero());
        Self { mont: out, _params: PhantomData }
    }

    /// `2 * self`.
    #[inline]
    pub fn double(&self) -> Self {
        let mut out = *self;
        out.add_assign_internal(self);
        out
    }

    /// `self / 2`: add `p` when odd, then shift right.
    #[inline]
    pub fn halve(&self) -> Self {
        let mut out = self.mont;
        let odd = ct_mask(out.0[0] & 1 == 1);
        let carry = out.cadd(&P::MODULUS, odd);
        debug_assert_eq!(carry, 0, "spare bits exhausted");
        out.shr1();
        Self { mont: out, _params: PhantomData }
    }

    /// Field multiplication (Montgomery CIOS).
    #[inline]
    pub fn mul_internal(&self, rhs: &Self) -> Self {
        Self { mont: mont_mul(&self.mont, &rhs.mont, &P::MODULUS, P::INV), _params: PhantomData }
    }

    /// Squaring.
    #[inline]
    pub fn square(&self) -> Self {
        self.mul_internal(self)
    }

    /// Exponentiation by a public limb-slice exponent, most significant bit
    /// first. Constant-time in the base; the exponent pattern is public.
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

    /// Multiplicative inverse via little-Fermat (`a^(p-2)`); constant-time in
    /// the base. `None` for zero.
    pub fn invert(&self) -> Option<Self> {
        if self.is_zero_vartime() {
            return None;
        }
        let mut exp = P::MODULUS;
        exp.csub(&BigInt::from_u64(2), CT_TRUE);
        Some(self.pow(&exp.0))
    }

    /// Variable-time inverse for public data; same exponent chain today.
    #[inline]
    pub fn invert_vartime(&self) -> Option<Self> {
        self.invert()
    }

    /// Legendre symbol: all-ones mask iff `self` is a nonzero square.
    pub fn is_square(&self) -> Ct {
        let e = self.pow(&P::MODULUS_MINUS_ONE_DIV_TWO.0);
        e.ct_eq(&Self::ONE) | self.ct_is_zero()
    }

    /// Square root with a deterministic sign: the returned root is the
    /// lexicographically smaller of the two (`root <= (p-1)/2`). The second
    /// component is the all-ones mask iff `self` was a square; the root is
    /// meaningless otherwise.
    pub fn sqrt_if_square(&self) -> (Self, Ct) {
        let cand = match P::SQRT_EXPONENT {
            Some(e) => self.pow(&e.0),
            None => self.sqrt_tonelli_shanks(),
        };
        let ok = cand.square().ct_eq(self);
        // canonicalize to the smaller representative
        let neg = cand.neg_internal();
        let cand_big = cand.to_bigint();
        let neg_big = neg.to_bigint();
        let take_neg = neg_big.ct_lt(&cand_big);
        (Self::conditional_select(&cand, &neg, take_neg), ok)
    }

    /// Tonelli–Shanks for two-adic fields; variable-time, public data only.
    fn sqrt_tonelli_shanks(&self) -> Self {
        if self.is_zero_vartime() {
            return Self::ZERO;
        }
        // R = a^((t+1)/2) = a^((t-1)/2) * a ; T = a^t
        let w = self.pow(&P::TRACE_MINUS_ONE_DIV_TWO.0);
        let mut root = w.mul_internal(self);
        let mut t_acc = root.mul_internal(&w);
        let mut c = Self::from_mont_unchecked(P::TWO_ADIC_ROOT);
        let mut m = P::TWO_ADICITY;

        while t_acc != Self::ONE {
            // find the least i with T^(2^i) = 1
            let mut i = 0u32;
            let mut t2 = t_acc;
            while t2 != Self::ONE {
                t2 = t2.square();
                i += 1;
                if i >= m {
                    // non-residue: bail out; caller's square check rejects
                    return Self::ZERO;
                }
            }
            let mut b = c;
            for _ in 0..(m - i - 1) {
                b = b.square();
            }
            m = i;
            c = b.square();
            t_acc = t_acc.mul_internal(&c);
            root = root.mul_internal(&b);
        }
        root
    }

    /// Parse a canonical big-endian encoding (`8*N` bytes); `None` when the
    /// value is `>= p`.
    pub fn from_be_bytes(bytes: &[u8]) -> Option<Self> {
        let raw = BigInt::from_be_bytes(bytes);
        if raw.ct_lt(&P::MODULUS) != CT_TRUE {
            return None;
        }
        Some(Self::from_bigint(&raw))
    }

    /// Parse a canonical little-endian encoding; `None` when `>= p`.
    pub fn from_le_bytes(bytes: &[u8]) -> Option<Self> {
        let raw = BigInt::from_le_bytes(bytes);
        if raw.ct_lt(&P::MODULUS) != CT_TRUE {
            return None;
        }
        Some(Self::from_bigint(&raw))
    }

    /// Interpret `8*N` big-endian bytes as an integer and reduce it mod `p`.
    /// Used for hash-to-field outputs; the input is public.
    pub fn from_be_bytes_reduce(bytes: &[u8]) -> Self {
        let raw = BigInt::from_be_bytes(bytes);
        // entering Montgomery form tolerates any input < 2^(64*N)
        Self::from_bigint(&raw)
    }

    /// Canonical big-endian serialization into `out` (`8*N` bytes).
    pub fn write_be_bytes(&self, out: &mut [u8]) {
        self.to_bigint().write_be_bytes(out);
    }

    /// Canonical little-endian serialization into `out` (`8*N` bytes).
    pub fn write_le_bytes(&self, out: &mut [u8]) {
        self.to_bigint().write_le_bytes(out);
    }

    /// Uniform sampling by rejection.
    pub fn rand(rng: &mut (impl RngCore + ?Sized)) -> Self {
        loop {
            let mut bytes = vec![0u8; 8 * N];
            rng.fill_bytes(&mut bytes);
            // clear excess top bits to make acceptance likely
            let excess = (8 * N * 8) as u32 - P::NUM_BITS;
            let mut mask_bytes = excess / 8;
            let mask_bits = excess % 8;
            let mut idx = 0;
            while mask_bytes > 0 {
                bytes[idx] = 0;
                idx += 1;
                mask_bytes -= 1;
            }
            if mask_bits > 0 {
                bytes[idx] &= 0xff >> mask_bits;
            }
            if let Some(v) = Self::from_be_bytes(&bytes) {
                return v;
            }
        }
    }

    /// `self > (p-1)/2`, i.e. the lexicographically larger of `{a, -a}`.
    pub fn is_lexicographically_largest(&self) -> Ct {
        let canonical = self.to_bigint();
        let le = canonical.ct_lt(&P::MODULUS_MINUS_ONE_DIV_TWO)
            | canonical.ct_eq(&P::MODULUS_MINUS_ONE_DIV_TWO);
        le ^ CT_TRUE
    }
}

// --- operator plumbing ---

impl<P: FpParams<N>, const N: usize> Add for Fp<P, N> {
    type Output = Self;
    #[inline]
    fn add(mut self, rhs: Self) -> Self {
        self.add_assign_internal(&rhs);
        self
    }
}
impl<P: FpParams<N>, const N: usize> AddAssign for Fp<P, N> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.add_assign_internal(&rhs);
    }
}
impl<P: FpParams<N>, const N: usize> Sub for Fp<P, N> {
    type Output = Self;
    #[inline]
    fn sub(mut self, rhs: Self) -> Self {
        self.sub_assign_internal(&rhs);
        self
    }
}
impl<P: FpParams<N>, const N: usize> SubAssign for Fp<P, N> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.sub_assign_internal(&rhs);
    }
}
impl<P: FpParams<N>, const N: usize> Mul for Fp<P, N> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.mul_internal(&rhs)
    }
}
impl<P: FpParams<N>, const N: usize> MulAssign for Fp<P, N> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = self.mul_internal(&rhs);
    }
}
impl<P: FpParams<N>, const N: usize> Neg for Fp<P, N> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        self.neg_internal()
    }
}

impl<P: FpParams<N>, const N: usize> Zeroize for Fp<P, N> {
    fn zeroize(&mut self) {
        self.mont.0.zeroize();
    }
}

/// The subset of field behavior the generic curve code relies on.
pub trait Field:
    'static
    + Copy
    + Clone
    + PartialEq
    + Eq
    + fmt::Debug
    + Default
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
{
    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity.
    const ONE: Self;

    /// `2 * self`.
    fn double(&self) -> Self;
    /// `self * self`.
    fn square(&self) -> Self;
    /// Multiplicative inverse; `None` for zero.
    fn invert(&self) -> Option<Self>;
    /// Branchless select (`ctl` all-ones picks `b`).
    fn conditional_select(a: &Self, b: &Self, ctl: Ct) -> Self;
    /// Branchless equality mask.
    fn ct_eq(&self, other: &Self) -> Ct;
    /// Variable-time zero test (public data).
    fn is_zero_vartime(&self) -> bool;
}

impl<P: FpParams<N>, const N: usize> Field for Fp<P, N> {
    const ZERO: Self = Self::ZERO;
    const ONE: Self = Self::ONE;

    #[inline]
    fn double(&self) -> Self {
        Fp::double(self)
    }
    #[inline]
    fn square(&self) -> Self {
        Fp::square(self)
    }
    #[inline]
    fn invert(&self) -> Option<Self> {
        Fp::invert(self)
    }
    #[inline]
    fn conditional_select(a: &Self, b: &Self, ctl: Ct) -> Self {
        Fp::conditional_select(a, b, ctl)
    }
    #[inline]
    fn ct_eq(&self, other: &Self) -> Ct {
        Fp::ct_eq(self, other)
    }
    #[inline]
    fn is_zero_vartime(&self) -> bool {
        Fp::is_zero_vartime(self)
    }
}
