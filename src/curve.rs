//! Short-Weierstrass group machinery
//!
//! Curves are `y² = x³ + b` (a = 0) described by a [`SwCurveParams`]
//! implementation carrying the base field and constants; G1 and G2 reuse every
//! routine here through monomorphization.
//!
//! Three coordinate forms, per their roles:
//!
//! - [`Affine`]: storage and wire form; the identity carries an explicit flag.
//! - [`Projective`]: homogeneous coordinates with the *complete*
//!   Renes–Costello–Batina formulas; no exceptional cases, so the
//!   constant-time scalar multiplication can add table entries blindly.
//! - [`Jacobian`]: fast dedicated doubling/addition/mixed-addition with
//!   exceptional-input handling, for variable-time bulk work (MSM, batch
//!   conversions).
//!
//! Scalars arrive as canonical 4-limb integers (`< 2^256`); both pairing
//! groups and their consumers share a 255-bit scalar field.

#![forbid(unsafe_code)]

use crate::bigint::{ct_mask, BigInt, Ct};
use crate::field::Field;

/// Compile-time description of a `y² = x³ + b` curve.
pub trait SwCurveParams: 'static + Copy + Send + Sync {
    /// Coordinate field.
    type Base: Field;
    /// The constant `b`.
    const B: Self::Base;
    /// `3 * b`, used by the complete formulas.
    const B3: Self::Base;
    /// Generator x-coordinate.
    const GENERATOR_X: Self::Base;
    /// Generator y-coordinate.
    const GENERATOR_Y: Self::Base;
    /// Bits in the scalar group order.
    const SCALAR_BITS: usize;
}

/// Affine point; `infinity` set means the identity (x, y contents ignored).
#[derive(Clone, Copy, Debug)]
pub struct Affine<C: SwCurveParams> {
    pub x: C::Base,
    pub y: C::Base,
    pub infinity: bool,
}

/// Homogeneous projective point; `Z = 0` encodes the identity.
#[derive(Clone, Copy, Debug)]
pub struct Projective<C: SwCurveParams> {
    pub x: C::Base,
    pub y: C::Base,
    pub z: C::Base,
}

/// Jacobian point (`x/z²`, `y/z³`); `Z = 0` encodes the identity.
#[derive(Clone, Copy, Debug)]
pub struct Jacobian<C: SwCurveParams> {
    pub x: C::Base,
    pub y: C::Base,
    pub z: C::Base,
}

impl<C: SwCurveParams> PartialEq for Affine<C> {
    fn eq(&self, other: &Self) -> bool {
        if self.infinity || other.infinity {
            return self.infinity == other.infinity;
        }
        self.x == other.x && self.y == other.y
    }
}
impl<C: SwCurveParams> Eq for Affine<C> {}

impl<C: SwCurveParams> Affine<C> {
    /// The identity element.
    pub const IDENTITY: Self = Self { x: C::Base::ZERO, y: C::Base::ONE, infinity: true };

    /// The fixed group generator.
    pub fn generator() -> Self {
        Self { x: C::GENERATOR_X, y: C::GENERATOR_Y, infinity: false }
    }

    /// Curve-equation check `y² = x³ + b` (identity passes).
    pub fn is_on_curve(&self) -> bool {
        if self.infinity {
            return true;
        }
        let lhs = self.y.square();
        let rhs = self.x.square() * self.x + C::B;
        lhs == rhs
    }

    pub fn neg(&self) -> Self {
        Self { x: self.x, y: -self.y, infinity: self.infinity }
    }
}

impl<C: SwCurveParams> PartialEq for Jacobian<C> {
    fn eq(&self, other: &Self) -> bool {
        // cross-multiplied comparison (x/z^2, y/z^3), identity-aware
        let self_id = self.z.is_zero_vartime();
        let other_id = other.z.is_zero_vartime();
        if self_id || other_id {
            return self_id == other_id;
        }
        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        self.x * z2z2 == other.x * z1z1
            && self.y * z2z2 * other.z == other.y * z1z1 * self.z
    }
}
impl<C: SwCurveParams> Eq for Jacobian<C> {}

impl<C: SwCurveParams> PartialEq for Projective<C> {
    fn eq(&self, other: &Self) -> bool {
        // cross-multiplied comparison, identity-aware
        let self_id = self.z.is_zero_vartime();
        let other_id = other.z.is_zero_vartime();
        if self_id || other_id {
            return self_id == other_id;
        }
        self.x * other.z == other.x * self.z && self.y * other.z == other.y * self.z
    }
}
impl<C: SwCurveParams> Eq for Projective<C> {}

impl<C: SwCurveParams> From<&Affine<C>> for Projective<C> {
    fn from(a: &Affine<C>) -> Self {
        // identity (z = 0) selected branchlessly
        let inf = ct_mask(a.infinity);
        Self {
            x: C::Base::conditional_select(&a.x, &C::Base::ZERO, inf),
            y: C::Base::conditional_select(&a.y, &C::Base::ONE, inf),
            z: C::Base::conditional_select(&C::Base::ONE, &C::Base::ZERO, inf),
        }
    }
}

impl<C: SwCurveParams> Projective<C> {
    pub const IDENTITY: Self = Self { x: C::Base::ZERO, y: C::Base::ONE, z: C::Base::ZERO };

    pub fn generator() -> Self {
        Self::from(&Affine::<C>::generator())
    }

    /// Complete addition (Renes–Costello–Batina, algorithm 7 for a = 0).
    /// Valid for every input pair, identities and doublings included.
    pub fn add(&self, rhs: &Self) -> Self {
        let (x1, y1, z1) = (self.x, self.y, self.z);
        let (x2, y2, z2) = (rhs.x, rhs.y, rhs.z);

        let mut t0 = x1 * x2;
        let mut t1 = y1 * y2;
        let t2 = z1 * z2;
        let mut t3 = (x1 + y1) * (x2 + y2);
        let mut t4 = t0 + t1;
        t3 = t3 - t4;
        t4 = (y1 + z1) * (y2 + z2);
        let mut x3 = t1 + t2;
        t4 = t4 - x3;
        x3 = (x1 + z1) * (x2 + z2);
        let mut y3 = t0 + t2;
        y3 = x3 - y3;
        x3 = t0 + t0;
        t0 = x3 + t0;
        let mut t2 = C::B3 * t2;
        let mut z3 = t1 + t2;
        t1 = t1 - t2;
        y3 = C::B3 * y3;
        x3 = t4 * y3;
        t2 = t3 * t1;
        x3 = t2 - x3;
        y3 = y3 * t0;
        t1 = t1 * z3;
        y3 = t1 + y3;
        t0 = t0 * t3;
        z3 = z3 * t4;
        z3 = z3 + t0;

        Self { x: x3, y: y3, z: z3 }
    }

    /// Complete doubling (Renes–Costello–Batina, algorithm 9 for a = 0).
    pub fn double(&self) -> Self {
        let (x, y, z) = (self.x, self.y, self.z);

        let t0 = y.square();
        let mut z3 = t0 + t0;
        z3 = z3 + z3;
        z3 = z3 + z3;
        let t1 = y * z;
        let mut t2 = z.square();
        t2 = C::B3 * t2;
        let mut x3 = t2 * z3;
        let mut y3 = t0 + t2;
        z3 = t1 * z3;
        let t1 = t2 + t2;
        let t2 = t1 + t2;
        let t0 = t0 - t2;
        y3 = t0 * y3;
        y3 = x3 + y3;
        let t1 = x * y;
        x3 = t0 * t1;
        x3 = x3 + x3;

        Self { x: x3, y: y3, z: z3 }
    }

    pub fn neg(&self) -> Self {
        Self { x: self.x, y: -self.y, z: self.z }
    }

    /// Branchless select.
    pub fn conditional_select(a: &Self, b: &Self, ctl: Ct) -> Self {
        Self {
            x: C::Base::conditional_select(&a.x, &b.x, ctl),
            y: C::Base::conditional_select(&a.y, &b.y, ctl),
            z: C::Base::conditional_select(&a.z, &b.z, ctl),
        }
    }

    /// Normalize to affine (one inversion; variable time).
    pub fn to_affine(&self) -> Affine<C> {
        match self.z.invert() {
            None => Affine::IDENTITY,
            Some(zinv) => Affine { x: self.x * zinv, y: self.y * zinv, infinity: false },
        }
    }

    /// Constant-time fixed-window scalar multiplication.
    ///
    /// The scalar is consumed as 4-bit windows from the top; the loop shape,
    /// table scan and accumulator updates are identical for every scalar of
    /// the declared bit length. Completeness of the addition law means the
    /// identity entries in the table need no special casing.
    pub fn mul_ct(&self, scalar: &BigInt<4>) -> Self {
        const W: usize = 4;
        // table[d] = [d]P for d in 0..16
        let mut table = [Self::IDENTITY; 1 << W];
        table[1] = *self;
        for i in 2..(1 << W) {
            table[i] = if i % 2 == 0 {
                table[i / 2].double()
            } else {
                table[i - 1].add(self)
            };
        }

        let windows = C::SCALAR_BITS.div_ceil(W);
        let mut acc = Self::IDENTITY;
        for w in (0..windows).rev() {
            for _ in 0..W {
                acc = acc.double();
            }
            let digit = scalar.window_vartime(w * W, W);
            // constant-time table scan
            let mut entry = Self::IDENTITY;
            for (d, candidate) in table.iter().enumerate() {
                entry = Self::conditional_select(&entry, candidate, ct_mask(d == digit));
            }
            acc = acc.add(&entry);
        }
        acc
    }
}

impl<C: SwCurveParams> From<&Affine<C>> for Jacobian<C> {
    fn from(a: &Affine<C>) -> Self {
        if a.infinity {
            Self::IDENTITY
        } else {
            Self { x: a.x, y: a.y, z: C::Base::ONE }
        }
    }
}

impl<C: SwCurveParams> Jacobian<C> {
    pub const IDENTITY: Self = Self { x: C::Base::ONE, y: C::Base::ONE, z: C::Base::ZERO };

    pub fn is_identity(&self) -> bool {
        self.z.is_zero_vartime()
    }

    /// Doubling (dbl-2009-l). Variable-time.
    pub fn double(&self) -> Self {
        if self.is_identity() {
            return *self;
        }
        let a = self.x.square();
        let b = self.y.square();
        let c = b.square();
        let mut d = (self.x + b).square() - a - c;
        d = d.double();
        let e = a + a.double();
        let f = e.square();
        let x3 = f - d.double();
        let mut c8 = c.double();
        c8 = c8.double();
        c8 = c8.double();
        let y3 = e * (d - x3) - c8;
        let z3 = (self.y * self.z).double();
        Self { x: x3, y: y3, z: z3 }
    }

    /// General addition (add-2007-bl). Variable-time, exceptional inputs
    /// routed to doubling / identity.
    pub fn add(&self, rhs: &Self) -> Self {
        if self.is_identity() {
            return *rhs;
        }
        if rhs.is_identity() {
            return *self;
        }
        let z1z1 = self.z.square();
        let z2z2 = rhs.z.square();
        let u1 = self.x * z2z2;
        let u2 = rhs.x * z1z1;
        let s1 = self.y * rhs.z * z2z2;
        let s2 = rhs.y * self.z * z1z1;
        if u1 == u2 {
            if s1 != s2 {
                return Self::IDENTITY;
            }
            return self.double();
        }
        let h = u2 - u1;
        let i = h.double().square();
        let j = h * i;
        let r = (s2 - s1).double();
        let v = u1 * i;
        let x3 = r.square() - j - v.double();
        let y3 = r * (v - x3) - (s1 * j).double();
        let z3 = ((self.z + rhs.z).square() - z1z1 - z2z2) * h;
        Self { x: x3, y: y3, z: z3 }
    }

    /// Mixed addition with an affine point (madd-2007-bl shape).
    pub fn add_affine(&self, rhs: &Affine<C>) -> Self {
        if rhs.infinity {
            return *self;
        }
        if self.is_identity() {
            return Self::from(rhs);
        }
        let z1z1 = self.z.square();
        let u2 = rhs.x * z1z1;
        let s2 = rhs.y * self.z * z1z1;
        if u2 == self.x {
            if s2 != self.y {
                return Self::IDENTITY;
            }
            return self.double();
        }
        let h = u2 - self.x;
        let hh = h.square();
        let i = hh.double().double();
        let j = h * i;
        let r = (s2 - self.y).double();
        let v = self.x * i;
        let x3 = r.square() - j - v.double();
        let y3 = r * (v - x3) - (self.y * j).double();
        let z3 = (self.z + h).square() - z1z1 - hh;
        Self { x: x3, y: y3, z: z3 }
    }

    pub fn neg(&self) -> Self {
        Self { x: self.x, y: -self.y, z: self.z }
    }

    /// Variable-time double-and-add for public scalars.
    pub fn mul_vartime(&self, scalar: &BigInt<4>) -> Self {
        let bits = scalar.num_bits_vartime();
        let mut acc = Self::IDENTITY;
        for i in (0..bits).rev() {
            acc = acc.double();
            if scalar.bit(i) {
                acc = acc.add(self);
            }
        }
        acc
    }

    /// Normalize one point (one inversion; variable time).
    pub fn to_affine(&self) -> Affine<C> {
        match self.z.invert() {
            None => Affine::IDENTITY,
            Some(zinv) => {
                let zinv2 = zinv.square();
                Affine {
                    x: self.x * zinv2,
                    y: self.y * zinv2 * zinv,
                    infinity: false,
                }
            }
        }
    }
}

/// Batch Jacobian-to-affine conversion: one field inversion amortized over
/// the whole slice via Montgomery's running-product trick.
pub fn batch_to_affine<C: SwCurveParams>(points: &[Jacobian<C>]) -> Vec<Affine<C>> {
    let mut prefix = Vec::with_capacity(points.len());
    let mut acc = C::Base::ONE;
    for pt in points {
        prefix.push(acc);
        if !pt.is_identity() {
            acc *= pt.z;
        }
    }
    let mut inv = match acc.invert() {
        Some(v) => v,
        // every z was zero
        None => return vec![Affine::IDENTITY; points.len()],
    };

    let mut out = vec![Affine::<C>::IDENTITY; points.len()];
    for (i, pt) in points.iter().enumerate().rev() {
        if pt.is_identity() {
            continue;
        }
        let zinv = inv * prefix[i];
        inv *= pt.z;
        let zinv2 = zinv.square();
        out[i] = Affine {
            x: pt.x * zinv2,
            y: pt.y * zinv2 * zinv,
            infinity: false,
        };
    }
    out
}

/// Parallel batch conversion: the running-product chain is sequential per
/// chunk, so each worker inverts its own slice.
pub fn batch_to_affine_parallel<C: SwCurveParams>(
    pool: &rayon::ThreadPool,
    points: &[Jacobian<C>],
) -> Vec<Affine<C>> {
    use rayon::prelude::*;

    if points.is_empty() {
        return Vec::new();
    }
    let workers = pool.current_num_threads().max(1);
    let chunk = points.len().div_ceil(workers);
    pool.install(|| {
        points
            .par_chunks(chunk)
            .flat_map_iter(|slice| batch_to_affine(slice).into_iter())
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bls12_381::{G1Params, G2Params};

    type G1P = Projective<G1Params>;
    type G1J = Jacobian<G1Params>;

    fn scalar(v: u64) -> BigInt<4> {
        BigInt::from_u64(v)
    }

    #[test]
    fn generator_on_curve() {
        assert!(Affine::<G1Params>::generator().is_on_curve());
        assert!(Affine::<G2Params>::generator().is_on_curve());
    }

    #[test]
    fn projective_group_laws() {
        let g = G1P::generator();
        let g2 = g.double();
        let g3 = g2.add(&g);
        assert!(g2.to_affine().is_on_curve());
        assert!(g3.to_affine().is_on_curve());
        // complete addition handles doubling inputs
        assert_eq!(g.add(&g), g2);
        // identity behavior
        assert_eq!(g.add(&G1P::IDENTITY), g);
        assert_eq!(G1P::IDENTITY.add(&g), g);
        assert_eq!(g.add(&g.neg()), G1P::IDENTITY);
    }

    #[test]
    fn jacobian_matches_projective() {
        let gp = G1P::generator();
        let gj = G1J::from(&Affine::generator());
        for k in [2u64, 3, 5, 31, 77, 12345] {
            let a = gp.mul_ct(&scalar(k)).to_affine();
            let b = gj.mul_vartime(&scalar(k)).to_affine();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn mixed_addition_consistent() {
        let g = Affine::<G1Params>::generator();
        let gj = G1J::from(&g);
        let lhs = gj.double().add_affine(&g).to_affine();
        let rhs = gj.mul_vartime(&scalar(3)).to_affine();
        assert_eq!(lhs, rhs);
        // exceptional inputs
        assert_eq!(gj.add_affine(&g), gj.double());
        assert_eq!(gj.add_affine(&g.neg()), G1J::IDENTITY);
        assert_eq!(G1J::IDENTITY.add_affine(&g).to_affine(), g);
    }

    #[test]
    fn scalar_mul_distributes() {
        let g = G1P::generator();
        let a = 1234567u64;
        let b = 7654321u64;
        let lhs = g.mul_ct(&scalar(a + b));
        let rhs = g.mul_ct(&scalar(a)).add(&g.mul_ct(&scalar(b)));
        assert_eq!(lhs, rhs);
        // [a*b]G = [a]([b]G)
        let ab = g.mul_ct(&scalar(a * b));
        let nested = g.mul_ct(&scalar(b)).mul_ct(&scalar(a));
        assert_eq!(ab, nested);
    }

    #[test]
    fn order_annihilates_generator() {
        use crate::field::FpParams;
        let g = G1P::generator();
        let r = crate::fields::FrParams::MODULUS;
        assert_eq!(g.mul_ct(&r), G1P::IDENTITY);
    }

    #[test]
    fn batch_affine_matches_single() {
        let g = G1J::from(&Affine::generator());
        let pts: Vec<_> = (1u64..10)
            .map(|k| g.mul_vartime(&scalar(k)))
            .chain([G1J::IDENTITY])
            .collect();
        let batch = batch_to_affine(&pts);
        for (j, a) in pts.iter().zip(batch.iter()) {
            assert_eq!(j.to_affine(), *a);
        }
        let pool = rayon::ThreadPoolBuilder::new().num_threads(3).build().unwrap();
        assert_eq!(batch_to_affine_parallel(&pool, &pts), batch);
    }
}
