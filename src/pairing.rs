//! Optimal ate pairing on BLS12-381
//!
//! The Miller loop walks the 64-bit |x| seed MSB-first, keeping the G2
//! accumulator in homogeneous projective coordinates. Each step emits a line
//! in the sparse `l0 + l2·x_P·w² + l3·y_P·w³` shape; lines are computed
//! projectively (scaled by an 𝔽p² constant, which the final exponentiation
//! annihilates) so no inversion happens inside the loop. The negative seed is
//! handled by one conjugation at the end.
//!
//! The final exponentiation factors through the easy part
//! `(p⁶-1)(p²+1)` and then runs the cyclotomic x-chain, producing
//! `f^(3·(p⁴-p²+1)/r)`, a fixed cube of the canonical ate pairing, which is
//! an equivalent bilinear non-degenerate map onto the r-order subgroup.
//!
//! Multi-pairing shares one accumulator across all pairs and performs a
//! single final exponentiation, which is what every verifier equation here
//! consumes.

#![forbid(unsafe_code)]

use crate::bls12_381::{G1Affine, G2Affine, SEED_ABS};
use crate::tower::{Fp2, Fp12};

/// Target-group element (an r-th root of unity in 𝔽p¹²).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Gt(pub Fp12);

impl Gt {
    /// The neutral element.
    pub const ONE: Self = Self(Fp12::ONE);

    pub fn mul(&self, other: &Self) -> Self {
        Self(self.0.mul(&other.0))
    }

    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }
}

/// G2 accumulator for the Miller loop.
#[derive(Clone, Copy)]
struct G2Homogeneous {
    x: Fp2,
    y: Fp2,
    z: Fp2,
}

/// Line coefficients `(l0, l2, l3)`; `l2`/`l3` still await the P-coordinate
/// scaling.
type Line = (Fp2, Fp2, Fp2);

/// Double `t` and return the (scaled) tangent line at the old point.
fn doubling_step(t: &mut G2Homogeneous) -> Line {
    let w = t.x.square().mul_base_u64(3); // 3X²
    let s = t.y * t.z; // YZ
    let b = t.x * t.y * s; // XYS
    let h = w.square() - b.mul_base_u64(8);

    let x_cubed = t.x.square() * t.x;
    let y_sq_z = t.y.square() * t.z;
    // line scaled by 2YZ²:
    let l0 = x_cubed.mul_base_u64(3) - y_sq_z.double();
    let l2 = -(t.x.square().mul_base_u64(3) * t.z);
    let l3 = (t.y * t.z.square()).double();

    let x3 = (h * s).double();
    let y3 = w * (b.mul_base_u64(4) - h) - (t.y.square() * s.square()).mul_base_u64(8);
    let z3 = (s.square() * s).mul_base_u64(8);
    *t = G2Homogeneous { x: x3, y: y3, z: z3 };

    (l0, l2, l3)
}

/// Add the affine `q` into `t` and return the (scaled) chord line.
fn addition_step(t: &mut G2Homogeneous, q: &G2Affine) -> Line {
    // theta/lambda chord slopes, projectively
    let theta = q.y * t.z - t.y; // u
    let lambda = q.x * t.z - t.x; // v

    let uu = theta.square();
    let vv = lambda.square();
    let vvv = lambda * vv;
    let rr = vv * t.x;
    let a = uu * t.z - vvv - rr.double();

    let x3 = lambda * a;
    let y3 = theta * (rr - a) - vvv * t.y;
    let z3 = vvv * t.z;
    *t = G2Homogeneous { x: x3, y: y3, z: z3 };

    // line scaled by lambda:
    let l0 = theta * q.x - lambda * q.y;
    let l2 = -theta;
    let l3 = lambda;
    (l0, l2, l3)
}

impl Fp2 {
    #[inline]
    fn mul_base_u64(&self, k: u64) -> Fp2 {
        // tiny constants only (3, 4, 8); addition chains beat a full mul
        match k {
            2 => self.double(),
            3 => self.double() + *self,
            4 => self.double().double(),
            8 => self.double().double().double(),
            _ => unreachable!("unsupported small multiple"),
        }
    }
}

/// Fold one line into the accumulator, scaling by the G1 point.
#[inline]
fn apply_line(f: &Fp12, line: &Line, p: &G1Affine) -> Fp12 {
    let (l0, l2, l3) = line;
    f.mul_by_line(l0, &l2.mul_base(&p.x), &l3.mul_base(&p.y))
}

/// Shared Miller loop over any number of (G1, G2) pairs. Pairs with an
/// identity member contribute the neutral factor and are skipped.
pub fn miller_loop(pairs: &[(G1Affine, G2Affine)]) -> Fp12 {
    let active: Vec<&(G1Affine, G2Affine)> = pairs
        .iter()
        .filter(|(p, q)| !p.infinity && !q.infinity)
        .collect();

    let mut f = Fp12::ONE;
    let mut accs: Vec<G2Homogeneous> = active
        .iter()
        .map(|(_, q)| G2Homogeneous { x: q.x, y: q.y, z: Fp2::ONE })
        .collect();

    let top_bit = 63 - SEED_ABS.leading_zeros() as usize;
    for i in (0..top_bit).rev() {
        if i != top_bit - 1 {
            f = f.square();
        }
        for (acc, (p, _)) in accs.iter_mut().zip(active.iter()) {
            let line = doubling_step(acc);
            f = apply_line(&f, &line, p);
        }
        if (SEED_ABS >> i) & 1 == 1 {
            for (acc, (p, q)) in accs.iter_mut().zip(active.iter()) {
                let line = addition_step(acc, q);
                f = apply_line(&f, &line, p);
            }
        }
    }

    // negative seed
    f.conjugate()
}

/// `f^x` for the negative curve seed: cyclotomic square-and-multiply by |x|,
/// then conjugate. Input must lie in the cyclotomic subgroup.
fn cyclotomic_exp_by_seed(f: &Fp12) -> Fp12 {
    let mut acc = Fp12::ONE;
    let mut started = false;
    for i in (0..64).rev() {
        if started {
            acc = acc.cyclotomic_square();
        }
        if (SEED_ABS >> i) & 1 == 1 {
            acc = acc.mul(f);
            started = true;
        }
    }
    acc.conjugate()
}

/// Raise a Miller-loop output to `(p¹²-1)/r` (times the fixed cube).
pub fn final_exponentiation(f: &Fp12) -> Gt {
    // easy part: f^((p^6-1)(p^2+1))
    let t0 = f.conjugate();
    let t1 = match f.invert() {
        Some(inv) => inv,
        // the Miller loop never emits zero; treat defensively as neutral
        None => return Gt::ONE,
    };
    let mut f = t0.mul(&t1);
    f = f.frobenius_map(2).mul(&f);

    // hard part, x-chain
    let t0 = f.cyclotomic_square();
    let mut t1 = cyclotomic_exp_by_seed(&f);
    let t2 = f.conjugate();
    t1 = t1.mul(&t2); // f^(x-1)
    let t2 = cyclotomic_exp_by_seed(&t1); // f^(x²-x)
    t1 = t1.conjugate(); // f^(1-x)
    t1 = t1.mul(&t2); // f^((x-1)²)
    let t2 = cyclotomic_exp_by_seed(&t1); // ·x
    let t1f = t1.frobenius_map(1); // ·p
    t1 = t1f.mul(&t2); // f^((x-1)²(x+p))
    let f3 = f.mul(&t0); // f³
    let t0 = cyclotomic_exp_by_seed(&t1); // ·x
    let t2 = cyclotomic_exp_by_seed(&t0); // ·x²
    let t0 = t1.frobenius_map(2); // ·p²
    t1 = t1.conjugate(); // ·(-1)
    t1 = t1.mul(&t2); // f^((x-1)²(x+p)(x²-1))
    t1 = t1.mul(&t0); // f^((x-1)²(x+p)(x²+p²-1))
    Gt(f3.mul(&t1))
}

/// The pairing `e(P, Q)`.
pub fn pairing(p: &G1Affine, q: &G2Affine) -> Gt {
    final_exponentiation(&miller_loop(&[(*p, *q)]))
}

/// `∏ e(Pᵢ, Qᵢ)`: one shared Miller loop, one final exponentiation.
pub fn multi_pairing(pairs: &[(G1Affine, G2Affine)]) -> Gt {
    final_exponentiation(&miller_loop(pairs))
}

/// Parallel multi-pairing: per-worker Miller loops multiplied together, then
/// a single final exponentiation (products of Miller outputs commute with
/// the exponentiation).
pub fn multi_pairing_parallel(pool: &rayon::ThreadPool, pairs: &[(G1Affine, G2Affine)]) -> Gt {
    use rayon::prelude::*;

    if pairs.is_empty() {
        return Gt::ONE;
    }
    let workers = pool.current_num_threads().max(1);
    let chunk = pairs.len().div_ceil(workers);
    let combined = pool.install(|| {
        pairs
            .par_chunks(chunk)
            .map(miller_loop)
            .reduce(|| Fp12::ONE, |a, b| a.mul(&b))
    });
    final_exponentiation(&combined)
}

/// `∏ e(Pᵢ, Qᵢ) = 1`, the shape every verifier equation reduces to.
pub fn pairing_check(pairs: &[(G1Affine, G2Affine)]) -> bool {
    multi_pairing(pairs).is_one()
}
