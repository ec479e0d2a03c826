//! Evaluation domains & polynomial primitives
//!
//! Two domain shapes back the commitment layers:
//!
//! - [`RootsOfUnityDomain`]: the multiplicative subgroup `{ωⁱ}` of the
//!   BLS12-381 scalar field (power-of-two size up to `2³²`), carrying the
//!   root powers, their inverses and `N⁻¹`. KZG polynomials are length-N
//!   evaluation vectors over it.
//! - [`LinearDomain`]: the points `0..N-1` of the Banderwagon scalar field
//!   with precomputed barycentric weights (the Verkle IPA domain).
//!
//! Evaluation is barycentric throughout:
//! `p(z) = (z^N - 1)/N · Σᵢ ωⁱ·pᵢ/(z - ωⁱ)`, with the difference-quotient
//! operators (`(p(x) - p(z))/(x - z)` in evaluation form) splitting into the
//! off-domain case and the in-domain case whose `m`-th slot is recovered from
//! the others.
//!
//! Domain sizes are compile-time facts of the protocols above; constructors
//! assert their preconditions instead of returning errors.

#![forbid(unsafe_code)]

use crate::field::{Field, FpParams};
use crate::fields::{Fr, FrBw, FrParams};

/// Montgomery-trick batch inversion, in place. Zero entries are left as zero
/// and do not poison their neighbors.
pub fn batch_invert<F: Field>(values: &mut [F]) {
    let mut prefix = Vec::with_capacity(values.len());
    let mut acc = F::ONE;
    for v in values.iter() {
        prefix.push(acc);
        if !v.is_zero_vartime() {
            acc = acc * *v;
        }
    }
    let mut inv = match acc.invert() {
        Some(i) => i,
        None => return, // all zero
    };
    for (v, p) in values.iter_mut().zip(prefix.into_iter()).rev() {
        if v.is_zero_vartime() {
            continue;
        }
        let v_inv = inv * p;
        inv = inv * *v;
        *v = v_inv;
    }
}

/// Power-of-two multiplicative subgroup of the BLS12-381 scalar field.
#[derive(Clone, Debug)]
pub struct RootsOfUnityDomain {
    /// Domain size `N` (power of two).
    pub n: usize,
    /// Generator `ω` of order `N`.
    pub omega: Fr,
    /// `ωⁱ` for `i` in `0..N`.
    pub roots: Vec<Fr>,
    /// `ω⁻ⁱ` for `i` in `0..N`.
    pub inv_roots: Vec<Fr>,
    /// `N⁻¹`.
    pub n_inv: Fr,
}

impl RootsOfUnityDomain {
    /// Build the size-`n` domain from the two-adic root. `n` must be a power
    /// of two within the field's `2³²` two-adic tower.
    pub fn new(n: usize) -> Self {
        assert!(n.is_power_of_two() && n > 0, "domain size must be a power of two");
        let log_n = n.trailing_zeros();
        assert!(log_n <= FrParams::TWO_ADICITY, "domain size exceeds the two-adic tower");

        // descend from the 2^32 root to order n
        let mut omega = Fr::from_mont_unchecked(FrParams::TWO_ADIC_ROOT);
        for _ in 0..(FrParams::TWO_ADICITY - log_n) {
            omega = omega.square();
        }

        let mut roots = Vec::with_capacity(n);
        let mut acc = Fr::ONE;
        for _ in 0..n {
            roots.push(acc);
            acc *= omega;
        }
        debug_assert_eq!(acc, Fr::ONE);

        let mut inv_roots: Vec<Fr> = roots.clone();
        inv_roots[1..].reverse(); // ω^-i = ω^(N-i)

        let n_inv = Fr::from_u64(n as u64).invert().expect("n != 0 mod r");
        Self { n, omega, roots, inv_roots, n_inv }
    }

    /// Batch-inverted denominators `1/(z - ωⁱ)`.
    ///
    /// When `z` is the `m`-th root the `m`-th slot is zeroed and `Some(m)` is
    /// returned; otherwise `None`.
    pub fn inverse_diffs(&self, z: &Fr) -> (Vec<Fr>, Option<usize>) {
        let mut diffs: Vec<Fr> = self.roots.iter().map(|root| *z - *root).collect();
        let hit = diffs.iter().position(|d| d.is_zero_vartime());
        batch_invert(&mut diffs);
        (diffs, hit)
    }

    /// Barycentric evaluation of an evaluation-form polynomial at any `z`
    /// (in-domain `z` short-circuits to the stored evaluation).
    pub fn eval_poly_at(&self, evals: &[Fr], z: &Fr) -> Fr {
        debug_assert_eq!(evals.len(), self.n);
        let (inv_diffs, hit) = self.inverse_diffs(z);
        if let Some(m) = hit {
            return evals[m];
        }
        self.eval_with_inverse_diffs(evals, z, &inv_diffs)
    }

    /// Barycentric evaluation with caller-provided `1/(z - ωⁱ)` (off-domain).
    pub fn eval_with_inverse_diffs(&self, evals: &[Fr], z: &Fr, inv_diffs: &[Fr]) -> Fr {
        let mut sum = Fr::ZERO;
        for ((e, root), inv_d) in evals.iter().zip(self.roots.iter()).zip(inv_diffs.iter()) {
            sum += *root * *e * *inv_d;
        }
        let z_pow_n = z.pow(&[self.n as u64]);
        sum * (z_pow_n - Fr::ONE) * self.n_inv
    }

    /// Evaluations of `q(x) = (p(x) - y)/(x - z)` for `z` outside the domain,
    /// given `y = p(z)` and the batch-inverted denominators.
    pub fn quotient_off_domain(&self, evals: &[Fr], y: &Fr, inv_diffs: &[Fr]) -> Vec<Fr> {
        debug_assert_eq!(evals.len(), self.n);
        evals
            .iter()
            .zip(inv_diffs.iter())
            .map(|(e, inv_d)| (*y - *e) * *inv_d)
            .collect()
    }

    /// Evaluations of `q(x) = (p(x) - p(ωᵐ))/(x - ωᵐ)` for an in-domain
    /// point. The removable singularity at slot `m` is rebuilt from the other
    /// slots via `q_m = -Σ_{i≠m} ω^(i-m)·q_i`.
    pub fn quotient_in_domain(&self, evals: &[Fr], m: usize) -> Vec<Fr> {
        debug_assert_eq!(evals.len(), self.n);
        debug_assert!(m < self.n);
        let y = evals[m];
        let z = self.roots[m];

        let mut diffs: Vec<Fr> = self
            .roots
            .iter()
            .enumerate()
            .map(|(i, root)| if i == m { Fr::ONE } else { z - *root })
            .collect();
        batch_invert(&mut diffs);

        let mut quotient: Vec<Fr> = evals
            .iter()
            .zip(diffs.iter())
            .map(|(e, inv_d)| (y - *e) * *inv_d)
            .collect();
        quotient[m] = Fr::ZERO;

        let mut qm = Fr::ZERO;
        for (i, q) in quotient.iter().enumerate() {
            if i == m {
                continue;
            }
            // ω^(i-m) = roots[(n + i - m) % n]
            qm -= self.roots[(self.n + i - m) % self.n] * *q;
        }
        quotient[m] = qm;
        quotient
    }
}

/// The integer points `0..N-1` with barycentric weights, over the Banderwagon
/// scalar field.
#[derive(Clone, Debug)]
pub struct LinearDomain {
    /// Domain size.
    pub n: usize,
    /// `i` as a field element, `i` in `0..N`.
    pub points: Vec<FrBw>,
    /// Inverted barycentric weights `1/wᵢ` with `wᵢ = Π_{j≠i}(i - j)`.
    pub weights_inv: Vec<FrBw>,
}

impl LinearDomain {
    pub fn new(n: usize) -> Self {
        assert!(n > 0 && n.is_power_of_two(), "domain size must be a power of two");
        let points: Vec<FrBw> = (0..n as u64).map(FrBw::from_u64).collect();

        // w_i = prod_{j != i} (i - j); inverted with one batch inversion
        let mut weights: Vec<FrBw> = (0..n)
            .map(|i| {
                let mut acc = FrBw::ONE;
                for j in 0..n {
                    if j != i {
                        acc *= points[i] - points[j];
                    }
                }
                acc
            })
            .collect();
        batch_invert(&mut weights);
        Self { n, points, weights_inv: weights }
    }

    /// Barycentric coefficients `bᵢ` with `p(z) = Σ bᵢ·pᵢ` for evaluation
    /// vectors over this domain. In-domain `z` yields the indicator vector.
    pub fn barycentric_coefficients(&self, z: &FrBw) -> Vec<FrBw> {
        // in-domain: exact indicator
        if let Some(m) = self.index_of(z) {
            let mut out = vec![FrBw::ZERO; self.n];
            out[m] = FrBw::ONE;
            return out;
        }

        // A(z) = prod (z - j)
        let mut a_z = FrBw::ONE;
        for p in &self.points {
            a_z *= *z - *p;
        }

        let mut denoms: Vec<FrBw> = self.points.iter().map(|p| *z - *p).collect();
        batch_invert(&mut denoms);

        self.weights_inv
            .iter()
            .zip(denoms.iter())
            .map(|(w_inv, d_inv)| a_z * *w_inv * *d_inv)
            .collect()
    }

    /// Index of `z` when it is one of the domain points.
    pub fn index_of(&self, z: &FrBw) -> Option<usize> {
        self.points.iter().position(|p| p == z)
    }

    /// `Σ bᵢ·fᵢ`: evaluate an evaluation-form polynomial at `z`.
    pub fn eval_poly_at(&self, evals: &[FrBw], z: &FrBw) -> FrBw {
        debug_assert_eq!(evals.len(), self.n);
        let coeffs = self.barycentric_coefficients(z);
        inner_product(evals, &coeffs)
    }

    /// Evaluations of `(f(x) - f(m))/(x - m)` at the domain points, for a
    /// domain index `m` (the Verkle quotient).
    pub fn quotient_in_domain(&self, evals: &[FrBw], m: usize) -> Vec<FrBw> {
        debug_assert_eq!(evals.len(), self.n);
        debug_assert!(m < self.n);
        let y = evals[m];
        let zm = self.points[m];

        let mut diffs: Vec<FrBw> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| if i == m { FrBw::ONE } else { zm - *p })
            .collect();
        batch_invert(&mut diffs);

        let mut quotient: Vec<FrBw> = evals
            .iter()
            .zip(diffs.iter())
            .map(|(e, inv_d)| (y - *e) * *inv_d)
            .collect();
        quotient[m] = FrBw::ZERO;

        // q_m = -sum_{i != m} (A'(m)/A'(i)) * q_i, with A'(i) = w_i
        let mut qm = FrBw::ZERO;
        let w_m = self.weights_inv[m].invert().expect("weights nonzero");
        for (i, q) in quotient.iter().enumerate() {
            if i == m {
                continue;
            }
            let ratio = w_m * self.weights_inv[i];
            qm -= ratio * *q;
        }
        quotient[m] = qm;
        quotient
    }
}

/// Plain inner product `Σ aᵢ·bᵢ`.
pub fn inner_product<F: Field>(a: &[F], b: &[F]) -> F {
    debug_assert_eq!(a.len(), b.len());
    let mut acc = F::ZERO;
    for (x, y) in a.iter().zip(b.iter()) {
        acc = acc + *x * *y;
    }
    acc
}
