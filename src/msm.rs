//! Multi-scalar multiplication
//!
//! Pippenger's bucket method over a window of `c ≈ log₂ N` bits. Scalars are
//! public here (commitments, verifier aggregation): accumulation is
//! variable-time by design, and secret-scalar callers must use the
//! constant-time single-point path instead.
//!
//! The same core serves the short-Weierstrass groups (Jacobian accumulators,
//! mixed additions) and Banderwagon (unified twisted-Edwards additions)
//! through the [`BucketGroup`] abstraction. The parallel variant takes an
//! explicit `rayon` pool handle, splits the input into per-worker slices and
//! merges the resulting partial sums, so reduction order never affects the
//! result.

#![forbid(unsafe_code)]

use rayon::prelude::*;

use crate::bigint::BigInt;
use crate::curve::{Affine, Jacobian, SwCurveParams};

/// Accumulator group as seen by the bucket machinery.
pub trait BucketGroup: Copy + Send + Sync {
    /// Input point form (affine or already-normalized).
    type Input: Copy + Send + Sync;

    /// The identity accumulator.
    fn bucket_zero() -> Self;
    /// Accumulate an input point.
    fn bucket_add_input(&mut self, p: &Self::Input);
    /// Accumulate another accumulator.
    fn bucket_add(&mut self, other: &Self);
    /// Whether an input is the identity (skipped during accumulation).
    fn input_is_identity(p: &Self::Input) -> bool;
}

impl<C: SwCurveParams> BucketGroup for Jacobian<C> {
    type Input = Affine<C>;

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
        p.infinity
    }
}

/// Window size heuristic by input count.
fn window_bits(n: usize) -> usize {
    match n {
        0..=31 => 3,
        32..=127 => 5,
        128..=511 => 7,
        512..=2047 => 10,
        2048..=8191 => 12,
        _ => 14,
    }
}

/// Core bucket accumulation over canonical 256-bit scalars.
///
/// Zero scalars and identity inputs fall out naturally (their windows are all
/// zero / their additions are skipped).
pub fn msm_bigint<G: BucketGroup>(points: &[G::Input], scalars: &[BigInt<4>]) -> G {
    debug_assert_eq!(points.len(), scalars.len());
    let n = points.len().min(scalars.len());
    if n == 0 {
        return G::bucket_zero();
    }

    let c = window_bits(n);
    let windows = 256usize.div_ceil(c);
    let mut acc = G::bucket_zero();

    for w in (0..windows).rev() {
        for _ in 0..c {
            let mut doubled = acc;
            doubled.bucket_add(&acc);
            acc = doubled;
        }

        let mut buckets = vec![G::bucket_zero(); (1 << c) - 1];
        for (point, scalar) in points[..n].iter().zip(scalars[..n].iter()) {
            if G::input_is_identity(point) {
                continue;
            }
            let digit = scalar.window_vartime(w * c, c);
            if digit == 0 {
                continue;
            }
            buckets[digit - 1].bucket_add_input(point);
        }

        // sweep from the top bucket down: acc += sum_j j * bucket_j
        let mut running = G::bucket_zero();
        for bucket in buckets.iter().rev() {
            running.bucket_add(bucket);
            acc.bucket_add(&running);
        }
    }
    acc
}

/// Parallel MSM over an explicit worker pool: per-worker slices, associative
/// merge of partial sums.
pub fn msm_bigint_parallel<G: BucketGroup>(
    pool: &rayon::ThreadPool,
    points: &[G::Input],
    scalars: &[BigInt<4>],
) -> G {
    let n = points.len().min(scalars.len());
    if n == 0 {
        return G::bucket_zero();
    }
    let workers = pool.current_num_threads().max(1);
    let chunk = n.div_ceil(workers);

    pool.install(|| {
        points[..n]
            .par_chunks(chunk)
            .zip(scalars[..n].par_chunks(chunk))
            .map(|(ps, ss)| msm_bigint::<G>(ps, ss))
            .reduce(G::bucket_zero, |mut a, b| {
                a.bucket_add(&b);
                a
            })
    })
}
