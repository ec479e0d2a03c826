//! KZG polynomial commitments over BLS12-381
//!
//! Polynomials live in evaluation form over a roots-of-unity domain, so the
//! SRS is the Lagrange-basis G1 array `[Lᵢ(τ)]₁` plus the two monomial G2
//! points `[1]₂, [τ]₂`. Committing is one MSM; proving is a barycentric
//! evaluation plus a difference-quotient MSM; verifying is a two-pair product
//! check
//!
//! ```text
//! e(π, [τ - z]₂) · e(C - [y]₁, [-1]₂) = 1
//! ```
//!
//! Batch verification folds `n` openings into the same two pairings with
//! powers of an out-of-prover-control scalar `r`.
//!
//! [`KzgSettings::dev`] generates a setup from an in-memory tau for tests and
//! local tooling; production parameters arrive as already-validated points
//! from a ceremony transcript.

#![forbid(unsafe_code)]

use crate::bigint::BigInt;
use crate::bls12_381::{G1Affine, G1Jacobian, G2Affine, G2Projective};
use crate::curve::batch_to_affine;
use crate::domain::RootsOfUnityDomain;
use crate::fields::Fr;
use crate::msm::{msm_bigint, msm_bigint_parallel};
use crate::pairing::pairing_check;
use crate::status::CryptoError;

const LOG_TARGET: &str = "tinykzg::kzg";

/// Trusted-setup context: Lagrange G1 SRS over a domain, monomial G2 pair.
#[derive(Clone, Debug)]
pub struct KzgSettings {
    /// Evaluation domain (size = SRS length).
    pub domain: RootsOfUnityDomain,
    /// `[Lᵢ(τ)]₁` for the domain's Lagrange basis.
    pub g1_lagrange: Vec<G1Affine>,
    /// `[[1]₂, [τ]₂]`.
    pub g2_monomial: [G2Affine; 2],
}

/// An opening claim `(commitment, z, y, proof)` for batch verification.
#[derive(Clone, Copy, Debug)]
pub struct OpeningClaim {
    pub commitment: G1Affine,
    pub z: Fr,
    pub y: Fr,
    pub proof: G1Affine,
}

impl KzgSettings {
    /// Wrap already-validated setup points. The caller is responsible for
    /// having decoded them through the checked deserializers.
    pub fn new(g1_lagrange: Vec<G1Affine>, tau_g2: G2Affine) -> Self {
        let domain = RootsOfUnityDomain::new(g1_lagrange.len());
        tracing::debug!(target: LOG_TARGET, n = g1_lagrange.len(), "kzg settings loaded");
        Self {
            domain,
            g1_lagrange,
            g2_monomial: [G2Affine::generator(), tau_g2],
        }
    }

    /// Deterministic development setup from an in-memory tau seed. The tau
    /// scalar never leaves this function.
    pub fn dev(tau_seed: &[u8; 32], n: usize) -> Self {
        let domain = RootsOfUnityDomain::new(n);
        let tau = Fr::from_be_bytes_reduce(tau_seed);

        // L_i(tau) = (tau^n - 1)/n * omega^i / (tau - omega^i)
        let mut denoms: Vec<Fr> = domain.roots.iter().map(|root| tau - *root).collect();
        crate::domain::batch_invert(&mut denoms);
        let vanishing = tau.pow(&[n as u64]) - Fr::ONE;
        let scale = vanishing * domain.n_inv;
        let lagrange_at_tau: Vec<Fr> = domain
            .roots
            .iter()
            .zip(denoms.iter())
            .map(|(root, d)| scale * *root * *d)
            .collect();

        // fixed-base table over the generator: 2^k G for k in 0..256
        let mut doublings = Vec::with_capacity(256);
        let mut acc = G1Jacobian::from(&G1Affine::generator());
        for _ in 0..256 {
            doublings.push(acc);
            acc = acc.double();
        }
        let table = batch_to_affine(&doublings);

        let fixed_base_mul = |k: &Fr| -> G1Jacobian {
            let bits = k.to_bigint();
            let mut out = G1Jacobian::IDENTITY;
            for (i, base) in table.iter().enumerate() {
                if bits.bit(i) {
                    out = out.add_affine(base);
                }
            }
            out
        };

        let jacs: Vec<G1Jacobian> = lagrange_at_tau.iter().map(fixed_base_mul).collect();
        let g1_lagrange = batch_to_affine(&jacs);

        let tau_g2 = G2Projective::generator().mul_scalar(&tau).to_affine();
        tracing::debug!(target: LOG_TARGET, n, "dev setup generated");
        Self {
            domain,
            g1_lagrange,
            g2_monomial: [G2Affine::generator(), tau_g2],
        }
    }

    fn check_poly_len(&self, evals: &[Fr]) -> Result<(), CryptoError> {
        if evals.len() != self.domain.n {
            return Err(CryptoError::InputsLengthsMismatch);
        }
        Ok(())
    }

    /// Commit to an evaluation-form polynomial: `Σ pᵢ·[Lᵢ(τ)]₁`.
    pub fn commit(&self, evals: &[Fr]) -> Result<G1Affine, CryptoError> {
        self.check_poly_len(evals)?;
        let scalars: Vec<BigInt<4>> = evals.iter().map(|e| e.to_bigint()).collect();
        let acc: G1Jacobian = msm_bigint(&self.g1_lagrange, &scalars);
        Ok(acc.to_affine())
    }

    /// Parallel commit over an explicit worker pool.
    pub fn commit_parallel(
        &self,
        pool: &rayon::ThreadPool,
        evals: &[Fr],
    ) -> Result<G1Affine, CryptoError> {
        self.check_poly_len(evals)?;
        let scalars: Vec<BigInt<4>> = evals.iter().map(|e| e.to_bigint()).collect();
        let acc: G1Jacobian = msm_bigint_parallel(pool, &self.g1_lagrange, &scalars);
        Ok(acc.to_affine())
    }

    /// Open at `z`: returns `(y, π)` with `y = p(z)` and
    /// `π = [q(τ)]₁`, `q(x) = (p(x) - y)/(x - z)`.
    pub fn prove(&self, evals: &[Fr], z: &Fr) -> Result<(Fr, G1Affine), CryptoError> {
        self.check_poly_len(evals)?;
        let (inv_diffs, hit) = self.domain.inverse_diffs(z);
        let (y, quotient) = match hit {
            Some(m) => (evals[m], self.domain.quotient_in_domain(evals, m)),
            None => {
                let y = self.domain.eval_with_inverse_diffs(evals, z, &inv_diffs);
                let q = self.domain.quotient_off_domain(evals, &y, &inv_diffs);
                (y, q)
            }
        };
        let scalars: Vec<BigInt<4>> = quotient.iter().map(|e| e.to_bigint()).collect();
        let proof: G1Jacobian = msm_bigint(&self.g1_lagrange, &scalars);
        tracing::debug!(target: LOG_TARGET, "kzg opening produced");
        Ok((y, proof.to_affine()))
    }

    /// Verify a single opening claim.
    pub fn verify(
        &self,
        commitment: &G1Affine,
        z: &Fr,
        y: &Fr,
        proof: &G1Affine,
    ) -> Result<(), CryptoError> {
        // [τ - z]₂
        let tau_minus_z = crate::curve::Projective::from(&self.g2_monomial[1])
            .add(&G2Projective::generator().mul_scalar(z).neg())
            .to_affine();
        // C - [y]₁
        let c_minus_y = G1Jacobian::from(commitment)
            .add(&G1Affine::generator().mul_glv_vartime(y).neg())
            .to_affine();

        let ok = pairing_check(&[
            (*proof, tau_minus_z),
            (c_minus_y, G2Affine::generator().neg()),
        ]);
        if ok {
            Ok(())
        } else {
            Err(CryptoError::VerificationFailure)
        }
    }

    /// Verify `n` opening claims with one two-pair product, combined by
    /// powers of `r`. `r` must come from Fiat–Shamir or a CSPRNG, never from
    /// the prover.
    pub fn verify_batch(&self, claims: &[OpeningClaim], r: &Fr) -> Result<(), CryptoError> {
        if claims.is_empty() {
            return Ok(());
        }
        tracing::debug!(target: LOG_TARGET, n = claims.len(), "kzg batch verify");

        let mut r_powers = Vec::with_capacity(claims.len());
        let mut acc = Fr::ONE;
        for _ in 0..claims.len() {
            r_powers.push(acc);
            acc *= *r;
        }

        // Σ rᵢ·πᵢ
        let proofs: Vec<G1Affine> = claims.iter().map(|c| c.proof).collect();
        let r_bigints: Vec<BigInt<4>> = r_powers.iter().map(|s| s.to_bigint()).collect();
        let proof_lincomb: G1Jacobian = msm_bigint(&proofs, &r_bigints);

        // Σ rᵢ·Cᵢ + Σ (rᵢ·zᵢ)·πᵢ - (Σ rᵢ·yᵢ)·[1]₁
        let mut points: Vec<G1Affine> = claims.iter().map(|c| c.commitment).collect();
        points.extend(proofs.iter().copied());
        points.push(G1Affine::generator());

        let mut scalars: Vec<BigInt<4>> = r_bigints.clone();
        scalars.extend(
            claims
                .iter()
                .zip(r_powers.iter())
                .map(|(c, ri)| (*ri * c.z).to_bigint()),
        );
        let y_combined: Fr = claims
            .iter()
            .zip(r_powers.iter())
            .map(|(c, ri)| *ri * c.y)
            .fold(Fr::ZERO, |a, b| a + b);
        scalars.push((-y_combined).to_bigint());

        let rhs: G1Jacobian = msm_bigint(&points, &scalars);

        let ok = pairing_check(&[
            (proof_lincomb.to_affine(), self.g2_monomial[1]),
            (rhs.to_affine(), G2Affine::generator().neg()),
        ]);
        if ok {
            Ok(())
        } else {
            Err(CryptoError::VerificationFailure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::OnceLock;

    const N: usize = 64;

    fn settings() -> &'static KzgSettings {
        static SETTINGS: OnceLock<KzgSettings> = OnceLock::new();
        SETTINGS.get_or_init(|| KzgSettings::dev(&[42u8; 32], N))
    }

    fn poly_from_coeffs(coeffs: &[u64], domain: &RootsOfUnityDomain) -> Vec<Fr> {
        domain
            .roots
            .iter()
            .map(|root| {
                let mut acc = Fr::ZERO;
                for c in coeffs.iter().rev() {
                    acc = acc * *root + Fr::from_u64(*c);
                }
                acc
            })
            .collect()
    }

    #[test]
    fn dev_setup_consistent_with_monomial_tau() {
        // committing to the constant polynomial 1 must give [1]₁
        let s = settings();
        let ones = vec![Fr::ONE; N];
        let c = s.commit(&ones).unwrap();
        assert_eq!(c, G1Affine::generator());
    }

    #[test]
    fn prove_verify_roundtrip_off_domain() {
        let s = settings();
        let poly = poly_from_coeffs(&[1, 2, 3], &s.domain);
        let commitment = s.commit(&poly).unwrap();
        let z = Fr::from_u64(5);
        let (y, proof) = s.prove(&poly, &z).unwrap();
        assert_eq!(y, Fr::from_u64(86));
        s.verify(&commitment, &z, &y, &proof).unwrap();
    }

    #[test]
    fn prove_verify_roundtrip_in_domain() {
        let s = settings();
        let poly = poly_from_coeffs(&[9, 4, 0, 2], &s.domain);
        let commitment = s.commit(&poly).unwrap();
        let z = s.domain.roots[7];
        let (y, proof) = s.prove(&poly, &z).unwrap();
        assert_eq!(y, poly[7]);
        s.verify(&commitment, &z, &y, &proof).unwrap();
    }

    #[test]
    fn verify_rejects_mutations() {
        let s = settings();
        let poly = poly_from_coeffs(&[1, 2, 3], &s.domain);
        let commitment = s.commit(&poly).unwrap();
        let z = Fr::from_u64(5);
        let (y, proof) = s.prove(&poly, &z).unwrap();

        assert_eq!(
            s.verify(&commitment, &z, &(y + Fr::ONE), &proof),
            Err(CryptoError::VerificationFailure)
        );
        assert_eq!(
            s.verify(&commitment, &(z + Fr::ONE), &y, &proof),
            Err(CryptoError::VerificationFailure)
        );
        let bad_commitment = G1Jacobian::from(&commitment)
            .add_affine(&G1Affine::generator())
            .to_affine();
        assert_eq!(
            s.verify(&bad_commitment, &z, &y, &proof),
            Err(CryptoError::VerificationFailure)
        );
    }

    #[test]
    fn batch_verify_accepts_and_rejects() {
        let s = settings();
        let mut rng = StdRng::from_seed([51u8; 32]);
        let mut claims = Vec::new();
        for _ in 0..3 {
            let coeffs: Vec<u64> = (0..6).map(|_| rng.gen_range(0..1000)).collect();
            let poly = poly_from_coeffs(&coeffs, &s.domain);
            let commitment = s.commit(&poly).unwrap();
            let z = Fr::rand(&mut rng);
            let (y, proof) = s.prove(&poly, &z).unwrap();
            claims.push(OpeningClaim { commitment, z, y, proof });
        }
        let r = Fr::rand(&mut rng);
        s.verify_batch(&claims, &r).unwrap();

        claims[1].y += Fr::ONE;
        assert_eq!(
            s.verify_batch(&claims, &r),
            Err(CryptoError::VerificationFailure)
        );
    }

    #[test]
    fn parallel_commit_matches() {
        let s = settings();
        let poly = poly_from_coeffs(&[3, 1, 4, 1, 5], &s.domain);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        assert_eq!(
            s.commit(&poly).unwrap(),
            s.commit_parallel(&pool, &poly).unwrap()
        );
    }

    #[test]
    fn wrong_length_rejected() {
        let s = settings();
        let short = vec![Fr::ONE; N - 1];
        assert_eq!(s.commit(&short), Err(CryptoError::InputsLengthsMismatch));
    }
}
