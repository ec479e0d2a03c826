//! Verkle multiproof
//!
//! Aggregates openings `(Cᵢ, zᵢ ∈ domain, yᵢ)` of many evaluation-form
//! polynomials into one IPA. With transcript challenges `r` then `t`:
//!
//! ```text
//! g(x) = Σᵢ rⁱ·(fᵢ(x) - yᵢ)/(x - zᵢ)        (in-domain quotients)
//! h(x) = Σᵢ rⁱ·fᵢ(x)/(t - zᵢ)
//! ```
//!
//! The prover commits `D = Commit(g)`, `E = Commit(h)` and opens `E - D` at
//! `t` via IPA; since `h(t) - g(t) = Σᵢ rⁱ·yᵢ/(t - zᵢ)`, the verifier can
//! recompute both the expected value and `E` (an MSM over the `Cᵢ`) from
//! public data alone and replay the same transcript.

#![forbid(unsafe_code)]

use crate::domain::batch_invert;
use crate::edwards::{msm, Element};
use crate::fields::FrBw;
use crate::ipa::{IpaProof, IpaSettings};
use crate::status::CryptoError;
use crate::transcript::Transcript;

const LOG_TARGET: &str = "tinykzg::multiproof";

/// One opening the prover aggregates: the committed polynomial in evaluation
/// form and the domain index it is opened at.
#[derive(Clone, Debug)]
pub struct ProverQuery {
    pub commitment: Element,
    pub evals: Vec<FrBw>,
    pub z_index: usize,
}

/// The verifier's view of one opening.
#[derive(Clone, Copy, Debug)]
pub struct VerifierQuery {
    pub commitment: Element,
    pub z_index: usize,
    pub y: FrBw,
}

/// Aggregated proof: the quotient commitment and the inner IPA.
#[derive(Clone, Debug)]
pub struct MultiProof {
    pub d: Element,
    pub ipa: IpaProof,
}

fn absorb_queries(transcript: &mut Transcript, queries: &[VerifierQuery]) {
    for q in queries {
        transcript.absorb_point(b"C", &q.commitment);
        transcript.absorb_scalar(b"input point", &FrBw::from_u64(q.z_index as u64));
        transcript.absorb_scalar(b"output point", &q.y);
    }
}

/// Produce an aggregated opening proof.
pub fn prove(
    settings: &IpaSettings,
    queries: &[ProverQuery],
) -> Result<MultiProof, CryptoError> {
    let n = settings.domain.n;
    if queries.is_empty() {
        return Err(CryptoError::InputsLengthsMismatch);
    }
    for q in queries {
        if q.evals.len() != n || q.z_index >= n {
            return Err(CryptoError::InputsLengthsMismatch);
        }
    }
    tracing::debug!(target: LOG_TARGET, queries = queries.len(), "multiproof prove");

    let mut transcript = Transcript::new(b"multiproof");
    let verifier_view: Vec<VerifierQuery> = queries
        .iter()
        .map(|q| VerifierQuery {
            commitment: q.commitment,
            z_index: q.z_index,
            y: q.evals[q.z_index],
        })
        .collect();
    absorb_queries(&mut transcript, &verifier_view);
    let r = transcript.challenge_scalar(b"r");

    // g(x) = Σ rⁱ·(fᵢ - yᵢ)/(x - zᵢ)
    let mut g_evals = vec![FrBw::ZERO; n];
    let mut r_power = FrBw::ONE;
    let mut r_powers = Vec::with_capacity(queries.len());
    for q in queries {
        let quotient = settings.domain.quotient_in_domain(&q.evals, q.z_index);
        for (acc, qv) in g_evals.iter_mut().zip(quotient.iter()) {
            *acc += r_power * *qv;
        }
        r_powers.push(r_power);
        r_power *= r;
    }
    let d = settings.commit(&g_evals)?;
    transcript.absorb_point(b"D", &d);
    let t = transcript.challenge_scalar(b"t");

    // h(x) = Σ rⁱ·fᵢ(x)/(t - zᵢ)
    let mut denoms: Vec<FrBw> = queries
        .iter()
        .map(|q| t - settings.domain.points[q.z_index])
        .collect();
    batch_invert(&mut denoms);
    let mut h_evals = vec![FrBw::ZERO; n];
    for ((q, r_pow), denom_inv) in queries.iter().zip(r_powers.iter()).zip(denoms.iter()) {
        let scale = *r_pow * *denom_inv;
        for (acc, fv) in h_evals.iter_mut().zip(q.evals.iter()) {
            *acc += scale * *fv;
        }
    }
    let e = settings.commit(&h_evals)?;
    transcript.absorb_point(b"E", &e);

    // open (E - D) at t over h - g
    let ipa_commitment = e.sub(&d);
    let a: Vec<FrBw> = h_evals
        .iter()
        .zip(g_evals.iter())
        .map(|(h_v, g_v)| *h_v - *g_v)
        .collect();
    let (_, ipa) = settings.prove(&mut transcript, &ipa_commitment, &a, &t)?;

    Ok(MultiProof { d, ipa })
}

/// Verify an aggregated opening proof.
pub fn verify(
    settings: &IpaSettings,
    queries: &[VerifierQuery],
    proof: &MultiProof,
) -> Result<(), CryptoError> {
    let n = settings.domain.n;
    if queries.is_empty() {
        return Err(CryptoError::InputsLengthsMismatch);
    }
    for q in queries {
        if q.z_index >= n {
            return Err(CryptoError::InputsLengthsMismatch);
        }
    }
    tracing::debug!(target: LOG_TARGET, queries = queries.len(), "multiproof verify");

    let mut transcript = Transcript::new(b"multiproof");
    absorb_queries(&mut transcript, queries);
    let r = transcript.challenge_scalar(b"r");
    transcript.absorb_point(b"D", &proof.d);
    let t = transcript.challenge_scalar(b"t");

    // rⁱ/(t - zᵢ) and the expected value g₂(t) = Σ rⁱ·yᵢ/(t - zᵢ)
    let mut denoms: Vec<FrBw> = queries
        .iter()
        .map(|q| t - settings.domain.points[q.z_index])
        .collect();
    batch_invert(&mut denoms);
    let mut coeffs = Vec::with_capacity(queries.len());
    let mut g2_t = FrBw::ZERO;
    let mut r_power = FrBw::ONE;
    for (q, denom_inv) in queries.iter().zip(denoms.iter()) {
        let coeff = r_power * *denom_inv;
        g2_t += coeff * q.y;
        coeffs.push(coeff);
        r_power *= r;
    }

    // E = Σ coeffᵢ·Cᵢ
    let commitments: Vec<Element> = queries.iter().map(|q| q.commitment).collect();
    let e = msm(&commitments, &coeffs);
    transcript.absorb_point(b"E", &e);

    let ipa_commitment = e.sub(&proof.d);
    settings.verify(&mut transcript, &ipa_commitment, &t, &g2_t, &proof.ipa)
}
