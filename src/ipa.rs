//! Inner Product Argument over Banderwagon
//!
//! Pedersen vector commitments against a deterministic CRS, plus the
//! log₂N-round folding argument the Verkle stack uses: the prover shows
//! knowledge of `a` with `C = Commit(a; G) + [⟨a, b⟩]·Q'` where `b` is the
//! barycentric coefficient vector of a public evaluation point, so
//! `⟨a, b⟩ = p(z)`.
//!
//! Each round commits to the cross terms `L = Commit(a_R; G_L) + [z_L]Q'`,
//! `R = Commit(a_L; G_R) + [z_R]Q'`, squeezes a challenge `x`, and folds
//! `a ← a_L + x·a_R`, `b ← b_L + x⁻¹·b_R`, `G ← G_L + x⁻¹·G_R`. The verifier
//! replays the transcript and reconstructs the folded generator through the
//! `s`-vector (challenge-product per index bit pattern).
//!
//! CRS generators come from SHA-256 try-and-increment over the canonical
//! point encoding, so they carry no known discrete-log relations.

#![forbid(unsafe_code)]

use sha2::{Digest, Sha256};

use crate::domain::{inner_product, LinearDomain};
use crate::edwards::{msm, Element};
use crate::fields::FrBw;
use crate::status::CryptoError;
use crate::transcript::Transcript;

const LOG_TARGET: &str = "tinykzg::ipa";

/// Public parameters: CRS generators, the inner-product generator, and the
/// evaluation domain.
#[derive(Clone, Debug)]
pub struct IpaSettings {
    /// `G_0 .. G_{N-1}`.
    pub crs: Vec<Element>,
    /// The inner-product generator `Q`.
    pub q: Element,
    /// The linear evaluation domain `0..N-1`.
    pub domain: LinearDomain,
}

/// An IPA opening proof: the per-round cross commitments and the fully
/// folded scalar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IpaProof {
    pub l: Vec<Element>,
    pub r: Vec<Element>,
    pub a_final: FrBw,
}

/// Derive a generator by hashing `(seed, index, counter)` until the digest
/// decodes as a canonical group element.
fn hash_to_element(seed: &[u8], index: u64) -> Element {
    let mut counter = 0u64;
    loop {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(index.to_be_bytes());
        hasher.update(counter.to_be_bytes());
        let digest: [u8; 32] = hasher.finalize().into();
        if let Ok(p) = Element::from_bytes(&digest) {
            if !p.is_identity() {
                return p;
            }
        }
        counter += 1;
    }
}

impl IpaSettings {
    /// Deterministic parameters for a power-of-two domain size.
    pub fn new(seed: &[u8], n: usize) -> Self {
        assert!(n.is_power_of_two() && n > 1, "domain size must be a power of two");
        let crs = (0..n as u64).map(|i| hash_to_element(seed, i)).collect();
        let q = hash_to_element(seed, u64::MAX);
        tracing::debug!(target: LOG_TARGET, n, "ipa settings generated");
        Self { crs, q, domain: LinearDomain::new(n) }
    }

    /// Pedersen commitment `Commit(a; G) = Σ aᵢ·Gᵢ`.
    pub fn commit(&self, a: &[FrBw]) -> Result<Element, CryptoError> {
        if a.len() != self.crs.len() {
            return Err(CryptoError::InputsLengthsMismatch);
        }
        Ok(msm(&self.crs, a))
    }

    /// Blinded Pedersen commitment `Commit(a; G) + [r]·H`.
    pub fn commit_blinded(
        &self,
        a: &[FrBw],
        blind: &FrBw,
        h: &Element,
    ) -> Result<Element, CryptoError> {
        Ok(self.commit(a)?.add(&h.mul(blind)))
    }

    /// Produce an opening proof for `commitment = Commit(a; G)` at the public
    /// point `z`; returns `(y, proof)` with `y = ⟨a, b(z)⟩`.
    ///
    /// The caller owns the transcript so the argument can be embedded in a
    /// larger protocol (the Verkle multiproof continues its own transcript).
    pub fn prove(
        &self,
        transcript: &mut Transcript,
        commitment: &Element,
        a: &[FrBw],
        z: &FrBw,
    ) -> Result<(FrBw, IpaProof), CryptoError> {
        let n = self.crs.len();
        if a.len() != n {
            return Err(CryptoError::InputsLengthsMismatch);
        }
        let rounds = n.trailing_zeros() as usize;
        tracing::debug!(target: LOG_TARGET, n, rounds, "ipa prove");

        let mut b = self.domain.barycentric_coefficients(z);
        let y = inner_product(a, &b);

        transcript.absorb_point(b"C", commitment);
        transcript.absorb_scalar(b"input point", z);
        transcript.absorb_scalar(b"output point", &y);
        let w = transcript.challenge_scalar(b"w");
        let q_prime = self.q.mul(&w);

        let mut a = a.to_vec();
        let mut g = self.crs.clone();
        let mut l_vec = Vec::with_capacity(rounds);
        let mut r_vec = Vec::with_capacity(rounds);

        while a.len() > 1 {
            let m = a.len() / 2;
            let (a_l, a_r) = a.split_at(m);
            let (b_l, b_r) = b.split_at(m);
            let (g_l, g_r) = g.split_at(m);

            let z_l = inner_product(a_r, b_l);
            let z_r = inner_product(a_l, b_r);
            let l = msm(g_l, a_r).add(&q_prime.mul(&z_l));
            let r = msm(g_r, a_l).add(&q_prime.mul(&z_r));
            l_vec.push(l);
            r_vec.push(r);

            transcript.absorb_point(b"L", &l);
            transcript.absorb_point(b"R", &r);
            let x = transcript.challenge_scalar(b"x");
            let x_inv = x.invert().ok_or(CryptoError::VerificationFailure)?;

            let folded_a: Vec<FrBw> =
                a_l.iter().zip(a_r.iter()).map(|(l_, r_)| *l_ + x * *r_).collect();
            let folded_b: Vec<FrBw> =
                b_l.iter().zip(b_r.iter()).map(|(l_, r_)| *l_ + x_inv * *r_).collect();
            let folded_g: Vec<Element> = g_l
                .iter()
                .zip(g_r.iter())
                .map(|(l_, r_)| l_.add(&r_.mul(&x_inv)))
                .collect();
            a = folded_a;
            b = folded_b;
            g = folded_g;
        }

        Ok((y, IpaProof { l: l_vec, r: r_vec, a_final: a[0] }))
    }

    /// Verify an opening proof for `commitment` at `z` with claimed value `y`.
    pub fn verify(
        &self,
        transcript: &mut Transcript,
        commitment: &Element,
        z: &FrBw,
        y: &FrBw,
        proof: &IpaProof,
    ) -> Result<(), CryptoError> {
        let n = self.crs.len();
        let rounds = n.trailing_zeros() as usize;
        if proof.l.len() != rounds || proof.r.len() != rounds {
            return Err(CryptoError::InputsLengthsMismatch);
        }

        let b = self.domain.barycentric_coefficients(z);

        transcript.absorb_point(b"C", commitment);
        transcript.absorb_scalar(b"input point", z);
        transcript.absorb_scalar(b"output point", y);
        let w = transcript.challenge_scalar(b"w");
        let q_prime = self.q.mul(&w);

        // folded commitment C' = C + [y]Q' + Σ [xⱼ]Lⱼ + [xⱼ⁻¹]Rⱼ
        let mut challenges = Vec::with_capacity(rounds);
        for (l, r) in proof.l.iter().zip(proof.r.iter()) {
            transcript.absorb_point(b"L", l);
            transcript.absorb_point(b"R", r);
            challenges.push(transcript.challenge_scalar(b"x"));
        }

        let mut c_folded = commitment.add(&q_prime.mul(y));
        for ((l, r), x) in proof.l.iter().zip(proof.r.iter()).zip(challenges.iter()) {
            let x_inv = x.invert().ok_or(CryptoError::VerificationFailure)?;
            c_folded = c_folded.add(&l.mul(x)).add(&r.mul(&x_inv));
        }

        // s-vector: sᵢ = Π xⱼ⁻¹ over the challenge rounds whose half `i`
        // landed in the right split (bit `rounds-1-j` of `i`)
        let mut inv_challenges = challenges.clone();
        crate::domain::batch_invert(&mut inv_challenges);
        let mut s = Vec::with_capacity(n);
        for i in 0..n {
            let mut acc = FrBw::ONE;
            for (j, x_inv) in inv_challenges.iter().enumerate() {
                if (i >> (rounds - 1 - j)) & 1 == 1 {
                    acc *= *x_inv;
                }
            }
            s.push(acc);
        }

        // [a]G* + [a·b*]Q' == C'
        let g_scalars: Vec<FrBw> = s.iter().map(|si| proof.a_final * *si).collect();
        let g_star = msm(&self.crs, &g_scalars);
        let b_star = inner_product(&s, &b);
        let rhs = g_star.add(&q_prime.mul(&(proof.a_final * b_star)));

        if rhs == c_folded {
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
    use rand::SeedableRng;
    use std::sync::OnceLock;

    fn settings_small() -> &'static IpaSettings {
        static SETTINGS: OnceLock<IpaSettings> = OnceLock::new();
        SETTINGS.get_or_init(|| IpaSettings::new(b"test ipa crs", 8))
    }

    fn settings_verkle() -> &'static IpaSettings {
        static SETTINGS: OnceLock<IpaSettings> = OnceLock::new();
        SETTINGS.get_or_init(|| IpaSettings::new(b"eth_verkle_oct_2021", 256))
    }

    #[test]
    fn crs_is_deterministic_and_distinct() {
        let s = settings_small();
        let again = IpaSettings::new(b"test ipa crs", 8);
        assert_eq!(s.crs, again.crs);
        assert_eq!(s.q, again.q);
        for (i, a) in s.crs.iter().enumerate() {
            for b in &s.crs[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn prove_verify_out_of_domain() {
        let s = settings_small();
        let mut rng = StdRng::from_seed([61u8; 32]);
        let a: Vec<FrBw> = (0..8).map(|_| FrBw::rand(&mut rng)).collect();
        let commitment = s.commit(&a).unwrap();
        let z = FrBw::from_u64(300);

        let mut tp = Transcript::new(b"ipa");
        let (y, proof) = s.prove(&mut tp, &commitment, &a, &z).unwrap();
        assert_eq!(y, s.domain.eval_poly_at(&a, &z));

        let mut tv = Transcript::new(b"ipa");
        s.verify(&mut tv, &commitment, &z, &y, &proof).unwrap();
    }

    #[test]
    fn prove_verify_in_domain() {
        let s = settings_small();
        let a: Vec<FrBw> = (0..8u64).map(|i| FrBw::from_u64(i * i + 3)).collect();
        let commitment = s.commit(&a).unwrap();
        let z = FrBw::from_u64(5);

        let mut tp = Transcript::new(b"ipa");
        let (y, proof) = s.prove(&mut tp, &commitment, &a, &z).unwrap();
        assert_eq!(y, a[5]);

        let mut tv = Transcript::new(b"ipa");
        s.verify(&mut tv, &commitment, &z, &y, &proof).unwrap();
    }

    #[test]
    fn tampered_proofs_fail() {
        let s = settings_small();
        let a: Vec<FrBw> = (0..8u64).map(FrBw::from_u64).collect();
        let commitment = s.commit(&a).unwrap();
        let z = FrBw::from_u64(11);
        let mut tp = Transcript::new(b"ipa");
        let (y, proof) = s.prove(&mut tp, &commitment, &a, &z).unwrap();

        // wrong claimed value
        let mut tv = Transcript::new(b"ipa");
        assert_eq!(
            s.verify(&mut tv, &commitment, &z, &(y + FrBw::ONE), &proof),
            Err(CryptoError::VerificationFailure)
        );
        // mutated round commitment
        let mut bad = proof.clone();
        bad.l[1] = bad.l[1].double();
        let mut tv = Transcript::new(b"ipa");
        assert_eq!(
            s.verify(&mut tv, &commitment, &z, &y, &bad),
            Err(CryptoError::VerificationFailure)
        );
        // mutated folded scalar
        let mut bad = proof.clone();
        bad.a_final += FrBw::ONE;
        let mut tv = Transcript::new(b"ipa");
        assert_eq!(
            s.verify(&mut tv, &commitment, &z, &y, &bad),
            Err(CryptoError::VerificationFailure)
        );
    }

    #[test]
    fn verkle_domain_identity_polynomial() {
        // S6: p = Σ i·Lᵢ over the 256-point domain, z = 7 => p(7) = 7
        let s = settings_verkle();
        let a: Vec<FrBw> = (0..256u64).map(FrBw::from_u64).collect();
        let commitment = s.commit(&a).unwrap();
        let z = FrBw::from_u64(7);

        let mut tp = Transcript::new(b"ipa");
        let (y, proof) = s.prove(&mut tp, &commitment, &a, &z).unwrap();
        assert_eq!(y, FrBw::from_u64(7));
        assert_eq!(proof.l.len(), 8);

        let mut tv = Transcript::new(b"ipa");
        s.verify(&mut tv, &commitment, &z, &y, &proof).unwrap();

        // mutating a round commitment must break it
        let mut bad = proof.clone();
        bad.l[3] = bad.l[3].add(&Element::generator());
        let mut tv = Transcript::new(b"ipa");
        assert_eq!(
            s.verify(&mut tv, &commitment, &z, &y, &bad),
            Err(CryptoError::VerificationFailure)
        );
    }

    #[test]
    fn blinded_commitment_shifts_by_h() {
        let s = settings_small();
        let a: Vec<FrBw> = (0..8u64).map(FrBw::from_u64).collect();
        let h = Element::generator();
        let blind = FrBw::from_u64(99);
        let plain = s.commit(&a).unwrap();
        let blinded = s.commit_blinded(&a, &blind, &h).unwrap();
        assert_eq!(blinded, plain.add(&h.mul(&blind)));
    }
}
