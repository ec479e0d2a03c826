//! EIP-4844 blob commitments
//!
//! The consensus-facing surface: fixed 131072-byte blobs interpreted as 4096
//! big-endian scalars (each < r) evaluating a polynomial over the 4096-root
//! domain, 48-byte compressed commitments and proofs, and the two SHA-256
//! Fiat–Shamir transcripts
//!
//! ```text
//! challenge  = SHA256("FSBLOBVERIFY_V1_" ‖ u128_be(4096) ‖ blob ‖ commitment) mod r
//! batch base = SHA256("RCKZGBATCH___V1_" ‖ challenge_0 ‖ … ‖ challenge_n-1) mod r
//! ```
//!
//! Everything here is a thin codec-plus-transcript wrapper over the
//! [`crate::kzg`] primitives; proof material entering a verifier is decoded
//! through the full checked path (flags, range, curve, subgroup).

#![forbid(unsafe_code)]

use sha2::{Digest, Sha256};

use crate::bls12_381::G1Affine;
use crate::fields::Fr;
use crate::kzg::{KzgSettings, OpeningClaim};
use crate::status::CryptoError;

const LOG_TARGET: &str = "tinykzg::eip4844";

/// Scalars per blob.
pub const FIELD_ELEMENTS_PER_BLOB: usize = 4096;
/// Bytes per field element.
pub const BYTES_PER_FIELD_ELEMENT: usize = 32;
/// Bytes per blob.
pub const BYTES_PER_BLOB: usize = FIELD_ELEMENTS_PER_BLOB * BYTES_PER_FIELD_ELEMENT;

/// Fiat–Shamir domain separator for single-blob verification.
const FIAT_SHAMIR_PROTOCOL_DOMAIN: &[u8; 16] = b"FSBLOBVERIFY_V1_";
/// Fiat–Shamir domain separator for batch randomness.
const RANDOM_CHALLENGE_KZG_BATCH_DOMAIN: &[u8; 16] = b"RCKZGBATCH___V1_";

/// A consensus blob.
pub type Blob = [u8; BYTES_PER_BLOB];
/// Compressed G1 bytes (commitment or proof).
pub type Bytes48 = [u8; 48];
/// Serialized scalar.
pub type Bytes32 = [u8; 32];

/// Decode a blob into its 4096 evaluations; any chunk `>= r` is rejected.
pub fn blob_to_polynomial(blob: &Blob) -> Result<Vec<Fr>, CryptoError> {
    blob.chunks(BYTES_PER_FIELD_ELEMENT)
        .map(|chunk| Fr::from_be_bytes(chunk).ok_or(CryptoError::ScalarOutOfRange))
        .collect()
}

fn scalar_from_bytes(bytes: &Bytes32) -> Result<Fr, CryptoError> {
    Fr::from_be_bytes(bytes).ok_or(CryptoError::ScalarOutOfRange)
}

/// The evaluation challenge bound to `(blob, commitment)`.
pub fn compute_challenge(blob: &Blob, commitment_bytes: &Bytes48) -> Fr {
    let mut hasher = Sha256::new();
    hasher.update(FIAT_SHAMIR_PROTOCOL_DOMAIN);
    // 16-byte big-endian polynomial degree bound
    let mut degree = [0u8; 16];
    degree[8..].copy_from_slice(&(FIELD_ELEMENTS_PER_BLOB as u64).to_be_bytes());
    hasher.update(degree);
    hasher.update(blob);
    hasher.update(commitment_bytes);
    let digest: [u8; 32] = hasher.finalize().into();
    Fr::from_be_bytes_reduce(&digest)
}

/// Batch randomness base: caller-supplied bytes when non-zero, else the
/// challenge transcript hash.
fn batch_randomness_base(random_bytes: &Bytes32, challenges: &[Fr]) -> Fr {
    if random_bytes.iter().any(|&b| b != 0) {
        return Fr::from_be_bytes_reduce(random_bytes);
    }
    let mut hasher = Sha256::new();
    hasher.update(RANDOM_CHALLENGE_KZG_BATCH_DOMAIN);
    for c in challenges {
        hasher.update(c.to_be_bytes());
    }
    let digest: [u8; 32] = hasher.finalize().into();
    Fr::from_be_bytes_reduce(&digest)
}

/// Commit to a blob.
pub fn blob_to_kzg_commitment(
    settings: &KzgSettings,
    blob: &Blob,
) -> Result<Bytes48, CryptoError> {
    let poly = blob_to_polynomial(blob)?;
    let commitment = settings.commit(&poly)?;
    Ok(commitment.to_compressed())
}

/// Open a blob polynomial at an arbitrary point; returns `(proof, y)`.
pub fn compute_kzg_proof(
    settings: &KzgSettings,
    blob: &Blob,
    z_bytes: &Bytes32,
) -> Result<(Bytes48, Bytes32), CryptoError> {
    let poly = blob_to_polynomial(blob)?;
    let z = scalar_from_bytes(z_bytes)?;
    let (y, proof) = settings.prove(&poly, &z)?;
    Ok((proof.to_compressed(), y.to_be_bytes()))
}

/// Open a blob polynomial at its own Fiat–Shamir challenge point.
pub fn compute_blob_kzg_proof(
    settings: &KzgSettings,
    blob: &Blob,
    commitment_bytes: &Bytes48,
) -> Result<Bytes48, CryptoError> {
    // the commitment must at least be a well-formed group element
    G1Affine::from_compressed(commitment_bytes)?;
    let poly = blob_to_polynomial(blob)?;
    let z = compute_challenge(blob, commitment_bytes);
    let (_, proof) = settings.prove(&poly, &z)?;
    Ok(proof.to_compressed())
}

/// Verify one opening claim given in wire form.
pub fn verify_kzg_proof(
    settings: &KzgSettings,
    commitment_bytes: &Bytes48,
    z_bytes: &Bytes32,
    y_bytes: &Bytes32,
    proof_bytes: &Bytes48,
) -> Result<(), CryptoError> {
    let commitment = G1Affine::from_compressed(commitment_bytes)?;
    let proof = G1Affine::from_compressed(proof_bytes)?;
    let z = scalar_from_bytes(z_bytes)?;
    let y = scalar_from_bytes(y_bytes)?;
    settings.verify(&commitment, &z, &y, &proof)
}

/// Verify a blob against its commitment and challenge-point proof.
pub fn verify_blob_kzg_proof(
    settings: &KzgSettings,
    blob: &Blob,
    commitment_bytes: &Bytes48,
    proof_bytes: &Bytes48,
) -> Result<(), CryptoError> {
    let commitment = G1Affine::from_compressed(commitment_bytes)?;
    let proof = G1Affine::from_compressed(proof_bytes)?;
    let poly = blob_to_polynomial(blob)?;
    let z = compute_challenge(blob, commitment_bytes);
    let y = settings.domain.eval_poly_at(&poly, &z);
    settings.verify(&commitment, &z, &y, &proof)
}

/// Verify a batch of blob proofs with one combined pairing check.
///
/// `random_bytes` seeds the linear-combination base when non-zero; otherwise
/// the base is derived from the concatenated challenges.
pub fn verify_blob_kzg_proof_batch(
    settings: &KzgSettings,
    blobs: &[Blob],
    commitments: &[Bytes48],
    proofs: &[Bytes48],
    random_bytes: &Bytes32,
) -> Result<(), CryptoError> {
    if blobs.len() != commitments.len() || blobs.len() != proofs.len() {
        return Err(CryptoError::InputsLengthsMismatch);
    }
    tracing::debug!(target: LOG_TARGET, n = blobs.len(), "blob batch verify");

    let mut claims = Vec::with_capacity(blobs.len());
    let mut challenges = Vec::with_capacity(blobs.len());
    for ((blob, commitment_bytes), proof_bytes) in
        blobs.iter().zip(commitments.iter()).zip(proofs.iter())
    {
        let commitment = G1Affine::from_compressed(commitment_bytes)?;
        let proof = G1Affine::from_compressed(proof_bytes)?;
        let poly = blob_to_polynomial(blob)?;
        let z = compute_challenge(blob, commitment_bytes);
        let y = settings.domain.eval_poly_at(&poly, &z);
        challenges.push(z);
        claims.push(OpeningClaim { commitment, z, y, proof });
    }

    let r = batch_randomness_base(random_bytes, &challenges);
    settings.verify_batch(&claims, &r)
}

/// Parallel batch verification: per-blob decoding and evaluation fan out over
/// the pool; the final pairing check is shared.
pub fn verify_blob_kzg_proof_batch_parallel(
    pool: &rayon::ThreadPool,
    settings: &KzgSettings,
    blobs: &[Blob],
    commitments: &[Bytes48],
    proofs: &[Bytes48],
    random_bytes: &Bytes32,
) -> Result<(), CryptoError> {
    use rayon::prelude::*;

    if blobs.len() != commitments.len() || blobs.len() != proofs.len() {
        return Err(CryptoError::InputsLengthsMismatch);
    }

    let per_blob: Result<Vec<(OpeningClaim, Fr)>, CryptoError> = pool.install(|| {
        blobs
            .par_iter()
            .zip(commitments.par_iter())
            .zip(proofs.par_iter())
            .map(|((blob, commitment_bytes), proof_bytes)| {
                let commitment = G1Affine::from_compressed(commitment_bytes)?;
                let proof = G1Affine::from_compressed(proof_bytes)?;
                let poly = blob_to_polynomial(blob)?;
                let z = compute_challenge(blob, commitment_bytes);
                let y = settings.domain.eval_poly_at(&poly, &z);
                Ok((OpeningClaim { commitment, z, y, proof }, z))
            })
            .collect()
    });
    let per_blob = per_blob?;

    let challenges: Vec<Fr> = per_blob.iter().map(|(_, z)| *z).collect();
    let claims: Vec<OpeningClaim> = per_blob.into_iter().map(|(c, _)| c).collect();
    let r = batch_randomness_base(random_bytes, &challenges);
    settings.verify_batch(&claims, &r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};
    use std::sync::OnceLock;

    fn settings() -> &'static KzgSettings {
        static SETTINGS: OnceLock<KzgSettings> = OnceLock::new();
        SETTINGS.get_or_init(|| KzgSettings::dev(&[7u8; 32], FIELD_ELEMENTS_PER_BLOB))
    }

    /// Blob whose evaluations are p(ωⁱ) for p given by `coeffs`.
    fn blob_from_coeffs(coeffs: &[u64]) -> Box<Blob> {
        let s = settings();
        let mut blob = vec![0u8; BYTES_PER_BLOB];
        for (i, root) in s.domain.roots.iter().enumerate() {
            let mut acc = Fr::ZERO;
            for c in coeffs.iter().rev() {
                acc = acc * *root + Fr::from_u64(*c);
            }
            blob[i * 32..(i + 1) * 32].copy_from_slice(&acc.to_be_bytes());
        }
        blob.into_boxed_slice().try_into().unwrap()
    }

    #[test]
    fn blob_codec_rejects_out_of_range() {
        let mut blob = vec![0u8; BYTES_PER_BLOB];
        blob[..32].copy_from_slice(&[0xffu8; 32]);
        let blob: Box<Blob> = blob.into_boxed_slice().try_into().unwrap();
        assert_eq!(
            blob_to_polynomial(&blob).unwrap_err(),
            CryptoError::ScalarOutOfRange
        );
    }

    #[test]
    fn point_at_z_roundtrip() {
        // S3: p(x) = 1 + 2x + 3x², z = 5 => y = 86
        let s = settings();
        let blob = blob_from_coeffs(&[1, 2, 3]);
        let commitment = blob_to_kzg_commitment(s, &blob).unwrap();
        let mut z_bytes = [0u8; 32];
        z_bytes[31] = 5;
        let (proof, y_bytes) = compute_kzg_proof(s, &blob, &z_bytes).unwrap();
        assert_eq!(Fr::from_be_bytes(&y_bytes).unwrap(), Fr::from_u64(86));
        verify_kzg_proof(s, &commitment, &z_bytes, &y_bytes, &proof).unwrap();
    }

    #[test]
    fn blob_proof_roundtrip() {
        let s = settings();
        let blob = blob_from_coeffs(&[9, 8, 7, 6]);
        let commitment = blob_to_kzg_commitment(s, &blob).unwrap();
        let proof = compute_blob_kzg_proof(s, &blob, &commitment).unwrap();
        verify_blob_kzg_proof(s, &blob, &commitment, &proof).unwrap();

        // a proof for a different blob must not verify
        let other = blob_from_coeffs(&[1, 1]);
        assert_eq!(
            verify_blob_kzg_proof(s, &other, &commitment, &proof),
            Err(CryptoError::VerificationFailure)
        );
    }

    #[test]
    fn fiat_shamir_challenge_matches_manual_hash() {
        // S5: recompute the transcript by hand
        let s = settings();
        let blob = blob_from_coeffs(&[4, 2]);
        let commitment = blob_to_kzg_commitment(s, &blob).unwrap();

        let mut hasher = Sha256::new();
        hasher.update(b"FSBLOBVERIFY_V1_");
        let mut degree = [0u8; 16];
        degree[8..].copy_from_slice(&4096u64.to_be_bytes());
        hasher.update(degree);
        hasher.update(&blob[..]);
        hasher.update(commitment);
        let digest: [u8; 32] = hasher.finalize().into();
        let expect = Fr::from_be_bytes_reduce(&digest);

        assert_eq!(compute_challenge(&blob, &commitment), expect);
        // determinism
        assert_eq!(compute_challenge(&blob, &commitment), expect);
    }

    #[test]
    fn batch_verify_two_blobs() {
        // S4: two valid tuples, explicit randomness 0x01 00…00
        let s = settings();
        let blob_a = blob_from_coeffs(&[1, 2, 3]);
        let blob_b = blob_from_coeffs(&[5, 0, 0, 1]);
        let commitment_a = blob_to_kzg_commitment(s, &blob_a).unwrap();
        let commitment_b = blob_to_kzg_commitment(s, &blob_b).unwrap();
        let proof_a = compute_blob_kzg_proof(s, &blob_a, &commitment_a).unwrap();
        let proof_b = compute_blob_kzg_proof(s, &blob_b, &commitment_b).unwrap();

        let mut random_bytes = [0u8; 32];
        random_bytes[0] = 0x01;

        let blobs = [*blob_a, *blob_b];
        let commitments = [commitment_a, commitment_b];
        let proofs = [proof_a, proof_b];
        verify_blob_kzg_proof_batch(s, &blobs, &commitments, &proofs, &random_bytes).unwrap();

        // swapping in a commitment for a different polynomial fails the check
        let wrong = [commitment_b, commitment_b];
        assert_eq!(
            verify_blob_kzg_proof_batch(s, &blobs, &wrong, &proofs, &random_bytes),
            Err(CryptoError::VerificationFailure)
        );

        // corrupting a commitment byte fails one way or another
        let mut corrupted = commitments;
        corrupted[0][17] ^= 0x01;
        assert!(
            verify_blob_kzg_proof_batch(s, &blobs, &corrupted, &proofs, &random_bytes).is_err()
        );

        // zero randomness falls back to the challenge-derived base
        verify_blob_kzg_proof_batch(s, &blobs, &commitments, &proofs, &[0u8; 32]).unwrap();
    }

    #[test]
    fn batch_verify_parallel_matches() {
        let s = settings();
        let blob = blob_from_coeffs(&[2, 7, 1]);
        let commitment = blob_to_kzg_commitment(s, &blob).unwrap();
        let proof = compute_blob_kzg_proof(s, &blob, &commitment).unwrap();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        verify_blob_kzg_proof_batch_parallel(
            &pool,
            s,
            &[*blob],
            &[commitment],
            &[proof],
            &[0u8; 32],
        )
        .unwrap();
    }

    #[test]
    fn length_mismatch_rejected() {
        let s = settings();
        let blob = blob_from_coeffs(&[1]);
        assert_eq!(
            verify_blob_kzg_proof_batch(s, &[*blob], &[], &[], &[0u8; 32]),
            Err(CryptoError::InputsLengthsMismatch)
        );
    }
}
