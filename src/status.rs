//! Crate-wide status codes
//!
//! Every fallible public procedure returns `Result<_, CryptoError>`. The
//! variants distinguish *input-encoding* rejections (flags, ranges, curve and
//! subgroup membership), *shape* mismatches, and the protocol-level negative
//! `VerificationFailure`, which is a legitimate outcome rather than a fault.
//! Domain violations on already-validated values are programmer errors and are
//! debug-asserted instead of surfaced here.

#![forbid(unsafe_code)]

/// Status returned by the public API surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// A proof or pairing equation did not hold.
    #[error("verification failure")]
    VerificationFailure,
    /// Malformed encoding: compression flag wrong or reserved bits set.
    #[error("invalid point encoding (bad flags)")]
    InvalidEncoding,
    /// A coordinate was not a canonical field element (x or y >= p).
    #[error("coordinate out of range")]
    CoordinateOutOfRange,
    /// The decoded coordinates do not satisfy the curve equation.
    #[error("point not on curve")]
    PointNotOnCurve,
    /// The decoded point is not in the prime-order subgroup.
    #[error("point not in subgroup")]
    PointNotInSubgroup,
    /// A scalar encoding was >= the group order.
    #[error("scalar out of range")]
    ScalarOutOfRange,
    /// Batch inputs have inconsistent lengths.
    #[error("input lengths mismatch")]
    InputsLengthsMismatch,
    /// A secret key was the zero scalar.
    #[error("zero secret key")]
    ZeroSecretKey,
}
