//! Secret scalar handling
//!
//! A [`SecretKey`] wraps a nonzero scalar-field element and zeroizes its
//! limbs on drop. Validation of candidate key material reports only *which*
//! invalidity occurred (zero vs out-of-range) and never any bits of an
//! almost-valid key; parsing itself is branchless up to the accept/reject
//! decision.

#![forbid(unsafe_code)]

use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::bigint::CT_TRUE;
use crate::fields::Fr;
use crate::status::CryptoError;

/// A validated, self-zeroizing secret scalar.
pub struct SecretKey {
    scalar: Fr,
}

impl SecretKey {
    /// Validate 32 big-endian bytes as a secret key: must be canonical
    /// (`< r`) and nonzero.
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let mut candidate = *bytes;
        let parsed = Fr::from_be_bytes(&candidate);
        candidate.zeroize();
        let scalar = parsed.ok_or(CryptoError::ScalarOutOfRange)?;
        if scalar.ct_is_zero() == CT_TRUE {
            return Err(CryptoError::ZeroSecretKey);
        }
        Ok(Self { scalar })
    }

    /// Sample a uniform nonzero secret key.
    pub fn generate(rng: &mut (impl RngCore + CryptoRng)) -> Self {
        loop {
            let scalar = Fr::rand(rng);
            if scalar.ct_is_zero() != CT_TRUE {
                return Self { scalar };
            }
        }
    }

    /// Borrow the scalar for constant-time consumption.
    pub fn scalar(&self) -> &Fr {
        &self.scalar
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.scalar.zeroize();
    }
}

impl core::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // never print key material
        f.write_str("SecretKey(..)")
    }
}
