//! Crate root: public surface and protocol-wide invariants
//!
//! `tinykzg` is a pairing-based commitment engine for Ethereum consensus
//! clients: constant-time Montgomery field arithmetic over statically-sized
//! big integers, short-Weierstrass group law for BLS12-381 G1/G2, the optimal
//! ate pairing, and two polynomial commitment protocols on top:
//!
//! - **KZG over BLS12-381**, exposed through the EIP-4844 blob pipeline
//!   ([`eip4844`]), and
//! - **IPA over Banderwagon**, the Ethereum Verkle argument ([`ipa`],
//!   [`multiproof`]).
//!
//! ## Invariants
//!
//! - **Reduced representatives.** Every field element stores a fully reduced
//!   Montgomery residue; every deserializer rejects non-canonical encodings
//!   before any arithmetic observes them.
//! - **Trusted-point discipline.** Curve points flow through
//!   `bytes → flags → range → curve → subgroup`; only fully-checked points
//!   reach scalar multiplication or the commitment layers.
//! - **Constant time on secrets.** Operations touching secret data take no
//!   data-dependent branches or table indices. Variable-time fast paths are
//!   spelled `_vartime` (and the MSM/batch layers, which are public-data by
//!   contract).
//! - **Fiat–Shamir discipline.** Both transcripts (SHA-256) absorb
//!   label-prefixed canonical encodings; challenge derivation finalizes a
//!   copy of the state and re-absorbs its result, so prover and verifier
//!   replay byte-identical schedules.
//!
//! Contexts ([`kzg::KzgSettings`], [`ipa::IpaSettings`]) are immutable after
//! construction and safe to share across threads; heavy operations offer
//! `*_parallel` variants taking an explicit `rayon` pool handle.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod bigint;
pub mod bls12_381;
pub mod curve;
pub mod domain;
pub mod edwards;
pub mod eip4844;
pub mod field;
pub mod fields;
pub mod ipa;
pub mod kzg;
pub mod msm;
pub mod multiproof;
pub mod pairing;
pub mod secret;
pub mod status;
pub mod tower;
pub mod transcript;

pub use bls12_381::{G1Affine, G1Projective, G2Affine, G2Projective};
pub use edwards::Element;
pub use fields::{Fq, Fr, FrBw};
pub use ipa::{IpaProof, IpaSettings};
pub use kzg::KzgSettings;
pub use secret::SecretKey;
pub use status::CryptoError;
pub use transcript::Transcript;
