//! Concrete field instantiations
//!
//! Three primes drive the whole crate:
//!
//! - `Fq`, the 381-bit BLS12-381 base field (G1 coordinates, tower base);
//! - `Fr`, the 255-bit BLS12-381 scalar field, which doubles as the
//!   Bandersnatch *base* field (Banderwagon coordinates live here);
//! - `FrBw`, the 253-bit Banderwagon scalar field used by the IPA layer.
//!
//! Every constant below is stored in the form the arithmetic consumes
//! (Montgomery residues for field values, plain limbs for exponents).

#![forbid(unsafe_code)]

use crate::bigint::BigInt;
use crate::field::{Fp, FpParams};

/// Parameter set for the BLS12-381 base field.
#[derive(Clone, Copy)]
pub struct FqParams;

impl FpParams<6> for FqParams {
    const MODULUS: BigInt<6> = BigInt([
        0xb9feffffffffaaab,
        0x1eabfffeb153ffff,
        0x6730d2a0f6b0f624,
        0x64774b84f38512bf,
        0x4b1ba7b6434bacd7,
        0x1a0111ea397fe69a,
    ]);
    const R2: BigInt<6> = BigInt([
        0xf4df1f341c341746,
        0x0a76e6a609d104f1,
        0x8de5476c4c95b6d5,
        0x67eb88a9939d83c0,
        0x9a793e85b519952d,
        0x11988fe592cae3aa,
    ]);
    const ONE: BigInt<6> = BigInt([
        0x760900000002fffd,
        0xebf4000bc40c0002,
        0x5f48985753c758ba,
        0x77ce585370525745,
        0x5c071a97a256ec6d,
        0x15f65ec3fa80e493,
    ]);
    const INV: u64 = 0x89f3fffcfffcfffd;
    const SPARE_BITS: u32 = 3;
    const NUM_BITS: u32 = 381;
    const MODULUS_MINUS_ONE_DIV_TWO: BigInt<6> = BigInt([
        0xdcff7fffffffd555,
        0x0f55ffff58a9ffff,
        0xb39869507b587b12,
        0xb23ba5c279c2895f,
        0x258dd3db21a5d66b,
        0x0d0088f51cbff34d,
    ]);
    // p = 3 (mod 4): a^((p+1)/4) is a square root of every square
    const SQRT_EXPONENT: Option<BigInt<6>> = Some(BigInt([
        0xee7fbfffffffeaab,
        0x07aaffffac54ffff,
        0xd9cc34a83dac3d89,
        0xd91dd2e13ce144af,
        0x92c6e9ed90d2eb35,
        0x0680447a8e5ff9a6,
    ]));
    const TWO_ADICITY: u32 = 1;
    const TWO_ADIC_ROOT: BigInt<6> = BigInt::ZERO; // unused: p = 3 (mod 4)
    const TRACE_MINUS_ONE_DIV_TWO: BigInt<6> = BigInt::ZERO; // unused
    const GENERATOR: BigInt<6> = BigInt::ZERO; // unused
}

/// Parameter set for the BLS12-381 scalar field.
#[derive(Clone, Copy)]
pub struct FrParams;

impl FpParams<4> for FrParams {
    const MODULUS: BigInt<4> = BigInt([
        0xffffffff00000001,
        0x53bda402fffe5bfe,
        0x3339d80809a1d805,
        0x73eda753299d7d48,
    ]);
    const R2: BigInt<4> = BigInt([
        0xc999e990f3f29c6d,
        0x2b6cedcb87925c23,
        0x05d314967254398f,
        0x0748d9d99f59ff11,
    ]);
    const ONE: BigInt<4> = BigInt([
        0x00000001fffffffe,
        0x5884b7fa00034802,
        0x998c4fefecbc4ff5,
        0x1824b159acc5056f,
    ]);
    const INV: u64 = 0xfffffffeffffffff;
    const SPARE_BITS: u32 = 1;
    const NUM_BITS: u32 = 255;
    const MODULUS_MINUS_ONE_DIV_TWO: BigInt<4> = BigInt([
        0x7fffffff80000000,
        0xa9ded2017fff2dff,
        0x199cec0404d0ec02,
        0x39f6d3a994cebea4,
    ]);
    // r = 1 (mod 2^32): Tonelli-Shanks territory
    const SQRT_EXPONENT: Option<BigInt<4>> = None;
    const TWO_ADICITY: u32 = 32;
    const TWO_ADIC_ROOT: BigInt<4> = BigInt([
        0xb9b58d8c5f0e466a,
        0x5b1b4c801819d7ec,
        0x0af53ae352a31e64,
        0x5bf3adda19e9b27b,
    ]);
    const TRACE_MINUS_ONE_DIV_TWO: BigInt<4> = BigInt([
        0x7fff2dff7fffffff,
        0x04d0ec02a9ded201,
        0x94cebea4199cec04,
        0x0000000039f6d3a9,
    ]);
    const GENERATOR: BigInt<4> = BigInt([
        0x0000000efffffff1,
        0x17e363d300189c0f,
        0xff9c57876f8457b0,
        0x351332208fc5a8c4,
    ]);
}

/// Parameter set for the Banderwagon (Bandersnatch prime-subgroup) scalar
/// field.
#[derive(Clone, Copy)]
pub struct FrBwParams;

impl FpParams<4> for FrBwParams {
    const MODULUS: BigInt<4> = BigInt([
        0x74fd06b52876e7e1,
        0xff8f870074190471,
        0x0cce760202687600,
        0x1cfb69d4ca675f52,
    ]);
    const R2: BigInt<4> = BigInt([
        0xdbb4f5d658db47cb,
        0x40fa7ca27fecb938,
        0xaa9e6daec0055cea,
        0x0ae793ddb14aec7d,
    ]);
    const ONE: BigInt<4> = BigInt([
        0x5817ca56bc48c0f8,
        0x0383c7fc5f37dc74,
        0x998c4fefecbc4ff8,
        0x1824b159acc5056f,
    ]);
    const INV: u64 = 0xf19f22295cc063df;
    const SPARE_BITS: u32 = 3;
    const NUM_BITS: u32 = 253;
    const MODULUS_MINUS_ONE_DIV_TWO: BigInt<4> = BigInt([
        0xba7e835a943b73f0,
        0x7fc7c3803a0c8238,
        0x06673b0101343b00,
        0x0e7db4ea6533afa9,
    ]);
    // the IPA layer never takes square roots here
    const SQRT_EXPONENT: Option<BigInt<4>> = None;
    const TWO_ADICITY: u32 = 5;
    const TWO_ADIC_ROOT: BigInt<4> = BigInt::ZERO; // unused
    const TRACE_MINUS_ONE_DIV_TWO: BigInt<4> = BigInt::ZERO; // unused
    const GENERATOR: BigInt<4> = BigInt::ZERO; // unused
}

/// BLS12-381 base-field element.
pub type Fq = Fp<FqParams, 6>;
/// BLS12-381 scalar-field element (Bandersnatch base field).
pub type Fr = Fp<FrParams, 4>;
/// Banderwagon scalar-field element.
pub type FrBw = Fp<FrBwParams, 4>;

impl Fr {
    /// Canonical 32-byte big-endian encoding.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        self.write_be_bytes(&mut out);
        out
    }
}

impl FrBw {
    /// Canonical 32-byte big-endian encoding.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        self.write_be_bytes(&mut out);
        out
    }
}

impl Fq {
    /// Canonical 48-byte big-endian encoding.
    pub fn to_be_bytes(&self) -> [u8; 48] {
        let mut out = [0u8; 48];
        self.write_be_bytes(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigint::CT_TRUE;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::from_seed([7u8; 32])
    }

    #[test]
    fn fq_montgomery_roundtrip() {
        let b = BigInt([1, 2, 3, 4, 5, 0]);
        let x = Fq::from_bigint(&b);
        assert_eq!(x.to_bigint(), b);
    }

    #[test]
    fn fr_identities() {
        let mut rng = rng();
        for _ in 0..50 {
            let a = Fr::rand(&mut rng);
            let b = Fr::rand(&mut rng);
            let c = Fr::rand(&mut rng);
            assert_eq!(a + Fr::ZERO, a);
            assert_eq!(a * Fr::ONE, a);
            assert_eq!((a + b) * c, a * c + b * c);
            assert_eq!(a - a, Fr::ZERO);
            if !a.is_zero_vartime() {
                assert_eq!(a * a.invert().unwrap(), Fr::ONE);
            }
        }
    }

    #[test]
    fn fq_inverse_and_halve() {
        let mut rng = rng();
        for _ in 0..20 {
            let a = Fq::rand(&mut rng);
            if a.is_zero_vartime() {
                continue;
            }
            assert_eq!(a * a.invert().unwrap(), Fq::ONE);
            assert_eq!(a.halve() + a.halve(), a);
            assert_eq!(a.halve().double(), a);
        }
        assert!(Fq::ZERO.invert().is_none());
    }

    #[test]
    fn fq_sqrt_sign_and_square() {
        let mut rng = rng();
        for _ in 0..20 {
            let a = Fq::rand(&mut rng);
            let sq = a.square();
            let (root, ok) = sq.sqrt_if_square();
            assert_eq!(ok, CT_TRUE);
            assert_eq!(root.square(), sq);
            // deterministic sign: the smaller representative
            assert_eq!(root.is_lexicographically_largest(), 0);
        }
    }

    #[test]
    fn fr_tonelli_shanks() {
        let mut rng = rng();
        for _ in 0..20 {
            let a = Fr::rand(&mut rng);
            let sq = a.square();
            let (root, ok) = sq.sqrt_if_square();
            assert_eq!(ok, CT_TRUE);
            assert_eq!(root.square(), sq);
        }
        // the generator is a non-residue
        let g = Fr::from_mont_unchecked(FrParams::GENERATOR);
        let (_, ok) = g.sqrt_if_square();
        assert_eq!(ok, 0);
    }

    #[test]
    fn fr_two_adic_root_has_full_order() {
        let w = Fr::from_mont_unchecked(FrParams::TWO_ADIC_ROOT);
        let mut acc = w;
        for _ in 0..31 {
            acc = acc.square();
        }
        // w^(2^31) = -1, w^(2^32) = 1
        assert_eq!(acc, -Fr::ONE);
        assert_eq!(acc.square(), Fr::ONE);
    }

    #[test]
    fn canonical_bytes_reject_modulus() {
        let mut bytes = [0u8; 32];
        FrParams::MODULUS.write_be_bytes(&mut bytes);
        assert!(Fr::from_be_bytes(&bytes).is_none());
        // p - 1 parses
        bytes[31] -= 1;
        assert!(Fr::from_be_bytes(&bytes).is_some());
    }

    #[test]
    fn bytes_roundtrip_le_be() {
        let mut rng = rng();
        for _ in 0..10 {
            let a = Fr::rand(&mut rng);
            assert_eq!(Fr::from_be_bytes(&a.to_be_bytes()).unwrap(), a);
            let mut le = [0u8; 32];
            a.write_le_bytes(&mut le);
            assert_eq!(Fr::from_le_bytes(&le).unwrap(), a);
        }
    }

    proptest! {
        #[test]
        fn frbw_field_laws(a0 in any::<u64>(), b0 in any::<u64>(), c0 in any::<u64>()) {
            let a = FrBw::from_u64(a0);
            let b = FrBw::from_u64(b0);
            let c = FrBw::from_u64(c0);
            prop_assert_eq!((a + b) + c, a + (b + c));
            prop_assert_eq!(a * (b + c), a * b + a * c);
            prop_assert_eq!(a * b, b * a);
            prop_assert_eq!(-(-a), a);
        }

        #[test]
        fn fr_mul_matches_u128(a0 in any::<u32>(), b0 in any::<u32>()) {
            let prod = (a0 as u64) * (b0 as u64);
            prop_assert_eq!(
                Fr::from_u64(a0 as u64) * Fr::from_u64(b0 as u64),
                Fr::from_u64(prod)
            );
        }
    }
}
