//! Development stand-ins for the delegated encryption service.
//!
//! [`decrypt_volume`] opens a pre-aggregated encrypted volume and
//! [`seal_volume`] produces ciphertexts for local tests. Neither offers
//! any confidentiality: both are keyed hashes, and `decrypt(seal(v))` is
//! not `v`. Production deployments talk to the real service instead.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use num_bigint::BigUint;
use sha2::Sha256;
use veilbatch_types::{Result, VeilBatchError, constants::MOCK_VOLUME_MODULUS};

type HmacSha256 = Hmac<Sha256>;

/// Derive a plaintext volume from a ciphertext:
/// `HMAC-SHA256(secret, payload) mod 10^18`.
///
/// `payload` is the hex-decoded bytes of a `0x`-prefixed ciphertext, or the
/// base64-decoded bytes otherwise.
///
/// # Errors
/// Returns [`VeilBatchError::ComputationFailure`] when the ciphertext is
/// neither valid hex nor valid base64.
pub fn decrypt_volume(ciphertext: &str, shared_secret: &str) -> Result<BigUint> {
    let payload = ciphertext_payload(ciphertext)?;
    let digest = keyed_digest(shared_secret, &payload)?;
    Ok(BigUint::from_bytes_be(&digest) % BigUint::from(MOCK_VOLUME_MODULUS))
}

/// Raw bytes of a ciphertext: hex after a `0x` prefix, base64 otherwise.
///
/// # Errors
/// Returns [`VeilBatchError::ComputationFailure`] for any other encoding.
pub fn ciphertext_payload(ciphertext: &str) -> Result<Vec<u8>> {
    match ciphertext.strip_prefix("0x").filter(|rest| !rest.is_empty()) {
        Some(digits) => {
            hex::decode(digits).map_err(|e| VeilBatchError::computation("volume decryption", e))
        }
        None => STANDARD
            .decode(ciphertext)
            .map_err(|e| VeilBatchError::computation("volume decryption", e)),
    }
}

/// Seal a 128-bit value: `0x ‖ HMAC-SHA256(secret, value as 16-byte big-endian)`.
///
/// # Errors
/// Returns [`VeilBatchError::MagnitudeOverflow`] when `value` needs more
/// than 128 bits.
pub fn seal_volume(value: &BigUint, shared_secret: &str) -> Result<String> {
    if value.bits() > 128 {
        return Err(VeilBatchError::MagnitudeOverflow { bits: value.bits() });
    }
    let bytes = value.to_bytes_be();
    let mut word = [0u8; 16];
    word[16 - bytes.len()..].copy_from_slice(&bytes);

    let digest = keyed_digest(shared_secret, &word)?;
    Ok(format!("0x{}", hex::encode(digest)))
}

fn keyed_digest(secret: &str, data: &[u8]) -> Result<[u8; 32]> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| VeilBatchError::computation("keyed digest", e))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrypt_is_deterministic_and_bounded() {
        let a = decrypt_volume("0xdeadbeef", "secret").unwrap();
        let b = decrypt_volume("0xdeadbeef", "secret").unwrap();
        assert_eq!(a, b);
        assert!(a < BigUint::from(MOCK_VOLUME_MODULUS));
    }

    #[test]
    fn hex_and_base64_decode_to_same_payload() {
        // 0xdeadbeef == base64 "3q2+7w=="
        assert_eq!(
            decrypt_volume("0xdeadbeef", "k").unwrap(),
            decrypt_volume("3q2+7w==", "k").unwrap()
        );
    }

    #[test]
    fn secret_matters() {
        assert_ne!(
            decrypt_volume("0xdeadbeef", "a").unwrap(),
            decrypt_volume("0xdeadbeef", "b").unwrap()
        );
    }

    #[test]
    fn invalid_encodings_are_rejected() {
        assert!(decrypt_volume("0xzz", "k").is_err());
        assert!(decrypt_volume("!!!not base64!!!", "k").is_err());
    }

    #[test]
    fn payload_encodings() {
        assert_eq!(ciphertext_payload("0x0102").unwrap(), vec![1, 2]);
        assert_eq!(ciphertext_payload("AQI=").unwrap(), vec![1, 2]);
        assert!(ciphertext_payload("0xzz12").is_err());
        assert!(ciphertext_payload("!!!!").is_err());
    }

    #[test]
    fn seal_is_prefixed_sha256_hex() {
        let sealed = seal_volume(&BigUint::from(1_000u32), "k").unwrap();
        assert!(sealed.starts_with("0x"));
        assert_eq!(sealed.len(), 66);
        assert_eq!(sealed, seal_volume(&BigUint::from(1_000u32), "k").unwrap());
    }

    #[test]
    fn seal_pads_to_sixteen_bytes() {
        let zero = seal_volume(&BigUint::default(), "k").unwrap();
        let expected = format!("0x{}", hex::encode(keyed_digest("k", &[0u8; 16]).unwrap()));
        assert_eq!(zero, expected);
    }

    #[test]
    fn seal_rejects_values_above_128_bits() {
        let max = (BigUint::from(1u8) << 128) - 1u8;
        assert!(seal_volume(&max, "k").is_ok());
        let err = seal_volume(&(BigUint::from(1u8) << 128), "k").unwrap_err();
        assert!(matches!(err, VeilBatchError::MagnitudeOverflow { bits: 129 }));
    }

    #[test]
    fn sealed_output_opens_to_a_bounded_volume() {
        let sealed = seal_volume(&BigUint::from(5u8), "k").unwrap();
        assert!(decrypt_volume(&sealed, "k").unwrap() < BigUint::from(MOCK_VOLUME_MODULUS));
    }
}
