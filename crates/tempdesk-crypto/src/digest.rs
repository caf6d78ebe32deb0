//! HMAC-SHA256 request digests
//!
//! A digest is `base64(HMAC-SHA256(key, message))` using the standard
//! alphabet with padding. Verification decodes the claimed digest and lets
//! the MAC compare it in constant time. The standard engine rejects
//! non-canonical encodings, so a claimed digest verifies exactly when it is
//! byte-for-byte the encoding the signer would produce.

use crate::{CryptoError, Result};
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// HMAC instance used for request digests
pub type HmacSha256 = Hmac<Sha256>;

/// Size of a raw HMAC-SHA256 output in bytes
pub const DIGEST_BYTE_SIZE: usize = 32;

fn keyed_mac(key: &[u8]) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(key).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

/// Compute the raw HMAC-SHA256 of `message` under `key`
pub fn digest(message: &[u8], key: &[u8]) -> Result<[u8; DIGEST_BYTE_SIZE]> {
    let mut mac = keyed_mac(key)?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().into())
}

/// Compute the base64-encoded digest a client sends in `Authorization`
pub fn sign(message: &[u8], key: &[u8]) -> Result<String> {
    Ok(general_purpose::STANDARD.encode(digest(message, key)?))
}

/// Decode a claimed base64 digest into raw bytes
pub fn decode_digest(claimed: &str) -> Result<[u8; DIGEST_BYTE_SIZE]> {
    let bytes = general_purpose::STANDARD.decode(claimed)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::DigestLength {
            expected: DIGEST_BYTE_SIZE,
            actual: bytes.len(),
        })
}

/// Check `claimed` against the digest of `message` under `key`.
///
/// Returns `false` for anything that is not the exact canonical encoding,
/// including surrounding whitespace, missing padding or a different case.
pub fn verify(message: &[u8], claimed: &str, key: &[u8]) -> bool {
    let Ok(expected) = decode_digest(claimed) else {
        return false;
    };
    let Ok(mut mac) = keyed_mac(key) else {
        return false;
    };
    mac.update(message);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    const MESSAGE: &[u8] = b"GET\n/\nSam\nSun, 06 Nov 1994 08:49:37 GMT";

    #[test]
    fn test_sign_matches_reference_vector() {
        // RFC 4231 test case 2
        let out = digest(b"what do ya want for nothing?", b"Jefe").unwrap();
        assert_eq!(
            out.iter().map(|b| format!("{:02x}", b)).collect::<String>(),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_verify_own_signature() {
        let digest = sign(MESSAGE, b"password").unwrap();
        assert_eq!(digest.len(), 44);
        assert!(verify(MESSAGE, &digest, b"password"));
    }

    #[test]
    fn test_verify_rejects_wrong_key() {
        let digest = sign(MESSAGE, b"password").unwrap();
        assert!(!verify(MESSAGE, &digest, b"passwordx"));
    }

    #[test]
    fn test_verify_rejects_other_message() {
        let digest = sign(MESSAGE, b"password").unwrap();
        assert!(!verify(b"GET\n/other\nSam\nSun, 06 Nov 1994 08:49:37 GMT", &digest, b"password"));
    }

    #[rstest]
    #[case::leading_space(|d: &str| format!(" {}", d))]
    #[case::trailing_newline(|d: &str| format!("{}\n", d))]
    #[case::no_padding(|d: &str| d.trim_end_matches('=').to_string())]
    #[case::lowercase(|d: &str| d.to_lowercase())]
    #[case::truncated(|d: &str| d[..20].to_string())]
    #[case::garbage(|_: &str| "xxx".to_string())]
    fn test_verify_is_exact(#[case] mangle: fn(&str) -> String) {
        let digest = sign(MESSAGE, b"password").unwrap();
        let mangled = mangle(&digest);
        assert_ne!(mangled, digest);
        assert!(!verify(MESSAGE, &mangled, b"password"));
    }

    #[test]
    fn test_decode_digest_length() {
        let short = general_purpose::STANDARD.encode([0u8; 16]);
        assert!(matches!(
            decode_digest(&short),
            Err(CryptoError::DigestLength { expected: 32, actual: 16 })
        ));
    }

    #[test]
    fn test_empty_key_is_accepted() {
        let digest = sign(MESSAGE, b"").unwrap();
        assert!(verify(MESSAGE, &digest, b""));
    }

    proptest! {
        #[test]
        fn prop_only_signer_output_verifies(
            message in proptest::collection::vec(any::<u8>(), 0..256),
            key in proptest::collection::vec(any::<u8>(), 0..64),
            other_key in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let digest = sign(&message, &key).unwrap();
            prop_assert!(verify(&message, &digest, &key));
            if other_key != key {
                prop_assert!(!verify(&message, &digest, &other_key));
            }
        }
    }
}
