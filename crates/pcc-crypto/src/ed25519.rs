//! # Ed25519 Signing and Verification
//!
//! Key generation, signing, and verification for attestations, credential
//! proofs, and clearance certificates.
//!
//! ## Security Invariant
//!
//! - Private keys are never serialized or logged. [`KeyPair`] does not
//!   implement `Serialize` and its `Debug` output is redacted. Exported
//!   private key bytes are wrapped in [`Zeroizing`].
//! - Verification is total: any malformed input verifies as `false`.
//!   Verification uses the strict Ed25519 check, which rejects
//!   non-canonical `S` scalars and small-order keys.
//!
//! ## Serde
//!
//! Public keys and signatures serialize as lowercase hex strings.

use ed25519_dalek::Signer;
use pcc_core::{CanonicalBytes, IdentityHandle, PccError};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, Zeroizing};

use crate::hex;

/// Length of an Ed25519 private key seed.
pub const PRIVATE_KEY_LEN: usize = 32;

/// An Ed25519 public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

/// An Ed25519 signature (64 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; 64]);

/// An Ed25519 key pair.
pub struct KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey impls
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    /// Return the raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the public key as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse a public key from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, PccError> {
        hex::decode_array::<32>(hex)
            .map(Self)
            .map_err(|e| PccError::InvalidSignature(format!("public key: {e}")))
    }

    /// The identity handle bound to this key.
    pub fn identity_handle(&self) -> IdentityHandle {
        IdentityHandle::from_key_array(self.0)
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", hex::prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature impls
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    /// Return the raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Render the signature as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse a signature from a 128-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, PccError> {
        hex::decode_array::<64>(hex)
            .map(Self)
            .map_err(|e| PccError::InvalidSignature(format!("signature: {e}")))
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", hex::prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// KeyPair impls
// ---------------------------------------------------------------------------

impl KeyPair {
    /// Generate a fresh key pair from the operating system CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns [`PccError::KeyGeneration`] if the entropy source fails.
    /// The error is retryable.
    pub fn generate() -> Result<Self, PccError> {
        Self::generate_with(&mut rand::rngs::OsRng)
    }

    /// Generate a key pair from a caller-supplied CSPRNG.
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, PccError> {
        let mut seed = [0u8; PRIVATE_KEY_LEN];
        if let Err(e) = rng.try_fill_bytes(&mut seed) {
            tracing::warn!(error = %e, "entropy source failed during key generation");
            return Err(PccError::KeyGeneration(e.to_string()));
        }
        let signing_key = ed25519_dalek::SigningKey::from_bytes(&seed);
        seed.zeroize();
        Ok(Self { signing_key })
    }

    /// Rebuild a key pair from a stored private key.
    ///
    /// # Errors
    ///
    /// Returns [`PccError::KeyGeneration`] if `private_key` is not 32 bytes.
    pub fn from_private_key(private_key: &[u8]) -> Result<Self, PccError> {
        let seed: &[u8; PRIVATE_KEY_LEN] = private_key.try_into().map_err(|_| {
            PccError::KeyGeneration(format!(
                "private key must be {PRIVATE_KEY_LEN} bytes, got {}",
                private_key.len()
            ))
        })?;
        Ok(Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        })
    }

    /// Parse a hex-encoded private key.
    pub fn from_private_key_hex(hex: &str) -> Result<Self, PccError> {
        let bytes = Zeroizing::new(
            hex::decode(hex.trim()).map_err(|e| PccError::KeyGeneration(format!("private key: {e}")))?,
        );
        Self::from_private_key(&bytes)
    }

    /// The public half of the pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// The identity handle bound to this key pair.
    pub fn identity_handle(&self) -> IdentityHandle {
        self.public_key().identity_handle()
    }

    /// Export the private key. The returned buffer is wiped on drop.
    pub fn private_key_bytes(&self) -> Zeroizing<[u8; PRIVATE_KEY_LEN]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    /// Export the private key as hex, wiped on drop.
    pub fn private_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(&self.private_key_bytes()[..]))
    }

    /// Sign arbitrary bytes.
    pub fn sign(&self, data: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(data).to_bytes())
    }

    /// Sign canonical bytes.
    pub fn sign_canonical(&self, data: &CanonicalBytes) -> Ed25519Signature {
        self.sign(data.as_bytes())
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyPair(public={:?}, <private>)", self.public_key())
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Generate a fresh key pair. See [`KeyPair::generate`].
pub fn generate_key_pair() -> Result<KeyPair, PccError> {
    KeyPair::generate()
}

/// Rebuild a key pair from a stored private key. See
/// [`KeyPair::from_private_key`].
pub fn derive_from_private_key(private_key: &[u8]) -> Result<KeyPair, PccError> {
    KeyPair::from_private_key(private_key)
}

/// Derive the identity handle for a raw public key.
pub fn create_identity_handle(public_key: &[u8]) -> Result<IdentityHandle, PccError> {
    IdentityHandle::from_public_key(public_key)
}

/// Sign `data` with `key`.
pub fn sign(data: &[u8], key: &KeyPair) -> Ed25519Signature {
    key.sign(data)
}

/// Verify a raw signature over `data`.
///
/// Returns `false` for a wrong-length signature, an undecodable public key,
/// or a signature that does not verify. Never errors.
pub fn verify(data: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
    let Ok(sig_bytes) = <&[u8; 64]>::try_from(signature) else {
        return false;
    };
    let Ok(pk_bytes) = <&[u8; 32]>::try_from(public_key) else {
        return false;
    };
    let Ok(vk) = ed25519_dalek::VerifyingKey::from_bytes(pk_bytes) else {
        return false;
    };
    let sig = ed25519_dalek::Signature::from_bytes(sig_bytes);
    vk.verify_strict(data, &sig).is_ok()
}

/// Verify a hex-encoded signature over `data`.
pub fn verify_hex(data: &[u8], signature_hex: &str, public_key: &[u8]) -> bool {
    match hex::decode(signature_hex) {
        Ok(sig) => verify(data, &sig, public_key),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixed() -> KeyPair {
        KeyPair::from_private_key(&[42u8; 32]).unwrap()
    }

    #[test]
    fn generate_yields_distinct_keys() {
        let a = KeyPair::generate().unwrap();
        let b = KeyPair::generate().unwrap();
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let a = KeyPair::generate_with(&mut StdRng::seed_from_u64(7)).unwrap();
        let b = KeyPair::generate_with(&mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn derive_is_deterministic() {
        let a = fixed();
        let b = derive_from_private_key(&[42u8; 32]).unwrap();
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.identity_handle(), b.identity_handle());
        assert_eq!(a.sign(b"msg"), b.sign(b"msg"));
    }

    #[test]
    fn derive_rejects_wrong_length() {
        let err = derive_from_private_key(&[1u8; 31]).unwrap_err();
        assert!(matches!(err, PccError::KeyGeneration(_)));
        assert!(err.is_retryable());
        assert!(derive_from_private_key(&[]).is_err());
    }

    #[test]
    fn private_key_hex_roundtrip() {
        let kp = fixed();
        let hex = kp.private_key_hex();
        assert_eq!(hex.len(), 64);
        let back = KeyPair::from_private_key_hex(&hex).unwrap();
        assert_eq!(back.public_key(), kp.public_key());
        assert!(KeyPair::from_private_key_hex("xyz").is_err());
    }

    #[test]
    fn sign_and_verify() {
        let kp = fixed();
        let sig = sign(b"payload", &kp);
        assert!(verify(b"payload", sig.as_bytes(), kp.public_key().as_bytes()));
        assert!(verify_hex(b"payload", &sig.to_hex(), kp.public_key().as_bytes()));
    }

    #[test]
    fn verify_rejects_other_message_and_key() {
        let kp = fixed();
        let other = KeyPair::from_private_key(&[7u8; 32]).unwrap();
        let sig = kp.sign(b"original");
        assert!(!verify(b"tampered", sig.as_bytes(), kp.public_key().as_bytes()));
        assert!(!verify(b"original", sig.as_bytes(), other.public_key().as_bytes()));
    }

    #[test]
    fn verify_never_errors_on_garbage() {
        let kp = fixed();
        let pk = kp.public_key();
        assert!(!verify(b"x", &[0u8; 10], pk.as_bytes()));
        assert!(!verify(b"x", &[0u8; 64], &[0u8; 5]));
        assert!(!verify_hex(b"x", "not hex", pk.as_bytes()));
        assert!(!verify_hex(b"x", "", pk.as_bytes()));
    }

    #[test]
    fn canonical_signing_matches_raw() {
        let kp = fixed();
        let canonical = CanonicalBytes::new(&serde_json::json!({"b": 1, "a": 2})).unwrap();
        assert_eq!(kp.sign_canonical(&canonical), kp.sign(br#"{"a":2,"b":1}"#));
    }

    #[test]
    fn handle_matches_public_key() {
        let kp = fixed();
        let handle = kp.identity_handle();
        assert!(handle.as_str().starts_with("did:key:z6Mk"));
        assert_eq!(handle.public_key_bytes(), kp.public_key().as_bytes());
        assert_eq!(create_identity_handle(kp.public_key().as_bytes()).unwrap(), handle);
    }

    #[test]
    fn serde_is_hex() {
        let kp = fixed();
        let json = serde_json::to_string(&kp.public_key()).unwrap();
        assert_eq!(json.len(), 64 + 2);
        let back: Ed25519PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kp.public_key());

        let sig = kp.sign(b"m");
        let json = serde_json::to_string(&sig).unwrap();
        let back: Ed25519Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
        assert!(serde_json::from_str::<Ed25519Signature>("\"abcd\"").is_err());
    }

    #[test]
    fn debug_never_shows_private_key() {
        let kp = fixed();
        let debug = format!("{kp:?}");
        assert!(debug.contains("<private>"));
        assert!(!debug.contains(kp.private_key_hex().as_str()));
    }
}
