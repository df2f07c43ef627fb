//! # Identifiers and Identity Handles
//!
//! Newtype wrappers for every identifier the engine handles. You cannot pass
//! a `ProjectId` where a `MilestoneId` is expected, and an
//! [`IdentityHandle`] cannot exist unless it decodes to a well-formed
//! Ed25519 public key.
//!
//! ## Identity handle format
//!
//! ```text
//! did:key:z<base58btc(0xed 0x01 || public_key[32])>
//! ```
//!
//! The two-byte type tag is the Ed25519 public-key multicodec; the `z`
//! marks base58btc multibase. Every Ed25519 handle therefore begins with
//! `did:key:z6Mk`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{IdentityDefect, PccError, ValidationError};

/// Literal prefix of every identity handle.
pub const DID_KEY_PREFIX: &str = "did:key:z";

/// Ed25519 public-key type tag prepended before base58 encoding.
pub const ED25519_TYPE_TAG: [u8; 2] = [0xed, 0x01];

const PUBLIC_KEY_LEN: usize = 32;

macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// String identifiers supplied by the project registry
// ---------------------------------------------------------------------------

/// Identifier of a project milestone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MilestoneId(String);

impl_validating_deserialize!(MilestoneId);

impl MilestoneId {
    /// Create a milestone identifier. Must be non-empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.trim().is_empty() {
            return Err(ValidationError::EmptyIdentifier { kind: "milestone id" });
        }
        Ok(Self(s))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MilestoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an infrastructure project.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProjectId(String);

impl_validating_deserialize!(ProjectId);

impl ProjectId {
    /// Create a project identifier. Must be non-empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.trim().is_empty() {
            return Err(ValidationError::EmptyIdentifier { kind: "project id" });
        }
        Ok(Self(s))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier of a rotation assignment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssignmentId(pub Uuid);

impl AssignmentId {
    /// Generate a new random assignment identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AssignmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "assignment:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identity handles
// ---------------------------------------------------------------------------

/// A key-bound actor identifier (`did:key`, Ed25519).
///
/// Construction validates the full structure and keeps the decoded key, so
/// a value of this type always resolves. Serializes as the plain handle
/// string; deserialization re-validates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityHandle {
    handle: String,
    public_key: [u8; PUBLIC_KEY_LEN],
}

/// The result of resolving an identity handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    /// The raw Ed25519 public key.
    pub public_key: [u8; PUBLIC_KEY_LEN],
    /// DID URL naming the key: `<handle>#<multibase key>`.
    pub verification_method_id: String,
}

impl IdentityHandle {
    /// Derive the handle for a raw public key.
    ///
    /// Deterministic: the same key always yields the same handle.
    ///
    /// # Errors
    ///
    /// Returns [`PccError::MalformedIdentity`] if `public_key` is not
    /// 32 bytes.
    pub fn from_public_key(public_key: &[u8]) -> Result<Self, PccError> {
        let key: [u8; PUBLIC_KEY_LEN] = public_key.try_into().map_err(|_| {
            PccError::malformed_identity(
                "<unencoded public key>",
                IdentityDefect::WrongKeyLength(public_key.len()),
            )
        })?;
        Ok(Self::from_key_array(key))
    }

    /// Derive the handle for a fixed-size public key. Infallible.
    pub fn from_key_array(key: [u8; PUBLIC_KEY_LEN]) -> Self {
        let mut tagged = Vec::with_capacity(ED25519_TYPE_TAG.len() + PUBLIC_KEY_LEN);
        tagged.extend_from_slice(&ED25519_TYPE_TAG);
        tagged.extend_from_slice(&key);
        Self {
            handle: format!("{DID_KEY_PREFIX}{}", bs58::encode(&tagged).into_string()),
            public_key: key,
        }
    }

    /// Parse and validate a handle string.
    ///
    /// # Errors
    ///
    /// Returns [`PccError::MalformedIdentity`] for a wrong prefix, a
    /// non-base58 payload, a wrong type tag, or a key that is not 32 bytes.
    pub fn new(value: impl Into<String>) -> Result<Self, PccError> {
        let handle = value.into();
        let public_key = decode_handle(&handle)?;
        Ok(Self { handle, public_key })
    }

    /// Access the handle string.
    pub fn as_str(&self) -> &str {
        &self.handle
    }

    /// The Ed25519 public key bound to this handle.
    pub fn public_key_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    /// The verification method id naming this handle's key.
    pub fn verification_method_id(&self) -> String {
        let multibase = &self.handle["did:key:".len()..];
        format!("{}#{multibase}", self.handle)
    }

    /// Resolve into the public key and verification method id.
    pub fn resolve(&self) -> ResolvedIdentity {
        ResolvedIdentity {
            public_key: self.public_key,
            verification_method_id: self.verification_method_id(),
        }
    }
}

/// Resolve a handle string into its public key and verification method id.
///
/// This is the single point of identity validation: every verification path
/// obtains keys through it (or through [`IdentityHandle::new`], which shares
/// the same decoder).
pub fn resolve_identity_handle(handle: &str) -> Result<ResolvedIdentity, PccError> {
    Ok(IdentityHandle::new(handle)?.resolve())
}

fn decode_handle(handle: &str) -> Result<[u8; PUBLIC_KEY_LEN], PccError> {
    let payload = handle
        .strip_prefix(DID_KEY_PREFIX)
        .ok_or_else(|| PccError::malformed_identity(handle, IdentityDefect::WrongPrefix))?;

    let decoded = bs58::decode(payload).into_vec().map_err(|e| {
        PccError::malformed_identity(handle, IdentityDefect::InvalidEncoding(e.to_string()))
    })?;

    if decoded.len() < ED25519_TYPE_TAG.len() || decoded[..2] != ED25519_TYPE_TAG {
        let found: String = decoded.iter().take(2).map(|b| format!("{b:02x}")).collect();
        return Err(PccError::malformed_identity(
            handle,
            IdentityDefect::WrongTypeTag(format!("0x{found}")),
        ));
    }

    let key = &decoded[ED25519_TYPE_TAG.len()..];
    key.try_into()
        .map_err(|_| PccError::malformed_identity(handle, IdentityDefect::WrongKeyLength(key.len())))
}

impl Serialize for IdentityHandle {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.handle)
    }
}

impl_validating_deserialize!(IdentityHandle);

impl std::fmt::Display for IdentityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.handle)
    }
}

impl std::str::FromStr for IdentityHandle {
    type Err = PccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
