//! Ed25519 keys, addresses, signatures and operation identifiers.
//!
//! Every textual form is a prefix followed by base58check of
//! `varint(version) ‖ payload`:
//!
//! | Item          | Prefix       | Payload                          |
//! |---------------|--------------|----------------------------------|
//! | secret key    | `S`          | 32-byte Ed25519 seed             |
//! | public key    | `P`          | 32-byte Ed25519 public key       |
//! | address       | `AU` / `AS`  | blake3 of the versioned pubkey   |
//! | operation id  | `O`          | blake3 signing hash              |
//! | signature     | (none)       | 64-byte Ed25519 signature        |

use std::fmt;
use std::str::FromStr;

use chainwire_core::varint;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

use crate::error::KeyError;

/// Version byte carried by every key, address and id this crate emits.
pub const KEY_VERSION: u64 = 0;

const SECRET_PREFIX: &str = "S";
const PUBLIC_PREFIX: &str = "P";
const USER_PREFIX: &str = "AU";
const CONTRACT_PREFIX: &str = "AS";
const OPERATION_PREFIX: &str = "O";

fn encode_versioned(payload: &[u8]) -> String {
    let mut bytes = varint::encode_u64(KEY_VERSION);
    bytes.extend_from_slice(payload);
    bs58::encode(bytes).with_check().into_string()
}

/// Decode base58check and strip the version, returning a fixed-size payload.
fn decode_versioned<const N: usize>(encoded: &str) -> Result<[u8; N], KeyError> {
    let bytes = bs58::decode(encoded)
        .with_check(None)
        .into_vec()
        .map_err(|e| KeyError::InvalidEncoding {
            reason: e.to_string(),
        })?;
    let (version, offset) = varint::read_u64(&bytes, 0).map_err(|e| KeyError::Malformed {
        reason: e.to_string(),
    })?;
    if version != KEY_VERSION {
        return Err(KeyError::UnsupportedVersion { version });
    }
    let payload = &bytes[offset..];
    payload.try_into().map_err(|_| KeyError::InvalidLength {
        expected: N,
        got: payload.len(),
    })
}

fn strip_prefix<'a>(value: &'a str, prefix: &str) -> Result<&'a str, KeyError> {
    value.strip_prefix(prefix).ok_or_else(|| KeyError::InvalidPrefix {
        expected: prefix.to_string(),
        value: value.to_string(),
    })
}

// ─── Public key ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    pub fn from_raw(bytes: &[u8; 32]) -> Result<Self, KeyError> {
        VerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|e| KeyError::Malformed {
                reason: e.to_string(),
            })
    }

    /// Versioned bytes: `varint(version) ‖ 32-byte key`. This is what gets
    /// hashed into user addresses and into the signing preimage.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = varint::encode_u64(KEY_VERSION);
        out.extend_from_slice(self.0.as_bytes());
        out
    }

    pub fn as_raw(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Check `signature` over a 32-byte signing hash.
    pub fn verify(&self, hash: &[u8; 32], signature: &Signature) -> Result<(), KeyError> {
        self.0
            .verify(hash, &signature.0)
            .map_err(|e| KeyError::Malformed {
                reason: format!("signature verification failed: {e}"),
            })
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PUBLIC_PREFIX}{}", encode_versioned(self.0.as_bytes()))
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = decode_versioned::<32>(strip_prefix(s, PUBLIC_PREFIX)?)?;
        Self::from_raw(&raw)
    }
}

// ─── Signature ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature(ed25519_dalek::Signature);

impl Signature {
    pub fn from_raw(bytes: &[u8; 64]) -> Self {
        Self(ed25519_dalek::Signature::from_bytes(bytes))
    }

    pub fn to_raw(&self) -> [u8; 64] {
        self.0.to_bytes()
    }

    /// Versioned bytes: `varint(version) ‖ 64-byte signature`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = varint::encode_u64(KEY_VERSION);
        out.extend_from_slice(&self.0.to_bytes());
        out
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_versioned(&self.0.to_bytes()))
    }
}

impl FromStr for Signature {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_raw(&decode_versioned::<64>(s)?))
    }
}

// ─── Address ──────────────────────────────────────────────────────────────────

/// Whether an address belongs to a key holder or to a deployed contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    User,
    Contract,
}

impl AddressKind {
    fn category(self) -> u64 {
        match self {
            Self::User => 0,
            Self::Contract => 1,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::User => USER_PREFIX,
            Self::Contract => CONTRACT_PREFIX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    kind: AddressKind,
    hash: [u8; 32],
}

impl Address {
    pub fn user(hash: [u8; 32]) -> Self {
        Self {
            kind: AddressKind::User,
            hash,
        }
    }

    pub fn contract(hash: [u8; 32]) -> Self {
        Self {
            kind: AddressKind::Contract,
            hash,
        }
    }

    /// The user address owned by `public_key`.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self::user(*blake3::hash(&public_key.to_bytes()).as_bytes())
    }

    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    pub fn is_contract(&self) -> bool {
        self.kind == AddressKind::Contract
    }

    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Wire form: `varint(category) ‖ varint(version) ‖ 32-byte hash`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(34);
        varint::write_u64(&mut out, self.kind.category());
        varint::write_u64(&mut out, KEY_VERSION);
        out.extend_from_slice(&self.hash);
        out
    }

    /// Read the wire form at `offset`, returning the address and the offset
    /// past it.
    pub fn from_buffer(buffer: &[u8], offset: usize) -> Result<(Self, usize), KeyError> {
        let malformed = |e: chainwire_core::CodecError| KeyError::Malformed {
            reason: e.to_string(),
        };
        let (category, cursor) = varint::read_u64(buffer, offset).map_err(malformed)?;
        let kind = match category {
            0 => AddressKind::User,
            1 => AddressKind::Contract,
            other => {
                return Err(KeyError::Malformed {
                    reason: format!("unknown address category {other}"),
                })
            }
        };
        let (version, cursor) = varint::read_u64(buffer, cursor).map_err(malformed)?;
        if version != KEY_VERSION {
            return Err(KeyError::UnsupportedVersion { version });
        }
        let end = cursor + 32;
        let hash: [u8; 32] = buffer
            .get(cursor..end)
            .and_then(|s| s.try_into().ok())
            .ok_or(KeyError::InvalidLength {
                expected: 32,
                got: buffer.len().saturating_sub(cursor),
            })?;
        Ok((Self { kind, hash }, end))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), encode_versioned(&self.hash))
    }
}

impl FromStr for Address {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, rest) = if let Some(rest) = s.strip_prefix(USER_PREFIX) {
            (AddressKind::User, rest)
        } else if let Some(rest) = s.strip_prefix(CONTRACT_PREFIX) {
            (AddressKind::Contract, rest)
        } else {
            return Err(KeyError::InvalidPrefix {
                expected: format!("{USER_PREFIX} or {CONTRACT_PREFIX}"),
                value: s.to_string(),
            });
        };
        Ok(Self {
            kind,
            hash: decode_versioned::<32>(rest)?,
        })
    }
}

// ─── Operation id ─────────────────────────────────────────────────────────────

/// Content-addressed identifier of a signed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationId([u8; 32]);

impl OperationId {
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{OPERATION_PREFIX}{}", encode_versioned(&self.0))
    }
}

impl FromStr for OperationId {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(decode_versioned::<32>(strip_prefix(s, OPERATION_PREFIX)?)?))
    }
}

// ─── Key pair ─────────────────────────────────────────────────────────────────

/// A signing account: secret key plus its derived public key and address.
#[derive(Clone)]
pub struct KeyPair {
    signing: SigningKey,
    public: PublicKey,
    address: Address,
}

impl KeyPair {
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        let signing = SigningKey::from_bytes(secret);
        let public = PublicKey(signing.verifying_key());
        let address = Address::from_public_key(&public);
        Self {
            signing,
            public,
            address,
        }
    }

    /// Parse an `S...` secret key string.
    pub fn from_secret_str(secret: &str) -> Result<Self, KeyError> {
        let raw = decode_versioned::<32>(strip_prefix(secret, SECRET_PREFIX)?)?;
        Ok(Self::from_secret_bytes(&raw))
    }

    pub fn secret_key_string(&self) -> String {
        format!("{SECRET_PREFIX}{}", encode_versioned(self.signing.as_bytes()))
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Sign a 32-byte signing hash.
    pub fn sign(&self, hash: &[u8; 32]) -> Signature {
        Signature(self.signing.sign(hash))
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public.to_string())
            .field("address", &self.address.to_string())
            .finish_non_exhaustive()
    }
}
