//! Operation model, canonical wire encoding and signing.
//!
//! Layout of the signed content, every integer an unsigned LEB128 varint:
//!
//! ```text
//! fee ‖ expire_period ‖ type ‖ payload
//!
//! Transaction  address(recipient) ‖ amount
//! RollBuy      count
//! RollSell     count
//! ExecuteSC    max_gas ‖ max_coins ‖ len ‖ bytecode ‖ n ‖ (klen ‖ key ‖ vlen ‖ value)*
//! CallSC       max_gas ‖ coins ‖ address(target) ‖ len ‖ function ‖ len ‖ parameter
//! ```

use chainwire_core::{varint, CodecError};

use crate::datastore::Datastore;
use crate::error::{KeyError, OperationError};
use crate::keys::{Address, KeyPair, OperationId, PublicKey, Signature};

/// Wire discriminant of each operation variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Transaction = 0,
    RollBuy = 1,
    RollSell = 2,
    ExecuteSmartContractBytecode = 3,
    CallSmartContractFunction = 4,
}

impl OperationType {
    pub fn id(self) -> u64 {
        self as u64
    }

    pub fn from_id(id: u64) -> Option<Self> {
        Some(match id {
            0 => Self::Transaction,
            1 => Self::RollBuy,
            2 => Self::RollSell,
            3 => Self::ExecuteSmartContractBytecode,
            4 => Self::CallSmartContractFunction,
            _ => return None,
        })
    }
}

/// Caller-supplied knobs shared by every operation. Absent values are
/// resolved against the network before encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationOptions {
    /// Fee in base units; defaults to the network's minimal fee.
    pub fee: Option<u64>,
    /// Periods the operation stays valid; defaults to the configured value.
    pub period_to_live: Option<u64>,
}

/// Variant-specific fields of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    Transaction {
        recipient: Address,
        amount: u64,
    },
    RollBuy {
        count: u64,
    },
    RollSell {
        count: u64,
    },
    ExecuteSmartContractBytecode {
        max_gas: u64,
        max_coins: u64,
        bytecode: Vec<u8>,
        datastore: Datastore,
    },
    CallSmartContractFunction {
        max_gas: u64,
        coins: u64,
        target: Address,
        function: String,
        parameter: Vec<u8>,
    },
}

impl OperationKind {
    pub fn operation_type(&self) -> OperationType {
        match self {
            Self::Transaction { .. } => OperationType::Transaction,
            Self::RollBuy { .. } => OperationType::RollBuy,
            Self::RollSell { .. } => OperationType::RollSell,
            Self::ExecuteSmartContractBytecode { .. } => OperationType::ExecuteSmartContractBytecode,
            Self::CallSmartContractFunction { .. } => OperationType::CallSmartContractFunction,
        }
    }
}

/// A fully resolved operation: every field the wire format needs is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDetails {
    pub fee: u64,
    pub expire_period: u64,
    pub kind: OperationKind,
}

fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    varint::write_u64(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

impl OperationDetails {
    pub fn operation_type(&self) -> OperationType {
        self.kind.operation_type()
    }

    /// Canonical bytes, the content that gets signed.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64);
        varint::write_u64(&mut out, self.fee);
        varint::write_u64(&mut out, self.expire_period);
        varint::write_u64(&mut out, self.operation_type().id());

        match &self.kind {
            OperationKind::Transaction { recipient, amount } => {
                out.extend_from_slice(&recipient.to_bytes());
                varint::write_u64(&mut out, *amount);
            }
            OperationKind::RollBuy { count } | OperationKind::RollSell { count } => {
                varint::write_u64(&mut out, *count);
            }
            OperationKind::ExecuteSmartContractBytecode {
                max_gas,
                max_coins,
                bytecode,
                datastore,
            } => {
                varint::write_u64(&mut out, *max_gas);
                varint::write_u64(&mut out, *max_coins);
                write_bytes(&mut out, bytecode);
                varint::write_u64(&mut out, datastore.len() as u64);
                for (key, value) in datastore.iter() {
                    write_bytes(&mut out, key);
                    write_bytes(&mut out, value);
                }
            }
            OperationKind::CallSmartContractFunction {
                max_gas,
                coins,
                target,
                function,
                parameter,
            } => {
                varint::write_u64(&mut out, *max_gas);
                varint::write_u64(&mut out, *coins);
                out.extend_from_slice(&target.to_bytes());
                write_bytes(&mut out, function.as_bytes());
                write_bytes(&mut out, parameter);
            }
        }
        out
    }

    /// Decode the canonical bytes. The whole buffer must be consumed.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, OperationError> {
        let mut reader = Reader { bytes, offset: 0 };
        let fee = reader.varint()?;
        let expire_period = reader.varint()?;
        let type_id = reader.varint()?;
        let operation_type = OperationType::from_id(type_id).ok_or_else(|| {
            OperationError::MalformedOperation {
                reason: format!("unknown operation type {type_id}"),
            }
        })?;

        let kind = match operation_type {
            OperationType::Transaction => OperationKind::Transaction {
                recipient: reader.address()?,
                amount: reader.varint()?,
            },
            OperationType::RollBuy => OperationKind::RollBuy {
                count: reader.varint()?,
            },
            OperationType::RollSell => OperationKind::RollSell {
                count: reader.varint()?,
            },
            OperationType::ExecuteSmartContractBytecode => {
                let max_gas = reader.varint()?;
                let max_coins = reader.varint()?;
                let bytecode = reader.bytes()?.to_vec();
                let entries = reader.varint()?;
                let mut datastore = Datastore::new();
                for _ in 0..entries {
                    let key = reader.bytes()?.to_vec();
                    let value = reader.bytes()?.to_vec();
                    datastore.insert(key, value)?;
                }
                OperationKind::ExecuteSmartContractBytecode {
                    max_gas,
                    max_coins,
                    bytecode,
                    datastore,
                }
            }
            OperationType::CallSmartContractFunction => {
                let max_gas = reader.varint()?;
                let coins = reader.varint()?;
                let target = reader.address()?;
                let start = reader.offset;
                let function = String::from_utf8(reader.bytes()?.to_vec())
                    .map_err(|_| CodecError::InvalidUtf8 { offset: start })?;
                let parameter = reader.bytes()?.to_vec();
                OperationKind::CallSmartContractFunction {
                    max_gas,
                    coins,
                    target,
                    function,
                    parameter,
                }
            }
        };

        if reader.offset != bytes.len() {
            return Err(OperationError::MalformedOperation {
                reason: format!("{} trailing bytes", bytes.len() - reader.offset),
            });
        }
        Ok(Self {
            fee,
            expire_period,
            kind,
        })
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn varint(&mut self) -> Result<u64, CodecError> {
        let (value, next) = varint::read_u64(self.bytes, self.offset)?;
        self.offset = next;
        Ok(value)
    }

    fn bytes(&mut self) -> Result<&'a [u8], CodecError> {
        let at = self.offset;
        let len = self.varint()?;
        let available = self.bytes.len() - self.offset;
        let len = usize::try_from(len)
            .ok()
            .filter(|len| *len <= available)
            .ok_or(CodecError::LengthPrefixOverflow {
                offset: at,
                declared: usize::try_from(len).unwrap_or(usize::MAX),
                available,
            })?;
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn address(&mut self) -> Result<Address, KeyError> {
        let (address, next) = Address::from_buffer(self.bytes, self.offset)?;
        self.offset = next;
        Ok(address)
    }
}

/// Preimage hashed for both the signature and the operation id:
/// `chain_id (u64 big-endian) ‖ versioned public key ‖ content`.
pub fn signing_hash(chain_id: u64, public_key: &PublicKey, content: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&chain_id.to_be_bytes());
    hasher.update(&public_key.to_bytes());
    hasher.update(content);
    *hasher.finalize().as_bytes()
}

/// An operation after signing. Immutable: any change to the fields requires
/// building and signing a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedOperation {
    details: OperationDetails,
    content: Vec<u8>,
    chain_id: u64,
    public_key: PublicKey,
    signature: Signature,
    id: OperationId,
}

impl SignedOperation {
    pub fn sign(details: OperationDetails, key: &KeyPair, chain_id: u64) -> Self {
        let content = details.serialize();
        let hash = signing_hash(chain_id, key.public_key(), &content);
        Self {
            details,
            content,
            chain_id,
            public_key: *key.public_key(),
            signature: key.sign(&hash),
            id: OperationId::from_hash(hash),
        }
    }

    pub fn details(&self) -> &OperationDetails {
        &self.details
    }

    /// Canonical bytes that were signed.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Locally computed identifier; equal inputs give equal ids.
    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn verify(&self) -> Result<(), KeyError> {
        let hash = signing_hash(self.chain_id, &self.public_key, &self.content);
        self.public_key.verify(&hash, &self.signature)
    }
}
