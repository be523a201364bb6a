//! # Interface Descriptor
//!
//! The descriptor is the externally supplied schema of the deployed program: the
//! callable methods, their argument and return types, and the accounts each
//! instruction expects. It is loaded once at start-up and every [`call`] and
//! [`send`] is checked against it before anything goes on the wire.
//!
//! Instruction data uses the Anchor convention: an 8-byte discriminator
//! (`sha256("global:<instruction>")[..8]`) followed by the Borsh encoding of each
//! argument in declaration order.
//!
//! [`call`]: crate::client::Ledger::call
//! [`send`]: crate::client::Ledger::send

use crate::error::ConnectorError;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;
use std::{collections::HashSet, fmt, path::Path};

/// The descriptor of the FestManager program, used when no descriptor file is configured.
const FEST_MANAGER_JSON: &str = include_str!("../interface/fest_manager.json");

/// Method names of the FestManager program consumed by the connector.
pub mod methods {
    pub const EVENT_COUNT: &str = "eventCount";
    pub const GET_EVENT: &str = "getEvent";
    pub const CREATE_EVENT: &str = "createEvent";
    pub const REGISTER_FOR_EVENT: &str = "registerForEvent";
    pub const VOTE: &str = "vote";
    pub const MARK_PRESENT: &str = "markPresent";
}

/// The primitive types a descriptor may use for arguments and return values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    I64,
    String,
    Pubkey,
}

impl ValueType {
    /// The most bytes of this type that may be missing from the tail of return data.
    fn max_stripped_len(self) -> usize {
        match self {
            ValueType::Bool | ValueType::U8 => 1,
            ValueType::U16 => 2,
            ValueType::U32 | ValueType::String => 4,
            ValueType::U64 | ValueType::I64 => 8,
            ValueType::U128 => 16,
            ValueType::Pubkey => 32,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Bool => "bool",
            ValueType::U8 => "u8",
            ValueType::U16 => "u16",
            ValueType::U32 => "u32",
            ValueType::U64 => "u64",
            ValueType::U128 => "u128",
            ValueType::I64 => "i64",
            ValueType::String => "string",
            ValueType::Pubkey => "pubkey",
        };
        f.write_str(name)
    }
}

/// A dynamically typed argument or return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Uint(u128),
    Int(i64),
    Text(String),
    Pubkey(Pubkey),
}

impl Value {
    /// Coerces to `u64`, failing on a non-integer or a value that does not fit.
    pub fn as_u64(&self) -> Result<u64, ConnectorError> {
        match self {
            Value::Uint(v) => u64::try_from(*v).map_err(|_| {
                ConnectorError::Interface(format!("integer {v} does not fit in u64"))
            }),
            Value::Int(v) => u64::try_from(*v).map_err(|_| {
                ConnectorError::Interface(format!("integer {v} is negative"))
            }),
            other => Err(mismatch("integer", other)),
        }
    }

    pub fn as_str(&self) -> Result<&str, ConnectorError> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(mismatch("string", other)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, ConnectorError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch("bool", other)),
        }
    }

    pub fn as_pubkey(&self) -> Result<Pubkey, ConnectorError> {
        match self {
            Value::Pubkey(key) => Ok(*key),
            other => Err(mismatch("pubkey", other)),
        }
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint(v.into())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Pubkey> for Value {
    fn from(v: Pubkey) -> Self {
        Value::Pubkey(v)
    }
}

fn mismatch(expected: &str, got: &Value) -> ConnectorError {
    ConnectorError::Interface(format!("expected {expected}, got {got:?}"))
}

/// Whether a method reads state (simulated) or mutates it (signed and sent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    View,
    Mutation,
}

/// An account slot in an instruction's account list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    /// The program-derived state account.
    State,
    /// The signing identity (or the view payer for simulated calls).
    Signer,
    SystemProgram,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArgSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ValueType,
}

/// One callable method of the deployed program.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodSpec {
    /// The name callers use (e.g. `getEvent`).
    pub name: String,
    /// The on-chain instruction name the discriminator is derived from (e.g. `get_event`).
    pub instruction: String,
    pub kind: MethodKind,
    #[serde(default)]
    pub args: Vec<ArgSpec>,
    #[serde(default)]
    pub returns: Vec<ValueType>,
    pub accounts: Vec<AccountRole>,
}

impl MethodSpec {
    /// The 8-byte instruction discriminator.
    pub fn discriminator(&self) -> [u8; 8] {
        let hash = Sha256::digest(format!("global:{}", self.instruction).as_bytes());
        let mut out = [0u8; 8];
        out.copy_from_slice(&hash[..8]);
        out
    }

    /// Builds the instruction data for a call with `args`.
    pub fn encode_call(&self, args: &[Value]) -> Result<Vec<u8>, ConnectorError> {
        if args.len() != self.args.len() {
            return Err(ConnectorError::Interface(format!(
                "{} takes {} argument(s), got {}",
                self.name,
                self.args.len(),
                args.len()
            )));
        }

        let mut data = self.discriminator().to_vec();
        for (spec, value) in self.args.iter().zip(args) {
            encode_value(&mut data, spec.ty, value).map_err(|e| match e {
                ConnectorError::Interface(msg) => ConnectorError::Interface(format!(
                    "{}: argument '{}': {msg}",
                    self.name, spec.name
                )),
                other => other,
            })?;
        }
        Ok(data)
    }

    /// Decodes return data against the declared return types.
    pub fn decode_returns(&self, bytes: &[u8]) -> Result<Vec<Value>, ConnectorError> {
        // Trailing zero bytes are not carried in return data, so the tail is
        // zero-extended before decoding.
        let slack: usize = self.returns.iter().map(|ty| ty.max_stripped_len()).sum();
        let mut padded = bytes.to_vec();
        padded.resize(bytes.len() + slack, 0);

        let mut cursor = padded.as_slice();
        let mut values = Vec::with_capacity(self.returns.len());
        for ty in &self.returns {
            let value = decode_value(&mut cursor, *ty).map_err(|e| {
                ConnectorError::Interface(format!("{}: cannot decode {ty}: {e}", self.name))
            })?;
            values.push(value);
        }

        let consumed = padded.len() - cursor.len();
        if consumed < bytes.len() {
            return Err(ConnectorError::Interface(format!(
                "{}: {} unexpected trailing byte(s) in return data",
                self.name,
                bytes.len() - consumed
            )));
        }
        Ok(values)
    }
}

fn encode_value(out: &mut Vec<u8>, ty: ValueType, value: &Value) -> Result<(), ConnectorError> {
    let io = |e: std::io::Error| ConnectorError::Interface(e.to_string());
    match ty {
        ValueType::Bool => value.as_bool()?.serialize(out).map_err(io),
        ValueType::U8 => narrow::<u8>(value)?.serialize(out).map_err(io),
        ValueType::U16 => narrow::<u16>(value)?.serialize(out).map_err(io),
        ValueType::U32 => narrow::<u32>(value)?.serialize(out).map_err(io),
        ValueType::U64 => narrow::<u64>(value)?.serialize(out).map_err(io),
        ValueType::U128 => narrow::<u128>(value)?.serialize(out).map_err(io),
        ValueType::I64 => match value {
            Value::Int(v) => v.serialize(out).map_err(io),
            Value::Uint(v) => i64::try_from(*v)
                .map_err(|_| ConnectorError::Interface(format!("{v} does not fit in i64")))?
                .serialize(out)
                .map_err(io),
            other => Err(mismatch("integer", other)),
        },
        ValueType::String => value.as_str()?.to_string().serialize(out).map_err(io),
        ValueType::Pubkey => value.as_pubkey()?.to_bytes().serialize(out).map_err(io),
    }
}

fn narrow<T: TryFrom<u128>>(value: &Value) -> Result<T, ConnectorError> {
    match value {
        Value::Uint(v) => T::try_from(*v).map_err(|_| {
            ConnectorError::Interface(format!(
                "{v} does not fit in {}",
                std::any::type_name::<T>()
            ))
        }),
        other => Err(mismatch("unsigned integer", other)),
    }
}

fn decode_value(buf: &mut &[u8], ty: ValueType) -> std::io::Result<Value> {
    Ok(match ty {
        ValueType::Bool => Value::Bool(<bool as BorshDeserialize>::deserialize(buf)?),
        ValueType::U8 => Value::Uint(<u8 as BorshDeserialize>::deserialize(buf)?.into()),
        ValueType::U16 => Value::Uint(<u16 as BorshDeserialize>::deserialize(buf)?.into()),
        ValueType::U32 => Value::Uint(<u32 as BorshDeserialize>::deserialize(buf)?.into()),
        ValueType::U64 => Value::Uint(<u64 as BorshDeserialize>::deserialize(buf)?.into()),
        ValueType::U128 => Value::Uint(<u128 as BorshDeserialize>::deserialize(buf)?),
        ValueType::I64 => Value::Int(<i64 as BorshDeserialize>::deserialize(buf)?),
        ValueType::String => Value::Text(<String as BorshDeserialize>::deserialize(buf)?),
        ValueType::Pubkey => Value::Pubkey(Pubkey::new_from_array(
            <[u8; 32] as BorshDeserialize>::deserialize(buf)?,
        )),
    })
}

fn default_state_seed() -> String {
    "fest".to_string()
}

/// The full interface of the deployed program.
#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceDescriptor {
    /// Seed of the program-derived state account.
    #[serde(default = "default_state_seed")]
    pub state_seed: String,
    pub methods: Vec<MethodSpec>,
}

impl InterfaceDescriptor {
    /// The built-in FestManager descriptor.
    pub fn fest_manager() -> Result<Self, ConnectorError> {
        Self::from_json(FEST_MANAGER_JSON)
    }

    pub fn from_json(json: &str) -> Result<Self, ConnectorError> {
        let descriptor: InterfaceDescriptor = serde_json::from_str(json)
            .map_err(|e| ConnectorError::Interface(format!("malformed descriptor: {e}")))?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Reads and validates a descriptor file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConnectorError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ConnectorError::Interface(format!("cannot read descriptor {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), ConnectorError> {
        let mut seen = HashSet::new();
        for method in &self.methods {
            if !seen.insert(method.name.as_str()) {
                return Err(ConnectorError::Interface(format!(
                    "method '{}' is declared twice",
                    method.name
                )));
            }
            match method.kind {
                MethodKind::View if method.returns.is_empty() => {
                    return Err(ConnectorError::Interface(format!(
                        "view method '{}' declares no return types",
                        method.name
                    )));
                }
                MethodKind::Mutation if !method.returns.is_empty() => {
                    return Err(ConnectorError::Interface(format!(
                        "mutation '{}' cannot declare return types",
                        method.name
                    )));
                }
                _ => {}
            }
            if !method.accounts.contains(&AccountRole::Signer) {
                return Err(ConnectorError::Interface(format!(
                    "method '{}' has no signer account",
                    method.name
                )));
            }
        }
        Ok(())
    }

    /// Looks up a method by name.
    pub fn method(&self, name: &str) -> Result<&MethodSpec, ConnectorError> {
        self.methods
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| ConnectorError::Interface(format!("unknown method '{name}'")))
    }

    /// Looks up a method and checks it has the expected kind.
    pub fn method_of_kind(&self, name: &str, kind: MethodKind) -> Result<&MethodSpec, ConnectorError> {
        let method = self.method(name)?;
        if method.kind != kind {
            return Err(ConnectorError::Interface(format!(
                "method '{name}' is a {:?}, not a {kind:?}",
                method.kind
            )));
        }
        Ok(method)
    }

    /// The address of the program-derived state account.
    pub fn state_address(&self, program_id: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(&[self.state_seed.as_bytes()], program_id).0
    }
}
