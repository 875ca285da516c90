//! Contract call envelopes handed to the external signer.
//!
//! An [Invocation] names the contract, the function and an ordered [ArgList].
//! The order and type of every argument must match the contract's Rust
//! signature exactly; [Invocation::new] and the decoder both enforce that.

use crate::codec::{bytes_encode_size, read_bytes, read_string, write_bytes, write_string};
use crate::error::{Error, Result};
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error as CodecError, Read, ReadExt, Write};
use serde::Serialize;
use std::fmt;

/// Maximum encoded length of an address or contract id.
pub const MAX_ADDRESS_LEN: usize = 128;

/// Maximum encoded length of a variable-length byte argument.
pub const MAX_BYTES_ARG_LEN: usize = 1024;

/// On-chain type of an argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgType {
    U32,
    U64,
    I128,
    Address,
    Bytes,
    BytesN32,
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArgType::U32 => "u32",
            ArgType::U64 => "u64",
            ArgType::I128 => "i128",
            ArgType::Address => "address",
            ArgType::Bytes => "bytes",
            ArgType::BytesN32 => "bytes_n32",
        })
    }
}

/// A single typed contract argument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Arg {
    U32(u32),
    U64(u64),
    I128(i128),
    Address(String),
    Bytes(#[serde(with = "hex::serde")] Vec<u8>),
    BytesN32(#[serde(with = "hex::serde")] [u8; 32]),
}

impl Arg {
    pub fn ty(&self) -> ArgType {
        match self {
            Arg::U32(_) => ArgType::U32,
            Arg::U64(_) => ArgType::U64,
            Arg::I128(_) => ArgType::I128,
            Arg::Address(_) => ArgType::Address,
            Arg::Bytes(_) => ArgType::Bytes,
            Arg::BytesN32(_) => ArgType::BytesN32,
        }
    }
}

/// Renders the value the way the stellar CLI expects it on the command line.
impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::U32(v) => write!(f, "{v}"),
            Arg::U64(v) => write!(f, "{v}"),
            Arg::I128(v) => write!(f, "{v}"),
            Arg::Address(v) => f.write_str(v),
            Arg::Bytes(v) => f.write_str(&hex::encode(v)),
            Arg::BytesN32(v) => f.write_str(&hex::encode(v)),
        }
    }
}

impl Write for Arg {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Arg::U32(v) => {
                0u8.write(writer);
                v.write(writer);
            }
            Arg::U64(v) => {
                1u8.write(writer);
                v.write(writer);
            }
            Arg::I128(v) => {
                2u8.write(writer);
                writer.put_i128(*v);
            }
            Arg::Address(v) => {
                3u8.write(writer);
                write_string(v, writer);
            }
            Arg::Bytes(v) => {
                4u8.write(writer);
                write_bytes(v, writer);
            }
            Arg::BytesN32(v) => {
                5u8.write(writer);
                writer.put_slice(v);
            }
        }
    }
}

impl Read for Arg {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> std::result::Result<Self, CodecError> {
        let kind = u8::read(reader)?;
        match kind {
            0 => Ok(Arg::U32(u32::read(reader)?)),
            1 => Ok(Arg::U64(u64::read(reader)?)),
            2 => {
                if reader.remaining() < 16 {
                    return Err(CodecError::EndOfBuffer);
                }
                Ok(Arg::I128(reader.get_i128()))
            }
            3 => Ok(Arg::Address(read_string(reader, MAX_ADDRESS_LEN)?)),
            4 => Ok(Arg::Bytes(read_bytes(reader, MAX_BYTES_ARG_LEN)?)),
            5 => {
                if reader.remaining() < 32 {
                    return Err(CodecError::EndOfBuffer);
                }
                let mut value = [0u8; 32];
                reader.copy_to_slice(&mut value);
                Ok(Arg::BytesN32(value))
            }
            _ => Err(CodecError::InvalidEnum(kind)),
        }
    }
}

impl EncodeSize for Arg {
    fn encode_size(&self) -> usize {
        1 + match self {
            Arg::U32(_) => 4,
            Arg::U64(_) => 8,
            Arg::I128(_) => 16,
            Arg::Address(v) => bytes_encode_size(v.as_bytes()),
            Arg::Bytes(v) => bytes_encode_size(v),
            Arg::BytesN32(_) => 32,
        }
    }
}

/// Ordered argument list for one contract call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ArgList(Vec<Arg>);

impl ArgList {
    pub fn as_slice(&self) -> &[Arg] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arg> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<Arg> {
        self.0
    }
}

impl From<Vec<Arg>> for ArgList {
    fn from(args: Vec<Arg>) -> Self {
        Self(args)
    }
}

impl<'a> IntoIterator for &'a ArgList {
    type Item = &'a Arg;
    type IntoIter = std::slice::Iter<'a, Arg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Contract functions the client invokes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Function {
    /// Token contract `approve(from, spender, amount, expiration_ledger)`.
    Approve = 0,
    /// Lottery contract `buy_ticket(round_id, participant, amount, commit_hash)`.
    BuyTicket = 1,
    /// Lottery contract `reveal_seed(round_id, participant, seed)`.
    RevealSeed = 2,
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::Approve => "approve",
            Function::BuyTicket => "buy_ticket",
            Function::RevealSeed => "reveal_seed",
        }
    }

    /// Parameter names and types in call order.
    pub fn params(self) -> &'static [(&'static str, ArgType)] {
        match self {
            Function::Approve => &[
                ("from", ArgType::Address),
                ("spender", ArgType::Address),
                ("amount", ArgType::I128),
                ("expiration_ledger", ArgType::U32),
            ],
            Function::BuyTicket => &[
                ("round_id", ArgType::U64),
                ("participant", ArgType::Address),
                ("amount", ArgType::I128),
                ("commit_hash", ArgType::BytesN32),
            ],
            Function::RevealSeed => &[
                ("round_id", ArgType::U64),
                ("participant", ArgType::Address),
                ("seed", ArgType::Bytes),
            ],
        }
    }

    fn matches(self, args: &[Arg]) -> bool {
        let params = self.params();
        params.len() == args.len()
            && params
                .iter()
                .zip(args)
                .all(|((_, ty), arg)| *ty == arg.ty())
    }
}

impl TryFrom<u8> for Function {
    type Error = ();

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Function::Approve),
            1 => Ok(Function::BuyTicket),
            2 => Ok(Function::RevealSeed),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully-typed, unsigned contract call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Invocation {
    contract_id: String,
    function: Function,
    args: ArgList,
}

impl Invocation {
    /// Assemble a call, checking arity and argument types against `function`.
    pub fn new(contract_id: impl Into<String>, function: Function, args: ArgList) -> Result<Self> {
        let contract_id = contract_id.into();
        if contract_id.is_empty() || contract_id.len() > MAX_ADDRESS_LEN {
            return Err(Error::validation(
                "contract_id",
                format!("length {} outside 1..={MAX_ADDRESS_LEN}", contract_id.len()),
            ));
        }
        if !function.matches(args.as_slice()) {
            return Err(Error::validation(
                "args",
                format!("do not match the {function} signature"),
            ));
        }
        // Same bounds the decoder applies
        for (&(name, _), arg) in function.params().iter().zip(args.iter()) {
            let (len, max) = match arg {
                Arg::Address(v) => (v.len(), MAX_ADDRESS_LEN),
                Arg::Bytes(v) => (v.len(), MAX_BYTES_ARG_LEN),
                _ => continue,
            };
            if len > max {
                return Err(Error::validation(
                    name,
                    format!("length {len} exceeds {max}"),
                ));
            }
        }
        Ok(Self {
            contract_id,
            function,
            args,
        })
    }

    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    pub fn function(&self) -> Function {
        self.function
    }

    pub fn args(&self) -> &ArgList {
        &self.args
    }

    /// Arguments paired with their parameter names.
    pub fn named_args(&self) -> impl Iterator<Item = (&'static str, &Arg)> {
        self.function
            .params()
            .iter()
            .map(|(name, _)| *name)
            .zip(self.args.iter())
    }
}

impl Write for Invocation {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.contract_id, writer);
        (self.function as u8).write(writer);
        (self.args.len() as u8).write(writer);
        for arg in &self.args {
            arg.write(writer);
        }
    }
}

impl Read for Invocation {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> std::result::Result<Self, CodecError> {
        let contract_id = read_string(reader, MAX_ADDRESS_LEN)?;
        let kind = u8::read(reader)?;
        let function = Function::try_from(kind).map_err(|_| CodecError::InvalidEnum(kind))?;
        let count = u8::read(reader)? as usize;
        if count != function.params().len() {
            return Err(CodecError::Invalid("Invocation", "arity mismatch"));
        }
        let mut args = Vec::with_capacity(count);
        for _ in 0..count {
            args.push(Arg::read(reader)?);
        }
        if !function.matches(&args) {
            return Err(CodecError::Invalid("Invocation", "argument type mismatch"));
        }
        if contract_id.is_empty() {
            return Err(CodecError::Invalid("Invocation", "empty contract id"));
        }
        Ok(Self {
            contract_id,
            function,
            args: ArgList(args),
        })
    }
}

impl EncodeSize for Invocation {
    fn encode_size(&self) -> usize {
        bytes_encode_size(self.contract_id.as_bytes())
            + 1
            + 1
            + self.args.iter().map(EncodeSize::encode_size).sum::<usize>()
    }
}
