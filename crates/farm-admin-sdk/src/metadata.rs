// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! ink! ABI metadata: loading, call encoding and return-value decoding.
//!
//! Supports metadata versions 4 and 5 as emitted by `cargo contract build`
//! (`<contract>.json`). Only the parts this tool needs are read: the
//! contract name, the code hash under `source.hash`, the constructor and
//! message specs, and the portable type registry.
//!
//! # Example
//!
//! ```rust,no_run
//! use farm_admin_sdk::metadata::ContractMetadata;
//!
//! # fn example() -> farm_admin_sdk::error::AdminResult<()> {
//! let farm = ContractMetadata::load("artifacts/farm_contract.json")?;
//! println!("{} @ {}", farm.name(), farm.source_hash());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parity_scale_codec::{Compact, Decode};
use serde::Deserialize;
use serde_json::Value;

use crate::address::ChainAddress;
use crate::call::{ArgShape, Call, CallKind};
use crate::error::{AdminError, AdminResult};

// ---------------------------------------------------------------------------
// Raw JSON layout
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawMetadata {
    source: RawSource,
    contract: RawContract,
    spec: RawSpec,
    types: Vec<RawType>,
    version: Value,
}

#[derive(Deserialize)]
struct RawSource {
    hash: String,
}

#[derive(Deserialize)]
struct RawContract {
    name: String,
}

#[derive(Deserialize)]
struct RawSpec {
    constructors: Vec<RawCallSpec>,
    messages: Vec<RawCallSpec>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCallSpec {
    label: String,
    selector: String,
    #[serde(default)]
    args: Vec<RawArg>,
    #[serde(default)]
    payable: bool,
    return_type: Option<RawTypeRef>,
}

#[derive(Deserialize)]
struct RawArg {
    label: String,
    #[serde(rename = "type")]
    ty: RawTypeRef,
}

#[derive(Deserialize)]
struct RawTypeRef {
    #[serde(rename = "type")]
    ty: u32,
}

#[derive(Deserialize)]
struct RawType {
    id: u32,
    #[serde(rename = "type")]
    ty: TypeInfo,
}

#[derive(Debug, Deserialize)]
struct TypeInfo {
    #[serde(default)]
    path: Vec<String>,
    def: TypeDef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum TypeDef {
    Composite(CompositeDef),
    Variant(VariantDef),
    Sequence(ElementDef),
    Array(ArrayDef),
    Tuple(Vec<u32>),
    Primitive(Primitive),
    Compact(ElementDef),
    BitSequence(BitSequenceDef),
}

#[derive(Debug, Deserialize)]
struct BitSequenceDef {
    bit_store_type: u32,
    bit_order_type: u32,
}

#[derive(Debug, Deserialize)]
struct CompositeDef {
    #[serde(default)]
    fields: Vec<Field>,
}

#[derive(Debug, Deserialize)]
struct Field {
    name: Option<String>,
    #[serde(rename = "type")]
    ty: u32,
}

#[derive(Debug, Deserialize)]
struct VariantDef {
    #[serde(default)]
    variants: Vec<Variant>,
}

#[derive(Debug, Deserialize)]
struct Variant {
    name: String,
    #[serde(default)]
    fields: Vec<Field>,
    index: u8,
}

#[derive(Debug, Deserialize)]
struct ElementDef {
    #[serde(rename = "type")]
    ty: u32,
}

#[derive(Debug, Deserialize)]
struct ArrayDef {
    len: u32,
    #[serde(rename = "type")]
    ty: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Primitive {
    Bool,
    Char,
    Str,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    I8,
    I16,
    I32,
    I64,
    I128,
    I256,
}

// ---------------------------------------------------------------------------
// Public handle
// ---------------------------------------------------------------------------

/// The three contract kinds this tool talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    Farm,
    Psp22,
    WrappedNative,
}

impl ContractKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractKind::Farm => "farm",
            ContractKind::Psp22 => "psp22",
            ContractKind::WrappedNative => "wrapped-native",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub label: String,
    pub type_id: u32,
}

/// A constructor or message signature.
#[derive(Debug, Clone)]
pub struct CallSpec {
    pub label: String,
    pub selector: [u8; 4],
    pub args: Vec<ArgSpec>,
    pub payable: bool,
    pub return_type: Option<u32>,
}

/// Selector followed by the SCALE-encoded arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCall {
    pub selector: [u8; 4],
    pub data: Vec<u8>,
    pub payable: bool,
}

/// Parsed, immutable ABI description of one contract.
#[derive(Debug)]
pub struct ContractMetadata {
    name: String,
    source_hash: String,
    constructors: Vec<CallSpec>,
    messages: Vec<CallSpec>,
    types: HashMap<u32, TypeInfo>,
}

impl ContractMetadata {
    pub fn load(path: impl AsRef<Path>) -> AdminResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AdminError::MetadataNotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path).map_err(|e| AdminError::MetadataParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json(path, &json)
    }

    /// Parse metadata already read into memory. `path` is only used in errors.
    pub fn from_json(path: impl AsRef<Path>, json: &str) -> AdminResult<Self> {
        let path = path.as_ref().to_path_buf();
        let parse_err = |reason: String| AdminError::MetadataParseError {
            path: path.clone(),
            reason,
        };

        let raw: RawMetadata =
            serde_json::from_str(json).map_err(|e| parse_err(format!("not ink! metadata: {e}")))?;

        let version = match &raw.version {
            Value::String(s) => s.parse::<u32>().ok(),
            Value::Number(n) => n.as_u64().map(|v| v as u32),
            _ => None,
        };
        if !matches!(version, Some(4) | Some(5)) {
            return Err(parse_err(format!("unsupported metadata version {}", raw.version)));
        }

        let source_hash = parse_hash(&raw.source.hash)
            .map(|_| raw.source.hash.to_lowercase())
            .ok_or_else(|| parse_err(format!("bad source hash `{}`", raw.source.hash)))?;

        let convert = |specs: Vec<RawCallSpec>| -> AdminResult<Vec<CallSpec>> {
            specs
                .into_iter()
                .map(|s| {
                    let selector = parse_selector(&s.selector).ok_or_else(|| {
                        parse_err(format!("bad selector `{}` on `{}`", s.selector, s.label))
                    })?;
                    Ok(CallSpec {
                        selector,
                        args: s
                            .args
                            .into_iter()
                            .map(|a| ArgSpec {
                                label: a.label,
                                type_id: a.ty.ty,
                            })
                            .collect(),
                        payable: s.payable,
                        return_type: s.return_type.map(|r| r.ty),
                        label: s.label,
                    })
                })
                .collect()
        };

        let constructors = convert(raw.spec.constructors)?;
        let messages = convert(raw.spec.messages)?;
        let types = raw.types.into_iter().map(|t| (t.id, t.ty)).collect();

        Ok(Self {
            name: raw.contract.name,
            source_hash,
            constructors,
            messages,
            types,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `0x`-prefixed code hash the contract was built with.
    pub fn source_hash(&self) -> &str {
        &self.source_hash
    }

    pub fn source_hash_bytes(&self) -> [u8; 32] {
        // validated in from_json
        parse_hash(&self.source_hash).unwrap_or_default()
    }

    pub fn constructor(&self, label: &str) -> Option<&CallSpec> {
        self.constructors.iter().find(|c| c.label == label)
    }

    pub fn message(&self, label: &str) -> Option<&CallSpec> {
        self.messages.iter().find(|m| m.label == label)
    }

    /// Look up the spec for `call`, checking argument names and types.
    pub fn spec_for(&self, call: &Call) -> AdminResult<&CallSpec> {
        let kind = call.kind();
        let spec = match kind {
            CallKind::Constructor => self.constructor(call.label()),
            CallKind::Message => self.message(call.label()),
        };
        let unknown = || AdminError::UnknownCall {
            contract: self.name.clone(),
            kind: kind.as_str(),
            label: call.label().to_string(),
        };
        let spec = spec.ok_or_else(unknown)?;

        let args = call.args();
        if args.len() != spec.args.len() {
            return Err(unknown());
        }
        for ((name, arg), expected) in args.iter().zip(&spec.args) {
            if *name != expected.label || !self.shape_matches(expected.type_id, arg.shape()) {
                return Err(unknown());
            }
        }
        Ok(spec)
    }

    /// Encode `call` as `selector ‖ args`.
    pub fn encode(&self, call: &Call) -> AdminResult<EncodedCall> {
        let spec = self.spec_for(call)?;
        let mut data = spec.selector.to_vec();
        for (_, arg) in call.args() {
            arg.encode_to(&mut data);
        }
        Ok(EncodedCall {
            selector: spec.selector,
            data,
            payable: spec.payable,
        })
    }

    /// Decode the raw return bytes of message `label`.
    ///
    /// ink! wraps every message result in `Result<T, LangError>`; the outer
    /// `Ok` is unwrapped and a `LangError` becomes a [`AdminError::QueryError`].
    pub fn decode_return(&self, label: &str, bytes: &[u8], ss58_format: u16) -> AdminResult<Value> {
        let spec = self.message(label).ok_or_else(|| AdminError::UnknownCall {
            contract: self.name.clone(),
            kind: "message",
            label: label.to_string(),
        })?;
        let Some(ret) = spec.return_type else {
            return Ok(Value::Null);
        };

        let decoder = Decoder {
            meta: self,
            ss58_format,
        };
        let input = &mut &bytes[..];

        let value = match self.lang_result_inner(ret) {
            Some(inner) => match u8::decode(input).map_err(decode_err)? {
                0 => decoder.decode(inner, input)?,
                _ => {
                    let err = decoder.decode(self.lang_error_type(ret).unwrap_or(inner), input)?;
                    return Err(AdminError::QueryError(format!("ink! LangError: {err}")));
                }
            },
            None => decoder.decode(ret, input)?,
        };
        Ok(value)
    }

    fn ty(&self, id: u32) -> AdminResult<&TypeInfo> {
        self.types
            .get(&id)
            .ok_or_else(|| AdminError::QueryError(format!("type {id} missing from {}", self.name)))
    }

    /// If `id` is `Result<T, LangError>`, the type id of `T`.
    fn lang_result_inner(&self, id: u32) -> Option<u32> {
        let info = self.types.get(&id)?;
        if info.path.last().map(String::as_str) != Some("Result") {
            return None;
        }
        let TypeDef::Variant(v) = &info.def else {
            return None;
        };
        let err_ty = self.lang_error_type(id)?;
        let is_lang_error = self
            .types
            .get(&err_ty)
            .and_then(|t| t.path.last())
            .is_some_and(|last| last == "LangError");
        if !is_lang_error {
            return None;
        }
        v.variants
            .iter()
            .find(|v| v.name == "Ok")
            .and_then(|v| v.fields.first())
            .map(|f| f.ty)
    }

    fn lang_error_type(&self, id: u32) -> Option<u32> {
        let TypeDef::Variant(v) = &self.types.get(&id)?.def else {
            return None;
        };
        v.variants
            .iter()
            .find(|v| v.name == "Err")
            .and_then(|v| v.fields.first())
            .map(|f| f.ty)
    }

    /// Strip single-field composite wrappers (`AccountId`, `Balance` newtypes).
    fn resolve_transparent(&self, mut id: u32) -> Option<(u32, &TypeInfo)> {
        for _ in 0..8 {
            let info = self.types.get(&id)?;
            match &info.def {
                TypeDef::Composite(c) if c.fields.len() == 1 => id = c.fields[0].ty,
                _ => return Some((id, info)),
            }
        }
        None
    }

    fn shape_matches(&self, id: u32, shape: ArgShape) -> bool {
        if shape == ArgShape::Account {
            let named_account = self
                .types
                .get(&id)
                .and_then(|t| t.path.last())
                .is_some_and(|last| last == "AccountId");
            if named_account {
                return true;
            }
        }
        let Some((_, info)) = self.resolve_transparent(id) else {
            return false;
        };
        match (shape, &info.def) {
            (ArgShape::U64, TypeDef::Primitive(Primitive::U64)) => true,
            (ArgShape::U128, TypeDef::Primitive(Primitive::U128)) => true,
            (ArgShape::Account, TypeDef::Array(a)) => {
                a.len == 32
                    && matches!(
                        self.types.get(&a.ty).map(|t| &t.def),
                        Some(TypeDef::Primitive(Primitive::U8))
                    )
            }
            (ArgShape::Sequence(inner), TypeDef::Sequence(e)) => self.shape_matches(e.ty, *inner),
            _ => false,
        }
    }

    /// Types that encode to no bytes at all: `()`, empty structs, `[T; 0]`.
    fn is_zero_sized(&self, id: u32, depth: u8) -> bool {
        if depth > 8 {
            return false;
        }
        match self.types.get(&id).map(|t| &t.def) {
            Some(TypeDef::Tuple(ids)) => ids.iter().all(|t| self.is_zero_sized(*t, depth + 1)),
            Some(TypeDef::Composite(c)) => {
                c.fields.iter().all(|f| self.is_zero_sized(f.ty, depth + 1))
            }
            Some(TypeDef::Array(a)) => a.len == 0 || self.is_zero_sized(a.ty, depth + 1),
            _ => false,
        }
    }

    fn is_u8(&self, id: u32) -> bool {
        matches!(
            self.types.get(&id).map(|t| &t.def),
            Some(TypeDef::Primitive(Primitive::U8))
        )
    }
}

fn decode_err(e: parity_scale_codec::Error) -> AdminError {
    AdminError::QueryError(format!("cannot decode return value: {e}"))
}

fn parse_selector(s: &str) -> Option<[u8; 4]> {
    let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s)).ok()?;
    bytes.try_into().ok()
}

fn parse_hash(s: &str) -> Option<[u8; 32]> {
    let bytes = hex::decode(s.strip_prefix("0x")?).ok()?;
    bytes.try_into().ok()
}

// ---------------------------------------------------------------------------
// Registry-driven SCALE decoding
// ---------------------------------------------------------------------------

struct Decoder<'a> {
    meta: &'a ContractMetadata,
    ss58_format: u16,
}

impl Decoder<'_> {
    fn decode(&self, id: u32, input: &mut &[u8]) -> AdminResult<Value> {
        let info = self.meta.ty(id)?;

        if info.path.last().map(String::as_str) == Some("AccountId") {
            let raw = <[u8; 32]>::decode(input).map_err(decode_err)?;
            return Ok(Value::String(
                ChainAddress::from_account_id(raw, self.ss58_format).to_string(),
            ));
        }

        match &info.def {
            TypeDef::Primitive(p) => decode_primitive(*p, input),
            TypeDef::Compact(e) => {
                let integer = matches!(
                    self.meta.resolve_transparent(e.ty).map(|(_, t)| &t.def),
                    Some(TypeDef::Primitive(_))
                );
                if !integer {
                    return Err(AdminError::QueryError(format!(
                        "compact encoding of non-integer type {} is not supported",
                        e.ty
                    )));
                }
                let v = <Compact<u128>>::decode(input).map_err(decode_err)?.0;
                Ok(big_number(v))
            }
            TypeDef::Composite(c) => {
                if c.fields.is_empty() {
                    return Ok(Value::Null);
                }
                if c.fields.iter().all(|f| f.name.is_some()) {
                    let mut map = serde_json::Map::new();
                    for f in &c.fields {
                        let name = f.name.clone().unwrap_or_default();
                        map.insert(name, self.decode(f.ty, input)?);
                    }
                    return Ok(Value::Object(map));
                }
                if c.fields.len() == 1 {
                    return self.decode(c.fields[0].ty, input);
                }
                let items = c
                    .fields
                    .iter()
                    .map(|f| self.decode(f.ty, input))
                    .collect::<AdminResult<Vec<_>>>()?;
                Ok(Value::Array(items))
            }
            TypeDef::Variant(v) => {
                let index = u8::decode(input).map_err(decode_err)?;
                let variant = v.variants.iter().find(|v| v.index == index).ok_or_else(|| {
                    AdminError::QueryError(format!("variant index {index} not in type {id}"))
                })?;
                let body = match variant.fields.as_slice() {
                    [] => return Ok(Value::String(variant.name.clone())),
                    [single] if single.name.is_none() => self.decode(single.ty, input)?,
                    fields if fields.iter().all(|f| f.name.is_some()) => {
                        let mut map = serde_json::Map::new();
                        for f in fields {
                            map.insert(f.name.clone().unwrap_or_default(), self.decode(f.ty, input)?);
                        }
                        Value::Object(map)
                    }
                    fields => Value::Array(
                        fields
                            .iter()
                            .map(|f| self.decode(f.ty, input))
                            .collect::<AdminResult<Vec<_>>>()?,
                    ),
                };
                let mut map = serde_json::Map::new();
                map.insert(variant.name.clone(), body);
                Ok(Value::Object(map))
            }
            TypeDef::Sequence(e) => {
                let len = <Compact<u32>>::decode(input).map_err(decode_err)?.0 as usize;
                self.decode_items(e.ty, len, input)
            }
            TypeDef::Array(a) => self.decode_items(a.ty, a.len as usize, input),
            TypeDef::Tuple(ids) => {
                if ids.is_empty() {
                    return Ok(Value::Null);
                }
                let items = ids
                    .iter()
                    .map(|t| self.decode(*t, input))
                    .collect::<AdminResult<Vec<_>>>()?;
                Ok(Value::Array(items))
            }
            TypeDef::BitSequence(b) => Err(AdminError::QueryError(format!(
                "bit sequences are not supported (type {id}, store {}, order {})",
                b.bit_store_type, b.bit_order_type
            ))),
        }
    }

    fn decode_items(&self, elem: u32, len: usize, input: &mut &[u8]) -> AdminResult<Value> {
        if self.meta.is_u8(elem) {
            if input.len() < len {
                return Err(AdminError::QueryError("return value truncated".into()));
            }
            let data: &[u8] = *input;
            let (bytes, rest) = data.split_at(len);
            *input = rest;
            return Ok(Value::String(format!("0x{}", hex::encode(bytes))));
        }
        // every element of a non-empty type consumes at least one byte
        if len > input.len() {
            let what = if self.meta.is_zero_sized(elem, 0) {
                "zero-sized elements"
            } else {
                "elements"
            };
            return Err(AdminError::QueryError(format!(
                "sequence of {len} {what} exceeds the {} bytes left",
                input.len()
            )));
        }
        let items = (0..len)
            .map(|_| self.decode(elem, input))
            .collect::<AdminResult<Vec<_>>>()?;
        Ok(Value::Array(items))
    }
}

fn big_number(v: u128) -> Value {
    match u64::try_from(v) {
        Ok(small) => Value::from(small),
        Err(_) => Value::String(v.to_string()),
    }
}

fn decode_primitive(p: Primitive, input: &mut &[u8]) -> AdminResult<Value> {
    let v = match p {
        Primitive::Bool => Value::Bool(bool::decode(input).map_err(decode_err)?),
        Primitive::Char => {
            let c = u32::decode(input).map_err(decode_err)?;
            Value::String(char::from_u32(c).map(String::from).unwrap_or_default())
        }
        Primitive::Str => Value::String(String::decode(input).map_err(decode_err)?),
        Primitive::U8 => Value::from(u8::decode(input).map_err(decode_err)?),
        Primitive::U16 => Value::from(u16::decode(input).map_err(decode_err)?),
        Primitive::U32 => Value::from(u32::decode(input).map_err(decode_err)?),
        Primitive::U64 => Value::from(u64::decode(input).map_err(decode_err)?),
        Primitive::U128 => big_number(u128::decode(input).map_err(decode_err)?),
        Primitive::I8 => Value::from(i8::decode(input).map_err(decode_err)?),
        Primitive::I16 => Value::from(i16::decode(input).map_err(decode_err)?),
        Primitive::I32 => Value::from(i32::decode(input).map_err(decode_err)?),
        Primitive::I64 => Value::from(i64::decode(input).map_err(decode_err)?),
        Primitive::I128 => Value::String(i128::decode(input).map_err(decode_err)?.to_string()),
        Primitive::U256 | Primitive::I256 => {
            let raw = <[u8; 32]>::decode(input).map_err(decode_err)?;
            let mut be = raw;
            be.reverse();
            Value::String(format!("0x{}", hex::encode(be)))
        }
    };
    Ok(v)
}

// ---------------------------------------------------------------------------
// Per-invocation cache
// ---------------------------------------------------------------------------

/// Locations of the three metadata files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataPaths {
    pub farm: PathBuf,
    pub psp22: PathBuf,
    pub wrapped: PathBuf,
}

impl MetadataPaths {
    pub fn get(&self, kind: ContractKind) -> &Path {
        match kind {
            ContractKind::Farm => &self.farm,
            ContractKind::Psp22 => &self.psp22,
            ContractKind::WrappedNative => &self.wrapped,
        }
    }
}

/// Loads each contract kind's metadata at most once.
pub struct MetadataSet {
    paths: MetadataPaths,
    loaded: HashMap<ContractKind, Arc<ContractMetadata>>,
}

impl MetadataSet {
    pub fn new(paths: MetadataPaths) -> Self {
        Self {
            paths,
            loaded: HashMap::new(),
        }
    }

    pub fn get(&mut self, kind: ContractKind) -> AdminResult<Arc<ContractMetadata>> {
        if let Some(meta) = self.loaded.get(&kind) {
            return Ok(meta.clone());
        }
        let path = self.paths.get(kind);
        tracing::debug!(kind = kind.as_str(), path = %path.display(), "loading metadata");
        let meta = Arc::new(ContractMetadata::load(path)?);
        self.loaded.insert(kind, meta.clone());
        Ok(meta)
    }

    pub fn preload(&mut self, kinds: &[ContractKind]) -> AdminResult<()> {
        for kind in kinds {
            self.get(*kind)?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use parity_scale_codec::Encode;

    fn farm() -> ContractMetadata {
        ContractMetadata::from_json("farm.json", &fixtures::farm()).unwrap()
    }

    fn addr(b: u8) -> ChainAddress {
        ChainAddress::from_account_id([b; 32], 42)
    }

    #[test]
    fn exposes_name_and_hash() {
        let meta = farm();
        assert_eq!(meta.name(), "farm_contract");
        assert_eq!(meta.source_hash(), format!("0x{}", "ab".repeat(32)));
        assert_eq!(meta.source_hash_bytes(), [0xab; 32]);
        assert!(meta.message("view_farm_details").is_some());
        assert!(meta.message("deposit").is_none());
    }

    #[test]
    fn encodes_selector_then_args() {
        let meta = farm();
        let enc = meta
            .encode(&Call::FarmStart {
                start: 1,
                end: 2,
                rewards: vec![3],
            })
            .unwrap();
        assert_eq!(enc.selector, [0x11, 0x22, 0x33, 0x44]);
        let mut expected = vec![0x11, 0x22, 0x33, 0x44];
        1u64.encode_to(&mut expected);
        2u64.encode_to(&mut expected);
        vec![3u128].encode_to(&mut expected);
        assert_eq!(enc.data, expected);
        assert!(!enc.payable);
    }

    #[test]
    fn constructor_args_checked_against_account_type() {
        let meta = farm();
        let enc = meta
            .encode(&Call::FarmNew {
                pool_id: addr(1),
                reward_tokens: vec![addr(2)],
            })
            .unwrap();
        assert_eq!(&enc.data[..4], &[0x9b, 0xae, 0x9d, 0x5e]);
        assert_eq!(enc.data.len(), 4 + 32 + 1 + 32);
    }

    #[test]
    fn unknown_message_is_rejected() {
        let meta = farm();
        let err = meta.encode(&Call::WrappedDeposit).unwrap_err();
        assert!(matches!(err, AdminError::UnknownCall { .. }), "{err}");
    }

    #[test]
    fn mismatched_signature_is_rejected() {
        let json = fixtures::farm().replace(r#""label": "rewards""#, r#""label": "amounts""#);
        let meta = ContractMetadata::from_json("farm.json", &json).unwrap();
        let err = meta
            .encode(&Call::FarmStart {
                start: 1,
                end: 2,
                rewards: vec![],
            })
            .unwrap_err();
        assert!(matches!(err, AdminError::UnknownCall { .. }));
    }

    #[test]
    fn decodes_farm_details_through_registry() {
        let meta = farm();
        let mut bytes = vec![0u8]; // Ok
        [1u8; 32].encode_to(&mut bytes);
        10u64.encode_to(&mut bytes);
        20u64.encode_to(&mut bytes);
        vec![[2u8; 32]].encode_to(&mut bytes);
        vec![u128::MAX].encode_to(&mut bytes);

        let value = meta.decode_return("view_farm_details", &bytes, 42).unwrap();
        assert_eq!(value["pool_id"], addr(1).to_string());
        assert_eq!(value["start"], 10);
        assert_eq!(value["end"], 20);
        assert_eq!(value["reward_tokens"][0], addr(2).to_string());
        assert_eq!(value["reward_rates"][0], u128::MAX.to_string());
    }

    #[test]
    fn lang_error_becomes_query_error() {
        let meta = farm();
        let err = meta.decode_return("view_farm_details", &[1, 1], 42).unwrap_err();
        match err {
            AdminError::QueryError(msg) => assert!(msg.contains("CouldNotReadInput"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn nested_result_keeps_inner_variant() {
        let meta = farm();
        let value = meta.decode_return("owner_stop_farm", &[0, 1, 0], 42).unwrap();
        assert_eq!(value, serde_json::json!({"Err": "CallerNotOwner"}));
        let value = meta.decode_return("owner_stop_farm", &[0, 0], 42).unwrap();
        assert_eq!(value, serde_json::json!({"Ok": null}));
    }

    #[test]
    fn truncated_return_is_an_error() {
        let meta = farm();
        assert!(meta.decode_return("view_farm_details", &[0, 1, 2], 42).is_err());
    }

    #[test]
    fn rejects_old_and_malformed_documents() {
        let v3 = fixtures::farm().replace(r#""version": "4""#, r#""version": "3""#);
        assert!(matches!(
            ContractMetadata::from_json("x.json", &v3),
            Err(AdminError::MetadataParseError { .. })
        ));
        assert!(matches!(
            ContractMetadata::from_json("x.json", "{\"not\": \"metadata\"}"),
            Err(AdminError::MetadataParseError { .. })
        ));
        let bad_hash = fixtures::farm().replace(&"ab".repeat(32), "1234");
        assert!(ContractMetadata::from_json("x.json", &bad_hash).is_err());
    }

    #[test]
    fn numeric_version_five_is_accepted() {
        let meta = ContractMetadata::from_json("psp22.json", &fixtures::psp22()).unwrap();
        assert!(meta.message("PSP22::increase_allowance").is_some());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = ContractMetadata::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, AdminError::MetadataNotFound(_)));
    }

    #[test]
    fn set_loads_each_kind_once() {
        let dir = tempfile::tempdir().unwrap();
        let farm_path = dir.path().join("farm.json");
        std::fs::write(&farm_path, fixtures::farm()).unwrap();

        let mut set = MetadataSet::new(MetadataPaths {
            farm: farm_path.clone(),
            psp22: dir.path().join("missing.json"),
            wrapped: dir.path().join("missing.json"),
        });
        let a = set.get(ContractKind::Farm).unwrap();
        std::fs::remove_file(&farm_path).unwrap();
        let b = set.get(ContractKind::Farm).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        assert!(matches!(
            set.get(ContractKind::Psp22),
            Err(AdminError::MetadataNotFound(_))
        ));
        // a failed load is not cached
        std::fs::write(dir.path().join("missing.json"), fixtures::psp22()).unwrap();
        assert!(set.get(ContractKind::Psp22).is_ok());
    }

    /// Registry with a message returning `Vec<()>` and one returning `Vec<u64>`.
    fn sequences() -> ContractMetadata {
        let json = r#"{
            "source": {"hash": "0x0000000000000000000000000000000000000000000000000000000000000000"},
            "contract": {"name": "seq"},
            "spec": {"constructors": [], "messages": [
                {"label": "units", "selector": "0x00000001", "args": [], "returnType": {"type": 1}},
                {"label": "numbers", "selector": "0x00000002", "args": [], "returnType": {"type": 3}}
            ]},
            "types": [
                {"id": 0, "type": {"def": {"tuple": []}}},
                {"id": 1, "type": {"def": {"sequence": {"type": 0}}}},
                {"id": 2, "type": {"def": {"primitive": "u64"}}},
                {"id": 3, "type": {"def": {"sequence": {"type": 2}}}}
            ],
            "version": "4"
        }"#;
        ContractMetadata::from_json("seq.json", json).unwrap()
    }

    #[test]
    fn huge_sequence_of_units_fails_fast() {
        let meta = sequences();
        let mut bytes = Vec::new();
        Compact(u32::MAX).encode_to(&mut bytes);
        let err = meta.decode_return("units", &bytes, 42).unwrap_err();
        match err {
            AdminError::QueryError(msg) => assert!(msg.contains("zero-sized"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }

        let mut bytes = Vec::new();
        Compact(2u32).encode_to(&mut bytes);
        bytes.extend_from_slice(&[0, 0]);
        let value = meta.decode_return("units", &bytes, 42).unwrap();
        assert_eq!(value, serde_json::json!([null, null]));
    }

    #[test]
    fn sequence_longer_than_input_is_truncated() {
        let meta = sequences();
        let mut bytes = Vec::new();
        Compact(1_000u32).encode_to(&mut bytes);
        7u64.encode_to(&mut bytes);
        assert!(matches!(
            meta.decode_return("numbers", &bytes, 42),
            Err(AdminError::QueryError(_))
        ));
    }
}
