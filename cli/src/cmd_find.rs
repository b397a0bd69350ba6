//! `stamperr find`: typed payload lookup.

use std::collections::BTreeMap;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;
use stamperr::{find_data, DataType, StampedError};

/// Payload shape to decode into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shape {
    Int,
    F32,
    F64,
    #[value(name = "string")]
    Str,
    IntList,
    F32List,
    F64List,
    #[value(name = "string-list")]
    StrList,
    IntMap,
    F32Map,
    F64Map,
    #[value(name = "string-map")]
    StrMap,
}

fn lookup<T>(err: &StampedError, kind: &str) -> Result<Option<Value>>
where
    T: DataType + Serialize,
{
    Ok(match find_data::<T>(err, kind) {
        Some(v) => Some(serde_json::to_value(v)?),
        None => None,
    })
}

/// The first `kind` payload decodable as `shape`, as JSON.
pub fn find(err: &StampedError, kind: &str, shape: Shape) -> Result<Option<Value>> {
    match shape {
        Shape::Int => lookup::<i64>(err, kind),
        Shape::F32 => lookup::<f32>(err, kind),
        Shape::F64 => lookup::<f64>(err, kind),
        Shape::Str => lookup::<String>(err, kind),
        Shape::IntList => lookup::<Vec<i64>>(err, kind),
        Shape::F32List => lookup::<Vec<f32>>(err, kind),
        Shape::F64List => lookup::<Vec<f64>>(err, kind),
        Shape::StrList => lookup::<Vec<String>>(err, kind),
        Shape::IntMap => lookup::<BTreeMap<String, i64>>(err, kind),
        Shape::F32Map => lookup::<BTreeMap<String, f32>>(err, kind),
        Shape::F64Map => lookup::<BTreeMap<String, f64>>(err, kind),
        Shape::StrMap => lookup::<BTreeMap<String, String>>(err, kind),
    }
}
