//! Serde adapter for `BTreeMap<Cell, V>`.
//!
//! JSON object keys must be strings, so cell-keyed maps are written as `[[cell, value], ...]`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::grid::Cell;

pub fn serialize<S, V>(map: &BTreeMap<Cell, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    serializer.collect_seq(map.iter())
}

pub fn deserialize<'de, D, V>(deserializer: D) -> Result<BTreeMap<Cell, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    let entries = Vec::<(Cell, V)>::deserialize(deserializer)?;
    Ok(entries.into_iter().collect())
}
