//! Currency table built from the exchange's config arrays
//!
//! `GET /conf/pub:list:currency,pub:map:currency:sym,...` returns six parallel
//! arrays. [`merge_currency_lists`] folds them into one record per currency.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Config keys, in the order [`merge_currency_lists`] expects them
pub const CURRENCY_CONFIG_KEYS: [&str; 6] = [
    "pub:list:currency",
    "pub:map:currency:sym",
    "pub:map:currency:label",
    "pub:map:currency:pool",
    "pub:map:currency:explorer",
    "pub:map:currency:tx:fee",
];

/// One merged currency entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRecord {
    /// Exchange currency code (e.g., "UST")
    pub key: String,
    /// Label if one exists, else the symbol, else the code
    pub name: String,
    /// Pool this currency belongs to, if any
    pub pool: Option<String>,
    /// Block explorer URLs, possibly inherited from the pool
    pub explorers: Vec<String>,
    /// Display symbol (e.g., "USDT" for "UST"); the code when unmapped
    pub symbol: String,
    /// Wallet fee info, empty when unmapped
    pub wallet_fx: Vec<Value>,
}

impl CurrencyRecord {
    /// Positional form: `[key, name, pool, explorers, symbol, walletFx]`
    pub fn into_row(self) -> Value {
        Value::Array(vec![
            Value::String(self.key),
            Value::String(self.name),
            self.pool.map(Value::String).unwrap_or(Value::Null),
            Value::Array(self.explorers.into_iter().map(Value::String).collect()),
            Value::String(self.symbol),
            Value::Array(self.wallet_fx),
        ])
    }
}

/// Result of merging the config arrays
#[derive(Debug, Clone, PartialEq)]
pub enum CurrencyListing {
    /// Six arrays were present and merged
    Merged(Vec<CurrencyRecord>),
    /// Input was not a six-element array; returned as received
    Unchanged(Value),
}

impl CurrencyListing {
    /// Merged records, if the input was well formed
    pub fn records(&self) -> Option<&[CurrencyRecord]> {
        match self {
            Self::Merged(records) => Some(records),
            Self::Unchanged(_) => None,
        }
    }

    /// Look up one currency by code
    pub fn get(&self, key: &str) -> Option<&CurrencyRecord> {
        self.records()?.iter().find(|r| r.key == key)
    }
}

fn key_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Normalize a config array into an ordered key -> value map
///
/// A bare entry maps to itself; a `[key, value]` pair maps key to value.
/// Anything that is not an array yields an empty map.
pub fn transform_arr_to_obj(arr: &Value) -> IndexMap<String, Value> {
    let mut obj = IndexMap::new();
    let Some(entries) = arr.as_array() else {
        return obj;
    };

    for entry in entries {
        match entry {
            Value::Array(pair) => {
                let Some(key) = pair.first().and_then(key_string) else {
                    continue;
                };
                let value = pair.get(1).cloned().unwrap_or_else(|| Value::String(key.clone()));
                obj.insert(key, value);
            }
            scalar => {
                if let Some(key) = key_string(scalar) {
                    obj.insert(key, scalar.clone());
                }
            }
        }
    }

    obj
}

fn explorer_urls(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn display_string(value: &Value, fallback: &str) -> String {
    key_string(value).unwrap_or_else(|| fallback.to_string())
}

/// Merge the six currency config arrays into one table
///
/// Input order is `[listed, symbol, label, pool, explorer, walletFx]`.
/// Names resolve label over symbol over listed. A pooled currency with no
/// explorer of its own (missing or null) takes its pool's explorer; this is
/// one level deep and reads only explorers present in the input. Output keeps
/// the first-seen order of listed, then symbol, then label keys.
pub fn merge_currency_lists(data: Value) -> CurrencyListing {
    let lists = match data {
        Value::Array(lists) if lists.len() == 6 => lists,
        other => return CurrencyListing::Unchanged(other),
    };

    let listed = transform_arr_to_obj(&lists[0]);
    let symbols = transform_arr_to_obj(&lists[1]);
    let labels = transform_arr_to_obj(&lists[2]);
    let pools = transform_arr_to_obj(&lists[3]);
    let direct_explorers = transform_arr_to_obj(&lists[4]);
    let wallet_fx = transform_arr_to_obj(&lists[5]);

    let mut names = listed;
    names.extend(symbols.iter().map(|(k, v)| (k.clone(), v.clone())));
    names.extend(labels.into_iter());

    let mut explorers = direct_explorers.clone();
    for (key, pool) in &pools {
        if explorers.get(key).is_some_and(|v| !v.is_null()) {
            continue;
        }
        let Some(pool_key) = key_string(pool) else {
            continue;
        };
        if let Some(inherited) = direct_explorers.get(&pool_key).filter(|v| !v.is_null()) {
            explorers.insert(key.clone(), inherited.clone());
        }
    }

    let records = names
        .into_iter()
        .map(|(key, name)| CurrencyRecord {
            name: display_string(&name, &key),
            pool: pools.get(&key).and_then(key_string),
            explorers: explorer_urls(explorers.get(&key)),
            symbol: symbols
                .get(&key)
                .map(|s| display_string(s, &key))
                .unwrap_or_else(|| key.clone()),
            wallet_fx: match wallet_fx.get(&key) {
                Some(Value::Array(items)) => items.clone(),
                Some(Value::Null) | None => Vec::new(),
                Some(other) => vec![other.clone()],
            },
            key,
        })
        .collect();

    CurrencyListing::Merged(records)
}
