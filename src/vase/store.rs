// SPDX-FileCopyrightText: 2025 Ledger https://www.ledger.com - INSTITUT MINES TELECOM
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::options::VaseOptions;
use crate::{vase_message, vase_warning};

/// One concrete observation recorded at a branch site by a prior
/// instrumented run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedValue {
    /// Discriminant from the analyser; only `NUMERIC` feeds rewrites.
    #[serde(rename = "type")]
    pub vtype: i64,
    /// The serialised literal.
    pub value: String,
    /// Operator/context info from the analyser. Parsed and retained,
    /// not consulted by rewriting.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ops: Vec<String>,
}

impl ObservedValue {
    pub const NUMERIC: i64 = 0;

    pub fn is_numeric(&self) -> bool {
        self.vtype == Self::NUMERIC
    }
}

/// The observations recorded for one location, per variable name, in
/// map-input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueBundle {
    pub vars: Vec<(String, Vec<ObservedValue>)>,
}

/// location key -> value bundle
#[derive(Debug, Default)]
pub struct ValueStore {
    entries: HashMap<String, ValueBundle>,
}

impl ValueStore {
    pub fn new() -> Self {
        ValueStore {
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, key: &str, bundle: ValueBundle) {
        self.entries.insert(key.to_string(), bundle);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ValueBundle)> {
        self.entries.iter()
    }

    /// Exact key first; a `loc:N:branch:B` key falls back to its
    /// branchless form `loc:N`.
    pub fn lookup(&self, key: &str) -> Option<&ValueBundle> {
        if let Some(bundle) = self.entries.get(key) {
            return Some(bundle);
        }
        let pos = key.find(":branch:")?;
        self.entries.get(&key[..pos])
    }

    /// Parse a map file. Malformed entries are warned about and
    /// skipped; the load succeeds whenever the top level parses as an
    /// object. I/O and top-level parse failures leave no store behind.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ValueStore> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to open VASE map: {}", path.display()))?;
        let root: Value = serde_json::from_str(&text)
            .with_context(|| format!("JSON parse error in VASE map: {}", path.display()))?;
        let Value::Object(locations) = root else {
            return Err(anyhow!(
                "VASE map top level is not an object: {}",
                path.display()
            ));
        };

        let mut store = ValueStore::new();
        for (location, bundle_value) in locations {
            let Value::Object(vars) = bundle_value else {
                vase_warning!("Skipping non-object VASE entry at {}", location);
                continue;
            };
            let mut bundle = ValueBundle::default();
            for (var_name, list_value) in vars {
                let Value::Array(list) = list_value else {
                    vase_warning!(
                        "Skipping non-array VASE values at {} var {}",
                        location,
                        var_name
                    );
                    continue;
                };
                let mut observations = Vec::new();
                for item in &list {
                    match parse_observed(item) {
                        Some(observed) => observations.push(observed),
                        None => {
                            vase_warning!(
                                "Missing type or value in VASE entry at {} var {}",
                                location,
                                var_name
                            );
                        }
                    }
                }
                bundle.vars.push((var_name, observations));
            }
            store.entries.insert(location, bundle);
        }
        Ok(store)
    }
}

fn parse_observed(item: &Value) -> Option<ObservedValue> {
    serde_json::from_value(item.clone()).ok()
}

// ---- Process-wide store ----------------------------------------------------
//
// Loaded once, shared by every wrapper instance in the process. The
// mutex serialises configuration and (re)loads; queries grab their own
// `Arc` handle and read without further locking.

struct GlobalVase {
    options: VaseOptions,
    /// `ensure_loaded_once` already ran; options are frozen.
    attempted: bool,
    usable: bool,
    loaded_path: String,
    store: Arc<ValueStore>,
}

lazy_static::lazy_static! {
    static ref GLOBAL_VASE: Mutex<GlobalVase> = Mutex::new(GlobalVase {
        options: VaseOptions::default(),
        attempted: false,
        usable: false,
        loaded_path: String::new(),
        store: Arc::new(ValueStore::new()),
    });
}

/// Capture the option set the rewriter reads. Must happen before the
/// first query; later calls are ignored.
pub fn configure(options: VaseOptions) {
    let mut global = GLOBAL_VASE.lock().unwrap();
    if global.attempted {
        vase_warning!("VASE options ignored: map already initialised");
        return;
    }
    global.options = options;
}

/// First call loads the configured map (or permanently disables
/// rewriting when no path is configured). Subsequent calls are no-ops
/// regardless of outcome.
pub fn ensure_loaded_once() -> bool {
    let mut global = GLOBAL_VASE.lock().unwrap();
    if global.attempted {
        return global.usable;
    }
    global.attempted = true;
    let path = global.options.map_path.clone();
    if path.is_empty() {
        vase_warning!("VASE map not set (--vase-map), VASE rewrites disabled.");
        return false;
    }
    match ValueStore::load_from_file(&path) {
        Ok(store) => {
            vase_message!("Loaded VASE map '{}' with {} entries", path, store.len());
            global.store = Arc::new(store);
            global.loaded_path = path;
            global.usable = true;
            true
        }
        Err(err) => {
            vase_warning!("{:#}", err);
            false
        }
    }
}

/// Load or replace the process-wide map. Reloading the same path is a
/// no-op; a different path replaces the store atomically. On failure
/// the store is left empty.
pub fn load_map(path: &str) -> Result<usize> {
    let mut global = GLOBAL_VASE.lock().unwrap();
    if global.usable && global.loaded_path == path {
        return Ok(global.store.len());
    }
    global.attempted = true;
    match ValueStore::load_from_file(path) {
        Ok(store) => {
            let entries = store.len();
            vase_message!("Loaded VASE map '{}' with {} entries", path, entries);
            global.store = Arc::new(store);
            global.loaded_path = path.to_string();
            global.usable = true;
            Ok(entries)
        }
        Err(err) => {
            global.store = Arc::new(ValueStore::new());
            global.loaded_path.clear();
            global.usable = false;
            vase_warning!("{:#}", err);
            Err(err)
        }
    }
}

/// Snapshot of the current store and the captured options.
pub fn current() -> (Arc<ValueStore>, VaseOptions) {
    let global = GLOBAL_VASE.lock().unwrap();
    (global.store.clone(), global.options.clone())
}
