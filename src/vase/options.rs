// SPDX-FileCopyrightText: 2025 Ledger https://www.ledger.com - INSTITUT MINES TELECOM
//
// SPDX-License-Identifier: Apache-2.0

use crate::vase_warning;

/// Tunables for the rewriter, captured once at first map load. The
/// hosting engine decides whether to wrap its solver at all (its
/// `--use-vase-solver` switch); these options only shape the rewrites.
#[derive(Debug, Clone, PartialEq)]
pub struct VaseOptions {
    /// JSON file containing the observed-value map. Empty disables
    /// rewriting entirely.
    pub map_path: String,
    /// Max arrays from a query to consider per rewrite.
    pub max_arrays: u32,
    /// Max little-endian bytes per array when building equalities.
    pub max_bytes: u32,
    /// Max distinct limited values to try per site.
    pub max_values: u32,
    /// Try (arrA32 + arrB32) == value when exactly 2 arrays present.
    pub try_pairs: bool,
    /// Print when a rewrite is applied and what it was.
    pub verbose: bool,
}

impl Default for VaseOptions {
    fn default() -> Self {
        VaseOptions {
            map_path: String::new(),
            max_arrays: 4,
            max_bytes: 4,
            max_values: 4,
            try_pairs: true,
            verbose: true,
        }
    }
}

impl VaseOptions {
    /// Collect recognised `--vase-*` flags out of an argument list,
    /// leaving everything else for the hosting engine.
    pub fn from_args(args: &[String]) -> VaseOptions {
        let mut options = VaseOptions::default();
        for arg in args {
            options.apply_arg(arg);
        }
        options
    }

    /// Returns true when the flag was recognised.
    pub fn apply_arg(&mut self, arg: &str) -> bool {
        if let Some(path) = arg.strip_prefix("--vase-map=") {
            self.map_path = path.to_string();
        } else if let Some(raw) = arg.strip_prefix("--vase-max-arrays=") {
            self.max_arrays = parse_unsigned(raw, "--vase-max-arrays", self.max_arrays);
        } else if let Some(raw) = arg.strip_prefix("--vase-max-bytes=") {
            self.max_bytes = parse_unsigned(raw, "--vase-max-bytes", self.max_bytes);
        } else if let Some(raw) = arg.strip_prefix("--vase-max-values=") {
            self.max_values = parse_unsigned(raw, "--vase-max-values", self.max_values);
        } else if let Some(value) = parse_switch(arg, "--vase-try-pairs") {
            self.try_pairs = value;
        } else if let Some(value) = parse_switch(arg, "--vase-verbose") {
            self.verbose = value;
        } else {
            return false;
        }
        true
    }
}

fn parse_unsigned(raw: &str, flag: &str, fallback: u32) -> u32 {
    match raw.parse::<u32>() {
        Ok(value) => value,
        Err(_) => {
            vase_warning!("ignoring bad value '{}' for {}", raw, flag);
            fallback
        }
    }
}

/// `--flag` means true; `--flag=true/false` (or 1/0) is explicit.
fn parse_switch(arg: &str, flag: &str) -> Option<bool> {
    if arg == flag {
        return Some(true);
    }
    let raw = arg.strip_prefix(flag)?.strip_prefix('=')?;
    match raw {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => {
            vase_warning!("ignoring bad value '{}' for {}", raw, flag);
            None
        }
    }
}
