use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::expr::{self, Array, ExprRef, Width};

use super::options::VaseOptions;
use super::store::ValueBundle;

/// A proposed constraint addition. `constraints` is appended to a copy
/// of the query's constraint set as one all-or-nothing group.
#[derive(Debug)]
pub struct Candidate {
    pub constraints: Vec<ExprRef>,
    pub family: Family,
}

/// The structural class of a candidate. Displays as the description
/// printed when a rewrite is applied.
#[derive(Clone, Debug, PartialEq)]
pub enum Family {
    ByteWiseEq { array: String, bytes: u32 },
    PackedEq { array: String, value: i64 },
    PairSumEq { first: String, second: String, value: i64 },
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::ByteWiseEq { array, bytes } => {
                write!(f, "[{}] bytes={} (array-bytes-eq)", array, bytes)
            }
            Family::PackedEq { array, value } => {
                write!(f, "[{}] as u32 == {}", array, value)
            }
            Family::PairSumEq { first, second, value } => {
                write!(f, "[{}]+[{}] as u32 == {}", first, second, value)
            }
        }
    }
}

/// First `max_values` distinct numeric observations across the whole
/// bundle, in bundle order. Variable names carry no weight: the
/// rewrite is value-driven.
pub fn limited_values(bundle: &ValueBundle, max_values: u32) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    if max_values == 0 {
        return values;
    }
    'vars: for (_name, observations) in &bundle.vars {
        for observed in observations {
            if !observed.is_numeric() {
                continue;
            }
            if seen.insert(observed.value.clone()) {
                values.push(observed.value.clone());
                if values.len() >= max_values as usize {
                    break 'vars;
                }
            }
        }
    }
    values
}

fn effective_bytes(width: u32, max_bytes: u32) -> u32 {
    let n = width.min(max_bytes);
    if n == 0 {
        4
    } else {
        n
    }
}

/// Little-endian 32-bit packing of the first `n_bytes` cells:
/// acc = OR_i zext8->32(read(a, i)) << 8i.
fn pack_u32_le(array: &Arc<Array>, n_bytes: u32) -> ExprRef {
    let n = match n_bytes {
        0 => 4,
        n => n.min(4),
    };
    let mut acc = expr::const32(0);
    for i in 0..n {
        let byte = expr::read_byte(array, i as u64);
        let mut ext = expr::zext(byte, Width::W32);
        if i > 0 {
            ext = expr::shl(ext, expr::const32(8 * i as u64));
        }
        acc = expr::or(acc, ext);
    }
    acc
}

/// Candidate constraint additions for one site, in trial-priority
/// order: per-byte equalities, then packed-32 equalities, then the
/// pair-sum shape when exactly two arrays are in play. Values that do
/// not parse as signed 64-bit decimals are skipped.
pub fn build_candidates(
    bundle: &ValueBundle,
    arrays: &[Arc<Array>],
    widths: &[u32],
    options: &VaseOptions,
) -> Vec<Candidate> {
    let values = limited_values(bundle, options.max_values);
    let mut candidates = Vec::new();

    // 1) Bytewise equality on each array (most precise)
    for raw in &values {
        let Ok(value) = raw.parse::<i64>() else { continue };
        for (array, width) in arrays.iter().zip(widths) {
            let n = effective_bytes(*width, options.max_bytes);
            let constraints = (0..n)
                .map(|i| {
                    let byte = ((value as u64) >> (8 * i)) & 0xff;
                    expr::eq(expr::read_byte(array, i as u64), expr::const8(byte))
                })
                .collect();
            candidates.push(Candidate {
                constraints,
                family: Family::ByteWiseEq {
                    array: array.name.clone(),
                    bytes: n,
                },
            });
        }
    }

    // 2) 32-bit equality on each array (faster to add)
    for raw in &values {
        let Ok(value) = raw.parse::<i64>() else { continue };
        for (array, width) in arrays.iter().zip(widths) {
            let n = effective_bytes(*width, options.max_bytes);
            let packed = pack_u32_le(array, n);
            candidates.push(Candidate {
                constraints: vec![expr::eq(packed, expr::const32(value as u64))],
                family: Family::PackedEq {
                    array: array.name.clone(),
                    value,
                },
            });
        }
    }

    // 3) Optional: sum of two arrays equals value
    if options.try_pairs && arrays.len() == 2 {
        for raw in &values {
            let Ok(value) = raw.parse::<i64>() else { continue };
            let n0 = effective_bytes(widths[0], options.max_bytes);
            let n1 = effective_bytes(widths[1], options.max_bytes);
            let sum = expr::add(pack_u32_le(&arrays[0], n0), pack_u32_le(&arrays[1], n1));
            candidates.push(Candidate {
                constraints: vec![expr::eq(sum, expr::const32(value as u64))],
                family: Family::PairSumEq {
                    first: arrays[0].name.clone(),
                    second: arrays[1].name.clone(),
                    value,
                },
            });
        }
    }

    candidates
}
