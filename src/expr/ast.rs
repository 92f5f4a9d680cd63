// SPDX-FileCopyrightText: 2025 Ledger https://www.ledger.com - INSTITUT MINES TELECOM
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::sync::Arc;

/// Bit widths the rewriter manipulates. `W1` is the boolean width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    W1,
    W8,
    W32,
    W64,
}

impl Width {
    pub fn bits(self) -> u32 {
        match self {
            Width::W1 => 1,
            Width::W8 => 8,
            Width::W32 => 32,
            Width::W64 => 64,
        }
    }

    pub fn mask(self) -> u64 {
        match self {
            Width::W1 => 0x1,
            Width::W8 => 0xff,
            Width::W32 => 0xffff_ffff,
            Width::W64 => u64::MAX,
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.bits())
    }
}

/// A symbolic byte array owned by the hosting engine. Identity is the
/// `Arc` allocation, never the name: two arrays may share a name and
/// still be distinct objects.
#[derive(Debug)]
pub struct Array {
    pub name: String,
    /// Number of 8-bit cells.
    pub size: u32,
}

impl Array {
    pub fn new(name: &str, size: u32) -> Arc<Array> {
        Arc::new(Array {
            name: name.to_string(),
            size,
        })
    }
}

pub type ExprRef = Arc<Expr>;

/// Expression tree over symbolic byte arrays. Reads produce 8-bit
/// values; comparison nodes produce `W1`.
#[derive(Debug)]
pub enum Expr {
    Const { value: u64, width: Width },
    Read { array: Arc<Array>, index: ExprRef },
    Eq(ExprRef, ExprRef),
    Ne(ExprRef, ExprRef),
    Ult(ExprRef, ExprRef),
    Not(ExprRef),
    And(ExprRef, ExprRef),
    Or(ExprRef, ExprRef),
    Add(ExprRef, ExprRef),
    Shl(ExprRef, ExprRef),
    ZExt { expr: ExprRef, width: Width },
}

impl Expr {
    pub fn width(&self) -> Width {
        match self {
            Expr::Const { width, .. } => *width,
            Expr::Read { .. } => Width::W8,
            Expr::Eq(..) | Expr::Ne(..) | Expr::Ult(..) | Expr::Not(..) => Width::W1,
            Expr::And(l, _) | Expr::Or(l, _) | Expr::Add(l, _) | Expr::Shl(l, _) => l.width(),
            Expr::ZExt { width, .. } => *width,
        }
    }
}

// Structural equivalence; arrays compare by identity.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Expr::Const { value: a, width: wa },
                Expr::Const { value: b, width: wb },
            ) => a == b && wa == wb,
            (
                Expr::Read { array: aa, index: ia },
                Expr::Read { array: ab, index: ib },
            ) => Arc::ptr_eq(aa, ab) && ia == ib,
            (Expr::Eq(la, ra), Expr::Eq(lb, rb))
            | (Expr::Ne(la, ra), Expr::Ne(lb, rb))
            | (Expr::Ult(la, ra), Expr::Ult(lb, rb))
            | (Expr::And(la, ra), Expr::And(lb, rb))
            | (Expr::Or(la, ra), Expr::Or(lb, rb))
            | (Expr::Add(la, ra), Expr::Add(lb, rb))
            | (Expr::Shl(la, ra), Expr::Shl(lb, rb)) => la == lb && ra == rb,
            (Expr::Not(a), Expr::Not(b)) => a == b,
            (
                Expr::ZExt { expr: ea, width: wa },
                Expr::ZExt { expr: eb, width: wb },
            ) => ea == eb && wa == wb,
            _ => false,
        }
    }
}

impl Eq for Expr {}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const { value, width } => write!(f, "0x{:x}:{}", value, width),
            Expr::Read { array, index } => write!(f, "(Read {} {})", array.name, index),
            Expr::Eq(l, r) => write!(f, "(Eq {} {})", l, r),
            Expr::Ne(l, r) => write!(f, "(Ne {} {})", l, r),
            Expr::Ult(l, r) => write!(f, "(Ult {} {})", l, r),
            Expr::Not(e) => write!(f, "(Not {})", e),
            Expr::And(l, r) => write!(f, "(And {} {})", l, r),
            Expr::Or(l, r) => write!(f, "(Or {} {})", l, r),
            Expr::Add(l, r) => write!(f, "(Add {} {})", l, r),
            Expr::Shl(l, r) => write!(f, "(Shl {} {})", l, r),
            Expr::ZExt { expr, width } => write!(f, "(ZExt {} {})", width, expr),
        }
    }
}

// Constructor helpers. Constants are masked to their width on entry so
// evaluation never sees out-of-range bits.

pub fn const_(value: u64, width: Width) -> ExprRef {
    Arc::new(Expr::Const {
        value: value & width.mask(),
        width,
    })
}

pub fn const8(value: u64) -> ExprRef {
    const_(value, Width::W8)
}

pub fn const32(value: u64) -> ExprRef {
    const_(value, Width::W32)
}

pub fn const64(value: u64) -> ExprRef {
    const_(value, Width::W64)
}

pub fn read(array: &Arc<Array>, index: ExprRef) -> ExprRef {
    Arc::new(Expr::Read {
        array: array.clone(),
        index,
    })
}

/// Read one cell at a constant index, the shape the rewriter emits.
pub fn read_byte(array: &Arc<Array>, index: u64) -> ExprRef {
    read(array, const32(index))
}

pub fn eq(l: ExprRef, r: ExprRef) -> ExprRef {
    Arc::new(Expr::Eq(l, r))
}

pub fn ne(l: ExprRef, r: ExprRef) -> ExprRef {
    Arc::new(Expr::Ne(l, r))
}

pub fn ult(l: ExprRef, r: ExprRef) -> ExprRef {
    Arc::new(Expr::Ult(l, r))
}

pub fn not(e: ExprRef) -> ExprRef {
    Arc::new(Expr::Not(e))
}

pub fn and(l: ExprRef, r: ExprRef) -> ExprRef {
    Arc::new(Expr::And(l, r))
}

pub fn or(l: ExprRef, r: ExprRef) -> ExprRef {
    Arc::new(Expr::Or(l, r))
}

pub fn add(l: ExprRef, r: ExprRef) -> ExprRef {
    Arc::new(Expr::Add(l, r))
}

pub fn shl(l: ExprRef, r: ExprRef) -> ExprRef {
    Arc::new(Expr::Shl(l, r))
}

pub fn zext(e: ExprRef, width: Width) -> ExprRef {
    Arc::new(Expr::ZExt { expr: e, width })
}
