pub mod ast;
pub mod query;
pub mod visitor;

pub use ast::{
    add, and, const32, const64, const8, const_, eq, ne, not, or, read, read_byte, shl, ult, zext,
    Array, Expr, ExprRef, Width,
};
pub use query::{ConstraintSet, Query};
pub use visitor::{walk, ExprVisitor};
