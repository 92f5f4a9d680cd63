use std::sync::Arc;

use crate::expr::{walk, Array, Expr, ExprRef, ExprVisitor, Query};

struct ArrayFinder {
    roots: Vec<Arc<Array>>,
}

impl ExprVisitor for ArrayFinder {
    fn visit(&mut self, expr: &ExprRef) {
        if let Expr::Read { array, .. } = expr.as_ref() {
            if !self.roots.iter().any(|seen| Arc::ptr_eq(seen, array)) {
                self.roots.push(array.clone());
            }
        }
    }
}

/// Distinct arrays read anywhere in the query, constraints then goal,
/// in first-appearance order.
pub fn find_arrays(query: &Query) -> Vec<Arc<Array>> {
    let mut finder = ArrayFinder { roots: Vec::new() };
    for constraint in query.constraints.iter() {
        walk(&mut finder, constraint);
    }
    walk(&mut finder, &query.expr);
    finder.roots
}

struct IndexFinder<'a> {
    target: &'a Arc<Array>,
    max_index: u64,
    saw_any: bool,
}

impl ExprVisitor for IndexFinder<'_> {
    fn visit(&mut self, expr: &ExprRef) {
        let Expr::Read { array, index } = expr.as_ref() else {
            return;
        };
        if !Arc::ptr_eq(array, self.target) {
            return;
        }
        // Only constant indexes contribute to the width estimate.
        if let Expr::Const { value, .. } = index.as_ref() {
            if !self.saw_any || *value > self.max_index {
                self.max_index = *value;
            }
            self.saw_any = true;
        }
    }
}

/// 1 + the largest constant index at which `array` is read, clamped to
/// [1, 8]. Defaults to 4 when every read of the array is symbolic.
pub fn bytes_used(query: &Query, array: &Arc<Array>) -> u32 {
    let mut finder = IndexFinder {
        target: array,
        max_index: 0,
        saw_any: false,
    };
    for constraint in query.constraints.iter() {
        walk(&mut finder, constraint);
    }
    walk(&mut finder, &query.expr);

    if !finder.saw_any {
        return 4;
    }
    finder.max_index.saturating_add(1).clamp(1, 8) as u32
}
