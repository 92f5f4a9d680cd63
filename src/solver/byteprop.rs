use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::expr::{const_, Array, Expr, ExprRef, Query};

use super::interface::{Assignment, SolverError, SolverImpl, SolverRunStatus, Validity};

/// One byte cell of one array. Arrays are told apart by allocation
/// identity, matching how the rest of the crate treats them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Cell {
    array: usize,
    index: u64,
}

impl Cell {
    fn of(array: &Arc<Array>, index: u64) -> Cell {
        Cell {
            array: Arc::as_ptr(array) as usize,
            index,
        }
    }
}

/// Deterministic reference backend built on byte-cell propagation.
///
/// Equalities that pin individual cells (directly, or through a
/// little-endian packing of constant-indexed reads) are propagated;
/// a pinned cell that collides with another pin, with an exclusion, or
/// with a constraint that folds to false makes the query infeasible.
/// Everything the propagation cannot settle is answered `Unknown`.
/// Value and assignment queries concretise unpinned cells to zero.
pub struct BytePropSolver;

impl BytePropSolver {
    pub fn new() -> Self {
        BytePropSolver
    }
}

impl Default for BytePropSolver {
    fn default() -> Self {
        BytePropSolver::new()
    }
}

#[derive(Default)]
struct Model {
    forced: HashMap<Cell, u8>,
    excluded: HashMap<Cell, Vec<u8>>,
    infeasible: bool,
}

fn as_const(e: &ExprRef) -> Option<u64> {
    match e.as_ref() {
        Expr::Const { value, .. } => Some(*value),
        _ => None,
    }
}

fn as_byte_read(e: &ExprRef) -> Option<Cell> {
    match e.as_ref() {
        Expr::Read { array, index } => as_const(index).map(|i| Cell::of(array, i)),
        _ => None,
    }
}

/// Collect the `(cell, shift)` terms of a little-endian packing:
/// Or/Shl/ZExt over constant-indexed reads, with constant-zero seeds.
/// Returns false when the shape is anything else.
fn collect_packing(e: &ExprRef, shift: u32, out: &mut Vec<(Cell, u32)>) -> bool {
    match e.as_ref() {
        Expr::Const { value: 0, .. } => true,
        Expr::Or(l, r) => collect_packing(l, shift, out) && collect_packing(r, shift, out),
        Expr::Shl(inner, amount) => match as_const(amount) {
            Some(s) if s < 64 => collect_packing(inner, shift + s as u32, out),
            _ => false,
        },
        Expr::ZExt { expr: inner, .. } => collect_packing(inner, shift, out),
        Expr::Read { array, index } => match as_const(index) {
            Some(i) => {
                out.push((Cell::of(array, i), shift));
                true
            }
            None => false,
        },
        _ => false,
    }
}

impl Model {
    fn force(&mut self, cell: Cell, value: u8) {
        match self.forced.insert(cell, value) {
            Some(prev) if prev != value => self.infeasible = true,
            _ => {}
        }
    }

    fn exclude(&mut self, cell: Cell, value: u8) {
        self.excluded.entry(cell).or_default().push(value);
    }

    /// An equality `packed == v` pins every covered cell. Bits of `v`
    /// outside the covered cells make the constraint unsatisfiable.
    fn absorb_eq(&mut self, packed: &ExprRef, value: u64) {
        let mut terms = Vec::new();
        if !collect_packing(packed, 0, &mut terms) {
            return;
        }
        let mut covered = 0u64;
        for (_, shift) in &terms {
            if shift % 8 != 0 || *shift >= 64 {
                return;
            }
            let lane = 0xffu64 << shift;
            if covered & lane != 0 {
                return;
            }
            covered |= lane;
        }
        if value & !covered != 0 {
            self.infeasible = true;
            return;
        }
        for (cell, shift) in terms {
            self.force(cell, ((value >> shift) & 0xff) as u8);
        }
    }

    fn absorb_constraint(&mut self, constraint: &ExprRef) {
        match constraint.as_ref() {
            Expr::Eq(l, r) => {
                if let Some(v) = as_const(r) {
                    self.absorb_eq(l, v);
                } else if let Some(v) = as_const(l) {
                    self.absorb_eq(r, v);
                }
            }
            Expr::Ne(l, r) => self.absorb_disequality(l, r),
            Expr::Not(inner) => {
                if let Expr::Eq(l, r) = inner.as_ref() {
                    self.absorb_disequality(l, r);
                }
            }
            _ => {}
        }
    }

    fn absorb_disequality(&mut self, l: &ExprRef, r: &ExprRef) {
        let (read, value) = match (as_byte_read(l), as_const(r), as_byte_read(r), as_const(l)) {
            (Some(cell), Some(v), _, _) => (cell, v),
            (_, _, Some(cell), Some(v)) => (cell, v),
            _ => return,
        };
        if value <= 0xff {
            self.exclude(read, value as u8);
        }
    }
}

fn build_model(query: &Query) -> Model {
    let mut model = Model::default();
    for c in query.constraints.iter() {
        model.absorb_constraint(c);
    }
    let pinned_vs_excluded = model.forced.iter().any(|(cell, value)| {
        model
            .excluded
            .get(cell)
            .map_or(false, |banned| banned.contains(value))
    });
    if pinned_vs_excluded {
        model.infeasible = true;
    }
    if !model.infeasible {
        for c in query.constraints.iter() {
            if eval(c, &model.forced, false) == Some(0) {
                model.infeasible = true;
                break;
            }
        }
    }
    model
}

/// Evaluate an expression under the pinned cells. Strict mode returns
/// `None` on any unpinned cell; otherwise unpinned cells read as zero.
/// Booleans evaluate to 0 or 1.
fn eval(e: &ExprRef, forced: &HashMap<Cell, u8>, default_zero: bool) -> Option<u64> {
    match e.as_ref() {
        Expr::Const { value, .. } => Some(*value),
        Expr::Read { array, index } => {
            let i = eval(index, forced, default_zero)?;
            match forced.get(&Cell::of(array, i)) {
                Some(v) => Some(*v as u64),
                None if default_zero => Some(0),
                None => None,
            }
        }
        Expr::Eq(l, r) => {
            let lv = eval(l, forced, default_zero)?;
            let rv = eval(r, forced, default_zero)?;
            Some((lv == rv) as u64)
        }
        Expr::Ne(l, r) => {
            let lv = eval(l, forced, default_zero)?;
            let rv = eval(r, forced, default_zero)?;
            Some((lv != rv) as u64)
        }
        Expr::Ult(l, r) => {
            let lv = eval(l, forced, default_zero)?;
            let rv = eval(r, forced, default_zero)?;
            Some((lv < rv) as u64)
        }
        Expr::Not(inner) => {
            let v = eval(inner, forced, default_zero)?;
            Some((v & 1) ^ 1)
        }
        Expr::And(l, r) => {
            // A concrete zero settles a conjunction no matter the
            // other operand.
            match (eval(l, forced, default_zero), eval(r, forced, default_zero)) {
                (Some(0), _) | (_, Some(0)) => Some(0),
                (Some(lv), Some(rv)) => Some(lv & rv),
                _ => None,
            }
        }
        Expr::Or(l, r) => {
            let lv = eval(l, forced, default_zero)?;
            let rv = eval(r, forced, default_zero)?;
            Some(lv | rv)
        }
        Expr::Add(l, r) => {
            let lv = eval(l, forced, default_zero)?;
            let rv = eval(r, forced, default_zero)?;
            Some(lv.wrapping_add(rv) & e.width().mask())
        }
        Expr::Shl(l, r) => {
            let lv = eval(l, forced, default_zero)?;
            let rv = eval(r, forced, default_zero)?;
            if rv >= 64 {
                Some(0)
            } else {
                Some((lv << rv) & e.width().mask())
            }
        }
        Expr::ZExt { expr: inner, .. } => eval(inner, forced, default_zero),
    }
}

impl SolverImpl for BytePropSolver {
    fn compute_validity(&mut self, query: &Query) -> Result<Validity, SolverError> {
        let model = build_model(query);
        if model.infeasible {
            return Ok(Validity::False);
        }
        // Pinned cells hold in every satisfying model, so a strict
        // fold of the goal is model-independent.
        match eval(&query.expr, &model.forced, false) {
            Some(0) => Ok(Validity::False),
            Some(_) => Ok(Validity::True),
            None => Ok(Validity::Unknown),
        }
    }

    fn compute_truth(&mut self, query: &Query) -> Result<bool, SolverError> {
        Ok(self.compute_validity(query)? == Validity::True)
    }

    fn compute_value(&mut self, query: &Query) -> Result<ExprRef, SolverError> {
        let model = build_model(query);
        if model.infeasible {
            return Err(SolverError::Aborted(
                "no model: constraints are contradictory".to_string(),
            ));
        }
        let value = eval(&query.expr, &model.forced, true)
            .expect("defaulted evaluation is total");
        Ok(const_(value, query.expr.width()))
    }

    fn compute_initial_values(
        &mut self,
        query: &Query,
        objects: &[Arc<Array>],
    ) -> Result<Assignment, SolverError> {
        let model = build_model(query);
        if model.infeasible {
            return Ok(Assignment {
                values: Vec::new(),
                has_solution: false,
            });
        }
        let values = objects
            .iter()
            .map(|array| {
                (0..array.size as u64)
                    .map(|i| model.forced.get(&Cell::of(array, i)).copied().unwrap_or(0))
                    .collect()
            })
            .collect();
        Ok(Assignment {
            values,
            has_solution: true,
        })
    }

    fn operation_status_code(&self) -> SolverRunStatus {
        SolverRunStatus::Success
    }

    fn constraint_log(&mut self, query: &Query) -> String {
        let mut out = String::new();
        for c in query.constraints.iter() {
            let _ = writeln!(out, "{}", c);
        }
        let _ = writeln!(out, "query: {}", query.expr);
        out
    }
}
