// SPDX-FileCopyrightText: 2025 Ledger https://www.ledger.com - INSTITUT MINES TELECOM
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::expr::{Array, ExprRef, Query};

/// Tri-valued answer to a validity question about a query's goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Validity {
    True,
    False,
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverRunStatus {
    Success,
    Timeout,
    Failure,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SolverError {
    Timeout,
    Aborted(String),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::Timeout => write!(f, "solver timed out"),
            SolverError::Aborted(reason) => write!(f, "solver aborted: {}", reason),
        }
    }
}

impl Error for SolverError {}

/// Byte vectors for a set of requested arrays, in request order.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub values: Vec<Vec<u8>>,
    pub has_solution: bool,
}

/// The solver boundary. The wrapper implements this same interface and
/// is substitutable for any other implementation; an `Err` return is
/// the counterpart of the classic failed-success-flag convention.
pub trait SolverImpl {
    /// Is the query's goal provably true, provably false, or neither
    /// under its constraints?
    fn compute_validity(&mut self, query: &Query) -> Result<Validity, SolverError>;

    /// `Ok(true)` iff the goal provably holds under the constraints.
    fn compute_truth(&mut self, query: &Query) -> Result<bool, SolverError>;

    /// A concrete value the goal may take in some satisfying model.
    fn compute_value(&mut self, query: &Query) -> Result<ExprRef, SolverError>;

    /// Concrete byte contents for `objects` in some satisfying model.
    fn compute_initial_values(
        &mut self,
        query: &Query,
        objects: &[Arc<Array>],
    ) -> Result<Assignment, SolverError>;

    fn operation_status_code(&self) -> SolverRunStatus;

    fn constraint_log(&mut self, query: &Query) -> String;
}
