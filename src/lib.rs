// SPDX-FileCopyrightText: 2025 Ledger https://www.ledger.com - INSTITUT MINES TELECOM
//
// SPDX-License-Identifier: Apache-2.0

pub mod expr;
pub mod solver;
pub mod vase;

pub use solver::{Assignment, BytePropSolver, SolverError, SolverImpl, SolverRunStatus, Validity};
pub use vase::{ObservedValue, ValueBundle, ValueStore, VaseOptions, VaseSolver};
