use std::sync::Arc;

use crate::expr::{Array, ExprRef, Query};
use crate::solver::{Assignment, SolverError, SolverImpl, SolverRunStatus, Validity};

use super::location::extract_location;
use super::options::VaseOptions;
use super::rewrite::rewrite_with_vase;
use super::store::{self, ValueStore};

enum StoreBinding {
    /// The process-wide store, loaded once on first use.
    Global,
    /// A caller-managed store, for embedders and tests.
    Fixed {
        store: Arc<ValueStore>,
        options: VaseOptions,
    },
}

/// Solver wrapper that injects observed-value hints before delegating.
/// It exposes the same operations as the solver it owns, so it slots
/// into a solver chain anywhere.
pub struct VaseSolver<S: SolverImpl> {
    underlying: S,
    binding: StoreBinding,
}

impl<S: SolverImpl> VaseSolver<S> {
    /// Wrap `underlying` over the process-wide store. The map is
    /// loaded on construction if nothing loaded it earlier.
    pub fn new(underlying: S) -> Self {
        store::ensure_loaded_once();
        VaseSolver {
            underlying,
            binding: StoreBinding::Global,
        }
    }

    /// Wrap `underlying` over an explicit store and option set.
    pub fn with_map(underlying: S, store: Arc<ValueStore>, options: VaseOptions) -> Self {
        VaseSolver {
            underlying,
            binding: StoreBinding::Fixed { store, options },
        }
    }

    pub fn into_inner(self) -> S {
        self.underlying
    }

    /// Rewrite-or-passthrough. The returned query is what gets
    /// delegated; on an empty store this is always the original.
    fn prepare(&mut self, query: &Query) -> Query {
        let (store, options) = match &self.binding {
            StoreBinding::Global => {
                store::ensure_loaded_once();
                store::current()
            }
            StoreBinding::Fixed { store, options } => (store.clone(), options.clone()),
        };
        if store.is_empty() {
            return query.clone();
        }
        let location = extract_location(query);
        let (chosen, _changed) =
            rewrite_with_vase(&mut self.underlying, query, &location, &store, &options);
        chosen
    }
}

impl<S: SolverImpl> SolverImpl for VaseSolver<S> {
    fn compute_validity(&mut self, query: &Query) -> Result<Validity, SolverError> {
        let chosen = self.prepare(query);
        self.underlying.compute_validity(&chosen)
    }

    fn compute_truth(&mut self, query: &Query) -> Result<bool, SolverError> {
        let chosen = self.prepare(query);
        self.underlying.compute_truth(&chosen)
    }

    fn compute_value(&mut self, query: &Query) -> Result<ExprRef, SolverError> {
        let chosen = self.prepare(query);
        self.underlying.compute_value(&chosen)
    }

    fn compute_initial_values(
        &mut self,
        query: &Query,
        objects: &[Arc<Array>],
    ) -> Result<Assignment, SolverError> {
        let chosen = self.prepare(query);
        self.underlying.compute_initial_values(&chosen, objects)
    }

    fn operation_status_code(&self) -> SolverRunStatus {
        self.underlying.operation_status_code()
    }

    fn constraint_log(&mut self, query: &Query) -> String {
        self.underlying.constraint_log(query)
    }
}
