use crate::expr::Query;
use crate::solver::{SolverImpl, Validity};
use crate::vase_message;

use super::candidates::build_candidates;
use super::options::VaseOptions;
use super::scanner::{bytes_used, find_arrays};
use super::store::ValueStore;

/// Try to augment `original` with a hint derived from the values
/// observed at `location`. Candidates are trialled in priority order
/// against the underlying solver; the first one it cannot prove
/// infeasible wins. Returns the chosen query and whether it changed.
///
/// Acceptance only excludes provably infeasible additions, so an
/// accepted rewrite can never turn a satisfiable query unsatisfiable
/// behind the engine's back; any failure lands back on the original.
pub fn rewrite_with_vase<S: SolverImpl>(
    underlying: &mut S,
    original: &Query,
    location: &str,
    store: &ValueStore,
    options: &VaseOptions,
) -> (Query, bool) {
    let Some(bundle) = store.lookup(location) else {
        return (original.clone(), false);
    };

    let mut arrays = find_arrays(original);
    if arrays.is_empty() {
        return (original.clone(), false);
    }
    if arrays.len() > options.max_arrays as usize {
        arrays.truncate(options.max_arrays as usize);
    }
    let widths: Vec<u32> = arrays
        .iter()
        .map(|array| bytes_used(original, array))
        .collect();

    for candidate in build_candidates(bundle, &arrays, &widths, options) {
        let mut augmented = original.constraints.clone();
        for constraint in &candidate.constraints {
            augmented.push(constraint.clone());
        }
        let trial = original.with_constraints(augmented);
        match underlying.compute_validity(&trial) {
            Ok(validity) if validity != Validity::False => {
                if options.verbose {
                    vase_message!("VASE applied: {} -> {}", location, candidate.family);
                }
                return (trial, true);
            }
            // Proved infeasible, or the solver failed on this trial:
            // either way the candidate is out.
            _ => {}
        }
    }

    (original.clone(), false)
}
