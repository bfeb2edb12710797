// Bounded iterate-until-done evaluation over a grid of independent points

use num_complex::Complex64;

use crate::grid::ComplexGrid;

// ============================================================================
// DYNAMICS STRATEGY
// ============================================================================

// A per-point dynamical system: update rule, termination predicate, and
// trajectory accumulators
//
// Both fractal instances (forward-pass escape and gradient-descent basins)
// share one iteration skeleton; everything instance-specific lives behind
// this trait. Every point's trajectory is independent of every other
// point's, so the evaluator needs no synchronization between points.
pub trait Dynamics {
    // Per-point private accumulator bundle (orbit trap, sensitivity sum, ...)
    type Accum: Clone;

    // Global step budget N; a point that never satisfies the termination
    // predicate simply runs to budget
    fn budget(&self) -> u32;

    fn initial_state(&self, coord: Complex64) -> Complex64;

    fn initial_accum(&self) -> Self::Accum;

    // One application of the update rule f(state, coord) -> state'
    fn update(&self, state: Complex64, coord: Complex64) -> Complex64;

    // Fold the current step into the point's accumulators. Called once per
    // step for every point that entered the step unresolved, including the
    // step on which the point resolves; never called after resolution.
    fn accumulate(&self, accum: &mut Self::Accum, prev: Complex64, next: Complex64, step: u32);

    // Termination predicate, evaluated on the pre- and post-update state
    fn resolved(&self, prev: Complex64, next: Complex64) -> bool;

    // Record terminal metrics for a point that resolved at `step`
    fn on_resolved(&self, accum: &mut Self::Accum, state: Complex64, step: u32);

    // Record defined fallback metrics for a point that ran to budget
    fn on_exhausted(&self, accum: &mut Self::Accum, state: Complex64);
}

// ============================================================================
// POINT STATE ARENA
// ============================================================================

// Terminal record of one point's trajectory
//
// Invariant: once `resolved` is true, `value`, `steps` and `accum` never
// change again. `steps` is the resolving step index, or the budget for
// points that never resolved.
#[derive(Debug, Clone)]
pub struct PointState<A> {
    pub value: Complex64,
    pub resolved: bool,
    pub steps: u32,
    pub accum: A,
}

// ============================================================================
// EVALUATION LOOP
// ============================================================================

// Run the bounded iteration over every grid point
//
// Points are stored in a flat arena indexed like the grid; a live-index
// vector tracks the points still iterating so each round touches only
// unresolved entries. `progress` is invoked once per round with the total
// number of resolved points so far.
//
// Numerical-stability guard: if the update rule produces a non-finite
// value, the point keeps its pre-update state for that step and cannot
// resolve on that step; degenerate local dynamics are expected near the
// fractal boundary and must not propagate.
pub fn evaluate<D: Dynamics>(
    grid: &ComplexGrid,
    dynamics: &D,
    mut progress: impl FnMut(u64),
) -> Vec<PointState<D::Accum>> {
    let budget = dynamics.budget();
    assert!(budget > 0, "Step budget must be positive");

    let mut points: Vec<PointState<D::Accum>> = grid
        .coords()
        .iter()
        .map(|&coord| PointState {
            value: dynamics.initial_state(coord),
            resolved: false,
            steps: budget,
            accum: dynamics.initial_accum(),
        })
        .collect();

    let mut active: Vec<usize> = (0..points.len()).collect();
    let mut resolved_total: u64 = 0;

    for step in 0..budget {
        if active.is_empty() {
            break;
        }

        for &idx in &active {
            let coord = grid.coords()[idx];
            let point = &mut points[idx];

            let prev = point.value;
            let raw = dynamics.update(prev, coord);
            let finite = raw.re.is_finite() && raw.im.is_finite();
            let next = if finite { raw } else { prev };

            dynamics.accumulate(&mut point.accum, prev, next, step);

            if finite && dynamics.resolved(prev, next) {
                dynamics.on_resolved(&mut point.accum, next, step);
                point.resolved = true;
                point.steps = step;
                resolved_total += 1;
            }

            point.value = next;
        }

        active.retain(|&idx| !points[idx].resolved);
        progress(resolved_total);
    }

    // Points still live at budget get a defined terminal record
    for point in points.iter_mut().filter(|p| !p.resolved) {
        dynamics.on_exhausted(&mut point.accum, point.value);
    }

    points
}
