// Forward-pass layer dynamics: z -> tanh(w*z + b)

use num_complex::Complex64;
use std::f64::consts::LN_2;

use crate::dynamics::Dynamics;

// Floor for the log of the terminal magnitude in the smooth index
const LOG_MAG_FLOOR: f64 = 1e-10;

// ============================================================================
// FORWARD-PASS DYNAMICS (ESCAPE INSTANCE)
// ============================================================================

// Each point c of the plane defines a layer weight w = c with the bias
// coupled as b = c * bias_coupling * i. Iterating z -> tanh(w*z + b) from a
// fixed input traces how the layer transitions from stable to chaotic:
// points whose orbit blows past the escape radius are "divergent" and get a
// continuous escape index; bounded orbits are shaded by how close they come
// to the unit circle (orbit trap).
//
// tanh keeps almost every orbit bounded; escapes happen only where w*z + b
// lands near a pole of tanh (i*pi/2 + i*k*pi), which is exactly what makes
// the escape set a thin fractal filament.
#[derive(Debug, Clone)]
pub struct ForwardPassParams {
    // Iteration budget N
    pub max_iter: u32,

    // Escape radius; must exceed 1 so ln(ln|z|/ln R) is defined at escape
    pub escape_radius: f64,

    // Fixed initial input z0 (real)
    pub initial_input: f64,

    // Bias coupling: b = c * bias_coupling * i
    pub bias_coupling: f64,
}

impl ForwardPassParams {
    pub fn new(max_iter: u32, escape_radius: f64) -> Self {
        assert!(max_iter > 0, "Iteration budget must be positive");
        assert!(escape_radius > 1.0, "Escape radius must exceed 1");
        Self {
            max_iter,
            escape_radius,
            initial_input: 0.3,
            bias_coupling: 0.3,
        }
    }
}

// Trajectory-derived metrics for one point
//
// smooth and angle stay at the neutral 0 for orbits that never escape;
// trap_min is the only informative metric there.
#[derive(Debug, Clone)]
pub struct EscapeTrace {
    // Continuous escape index in [0, N]
    pub smooth: f64,

    // Running minimum of | |z| - 1 | over the live trajectory
    pub trap_min: f64,

    // Terminal phase angle atan2(Im z, Re z) at escape
    pub angle: f64,
}

impl Dynamics for ForwardPassParams {
    type Accum = EscapeTrace;

    fn budget(&self) -> u32 {
        self.max_iter
    }

    fn initial_state(&self, _coord: Complex64) -> Complex64 {
        Complex64::new(self.initial_input, 0.0)
    }

    fn initial_accum(&self) -> EscapeTrace {
        EscapeTrace {
            smooth: 0.0,
            trap_min: f64::INFINITY,
            angle: 0.0,
        }
    }

    fn update(&self, state: Complex64, coord: Complex64) -> Complex64 {
        let bias = coord * Complex64::new(0.0, self.bias_coupling);
        (coord * state + bias).tanh()
    }

    fn accumulate(&self, accum: &mut EscapeTrace, _prev: Complex64, next: Complex64, _step: u32) {
        // Orbit trap: distance of |z| to the unit circle, tracked every
        // live step (the escaping step included)
        let dist = (next.norm() - 1.0).abs();
        if dist < accum.trap_min {
            accum.trap_min = dist;
        }
    }

    fn resolved(&self, _prev: Complex64, next: Complex64) -> bool {
        next.norm() > self.escape_radius
    }

    fn on_resolved(&self, accum: &mut EscapeTrace, state: Complex64, step: u32) {
        // Smooth escape index: step + 1 - ln(ln|z| / ln R) / ln 2, the
        // fractional refinement that removes banding between integer
        // iteration counts
        let log_mag = state.norm().max(LOG_MAG_FLOOR).ln();
        let fractional = (log_mag / self.escape_radius.ln()).ln() / LN_2;
        accum.smooth = ((step + 1) as f64 - fractional).clamp(0.0, self.max_iter as f64);
        accum.angle = state.arg();
    }

    fn on_exhausted(&self, _accum: &mut EscapeTrace, _state: Complex64) {
        // bounded orbits keep the neutral smooth/angle defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::evaluate;
    use crate::grid::ComplexGrid;
    use crate::types::{GridBounds, RenderConfig};
    use std::f64::consts::PI;

    // Coordinate whose first update lands near the tanh pole at i*pi/2,
    // so |z1| is large and the point escapes on step 0.
    fn pole_adjacent_coord() -> Complex64 {
        Complex64::new(0.0, PI / 2.0 - 0.03) / Complex64::new(0.3, 0.3)
    }

    fn single_point_grid(center: Complex64) -> ComplexGrid {
        // 2x2 grid tightly clustered around the coordinate of interest;
        // index 0 is the exact corner
        let eps = 1e-9;
        ComplexGrid::new(
            &RenderConfig::new(2, 2),
            &GridBounds::new(center.re, center.re + eps, center.im, center.im + eps),
        )
    }

    #[test]
    fn test_single_step_escape_matches_closed_form() {
        let params = ForwardPassParams::new(100, 20.0);
        let coord = pole_adjacent_coord();
        let points = evaluate(&single_point_grid(coord), &params, |_| {});
        let point = &points[0];

        assert!(point.resolved);
        assert_eq!(point.steps, 0);

        // Regression oracle: recompute the one applied step directly
        let z1 = (coord * Complex64::new(0.3, 0.0) + coord * Complex64::new(0.0, 0.3)).tanh();
        assert!(z1.norm() > 20.0);
        let expected = 1.0 - ((z1.norm().ln() / 20.0_f64.ln()).ln() / LN_2);
        assert!((point.accum.smooth - expected).abs() < 1e-12);
        assert!((point.accum.angle - z1.arg()).abs() < 1e-12);

        // The escaping step still feeds the orbit trap
        assert!((point.accum.trap_min - (z1.norm() - 1.0).abs()).abs() < 1e-12);
    }

    #[test]
    fn test_bounded_orbits_on_standard_window() {
        // 16x16 over the +-2.5 window: tanh keeps every orbit bounded (the
        // nearest pole preimage sits just outside the corner), so nothing
        // escapes within the budget.
        let params = ForwardPassParams::new(20, 20.0);
        let grid = ComplexGrid::new(&RenderConfig::new(16, 16), &GridBounds::square(2.5));
        let points = evaluate(&grid, &params, |_| {});

        assert!(points.iter().all(|p| !p.resolved));

        // The point nearest the origin settles by the tanh fixed point and
        // keeps an informative trap distance below 1
        let near_origin = &points[7 * 16 + 7];
        assert_eq!(near_origin.steps, 20);
        assert_eq!(near_origin.accum.smooth, 0.0);
        assert_eq!(near_origin.accum.angle, 0.0);
        assert!(near_origin.accum.trap_min > 0.0 && near_origin.accum.trap_min < 1.0);
    }

    #[test]
    fn test_budget_increase_preserves_resolved_metrics() {
        // Points resolved at the smaller budget must carry identical
        // terminal records at the larger one.
        let grid = ComplexGrid::new(
            &RenderConfig::new(8, 8),
            &GridBounds::new(2.4, 2.8, 2.4, 2.8),
        );
        let short = evaluate(&grid, &ForwardPassParams::new(3, 20.0), |_| {});
        let long = evaluate(&grid, &ForwardPassParams::new(6, 20.0), |_| {});

        let short_resolved = short.iter().filter(|p| p.resolved).count();
        let long_resolved = long.iter().filter(|p| p.resolved).count();
        assert!(short_resolved > 0);
        assert!(long_resolved >= short_resolved);

        for (a, b) in short.iter().zip(&long) {
            if a.resolved {
                assert!(b.resolved);
                assert_eq!(a.steps, b.steps);
                assert_eq!(a.value, b.value);
                assert_eq!(a.accum.smooth.to_bits(), b.accum.smooth.to_bits());
                assert_eq!(a.accum.angle.to_bits(), b.accum.angle.to_bits());
            }
        }
    }

    #[test]
    fn test_reruns_are_bit_identical() {
        let params = ForwardPassParams::new(25, 20.0);
        let grid = ComplexGrid::new(&RenderConfig::new(12, 12), &GridBounds::square(2.7));
        let first = evaluate(&grid, &params, |_| {});
        let second = evaluate(&grid, &params, |_| {});

        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.resolved, b.resolved);
            assert_eq!(a.steps, b.steps);
            assert_eq!(a.value.re.to_bits(), b.value.re.to_bits());
            assert_eq!(a.value.im.to_bits(), b.value.im.to_bits());
            assert_eq!(a.accum.smooth.to_bits(), b.accum.smooth.to_bits());
            assert_eq!(a.accum.trap_min.to_bits(), b.accum.trap_min.to_bits());
            assert_eq!(a.accum.angle.to_bits(), b.accum.angle.to_bits());
        }
    }
}
