// Normalized metric fields: terminal point states -> bounded [0,1] arrays

use std::f64::consts::PI;

use crate::descent::{DescentTrace, GradientDescentParams};
use crate::dynamics::PointState;
use crate::escape::{EscapeTrace, ForwardPassParams};

// Guard against a zero-width range in min-max normalization
const RANGE_EPS: f64 = 1e-10;

// Min-max normalize a field to [0,1]
//
// A constant field maps to all zeros rather than dividing by zero.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    values
        .iter()
        .map(|v| ((v - min) / (max - min + RANGE_EPS)).clamp(0.0, 1.0))
        .collect()
}

// ============================================================================
// ESCAPE METRICS (FORWARD-PASS INSTANCE)
// ============================================================================

// Normalized per-pixel fields consumed by the compositor; nothing else
// crosses this boundary.
pub struct EscapeField {
    // Smooth escape index scaled by the budget
    pub smooth: Vec<f64>,

    // Terminal phase mapped from (-pi, pi] onto [0,1]
    pub angle: Vec<f64>,

    // Orbit-trap distance, log-compressed against the escape radius
    pub trap: Vec<f64>,

    pub escaped: Vec<bool>,
}

impl EscapeField {
    pub fn from_points(points: &[PointState<EscapeTrace>], params: &ForwardPassParams) -> Self {
        let budget = params.max_iter as f64;
        // Fixed denominator: log1p(R) compresses large distances and
        // emphasizes near-zero ones. Escaped points can overshoot it, so
        // the ratio is clamped.
        let trap_denom = params.escape_radius.ln_1p();

        let mut smooth = Vec::with_capacity(points.len());
        let mut angle = Vec::with_capacity(points.len());
        let mut trap = Vec::with_capacity(points.len());
        let mut escaped = Vec::with_capacity(points.len());

        for point in points {
            smooth.push(point.accum.smooth / budget);
            angle.push((point.accum.angle + PI) / (2.0 * PI));
            trap.push((point.accum.trap_min.ln_1p() / trap_denom).clamp(0.0, 1.0));
            escaped.push(point.resolved);
        }

        Self {
            smooth,
            angle,
            trap,
            escaped,
        }
    }
}

// ============================================================================
// BASIN METRICS (GRADIENT-DESCENT INSTANCE)
// ============================================================================

pub struct BasinField {
    // Which minimum the start converged to, encoded as a phase in [0,1]
    pub basin_angle: Vec<f64>,

    // 1 - steps/N: fast convergence maps near 1, budget exhaustion to 0
    pub speed: Vec<f64>,

    // Sensitivity accumulator, min-max normalized across the whole field
    pub sensitivity: Vec<f64>,

    pub converged: Vec<bool>,
}

impl BasinField {
    pub fn from_points(points: &[PointState<DescentTrace>], params: &GradientDescentParams) -> Self {
        let budget = params.max_steps as f64;

        let mut basin_angle = Vec::with_capacity(points.len());
        let mut speed = Vec::with_capacity(points.len());
        let mut raw_sensitivity = Vec::with_capacity(points.len());
        let mut converged = Vec::with_capacity(points.len());

        for point in points {
            basin_angle.push((point.accum.target.arg() + PI) / (2.0 * PI));
            speed.push(1.0 - point.steps as f64 / budget);
            raw_sensitivity.push(point.accum.lyapunov);
            converged.push(point.resolved);
        }

        Self {
            basin_angle,
            speed,
            sensitivity: min_max_normalize(&raw_sensitivity),
            converged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn test_min_max_extremes_map_to_unit_interval() {
        let normed = min_max_normalize(&[3.0, -1.0, 7.0, 5.0]);
        assert!((normed[1] - 0.0).abs() < 1e-9);
        assert!((normed[2] - 1.0).abs() < 1e-9);
        assert!(normed.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_min_max_constant_field() {
        let normed = min_max_normalize(&[4.2, 4.2, 4.2]);
        assert!(normed.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_escape_normalization() {
        let params = ForwardPassParams::new(100, 20.0);
        let points = vec![
            PointState {
                value: Complex64::new(25.0, 0.0),
                resolved: true,
                steps: 4,
                accum: EscapeTrace {
                    smooth: 50.0,
                    trap_min: 0.0,
                    angle: -PI / 2.0,
                },
            },
            PointState {
                value: Complex64::new(0.5, 0.0),
                resolved: false,
                steps: 100,
                accum: EscapeTrace {
                    smooth: 0.0,
                    // trap past the fixed denominator must clamp to 1
                    trap_min: 100.0,
                    angle: 0.0,
                },
            },
        ];
        let field = EscapeField::from_points(&points, &params);

        assert!((field.smooth[0] - 0.5).abs() < 1e-12);
        assert!((field.angle[0] - 0.25).abs() < 1e-12);
        assert_eq!(field.trap[0], 0.0);
        assert_eq!(field.trap[1], 1.0);
        assert_eq!(field.escaped, vec![true, false]);
    }

    #[test]
    fn test_basin_speed_scaling() {
        let params = GradientDescentParams::new(150, 0.04);
        let points = vec![
            PointState {
                value: Complex64::new(1.0, 0.0),
                resolved: true,
                steps: 0,
                accum: DescentTrace {
                    target: Complex64::new(1.0, 0.0),
                    lyapunov: -3.0,
                },
            },
            PointState {
                value: Complex64::new(2.0, 2.0),
                resolved: false,
                steps: 150,
                accum: DescentTrace {
                    target: Complex64::new(2.0, 2.0),
                    lyapunov: 1.0,
                },
            },
        ];
        let field = BasinField::from_points(&points, &params);

        assert!((field.speed[0] - 1.0).abs() < 1e-12);
        assert_eq!(field.speed[1], 0.0);
        // min-max over the two-element field
        assert!(field.sensitivity[0] < 1e-9);
        assert!((field.sensitivity[1] - 1.0).abs() < 1e-9);
        // target at angle 0 maps to the middle of the phase range
        assert!((field.basin_angle[0] - 0.5).abs() < 1e-12);
    }
}
