// Gradient-descent basin dynamics: w -> w - lr * grad L(w)

use num_complex::Complex64;
use serde::Serialize;

use crate::dynamics::Dynamics;

// Floor for the gradient magnitude inside the sensitivity log
const GRAD_FLOOR: f64 = 1e-15;

// ============================================================================
// TRAINING DATASET
// ============================================================================

// One (input, target) pair the one-weight layer tries to fit
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DataPoint {
    pub input: f64,
    pub target: f64,
}

// The fixed synthetic dataset behind the loss landscape
pub fn reference_dataset() -> Vec<DataPoint> {
    [
        (0.5, 0.8),
        (-0.5, -0.8),
        (1.0, 0.6),
        (-1.0, -0.6),
        (0.3, 0.4),
        (-0.8, -0.5),
    ]
    .iter()
    .map(|&(input, target)| DataPoint { input, target })
    .collect()
}

// ============================================================================
// GRADIENT-DESCENT DYNAMICS (CONVERGENCE INSTANCE)
// ============================================================================

// Each point w0 of the plane is a starting weight for gradient descent on
// L(w) = sum (tanh(w*x_i) - y_i)^2. The basin boundaries, where two starts
// a pixel apart converge to different minima, are where initialization is
// maximally sensitive, and that is where the accumulated log-gradient
// (Lyapunov-like) estimate peaks.
#[derive(Debug, Clone)]
pub struct GradientDescentParams {
    // Step budget N
    pub max_steps: u32,

    // Gradient-descent learning rate
    pub learning_rate: f64,

    // Convergence threshold on |w_new - w_old|
    pub tolerance: f64,

    pub dataset: Vec<DataPoint>,
}

impl GradientDescentParams {
    pub fn new(max_steps: u32, learning_rate: f64) -> Self {
        assert!(max_steps > 0, "Step budget must be positive");
        assert!(learning_rate > 0.0, "Learning rate must be positive");
        Self {
            max_steps,
            learning_rate,
            tolerance: 1e-5,
            dataset: reference_dataset(),
        }
    }

    pub fn with_dataset(max_steps: u32, learning_rate: f64, dataset: Vec<DataPoint>) -> Self {
        assert!(!dataset.is_empty(), "Dataset must not be empty");
        let mut params = Self::new(max_steps, learning_rate);
        params.dataset = dataset;
        params
    }

    // dL/dw = sum 2*(tanh(w*x) - y)*(1 - tanh(w*x)^2)*x
    pub fn loss_gradient(&self, w: Complex64) -> Complex64 {
        let mut grad = Complex64::new(0.0, 0.0);
        for point in &self.dataset {
            let t = (w * point.input).tanh();
            grad += (t - point.target) * (1.0 - t * t) * 2.0 * point.input;
        }
        grad
    }
}

// Trajectory-derived metrics for one starting weight
#[derive(Debug, Clone)]
pub struct DescentTrace {
    // The minimum this start converged to; unresolved starts label
    // themselves with their final weight (self-loop fallback)
    pub target: Complex64,

    // Finite-horizon sensitivity estimate: sum of ln(max(|grad|, floor)) / N
    // over the live trajectory
    pub lyapunov: f64,
}

impl Dynamics for GradientDescentParams {
    type Accum = DescentTrace;

    fn budget(&self) -> u32 {
        self.max_steps
    }

    fn initial_state(&self, coord: Complex64) -> Complex64 {
        coord
    }

    fn initial_accum(&self) -> DescentTrace {
        DescentTrace {
            target: Complex64::new(0.0, 0.0),
            lyapunov: 0.0,
        }
    }

    fn update(&self, state: Complex64, _coord: Complex64) -> Complex64 {
        state - self.learning_rate * self.loss_gradient(state)
    }

    fn accumulate(&self, accum: &mut DescentTrace, prev: Complex64, next: Complex64, _step: u32) {
        // Gradient magnitude recovered from the applied step; a guarded
        // non-finite step contributes the floor value instead of infinity
        let grad_mag = (prev - next).norm() / self.learning_rate;
        accum.lyapunov += grad_mag.max(GRAD_FLOOR).ln() / self.max_steps as f64;
    }

    fn resolved(&self, prev: Complex64, next: Complex64) -> bool {
        // the weight stopped moving: we found a minimum
        (next - prev).norm() < self.tolerance
    }

    fn on_resolved(&self, accum: &mut DescentTrace, state: Complex64, _step: u32) {
        accum.target = state;
    }

    fn on_exhausted(&self, accum: &mut DescentTrace, state: Complex64) {
        accum.target = state;
    }
}
