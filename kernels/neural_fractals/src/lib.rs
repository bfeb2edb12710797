// kernels/neural_fractals/src/lib.rs

// Neural Recurrence Fractal Core
//
// This library renders escape-time and convergence fractals of two small
// neural recurrences evaluated over a dense grid in the complex plane:
//
// - Forward-pass dynamics: iterate the layer z -> tanh(w*z + b) and track
//   how fast each point diverges (and how close its orbit comes to the
//   unit circle when it does not).
// - Gradient-descent basins: run gradient descent on a tiny sum-of-squares
//   loss from every starting weight and track which minimum each start
//   converges to, and how fast.
//
// All computations use f64; the fractal boundaries live exactly where the
// dynamics are numerically delicate.

pub mod compose;
pub mod descent;
pub mod dynamics;
pub mod escape;
pub mod grid;
pub mod metrics;
pub mod palette;
pub mod render;
pub mod types;

pub use compose::{apply_glow, apply_vignette, compose_basin, compose_escape, gaussian_blur};
pub use descent::{reference_dataset, DataPoint, DescentTrace, GradientDescentParams};
pub use dynamics::{evaluate, Dynamics, PointState};
pub use escape::{EscapeTrace, ForwardPassParams};
pub use grid::ComplexGrid;
pub use metrics::{min_max_normalize, BasinField, EscapeField};
pub use palette::{forward_pass_palette, gradient_basin_palette, Palette, PALETTE_LEVELS};
pub use render::{
    render_forward_pass, render_gradient_basin, FractalImage, Manifest, RenderOutput,
};
pub use types::{GridBounds, RenderConfig};
