// Pipeline orchestration: grid -> dynamics -> metrics -> intensity -> pixels

use image::{Rgb, RgbImage};
use serde::Serialize;

use crate::compose::{apply_glow, apply_vignette, compose_basin, compose_escape};
use crate::descent::GradientDescentParams;
use crate::dynamics::evaluate;
use crate::escape::ForwardPassParams;
use crate::grid::ComplexGrid;
use crate::metrics::{BasinField, EscapeField};
use crate::palette::Palette;
use crate::types::{GridBounds, RenderConfig};

// Post-processing constants shared with the reference renders
const GLOW_STRENGTH: f64 = 0.3;
const FORWARD_GLOW_SIGMA: f64 = 3.0;
const BASIN_GLOW_SIGMA: f64 = 2.5;
const VIGNETTE_STRENGTH: f64 = 0.45;

// ============================================================================
// INTENSITY FIELD
// ============================================================================

// Final composited intensity field, row 0 at y_min
pub struct FractalImage {
    pub width: u32,
    pub height: u32,
    pub intensity: Vec<f64>,
}

impl FractalImage {
    // Map intensities through the palette into pixels. Row 0 of the field
    // is the bottom of the image (mathematical orientation: imaginary axis
    // grows upward).
    pub fn to_rgb(&self, palette: &Palette) -> RgbImage {
        let mut img = RgbImage::new(self.width, self.height);
        for y in 0..self.height {
            let src_row = (self.height - 1 - y) as usize * self.width as usize;
            for x in 0..self.width {
                let value = self.intensity[src_row + x as usize];
                img.put_pixel(x, y, Rgb(palette.sample(value)));
            }
        }
        img
    }
}

// Result of one full render pass
pub struct RenderOutput {
    pub image: FractalImage,
    pub resolved: usize,
}

// ============================================================================
// RENDER ENTRY POINTS
// ============================================================================

// Render the forward-pass escape fractal
//
// `progress` is invoked once per iteration round with the number of
// resolved (escaped) pixels so far.
pub fn render_forward_pass(
    config: &RenderConfig,
    bounds: &GridBounds,
    params: &ForwardPassParams,
    progress: impl FnMut(u64),
) -> RenderOutput {
    let grid = ComplexGrid::new(config, bounds);
    let points = evaluate(&grid, params, progress);
    let resolved = points.iter().filter(|p| p.resolved).count();

    let field = EscapeField::from_points(&points, params);
    let mut intensity = compose_escape(&field);
    apply_glow(
        &mut intensity,
        grid.width(),
        grid.height(),
        FORWARD_GLOW_SIGMA,
        GLOW_STRENGTH,
    );
    apply_vignette(&mut intensity, grid.width(), grid.height(), VIGNETTE_STRENGTH);

    RenderOutput {
        image: FractalImage {
            width: config.width,
            height: config.height,
            intensity,
        },
        resolved,
    }
}

// Render the gradient-descent basin fractal
pub fn render_gradient_basin(
    config: &RenderConfig,
    bounds: &GridBounds,
    params: &GradientDescentParams,
    progress: impl FnMut(u64),
) -> RenderOutput {
    let grid = ComplexGrid::new(config, bounds);
    let points = evaluate(&grid, params, progress);
    let resolved = points.iter().filter(|p| p.resolved).count();

    let field = BasinField::from_points(&points, params);
    let mut intensity = compose_basin(&field);
    apply_glow(
        &mut intensity,
        grid.width(),
        grid.height(),
        BASIN_GLOW_SIGMA,
        GLOW_STRENGTH,
    );
    apply_vignette(&mut intensity, grid.width(), grid.height(), VIGNETTE_STRENGTH);

    RenderOutput {
        image: FractalImage {
            width: config.width,
            height: config.height,
            intensity,
        },
        resolved,
    }
}

// ============================================================================
// RUN MANIFEST
// ============================================================================

// Manifest metadata for a rendered preset, serialized to JSON next to the
// image so downstream consumers know what they are looking at
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub width: u32,
    pub height: u32,
    pub preset: String,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub budget: u32,
    pub resolved: usize,
    pub image: String,
}

impl Manifest {
    pub fn new(
        config: &RenderConfig,
        bounds: &GridBounds,
        preset: &str,
        budget: u32,
        resolved: usize,
    ) -> Self {
        Self {
            width: config.width,
            height: config.height,
            preset: preset.to_string(),
            x_min: bounds.x_min,
            x_max: bounds.x_max,
            y_min: bounds.y_min,
            y_max: bounds.y_max,
            budget,
            resolved,
            image: format!("{preset}.png"),
        }
    }
}
