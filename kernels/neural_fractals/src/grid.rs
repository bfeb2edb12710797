// Pixel-to-complex-plane mapping

use num_complex::Complex64;

use crate::types::{GridBounds, RenderConfig};

// Row-major array of complex coordinates, one per pixel
//
// Row y maps to the imaginary axis, column x to the real axis, both
// linearly spaced: coord(0, 0) = x_min + i*y_min and
// coord(W-1, H-1) = x_max + i*y_max. Immutable once built.
pub struct ComplexGrid {
    width: usize,
    height: usize,
    coords: Vec<Complex64>,
}

impl ComplexGrid {
    pub fn new(config: &RenderConfig, bounds: &GridBounds) -> Self {
        let width = config.width as usize;
        let height = config.height as usize;

        // (dim - 1) denominators so the corner pixels land on the bounds
        let dx = bounds.width() / (width - 1) as f64;
        let dy = bounds.height() / (height - 1) as f64;

        let mut coords = Vec::with_capacity(width * height);
        for y in 0..height {
            let im = bounds.y_min + y as f64 * dy;
            for x in 0..width {
                let re = bounds.x_min + x as f64 * dx;
                coords.push(Complex64::new(re, im));
            }
        }

        Self {
            width,
            height,
            coords,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    // Flat row-major coordinate slice; index = y * width + x
    #[inline]
    pub fn coords(&self) -> &[Complex64] {
        &self.coords
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> Complex64 {
        self.coords[y * self.width + x]
    }
}
