// Intensity composition and cosmetic post-processing (glow, vignette)

use std::f64::consts::PI;

use crate::metrics::{BasinField, EscapeField};

// ============================================================================
// INTENSITY COMPOSITION
// ============================================================================

// Combine the escape metrics into a single intensity field in [0,1]
//
// Escaped points get a bright banded shading from the smooth index and the
// terminal angle; bounded orbits get a dim glow from the inside, brighter
// the closer they orbit to the unit circle.
pub fn compose_escape(field: &EscapeField) -> Vec<f64> {
    field
        .escaped
        .iter()
        .zip(&field.smooth)
        .zip(&field.angle)
        .zip(&field.trap)
        .map(|(((escaped, si), ang), tm)| {
            let value = if *escaped {
                si.sqrt() + 0.12 * (ang * PI * 6.0 + si * 12.0).sin()
            } else {
                0.06 * (1.0 - tm) * (1.0 - tm)
            };
            value.clamp(0.0, 1.0)
        })
        .collect()
}

// Combine the basin metrics into a single intensity field in [0,1]
//
// Brightness encodes convergence speed, banded by basin identity, with the
// sensitivity estimate lifting the chaotic boundary filaments.
pub fn compose_basin(field: &BasinField) -> Vec<f64> {
    field
        .speed
        .iter()
        .zip(&field.basin_angle)
        .zip(&field.sensitivity)
        .map(|((speed, ang), ly)| {
            let value = speed.powf(0.55) * (0.5 + 0.5 * (ang * PI * 10.0).sin()) + 0.25 * ly;
            value.clamp(0.0, 1.0)
        })
        .collect()
}

// ============================================================================
// GAUSSIAN GLOW
// ============================================================================

// Sampled Gaussian weights out to 3 sigma, normalized to sum 1
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    assert!(sigma > 0.0, "Blur sigma must be positive");
    let radius = (3.0 * sigma).ceil() as i64;
    let mut weights = Vec::with_capacity((2 * radius + 1) as usize);
    for i in -radius..=radius {
        weights.push((-(i * i) as f64 / (2.0 * sigma * sigma)).exp());
    }
    let total: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= total;
    }
    weights
}

// Mirror out-of-range indices back into [0, n): (d c b a | a b c d | d c b a)
#[inline]
fn reflect(mut i: i64, n: i64) -> usize {
    loop {
        if i < 0 {
            i = -i - 1;
        } else if i >= n {
            i = 2 * n - 1 - i;
        } else {
            return i as usize;
        }
    }
}

// Separable Gaussian blur of a row-major field
pub fn gaussian_blur(field: &[f64], width: usize, height: usize, sigma: f64) -> Vec<f64> {
    assert_eq!(field.len(), width * height, "Field size mismatch");
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as i64;

    // horizontal pass
    let mut horizontal = vec![0.0; field.len()];
    for y in 0..height {
        let row = y * width;
        for x in 0..width {
            let mut sum = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let sx = reflect(x as i64 + k as i64 - radius, width as i64);
                sum += w * field[row + sx];
            }
            horizontal[row + x] = sum;
        }
    }

    // vertical pass
    let mut blurred = vec![0.0; field.len()];
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let sy = reflect(y as i64 + k as i64 - radius, height as i64);
                sum += w * horizontal[sy * width + x];
            }
            blurred[y * width + x] = sum;
        }
    }

    blurred
}

// Add a blurred copy of the field back onto itself: img + strength * blur
pub fn apply_glow(field: &mut [f64], width: usize, height: usize, sigma: f64, strength: f64) {
    let blurred = gaussian_blur(field, width, height, sigma);
    for (value, glow) in field.iter_mut().zip(blurred) {
        *value = (*value + strength * glow).clamp(0.0, 1.0);
    }
}

// ============================================================================
// VIGNETTE
// ============================================================================

// Radial darkening toward the image corners
pub fn apply_vignette(field: &mut [f64], width: usize, height: usize, strength: f64) {
    assert_eq!(field.len(), width * height, "Field size mismatch");
    let half_w = width as f64 / 2.0;
    let half_h = height as f64 / 2.0;
    for y in 0..height {
        let ny = (y as f64 - half_h) / half_h;
        for x in 0..width {
            let nx = (x as f64 - half_w) / half_w;
            let vig = (1.0 - strength * (nx * nx + ny * ny)).clamp(0.0, 1.0);
            field[y * width + x] *= vig;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_is_normalized() {
        let kernel = gaussian_kernel(2.5);
        let total: f64 = kernel.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        // symmetric around the center tap
        assert_eq!(kernel.len() % 2, 1);
        let mid = kernel.len() / 2;
        for i in 0..mid {
            assert!((kernel[i] - kernel[kernel.len() - 1 - i]).abs() < 1e-15);
        }
    }

    #[test]
    fn test_blur_preserves_constant_field() {
        let field = vec![0.42; 12 * 8];
        let blurred = gaussian_blur(&field, 12, 8, 3.0);
        for v in blurred {
            assert!((v - 0.42).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reflect_indexing() {
        assert_eq!(reflect(0, 5), 0);
        assert_eq!(reflect(4, 5), 4);
        assert_eq!(reflect(-1, 5), 0);
        assert_eq!(reflect(-2, 5), 1);
        assert_eq!(reflect(5, 5), 4);
        assert_eq!(reflect(7, 5), 2);
    }

    #[test]
    fn test_vignette_darkens_corners_more_than_center() {
        let width = 9;
        let height = 9;
        let mut field = vec![1.0; width * height];
        apply_vignette(&mut field, width, height, 0.45);

        let center = field[4 * width + 4];
        let corner = field[0];
        assert!(center > corner);
        assert!(field.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_compose_outputs_stay_bounded() {
        let field = EscapeField {
            smooth: vec![0.0, 0.9, 1.0],
            angle: vec![0.5, 0.1, 0.9],
            trap: vec![0.2, 0.0, 1.0],
            escaped: vec![false, true, true],
        };
        for v in compose_escape(&field) {
            assert!((0.0..=1.0).contains(&v));
        }

        let basin = BasinField {
            basin_angle: vec![0.0, 0.33, 1.0],
            speed: vec![0.0, 0.5, 1.0],
            sensitivity: vec![0.0, 1.0, 0.4],
            converged: vec![false, true, true],
        };
        for v in compose_basin(&basin) {
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
