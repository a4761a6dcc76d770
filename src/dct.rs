//! Separable orthonormal 2D Discrete Cosine Transform.
//!
//! Works for any even block size N >= 2. The orthonormal scaling convention
//! keeps forward and inverse symmetric, which the quantization matrix design
//! relies on for its energy assumptions.

use std::f64::consts::PI;

/// Precomputed DCT basis for one block size.
///
/// `basis[u * n + x] = s(u) * cos(pi * (2x + 1) * u / (2n))` with
/// `s(0) = sqrt(1/n)` and `s(u) = sqrt(2/n)` otherwise. The forward
/// transform is `C * X * C^T`, the inverse `C^T * Y * C`.
pub struct Dct {
    size: usize,
    basis: Vec<f64>,
}

impl Dct {
    pub fn new(size: usize) -> Self {
        let n = size as f64;
        let mut basis = vec![0.0f64; size * size];
        for u in 0..size {
            let scale = if u == 0 {
                (1.0 / n).sqrt()
            } else {
                (2.0 / n).sqrt()
            };
            for x in 0..size {
                basis[u * size + x] =
                    scale * (PI * (2.0 * x as f64 + 1.0) * u as f64 / (2.0 * n)).cos();
            }
        }
        Self { size, basis }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Forward 2D transform of an N*N block (row-major). `output` must be
    /// the same length as `input`.
    pub fn forward(&self, input: &[f64], output: &mut [f64]) {
        debug_assert_eq!(input.len(), self.size * self.size);
        debug_assert_eq!(output.len(), self.size * self.size);
        let tmp = self.apply_rows(input, false);
        self.apply_cols(&tmp, false, output);
    }

    /// Inverse 2D transform, the mirror of [`Dct::forward`].
    pub fn inverse(&self, input: &[f64], output: &mut [f64]) {
        debug_assert_eq!(input.len(), self.size * self.size);
        debug_assert_eq!(output.len(), self.size * self.size);
        let tmp = self.apply_rows(input, true);
        self.apply_cols(&tmp, true, output);
    }

    // One 1D pass over every row. `transposed` selects C^T instead of C.
    fn apply_rows(&self, input: &[f64], transposed: bool) -> Vec<f64> {
        let n = self.size;
        let mut out = vec![0.0f64; n * n];
        for row in 0..n {
            let src = &input[row * n..(row + 1) * n];
            let dst = &mut out[row * n..(row + 1) * n];
            for u in 0..n {
                let mut sum = 0.0;
                for x in 0..n {
                    let c = if transposed {
                        self.basis[x * n + u]
                    } else {
                        self.basis[u * n + x]
                    };
                    sum += c * src[x];
                }
                dst[u] = sum;
            }
        }
        out
    }

    fn apply_cols(&self, input: &[f64], transposed: bool, output: &mut [f64]) {
        let n = self.size;
        for col in 0..n {
            for u in 0..n {
                let mut sum = 0.0;
                for x in 0..n {
                    let c = if transposed {
                        self.basis[x * n + u]
                    } else {
                        self.basis[u * n + x]
                    };
                    sum += c * input[x * n + col];
                }
                output[u * n + col] = sum;
            }
        }
    }
}
