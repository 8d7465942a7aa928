//! Radix-2 fast Fourier transforms over slices and ndarray axes.
//!
//! Forward transforms use the kernel `exp(-2πi jk/N)` and are unnormalized.

use std::f64::consts::PI;

use ndarray::{ArrayBase, Axis, DataMut, Dimension, Zip};
use num_complex::Complex64;

use crate::error::{DiffractError, Result};

/// Precomputed twiddles and bit-reversal permutation for one length.
#[derive(Debug, Clone)]
pub struct FftPlan {
    n: usize,
    twiddles: Vec<Complex64>,
    reversed: Vec<usize>,
}

impl FftPlan {
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 || !n.is_power_of_two() {
            return Err(DiffractError::InvalidParameter {
                name: "fft_length",
                reason: format!("must be a power of two, got {n}"),
            });
        }
        let bits = n.trailing_zeros();
        let reversed = (0..n)
            .map(|i| if bits == 0 { 0 } else { i.reverse_bits() >> (usize::BITS - bits) })
            .collect();
        let twiddles = (0..n / 2)
            .map(|k| Complex64::cis(-2.0 * PI * k as f64 / n as f64))
            .collect();
        Ok(FftPlan {
            n,
            twiddles,
            reversed,
        })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// In-place forward transform. `data.len()` must equal the plan length.
    pub fn forward(&self, data: &mut [Complex64]) {
        debug_assert_eq!(data.len(), self.n);
        for i in 0..self.n {
            let j = self.reversed[i];
            if i < j {
                data.swap(i, j);
            }
        }
        let mut half = 1;
        while half < self.n {
            let stride = self.n / (2 * half);
            for start in (0..self.n).step_by(2 * half) {
                for k in 0..half {
                    let w = self.twiddles[k * stride];
                    let a = data[start + k];
                    let b = data[start + k + half] * w;
                    data[start + k] = a + b;
                    data[start + k + half] = a - b;
                }
            }
            half *= 2;
        }
    }

    /// Transforms every lane of `array` along `axis`, lanes in parallel.
    pub fn forward_axis<S, D>(&self, array: &mut ArrayBase<S, D>, axis: Axis)
    where
        S: DataMut<Elem = Complex64>,
        D: Dimension,
    {
        debug_assert_eq!(array.len_of(axis), self.n);
        Zip::from(array.lanes_mut(axis)).par_for_each(|mut lane| {
            let mut buffer = lane.to_vec();
            self.forward(&mut buffer);
            lane.assign(&ndarray::aview1(&buffer));
        });
    }
}

/// Forward transform along every axis of a 2D or 3D array.
pub fn fftn<S, D>(array: &mut ArrayBase<S, D>) -> Result<()>
where
    S: DataMut<Elem = Complex64>,
    D: Dimension,
{
    for axis in 0..array.ndim() {
        let plan = FftPlan::new(array.len_of(Axis(axis)))?;
        plan.forward_axis(array, Axis(axis));
    }
    Ok(())
}

/// Smallest power of two that is at least `n`.
pub fn padded_len(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array3;

    fn dft(x: &[Complex64]) -> Vec<Complex64> {
        let n = x.len();
        (0..n)
            .map(|k| {
                x.iter()
                    .enumerate()
                    .map(|(j, v)| v * Complex64::cis(-2.0 * PI * (j * k) as f64 / n as f64))
                    .sum()
            })
            .collect()
    }

    #[test]
    fn test_matches_direct_dft() {
        let x: Vec<Complex64> = (0..16)
            .map(|i| Complex64::new((i as f64 * 0.7).sin(), (i as f64 * 0.3).cos()))
            .collect();
        let expected = dft(&x);
        let mut y = x.clone();
        FftPlan::new(16).unwrap().forward(&mut y);
        for (a, b) in y.iter().zip(expected.iter()) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-10);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_3d_shift_theorem() {
        // A delta at (1, 2, 3) transforms to a pure phase ramp.
        let mut a = Array3::<Complex64>::zeros((4, 8, 8));
        a[[1, 2, 3]] = Complex64::new(1.0, 0.0);
        fftn(&mut a).unwrap();
        let (u0, u1, u2) = (3, 5, 7);
        let phase = -2.0 * PI * (1.0 * u0 as f64 / 4.0 + 2.0 * u1 as f64 / 8.0 + 3.0 * u2 as f64 / 8.0);
        let expected = Complex64::cis(phase);
        assert_relative_eq!(a[[u0, u1, u2]].re, expected.re, epsilon = 1e-12);
        assert_relative_eq!(a[[u0, u1, u2]].im, expected.im, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        assert!(FftPlan::new(12).is_err());
        assert!(FftPlan::new(0).is_err());
        assert_eq!(FftPlan::new(1).unwrap().len(), 1);
        assert_eq!(padded_len(17), 32);
    }
}
