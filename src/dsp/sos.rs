//! Second-order sections and zero-phase filtering
//!
//! Sections run in transposed direct form II. Zero-phase filtering pads the
//! signal with an odd extension, starts each pass from the steady-state
//! response to the edge sample, and filters forward then backward.

use crate::error::{DeformError, Result};
use num_complex::Complex64;

/// Biquad coefficients, normalized so that `a0 == 1`
///
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SosSection {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl SosSection {
    /// Build a section from a pair of zeros and a pair of poles
    ///
    /// Each pair must be either a complex-conjugate pair or two real roots;
    /// the imaginary parts of the expanded polynomials are discarded.
    pub fn from_roots(zeros: [Complex64; 2], poles: [Complex64; 2]) -> Self {
        let (b1, b2) = expand(zeros);
        let (a1, a2) = expand(poles);
        Self {
            b0: 1.0,
            b1,
            b2,
            a1,
            a2,
        }
    }

    /// Multiply the numerator by a gain
    pub fn scaled(self, gain: f64) -> Self {
        Self {
            b0: self.b0 * gain,
            b1: self.b1 * gain,
            b2: self.b2 * gain,
            ..self
        }
    }

    /// Whether every coefficient is finite
    pub fn is_finite(&self) -> bool {
        [self.b0, self.b1, self.b2, self.a1, self.a2]
            .iter()
            .all(|c| c.is_finite())
    }

    /// Steady-state gain of the section (response at DC)
    fn dc_gain(&self) -> f64 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }

    /// Delay-line state after an infinitely long unit step
    fn step_state(&self) -> [f64; 2] {
        let g = self.dc_gain();
        let z1 = self.b2 - self.a2 * g;
        let z0 = self.b1 - self.a1 * g + z1;
        [z0, z1]
    }

    /// Whether the section degenerates to first order
    fn first_order_numerator(&self) -> bool {
        self.b2 == 0.0
    }

    fn first_order_denominator(&self) -> bool {
        self.a2 == 0.0
    }

    #[inline]
    fn tick(&self, input: f64, state: &mut [f64; 2]) -> f64 {
        let output = self.b0 * input + state[0];
        state[0] = self.b1 * input - self.a1 * output + state[1];
        state[1] = self.b2 * input - self.a2 * output;
        output
    }
}

/// Expand (1 - r1 z^-1)(1 - r2 z^-1) and return the z^-1 and z^-2 terms
fn expand(roots: [Complex64; 2]) -> (f64, f64) {
    let sum = roots[0] + roots[1];
    let product = roots[0] * roots[1];
    (-sum.re, product.re)
}

/// Filter a signal through a cascade of sections
///
/// `state` holds one delay line per section and is updated in place.
pub fn sosfilt(sections: &[SosSection], x: &[f64], state: &mut [[f64; 2]]) -> Vec<f64> {
    debug_assert_eq!(sections.len(), state.len());
    x.iter()
        .map(|&sample| {
            sections
                .iter()
                .zip(state.iter_mut())
                .fold(sample, |acc, (section, delay)| section.tick(acc, delay))
        })
        .collect()
}

/// Initial conditions for a unit step through the whole cascade
pub fn sosfilt_zi(sections: &[SosSection]) -> Vec<[f64; 2]> {
    // The step reaching section i is scaled by the DC gain of sections 0..i
    let mut scale = 1.0;
    sections
        .iter()
        .map(|section| {
            let [z0, z1] = section.step_state();
            let zi = [scale * z0, scale * z1];
            scale *= section.dc_gain();
            zi
        })
        .collect()
}

/// Number of samples the zero-phase filter pads on each side
pub fn padlen(sections: &[SosSection]) -> usize {
    let n = sections.len();
    let trailing_zeros = sections
        .iter()
        .filter(|s| s.first_order_numerator())
        .count()
        .min(sections.iter().filter(|s| s.first_order_denominator()).count());
    3 * (2 * n + 1 - trailing_zeros)
}

/// Odd extension of `x` by `n` samples at each end
fn odd_extend(x: &[f64], n: usize) -> Vec<f64> {
    let first = x[0];
    let last = x[x.len() - 1];
    let mut ext = Vec::with_capacity(x.len() + 2 * n);
    ext.extend((1..=n).rev().map(|i| 2.0 * first - x[i]));
    ext.extend_from_slice(x);
    ext.extend((1..=n).map(|i| 2.0 * last - x[x.len() - 1 - i]));
    ext
}

/// Zero-phase forward-backward filtering
///
/// The magnitude response is squared and the phase response cancels.
/// Signals no longer than the edge padding are rejected.
pub fn sosfiltfilt(sections: &[SosSection], x: &[f64]) -> Result<Vec<f64>> {
    let edge = padlen(sections);
    if x.len() <= edge {
        return Err(DeformError::SignalTooShort {
            length: x.len(),
            padlen: edge,
        });
    }

    let zi = sosfilt_zi(sections);
    let ext = odd_extend(x, edge);

    let x0 = ext[0];
    let mut state: Vec<[f64; 2]> = zi.iter().map(|z| [z[0] * x0, z[1] * x0]).collect();
    let forward = sosfilt(sections, &ext, &mut state);

    let y0 = forward[forward.len() - 1];
    let mut state: Vec<[f64; 2]> = zi.iter().map(|z| [z[0] * y0, z[1] * y0]).collect();
    let reversed: Vec<f64> = forward.into_iter().rev().collect();
    let mut backward = sosfilt(sections, &reversed, &mut state);
    backward.reverse();

    Ok(backward[edge..backward.len() - edge].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn one_pole(pole: f64) -> SosSection {
        // y[n] = (1 - p) x[n] + p y[n-1], unity DC gain
        SosSection {
            b0: 1.0 - pole,
            b1: 0.0,
            b2: 0.0,
            a1: -pole,
            a2: 0.0,
        }
    }

    #[test]
    fn test_from_roots_conjugate_pair() {
        let r = Complex64::from_polar(0.9, 0.3);
        let section = SosSection::from_roots([r, r.conj()], [Complex64::new(0.5, 0.0); 2]);
        assert_relative_eq!(section.b1, -2.0 * 0.9 * 0.3_f64.cos(), epsilon = 1e-12);
        assert_relative_eq!(section.b2, 0.81, epsilon = 1e-12);
        assert_relative_eq!(section.a1, -1.0, epsilon = 1e-12);
        assert_relative_eq!(section.a2, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_step_state_is_steady() {
        let sections = [
            SosSection {
                b0: 0.2,
                b1: 0.3,
                b2: 0.1,
                a1: -0.5,
                a2: 0.1,
            },
            one_pole(0.7),
        ];
        let mut state = sosfilt_zi(&sections);
        let y = sosfilt(&sections, &[1.0; 16], &mut state);
        let expected: f64 = sections.iter().map(|s| s.dc_gain()).product();
        for sample in y {
            assert_relative_eq!(sample, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_padlen_counts_first_order_sections() {
        assert_eq!(padlen(&[one_pole(0.5)]), 6);
        let full = SosSection::from_roots(
            [Complex64::new(-1.0, 0.0); 2],
            [Complex64::new(0.1, 0.2), Complex64::new(0.1, -0.2)],
        );
        assert_eq!(padlen(&[full, full]), 15);
    }

    #[test]
    fn test_odd_extend() {
        let ext = odd_extend(&[1.0, 2.0, 4.0, 8.0], 2);
        assert_eq!(ext, vec![-2.0, 0.0, 1.0, 2.0, 4.0, 8.0, 12.0, 14.0]);
    }

    #[test]
    fn test_filtfilt_preserves_constant() {
        let sections = [one_pole(0.9), one_pole(0.5)];
        let y = sosfiltfilt(&sections, &[0.25; 64]).unwrap();
        assert_eq!(y.len(), 64);
        for sample in y {
            assert_relative_eq!(sample, 0.25, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_filtfilt_has_zero_phase() {
        // A symmetric impulse stays symmetric after forward-backward filtering
        let mut x = vec![0.0; 201];
        x[100] = 1.0;
        let y = sosfiltfilt(&[one_pole(0.8)], &x).unwrap();
        for i in 1..50 {
            assert_relative_eq!(y[100 - i], y[100 + i], epsilon = 1e-9);
        }
        assert!(y[100] > y[101]);
    }

    #[test]
    fn test_filtfilt_rejects_short_signal() {
        let err = sosfiltfilt(&[one_pole(0.5)], &[1.0; 6]).unwrap_err();
        assert_eq!(err.error_code(), "SIGNAL_TOO_SHORT");
        assert!(sosfiltfilt(&[one_pole(0.5)], &[1.0; 7]).is_ok());
    }
}
