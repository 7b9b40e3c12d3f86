//! Chebyshev type II filter design
//!
//! Digital designs start from the analog lowpass prototype, move it to the
//! requested band with a frequency transform, map it to the z-plane with the
//! bilinear transform (after pre-warping the critical frequencies) and group
//! the resulting roots into second-order sections.

use super::sos::SosSection;
use crate::error::{DeformError, Result};
use log::debug;
use num_complex::Complex64;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::f64::consts::PI;
use std::fmt;

/// Sample rate used internally once frequencies are normalized to Nyquist
const NORMALIZED_FS: f64 = 2.0;

/// Band type of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandType {
    /// Pass below the cutoff
    Low,
    /// Pass above the cutoff
    High,
    /// Pass between two cutoffs
    Bandpass,
}

impl fmt::Display for BandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BandType::Low => "low",
            BandType::High => "high",
            BandType::Bandpass => "bandpass",
        })
    }
}

/// Critical frequency of a filter, in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cutoff {
    /// Single edge (low-pass or high-pass)
    Hz(f64),
    /// Lower and upper edge (band-pass)
    Band(f64, f64),
}

impl fmt::Display for Cutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cutoff::Hz(hz) => write!(f, "{} Hz", hz),
            Cutoff::Band(low, high) => write!(f, "({}, {}) Hz", low, high),
        }
    }
}

/// Zeros, poles and gain of a filter
#[derive(Debug, Clone)]
struct Zpk {
    zeros: Vec<Complex64>,
    poles: Vec<Complex64>,
    gain: f64,
}

impl Zpk {
    fn degree(&self) -> usize {
        self.poles.len().saturating_sub(self.zeros.len())
    }
}

fn product(values: impl Iterator<Item = Complex64>) -> Complex64 {
    values.fold(Complex64::one(), |acc, v| acc * v)
}

/// Estimate the minimum Chebyshev II order meeting the edge requirements
///
/// `passband` and `stopband` are edge frequencies in Hz; `gpass` is the
/// maximum passband loss and `gstop` the minimum stopband attenuation, both
/// in dB. Low-pass versus high-pass is inferred from which edge is higher.
///
/// Passband edges must lie strictly inside `(0, fs/2)`. Stopband edges are
/// not range checked: an edge geometry that admits no filter shows up as a
/// non-finite order and is reported as an error.
pub fn cheb2ord(
    passband: Cutoff,
    stopband: Cutoff,
    gpass: f64,
    gstop: f64,
    fs: f64,
) -> Result<usize> {
    let nyquist = fs / 2.0;
    let prewarp = |hz: f64| (PI * hz / fs).tan();
    let in_range = |hz: f64| hz > 0.0 && hz < nyquist;

    let natural = match (passband, stopband) {
        (Cutoff::Hz(wp), Cutoff::Hz(ws)) => {
            if !in_range(wp) {
                return Err(DeformError::OrderEstimation {
                    details: format!("passband edge {} Hz outside (0, {}) Hz", wp, nyquist),
                });
            }
            let (passb, stopb) = (prewarp(wp), prewarp(ws));
            if wp < ws {
                stopb / passb
            } else {
                passb / stopb
            }
        }
        (Cutoff::Band(wp0, wp1), Cutoff::Band(ws0, ws1)) => {
            if !(in_range(wp0) && in_range(wp1) && wp0 < wp1) {
                return Err(DeformError::OrderEstimation {
                    details: format!(
                        "passband ({}, {}) Hz must satisfy 0 < low < high < {} Hz",
                        wp0, wp1, nyquist
                    ),
                });
            }
            let (pb0, pb1) = (prewarp(wp0), prewarp(wp1));
            let nat = |stopb: f64| (stopb * stopb - pb0 * pb1) / (stopb * (pb0 - pb1));
            nat(prewarp(ws0)).abs().min(nat(prewarp(ws1)).abs())
        }
        _ => {
            return Err(DeformError::OrderEstimation {
                details: format!(
                    "passband {} and stopband {} have different shapes",
                    passband, stopband
                ),
            })
        }
    };

    let gstop_lin = 10f64.powf(0.1 * gstop.abs());
    let gpass_lin = 10f64.powf(0.1 * gpass.abs());
    let v_pass_stop = ((gstop_lin - 1.0) / (gpass_lin - 1.0)).sqrt().acosh();
    let order = (v_pass_stop / natural.acosh()).ceil();

    if !order.is_finite() || order < 1.0 {
        return Err(DeformError::OrderEstimation {
            details: format!(
                "no finite order for passband {} / stopband {} at {} dB (fs = {} Hz)",
                passband, stopband, gstop, fs
            ),
        });
    }
    Ok(order as usize)
}

/// Analog Chebyshev II lowpass prototype with stopband edge at 1 rad/s
fn cheb2ap(order: usize, rs: f64) -> Zpk {
    let n = order as i64;
    let nf = order as f64;
    let de = 1.0 / (10f64.powf(0.1 * rs) - 1.0).sqrt();
    let mu = (1.0 / de).asinh() / nf;

    // Zeros on the imaginary axis; odd orders have one zero at infinity
    let zeros: Vec<Complex64> = (-n + 1..n)
        .step_by(2)
        .filter(|&m| m != 0)
        .map(|m| Complex64::i() / (m as f64 * PI / (2.0 * nf)).sin())
        .collect();

    let poles: Vec<Complex64> = (-n + 1..n)
        .step_by(2)
        .map(|m| {
            let p = -Complex64::from_polar(1.0, PI * m as f64 / (2.0 * nf));
            Complex64::new(mu.sinh() * p.re, mu.cosh() * p.im).inv()
        })
        .collect();

    let gain = (product(poles.iter().map(|p| -*p)) / product(zeros.iter().map(|z| -*z))).re;
    Zpk { zeros, poles, gain }
}

fn lp2lp(zpk: Zpk, wo: f64) -> Zpk {
    let degree = zpk.degree() as i32;
    Zpk {
        zeros: zpk.zeros.iter().map(|z| *z * wo).collect(),
        poles: zpk.poles.iter().map(|p| *p * wo).collect(),
        gain: zpk.gain * wo.powi(degree),
    }
}

fn lp2hp(zpk: Zpk, wo: f64) -> Zpk {
    let degree = zpk.degree();
    let gain = zpk.gain
        * (product(zpk.zeros.iter().map(|z| -*z)) / product(zpk.poles.iter().map(|p| -*p))).re;
    let mut zeros: Vec<Complex64> = zpk.zeros.iter().map(|z| wo / *z).collect();
    zeros.extend(std::iter::repeat(Complex64::zero()).take(degree));
    Zpk {
        zeros,
        poles: zpk.poles.iter().map(|p| wo / *p).collect(),
        gain,
    }
}

fn lp2bp(zpk: Zpk, wo: f64, bw: f64) -> Zpk {
    let degree = zpk.degree();
    let split = |roots: &[Complex64]| -> Vec<Complex64> {
        let scaled: Vec<Complex64> = roots.iter().map(|r| *r * bw / 2.0).collect();
        let offsets: Vec<Complex64> = scaled.iter().map(|r| (*r * *r - wo * wo).sqrt()).collect();
        scaled
            .iter()
            .zip(&offsets)
            .map(|(r, o)| *r + *o)
            .chain(scaled.iter().zip(&offsets).map(|(r, o)| *r - *o))
            .collect()
    };

    let mut zeros = split(&zpk.zeros);
    zeros.extend(std::iter::repeat(Complex64::zero()).take(degree));
    Zpk {
        zeros,
        poles: split(&zpk.poles),
        gain: zpk.gain * bw.powi(degree as i32),
    }
}

fn bilinear(zpk: Zpk, fs: f64) -> Zpk {
    let degree = zpk.degree();
    let fs2 = Complex64::new(2.0 * fs, 0.0);
    let num = product(zpk.zeros.iter().map(|z| fs2 - *z));
    let den = product(zpk.poles.iter().map(|p| fs2 - *p));
    let gain = zpk.gain * (num / den).re;
    let mut zeros: Vec<Complex64> = zpk.zeros.iter().map(|z| (fs2 + *z) / (fs2 - *z)).collect();
    zeros.extend(std::iter::repeat(-Complex64::one()).take(degree));
    Zpk {
        zeros,
        poles: zpk.poles.iter().map(|p| (fs2 + *p) / (fs2 - *p)).collect(),
        gain,
    }
}

/// Group roots into conjugate pairs and pairs of reals
fn root_pairs(roots: &[Complex64], what: &str) -> Result<Vec<[Complex64; 2]>> {
    let is_real = |r: &Complex64| r.im.abs() <= 100.0 * f64::EPSILON * r.norm().max(1.0);

    let mut reals: Vec<f64> = roots.iter().filter(|r| is_real(r)).map(|r| r.re).collect();
    let upper: Vec<Complex64> = roots
        .iter()
        .filter(|r| !is_real(r) && r.im > 0.0)
        .copied()
        .collect();
    let lower = roots.iter().filter(|r| !is_real(r) && r.im < 0.0).count();

    if upper.len() != lower || reals.len() % 2 != 0 {
        return Err(DeformError::FilterDesign {
            details: format!("{} do not form conjugate pairs", what),
        });
    }

    // Reals nearest the unit circle are paired together
    reals.sort_by(|a, b| {
        b.abs()
            .partial_cmp(&a.abs())
            .unwrap_or(Ordering::Equal)
    });

    let mut pairs: Vec<[Complex64; 2]> = upper.into_iter().map(|r| [r, r.conj()]).collect();
    pairs.extend(
        reals
            .chunks(2)
            .map(|pair| [Complex64::new(pair[0], 0.0), Complex64::new(pair[1], 0.0)]),
    );
    Ok(pairs)
}

fn unit_circle_distance(pair: &[Complex64; 2]) -> f64 {
    pair.iter()
        .map(|r| (r.norm() - 1.0).abs())
        .fold(f64::INFINITY, f64::min)
}

fn pair_distance(a: &[Complex64; 2], b: &[Complex64; 2]) -> f64 {
    a.iter()
        .flat_map(|x| b.iter().map(move |y| (*x - *y).norm()))
        .fold(f64::INFINITY, f64::min)
}

/// Convert zeros, poles and gain to second-order sections
///
/// Pole pairs nearest the unit circle go last and each takes the closest
/// remaining zero pair, which keeps intermediate gains small.
fn zpk2sos(zpk: Zpk) -> Result<Vec<SosSection>> {
    let Zpk {
        mut zeros,
        mut poles,
        gain,
    } = zpk;

    let n_sections = (zeros.len().max(poles.len()) + 1) / 2;
    zeros.resize(2 * n_sections, Complex64::zero());
    poles.resize(2 * n_sections, Complex64::zero());

    let mut zero_pairs = root_pairs(&zeros, "zeros")?;
    let mut pole_pairs = root_pairs(&poles, "poles")?;
    pole_pairs.sort_by(|a, b| {
        unit_circle_distance(b)
            .partial_cmp(&unit_circle_distance(a))
            .unwrap_or(Ordering::Equal)
    });

    let mut sections = vec![None; n_sections];
    for (slot, poles) in pole_pairs.iter().enumerate().rev() {
        let nearest = zero_pairs
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                pair_distance(a, poles)
                    .partial_cmp(&pair_distance(b, poles))
                    .unwrap_or(Ordering::Equal)
            })
            .map(|(i, _)| i)
            .ok_or_else(|| DeformError::FilterDesign {
                details: "fewer zero pairs than pole pairs".to_string(),
            })?;
        let zeros = zero_pairs.swap_remove(nearest);
        sections[slot] = Some(SosSection::from_roots(zeros, *poles));
    }

    let mut sections: Vec<SosSection> = sections.into_iter().flatten().collect();
    if let Some(first) = sections.first_mut() {
        *first = first.scaled(gain);
    }
    Ok(sections)
}

/// Design a digital Chebyshev II filter as second-order sections
///
/// `order` is the prototype order (a band-pass design has twice as many
/// poles), `rs` the minimum stopband attenuation in dB, `cutoff` the
/// stopband edge(s) in Hz, and `fs` the sample rate in Hz.
pub fn cheby2(
    order: usize,
    rs: f64,
    cutoff: Cutoff,
    btype: BandType,
    fs: f64,
) -> Result<Vec<SosSection>> {
    if order == 0 {
        return Err(DeformError::FilterDesign {
            details: "filter order must be at least 1".to_string(),
        });
    }
    if !(rs.is_finite() && rs > 0.0) {
        return Err(DeformError::FilterDesign {
            details: format!("stopband attenuation must be positive, got {} dB", rs),
        });
    }
    if !(fs.is_finite() && fs > 0.0) {
        return Err(DeformError::FilterDesign {
            details: format!("sample rate must be positive, got {} Hz", fs),
        });
    }

    let nyquist = fs / 2.0;
    let normalize = |hz: f64| -> Result<f64> {
        let wn = hz / nyquist;
        if wn > 0.0 && wn < 1.0 {
            Ok(wn)
        } else {
            Err(DeformError::FilterDesign {
                details: format!(
                    "critical frequency {} Hz must satisfy 0 < f < {} Hz",
                    hz, nyquist
                ),
            })
        }
    };
    let warp = |wn: f64| 2.0 * NORMALIZED_FS * (PI * wn / NORMALIZED_FS).tan();

    let prototype = cheb2ap(order, rs);
    let analog = match (btype, cutoff) {
        (BandType::Low, Cutoff::Hz(hz)) => lp2lp(prototype, warp(normalize(hz)?)),
        (BandType::High, Cutoff::Hz(hz)) => lp2hp(prototype, warp(normalize(hz)?)),
        (BandType::Bandpass, Cutoff::Band(low, high)) => {
            if low >= high {
                return Err(DeformError::FilterDesign {
                    details: format!("band edges ({}, {}) Hz are not increasing", low, high),
                });
            }
            let (w0, w1) = (warp(normalize(low)?), warp(normalize(high)?));
            lp2bp(prototype, (w0 * w1).sqrt(), w1 - w0)
        }
        (btype, cutoff) => {
            return Err(DeformError::FilterDesign {
                details: format!("{} filter cannot use cutoff {}", btype, cutoff),
            })
        }
    };

    let sections = zpk2sos(bilinear(analog, NORMALIZED_FS))?;
    if !sections.iter().all(SosSection::is_finite) {
        return Err(DeformError::FilterDesign {
            details: format!("non-finite coefficients for {} filter at {}", btype, cutoff),
        });
    }

    debug!(
        "cheby2 {} order {} at {} ({} dB, fs {} Hz): {} sections",
        btype,
        order,
        cutoff,
        rs,
        fs,
        sections.len()
    );
    Ok(sections)
}
