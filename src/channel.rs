//! Additive white Gaussian noise (AWGN) channel with exact bitwise LLR demapping
//!
//! The [`AwgnChannel`] adds Gaussian noise of a given variance to the amplitudes of the
//! transmitted symbols, and computes, for each received sample and each label bit, the
//! log-likelihood ratio
//!
//! `log( sum_{j: bit = 0} exp(-(y - X[j])^2 / (2 sigma2)) pX[j] / sum_{j: bit = 1} ... )`,
//!
//! with positive values indicating that `Zero` is more likely. Values that overflow are clamped
//! to `MAX_LLR` (for `+inf`) or `MIN_LLR` (for `-inf`).
//!
//! # Examples
//!
//! ```
//! use ldpcsim::{AwgnChannel, Constellation, GaussianSource, NoiseKind};
//!
//! let constellation = Constellation::uniform(4, &[0, 1, 3, 2])?;
//! let mut channel = AwgnChannel::new(&constellation, GaussianSource::new(NoiseKind::BoxMuller, 7));
//! let symbols = [0, 3, 1, 2];
//! let mut received = [0.0; 4];
//! let _snr = channel.transmit(&symbols, 0.1, &mut received)?;
//! let mut llrs = [0.0; 8];
//! channel.demap(&received, 0.1, &mut llrs)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::{clamp_llr, Bit, Constellation, Error, MAX_LLR, MIN_LLR};

/// Enumeration of methods for generating standard Gaussian samples
#[derive(Clone, Eq, PartialEq, Debug, Copy, Default, Deserialize, Serialize)]
pub enum NoiseKind {
    /// Box-Muller transform, with one output of each pair cached for the next call
    #[default]
    BoxMuller,
    /// Ziggurat method of `rand_distr::StandardNormal`
    Ziggurat,
}

/// Source of standard Gaussian samples owned by a single worker
#[derive(Clone, Debug)]
pub struct GaussianSource {
    /// Generation method
    kind: NoiseKind,
    /// Uniform deviates
    rng: StdRng,
    /// Radius and angle of the Box-Muller pair whose second output is pending
    pending: Option<(f64, f64)>,
}

impl GaussianSource {
    /// Returns Gaussian source with given generation method and seed.
    #[must_use]
    pub fn new(kind: NoiseKind, seed: u64) -> Self {
        Self {
            kind,
            rng: StdRng::seed_from_u64(seed),
            pending: None,
        }
    }

    /// Returns generation method.
    #[must_use]
    pub fn kind(&self) -> NoiseKind {
        self.kind
    }

    /// Returns standard Gaussian sample.
    pub fn sample(&mut self) -> f64 {
        match self.kind {
            NoiseKind::BoxMuller => self.sample_box_muller(),
            NoiseKind::Ziggurat => self.rng.sample(StandardNormal),
        }
    }

    /// Returns next Box-Muller output.
    fn sample_box_muller(&mut self) -> f64 {
        if let Some((radius, angle)) = self.pending.take() {
            return radius * angle.cos();
        }
        // `u` lies in (0, 1] so that its logarithm is finite
        let u = 1.0 - self.rng.random::<f64>();
        let v: f64 = self.rng.random();
        let radius = (-2.0 * u.ln()).sqrt();
        let angle = 2.0 * PI * v;
        self.pending = Some((radius, angle));
        radius * angle.sin()
    }
}

/// Returns noise variance per real dimension corresponding to an SNR (dB) for unit-energy
/// symbols.
#[must_use]
pub fn sigma2_from_snr_db(snr_db: f64) -> f64 {
    10f64.powf(-snr_db / 10.0)
}

/// AWGN channel for a given constellation
#[derive(Clone, Debug)]
pub struct AwgnChannel<'a> {
    /// Constellation of the transmitted symbols
    constellation: &'a Constellation,
    /// Noise generator
    noise: GaussianSource,
}

impl<'a> AwgnChannel<'a> {
    /// Returns AWGN channel for a given constellation and noise generator.
    #[must_use]
    pub fn new(constellation: &'a Constellation, noise: GaussianSource) -> Self {
        Self {
            constellation,
            noise,
        }
    }

    /// Returns constellation of the transmitted symbols.
    #[must_use]
    pub fn constellation(&self) -> &'a Constellation {
        self.constellation
    }

    /// Transmits symbols over the channel and returns empirical SNR.
    ///
    /// # Parameters
    ///
    /// - `symbols`: Indices of transmitted symbols in the constellation.
    ///
    /// - `sigma2`: Noise variance; `0.0` gives a noiseless channel.
    ///
    /// - `received`: Buffer of the same length as `symbols` for the received samples.
    ///
    /// # Returns
    ///
    /// - `snr`: Ratio of signal energy to noise energy in this transmission (infinite for a
    ///   noiseless channel).
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer lengths differ, if any symbol index is out of range, or if
    /// `sigma2` is negative or not finite.
    pub fn transmit(
        &mut self,
        symbols: &[usize],
        sigma2: f64,
        received: &mut [f64],
    ) -> Result<f64, Error> {
        check_sigma2(sigma2)?;
        if received.len() != symbols.len() {
            return Err(Error::InvalidInput(format!(
                "Received buffer has length {} (expected {})",
                received.len(),
                symbols.len()
            )));
        }
        let x = self.constellation.x();
        if let Some(&symbol) = symbols.iter().find(|&&symbol| symbol >= x.len()) {
            return Err(Error::InvalidInput(format!(
                "Symbol index {symbol} out of range for {} constellation points",
                x.len()
            )));
        }
        let sigma = sigma2.sqrt();
        let mut signal_energy = 0.0;
        let mut noise_energy = 0.0;
        for (y, &symbol) in received.iter_mut().zip(symbols) {
            let noise = sigma * self.noise.sample();
            signal_energy += x[symbol] * x[symbol];
            noise_energy += noise * noise;
            *y = x[symbol] + noise;
        }
        Ok(signal_energy / noise_energy)
    }

    /// Computes bitwise LLR values of received samples.
    ///
    /// # Parameters
    ///
    /// - `received`: Received samples.
    ///
    /// - `sigma2`: Noise variance. For `0.0`, each sample is hard-decided to the nearest
    ///   constellation point of nonzero probability, and its label bits get LLR values of
    ///   `MAX_LLR` or `MIN_LLR`.
    ///
    /// - `llrs`: Buffer of length `received.len() * log2m` for the LLR values, where the value
    ///   for label bit `i` of sample `l` is at index `l * log2m + i`.
    ///
    /// # Errors
    ///
    /// Returns an error if `llrs` has the wrong length, or if `sigma2` is negative or not
    /// finite.
    pub fn demap(&self, received: &[f64], sigma2: f64, llrs: &mut [f64]) -> Result<(), Error> {
        check_sigma2(sigma2)?;
        let log2m = self.constellation.log2m();
        if llrs.len() != received.len() * log2m {
            return Err(Error::InvalidInput(format!(
                "LLR buffer has length {} (expected {})",
                llrs.len(),
                received.len() * log2m
            )));
        }
        for (&y, symbol_llrs) in received.iter().zip(llrs.chunks_exact_mut(log2m)) {
            self.demap_sample(y, sigma2, symbol_llrs);
        }
        Ok(())
    }

    /// Computes LLR values of the label bits of one received sample.
    fn demap_sample(&self, y: f64, sigma2: f64, llrs: &mut [f64]) {
        let constellation = self.constellation;
        if sigma2 <= 0.0 {
            let nearest = nearest_symbol(constellation, y);
            for (bit_index, llr) in llrs.iter_mut().enumerate() {
                *llr = match constellation.label_bit(nearest, bit_index) {
                    Bit::Zero => MAX_LLR,
                    Bit::One => MIN_LLR,
                };
            }
            return;
        }
        for (bit_index, llr) in llrs.iter_mut().enumerate() {
            let mut mass = [0.0; 2];
            for (symbol, (x, p)) in constellation.x().iter().zip(constellation.p_x()).enumerate() {
                let bit = usize::from(constellation.label_bit(symbol, bit_index));
                mass[bit] += (-(y - x) * (y - x) / (2.0 * sigma2)).exp() * p;
            }
            let value = (mass[0] / mass[1]).ln();
            *llr = if value.is_nan() {
                // Both sums underflowed
                clamp_llr(log_mass(constellation, y, sigma2, bit_index, Bit::Zero)
                    - log_mass(constellation, y, sigma2, bit_index, Bit::One))
            } else {
                clamp_llr(value)
            };
        }
    }
}

/// Returns log of the probability-weighted likelihood of the symbols with a given label bit,
/// computed without underflow (`-inf` if no such symbol has nonzero probability).
fn log_mass(
    constellation: &Constellation,
    y: f64,
    sigma2: f64,
    bit_index: usize,
    bit: Bit,
) -> f64 {
    let exponents: Vec<f64> = constellation
        .x()
        .iter()
        .zip(constellation.p_x())
        .enumerate()
        .filter(|&(symbol, (_, &p))| p > 0.0 && constellation.label_bit(symbol, bit_index) == bit)
        .map(|(_, (x, p))| -(y - x) * (y - x) / (2.0 * sigma2) + p.ln())
        .collect();
    let max_exponent = exponents.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max_exponent == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    max_exponent
        + exponents
            .iter()
            .map(|e| (e - max_exponent).exp())
            .sum::<f64>()
            .ln()
}

/// Returns index of the constellation point of nonzero probability nearest to a sample.
fn nearest_symbol(constellation: &Constellation, y: f64) -> usize {
    constellation
        .x()
        .iter()
        .zip(constellation.p_x())
        .enumerate()
        .filter(|&(_, (_, &p))| p > 0.0)
        .fold((0, f64::INFINITY), |(best, best_dist), (symbol, (x, _))| {
            let dist = (y - x).abs();
            if dist < best_dist {
                (symbol, dist)
            } else {
                (best, best_dist)
            }
        })
        .0
}

/// Checks validity of noise variance.
fn check_sigma2(sigma2: f64) -> Result<(), Error> {
    if sigma2.is_finite() && sigma2 >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "Noise variance must be nonnegative and finite (found {sigma2})"
        )))
    }
}


#[cfg(test)]
mod tests_of_awgn_channel {
    use super::*;
    use float_eq::assert_float_eq;

    fn bpsk() -> Constellation {
        // Symbol 0 (amplitude -1) carries bit `One`, symbol 1 (amplitude +1) carries `Zero`
        Constellation::uniform(2, &[1, 0]).unwrap()
    }

    #[test]
    fn test_transmit_invalid_input() {
        let constellation = bpsk();
        let mut channel = AwgnChannel::new(&constellation, GaussianSource::new(NoiseKind::BoxMuller, 1));
        let mut received = [0.0; 3];
        assert!(channel.transmit(&[0, 1], 1.0, &mut received).is_err());
        assert!(channel.transmit(&[0, 1, 2], 1.0, &mut received).is_err());
        assert!(channel.transmit(&[0, 1, 1], -1.0, &mut received).is_err());
        assert!(channel.transmit(&[0, 1, 1], f64::NAN, &mut received).is_err());
    }

    #[test]
    fn test_transmit_noiseless() {
        let constellation = Constellation::uniform(4, &[0, 1, 3, 2]).unwrap();
        let mut channel = AwgnChannel::new(&constellation, GaussianSource::new(NoiseKind::BoxMuller, 1));
        let symbols = [3, 0, 2, 1];
        let mut received = [0.0; 4];
        let snr = channel.transmit(&symbols, 0.0, &mut received).unwrap();
        assert!(snr.is_infinite());
        let x = constellation.x();
        assert_float_eq!(
            received.to_vec(),
            [x[3], x[0], x[2], x[1]].to_vec(),
            abs_all <= 1e-15
        );
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_transmit_noise_variance() {
        let constellation = bpsk();
        let mut channel = AwgnChannel::new(&constellation, GaussianSource::new(NoiseKind::Ziggurat, 9));
        let num_symbols = 50_000;
        let symbols = vec![1; num_symbols];
        let mut received = vec![0.0; num_symbols];
        let sigma2 = 0.25;
        let snr = channel.transmit(&symbols, sigma2, &mut received).unwrap();
        let noise_var_est =
            received.iter().map(|y| (y - 1.0) * (y - 1.0)).sum::<f64>() / num_symbols as f64;
        assert!((noise_var_est - sigma2).abs() < 0.01);
        assert!((snr - 1.0 / noise_var_est).abs() < 1e-9 * snr);
    }

    #[test]
    fn test_demap_bpsk() {
        let constellation = bpsk();
        let channel = AwgnChannel::new(&constellation, GaussianSource::new(NoiseKind::BoxMuller, 1));
        let received = [0.5, -1.0, 0.0, 2.0];
        let mut llrs = [0.0; 4];
        channel.demap(&received, 1.0, &mut llrs).unwrap();
        // LLR equals 2 y / sigma2 for BPSK
        assert_float_eq!(llrs.to_vec(), [1.0, -2.0, 0.0, 4.0].to_vec(), abs_all <= 1e-12);
        channel.demap(&received, 0.5, &mut llrs).unwrap();
        assert_float_eq!(llrs.to_vec(), [2.0, -4.0, 0.0, 8.0].to_vec(), abs_all <= 1e-12);
        // Invalid input
        assert!(channel.demap(&received, 1.0, &mut [0.0; 3]).is_err());
        assert!(channel.demap(&received, -1.0, &mut llrs).is_err());
    }

    #[test]
    fn test_demap_pam4() {
        let constellation = Constellation::new(&[0.1, 0.4, 0.4, 0.1], &[0, 1, 3, 2]).unwrap();
        let channel = AwgnChannel::new(&constellation, GaussianSource::new(NoiseKind::BoxMuller, 1));
        let (y, sigma2) = (0.3, 0.4);
        let mut llrs = [0.0; 2];
        channel.demap(&[y], sigma2, &mut llrs).unwrap();
        let x = constellation.x();
        let p_x = constellation.p_x();
        let weight = |j: usize| (-(y - x[j]) * (y - x[j]) / (2.0 * sigma2)).exp() * p_x[j];
        // Labels 0b00, 0b01, 0b11, 0b10
        let msb_llr = ((weight(0) + weight(1)) / (weight(2) + weight(3))).ln();
        let lsb_llr = ((weight(0) + weight(3)) / (weight(1) + weight(2))).ln();
        assert_float_eq!(llrs.to_vec(), [msb_llr, lsb_llr].to_vec(), abs_all <= 1e-12);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_demap_saturation() {
        let constellation = Constellation::uniform(4, &[0, 1, 3, 2]).unwrap();
        let channel = AwgnChannel::new(&constellation, GaussianSource::new(NoiseKind::BoxMuller, 1));
        let x = constellation.x().to_vec();
        let mut llrs = [0.0; 8];
        for sigma2 in [0.0, 1e-12, 1e-300] {
            channel.demap(&x, sigma2, &mut llrs).unwrap();
            assert_eq!(
                llrs,
                [MAX_LLR, MAX_LLR, MAX_LLR, MIN_LLR, MIN_LLR, MIN_LLR, MIN_LLR, MAX_LLR]
            );
        }
        // Far outside the constellation, both sums underflow
        channel.demap(&[1e6], 1e-3, &mut llrs[.. 2]).unwrap();
        assert_eq!(llrs[.. 2], [MIN_LLR, MAX_LLR]);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_demap_shaped_clamp_direction() {
        // Only symbols with most significant label bit `Zero` have nonzero probability
        let constellation = Constellation::new(&[0.5, 0.5, 0.0, 0.0], &[0, 1, 3, 2]).unwrap();
        let channel = AwgnChannel::new(&constellation, GaussianSource::new(NoiseKind::BoxMuller, 1));
        let mut llrs = [0.0; 2];
        channel.demap(&[0.9], 0.5, &mut llrs).unwrap();
        assert_eq!(llrs[0], MAX_LLR);
        assert!(llrs[1].is_finite() && llrs[1] < 0.0);
        // Hard decisions never pick a symbol of zero probability
        channel.demap(&[1.0], 0.0, &mut llrs).unwrap();
        assert_eq!(llrs, [MAX_LLR, MIN_LLR]);
    }
}
