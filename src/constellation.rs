//! Equally spaced one-dimensional constellation with bit labeling
//!
//! The `M` amplitude levels are `-(M-1), -(M-1)+2, ..., M-1`, rescaled so that the average
//! energy under the symbol probabilities is unity. Symbol `j` carries the bit pattern
//! `labels[j]`, read most significant bit first.

use crate::{Bit, Error, LdpcCode};

/// Tolerance for the sum of the symbol probabilities
const PROB_SUM_TOLERANCE: f64 = 1e-6;

/// Amplitude levels, symbol probabilities, and bit labels of a constellation
#[derive(Clone, PartialEq, Debug)]
pub struct Constellation {
    /// Number of bits per symbol
    log2m: usize,
    /// Amplitude of each symbol
    x: Vec<f64>,
    /// Probability of each symbol
    p_x: Vec<f64>,
    /// Bit pattern of each symbol
    labels: Vec<usize>,
    /// Symbol carrying each bit pattern
    labels_rev: Vec<usize>,
}

impl Constellation {
    /// Returns constellation with given symbol probabilities and bit labels.
    ///
    /// # Parameters
    ///
    /// - `p_x`: Probability of each symbol, in increasing order of amplitude. The number of
    ///   symbols `M` must be a power of two no smaller than `2`, and the probabilities must be
    ///   nonnegative and sum to `1`.
    ///
    /// - `labels`: Bit pattern carried by each symbol; must be a permutation of `0, 1, ..., M-1`.
    ///
    /// # Errors
    ///
    /// Returns an error if `M` is invalid, if `p_x` is not a probability distribution, or if
    /// `labels` is not a permutation of `0, 1, ..., M-1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ldpcsim::Constellation;
    ///
    /// let constellation = Constellation::new(&[0.1, 0.4, 0.4, 0.1], &[0, 1, 3, 2])?;
    /// assert_eq!(constellation.log2m(), 2);
    /// assert!((constellation.energy() - 1.0).abs() < 1e-12);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(p_x: &[f64], labels: &[usize]) -> Result<Self, Error> {
        let m = p_x.len();
        check_order(m)?;
        check_probabilities(p_x)?;
        check_labels(labels, m)?;
        let levels: Vec<f64> = (0 .. m).map(|j| level(j, m)).collect();
        let energy: f64 = levels.iter().zip(p_x).map(|(x, p)| p * x * x).sum();
        let scale = energy.sqrt();
        let mut labels_rev = vec![0; m];
        for (symbol, &label) in labels.iter().enumerate() {
            labels_rev[label] = symbol;
        }
        Ok(Self {
            log2m: m.trailing_zeros() as usize,
            x: levels.into_iter().map(|x| x / scale).collect(),
            p_x: p_x.to_vec(),
            labels: labels.to_vec(),
            labels_rev,
        })
    }

    /// Returns constellation with equiprobable symbols.
    ///
    /// # Parameters
    ///
    /// - `m`: Number of symbols; must be a power of two no smaller than `2`.
    ///
    /// - `labels`: Bit pattern carried by each symbol; must be a permutation of `0, 1, ..., m-1`.
    ///
    /// # Errors
    ///
    /// Returns an error if `m` is invalid or `labels` is not a permutation of
    /// `0, 1, ..., m-1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ldpcsim::Constellation;
    ///
    /// let bpsk = Constellation::uniform(2, &[1, 0])?;
    /// assert_eq!(bpsk.x(), [-1.0, 1.0]);
    /// assert_eq!(bpsk.labels_rev(), [1, 0]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[allow(clippy::cast_precision_loss)]
    pub fn uniform(m: usize, labels: &[usize]) -> Result<Self, Error> {
        check_order(m)?;
        Self::new(&vec![1.0 / m as f64; m], labels)
    }

    /// Returns copy of constellation rescaled so that its outermost levels are `±amplitude`.
    ///
    /// # Errors
    ///
    /// Returns an error if `amplitude` is not a positive finite number.
    pub fn with_amplitude_range(&self, amplitude: f64) -> Result<Self, Error> {
        if !(amplitude.is_finite() && amplitude > 0.0) {
            return Err(Error::InvalidInput(format!(
                "Amplitude range must be positive and finite (found {amplitude})"
            )));
        }
        let outermost = self.x.iter().fold(0.0f64, |acc, x| acc.max(x.abs()));
        let scale = amplitude / outermost;
        Ok(Self {
            x: self.x.iter().map(|x| x * scale).collect(),
            ..self.clone()
        })
    }

    /// Returns number of symbols.
    #[must_use]
    pub fn m(&self) -> usize {
        self.x.len()
    }

    /// Returns number of bits per symbol.
    #[must_use]
    pub fn log2m(&self) -> usize {
        self.log2m
    }

    /// Returns amplitude of each symbol.
    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Returns probability of each symbol.
    #[must_use]
    pub fn p_x(&self) -> &[f64] {
        &self.p_x
    }

    /// Returns bit pattern of each symbol.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Returns symbol carrying each bit pattern.
    #[must_use]
    pub fn labels_rev(&self) -> &[usize] {
        &self.labels_rev
    }

    /// Returns bit `bit_index` (most significant first) of the label of a symbol.
    #[must_use]
    pub fn label_bit(&self, symbol: usize, bit_index: usize) -> Bit {
        let mask = 1 << (self.log2m - 1 - bit_index);
        Bit::from(self.labels[symbol] & mask != 0)
    }

    /// Returns average symbol energy.
    #[must_use]
    pub fn energy(&self) -> f64 {
        self.x.iter().zip(&self.p_x).map(|(x, p)| p * x * x).sum()
    }

    /// Returns information bits per channel symbol when used with a code.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn spectral_efficiency(&self, code: &LdpcCode) -> f64 {
        code.rate() * self.log2m as f64
    }
}

/// Returns unnormalized level of symbol `j` out of `m`.
#[allow(clippy::cast_precision_loss)]
fn level(j: usize, m: usize) -> f64 {
    (2 * j) as f64 - (m - 1) as f64
}

/// Checks validity of the number of symbols.
fn check_order(m: usize) -> Result<(), Error> {
    if m < 2 || !m.is_power_of_two() {
        return Err(Error::InvalidInput(format!(
            "Number of constellation points must be a power of two no smaller than 2 (found {m})"
        )));
    }
    Ok(())
}

/// Checks that symbol probabilities form a probability distribution.
fn check_probabilities(p_x: &[f64]) -> Result<(), Error> {
    if p_x.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(Error::InvalidInput(format!(
            "Symbol probabilities must be nonnegative (found {p_x:?})"
        )));
    }
    let sum: f64 = p_x.iter().sum();
    if (sum - 1.0).abs() > PROB_SUM_TOLERANCE {
        return Err(Error::InvalidInput(format!(
            "Symbol probabilities must sum to 1 (found sum {sum})"
        )));
    }
    Ok(())
}

/// Checks that labels are a permutation of `0, 1, ..., m-1`.
fn check_labels(labels: &[usize], m: usize) -> Result<(), Error> {
    if labels.len() != m {
        return Err(Error::InvalidInput(format!(
            "Number of labels ({}) does not match number of constellation points ({m})",
            labels.len()
        )));
    }
    let mut labels_sorted = labels.to_vec();
    labels_sorted.sort_unstable();
    if !labels_sorted.into_iter().eq(0 .. m) {
        return Err(Error::InvalidInput(format!(
            "Expected permutation of all integers in the range [0, {m}), found {labels:?}"
        )));
    }
    Ok(())
}
