//! # Some useful functions for simulating code performance
//!
//! The [`random_bits`] function fills a buffer with random bits; the [`llr_slicer`] function
//! slices LLR values to bits; the [`error_count`] function returns the number of errors in a
//! sequence with respect to a reference sequence; the [`support`] function returns the positions
//! of the `One` entries of a sequence; and the [`squared_distance`] function returns the squared
//! Euclidean distance between two symbol sequences.
//!
//! # Examples
//!
//! The code below illustrates the usage of the functions in this module.
//! ```
//! use ldpcsim::{utils, Bit};
//!
//! let mut rng = rand::rng();
//! let mut bits = vec![Bit::Zero; 40];
//! utils::random_bits(&mut bits, &mut rng);
//! let bits_hat = utils::llr_slicer(&[1.5, -0.5, 0.0]);
//! assert_eq!(bits_hat, [Bit::Zero, Bit::One, Bit::One]);
//! assert_eq!(utils::support(&bits_hat), [1, 2]);
//! let err_count = utils::error_count(&bits_hat, &[Bit::Zero; 3]);
//! assert_eq!(err_count, 2);
//! ```

use rand::Rng;

use crate::{Bit, Constellation};

/// Fills buffer with independent equiprobable random bits.
///
/// # Parameters
///
/// - `bits`: Buffer for the random bits (pre-existing contents are overwritten).
///
/// - `rng`: Random number generator to be used.
pub fn random_bits<R: Rng + ?Sized>(bits: &mut [Bit], rng: &mut R) {
    for bit in bits {
        *bit = Bit::from(rng.random_bool(0.5));
    }
}

/// Returns hard decisions on LLR values.
///
/// # Parameters
///
/// - `llrs`: LLR values to be sliced. Positive values are mapped to `Zero`, and nonpositive values
///   to `One`.
///
/// # Returns
///
/// - `bits_hat`: Bits obtained by slicing the given LLR values.
#[must_use]
pub fn llr_slicer(llrs: &[f64]) -> Vec<Bit> {
    llrs.iter().map(|&llr| Bit::from_llr(llr)).collect()
}

/// Returns number of errors in a sequence with respect to a reference sequence.
///
/// # Parameters
///
/// - `seq`: Sequence in which errors must be counted.
///
/// - `ref_seq`: Reference sequence to which the given sequence is compared.
///
/// # Returns
///
/// - `err_count`: Number of positions in which the two sequences differ. If they are of different
///   lengths, then the longer sequence is effectively truncated to the length of the shorter one.
pub fn error_count<T: PartialEq>(seq: &[T], ref_seq: &[T]) -> usize {
    ref_seq
        .iter()
        .zip(seq.iter())
        .filter(|&(x, y)| x != y)
        .count()
}

/// Returns positions of `One` entries of a sequence, in increasing order.
#[must_use]
pub fn support(bits: &[Bit]) -> Vec<usize> {
    bits.iter()
        .enumerate()
        .filter(|&(_, &b)| b == Bit::One)
        .map(|(pos, _)| pos)
        .collect()
}

/// Returns squared Euclidean distance between two sequences of constellation symbols.
///
/// # Parameters
///
/// - `constellation`: Constellation to which the symbol indices refer.
///
/// - `symbols`: Indices of the first sequence of symbols.
///
/// - `other_symbols`: Indices of the second sequence of symbols. If the sequences are of
///   different lengths, then the longer one is effectively truncated.
#[must_use]
pub fn squared_distance(
    constellation: &Constellation,
    symbols: &[usize],
    other_symbols: &[usize],
) -> f64 {
    let x = constellation.x();
    symbols
        .iter()
        .zip(other_symbols)
        .map(|(&s, &t)| (x[s] - x[t]) * (x[s] - x[t]))
        .sum()
}

#[cfg(test)]
mod tests_of_functions {
    use super::*;
    use float_eq::assert_float_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use Bit::{One, Zero};

    #[test]
    fn test_random_bits() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut bits: [Bit; 0] = [];
        random_bits(&mut bits, &mut rng);
        let num_bits = 10000;
        let mut bits = vec![Zero; num_bits];
        random_bits(&mut bits, &mut rng);
        let num_zeros = bits.iter().filter(|&b| *b == Zero).count();
        let num_ones = bits.iter().filter(|&b| *b == One).count();
        assert!(num_zeros > 9 * num_bits / 20 && num_ones > 9 * num_bits / 20);
    }

    #[test]
    fn test_llr_slicer() {
        assert!(llr_slicer(&[]).is_empty());
        assert_eq!(llr_slicer(&[0.0, 0.01, -0.01]), [One, Zero, One]);
    }

    #[test]
    fn test_error_count() {
        assert_eq!(error_count(&[], &[One, Zero]), 0);
        assert_eq!(error_count(&[One, Zero], &[]), 0);
        // Longer `seq`
        let ref_seq = [One, Zero, Zero, One, One, One, Zero, Zero];
        let seq = [One, One, Zero, Zero, One, One, Zero, Zero, Zero, One];
        assert_eq!(error_count(&seq, &ref_seq), 2);
        // Shorter `seq`
        let ref_seq = [One, Zero, Zero, One, One, One, Zero, Zero, Zero, One];
        let seq = [One, One, Zero, Zero, One, One, Zero, Zero];
        assert_eq!(error_count(&seq, &ref_seq), 2);
    }

    #[test]
    fn test_support() {
        assert!(support(&[]).is_empty());
        assert!(support(&[Zero, Zero]).is_empty());
        assert_eq!(support(&[One, Zero, Zero, One, One]), [0, 3, 4]);
    }

    #[test]
    fn test_squared_distance() {
        let constellation = Constellation::uniform(4, &[0, 1, 3, 2]).unwrap();
        assert_float_eq!(squared_distance(&constellation, &[], &[]), 0.0, abs <= 1e-12);
        assert_float_eq!(
            squared_distance(&constellation, &[0, 1, 2], &[0, 1, 2]),
            0.0,
            abs <= 1e-12
        );
        // Adjacent levels are 2 / sqrt(5) apart
        assert_float_eq!(
            squared_distance(&constellation, &[0, 1, 3], &[1, 1, 0]),
            0.8 + 7.2,
            abs <= 1e-12
        );
    }
}
