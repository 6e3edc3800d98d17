//! Types and constants needed in multiple modules

use serde::{Deserialize, Serialize};

/// Smallest LLR value produced by the demapper and the decoder
pub const MIN_LLR: f64 = -9999.9;

/// Largest LLR value produced by the demapper and the decoder
pub const MAX_LLR: f64 = 9999.9;

/// Channel LLR assigned to shortened positions (known to be `Zero`)
pub const SHORTENED_LLR: f64 = 99999.9;

/// Enumeration of binary symbol values
#[derive(Clone, Eq, PartialEq, Debug, Copy, Default, Hash, Deserialize, Serialize)]
pub enum Bit {
    /// Binary symbol `0`
    #[default]
    Zero = 0,
    /// Binary symbol `1`
    One = 1,
}

impl Bit {
    /// Returns hard decision on an LLR value (nonpositive values are mapped to `One`).
    #[must_use]
    pub fn from_llr(llr: f64) -> Self {
        if llr <= 0.0 {
            Bit::One
        } else {
            Bit::Zero
        }
    }

    /// Returns `1.0` for `Zero` and `-1.0` for `One`.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Bit::Zero => 1.0,
            Bit::One => -1.0,
        }
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value {
            Bit::One
        } else {
            Bit::Zero
        }
    }
}

impl From<Bit> for usize {
    fn from(bit: Bit) -> Self {
        bit as usize
    }
}

impl std::ops::BitXor for Bit {
    type Output = Bit;

    fn bitxor(self, rhs: Bit) -> Bit {
        if self == rhs {
            Bit::Zero
        } else {
            Bit::One
        }
    }
}

impl std::ops::BitXorAssign for Bit {
    fn bitxor_assign(&mut self, rhs: Bit) {
        *self = *self ^ rhs;
    }
}

/// Custom error type
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Invalid input error
    #[error("{0}")]
    InvalidInput(String),
    /// File read/write error
    #[error("{0}")]
    FileReadWriteError(#[from] std::io::Error),
    /// Serde read/write error
    #[error("{0}")]
    SerdeReadWriteError(#[from] serde_json::Error),
    /// Worker pool construction error
    #[error("{0}")]
    ThreadPoolError(#[from] rayon::ThreadPoolBuildError),
}

/// Returns LLR value clamped to `[MIN_LLR, MAX_LLR]`, with undefined values mapped to `0.0`.
#[must_use]
pub fn clamp_llr(llr: f64) -> f64 {
    if llr.is_nan() {
        0.0
    } else {
        llr.clamp(MIN_LLR, MAX_LLR)
    }
}

#[cfg(test)]
mod tests_of_functions {
    use super::*;
    use Bit::{One, Zero};

    #[test]
    fn test_error_conversions() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "no file"));
        assert!(matches!(err, Error::FileReadWriteError(_)));
        assert_eq!(err.to_string(), "no file");
        let err = Error::from(serde_json::from_str::<Bit>("\"Two\"").unwrap_err());
        assert!(matches!(err, Error::SerdeReadWriteError(_)));
        let err = Error::InvalidInput("bad input".to_string());
        assert_eq!(err.to_string(), "bad input");
    }

    #[test]
    fn test_bit_from_llr() {
        assert_eq!(Bit::from_llr(0.5), Zero);
        assert_eq!(Bit::from_llr(0.0), One);
        assert_eq!(Bit::from_llr(-0.5), One);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_bit_sign() {
        assert_eq!(Zero.sign(), 1.0);
        assert_eq!(One.sign(), -1.0);
    }

    #[test]
    fn test_bitxor() {
        assert_eq!(Zero ^ Zero, Zero);
        assert_eq!(Zero ^ One, One);
        assert_eq!(One ^ Zero, One);
        assert_eq!(One ^ One, Zero);
        let mut bit = One;
        bit ^= One;
        assert_eq!(bit, Zero);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_clamp_llr() {
        assert_eq!(clamp_llr(f64::INFINITY), MAX_LLR);
        assert_eq!(clamp_llr(f64::NEG_INFINITY), MIN_LLR);
        assert_eq!(clamp_llr(f64::NAN), 0.0);
        assert_eq!(clamp_llr(-3.5), -3.5);
        assert_eq!(clamp_llr(1e6), MAX_LLR);
    }
}
