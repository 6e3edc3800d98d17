//! Mapping between code bits and the label bits of channel symbols
//!
//! Label bit `b` (most significant first) of channel symbol `l` is code bit `table[b][l]`.
//! Every transmitted position of the code appears in the table exactly once, and punctured or
//! shortened positions never appear.

use crate::{Bit, Constellation, Error, LdpcCode};

/// Assignment of transmitted code bits to label bits of channel symbols
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct BitMapper {
    /// Code bit position for each label bit and symbol slot
    table: Vec<Vec<usize>>,
    /// Code length
    code_length: usize,
}

impl BitMapper {
    /// Returns bit mapper with given table.
    ///
    /// # Parameters
    ///
    /// - `table`: One row per label bit (most significant first), each with one code bit
    ///   position per channel symbol slot.
    ///
    /// - `code`: Code whose transmitted positions are mapped.
    ///
    /// # Errors
    ///
    /// Returns an error if `table` is empty or ragged, if its size differs from the number of
    /// transmitted bits of `code`, or if it does not use every transmitted position exactly once.
    ///
    /// # Examples
    ///
    /// ```
    /// use ldpcsim::{BitMapper, LdpcCode};
    ///
    /// let code = LdpcCode::from_dense(
    ///     &[vec![1, 1, 1, 1, 0, 0], vec![1, 1, 0, 0, 1, 1], vec![0, 0, 1, 1, 1, 1]],
    ///     &[],
    ///     &[],
    /// )?;
    /// let mapper = BitMapper::new(vec![vec![0, 1, 2], vec![5, 4, 3]], &code)?;
    /// assert_eq!(mapper.num_symbols(), 3);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(table: Vec<Vec<usize>>, code: &LdpcCode) -> Result<Self, Error> {
        let bits = table.len();
        if bits == 0 {
            return Err(Error::InvalidInput(
                "Bit mapping must have at least one row".to_string(),
            ));
        }
        let num_symbols = table[0].len();
        if table.iter().any(|row| row.len() != num_symbols) {
            return Err(Error::InvalidInput(
                "All rows of bit mapping must have the same length".to_string(),
            ));
        }
        if bits * num_symbols != code.nct() {
            return Err(Error::InvalidInput(format!(
                "Bit mapping of size {bits} x {num_symbols} does not cover {} transmitted bits",
                code.nct()
            )));
        }
        let mut used = vec![false; code.n()];
        for &pos in table.iter().flatten() {
            if pos >= code.n() {
                return Err(Error::InvalidInput(format!(
                    "Bit mapping position {pos} is out of range for code length {}",
                    code.n()
                )));
            }
            if code.is_punctured(pos) || code.is_shortened(pos) {
                return Err(Error::InvalidInput(format!(
                    "Bit mapping position {pos} is not transmitted"
                )));
            }
            if used[pos] {
                return Err(Error::InvalidInput(format!(
                    "Bit mapping position {pos} is used more than once"
                )));
            }
            used[pos] = true;
        }
        Ok(Self {
            table,
            code_length: code.n(),
        })
    }

    /// Returns bit mapper that fills symbols with consecutive transmitted bits.
    ///
    /// # Parameters
    ///
    /// - `code`: Code whose transmitted positions are mapped.
    ///
    /// - `bits`: Number of label bits per symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if `bits` is `0` or does not divide the number of transmitted bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use ldpcsim::{BitMapper, LdpcCode};
    ///
    /// let code = LdpcCode::from_dense(
    ///     &[vec![1, 1, 1, 1, 0, 0], vec![1, 1, 0, 0, 1, 1], vec![0, 0, 1, 1, 1, 1]],
    ///     &[],
    ///     &[],
    /// )?;
    /// let mapper = BitMapper::sequential(&code, 2)?;
    /// assert_eq!(mapper.table(), [vec![0, 2, 4], vec![1, 3, 5]]);
    /// assert!(BitMapper::sequential(&code, 4).is_err());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn sequential(code: &LdpcCode, bits: usize) -> Result<Self, Error> {
        if bits == 0 || code.nct() % bits != 0 {
            return Err(Error::InvalidInput(format!(
                "Number of transmitted bits ({}) is not divisible by bits per symbol ({bits})",
                code.nct()
            )));
        }
        let positions = code.transmitted_positions();
        let table = (0 .. bits)
            .map(|b| positions.iter().skip(b).step_by(bits).copied().collect())
            .collect();
        Ok(Self {
            table,
            code_length: code.n(),
        })
    }

    /// Returns number of label bits per symbol.
    #[must_use]
    pub fn bits(&self) -> usize {
        self.table.len()
    }

    /// Returns number of channel symbols per codeword.
    #[must_use]
    pub fn num_symbols(&self) -> usize {
        self.table[0].len()
    }

    /// Returns length of the code whose bits are mapped.
    #[must_use]
    pub fn code_length(&self) -> usize {
        self.code_length
    }

    /// Returns code bit position for each label bit and symbol slot.
    #[must_use]
    pub fn table(&self) -> &[Vec<usize>] {
        &self.table
    }

    /// Maps codeword to channel symbols.
    ///
    /// # Parameters
    ///
    /// - `codeword`: Code bits, of length `code_length()`.
    ///
    /// - `constellation`: Constellation with `bits()` label bits per symbol.
    ///
    /// - `symbols`: Buffer of length `num_symbols()` for the symbol indices.
    ///
    /// # Errors
    ///
    /// Returns an error if the constellation or any buffer does not fit the mapping.
    pub fn map_to_symbols(
        &self,
        codeword: &[Bit],
        constellation: &Constellation,
        symbols: &mut [usize],
    ) -> Result<(), Error> {
        self.check_constellation(constellation)?;
        self.check_code_length("code bits", codeword.len())?;
        self.check_symbol_count(symbols.len())?;
        let bits = self.bits();
        for (slot, symbol) in symbols.iter_mut().enumerate() {
            let label = self
                .table
                .iter()
                .enumerate()
                .map(|(b, row)| usize::from(codeword[row[slot]]) << (bits - 1 - b))
                .sum::<usize>();
            *symbol = constellation.labels_rev()[label];
        }
        Ok(())
    }

    /// Scatters bitwise LLR values of channel symbols to code bit positions.
    ///
    /// # Parameters
    ///
    /// - `llrs`: LLR values, with label bit `b` of symbol slot `l` at index `l * bits() + b`.
    ///
    /// - `llr_in`: LLR values of the `code_length()` code bits; positions absent from the mapping
    ///   are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if `llrs` or `llr_in` has the wrong length.
    pub fn scatter(&self, llrs: &[f64], llr_in: &mut [f64]) -> Result<(), Error> {
        let bits = self.bits();
        self.check_code_length("code bit LLR values", llr_in.len())?;
        self.check_symbol_count(llrs.len() / bits)?;
        if llrs.len() % bits != 0 {
            return Err(Error::InvalidInput(format!(
                "Number of LLR values ({}) is not a multiple of bits per symbol ({bits})",
                llrs.len()
            )));
        }
        for (slot, symbol_llrs) in llrs.chunks_exact(bits).enumerate() {
            for (row, &llr) in self.table.iter().zip(symbol_llrs) {
                llr_in[row[slot]] = llr;
            }
        }
        Ok(())
    }

    /// Checks that constellation labels have as many bits as the mapping.
    pub(crate) fn check_constellation(&self, constellation: &Constellation) -> Result<(), Error> {
        if constellation.log2m() == self.bits() {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "Constellation has {} bits per symbol (expected {})",
                constellation.log2m(),
                self.bits()
            )))
        }
    }

    /// Checks length of a buffer indexed by code bit position.
    fn check_code_length(&self, what: &str, len: usize) -> Result<(), Error> {
        if len == self.code_length {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "Expected {} {what} (found {len})",
                self.code_length
            )))
        }
    }

    /// Checks number of symbol slots.
    fn check_symbol_count(&self, num_symbols: usize) -> Result<(), Error> {
        if num_symbols == self.num_symbols() {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "Expected {} channel symbols (found {num_symbols})",
                self.num_symbols()
            )))
        }
    }
}
