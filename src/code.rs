//! Binary LDPC code described by its parity-check matrix

use std::fmt;

use itertools::Itertools;

use crate::{Bit, Error, SparseGraph};

/// Role of a code bit position
#[derive(Clone, Eq, PartialEq, Debug, Copy)]
enum Position {
    /// Sent over the channel
    Transmitted,
    /// Not sent, and erased at the receiver
    Punctured,
    /// Not sent, and known to be `Zero`
    Shortened,
}

/// Binary LDPC code with optional punctured and shortened positions
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LdpcCode {
    /// Tanner graph (rows are checks, columns are code bits)
    graph: SparseGraph,
    /// Positions whose channel LLR is erased
    puncture: Vec<usize>,
    /// Positions fixed to `Zero` and not transmitted
    shorten: Vec<usize>,
    /// Ascending complement of `puncture` and `shorten` within `[0, n)`
    transmitted_positions: Vec<usize>,
    /// Role of each position
    positions: Vec<Position>,
}

impl LdpcCode {
    /// Returns LDPC code with given parity-check matrix and puncturing/shortening pattern.
    ///
    /// # Parameters
    ///
    /// - `n`: Code length (number of columns of the parity-check matrix).
    ///
    /// - `m`: Number of parity checks (rows of the parity-check matrix).
    ///
    /// - `edges`: `(row, col)` positions of the nonzero entries of the parity-check matrix.
    ///
    /// - `puncture`: Code bit positions that are not transmitted and are erased at the receiver.
    ///
    /// - `shorten`: Code bit positions that are fixed to `Zero` and not transmitted.
    ///
    /// # Errors
    ///
    /// Returns an error if any edge is out of range or repeated, if `m` exceeds `n`, if any
    /// punctured or shortened position is out of range or repeated, or if `puncture` and
    /// `shorten` overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// use ldpcsim::LdpcCode;
    ///
    /// let edges = [(0, 0), (0, 1), (0, 2), (1, 2), (1, 3), (1, 4)];
    /// let code = LdpcCode::new(5, 2, &edges, &[4], &[0])?;
    /// assert_eq!(code.k(), 3);
    /// assert_eq!(code.transmitted_positions(), [1, 2, 3]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(
        n: usize,
        m: usize,
        edges: &[(usize, usize)],
        puncture: &[usize],
        shorten: &[usize],
    ) -> Result<Self, Error> {
        if m > n {
            return Err(Error::InvalidInput(format!(
                "Number of checks ({m}) exceeds code length ({n})"
            )));
        }
        let graph = SparseGraph::new(m, n, edges)?;
        let mut positions = vec![Position::Transmitted; n];
        mark_positions(&mut positions, puncture, Position::Punctured)?;
        mark_positions(&mut positions, shorten, Position::Shortened)?;
        let transmitted_positions = positions
            .iter()
            .positions(|&kind| kind == Position::Transmitted)
            .collect();
        Ok(Self {
            graph,
            puncture: puncture.to_vec(),
            shorten: shorten.to_vec(),
            transmitted_positions,
            positions,
        })
    }

    /// Returns LDPC code whose parity-check matrix is given in dense form.
    ///
    /// # Parameters
    ///
    /// - `rows`: Rows of the parity-check matrix, all of the same length, with nonzero entries
    ///   marking edges. Edges are numbered row by row.
    ///
    /// - `puncture`: Code bit positions that are not transmitted and are erased at the receiver.
    ///
    /// - `shorten`: Code bit positions that are fixed to `Zero` and not transmitted.
    ///
    /// # Errors
    ///
    /// Returns an error if `rows` is empty or ragged, or under the same conditions as
    /// [`LdpcCode::new`].
    ///
    /// # Examples
    ///
    /// ```
    /// use ldpcsim::LdpcCode;
    ///
    /// let code = LdpcCode::from_dense(
    ///     &[vec![1, 1, 1, 1, 0, 0], vec![1, 1, 0, 0, 1, 1], vec![0, 0, 1, 1, 1, 1]],
    ///     &[],
    ///     &[],
    /// )?;
    /// assert_eq!(code.nnz(), 12);
    /// assert_eq!(code.max_check_degree(), 4);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_dense(rows: &[Vec<u8>], puncture: &[usize], shorten: &[usize]) -> Result<Self, Error> {
        let Some(first_row) = rows.first() else {
            return Err(Error::InvalidInput(
                "Parity-check matrix must have at least one row".to_string(),
            ));
        };
        let n = first_row.len();
        if let Some(row) = rows.iter().position(|row| row.len() != n) {
            return Err(Error::InvalidInput(format!(
                "Row {row} of parity-check matrix has length {} (expected {n})",
                rows[row].len()
            )));
        }
        let edges: Vec<(usize, usize)> = rows
            .iter()
            .enumerate()
            .flat_map(|(row, entries)| {
                entries
                    .iter()
                    .positions(|&entry| entry != 0)
                    .map(move |col| (row, col))
            })
            .collect();
        Self::new(n, rows.len(), &edges, puncture, shorten)
    }

    /// Returns code length.
    #[must_use]
    pub fn n(&self) -> usize {
        self.graph.num_cols()
    }

    /// Returns number of parity checks.
    #[must_use]
    pub fn m(&self) -> usize {
        self.graph.num_rows()
    }

    /// Returns nominal code dimension `n - m`.
    #[must_use]
    pub fn k(&self) -> usize {
        self.n() - self.m()
    }

    /// Returns number of nonzero entries of the parity-check matrix.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.graph.nnz()
    }

    /// Returns number of transmitted code bits.
    #[must_use]
    pub fn nct(&self) -> usize {
        self.transmitted_positions.len()
    }

    /// Returns number of transmitted information bits (nominal dimension less shortened bits).
    #[must_use]
    pub fn kct(&self) -> usize {
        self.k().saturating_sub(self.shorten.len())
    }

    /// Returns number of transmitted parity bits.
    #[must_use]
    pub fn mct(&self) -> usize {
        self.nct().saturating_sub(self.kct())
    }

    /// Returns rate of the transmitted code (`0.0` if nothing is transmitted).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rate(&self) -> f64 {
        if self.nct() == 0 {
            0.0
        } else {
            self.kct() as f64 / self.nct() as f64
        }
    }

    /// Returns Tanner graph of the code.
    #[must_use]
    pub fn graph(&self) -> &SparseGraph {
        &self.graph
    }

    /// Returns punctured positions.
    #[must_use]
    pub fn puncture(&self) -> &[usize] {
        &self.puncture
    }

    /// Returns shortened positions.
    #[must_use]
    pub fn shorten(&self) -> &[usize] {
        &self.shorten
    }

    /// Returns transmitted positions, in ascending order.
    #[must_use]
    pub fn transmitted_positions(&self) -> &[usize] {
        &self.transmitted_positions
    }

    /// Returns `true` if a position is punctured.
    #[must_use]
    pub fn is_punctured(&self, pos: usize) -> bool {
        self.positions.get(pos) == Some(&Position::Punctured)
    }

    /// Returns `true` if a position is shortened.
    #[must_use]
    pub fn is_shortened(&self, pos: usize) -> bool {
        self.positions.get(pos) == Some(&Position::Shortened)
    }

    /// Returns largest number of code bits involved in any check.
    #[must_use]
    pub fn max_check_degree(&self) -> usize {
        self.graph.max_row_degree()
    }

    /// Returns number of code bits involved in each check.
    #[must_use]
    pub fn check_degrees(&self) -> Vec<usize> {
        self.graph.row_degrees()
    }

    /// Returns number of checks involving each code bit.
    #[must_use]
    pub fn variable_degrees(&self) -> Vec<usize> {
        self.graph.col_degrees()
    }

    /// Computes syndrome of a word.
    ///
    /// # Errors
    ///
    /// Returns an error if `word.len()` is not `n` or `syndrome.len()` is not `m`.
    pub fn syndrome(&self, word: &[Bit], syndrome: &mut [Bit]) -> Result<(), Error> {
        self.graph.multiply_right(word, syndrome)
    }

    /// Returns `true` if a word of length `n` satisfies every parity check.
    #[must_use]
    pub fn is_codeword(&self, word: &[Bit]) -> bool {
        let mut syndrome = vec![Bit::Zero; self.m()];
        self.graph.multiply_right(word, &mut syndrome).is_ok()
            && syndrome.iter().all(|&parity| parity == Bit::Zero)
    }
}

impl fmt::Display for LdpcCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=========== LDPC ===========")?;
        writeln!(f, "N : {}", self.n())?;
        writeln!(f, "M : {}", self.m())?;
        writeln!(f, "K : {}", self.k())?;
        writeln!(f, "NNZ : {}", self.nnz())?;
        writeln!(f, "puncture[{}] : {}", self.puncture.len(), self.puncture.iter().join(" "))?;
        writeln!(f, "shorten[{}] : {}", self.shorten.len(), self.shorten.iter().join(" "))?;
        writeln!(f, "Transmitted (N, K, M) : ({}, {}, {})", self.nct(), self.kct(), self.mct())?;
        writeln!(f, "Rate : {:.4}", self.rate())?;
        write!(f, "Max check degree : {}", self.max_check_degree())
    }
}

/// Marks punctured or shortened positions, rejecting repeats and overlaps.
fn mark_positions(
    positions: &mut [Position],
    marked: &[usize],
    kind: Position,
) -> Result<(), Error> {
    let what = if kind == Position::Punctured {
        "Punctured"
    } else {
        "Shortened"
    };
    let n = positions.len();
    for &pos in marked {
        match positions.get(pos).copied() {
            None => {
                return Err(Error::InvalidInput(format!(
                    "{what} position {pos} is out of range for code length {n}"
                )))
            }
            Some(Position::Transmitted) => positions[pos] = kind,
            Some(existing) if existing == kind => {
                return Err(Error::InvalidInput(format!(
                    "{what} position {pos} is listed more than once"
                )))
            }
            Some(_) => {
                return Err(Error::InvalidInput(format!(
                    "Position {pos} cannot be both punctured and shortened"
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests_of_ldpc_code {
    use super::*;
    use float_eq::assert_float_eq;
    use Bit::{One, Zero};

    fn rows_for_test() -> Vec<Vec<u8>> {
        vec![
            vec![1, 1, 1, 1, 0, 0],
            vec![1, 1, 0, 0, 1, 1],
            vec![0, 0, 1, 1, 1, 1],
        ]
    }

    #[test]
    fn test_new() {
        let edges = [(0, 0), (0, 1), (1, 1), (1, 2)];
        // Invalid input
        assert!(LdpcCode::new(3, 4, &edges, &[], &[]).is_err());
        assert!(LdpcCode::new(3, 2, &[(2, 0)], &[], &[]).is_err());
        assert!(LdpcCode::new(3, 2, &edges, &[3], &[]).is_err());
        assert!(LdpcCode::new(3, 2, &edges, &[], &[1, 1]).is_err());
        assert!(LdpcCode::new(3, 2, &edges, &[0, 1], &[1]).is_err());
        // Valid input
        let code = LdpcCode::new(3, 2, &edges, &[2], &[0]).unwrap();
        assert_eq!(code.n(), 3);
        assert_eq!(code.m(), 2);
        assert_eq!(code.k(), 1);
        assert_eq!(code.nnz(), 4);
        assert_eq!(code.transmitted_positions(), [1]);
        assert!(code.is_punctured(2) && !code.is_shortened(2));
        assert!(code.is_shortened(0) && !code.is_punctured(0));
        assert!(!code.is_punctured(1) && !code.is_shortened(1));
        assert!(!code.is_punctured(3));
    }

    #[test]
    fn test_position_errors() {
        let edges = [(0, 0), (0, 1), (1, 1), (1, 2)];
        let message = |puncture: &[usize], shorten: &[usize]| {
            LdpcCode::new(3, 2, &edges, puncture, shorten)
                .unwrap_err()
                .to_string()
        };
        assert_eq!(
            message(&[3], &[]),
            "Punctured position 3 is out of range for code length 3"
        );
        assert_eq!(
            message(&[2, 2], &[]),
            "Punctured position 2 is listed more than once"
        );
        assert_eq!(
            message(&[], &[0, 0]),
            "Shortened position 0 is listed more than once"
        );
        assert_eq!(
            message(&[1], &[1]),
            "Position 1 cannot be both punctured and shortened"
        );
    }

    #[test]
    fn test_positions_partition_code_bits() {
        let code = LdpcCode::from_dense(&rows_for_test(), &[5, 1], &[3]).unwrap();
        let mut all_positions: Vec<usize> = code
            .transmitted_positions()
            .iter()
            .chain(code.puncture())
            .chain(code.shorten())
            .copied()
            .collect();
        assert_eq!(
            all_positions.len(),
            code.nct() + code.puncture().len() + code.shorten().len()
        );
        all_positions.sort_unstable();
        assert!(all_positions.into_iter().eq(0 .. code.n()));
        assert_eq!(code.transmitted_positions(), [0, 2, 4]);
    }

    #[test]
    fn test_from_dense() {
        // Invalid input
        assert!(LdpcCode::from_dense(&[], &[], &[]).is_err());
        assert!(LdpcCode::from_dense(&[vec![1, 1], vec![1]], &[], &[]).is_err());
        // Valid input
        let code = LdpcCode::from_dense(&rows_for_test(), &[], &[]).unwrap();
        assert_eq!(code.n(), 6);
        assert_eq!(code.m(), 3);
        assert_eq!(code.nnz(), 12);
        assert_eq!(code.max_check_degree(), 4);
        assert_eq!(code.check_degrees(), [4, 4, 4]);
        assert_eq!(code.variable_degrees(), [2, 2, 2, 2, 2, 2]);
        assert_eq!(code.graph().row_neighbors(1)[2].node, 4);
        assert_eq!(code.graph().row_neighbors(1)[2].edge, 6);
    }

    #[test]
    fn test_transmitted_dimensions() {
        let code = LdpcCode::from_dense(&rows_for_test(), &[], &[]).unwrap();
        assert_eq!((code.nct(), code.kct(), code.mct()), (6, 3, 3));
        assert_float_eq!(code.rate(), 0.5, abs <= 1e-12);
        let code = LdpcCode::from_dense(&rows_for_test(), &[5], &[0]).unwrap();
        assert_eq!((code.nct(), code.kct(), code.mct()), (4, 2, 2));
        assert_float_eq!(code.rate(), 0.5, abs <= 1e-12);
        let code = LdpcCode::from_dense(&rows_for_test(), &[4, 5], &[]).unwrap();
        assert_eq!((code.nct(), code.kct(), code.mct()), (4, 3, 1));
        assert_float_eq!(code.rate(), 0.75, abs <= 1e-12);
    }

    #[test]
    fn test_is_codeword() {
        let code = LdpcCode::from_dense(&rows_for_test(), &[], &[]).unwrap();
        assert!(code.is_codeword(&[Zero; 6]));
        assert!(code.is_codeword(&[One, Zero, One, Zero, One, Zero]));
        assert!(!code.is_codeword(&[One, Zero, Zero, Zero, Zero, Zero]));
        assert!(!code.is_codeword(&[Zero; 5]));
        let mut syndrome = [Zero; 3];
        code.syndrome(&[One, Zero, Zero, Zero, Zero, Zero], &mut syndrome)
            .unwrap();
        assert_eq!(syndrome, [One, One, Zero]);
    }

    #[test]
    fn test_display() {
        let code = LdpcCode::from_dense(&rows_for_test(), &[5], &[0]).unwrap();
        let summary = code.to_string();
        assert!(summary.contains("N : 6"));
        assert!(summary.contains("puncture[1] : 5"));
        assert!(summary.contains("shorten[1] : 0"));
        assert!(summary.contains("Transmitted (N, K, M) : (4, 2, 2)"));
    }
}
