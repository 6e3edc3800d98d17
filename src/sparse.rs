//! Sparse bipartite graph connecting check nodes (rows) to variable nodes (columns)

use crate::{Bit, Error};

/// Nonzero entry of a binary parity-check matrix, i.e., an edge of the Tanner graph
#[derive(Clone, Eq, PartialEq, Debug, Copy)]
pub struct Edge {
    /// Row (check node) index
    pub row: usize,
    /// Column (variable node) index
    pub col: usize,
}

/// Neighbor of a node, together with the edge that connects it
#[derive(Clone, Eq, PartialEq, Debug, Copy)]
pub struct Neighbor {
    /// Index of the node at the other end of the edge
    pub node: usize,
    /// Index of the edge in the edge list
    pub edge: usize,
}

/// Sparse binary matrix stored as row and column adjacency lists
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SparseGraph {
    /// Number of rows (check nodes)
    num_rows: usize,
    /// Number of columns (variable nodes)
    num_cols: usize,
    /// Edges, in input order
    edges: Vec<Edge>,
    /// Column and edge index of each neighbor of each row
    row_neighbors: Vec<Vec<Neighbor>>,
    /// Row and edge index of each neighbor of each column
    col_neighbors: Vec<Vec<Neighbor>>,
}

impl SparseGraph {
    /// Returns sparse graph with given dimensions and edges.
    ///
    /// # Parameters
    ///
    /// - `num_rows`: Number of rows (check nodes).
    ///
    /// - `num_cols`: Number of columns (variable nodes).
    ///
    /// - `edges`: `(row, col)` pairs of nonzero entries. Edge `e` is the `e`-th pair, and the
    ///   neighbor lists of every row and column are ordered by edge index.
    ///
    /// # Errors
    ///
    /// Returns an error if any edge lies outside the `num_rows x num_cols` matrix, or if the same
    /// `(row, col)` pair occurs more than once.
    ///
    /// # Examples
    ///
    /// ```
    /// use ldpcsim::SparseGraph;
    ///
    /// let graph = SparseGraph::new(2, 3, &[(0, 0), (0, 1), (1, 1), (1, 2)])?;
    /// assert_eq!(graph.nnz(), 4);
    /// assert_eq!(graph.col_neighbors(1).len(), 2);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(num_rows: usize, num_cols: usize, edges: &[(usize, usize)]) -> Result<Self, Error> {
        let mut row_neighbors = vec![Vec::new(); num_rows];
        let mut col_neighbors = vec![Vec::new(); num_cols];
        for (edge, &(row, col)) in edges.iter().enumerate() {
            if row >= num_rows || col >= num_cols {
                return Err(Error::InvalidInput(format!(
                    "Edge {edge} at ({row}, {col}) lies outside {num_rows} x {num_cols} matrix"
                )));
            }
            if row_neighbors[row].iter().any(|nb: &Neighbor| nb.node == col) {
                return Err(Error::InvalidInput(format!(
                    "Edge {edge} at ({row}, {col}) duplicates an earlier edge"
                )));
            }
            row_neighbors[row].push(Neighbor { node: col, edge });
            col_neighbors[col].push(Neighbor { node: row, edge });
        }
        Ok(Self {
            num_rows,
            num_cols,
            edges: edges.iter().map(|&(row, col)| Edge { row, col }).collect(),
            row_neighbors,
            col_neighbors,
        })
    }

    /// Returns number of rows (check nodes).
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Returns number of columns (variable nodes).
    #[must_use]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Returns number of nonzero entries (edges).
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.edges.len()
    }

    /// Returns all edges, in input order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns neighbors of a row.
    #[must_use]
    pub fn row_neighbors(&self, row: usize) -> &[Neighbor] {
        &self.row_neighbors[row]
    }

    /// Returns neighbors of a column.
    #[must_use]
    pub fn col_neighbors(&self, col: usize) -> &[Neighbor] {
        &self.col_neighbors[col]
    }

    /// Returns number of neighbors of each row.
    #[must_use]
    pub fn row_degrees(&self) -> Vec<usize> {
        self.row_neighbors.iter().map(Vec::len).collect()
    }

    /// Returns number of neighbors of each column.
    #[must_use]
    pub fn col_degrees(&self) -> Vec<usize> {
        self.col_neighbors.iter().map(Vec::len).collect()
    }

    /// Returns largest number of neighbors of any row.
    #[must_use]
    pub fn max_row_degree(&self) -> usize {
        self.row_neighbors.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Computes product of matrix with a column vector over GF(2).
    ///
    /// # Parameters
    ///
    /// - `right`: Column vector of length `num_cols`.
    ///
    /// - `result`: Buffer of length `num_rows` for the product (pre-existing contents are
    ///   overwritten).
    ///
    /// # Errors
    ///
    /// Returns an error if either length is wrong.
    pub fn multiply_right(&self, right: &[Bit], result: &mut [Bit]) -> Result<(), Error> {
        check_len("Column vector", right.len(), self.num_cols)?;
        check_len("Result vector", result.len(), self.num_rows)?;
        self.parity_checks(right, result);
        Ok(())
    }

    /// Computes product of matrix with a column vector over GF(2), for buffers already known to
    /// have lengths `num_cols` and `num_rows`.
    pub(crate) fn parity_checks(&self, right: &[Bit], result: &mut [Bit]) {
        for (res, neighbors) in result.iter_mut().zip(&self.row_neighbors) {
            *res = neighbors
                .iter()
                .fold(Bit::Zero, |acc, nb| acc ^ right[nb.node]);
        }
    }

    /// Computes product of a row vector with matrix over GF(2).
    ///
    /// # Parameters
    ///
    /// - `left`: Row vector of length `num_rows`.
    ///
    /// - `result`: Buffer of length `num_cols` for the product (pre-existing contents are
    ///   overwritten).
    ///
    /// # Errors
    ///
    /// Returns an error if either length is wrong.
    pub fn multiply_left(&self, left: &[Bit], result: &mut [Bit]) -> Result<(), Error> {
        check_len("Row vector", left.len(), self.num_rows)?;
        check_len("Result vector", result.len(), self.num_cols)?;
        for (res, neighbors) in result.iter_mut().zip(&self.col_neighbors) {
            *res = neighbors
                .iter()
                .fold(Bit::Zero, |acc, nb| acc ^ left[nb.node]);
        }
        Ok(())
    }
}

/// Checks that a vector has the expected length.
fn check_len(what: &str, found: usize, expected: usize) -> Result<(), Error> {
    if found == expected {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "{what} has wrong length (expected {expected}, found {found})"
        )))
    }
}
