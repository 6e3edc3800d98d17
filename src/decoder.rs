//! Layered belief-propagation decoder for LDPC codes
//!
//! Each iteration visits the checks in increasing index order. For every edge `e = (j, i)` of
//! check `j`, the variable-to-check message is the channel LLR of bit `i` plus the
//! check-to-variable messages on all other edges of bit `i`; the check-to-variable messages of
//! check `j` then follow from the tanh rule over the other edges of the check. Messages of
//! checks processed later in the same iteration already see the updated messages of earlier
//! checks.
//!
//! # Examples
//!
//! ```
//! use ldpcsim::{Bit, Decoder, DecoderParams, LdpcCode};
//!
//! let code = LdpcCode::from_dense(
//!     &[vec![1, 1, 1, 1, 0, 0], vec![1, 1, 0, 0, 1, 1], vec![0, 0, 1, 1, 1, 1]],
//!     &[],
//!     &[],
//! )?;
//! let mut decoder = Decoder::new(&code, DecoderParams::default());
//! decoder.set_llr_in(&[-4.0, 3.0, -5.0, 2.5, 0.5, 6.0])?;
//! let num_iter = decoder.decode();
//! assert_eq!(num_iter, 1);
//! assert!(decoder.is_codeword());
//! assert_eq!(decoder.estimated_codeword()[0], Bit::One);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::{clamp_llr, Bit, Error, LdpcCode};

/// Parameters of the layered decoder
#[derive(Clone, Eq, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct DecoderParams {
    /// Maximum number of iterations
    pub max_iterations: u32,
    /// Whether to stop as soon as the hard decisions satisfy every check
    pub early_termination: bool,
}

impl Default for DecoderParams {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            early_termination: true,
        }
    }
}

/// Decoder state for a given code, reused across frames
#[derive(Clone, Debug)]
pub struct Decoder<'a> {
    /// Code being decoded
    code: &'a LdpcCode,
    /// Decoder parameters
    params: DecoderParams,
    /// Variable-to-check message on each edge
    lv2c: Vec<f64>,
    /// Check-to-variable message on each edge
    lc2v: Vec<f64>,
    /// Channel LLR of each code bit
    llr_in: Vec<f64>,
    /// Posterior LLR of each code bit
    llr_out: Vec<f64>,
    /// Parity of each check under the hard decisions
    syndrome: Vec<Bit>,
    /// Hard decision on each code bit
    estimated_codeword: Vec<Bit>,
    /// Half-LLR hyperbolic tangents of the incoming messages of the current check
    check_tanh: Vec<f64>,
    /// Products of leading entries of `check_tanh`
    check_prefix: Vec<f64>,
}

impl<'a> Decoder<'a> {
    /// Returns decoder for a given code, with all buffers allocated.
    #[must_use]
    pub fn new(code: &'a LdpcCode, params: DecoderParams) -> Self {
        let max_dc = code.max_check_degree();
        Self {
            code,
            params,
            lv2c: vec![0.0; code.nnz()],
            lc2v: vec![0.0; code.nnz()],
            llr_in: vec![0.0; code.n()],
            llr_out: vec![0.0; code.n()],
            syndrome: vec![Bit::Zero; code.m()],
            estimated_codeword: vec![Bit::Zero; code.n()],
            check_tanh: vec![0.0; max_dc],
            check_prefix: vec![0.0; max_dc],
        }
    }

    /// Returns code being decoded.
    #[must_use]
    pub fn code(&self) -> &'a LdpcCode {
        self.code
    }

    /// Returns decoder parameters.
    #[must_use]
    pub fn params(&self) -> DecoderParams {
        self.params
    }

    /// Returns channel LLR values.
    #[must_use]
    pub fn llr_in(&self) -> &[f64] {
        &self.llr_in
    }

    /// Returns channel LLR values for in-place update.
    pub fn llr_in_mut(&mut self) -> &mut [f64] {
        &mut self.llr_in
    }

    /// Sets channel LLR values.
    ///
    /// # Errors
    ///
    /// Returns an error if `llr_in.len()` is not the code length.
    pub fn set_llr_in(&mut self, llr_in: &[f64]) -> Result<(), Error> {
        if llr_in.len() != self.llr_in.len() {
            return Err(Error::InvalidInput(format!(
                "Expected {} channel LLR values (found {})",
                self.llr_in.len(),
                llr_in.len()
            )));
        }
        self.llr_in.copy_from_slice(llr_in);
        Ok(())
    }

    /// Returns posterior LLR values from the last decoding.
    #[must_use]
    pub fn llr_out(&self) -> &[f64] {
        &self.llr_out
    }

    /// Returns hard decisions from the last decoding.
    #[must_use]
    pub fn estimated_codeword(&self) -> &[Bit] {
        &self.estimated_codeword
    }

    /// Returns syndrome of the hard decisions from the last decoding.
    #[must_use]
    pub fn syndrome(&self) -> &[Bit] {
        &self.syndrome
    }

    /// Returns number of unsatisfied checks after the last decoding.
    #[must_use]
    pub fn syndrome_weight(&self) -> usize {
        self.syndrome.iter().filter(|&&s| s == Bit::One).count()
    }

    /// Returns `true` if the hard decisions from the last decoding satisfy every check.
    #[must_use]
    pub fn is_codeword(&self) -> bool {
        self.syndrome.iter().all(|&s| s == Bit::Zero)
    }

    /// Returns variable-to-check messages from the last decoding.
    #[must_use]
    pub fn lv2c(&self) -> &[f64] {
        &self.lv2c
    }

    /// Returns check-to-variable messages from the last decoding.
    #[must_use]
    pub fn lc2v(&self) -> &[f64] {
        &self.lc2v
    }

    /// Decodes the current channel LLR values and returns number of iterations run.
    ///
    /// Decoding stops after the first iteration whose hard decisions satisfy every check if
    /// early termination is enabled, and after `max_iterations` iterations otherwise. Afterwards
    /// the posterior LLR values, hard decisions, and syndrome describe the final messages,
    /// whether or not decoding succeeded.
    pub fn decode(&mut self) -> u32 {
        self.lc2v.fill(0.0);
        self.lv2c.fill(0.0);
        for iteration in 1 ..= self.params.max_iterations {
            for check in 0 .. self.code.m() {
                self.update_check(check);
            }
            self.update_posterior();
            if self.params.early_termination {
                self.update_syndrome();
                if self.is_codeword() {
                    return iteration;
                }
            }
        }
        if self.params.max_iterations == 0 {
            self.update_posterior();
        }
        self.update_syndrome();
        self.params.max_iterations
    }

    /// Updates messages on the edges of a check.
    fn update_check(&mut self, check: usize) {
        let code = self.code;
        let graph = code.graph();
        let neighbors = graph.row_neighbors(check);
        for (k, nb) in neighbors.iter().enumerate() {
            let extrinsic: f64 = graph
                .col_neighbors(nb.node)
                .iter()
                .filter(|other| other.edge != nb.edge)
                .map(|other| self.lc2v[other.edge])
                .sum();
            let lv2c = self.llr_in[nb.node] + extrinsic;
            self.lv2c[nb.edge] = lv2c;
            self.check_tanh[k] = (0.5 * lv2c).tanh();
        }
        let degree = neighbors.len();
        let mut prefix = 1f64;
        for (prefix_k, tanh_k) in self.check_prefix[.. degree].iter_mut().zip(&self.check_tanh) {
            *prefix_k = prefix;
            prefix *= tanh_k;
        }
        let mut suffix = 1f64;
        for ((nb, prefix_k), tanh_k) in neighbors
            .iter()
            .zip(&self.check_prefix[.. degree])
            .zip(&self.check_tanh[.. degree])
            .rev()
        {
            self.lc2v[nb.edge] = clamp_llr(2.0 * (prefix_k * suffix).atanh());
            suffix *= tanh_k;
        }
    }

    /// Updates posterior LLR values and hard decisions.
    fn update_posterior(&mut self) {
        let code = self.code;
        let graph = code.graph();
        for (var, (out, bit)) in self
            .llr_out
            .iter_mut()
            .zip(self.estimated_codeword.iter_mut())
            .enumerate()
        {
            *out = self.llr_in[var]
                + graph
                    .col_neighbors(var)
                    .iter()
                    .map(|nb| self.lc2v[nb.edge])
                    .sum::<f64>();
            *bit = Bit::from_llr(*out);
        }
    }

    /// Updates syndrome of the hard decisions.
    fn update_syndrome(&mut self) {
        self.code
            .graph()
            .parity_checks(&self.estimated_codeword, &mut self.syndrome);
    }
}
