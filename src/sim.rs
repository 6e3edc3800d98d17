//! Monte Carlo simulation of LDPC code performance over an AWGN channel
//!
//! For each SNR point in turn, a fixed pool of worker threads runs frames until the number of
//! frame errors reaches `min_frame_errors`, the number of frames reaches `max_frames`, or the
//! [`StopToken`] is triggered. Each frame draws random code bits, maps them to channel symbols,
//! transmits them, and decodes the demapped LLR values after flipping their signs by the
//! transmitted bits, so that the decoder always works relative to the all-zero codeword.
//!
//! Frame counts and error tallies live in a single critical section, which is also where the
//! stopping rule is evaluated and where the result and error logs are written.
//!
//! # Examples
//!
//! ```
//! use ldpcsim::{BitMapper, Constellation, LdpcCode, SimParams, Simulation, StopToken};
//!
//! let code = LdpcCode::from_dense(
//!     &[vec![1, 1, 1, 1, 0, 0], vec![1, 1, 0, 0, 1, 1], vec![0, 0, 1, 1, 1, 1]],
//!     &[],
//!     &[],
//! )?;
//! let constellation = Constellation::uniform(2, &[1, 0])?;
//! let mapper = BitMapper::sequential(&code, 1)?;
//! let params = SimParams {
//!     snrs_db: vec![2.0, 4.0],
//!     max_frames: 200,
//!     min_frame_errors: 10,
//!     ..SimParams::default()
//! };
//! let sim = Simulation::new(code, constellation, mapper, params)?;
//! let results = sim.run(&StopToken::new())?;
//! assert_eq!(results.len(), 2);
//! assert!(results.iter().all(|result| result.frames <= 200));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::channel::sigma2_from_snr_db;
use crate::report::{ErrorLog, FrameErrorReport, ResultLog};
use crate::{
    utils, AwgnChannel, Bit, BitMapper, Constellation, Decoder, DecoderParams, Error,
    GaussianSource, LdpcCode, NoiseKind, SHORTENED_LLR,
};

/// Parameters of the channel
#[derive(Clone, PartialEq, Debug, Copy, Default, Deserialize, Serialize)]
pub struct ChannelParams {
    /// Base seed of the random number generators (drawn from entropy if `None`)
    pub seed: Option<u64>,
    /// Magnitude of the outermost constellation level (unit average energy if `None`)
    pub amplitude_range: Option<f64>,
    /// Method for generating Gaussian noise
    pub noise: NoiseKind,
}

/// Parameters of a simulation over a list of SNR points
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct SimParams {
    /// SNR values (dB), simulated in order
    pub snrs_db: Vec<f64>,
    /// Maximum number of frames per SNR point
    pub max_frames: u64,
    /// Number of frame errors after which an SNR point is finished
    pub min_frame_errors: u64,
    /// Number of worker threads
    pub num_threads: usize,
    /// Path of the result log (none written if `None`)
    pub result_path: Option<PathBuf>,
    /// Whether to log every frame error
    pub log_errors: bool,
    /// Path of the error log (`errors_<result file name>` next to the result log if `None`)
    pub error_log_path: Option<PathBuf>,
    /// Whether the result log includes the average time per frame
    pub log_frame_time: bool,
    /// Decoder parameters
    pub decoder: DecoderParams,
    /// Channel parameters
    pub channel: ChannelParams,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            snrs_db: vec![0.0],
            max_frames: 10_000,
            min_frame_errors: 100,
            num_threads: 1,
            result_path: None,
            log_errors: false,
            error_log_path: None,
            log_frame_time: false,
            decoder: DecoderParams::default(),
            channel: ChannelParams::default(),
        }
    }
}

impl SimParams {
    /// Checks validity of simulation parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the SNR list is empty or has a non-finite value, if the number of
    /// threads, the maximum number of frames, the minimum number of frame errors, or the maximum
    /// number of decoder iterations is `0`, or if the amplitude range is not positive and finite.
    pub fn check(&self) -> Result<(), Error> {
        if self.snrs_db.is_empty() {
            return Err(Error::InvalidInput(
                "List of SNR values cannot be empty".to_string(),
            ));
        }
        if let Some(snr_db) = self.snrs_db.iter().find(|snr_db| !snr_db.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "SNR value {snr_db} is not finite"
            )));
        }
        if self.num_threads == 0 {
            return Err(Error::InvalidInput(
                "Number of threads cannot be zero".to_string(),
            ));
        }
        if self.max_frames == 0 {
            return Err(Error::InvalidInput(
                "Maximum number of frames cannot be zero".to_string(),
            ));
        }
        if self.min_frame_errors == 0 {
            return Err(Error::InvalidInput(
                "Minimum number of frame errors cannot be zero".to_string(),
            ));
        }
        if self.decoder.max_iterations == 0 {
            return Err(Error::InvalidInput(
                "Maximum number of decoder iterations cannot be zero".to_string(),
            ));
        }
        if let Some(amplitude) = self.channel.amplitude_range {
            if !(amplitude.is_finite() && amplitude > 0.0) {
                return Err(Error::InvalidInput(format!(
                    "Amplitude range must be positive and finite (found {amplitude})"
                )));
            }
        }
        Ok(())
    }

    /// Returns path of the error log, if frame errors are to be logged.
    #[must_use]
    pub fn error_log_path(&self) -> Option<PathBuf> {
        if !self.log_errors {
            return None;
        }
        self.error_log_path
            .clone()
            .or_else(|| self.result_path.as_deref().and_then(default_error_log_path))
    }

    /// Reads simulation parameters from a JSON file and checks them.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the parameters are invalid.
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let reader = BufReader::new(File::open(path)?);
        let params: Self = serde_json::from_reader(reader)?;
        params.check()?;
        Ok(params)
    }

    /// Saves simulation parameters to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save_json(&self, path: &Path) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

/// Returns `errors_<file name>` in the directory of a result log.
fn default_error_log_path(result_path: &Path) -> Option<PathBuf> {
    let file_name = result_path.file_name()?.to_string_lossy();
    Some(result_path.with_file_name(format!("errors_{file_name}")))
}

/// Tallies of a simulation at one SNR point
#[derive(Clone, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct SimulationResult {
    /// SNR (dB)
    pub snr_db: f64,
    /// Noise variance corresponding to the SNR
    pub sigma2: f64,
    /// Code length
    pub code_length: usize,
    /// Number of frames decoded
    pub frames: u64,
    /// Number of frames decoded in error
    pub frame_errors: u64,
    /// Number of code bits decoded in error
    pub bit_errors: u64,
    /// Total number of decoder iterations
    pub iterations: u64,
    /// Wall-clock time (s) spent on this SNR point
    pub elapsed_secs: f64,
}

impl SimulationResult {
    /// Returns empty result for an SNR point.
    #[must_use]
    pub fn new(snr_db: f64, code_length: usize) -> Self {
        Self {
            snr_db,
            sigma2: sigma2_from_snr_db(snr_db),
            code_length,
            frames: 0,
            frame_errors: 0,
            bit_errors: 0,
            iterations: 0,
            elapsed_secs: 0.0,
        }
    }

    /// Returns frame error rate (`0.0` if no frames were decoded).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fer(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        self.frame_errors as f64 / self.frames as f64
    }

    /// Returns bit error rate (`0.0` if no frames were decoded).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ber(&self) -> f64 {
        if self.frames == 0 || self.code_length == 0 {
            return 0.0;
        }
        self.bit_errors as f64 / (self.frames as f64 * self.code_length as f64)
    }

    /// Returns average number of decoder iterations per frame (`0.0` if no frames were decoded).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_iterations(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        self.iterations as f64 / self.frames as f64
    }

    /// Returns average wall-clock time (ms) per frame (`0.0` if no frames were decoded).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_frame_time_ms(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        1000.0 * self.elapsed_secs / self.frames as f64
    }

    /// Returns line of the result log, optionally with the average frame time.
    #[must_use]
    pub fn log_line(&self, with_frame_time: bool) -> String {
        if with_frame_time {
            format!("{self} {:.3}", self.avg_frame_time_ms())
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6} {:.3e} {:.3e} {} {:.3e}",
            self.snr_db,
            self.fer(),
            self.ber(),
            self.frames,
            self.avg_iterations()
        )
    }
}

/// Outcome of decoding one frame, relative to the all-zero codeword
#[derive(Clone, Eq, PartialEq, Debug, Copy)]
pub struct FrameOutcome {
    /// Number of code bits decoded in error
    pub bit_errors: usize,
    /// Number of decoder iterations
    pub iterations: u32,
    /// Number of unsatisfied checks
    pub syndrome_weight: usize,
    /// Whether the decoded word satisfies every check
    pub is_codeword: bool,
}

impl FrameOutcome {
    /// Returns outcome of the last decoding, which ran a given number of iterations.
    #[must_use]
    pub fn from_decoder(decoder: &Decoder<'_>, iterations: u32) -> Self {
        Self {
            bit_errors: decoder
                .estimated_codeword()
                .iter()
                .filter(|&&bit| bit == Bit::One)
                .count(),
            iterations,
            syndrome_weight: decoder.syndrome_weight(),
            is_codeword: decoder.is_codeword(),
        }
    }

    /// Returns `true` if the frame counts as a frame error.
    #[must_use]
    pub fn is_frame_error(&self) -> bool {
        self.bit_errors > 0 || self.syndrome_weight > 0
    }
}

/// Cooperative cancellation signal shared between a simulation and its controller
#[derive(Clone, Debug, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    /// Returns token that has not been triggered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Triggers the token. Frames in progress are finished, and no new ones are started.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns `true` if the token has been triggered.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Simulation of a code, constellation, and bit mapping over a list of SNR points
#[derive(Clone, Debug)]
pub struct Simulation {
    /// Code being simulated
    code: LdpcCode,
    /// Constellation, rescaled to the amplitude range if one is set
    constellation: Constellation,
    /// Mapping between code bits and label bits
    mapper: BitMapper,
    /// Simulation parameters
    params: SimParams,
}

/// State shared by the workers of one SNR point
#[derive(Debug)]
struct SharedState {
    /// Tallies so far
    result: SimulationResult,
    /// Result log, if one is written
    result_log: Option<ResultLog>,
    /// Start time of the SNR point
    started: Instant,
    /// Whether a worker has failed
    aborted: bool,
}

impl Simulation {
    /// Returns simulation with given components and parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid, if the bit mapping does not fit the code,
    /// or if the constellation labels do not have as many bits as the bit mapping.
    pub fn new(
        code: LdpcCode,
        constellation: Constellation,
        mapper: BitMapper,
        params: SimParams,
    ) -> Result<Self, Error> {
        params.check()?;
        let mapper = BitMapper::new(mapper.table().to_vec(), &code)?;
        mapper.check_constellation(&constellation)?;
        let constellation = match params.channel.amplitude_range {
            Some(amplitude) => constellation.with_amplitude_range(amplitude)?,
            None => constellation,
        };
        Ok(Self {
            code,
            constellation,
            mapper,
            params,
        })
    }

    /// Returns code being simulated.
    #[must_use]
    pub fn code(&self) -> &LdpcCode {
        &self.code
    }

    /// Returns constellation used for transmission.
    #[must_use]
    pub fn constellation(&self) -> &Constellation {
        &self.constellation
    }

    /// Returns bit mapping.
    #[must_use]
    pub fn mapper(&self) -> &BitMapper {
        &self.mapper
    }

    /// Returns simulation parameters.
    #[must_use]
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Runs simulation and returns results of the SNR points processed.
    ///
    /// SNR points are processed in order until all are finished or `stop` is triggered; a point
    /// interrupted by `stop` is included with the frames completed so far. The result log, if
    /// any, is rewritten on every frame error and at the end of each SNR point; the error log,
    /// if any, gets one line per frame error. Failures to write either log are reported as
    /// warnings and do not stop the simulation.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker threads cannot be started or if a worker fails.
    pub fn run(&self, stop: &StopToken) -> Result<Vec<SimulationResult>, Error> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.params.num_threads)
            .build()?;
        let base_seed = self
            .params
            .channel
            .seed
            .unwrap_or_else(|| rand::rng().random());
        let error_log = self.params.error_log_path().map(|path| ErrorLog::new(&path));
        let mut result_log = self
            .params
            .result_path
            .as_deref()
            .map(|path| ResultLog::new(path, self.params.log_frame_time));
        let mut results = Vec::with_capacity(self.params.snrs_db.len());
        for (snr_index, &snr_db) in self.params.snrs_db.iter().enumerate() {
            if stop.is_stopped() {
                break;
            }
            let result = SimulationResult::new(snr_db, self.code.n());
            info!(snr = snr_db, sigma2 = result.sigma2, "SNR point started");
            let shared = Mutex::new(SharedState {
                result,
                result_log: result_log.take(),
                started: Instant::now(),
                aborted: false,
            });
            let snr_seed = base_seed.wrapping_add((snr_index as u64) << 32);
            let outcomes = pool.broadcast(|ctx| {
                self.run_worker(
                    snr_index,
                    snr_seed.wrapping_add(ctx.index() as u64),
                    &shared,
                    error_log.as_ref(),
                    stop,
                )
            });
            let mut state = shared.into_inner().unwrap_or_else(PoisonError::into_inner);
            state.result.elapsed_secs = state.started.elapsed().as_secs_f64();
            if let Some(log) = state.result_log.as_mut() {
                log.update(snr_index, &state.result);
                log.write_or_warn();
            }
            result_log = state.result_log;
            let result = state.result;
            info!(
                snr = snr_db,
                frames = result.frames,
                frame_errors = result.frame_errors,
                fer = result.fer(),
                ber = result.ber(),
                avg_iter = result.avg_iterations(),
                "SNR point finished"
            );
            results.push(result);
            for outcome in outcomes {
                outcome?;
            }
        }
        Ok(results)
    }

    /// Returns `true` if the stopping rule of an SNR point is satisfied.
    fn is_finished(&self, result: &SimulationResult) -> bool {
        result.frame_errors >= self.params.min_frame_errors
            || result.frames >= self.params.max_frames
    }

    /// Runs frames of an SNR point until the stopping rule fires or `stop` is triggered.
    fn run_worker(
        &self,
        snr_index: usize,
        seed: u64,
        shared: &Mutex<SharedState>,
        error_log: Option<&ErrorLog>,
        stop: &StopToken,
    ) -> Result<(), Error> {
        let snr_db = self.params.snrs_db[snr_index];
        let sigma2 = sigma2_from_snr_db(snr_db);
        let mut worker = Worker::new(self, seed);
        loop {
            if stop.is_stopped() {
                return Ok(());
            }
            {
                let state = lock(shared);
                if state.aborted || self.is_finished(&state.result) {
                    return Ok(());
                }
            }
            let frame = worker.run_frame(sigma2).and_then(|outcome| {
                let report = match error_log {
                    Some(_) if outcome.is_frame_error() => Some(worker.error_report(snr_db)?),
                    _ => None,
                };
                Ok((outcome, report))
            });
            let (outcome, report) = match frame {
                Ok(frame) => frame,
                Err(err) => {
                    lock(shared).aborted = true;
                    return Err(err);
                }
            };
            let mut guard = lock(shared);
            let state = &mut *guard;
            // Frames finishing after the stopping rule fired are discarded
            if state.aborted || self.is_finished(&state.result) {
                return Ok(());
            }
            state.result.frames += 1;
            state.result.bit_errors += outcome.bit_errors as u64;
            state.result.iterations += u64::from(outcome.iterations);
            state.result.elapsed_secs = state.started.elapsed().as_secs_f64();
            if outcome.is_frame_error() {
                state.result.frame_errors += 1;
                let frame = state.result.frames;
                debug!(
                    snr = snr_db,
                    frame,
                    bit_errors = outcome.bit_errors,
                    syndrome_weight = outcome.syndrome_weight,
                    iterations = outcome.iterations,
                    "frame error"
                );
                if let Some(log) = state.result_log.as_mut() {
                    log.update(snr_index, &state.result);
                    log.write_or_warn();
                }
                if let (Some(error_log), Some(report)) = (error_log, report) {
                    error_log.append_or_warn(&FrameErrorReport { frame, ..report });
                }
            }
        }
    }
}

/// Locks shared state, recovering it if another worker panicked while holding the lock.
fn lock(shared: &Mutex<SharedState>) -> MutexGuard<'_, SharedState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-thread state for running frames
#[derive(Debug)]
struct Worker<'a> {
    /// Simulation being run
    sim: &'a Simulation,
    /// Decoder with its message buffers
    decoder: Decoder<'a>,
    /// Channel with its own noise generator
    channel: AwgnChannel<'a>,
    /// Generator of the code bits
    bit_rng: StdRng,
    /// Code bits of the current frame
    codeword: Vec<Bit>,
    /// Transmitted symbols of the current frame
    symbols: Vec<usize>,
    /// Received samples of the current frame
    received: Vec<f64>,
    /// Demapped LLR values of the current frame
    llrs: Vec<f64>,
}

impl<'a> Worker<'a> {
    /// Returns worker whose random number generators derive from a given seed.
    fn new(sim: &'a Simulation, seed: u64) -> Self {
        let mut bit_rng = StdRng::seed_from_u64(seed);
        let noise = GaussianSource::new(sim.params.channel.noise, bit_rng.random());
        let num_symbols = sim.mapper.num_symbols();
        Self {
            sim,
            decoder: Decoder::new(&sim.code, sim.params.decoder),
            channel: AwgnChannel::new(&sim.constellation, noise),
            bit_rng,
            codeword: vec![Bit::Zero; sim.code.n()],
            symbols: vec![0; num_symbols],
            received: vec![0.0; num_symbols],
            llrs: vec![0.0; num_symbols * sim.mapper.bits()],
        }
    }

    /// Transmits and decodes a random word.
    fn run_frame(&mut self, sigma2: f64) -> Result<FrameOutcome, Error> {
        let code = &self.sim.code;
        utils::random_bits(&mut self.codeword, &mut self.bit_rng);
        for &pos in code.shorten() {
            self.codeword[pos] = Bit::Zero;
        }
        self.sim
            .mapper
            .map_to_symbols(&self.codeword, &self.sim.constellation, &mut self.symbols)?;
        self.channel
            .transmit(&self.symbols, sigma2, &mut self.received)?;
        self.channel.demap(&self.received, sigma2, &mut self.llrs)?;
        let llr_in = self.decoder.llr_in_mut();
        self.sim.mapper.scatter(&self.llrs, llr_in)?;
        for &pos in code.puncture() {
            llr_in[pos] = 0.0;
        }
        for &pos in code.shorten() {
            llr_in[pos] = SHORTENED_LLR;
        }
        for (llr, &bit) in llr_in.iter_mut().zip(&self.codeword) {
            *llr *= bit.sign();
        }
        let iterations = self.decoder.decode();
        Ok(FrameOutcome::from_decoder(&self.decoder, iterations))
    }

    /// Returns diagnostics of the last frame (with frame number `0`).
    fn error_report(&self, snr_db: f64) -> Result<FrameErrorReport, Error> {
        let estimate = self.decoder.estimated_codeword();
        let decoded_word: Vec<Bit> = estimate
            .iter()
            .zip(&self.codeword)
            .map(|(&e, &c)| e ^ c)
            .collect();
        let mut decoded_symbols = vec![0; self.symbols.len()];
        self.sim.mapper.map_to_symbols(
            &decoded_word,
            &self.sim.constellation,
            &mut decoded_symbols,
        )?;
        Ok(FrameErrorReport {
            snr_db,
            frame: 0,
            is_codeword: self.decoder.is_codeword(),
            squared_distance: utils::squared_distance(
                &self.sim.constellation,
                &self.symbols,
                &decoded_symbols,
            ),
            failed_bits: utils::support(estimate),
            failed_checks: utils::support(self.decoder.syndrome()),
        })
    }
}

#[cfg(test)]
mod tests_of_sim_params {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_check() {
        assert!(SimParams::default().check().is_ok());
        // Invalid input
        let invalid = [
            SimParams {
                snrs_db: vec![],
                ..SimParams::default()
            },
            SimParams {
                snrs_db: vec![1.0, f64::NAN],
                ..SimParams::default()
            },
            SimParams {
                num_threads: 0,
                ..SimParams::default()
            },
            SimParams {
                max_frames: 0,
                ..SimParams::default()
            },
            SimParams {
                min_frame_errors: 0,
                ..SimParams::default()
            },
            SimParams {
                decoder: DecoderParams {
                    max_iterations: 0,
                    early_termination: true,
                },
                ..SimParams::default()
            },
            SimParams {
                channel: ChannelParams {
                    amplitude_range: Some(-1.0),
                    ..ChannelParams::default()
                },
                ..SimParams::default()
            },
        ];
        for params in &invalid {
            assert!(params.check().is_err());
        }
    }

    #[test]
    fn test_error_log_path() {
        let params = SimParams {
            result_path: Some(PathBuf::from("out").join("ber.txt")),
            ..SimParams::default()
        };
        assert_eq!(params.error_log_path(), None);
        let params = SimParams {
            log_errors: true,
            ..params
        };
        assert_eq!(
            params.error_log_path(),
            Some(PathBuf::from("out").join("errors_ber.txt"))
        );
        let params = SimParams {
            error_log_path: Some(PathBuf::from("frames.log")),
            ..params
        };
        assert_eq!(params.error_log_path(), Some(PathBuf::from("frames.log")));
        let params = SimParams {
            log_errors: true,
            ..SimParams::default()
        };
        assert_eq!(params.error_log_path(), None);
    }

    #[test]
    fn test_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("params.json");
        let params = SimParams {
            snrs_db: vec![1.0, 1.5, 2.0],
            max_frames: 5000,
            min_frame_errors: 40,
            num_threads: 3,
            result_path: Some(PathBuf::from("results.txt")),
            log_errors: true,
            error_log_path: None,
            log_frame_time: true,
            decoder: DecoderParams {
                max_iterations: 25,
                early_termination: false,
            },
            channel: ChannelParams {
                seed: Some(99),
                amplitude_range: Some(1.5),
                noise: NoiseKind::Ziggurat,
            },
        };
        params.save_json(&path).unwrap();
        assert_eq!(SimParams::from_json_file(&path).unwrap(), params);
        // Invalid parameters are rejected on load
        SimParams {
            num_threads: 0,
            ..params
        }
        .save_json(&path)
        .unwrap();
        assert!(SimParams::from_json_file(&path).is_err());
        assert!(SimParams::from_json_file(&dir.path().join("missing.json")).is_err());
    }
}

#[cfg(test)]
mod tests_of_simulation_result {
    use super::*;
    use float_eq::assert_float_eq;

    #[test]
    fn test_rates() {
        let result = SimulationResult::new(3.0, 6);
        assert_float_eq!(result.sigma2, 0.501_187_233_627_272_3, abs <= 1e-12);
        assert_float_eq!(result.fer(), 0.0, abs <= 1e-12);
        assert_float_eq!(result.ber(), 0.0, abs <= 1e-12);
        assert_float_eq!(result.avg_iterations(), 0.0, abs <= 1e-12);
        assert_float_eq!(result.avg_frame_time_ms(), 0.0, abs <= 1e-12);
        let result = SimulationResult {
            frames: 40,
            frame_errors: 4,
            bit_errors: 12,
            iterations: 100,
            elapsed_secs: 0.5,
            ..result
        };
        assert_float_eq!(result.fer(), 0.1, abs <= 1e-12);
        assert_float_eq!(result.ber(), 0.05, abs <= 1e-12);
        assert_float_eq!(result.avg_iterations(), 2.5, abs <= 1e-12);
        assert_float_eq!(result.avg_frame_time_ms(), 12.5, abs <= 1e-9);
    }

    #[test]
    fn test_log_line() {
        let result = SimulationResult {
            frames: 40,
            frame_errors: 4,
            bit_errors: 12,
            iterations: 100,
            elapsed_secs: 0.5,
            ..SimulationResult::new(-1.25, 6)
        };
        assert_eq!(result.to_string(), "-1.250000 1.000e-1 5.000e-2 40 2.500e0");
        assert_eq!(result.log_line(false), result.to_string());
        assert_eq!(
            result.log_line(true),
            "-1.250000 1.000e-1 5.000e-2 40 2.500e0 12.500"
        );
    }
}
