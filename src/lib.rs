//! This crate implements layered belief-propagation decoding of low-density parity-check (LDPC)
//! codes, together with a multi-threaded Monte Carlo simulator that estimates their frame and bit
//! error rates over an additive white Gaussian noise (AWGN) channel with a pulse-amplitude
//! modulation (PAM) constellation.
//!
//! A code is described by the edges of its Tanner graph ([`SparseGraph`], [`LdpcCode`]), with
//! optional punctured positions (never transmitted) and shortened positions (known to be zero).
//! The [`Decoder`] runs layered sum-product decoding on channel LLR values. A [`Simulation`]
//! combines a code, a [`Constellation`], and a [`BitMapper`] and runs frames over a list of SNR
//! points on a pool of worker threads, writing a result log and, optionally, an error log.
//!
//! The crate emits `tracing` events while a simulation runs but never installs a subscriber.

#![warn(
    clippy::complexity,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_allocation,
    unused_import_braces,
    unused_qualifications
)]

mod channel;
mod code;
mod common;
mod constellation;
mod decoder;
mod mapping;
mod report;
mod sim;
mod sparse;
pub mod utils;

pub use channel::{sigma2_from_snr_db, AwgnChannel, GaussianSource, NoiseKind};
pub use code::LdpcCode;
pub use common::{clamp_llr, Bit, Error, MAX_LLR, MIN_LLR, SHORTENED_LLR};
pub use constellation::Constellation;
pub use decoder::{Decoder, DecoderParams};
pub use mapping::BitMapper;
pub use report::{ErrorLog, FrameErrorReport, ResultLog};
pub use sim::{
    ChannelParams, FrameOutcome, SimParams, Simulation, SimulationResult, StopToken,
};
pub use sparse::{Edge, Neighbor, SparseGraph};
