// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calibration solutions in flight between AIPS and casacore.
//!
//! Solutions are first collected into a sparse grid keyed by (timestamp,
//! antenna, spectral window) ([`read_sparse_grid`]). That grid is then
//! expanded into the dense layout that casacore calibration tables require,
//! with placeholders filling the gaps ([`write_dense_grid`]).

mod dense;
mod error;
mod sparse;

pub use dense::{write_dense_grid, CalMainRow, DenseGridSummary};
pub use error::{DenseGridError, SparseGridError};
pub use sparse::{read_sparse_grid, SparseGrid};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use marlu::c32;
use ndarray::prelude::*;

use crate::{constants::AIPS_BAD_SOLUTION_SENTINEL, PROGRESS_BARS};

/// Identifies a single solution. Keys sort by timestamp, then antenna, then
/// spectral window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SolutionKey {
    /// Whole seconds since the MJD epoch.
    pub timestamp: i64,

    /// 0-indexed measurement set antenna.
    pub antenna: i32,

    /// 0-indexed spectral window (AIPS IF).
    pub spw: i32,
}

/// Delay solutions in nanoseconds, stored as complex numbers with zero
/// imaginary parts because that's how casacore `GAIN` columns hold them.
#[derive(Debug, Clone, PartialEq)]
pub struct Delays {
    pub multi_band: Array2<c32>,
    pub single_band: Array2<c32>,
}

/// A single calibration solution. All arrays have the shape (chans, pols).
///
/// The flags can't be set directly; they're derived from the gains and SNRs
/// when the record is made.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionRecord {
    interval: f64,
    field_id: i32,
    gain: Array2<c32>,
    snr: Array2<f32>,
    flag: Array2<bool>,
    solution_ok: Array2<bool>,
    delays: Option<Delays>,
}

impl SolutionRecord {
    /// `interval` is in seconds.
    pub fn new(
        interval: f64,
        field_id: i32,
        gain: Array2<c32>,
        snr: Array2<f32>,
        delays: Option<Delays>,
    ) -> SolutionRecord {
        assert_eq!(gain.dim(), snr.dim(), "gain and SNR shapes differ");
        let flag = Array2::from_shape_fn(gain.dim(), |i| is_flagged(gain[i], snr[i]));
        let solution_ok = flag.mapv(|f| !f);
        SolutionRecord {
            interval,
            field_id,
            gain,
            snr,
            flag,
            solution_ok,
            delays,
        }
    }

    /// \[seconds\]
    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn field_id(&self) -> i32 {
        self.field_id
    }

    pub fn gain(&self) -> ArrayView2<c32> {
        self.gain.view()
    }

    pub fn snr(&self) -> ArrayView2<f32> {
        self.snr.view()
    }

    pub fn flag(&self) -> ArrayView2<bool> {
        self.flag.view()
    }

    pub fn solution_ok(&self) -> ArrayView2<bool> {
        self.solution_ok.view()
    }

    pub fn delays(&self) -> Option<&Delays> {
        self.delays.as_ref()
    }
}

/// A solution is bad if it has no signal, or if AIPS marked it with its
/// "no solution" sentinel; the real and imaginary parts, truncated to
/// integers, are both 3140.
pub fn is_flagged(gain: c32, snr: f32) -> bool {
    snr == 0.0
        || (gain.re as i64 == AIPS_BAD_SOLUTION_SENTINEL
            && gain.im as i64 == AIPS_BAD_SOLUTION_SENTINEL)
}

/// What kind of casacore calibration tables are being made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalMode {
    /// One `bcal` table.
    Bandpass,

    /// Three tables: complex gains (`gcal`), multi-band delays (`mbdcal`) and
    /// single-band delays (`sbdcal`).
    Gain,
}

impl CalMode {
    /// The file suffixes of the output tables, in the order that their
    /// writers are expected by [`write_dense_grid`].
    pub fn table_suffixes(self) -> &'static [&'static str] {
        match self {
            CalMode::Bandpass => &["bcal"],
            CalMode::Gain => &["gcal", "mbdcal", "sbdcal"],
        }
    }
}

/// Convenience function to make a progress bar for reading or writing
/// solutions.
pub(crate) fn make_progress_bar(len: usize, message: &'static str) -> ProgressBar {
    ProgressBar::with_draw_target(
        Some(len as _),
        if PROGRESS_BARS.load() {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        },
    )
    .with_style(
        ProgressStyle::default_bar()
            .template("{msg:19}: [{wide_bar:.blue}] {pos:6}/{len:6} ({elapsed_precise}<{eta_precise})")
            .unwrap()
            .progress_chars("=> "),
    )
    .with_position(0)
    .with_message(message)
}
