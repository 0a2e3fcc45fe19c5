// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading AIPS calibration tables.
//!
//! AIPS keeps its tables inside its own catalogue; the task `FITTP` exports a
//! catalogue entry, tables included, to a FITS file. Each table becomes a
//! binary-table extension named e.g. `AIPS CL` with `EXTVER` set to the table's
//! version number. That FITS file is what we read.

mod error;
mod fits;

pub use error::AipsReadError;
pub use fits::AipsFitsCalTable;

use std::path::PathBuf;

use hifitime::Epoch;
use ndarray::prelude::*;
use strum_macros::{Display, EnumIter, EnumString};

use crate::solutions::CalMode;

/// The kinds of AIPS calibration table we know how to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
pub enum CalTableType {
    /// Calibration table; the accumulated gains and delays.
    #[strum(serialize = "CL")]
    Cl,

    /// Solution table; the output of a single calibration task.
    #[strum(serialize = "SN")]
    Sn,

    /// Bandpass table.
    #[strum(serialize = "BP")]
    Bp,
}

impl Default for CalTableType {
    fn default() -> Self {
        CalTableType::Cl
    }
}

impl CalTableType {
    /// The `EXTNAME` that `FITTP` gives this kind of table.
    pub fn extname(self) -> String {
        format!("AIPS {self}")
    }

    /// CL and SN tables share a layout and turn into gain tables; BP tables
    /// turn into bandpass tables.
    pub fn mode(self) -> CalMode {
        match self {
            CalTableType::Cl | CalTableType::Sn => CalMode::Gain,
            CalTableType::Bp => CalMode::Bandpass,
        }
    }

    /// The names of the columns we read.
    pub(crate) fn columns(self) -> &'static AipsColumnNames {
        match self {
            CalTableType::Cl | CalTableType::Sn => &GAIN_COLUMNS,
            CalTableType::Bp => &BANDPASS_COLUMNS,
        }
    }
}

/// Column names differ between the gain-like tables and BP tables. Per-pol
/// names are indexed by polarisation.
pub(crate) struct AipsColumnNames {
    pub(crate) time: &'static str,
    pub(crate) interval: &'static str,
    pub(crate) source_id: &'static str,
    pub(crate) antenna: &'static str,
    pub(crate) real: [&'static str; 2],
    pub(crate) imag: [&'static str; 2],
    pub(crate) weight: [&'static str; 2],
    /// Only gain-like tables have delays.
    pub(crate) delay: Option<[&'static str; 2]>,
    pub(crate) mbdelay: Option<[&'static str; 2]>,
}

static GAIN_COLUMNS: AipsColumnNames = AipsColumnNames {
    time: "TIME",
    interval: "TIME INTERVAL",
    source_id: "SOURCE ID",
    antenna: "ANTENNA NO.",
    real: ["REAL1", "REAL2"],
    imag: ["IMAG1", "IMAG2"],
    weight: ["WEIGHT 1", "WEIGHT 2"],
    delay: Some(["DELAY 1", "DELAY 2"]),
    mbdelay: Some(["MBDELAY1", "MBDELAY2"]),
};

static BANDPASS_COLUMNS: AipsColumnNames = AipsColumnNames {
    time: "TIME",
    interval: "INTERVAL",
    source_id: "SOURCE ID",
    antenna: "ANTENNA",
    real: ["REAL 1", "REAL 2"],
    imag: ["IMAG 1", "IMAG 2"],
    weight: ["WEIGHT 1", "WEIGHT 2"],
    delay: None,
    mbdelay: None,
};

/// Where to find an AIPS calibration table.
#[derive(Debug, Clone)]
pub struct AipsSource {
    /// The FITS file exported by `FITTP`.
    pub file: PathBuf,

    pub table_type: CalTableType,

    /// The table version (AIPS `INVER`).
    pub version: u32,
}

/// Metadata describing an AIPS calibration table.
#[derive(Debug, Clone)]
pub struct AipsCalTableMeta {
    pub table_type: CalTableType,

    pub version: u32,

    /// The number of polarisations (`NO_POL`); 1 or 2.
    pub num_pols: usize,

    /// The number of IFs (`NO_IF`). Each IF becomes a spectral window.
    pub num_ifs: usize,

    /// The number of channels per IF. Only bandpass tables have channels
    /// (`NO_CHAN`); this is 1 for everything else.
    pub num_chans: usize,

    /// The start of the observation. AIPS times are days since midnight of
    /// this date.
    pub obs_start: Epoch,
}

/// Delays only exist in CL and SN tables. Units are seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct AipsDelays {
    /// Per-IF delays (`DELAY 1`, `DELAY 2`). Shape: (pols, IFs).
    pub single_band: Array2<f64>,

    /// Multi-band delays (`MBDELAY1`, `MBDELAY2`). Shape: (pols).
    pub multi_band: Array1<f64>,
}

/// One row of an AIPS calibration table, with the polarisations gathered
/// together.
#[derive(Debug, Clone, PartialEq)]
pub struct AipsCalRow {
    /// \[days since the start of the observation\]
    pub time: f64,

    /// \[days\]
    pub interval: f64,

    /// 1-indexed AIPS source number.
    pub source_id: i32,

    /// 1-indexed AIPS antenna number.
    pub antenna: i32,

    /// The real parts of the solutions. Shape: (pols, IFs) for CL and SN
    /// tables, (pols, IFs * chans) for BP tables, with channels changing
    /// fastest.
    pub real: Array2<f64>,

    /// The imaginary parts; same shape as `real`.
    pub imag: Array2<f64>,

    /// Shape: (pols, IFs).
    pub weight: Array2<f64>,

    pub delays: Option<AipsDelays>,
}

/// Anything that can give us the rows of an AIPS calibration table, in order.
pub trait AipsCalSource {
    fn meta(&self) -> &AipsCalTableMeta;

    fn num_rows(&self) -> usize;

    /// Get a row. `i_row` is 0-indexed.
    fn row(&self, i_row: usize) -> Result<AipsCalRow, AipsReadError>;
}
