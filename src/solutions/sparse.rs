// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Collecting AIPS rows into a sparse grid of solutions.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, trace};
use marlu::c32;
use ndarray::prelude::*;

use super::{
    make_progress_bar, CalMode, Delays, SolutionKey, SolutionRecord, SparseGridError,
};
use crate::{
    aips::{AipsCalRow, AipsCalSource},
    antenna::AntennaMapping,
    constants::{NANOSECONDS_PER_SECOND, SECONDS_PER_DAY},
    time::aips_time_to_casa_seconds,
};

/// Every solution found in an AIPS table, keyed by where it belongs in the
/// output.
#[derive(Debug, Clone)]
pub struct SparseGrid {
    pub solutions: BTreeMap<SolutionKey, SolutionRecord>,

    /// All distinct timestamps in the AIPS table, ascending. This includes
    /// timestamps whose rows were all dropped by the antenna mapping.
    pub timestamps: Vec<i64>,

    pub mode: CalMode,

    /// The number of spectral windows (AIPS IFs).
    pub num_spws: usize,

    /// The number of channels per spectral window; 1 unless this is a
    /// bandpass.
    pub num_chans: usize,

    pub num_pols: usize,

    /// How many AIPS rows were skipped because their antenna isn't mapped?
    pub num_excluded_rows: usize,

    /// The AIPS antenna numbers that were skipped.
    pub excluded_antennas: BTreeSet<i32>,
}

impl SparseGrid {
    /// The solution at this timestamp with the lowest antenna, then the lowest
    /// spectral window. Placeholders are modelled on it.
    pub fn donor(&self, timestamp: i64) -> Option<(&SolutionKey, &SolutionRecord)> {
        let first = SolutionKey {
            timestamp,
            antenna: i32::MIN,
            spw: i32::MIN,
        };
        let last = SolutionKey {
            timestamp,
            antenna: i32::MAX,
            spw: i32::MAX,
        };
        self.solutions.range(first..=last).next()
    }
}

/// Read every row of an AIPS calibration table, turning each IF of each row
/// into a [`SolutionRecord`].
pub fn read_sparse_grid(
    source: &dyn AipsCalSource,
    antenna_mapping: &AntennaMapping,
) -> Result<SparseGrid, SparseGridError> {
    let meta = source.meta();
    let mode = meta.table_type.mode();
    let num_spws = meta.num_ifs;
    let num_pols = meta.num_pols;
    let num_chans = match mode {
        CalMode::Bandpass => meta.num_chans,
        CalMode::Gain => 1,
    };
    for (what, num) in [
        ("IFs", num_spws),
        ("polarisations", num_pols),
        ("channels", num_chans),
    ] {
        if num == 0 {
            return Err(SparseGridError::NoneOf { what, num });
        }
    }

    let num_rows = source.num_rows();
    debug!("Reading {num_rows} AIPS rows ({num_spws} IFs, {num_pols} pols, {num_chans} chans)");
    let progress = make_progress_bar(num_rows, "Reading AIPS table");

    let mut solutions = BTreeMap::new();
    let mut timestamps = BTreeSet::new();
    let mut num_excluded_rows = 0;
    let mut excluded_antennas = BTreeSet::new();
    for i_row in 0..num_rows {
        let row = source.row(i_row)?;
        check_row_shape(&row, i_row, mode, num_spws, num_chans, num_pols)?;

        let timestamp = aips_time_to_casa_seconds(meta.obs_start, row.time);
        timestamps.insert(timestamp);

        let antenna = match antenna_mapping.map(row.antenna) {
            Some(a) => a,
            None => {
                trace!(
                    "Skipping AIPS row {i_row}; antenna {} isn't mapped",
                    row.antenna
                );
                num_excluded_rows += 1;
                excluded_antennas.insert(row.antenna);
                progress.inc(1);
                continue;
            }
        };
        let interval = row.interval * SECONDS_PER_DAY;
        let field_id = row.source_id - 1;

        let shape = (num_chans, num_pols);
        for i_spw in 0..num_spws {
            let gain = match mode {
                CalMode::Bandpass => Array2::from_shape_fn(shape, |(i_chan, i_pol)| {
                    let i = i_spw * num_chans + i_chan;
                    c32::new(row.real[(i_pol, i)] as f32, row.imag[(i_pol, i)] as f32)
                }),
                CalMode::Gain => Array2::from_shape_fn(shape, |(_, i_pol)| {
                    c32::new(
                        row.real[(i_pol, i_spw)] as f32,
                        row.imag[(i_pol, i_spw)] as f32,
                    )
                }),
            };
            let snr = Array2::from_shape_fn(shape, |(_, i_pol)| row.weight[(i_pol, i_spw)] as f32);
            let delays = match (mode, &row.delays) {
                (CalMode::Bandpass, _) => None,
                (CalMode::Gain, Some(d)) => Some(Delays {
                    multi_band: Array2::from_shape_fn(shape, |(_, i_pol)| {
                        seconds_to_ns(d.multi_band[i_pol])
                    }),
                    single_band: Array2::from_shape_fn(shape, |(_, i_pol)| {
                        seconds_to_ns(d.single_band[(i_pol, i_spw)])
                    }),
                }),
                // A gain table without delay columns; unit "delays" keep the
                // delay tables regular.
                (CalMode::Gain, None) => Some(Delays {
                    multi_band: Array2::from_elem(shape, c32::new(1.0, 0.0)),
                    single_band: Array2::from_elem(shape, c32::new(1.0, 0.0)),
                }),
            };

            let key = SolutionKey {
                timestamp,
                antenna,
                spw: i_spw as i32,
            };
            let record = SolutionRecord::new(interval, field_id, gain, snr, delays);
            if solutions.insert(key, record).is_some() {
                trace!("AIPS row {i_row} replaced an earlier solution at {key:?}");
            }
        }
        progress.inc(1);
    }
    progress.abandon();

    debug!(
        "Found {} solutions over {} timestamps; excluded {num_excluded_rows} rows",
        solutions.len(),
        timestamps.len()
    );

    Ok(SparseGrid {
        solutions,
        timestamps: timestamps.into_iter().collect(),
        mode,
        num_spws,
        num_chans,
        num_pols,
        num_excluded_rows,
        excluded_antennas,
    })
}

/// casacore stores delays as complex numbers in nanoseconds.
fn seconds_to_ns(seconds: f64) -> c32 {
    c32::new((seconds * NANOSECONDS_PER_SECOND) as f32, 0.0)
}

fn check_row_shape(
    row: &AipsCalRow,
    i_row: usize,
    mode: CalMode,
    num_spws: usize,
    num_chans: usize,
    num_pols: usize,
) -> Result<(), SparseGridError> {
    let gain_shape = (num_pols, num_spws * num_chans);
    let mut checks = vec![
        ("real", row.real.dim(), gain_shape),
        ("imag", row.imag.dim(), gain_shape),
        ("weight", row.weight.dim(), (num_pols, num_spws)),
    ];
    if let (CalMode::Gain, Some(delays)) = (mode, &row.delays) {
        checks.push(("delay", delays.single_band.dim(), (num_pols, num_spws)));
        checks.push(("mbdelay", (1, delays.multi_band.len()), (1, num_pols)));
    }
    for (what, got, expected) in checks {
        if got != expected {
            return Err(SparseGridError::RowShape {
                row: i_row,
                what,
                expected,
                got,
            });
        }
    }
    Ok(())
}
