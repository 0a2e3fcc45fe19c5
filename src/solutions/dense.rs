// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Expanding a sparse grid into every (spectral window, timestamp, antenna)
//! row that a casacore calibration table needs.

use log::{debug, trace};
use marlu::c32;
use ndarray::prelude::*;

use super::{make_progress_bar, CalMode, DenseGridError, SolutionKey, SolutionRecord, SparseGrid};
use crate::ms::CalTableWriter;

/// Everything in a row of a casacore calibration table's main table.
#[derive(Debug, Clone, PartialEq)]
pub struct CalMainRow {
    /// \[MJD seconds\]
    pub time: f64,

    /// \[seconds\]
    pub interval: f64,

    pub antenna1: i32,

    pub field_id: i32,

    /// The spectral window index; there's a `CAL_DESC` row per spectral window.
    pub cal_desc_id: i32,

    /// Shape: (chans, pols).
    pub gain: Array2<c32>,

    /// Shape: (chans, pols).
    pub snr: Array2<f32>,

    /// Shape: (chans, pols).
    pub flag: Array2<bool>,

    /// Shape: (chans, pols).
    pub solution_ok: Array2<bool>,

    /// Shape: (chans, 1).
    pub fit: Array2<f32>,

    /// Shape: (chans, 1).
    pub fit_weight: Array2<f32>,

    pub total_solution_ok: bool,

    pub total_fit: f32,

    pub total_fit_weight: f32,
}

impl CalMainRow {
    /// A row for a solution that exists. `gain` is whatever this particular
    /// table holds (gains or delays).
    fn from_solution(key: &SolutionKey, record: &SolutionRecord, gain: Array2<c32>) -> CalMainRow {
        let num_chans = gain.len_of(Axis(0));
        CalMainRow {
            time: key.timestamp as f64,
            interval: record.interval(),
            antenna1: key.antenna,
            field_id: record.field_id(),
            cal_desc_id: key.spw,
            gain,
            snr: record.snr().to_owned(),
            flag: record.flag().to_owned(),
            solution_ok: record.solution_ok().to_owned(),
            fit: Array2::ones((num_chans, 1)),
            fit_weight: Array2::ones((num_chans, 1)),
            total_solution_ok: true,
            total_fit: 1.0,
            total_fit_weight: 1.0,
        }
    }

    /// A row for a solution that doesn't exist. The time, interval and field
    /// come from `donor`, a real solution at the same timestamp; everything
    /// else says "no solution here".
    fn placeholder(key: &SolutionKey, donor: &SolutionRecord, shape: (usize, usize)) -> CalMainRow {
        let num_chans = shape.0;
        CalMainRow {
            time: key.timestamp as f64,
            interval: donor.interval(),
            antenna1: key.antenna,
            field_id: donor.field_id(),
            cal_desc_id: key.spw,
            gain: Array2::from_elem(shape, c32::new(1.0, 0.0)),
            snr: Array2::zeros(shape),
            flag: Array2::from_elem(shape, true),
            solution_ok: Array2::from_elem(shape, false),
            fit: Array2::ones((num_chans, 1)),
            fit_weight: Array2::ones((num_chans, 1)),
            total_solution_ok: true,
            total_fit: 1.0,
            total_fit_weight: 1.0,
        }
    }
}

impl SparseGrid {
    /// The donor of every timestamp, in timestamp order. Placeholders need a
    /// real solution at the same timestamp to copy from, so a timestamp
    /// without any is an error.
    pub fn donors(&self) -> Result<Vec<&SolutionRecord>, DenseGridError> {
        self.timestamps
            .iter()
            .map(|&timestamp| {
                self.donor(timestamp)
                    .map(|(_, record)| record)
                    .ok_or(DenseGridError::NoDonor { timestamp })
            })
            .collect()
    }
}

/// What [`write_dense_grid`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenseGridSummary {
    /// Every table gets the same number of rows.
    pub rows_per_table: usize,

    /// Rows (per table) that hold a real solution.
    pub num_real: usize,

    /// Rows (per table) that were made up because there was no solution.
    pub num_placeholders: usize,
}

/// Write a row for every spectral window, timestamp and antenna (in that
/// order, antennas changing fastest) to each of the `writers`.
///
/// For [`CalMode::Gain`], `writers` must be the gain, multi-band delay and
/// single-band delay tables, in that order. For [`CalMode::Bandpass`] there is
/// only one table.
///
/// Every timestamp must have at least one solution; this is checked before
/// anything is written.
pub fn write_dense_grid(
    grid: &SparseGrid,
    num_antennas: usize,
    writers: &mut [&mut dyn CalTableWriter],
) -> Result<DenseGridSummary, DenseGridError> {
    let num_tables = grid.mode.table_suffixes().len();
    if writers.len() != num_tables {
        return Err(DenseGridError::WrongNumTables {
            expected: num_tables,
            got: writers.len(),
        });
    }

    let donors = grid.donors()?;

    let rows_per_table = grid.num_spws * grid.timestamps.len() * num_antennas;
    debug!(
        "Writing {rows_per_table} rows to each of {num_tables} tables ({} spws, {} timestamps, {num_antennas} antennas)",
        grid.num_spws,
        grid.timestamps.len()
    );
    for writer in writers.iter_mut() {
        writer.add_rows(rows_per_table)?;
    }

    let progress = make_progress_bar(rows_per_table, "Writing cal tables");
    let shape = (grid.num_chans, grid.num_pols);
    let mut row_index = 0;
    let mut num_real = 0;
    let mut num_placeholders = 0;
    for i_spw in 0..grid.num_spws {
        for (&timestamp, donor) in grid.timestamps.iter().zip(donors.iter()) {
            for i_ant in 0..num_antennas {
                let key = SolutionKey {
                    timestamp,
                    antenna: i_ant as i32,
                    spw: i_spw as i32,
                };

                match grid.solutions.get(&key) {
                    Some(record) => {
                        let gains = table_gains(record, grid.mode);
                        for (writer, gain) in writers.iter_mut().zip(gains) {
                            let row = CalMainRow::from_solution(&key, record, gain);
                            writer.write_row(row_index, &row)?;
                        }
                        num_real += 1;
                    }
                    None => {
                        trace!("No solution for {key:?}; writing a placeholder");
                        let row = CalMainRow::placeholder(&key, donor, shape);
                        for writer in writers.iter_mut() {
                            writer.write_row(row_index, &row)?;
                        }
                        num_placeholders += 1;
                    }
                }

                row_index += 1;
                progress.inc(1);
            }
        }
    }
    progress.abandon();

    Ok(DenseGridSummary {
        rows_per_table,
        num_real,
        num_placeholders,
    })
}

/// The `GAIN` column contents of each output table for a real solution.
fn table_gains(record: &SolutionRecord, mode: CalMode) -> Vec<Array2<c32>> {
    let gain = record.gain().to_owned();
    match mode {
        CalMode::Bandpass => vec![gain],
        CalMode::Gain => match record.delays() {
            Some(delays) => vec![
                gain,
                delays.multi_band.clone(),
                delays.single_band.clone(),
            ],
            None => {
                let ones = Array2::from_elem(gain.dim(), c32::new(1.0, 0.0));
                vec![gain, ones.clone(), ones]
            }
        },
    }
}
