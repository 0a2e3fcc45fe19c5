// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Writing casacore calibration tables, and the little we need to read from
//! measurement sets.
//!
//! Calibration tables are made by copying the structure of an empty template
//! table (e.g. `empty.gcal`) and then filling in rows. The templates carry all
//! of the table and column descriptions that CASA expects, which we'd
//! otherwise have to describe ourselves.

mod error;

pub use error::CasaWriteError;

use std::path::{Path, PathBuf};

use log::{debug, trace};
use marlu::rubbl_casatables;
use ndarray::prelude::*;
use rubbl_casatables::{Table, TableOpenMode};

use crate::{constants::CAL_DESC_N_JONES, io::check_table_path_is_free, solutions::CalMainRow};

/// Something that calibration rows can be written to.
pub trait CalTableWriter {
    /// Append this many empty rows.
    fn add_rows(&mut self, num_rows: usize) -> Result<(), CasaWriteError>;

    /// Fill every column of an existing row.
    fn write_row(&mut self, row_index: u64, row: &CalMainRow) -> Result<(), CasaWriteError>;
}

/// A casacore calibration table on disk.
pub struct CasaCalTable {
    path: PathBuf,
    table: Table,
}

impl CasaCalTable {
    /// Make a new calibration table at `dest` with the same structure as
    /// `template` but without any of its rows. `dest` must not already exist.
    pub fn create(template: &Path, dest: &Path) -> Result<CasaCalTable, CasaWriteError> {
        check_table_path_is_free(dest)?;
        if !template.is_dir() {
            return Err(CasaWriteError::MissingTemplate(template.to_path_buf()));
        }

        debug!(
            "Creating {} from template {}",
            dest.display(),
            template.display()
        );
        {
            let mut template_table = Table::open(template, TableOpenMode::Read)?;
            template_table.deep_copy_no_rows(&dest.display().to_string())?;
        }
        let table = Table::open(dest, TableOpenMode::ReadWrite)?;

        Ok(CasaCalTable {
            path: dest.to_path_buf(),
            table,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a `CAL_DESC` row for each spectral window. Row `i` describes
    /// spectral window `i`, so `CAL_DESC_ID` in the main table is the spectral
    /// window index.
    pub fn write_cal_desc(
        &mut self,
        num_spws: usize,
        num_chans: usize,
        num_pols: usize,
        ms_name: &str,
    ) -> Result<(), CasaWriteError> {
        let mut cal_desc = Table::open(self.path.join("CAL_DESC"), TableOpenMode::ReadWrite)?;
        let first_row = cal_desc.n_rows();
        cal_desc.add_rows(num_spws)?;
        trace!("Writing {num_spws} CAL_DESC rows to {}", self.path.display());

        // These are the same for every spectral window.
        let num_chan = Array1::<i32>::ones(num_chans);
        let chan_freq = Array2::<f64>::zeros((num_chans, 1));
        let chan_width = Array2::<f64>::zeros((num_chans, 1));
        let chan_range = Array3::<i32>::zeros((num_chans, 1, 2));
        for i_spw in 0..num_spws {
            let row = first_row + i_spw as u64;
            cal_desc.put_cell("NUM_SPW", row, &1_i32)?;
            cal_desc.put_cell("NUM_CHAN", row, &num_chan)?;
            cal_desc.put_cell("NUM_RECEPTORS", row, &(num_pols as i32))?;
            cal_desc.put_cell("N_JONES", row, &CAL_DESC_N_JONES)?;
            cal_desc.put_cell("CHAN_FREQ", row, &chan_freq)?;
            cal_desc.put_cell("MEAS_FREQ_REF", row, &0_i32)?;
            cal_desc.put_cell("CHAN_WIDTH", row, &chan_width)?;
            cal_desc.put_cell("CHAN_RANGE", row, &chan_range)?;
            cal_desc.put_cell("JONES_TYPE", row, &"full".to_string())?;
            cal_desc.put_cell("MS_NAME", row, &ms_name.to_string())?;
            cal_desc.put_cell("SPECTRAL_WINDOW_ID", row, &vec![i_spw as i32])?;
        }

        Ok(())
    }
}

impl CalTableWriter for CasaCalTable {
    fn add_rows(&mut self, num_rows: usize) -> Result<(), CasaWriteError> {
        self.table.add_rows(num_rows)?;
        Ok(())
    }

    fn write_row(&mut self, row_index: u64, row: &CalMainRow) -> Result<(), CasaWriteError> {
        let num_rows = self.table.n_rows();
        if row_index >= num_rows {
            return Err(CasaWriteError::RowOutOfRange {
                row_index,
                num_rows,
            });
        }

        let t = &mut self.table;
        t.put_cell("TIME", row_index, &row.time)?;
        t.put_cell("INTERVAL", row_index, &row.interval)?;
        t.put_cell("ANTENNA1", row_index, &row.antenna1)?;
        t.put_cell("FIELD_ID", row_index, &row.field_id)?;
        t.put_cell("CAL_DESC_ID", row_index, &row.cal_desc_id)?;
        t.put_cell("GAIN", row_index, &row.gain)?;
        t.put_cell("SOLUTION_OK", row_index, &row.solution_ok)?;
        t.put_cell("FIT", row_index, &row.fit)?;
        t.put_cell("FIT_WEIGHT", row_index, &row.fit_weight)?;
        t.put_cell("FLAG", row_index, &row.flag)?;
        t.put_cell("SNR", row_index, &row.snr)?;
        t.put_cell("TOTAL_SOLUTION_OK", row_index, &row.total_solution_ok)?;
        t.put_cell("TOTAL_FIT", row_index, &row.total_fit)?;
        t.put_cell("TOTAL_FIT_WEIGHT", row_index, &row.total_fit_weight)?;

        Ok(())
    }
}

/// The number of antennas in a measurement set, i.e. the number of rows in its
/// `ANTENNA` table.
pub fn read_num_antennas(ms: &Path) -> Result<usize, CasaWriteError> {
    let antenna_table_path = ms.join("ANTENNA");
    if !antenna_table_path.is_dir() {
        return Err(CasaWriteError::MissingMs(ms.to_path_buf()));
    }
    let antenna_table = Table::open(&antenna_table_path, TableOpenMode::Read)?;
    let num_antennas = antenna_table.n_rows() as usize;
    debug!("{} has {num_antennas} antennas", ms.display());
    Ok(num_antennas)
}

/// casacore records which measurement set a calibration table belongs to by
/// name only.
pub fn ms_name(ms: &Path) -> String {
    ms.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| ms.display().to_string())
}
