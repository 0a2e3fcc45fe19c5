// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    aips::{AipsCalSource, AipsFitsCalTable, AipsReadError, AipsSource},
    antenna::AntennaMapping,
    constants::TEMPLATE_TABLE_PREFIX,
    io::{check_table_path_is_free, FileWriteError},
    ms::{ms_name, read_num_antennas, CalTableWriter, CasaCalTable, CasaWriteError},
    solutions::{
        read_sparse_grid, write_dense_grid, CalMode, DenseGridError, DenseGridSummary,
        SparseGridError,
    },
};

pub(crate) struct ConvertParams {
    /// The AIPS table to convert.
    pub(crate) aips: AipsSource,

    /// The measurement set that the calibration tables are for.
    pub(crate) ms: PathBuf,

    /// Output tables are this with the table suffix appended, e.g.
    /// `<output>.gcal`.
    pub(crate) output: PathBuf,

    pub(crate) antenna_mapping: AntennaMapping,

    /// The directory containing the empty template tables.
    pub(crate) templates: PathBuf,
}

impl ConvertParams {
    /// The template and output path of each table that will be written for
    /// this mode, in the order [`write_dense_grid`] expects.
    pub(crate) fn table_paths(&self, mode: CalMode) -> Vec<(PathBuf, PathBuf)> {
        mode.table_suffixes()
            .iter()
            .map(|suffix| {
                let template = self
                    .templates
                    .join(format!("{TEMPLATE_TABLE_PREFIX}.{suffix}"));
                (template, append_suffix(&self.output, suffix))
            })
            .collect()
    }

    pub(crate) fn run(&self) -> Result<DenseGridSummary, ConvertError> {
        let source = AipsFitsCalTable::new(&self.aips)?;
        self.run_with_source(&source)
    }

    /// Everything [`ConvertParams::run`] does after the AIPS table is opened.
    pub(crate) fn run_with_source(
        &self,
        source: &dyn AipsCalSource,
    ) -> Result<DenseGridSummary, ConvertError> {
        info!("Reading AIPS {} table", self.aips.table_type);
        let grid = read_sparse_grid(source, &self.antenna_mapping)?;
        if grid.num_excluded_rows > 0 {
            warn!(
                "Skipped {} AIPS rows belonging to unmapped antennas: {}",
                grid.num_excluded_rows,
                grid.excluded_antennas.iter().join(", ")
            );
        }
        // Nothing is created if any timestamp can't be filled.
        grid.donors()?;

        let table_paths = self.table_paths(grid.mode);
        for (_, dest) in &table_paths {
            check_table_path_is_free(dest)?;
        }
        let num_antennas = read_num_antennas(&self.ms)?;

        let ms_name = ms_name(&self.ms);
        let mut tables = Vec::with_capacity(table_paths.len());
        for (template, dest) in &table_paths {
            let mut table = CasaCalTable::create(template, dest)?;
            table.write_cal_desc(grid.num_spws, grid.num_chans, grid.num_pols, &ms_name)?;
            tables.push(table);
        }

        let mut writers: Vec<&mut dyn CalTableWriter> = tables
            .iter_mut()
            .map(|t| t as &mut dyn CalTableWriter)
            .collect();
        let summary = write_dense_grid(&grid, num_antennas, &mut writers)?;
        debug!("{summary:?}");

        info!(
            "Wrote {} rows to each of {}",
            summary.rows_per_table,
            tables.iter().map(|t| t.path().display()).join(", ")
        );
        info!(
            "{} rows hold AIPS solutions, {} are flagged placeholders",
            summary.num_real, summary.num_placeholders
        );

        Ok(summary)
    }
}

/// `path` with `.<suffix>` on the end. Unlike [`Path::with_extension`],
/// nothing already in the file name is replaced.
fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".");
    s.push(suffix);
    PathBuf::from(s)
}

#[derive(Error, Debug)]
pub(crate) enum ConvertError {
    #[error(transparent)]
    AipsRead(#[from] AipsReadError),

    #[error(transparent)]
    SparseGrid(#[from] SparseGridError),

    #[error(transparent)]
    DenseGrid(#[from] DenseGridError),

    #[error(transparent)]
    CasaWrite(#[from] CasaWriteError),

    #[error(transparent)]
    FileWrite(#[from] FileWriteError),
}
