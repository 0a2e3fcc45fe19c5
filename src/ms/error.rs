// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with writing casacore calibration tables.

use std::path::PathBuf;

use marlu::rubbl_casatables;
use thiserror::Error;

use crate::io::FileWriteError;

#[derive(Error, Debug)]
pub enum CasaWriteError {
    #[error("The template table {0} doesn't exist; templates are expected to be named like 'empty.gcal'")]
    MissingTemplate(PathBuf),

    #[error("The measurement set {0} doesn't exist or has no ANTENNA table")]
    MissingMs(PathBuf),

    #[error("Tried to write row {row_index}, but the table only has {num_rows} rows")]
    RowOutOfRange { row_index: u64, num_rows: u64 },

    #[error(transparent)]
    FileWrite(#[from] FileWriteError),

    #[error("Error when trying to interface with a casacore table: {0}")]
    Table(#[from] rubbl_casatables::TableError),

    #[error("Error from casacore: {0}")]
    Casacore(#[from] rubbl_casatables::CasacoreError),
}
