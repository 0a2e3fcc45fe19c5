// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading AIPS calibration tables.

use std::path::PathBuf;

use thiserror::Error;

use super::CalTableType;
use crate::{io::fits::FitsError, time::TimeError};

#[derive(Error, Debug)]
pub enum AipsReadError {
    #[error("{file}: There is no {table_type} table with version {version}")]
    NoTable {
        file: PathBuf,
        table_type: CalTableType,
        version: u32,
    },

    #[error("{file}: {key} = {value} is not valid; it must be {expected}")]
    BadMetadata {
        file: PathBuf,
        key: &'static str,
        value: i64,
        expected: &'static str,
    },

    #[error("{file}: Column '{column}' has {got} elements per row, but {expected} were expected")]
    ColumnLength {
        file: PathBuf,
        column: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Tried to read row {index} of an AIPS table with only {num_rows} rows")]
    RowOutOfRange { index: usize, num_rows: usize },

    #[error(transparent)]
    Fits(#[from] FitsError),

    #[error(transparent)]
    Time(#[from] TimeError),
}
