// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from building and expanding the solution grids.

use thiserror::Error;

use crate::{aips::AipsReadError, ms::CasaWriteError};

#[derive(Error, Debug)]
pub enum SparseGridError {
    #[error("The AIPS table says it has {num} {what}; there must be at least one")]
    NoneOf { what: &'static str, num: usize },

    #[error("AIPS row {row}: '{what}' has shape {got:?}, but {expected:?} was expected")]
    RowShape {
        row: usize,
        what: &'static str,
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error(transparent)]
    Read(#[from] AipsReadError),
}

#[derive(Error, Debug)]
pub enum DenseGridError {
    #[error("No AIPS solutions exist at timestamp {timestamp} (MJD seconds), so placeholder rows can't be made for it")]
    NoDonor { timestamp: i64 },

    #[error("Expected {expected} output tables, but got {got}")]
    WrongNumTables { expected: usize, got: usize },

    #[error(transparent)]
    Write(#[from] CasaWriteError),
}
