// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all cal_aips2ms-related errors. This should be the *only*
//! error enum that is publicly visible.

use thiserror::Error;

use super::convert::ConvertArgsError;
use crate::{
    aips::AipsReadError,
    antenna::AntennaMapError,
    io::FileWriteError,
    ms::CasaWriteError,
    params::ConvertError,
    solutions::{DenseGridError, SparseGridError},
};

/// The *only* publicly visible error from cal_aips2ms.
#[derive(Error, Debug)]
pub enum CalAips2MsError {
    /// An error with the supplied arguments.
    #[error("{0}\n\nSee --help for the available arguments.")]
    Arguments(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files hold the same arguments as the command line, in toml or json.")]
    ArgFile(String),

    /// The AIPS table couldn't be read or made sense of.
    #[error("{0}")]
    Aips(String),

    /// An error related to the casacore calibration tables or measurement
    /// set.
    #[error("{0}")]
    Casa(String),

    /// An error related to the antenna map.
    #[error("{0}\n\nEach line of an antenna map is '<AIPS antenna> <MS antenna>'; lines starting with '#' are ignored.")]
    AntennaMap(String),

    /// A cfitsio error. Because these are usually quite spartan, some
    /// suggestions are provided here.
    #[error("cfitsio error: {0}\n\nIf you don't know what this means, try turning up verbosity (-v or -vv) and maybe disabling progress bars.")]
    Cfitsio(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<ConvertArgsError> for CalAips2MsError {
    fn from(e: ConvertArgsError) -> Self {
        let s = e.to_string();
        match e {
            ConvertArgsError::Missing(_)
            | ConvertArgsError::DoesNotExist { .. }
            | ConvertArgsError::BandpassAndSolution
            | ConvertArgsError::ZeroVersion => Self::Arguments(s),
            ConvertArgsError::AntennaMap(e) => Self::from(e),
        }
    }
}

impl From<ConvertError> for CalAips2MsError {
    fn from(e: ConvertError) -> Self {
        match e {
            ConvertError::AipsRead(e) => Self::from(e),
            ConvertError::SparseGrid(e) => Self::from(e),
            ConvertError::DenseGrid(e) => Self::from(e),
            ConvertError::CasaWrite(e) => Self::from(e),
            ConvertError::FileWrite(e) => Self::from(e),
        }
    }
}

impl From<AipsReadError> for CalAips2MsError {
    fn from(e: AipsReadError) -> Self {
        let s = e.to_string();
        match e {
            AipsReadError::Fits(_) => Self::Cfitsio(s),
            AipsReadError::NoTable { .. }
            | AipsReadError::BadMetadata { .. }
            | AipsReadError::ColumnLength { .. }
            | AipsReadError::RowOutOfRange { .. }
            | AipsReadError::Time(_) => Self::Aips(s),
        }
    }
}

impl From<SparseGridError> for CalAips2MsError {
    fn from(e: SparseGridError) -> Self {
        let s = e.to_string();
        match e {
            SparseGridError::NoneOf { .. } | SparseGridError::RowShape { .. } => Self::Aips(s),
            SparseGridError::Read(e) => Self::from(e),
        }
    }
}

impl From<DenseGridError> for CalAips2MsError {
    fn from(e: DenseGridError) -> Self {
        let s = e.to_string();
        match e {
            DenseGridError::NoDonor { .. } => Self::Aips(s),
            DenseGridError::WrongNumTables { .. } => Self::Generic(s),
            DenseGridError::Write(e) => Self::from(e),
        }
    }
}

impl From<CasaWriteError> for CalAips2MsError {
    fn from(e: CasaWriteError) -> Self {
        Self::Casa(e.to_string())
    }
}

impl From<FileWriteError> for CalAips2MsError {
    fn from(e: FileWriteError) -> Self {
        Self::Casa(e.to_string())
    }
}

impl From<AntennaMapError> for CalAips2MsError {
    fn from(e: AntennaMapError) -> Self {
        Self::AntennaMap(e.to_string())
    }
}

impl From<std::io::Error> for CalAips2MsError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
