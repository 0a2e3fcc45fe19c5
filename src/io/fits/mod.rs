// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helper functions for reading FITS files.

mod error;

pub use error::FitsError;

use std::fmt::Display;

use fitsio::{errors::check_status as fits_check_status, hdu::*, FitsFile};
use ndarray::prelude::*;

/// Open a fits file.
#[track_caller]
pub(crate) fn fits_open<P: AsRef<std::path::Path>>(file: P) -> Result<FitsFile, FitsError> {
    FitsFile::open(file.as_ref()).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Open {
            fits_error: Box::new(e),
            fits_filename: file.as_ref().to_path_buf().into_boxed_path(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// Open a fits file's HDU.
#[track_caller]
pub(crate) fn fits_open_hdu<T: DescribesHdu + Display + Copy>(
    fits_fptr: &mut FitsFile,
    hdu_description: T,
) -> Result<FitsHdu, FitsError> {
    fits_fptr.hdu(hdu_description).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Fitsio {
            fits_error: Box::new(e),
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            hdu_description: format!("{hdu_description}").into_boxed_str(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// How many HDUs are in this fits file (including the primary HDU)?
pub(crate) fn fits_get_num_hdus(fits_fptr: &mut FitsFile) -> usize {
    fits_fptr.iter().count()
}

/// Given a FITS file pointer, a HDU that belongs to it, and a keyword that may
/// or may not exist, pull out the value of the keyword, parsing it into the
/// desired type.
#[track_caller]
pub(crate) fn fits_get_optional_key<T: std::str::FromStr>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
) -> Result<Option<T>, FitsError> {
    let unparsed_value: String = match hdu.read_key(fits_fptr, keyword) {
        Ok(key_value) => key_value,
        Err(e) => {
            // 202 = keyword not found, 204 = value undefined.
            if let fitsio::errors::Error::Fits(fe) = &e {
                if matches!(fe.status, 202 | 204) {
                    return Ok(None);
                }
            }
            let caller = std::panic::Location::caller();
            return Err(FitsError::Fitsio {
                fits_error: Box::new(e),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_description: format!("{}", hdu.number + 1).into_boxed_str(),
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            });
        }
    };

    match unparsed_value.trim().parse() {
        Ok(parsed_value) => Ok(Some(parsed_value)),
        Err(_) => {
            let caller = std::panic::Location::caller();
            Err(FitsError::Parse {
                key: keyword.to_string().into_boxed_str(),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}

/// Given a FITS file pointer, a HDU that belongs to it, and a keyword, pull out
/// the value of the keyword, parsing it into the desired type.
#[track_caller]
pub(crate) fn fits_get_required_key<T: std::str::FromStr>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
) -> Result<T, FitsError> {
    match fits_get_optional_key(fits_fptr, hdu, keyword) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => {
            let caller = std::panic::Location::caller();
            Err(FitsError::MissingKey {
                key: keyword.to_string().into_boxed_str(),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
        Err(error) => Err(error),
    }
}

/// Get the number of rows in a binary table HDU.
#[track_caller]
pub(crate) fn fits_get_num_rows(fits_fptr: &FitsFile, hdu: &FitsHdu) -> Result<usize, FitsError> {
    match &hdu.info {
        HduInfo::TableInfo { num_rows, .. } => Ok(*num_rows),
        _ => {
            let caller = std::panic::Location::caller();
            Err(FitsError::NotTable {
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}

/// Read a whole binary-table column as doubles. Each row of the returned array
/// is a cell of the column; scalar columns give a single element per row.
/// cfitsio does the type conversion, so this works for any numeric column.
#[track_caller]
pub(crate) fn fits_get_col_as_f64(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    col_name: &str,
) -> Result<Array2<f64>, FitsError> {
    let caller = std::panic::Location::caller();
    let (num_rows, columns) = match &hdu.info {
        HduInfo::TableInfo {
            num_rows,
            column_descriptions,
        } => (*num_rows, column_descriptions),
        _ => {
            return Err(FitsError::NotTable {
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    };
    // AIPS pads its column names with spaces, and case isn't guaranteed.
    let (i_col, repeat) = match columns
        .iter()
        .enumerate()
        .find(|(_, c)| c.name.trim().eq_ignore_ascii_case(col_name))
    {
        Some((i, c)) => (i, c.data_type.repeat),
        None => {
            return Err(FitsError::MissingColumn {
                column: col_name.to_string().into_boxed_str(),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    };

    let mut array = Array2::zeros((num_rows, repeat));
    if array.is_empty() {
        return Ok(array);
    }

    // cfitsio works on the "current" HDU; make sure it's this one.
    fits_open_hdu(fits_fptr, hdu.number)?;
    let mut status = 0;
    unsafe {
        // ffgcv = fits_read_col. Reading more elements than are in a cell
        // continues on to the following rows.
        fitsio_sys::ffgcv(
            fits_fptr.as_raw(),
            82, // TDOUBLE (fitsio.h)
            i_col as i32 + 1,
            1,
            1,
            array.len() as i64,
            std::ptr::null_mut(),
            array.as_mut_ptr().cast(),
            &mut 0,
            &mut status,
        );
    }
    fits_check_status(status).map_err(|e| FitsError::Fitsio {
        fits_error: Box::new(e),
        fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
        hdu_description: format!("{}", hdu.number + 1).into_boxed_str(),
        source_file: caller.file(),
        source_line: caller.line(),
        source_column: caller.column(),
    })?;

    Ok(array)
}
