// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! AIPS calibration tables inside FITS files written by `FITTP`.

use std::path::{Path, PathBuf};

use fitsio::{hdu::FitsHdu, FitsFile};
use log::{debug, trace};
use ndarray::prelude::*;

use super::*;
use crate::{io::fits::*, time::parse_date_obs};

/// An AIPS calibration table read from a FITS file. All of the columns we
/// need are read up front; AIPS tables are small compared to the visibilities
/// they calibrate.
pub struct AipsFitsCalTable {
    meta: AipsCalTableMeta,

    num_rows: usize,

    time: Array1<f64>,

    interval: Array1<f64>,

    source_id: Array1<i32>,

    antenna: Array1<i32>,

    /// One array per polarisation, each with shape (rows, elements per row).
    real: Vec<Array2<f64>>,

    imag: Vec<Array2<f64>>,

    weight: Vec<Array2<f64>>,

    delay: Option<Vec<Array2<f64>>>,

    mbdelay: Option<Vec<Array1<f64>>>,
}

impl AipsFitsCalTable {
    /// Find the requested table in the FITS file and read it.
    pub fn new(source: &AipsSource) -> Result<AipsFitsCalTable, AipsReadError> {
        let file = source.file.as_path();
        debug!(
            "Looking for AIPS {} table version {} in {}",
            source.table_type,
            source.version,
            file.display()
        );
        let mut fptr = fits_open(file)?;

        let primary_hdu = fits_open_hdu(&mut fptr, 0)?;
        let date_obs: String = fits_get_required_key(&mut fptr, &primary_hdu, "DATE-OBS")?;
        let obs_start = parse_date_obs(&date_obs)?;
        trace!("DATE-OBS: {date_obs}");

        let hdu = find_table_hdu(&mut fptr, source)?;
        let num_pols = read_count(&mut fptr, &hdu, file, "NO_POL")?;
        if num_pols > 2 {
            return Err(AipsReadError::BadMetadata {
                file: file.to_path_buf(),
                key: "NO_POL",
                value: num_pols as i64,
                expected: "1 or 2",
            });
        }
        let num_ifs = read_count(&mut fptr, &hdu, file, "NO_IF")?;
        let num_chans = match source.table_type.mode() {
            CalMode::Bandpass => read_count(&mut fptr, &hdu, file, "NO_CHAN")?,
            CalMode::Gain => 1,
        };
        let num_rows = fits_get_num_rows(&fptr, &hdu)?;
        debug!(
            "Found the table in HDU {}: {num_rows} rows, {num_pols} pols, {num_ifs} IFs, {num_chans} chans",
            hdu.number + 1
        );

        let cols = source.table_type.columns();
        let time = read_scalar_col(&mut fptr, &hdu, file, cols.time)?;
        let interval = read_scalar_col(&mut fptr, &hdu, file, cols.interval)?;
        let source_id = read_scalar_col(&mut fptr, &hdu, file, cols.source_id)?.mapv(|s| s as i32);
        let antenna = read_scalar_col(&mut fptr, &hdu, file, cols.antenna)?.mapv(|a| a as i32);

        let mut real = Vec::with_capacity(num_pols);
        let mut imag = Vec::with_capacity(num_pols);
        let mut weight = Vec::with_capacity(num_pols);
        for i_pol in 0..num_pols {
            real.push(read_vector_col(
                &mut fptr,
                &hdu,
                file,
                cols.real[i_pol],
                num_ifs * num_chans,
            )?);
            imag.push(read_vector_col(
                &mut fptr,
                &hdu,
                file,
                cols.imag[i_pol],
                num_ifs * num_chans,
            )?);
            weight.push(read_vector_col(
                &mut fptr,
                &hdu,
                file,
                cols.weight[i_pol],
                num_ifs,
            )?);
        }

        let (delay, mbdelay) = match (cols.delay, cols.mbdelay) {
            (Some(delay_cols), Some(mbdelay_cols)) => {
                let mut delay = Vec::with_capacity(num_pols);
                let mut mbdelay = Vec::with_capacity(num_pols);
                for i_pol in 0..num_pols {
                    delay.push(read_vector_col(
                        &mut fptr,
                        &hdu,
                        file,
                        delay_cols[i_pol],
                        num_ifs,
                    )?);
                    mbdelay.push(read_scalar_col(
                        &mut fptr,
                        &hdu,
                        file,
                        mbdelay_cols[i_pol],
                    )?);
                }
                (Some(delay), Some(mbdelay))
            }
            _ => (None, None),
        };

        Ok(AipsFitsCalTable {
            meta: AipsCalTableMeta {
                table_type: source.table_type,
                version: source.version,
                num_pols,
                num_ifs,
                num_chans,
                obs_start,
            },
            num_rows,
            time,
            interval,
            source_id,
            antenna,
            real,
            imag,
            weight,
            delay,
            mbdelay,
        })
    }
}

impl AipsCalSource for AipsFitsCalTable {
    fn meta(&self) -> &AipsCalTableMeta {
        &self.meta
    }

    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn row(&self, i_row: usize) -> Result<AipsCalRow, AipsReadError> {
        if i_row >= self.num_rows {
            return Err(AipsReadError::RowOutOfRange {
                index: i_row,
                num_rows: self.num_rows,
            });
        }

        // Stack the per-pol cells of this row.
        let gather = |per_pol: &[Array2<f64>]| -> Array2<f64> {
            let num_elems = per_pol.first().map(|a| a.len_of(Axis(1))).unwrap_or(0);
            Array2::from_shape_fn((per_pol.len(), num_elems), |(i_pol, i_elem)| {
                per_pol[i_pol][(i_row, i_elem)]
            })
        };

        let delays = match (&self.delay, &self.mbdelay) {
            (Some(delay), Some(mbdelay)) => Some(AipsDelays {
                single_band: gather(delay),
                multi_band: mbdelay.iter().map(|d| d[i_row]).collect(),
            }),
            _ => None,
        };

        Ok(AipsCalRow {
            time: self.time[i_row],
            interval: self.interval[i_row],
            source_id: self.source_id[i_row],
            antenna: self.antenna[i_row],
            real: gather(&self.real),
            imag: gather(&self.imag),
            weight: gather(&self.weight),
            delays,
        })
    }
}

/// Iterate over the extension HDUs looking for the table with the right
/// `EXTNAME` and `EXTVER`.
fn find_table_hdu(fptr: &mut FitsFile, source: &AipsSource) -> Result<FitsHdu, AipsReadError> {
    let extname = source.table_type.extname();
    let num_hdus = fits_get_num_hdus(fptr);
    for i_hdu in 1..num_hdus {
        let hdu = fits_open_hdu(fptr, i_hdu)?;
        let this_extname: Option<String> = fits_get_optional_key(fptr, &hdu, "EXTNAME")?;
        if this_extname.as_deref().map(str::trim) != Some(extname.as_str()) {
            continue;
        }
        // FITTP always writes EXTVER, but the FITS standard says a missing
        // EXTVER is 1.
        let extver: u32 = fits_get_optional_key(fptr, &hdu, "EXTVER")?.unwrap_or(1);
        trace!("HDU {} is {extname} version {extver}", i_hdu + 1);
        if extver == source.version {
            return Ok(hdu);
        }
    }

    Err(AipsReadError::NoTable {
        file: source.file.clone(),
        table_type: source.table_type,
        version: source.version,
    })
}

/// Read a positive integer keyword, e.g. `NO_IF`.
fn read_count(
    fptr: &mut FitsFile,
    hdu: &FitsHdu,
    file: &Path,
    key: &'static str,
) -> Result<usize, AipsReadError> {
    let value: i64 = fits_get_required_key(fptr, hdu, key)?;
    if value < 1 {
        return Err(AipsReadError::BadMetadata {
            file: PathBuf::from(file),
            key,
            value,
            expected: "positive",
        });
    }
    Ok(value as usize)
}

fn read_vector_col(
    fptr: &mut FitsFile,
    hdu: &FitsHdu,
    file: &Path,
    column: &'static str,
    expected_len: usize,
) -> Result<Array2<f64>, AipsReadError> {
    let data = fits_get_col_as_f64(fptr, hdu, column)?;
    let got = data.len_of(Axis(1));
    if got != expected_len {
        return Err(AipsReadError::ColumnLength {
            file: file.to_path_buf(),
            column,
            expected: expected_len,
            got,
        });
    }
    Ok(data)
}

fn read_scalar_col(
    fptr: &mut FitsFile,
    hdu: &FitsHdu,
    file: &Path,
    column: &'static str,
) -> Result<Array1<f64>, AipsReadError> {
    let data = read_vector_col(fptr, hdu, file, column, 1)?;
    Ok(data.column(0).to_owned())
}
