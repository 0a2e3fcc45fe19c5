// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use hifitime::Epoch;
use marlu::{
    c32,
    rubbl_casatables::{Table, TableOpenMode},
};
use ndarray::prelude::*;
use tempfile::TempDir;

use super::*;
use crate::{
    aips::{AipsCalRow, AipsCalSource, AipsCalTableMeta, AipsReadError, AipsSource, CalTableType},
    antenna::AntennaMapping,
    io::FileWriteError,
    ms::{
        tests::{make_ms, make_template},
        CasaWriteError,
    },
    solutions::{CalMode, DenseGridError},
    time::aips_time_to_casa_seconds,
};

struct MemoryCalTable {
    meta: AipsCalTableMeta,
    rows: Vec<AipsCalRow>,
}

impl AipsCalSource for MemoryCalTable {
    fn meta(&self) -> &AipsCalTableMeta {
        &self.meta
    }

    fn num_rows(&self) -> usize {
        self.rows.len()
    }

    fn row(&self, i_row: usize) -> Result<AipsCalRow, AipsReadError> {
        self.rows
            .get(i_row)
            .cloned()
            .ok_or(AipsReadError::RowOutOfRange {
                index: i_row,
                num_rows: self.rows.len(),
            })
    }
}

fn bp_row(time: f64, antenna: i32) -> AipsCalRow {
    AipsCalRow {
        time,
        interval: 0.1,
        source_id: 1,
        antenna,
        real: Array2::ones((1, 4)),
        imag: Array2::zeros((1, 4)),
        weight: Array2::ones((1, 1)),
        delays: None,
    }
}

fn bp_table(rows: Vec<AipsCalRow>) -> MemoryCalTable {
    MemoryCalTable {
        meta: AipsCalTableMeta {
            table_type: CalTableType::Bp,
            version: 1,
            num_pols: 1,
            num_ifs: 1,
            num_chans: 4,
            obs_start: Epoch::from_gregorian_utc_at_midnight(2013, 10, 15),
        },
        rows,
    }
}

fn params(dir: &TempDir, table_type: CalTableType, mapping: AntennaMapping) -> ConvertParams {
    ConvertParams {
        aips: AipsSource {
            file: dir.path().join("obs.fits"),
            table_type,
            version: 1,
        },
        ms: dir.path().join("obs.ms"),
        output: dir.path().join("obs.cal"),
        antenna_mapping: mapping,
        templates: dir.path().join("templates"),
    }
}

#[test]
fn test_table_paths() {
    let tmp_dir = TempDir::new().unwrap();
    let params = params(&tmp_dir, CalTableType::Cl, AntennaMapping::default());
    let templates = tmp_dir.path().join("templates");

    let paths = params.table_paths(CalMode::Gain);
    assert_eq!(
        paths,
        vec![
            (templates.join("empty.gcal"), tmp_dir.path().join("obs.cal.gcal")),
            (
                templates.join("empty.mbdcal"),
                tmp_dir.path().join("obs.cal.mbdcal")
            ),
            (
                templates.join("empty.sbdcal"),
                tmp_dir.path().join("obs.cal.sbdcal")
            ),
        ]
    );

    let paths = params.table_paths(CalMode::Bandpass);
    assert_eq!(
        paths,
        vec![(templates.join("empty.bcal"), tmp_dir.path().join("obs.cal.bcal"))]
    );
}

#[test]
fn test_suffix_is_appended_not_replaced() {
    let tmp_dir = TempDir::new().unwrap();
    let mut params = params(&tmp_dir, CalTableType::Bp, AntennaMapping::default());
    params.output = PathBuf::from("out/1065880128.v2");
    let paths = params.table_paths(CalMode::Bandpass);
    assert_eq!(paths[0].1, PathBuf::from("out/1065880128.v2.bcal"));
}

#[test]
fn test_no_donor_is_caught_before_anything_is_made() {
    let tmp_dir = TempDir::new().unwrap();
    // Only AIPS antenna 1 is mapped, and antenna 2 is the only one at the
    // second timestamp.
    let mapping = AntennaMapping::Table([(1, 0)].into_iter().collect());
    let params = params(&tmp_dir, CalTableType::Bp, mapping);
    let source = bp_table(vec![bp_row(0.0, 1), bp_row(0.5, 2)]);

    let result = params.run_with_source(&source);
    assert!(matches!(
        result,
        Err(ConvertError::DenseGrid(DenseGridError::NoDonor { .. }))
    ));
    assert!(!tmp_dir.path().join("obs.cal.bcal").exists());
}

#[test]
fn test_existing_output_is_fatal() {
    let tmp_dir = TempDir::new().unwrap();
    let params = params(&tmp_dir, CalTableType::Bp, AntennaMapping::default());
    std::fs::create_dir(tmp_dir.path().join("obs.cal.bcal")).unwrap();
    let source = bp_table(vec![bp_row(0.0, 1)]);

    let result = params.run_with_source(&source);
    assert!(matches!(
        result,
        Err(ConvertError::FileWrite(FileWriteError::AlreadyExists(_)))
    ));
}

#[test]
fn test_missing_ms_is_fatal() {
    let tmp_dir = TempDir::new().unwrap();
    let params = params(&tmp_dir, CalTableType::Bp, AntennaMapping::default());
    let source = bp_table(vec![bp_row(0.0, 1)]);

    let result = params.run_with_source(&source);
    assert!(matches!(
        result,
        Err(ConvertError::CasaWrite(CasaWriteError::MissingMs(_)))
    ));
    assert!(!tmp_dir.path().join("obs.cal.bcal").exists());
}

#[test]
fn test_missing_fits_file_is_fatal() {
    let tmp_dir = TempDir::new().unwrap();
    let params = params(&tmp_dir, CalTableType::Sn, AntennaMapping::default());
    let result = params.run();
    assert!(matches!(result, Err(ConvertError::AipsRead(_))));
}

#[test]
fn test_conversion_fills_casa_tables() {
    let tmp_dir = TempDir::new().unwrap();
    let params = params(&tmp_dir, CalTableType::Bp, AntennaMapping::default());
    std::fs::create_dir(&params.templates).unwrap();
    make_template(&params.templates.join("empty.bcal"));
    make_ms(&params.ms, 2);

    // AIPS antenna 2 (MS antenna 1) is missing at the second timestamp.
    let mut real = vec![bp_row(0.0, 1), bp_row(0.0, 2), bp_row(0.5, 1)];
    for row in &mut real {
        row.real.fill(2.0);
    }
    let source = bp_table(real);
    let obs_start = source.meta.obs_start;

    let summary = params.run_with_source(&source).unwrap();
    assert_eq!(summary.rows_per_table, 4);
    assert_eq!(summary.num_real, 3);
    assert_eq!(summary.num_placeholders, 1);

    let bcal = tmp_dir.path().join("obs.cal.bcal");
    let mut table = Table::open(&bcal, TableOpenMode::Read).unwrap();
    assert_eq!(table.n_rows(), 4);
    let t0 = aips_time_to_casa_seconds(obs_start, 0.0) as f64;
    let t1 = aips_time_to_casa_seconds(obs_start, 0.5) as f64;
    for (i_row, (time, antenna, placeholder)) in [
        (t0, 0, false),
        (t0, 1, false),
        (t1, 0, false),
        (t1, 1, true),
    ]
    .into_iter()
    .enumerate()
    {
        let i_row = i_row as u64;
        let row_time: f64 = table.get_cell("TIME", i_row).unwrap();
        assert_eq!(row_time, time);
        let antenna1: i32 = table.get_cell("ANTENNA1", i_row).unwrap();
        assert_eq!(antenna1, antenna);
        let cal_desc_id: i32 = table.get_cell("CAL_DESC_ID", i_row).unwrap();
        assert_eq!(cal_desc_id, 0);
        let flag: Array2<bool> = table.get_cell("FLAG", i_row).unwrap();
        assert_eq!(flag.dim(), (4, 1));
        assert!(flag.iter().all(|&f| f == placeholder));
        let gain: Array2<c32> = table.get_cell("GAIN", i_row).unwrap();
        let expected = if placeholder { 1.0 } else { 2.0 };
        assert!(gain.iter().all(|&g| g == c32::new(expected, 0.0)));
    }

    let mut cal_desc = Table::open(bcal.join("CAL_DESC"), TableOpenMode::Read).unwrap();
    assert_eq!(cal_desc.n_rows(), 1);
    let spw: Vec<i32> = cal_desc.get_cell("SPECTRAL_WINDOW_ID", 0).unwrap();
    assert_eq!(spw, vec![0]);
    let ms: String = cal_desc.get_cell("MS_NAME", 0).unwrap();
    assert_eq!(ms, "obs.ms");
}
