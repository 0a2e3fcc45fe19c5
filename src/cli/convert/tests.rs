// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use clap::Parser;
use indoc::formatdoc;
use tempfile::TempDir;

use super::{ConvertArgs, ConvertArgsError};
use crate::{aips::CalTableType, CalAips2MsError};

/// Inputs that exist, so that parsing arguments gets past existence checks.
struct Inputs {
    _tmp_dir: TempDir,
    aips: String,
    ms: String,
    output: String,
}

fn make_inputs() -> Inputs {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let aips = tmp_dir.path().join("1065880128.fits");
    File::create(&aips).unwrap();
    let ms = tmp_dir.path().join("1065880128.ms");
    std::fs::create_dir(&ms).unwrap();
    let output = tmp_dir.path().join("1065880128");

    Inputs {
        aips: aips.display().to_string(),
        ms: ms.display().to_string(),
        output: output.display().to_string(),
        _tmp_dir: tmp_dir,
    }
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let mut f = File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn test_table_type_selection() {
    let Inputs {
        aips, ms, output, _tmp_dir
    } = make_inputs();
    #[rustfmt::skip]
    let base = vec![
        "cal_aips2ms",
        "--aips", &aips,
        "--inver", "2",
        "--ms", &ms,
        "--output", &output,
    ];

    for (flag, expected) in [
        (None, CalTableType::Cl),
        (Some("-s"), CalTableType::Sn),
        (Some("--solution"), CalTableType::Sn),
        (Some("-b"), CalTableType::Bp),
        (Some("--bandpass"), CalTableType::Bp),
    ] {
        let mut args = base.clone();
        args.extend(flag);
        let params = ConvertArgs::parse_from(args).parse().unwrap();
        assert_eq!(params.aips.table_type, expected);
        assert_eq!(params.aips.version, 2);
        assert_eq!(params.aips.file, PathBuf::from(&aips));
        assert_eq!(params.templates, PathBuf::from("."));
    }
}

#[test]
fn test_bandpass_and_solution_conflict() {
    let Inputs {
        aips, ms, output, _tmp_dir
    } = make_inputs();
    #[rustfmt::skip]
    let result = ConvertArgs::try_parse_from([
        "cal_aips2ms",
        "--aips", &aips,
        "--inver", "1",
        "--ms", &ms,
        "--output", &output,
        "-b", "-s",
    ]);
    assert!(result.is_err());

    // The same thing can sneak in via an argument file.
    let args = ConvertArgs {
        aips: Some(PathBuf::from(&aips)),
        inver: Some(1),
        ms: Some(PathBuf::from(&ms)),
        output: Some(PathBuf::from(&output)),
        bandpass: true,
        solution: true,
        ..Default::default()
    };
    assert!(matches!(
        args.parse(),
        Err(ConvertArgsError::BandpassAndSolution)
    ));
}

#[test]
fn test_missing_arguments() {
    let Inputs {
        aips, ms, output, _tmp_dir
    } = make_inputs();
    let complete = ConvertArgs {
        aips: Some(PathBuf::from(&aips)),
        inver: Some(1),
        ms: Some(PathBuf::from(&ms)),
        output: Some(PathBuf::from(&output)),
        ..Default::default()
    };
    assert!(complete.clone().parse().is_ok());

    let mut args = complete.clone();
    args.aips = None;
    assert!(matches!(args.parse(), Err(ConvertArgsError::Missing("--aips"))));

    let mut args = complete.clone();
    args.inver = None;
    assert!(matches!(args.parse(), Err(ConvertArgsError::Missing("--inver"))));

    let mut args = complete.clone();
    args.ms = None;
    assert!(matches!(args.parse(), Err(ConvertArgsError::Missing("--ms"))));

    let mut args = complete.clone();
    args.output = None;
    assert!(matches!(args.parse(), Err(ConvertArgsError::Missing("--output"))));

    let mut args = complete.clone();
    args.inver = Some(0);
    assert!(matches!(args.parse(), Err(ConvertArgsError::ZeroVersion)));

    let mut args = complete;
    args.ms = Some(PathBuf::from("/surely/not/a/real.ms"));
    assert!(matches!(
        args.parse(),
        Err(ConvertArgsError::DoesNotExist {
            what: "measurement set",
            ..
        })
    ));
}

#[test]
fn test_cli_args_override_toml_args() {
    let Inputs {
        aips, ms, output, _tmp_dir
    } = make_inputs();
    let tmp_dir = TempDir::new().unwrap();
    let arg_file = write_file(
        tmp_dir.path(),
        "args.toml",
        &formatdoc! {r#"
            aips = "{aips}"
            inver = 3
            ms = "{ms}"
            output = "from_the_file"
            solution = true
        "#},
    );

    let arg_file_str = arg_file.display().to_string();
    #[rustfmt::skip]
    let args = ConvertArgs::parse_from([
        "cal_aips2ms",
        &arg_file_str,
        "--output", &output,
        "--inver", "4",
    ])
    .merge()
    .unwrap();
    assert!(args.args_file.is_none());
    assert_eq!(args.aips, Some(PathBuf::from(&aips)));
    assert_eq!(args.ms, Some(PathBuf::from(&ms)));
    assert_eq!(args.output, Some(PathBuf::from(&output)));
    assert_eq!(args.inver, Some(4));
    assert!(args.solution);
    assert!(!args.bandpass);

    let params = args.parse().unwrap();
    assert_eq!(params.aips.table_type, CalTableType::Sn);
}

#[test]
fn test_json_arg_file() {
    let Inputs {
        aips, ms, output, _tmp_dir
    } = make_inputs();
    let tmp_dir = TempDir::new().unwrap();
    let arg_file = write_file(
        tmp_dir.path(),
        "args.json",
        &formatdoc! {r#"
            {{
                "aips": "{aips}",
                "inver": 1,
                "ms": "{ms}",
                "output": "{output}",
                "bandpass": true,
                "templates": "/opt/casa/templates"
            }}
        "#},
    );

    let args = ConvertArgs {
        args_file: Some(arg_file),
        ..Default::default()
    }
    .merge()
    .unwrap();
    let params = args.parse().unwrap();
    assert_eq!(params.aips.table_type, CalTableType::Bp);
    assert_eq!(params.templates, PathBuf::from("/opt/casa/templates"));
}

#[test]
fn test_bad_arg_files() {
    let tmp_dir = TempDir::new().unwrap();

    let arg_file = write_file(tmp_dir.path(), "args.yaml", "inver: 1\n");
    let result = ConvertArgs {
        args_file: Some(arg_file),
        ..Default::default()
    }
    .merge();
    assert!(matches!(result, Err(CalAips2MsError::ArgFile(_))));

    let arg_file = write_file(tmp_dir.path(), "args.toml", "inver = \"one\"\n");
    let result = ConvertArgs {
        args_file: Some(arg_file),
        ..Default::default()
    }
    .merge();
    assert!(matches!(result, Err(CalAips2MsError::ArgFile(_))));
}

#[test]
fn test_antenna_map_is_read() {
    let Inputs {
        aips, ms, output, _tmp_dir
    } = make_inputs();
    let tmp_dir = TempDir::new().unwrap();
    let map = write_file(tmp_dir.path(), "ants.txt", "1 0\n3 1\n");

    let args = ConvertArgs {
        aips: Some(PathBuf::from(&aips)),
        inver: Some(1),
        ms: Some(PathBuf::from(&ms)),
        output: Some(PathBuf::from(&output)),
        antenna_map: Some(map),
        ..Default::default()
    };
    let params = args.parse().unwrap();
    assert_eq!(params.antenna_mapping.map(1), Some(0));
    assert_eq!(params.antenna_mapping.map(2), None);
    assert_eq!(params.antenna_mapping.map(3), Some(1));

    let map = write_file(tmp_dir.path(), "bad_ants.txt", "1 0\n1 1\n");
    let args = ConvertArgs {
        aips: Some(PathBuf::from(&aips)),
        inver: Some(1),
        ms: Some(PathBuf::from(&ms)),
        output: Some(PathBuf::from(&output)),
        antenna_map: Some(map),
        ..Default::default()
    };
    assert!(matches!(args.parse(), Err(ConvertArgsError::AntennaMap(_))));
}

#[test]
fn test_dry_run_writes_nothing() {
    let Inputs {
        aips, ms, output, _tmp_dir
    } = make_inputs();
    #[rustfmt::skip]
    let args = ConvertArgs::parse_from([
        "cal_aips2ms",
        "--aips", &aips,
        "--inver", "1",
        "--ms", &ms,
        "--output", &output,
    ]);
    assert!(args.run(true).is_ok());
    for suffix in ["gcal", "mbdcal", "sbdcal"] {
        assert!(!PathBuf::from(format!("{output}.{suffix}")).exists());
    }
}

#[test]
fn test_output_with_a_table_suffix_is_still_appended_to() {
    let Inputs { aips, ms, _tmp_dir, .. } = make_inputs();
    let tmp_dir = TempDir::new().unwrap();
    let output = tmp_dir.path().join("1065880128.gcal");
    let output_str = output.display().to_string();
    #[rustfmt::skip]
    let params = ConvertArgs::parse_from([
        "cal_aips2ms",
        "--aips", &aips,
        "--inver", "1",
        "--ms", &ms,
        "--output", &output_str,
    ])
    .parse()
    .unwrap();

    let tables: Vec<PathBuf> = params
        .table_paths(params.aips.table_type.mode())
        .into_iter()
        .map(|(_, table)| table)
        .collect();
    assert_eq!(
        tables,
        vec![
            tmp_dir.path().join("1065880128.gcal.gcal"),
            tmp_dir.path().join("1065880128.gcal.mbdcal"),
            tmp_dir.path().join("1065880128.gcal.sbdcal"),
        ]
    );
}
