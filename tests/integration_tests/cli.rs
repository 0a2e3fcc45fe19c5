// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests of the binary's argument handling.

use std::fs::File;

use tempfile::TempDir;

use crate::{cal_aips2ms, get_cmd_output};

#[test]
fn test_no_args_prints_usage() {
    let cmd = cal_aips2ms().ok();
    assert!(cmd.is_err());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stdout.is_empty(), "stdout wasn't empty: {stdout}");
    assert!(stderr.contains("USAGE"), "{stderr}");
}

#[test]
fn test_missing_required_arg_is_an_error() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("out");

    #[rustfmt::skip]
    let cmd = cal_aips2ms()
        .args([
            "--inver", "1",
            "--ms", "whatever.ms",
            "--output", &output.display().to_string(),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("--aips"), "{stderr}");
    // Nothing was converted.
    assert_eq!(std::fs::read_dir(tmp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_bandpass_and_solution_conflict() {
    #[rustfmt::skip]
    let cmd = cal_aips2ms()
        .args([
            "--aips", "obs.fits",
            "--inver", "1",
            "--ms", "obs.ms",
            "--output", "out",
            "-b", "-s",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(!stderr.is_empty());
}

#[test]
fn test_dry_run_has_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let aips = tmp_dir.path().join("obs.fits");
    File::create(&aips).unwrap();
    let ms = tmp_dir.path().join("obs.ms");
    std::fs::create_dir(&ms).unwrap();
    let output = tmp_dir.path().join("obs");
    let toml = tmp_dir.path().join("args.toml");

    #[rustfmt::skip]
    let cmd = cal_aips2ms()
        .args([
            "--aips", &aips.display().to_string(),
            "--inver", "1",
            "--ms", &ms.display().to_string(),
            "--output", &output.display().to_string(),
            "-b",
            "--dry-run",
            "--no-progress-bars",
            "--save-toml", &toml.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "dry run failed: {}", cmd.err().unwrap());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
    assert!(stdout.contains("Dry run"), "{stdout}");
    assert!(!tmp_dir.path().join("obs.bcal").exists());

    // The saved arguments reproduce the run.
    let saved = std::fs::read_to_string(&toml).unwrap();
    assert!(saved.contains("bandpass = true"), "{saved}");
    assert!(saved.contains("inver = 1"), "{saved}");
}
