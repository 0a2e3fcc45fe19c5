// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{display_warnings, InfoPrinter, Warn, ARG_FILE_HELP};
use crate::{
    aips::{AipsSource, CalTableType},
    antenna::{AntennaMapError, AntennaMapping},
    params::ConvertParams,
    CalAips2MsError,
};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct ConvertArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    /// The FITS file that AIPS exported (with FITTP) containing the
    /// calibration table.
    #[clap(long, help_heading = "INPUT FILES")]
    pub(super) aips: Option<PathBuf>,

    /// The version of the AIPS table to convert.
    #[clap(long, help_heading = "INPUT FILES")]
    pub(super) inver: Option<u32>,

    /// The measurement set that the calibration tables are for. Only its
    /// ANTENNA table is read.
    #[clap(long, help_heading = "INPUT FILES")]
    pub(super) ms: Option<PathBuf>,

    /// A file mapping AIPS antenna numbers to measurement set antenna indices.
    /// Each line is '<AIPS antenna> <MS antenna>'; AIPS antennas that aren't
    /// in the file are skipped. The default is to subtract 1 from the AIPS
    /// antenna number.
    #[clap(long, help_heading = "INPUT FILES")]
    pub(super) antenna_map: Option<PathBuf>,

    /// Convert a BP (bandpass) table. The default is a CL table.
    #[clap(short, long, conflicts_with = "solution", help_heading = "TABLE TYPE")]
    #[serde(default)]
    pub(super) bandpass: bool,

    /// Convert an SN (solution) table. The default is a CL table.
    #[clap(short, long, help_heading = "TABLE TYPE")]
    #[serde(default)]
    pub(super) solution: bool,

    /// The base name of the output tables; a suffix is added for each table
    /// (.gcal, .mbdcal and .sbdcal for CL and SN tables, .bcal for BP tables).
    #[clap(short, long, help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,

    /// The directory containing the empty template tables (empty.gcal,
    /// empty.bcal, etc.) that outputs are copied from. Default: the current
    /// directory.
    #[clap(long, help_heading = "OUTPUT FILES")]
    pub(super) templates: Option<PathBuf>,
}

impl ConvertArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<ConvertArgs, CalAips2MsError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let ConvertArgs {
                args_file: _,
                aips,
                inver,
                ms,
                antenna_map,
                bandpass,
                solution,
                output,
                templates,
            } = unpack_arg_file!(arg_file);

            // Merge all the arguments, preferring the CLI args when available.
            Ok(ConvertArgs {
                args_file: None,
                aips: cli_args.aips.or(aips),
                inver: cli_args.inver.or(inver),
                ms: cli_args.ms.or(ms),
                antenna_map: cli_args.antenna_map.or(antenna_map),
                bandpass: cli_args.bandpass || bandpass,
                solution: cli_args.solution || solution,
                output: cli_args.output.or(output),
                templates: cli_args.templates.or(templates),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn parse(self) -> Result<ConvertParams, ConvertArgsError> {
        debug!("{:#?}", self);

        let Self {
            args_file: _,
            aips,
            inver,
            ms,
            antenna_map,
            bandpass,
            solution,
            output,
            templates,
        } = self;

        let aips = aips.ok_or(ConvertArgsError::Missing("--aips"))?;
        let version = inver.ok_or(ConvertArgsError::Missing("--inver"))?;
        let ms = ms.ok_or(ConvertArgsError::Missing("--ms"))?;
        let output = output.ok_or(ConvertArgsError::Missing("--output"))?;
        if version == 0 {
            return Err(ConvertArgsError::ZeroVersion);
        }
        let table_type = match (bandpass, solution) {
            (true, true) => return Err(ConvertArgsError::BandpassAndSolution),
            (true, false) => CalTableType::Bp,
            (false, true) => CalTableType::Sn,
            (false, false) => CalTableType::Cl,
        };
        for (what, path) in [("AIPS FITS file", &aips), ("measurement set", &ms)] {
            if !path.exists() {
                return Err(ConvertArgsError::DoesNotExist {
                    what,
                    path: path.clone(),
                });
            }
        }

        let mut printer = InfoPrinter::new("Conversion info".into());
        printer.push_line(
            format!(
                "Converting AIPS {table_type} table version {version} from {}",
                aips.display()
            )
            .into(),
        );
        printer.push_line(format!("Antennas from {}", ms.display()).into());

        let antenna_mapping = match antenna_map {
            Some(file) => {
                let mapping = AntennaMapping::from_file(&file)?;
                printer.push_line(
                    format!(
                        "Mapping {} AIPS antennas with {}",
                        mapping.len().unwrap_or_default(),
                        file.display()
                    )
                    .into(),
                );
                mapping
            }
            None => {
                printer.push_line("MS antenna = AIPS antenna - 1".into());
                AntennaMapping::default()
            }
        };

        let params = ConvertParams {
            aips: AipsSource {
                file: aips,
                table_type,
                version,
            },
            ms,
            output,
            antenna_mapping,
            templates: templates.unwrap_or_else(|| PathBuf::from(".")),
        };

        let mode = table_type.mode();
        if let Some(ext) = params.output.extension().and_then(|e| e.to_str()) {
            if mode.table_suffixes().contains(&ext) {
                format!(
                    "The output base name already ends in '.{ext}'; outputs will be named like '{}.{ext}'",
                    params.output.display()
                )
                .warn();
            }
        }
        let block = params
            .table_paths(mode)
            .into_iter()
            .map(|(template, table)| {
                format!("Writing {} (from {})", table.display(), template.display()).into()
            })
            .collect();
        printer.push_block(block);
        printer.display();

        display_warnings();

        Ok(params)
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), CalAips2MsError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()?;
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub(super) enum ConvertArgsError {
    #[error("No {0} was given")]
    Missing(&'static str),

    #[error("The {what} {path} does not exist")]
    DoesNotExist { what: &'static str, path: PathBuf },

    #[error("Only one of --bandpass (-b) and --solution (-s) may be given")]
    BandpassAndSolution,

    #[error("AIPS table versions start at 1; --inver 0 is not valid")]
    ZeroVersion,

    #[error(transparent)]
    AntennaMap(#[from] AntennaMapError),
}
