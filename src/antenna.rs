// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mapping AIPS antenna numbers to measurement set antenna indices.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use log::debug;
use thiserror::Error;

use crate::constants::DEFAULT_ANTENNA_OFFSET;

/// How AIPS antenna numbers become measurement set `ANTENNA1` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AntennaMapping {
    /// `destination = source - offset`. AIPS numbers antennas from 1 and
    /// casacore from 0, so the default offset is 1.
    Offset(i32),

    /// An explicit lookup. Antennas without an entry are dropped.
    Table(HashMap<i32, i32>),
}

impl Default for AntennaMapping {
    fn default() -> Self {
        AntennaMapping::Offset(DEFAULT_ANTENNA_OFFSET)
    }
}

impl AntennaMapping {
    /// Read a mapping file. Each non-empty line holds two whitespace-separated
    /// integers: the AIPS antenna number and the measurement set antenna
    /// index. Lines starting with `#` are ignored.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<AntennaMapping, AntennaMapError> {
        let file = file.as_ref();
        let f = File::open(file).map_err(|e| AntennaMapError::IO {
            file: file.to_path_buf(),
            err: e,
        })?;
        let mapping = Self::from_reader(BufReader::new(f), file)?;
        debug!(
            "Read {} antenna mappings from {}",
            mapping.len().unwrap_or_default(),
            file.display()
        );
        Ok(mapping)
    }

    /// The guts of [`AntennaMapping::from_file`]. `file` is only used in error
    /// messages.
    pub fn from_reader<R: BufRead>(
        reader: R,
        file: &Path,
    ) -> Result<AntennaMapping, AntennaMapError> {
        let mut map = HashMap::new();
        for (i_line, line) in reader.lines().enumerate() {
            let line_num = i_line + 1;
            let line = line.map_err(|e| AntennaMapError::IO {
                file: file.to_path_buf(),
                err: e,
            })?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let malformed = || AntennaMapError::Malformed {
                file: file.to_path_buf(),
                line_num,
                line: line.to_string(),
            };
            let mut fields = line.split_whitespace();
            let (src, dst) = match (fields.next(), fields.next(), fields.next()) {
                (Some(src), Some(dst), None) => (
                    src.parse::<i32>().map_err(|_| malformed())?,
                    dst.parse::<i32>().map_err(|_| malformed())?,
                ),
                _ => return Err(malformed()),
            };
            if dst < 0 {
                return Err(malformed());
            }

            if map.insert(src, dst).is_some() {
                return Err(AntennaMapError::Duplicate {
                    file: file.to_path_buf(),
                    line_num,
                    antenna: src,
                });
            }
        }

        Ok(AntennaMapping::Table(map))
    }

    /// Get the measurement set antenna index for an AIPS antenna number, if
    /// it has one.
    pub fn map(&self, aips_antenna: i32) -> Option<i32> {
        match self {
            AntennaMapping::Offset(offset) => {
                let ant = aips_antenna - offset;
                if ant >= 0 {
                    Some(ant)
                } else {
                    None
                }
            }
            AntennaMapping::Table(map) => map.get(&aips_antenna).copied(),
        }
    }

    /// The number of explicit mappings, if this is a lookup table.
    pub fn len(&self) -> Option<usize> {
        match self {
            AntennaMapping::Offset(_) => None,
            AntennaMapping::Table(map) => Some(map.len()),
        }
    }
}

#[derive(Error, Debug)]
pub enum AntennaMapError {
    #[error("{file}:{line_num}: Expected two integers ('<AIPS antenna> <MS antenna>'), got '{line}'")]
    Malformed {
        file: PathBuf,
        line_num: usize,
        line: String,
    },

    #[error("{file}:{line_num}: AIPS antenna {antenna} was already mapped")]
    Duplicate {
        file: PathBuf,
        line_num: usize,
        antenna: i32,
    },

    #[error("Couldn't read antenna map {file}: {err}")]
    IO { file: PathBuf, err: std::io::Error },
}
