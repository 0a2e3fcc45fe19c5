// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! File stuff that isn't specific to AIPS or casacore.

pub(crate) mod fits;

use std::path::Path;

use log::trace;
use thiserror::Error;

/// Check that nothing exists at the path we want to create a table at. casacore
/// tables are directories, and we refuse to clobber an existing one.
pub(crate) fn check_table_path_is_free(path: &Path) -> Result<(), FileWriteError> {
    trace!("Testing whether {} already exists", path.display());
    if path.exists() {
        return Err(FileWriteError::AlreadyExists(path.display().to_string()));
    }

    if let Some(parent) = path.parent() {
        // An empty parent means the current directory.
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(FileWriteError::NoParentDir(parent.display().to_string()));
        }
    }

    Ok(())
}

#[derive(Error, Debug)]
pub enum FileWriteError {
    #[error("'{0}' already exists; refusing to overwrite it")]
    AlreadyExists(String),

    #[error("The directory '{0}' does not exist")]
    NoParentDir(String),
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_existing_table_path_is_rejected() {
        let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
        let table = tmp_dir.path().join("out.gcal");
        std::fs::create_dir(&table).unwrap();

        let result = check_table_path_is_free(&table);
        assert!(matches!(result, Err(FileWriteError::AlreadyExists(_))));
    }

    #[test]
    fn test_missing_parent_is_rejected() {
        let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
        let table = tmp_dir.path().join("nope").join("out.gcal");

        let result = check_table_path_is_free(&table);
        assert!(matches!(result, Err(FileWriteError::NoParentDir(_))));
    }

    #[test]
    fn test_free_table_path_is_ok() {
        let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
        let table = tmp_dir.path().join("out.bcal");
        assert!(check_table_path_is_free(&table).is_ok());
        // Relative paths without a parent directory are fine too.
        assert!(check_table_path_is_free(Path::new("surely_not_here.gcal")).is_ok());
    }
}
