// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Convert AIPS calibration tables (CL, SN and BP) into CASA measurement set
calibration tables.

AIPS stores its solutions sparsely (a row per antenna per solution time, with
antennas possibly missing), whereas casacore calibration tables must have a
row for every spectral window, solution time and antenna. The heavy lifting
is done in [`solutions`]; everything else is reading, writing and glue.
 */

pub mod aips;
pub mod antenna;
mod cli;
pub mod constants;
pub(crate) mod io;
pub mod ms;
pub(crate) mod params;
pub mod solutions;
pub mod time;

// Re-exports.
pub use aips::{
    AipsCalRow, AipsCalSource, AipsCalTableMeta, AipsFitsCalTable, AipsSource, CalTableType,
};
pub use antenna::AntennaMapping;
pub use cli::{CalAips2Ms, CalAips2MsError};
pub use ms::{CalTableWriter, CasaCalTable};
pub use solutions::{CalMode, SolutionKey, SolutionRecord};

use crossbeam_utils::atomic::AtomicCell;

/// Should we be drawing progress bars? The default is no; the command line
/// turns them on unless told otherwise.
pub static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);
