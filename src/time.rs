// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Time conversions between AIPS and casacore.
//!
//! AIPS calibration tables store times as fractional days since the start of
//! the observation (midnight of `DATE-OBS`). casacore wants UTC seconds since
//! the MJD epoch (1858-11-17).

use hifitime::{Duration, Epoch};
use thiserror::Error;

use crate::constants::MJD_UNIX_OFFSET_SECONDS;

/// Parse a FITS `DATE-OBS` value. AIPS writes `YYYY-MM-DD`, but some tasks
/// append a time, so `YYYY-MM-DDThh:mm:ss[.s]` is accepted too. Old-style
/// `DD/MM/YY` dates are not supported.
pub fn parse_date_obs(s: &str) -> Result<Epoch, TimeError> {
    let trimmed = s.trim().trim_matches('\'').trim();
    if trimmed.is_empty() {
        return Err(TimeError::BadDateObs(s.to_string()));
    }
    Epoch::from_gregorian_str(trimmed).map_err(|_| TimeError::BadDateObs(s.to_string()))
}

/// Convert an AIPS time (days relative to the observation start) into whole
/// MJD seconds, which is how casacore calibration tables store `TIME`. The
/// result is floored, so solutions within the same second collapse onto the
/// same timestamp.
pub fn aips_time_to_casa_seconds(obs_start: Epoch, days: f64) -> i64 {
    let epoch = obs_start + Duration::from_days(days);
    epoch.to_unix_seconds().floor() as i64 + MJD_UNIX_OFFSET_SECONDS
}

#[derive(Error, Debug)]
pub enum TimeError {
    #[error("Couldn't parse DATE-OBS '{0}'; expected YYYY-MM-DD or YYYY-MM-DDThh:mm:ss")]
    BadDateObs(String),
}
