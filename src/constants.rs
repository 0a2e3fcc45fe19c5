// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All floating-point constants *must* be double precision.
 */

/// The Unix epoch (1970-01-01T00:00:00 UTC) expressed as seconds since the
/// Modified Julian Date epoch (1858-11-17T00:00:00 UTC). casacore stores
/// `TIME` columns as MJD seconds.
pub const MJD_UNIX_OFFSET_SECONDS: i64 = 3_506_716_800;

/// AIPS writes this value into both the real and imaginary parts of a gain
/// that could not be solved for.
pub const AIPS_BAD_SOLUTION_SENTINEL: i64 = 3140;

/// AIPS antenna numbers start at 1; measurement set antenna indices start at
/// 0. Without an antenna map, this is subtracted from AIPS antenna numbers.
pub const DEFAULT_ANTENNA_OFFSET: i32 = 1;

pub const SECONDS_PER_DAY: f64 = 86400.0;

/// AIPS delays are in seconds, casacore delay tables expect nanoseconds.
pub const NANOSECONDS_PER_SECOND: f64 = 1e9;

/// casacore calibration tables describe every solution as a 2x2 Jones matrix.
pub(crate) const CAL_DESC_N_JONES: i32 = 2;

/// The name prefix of empty casacore calibration tables that get copied to
/// make the output tables, e.g. "empty.gcal".
pub(crate) const TEMPLATE_TABLE_PREFIX: &str = "empty";
