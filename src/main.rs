// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::Parser;

use cal_aips2ms::CalAips2Ms;

fn main() {
    // Only do work if clap was happy with the arguments; otherwise it prints
    // usage to stderr and exits.
    if let Err(e) = CalAips2Ms::parse().run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
