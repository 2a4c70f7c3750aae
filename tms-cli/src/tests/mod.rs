//! Shared test harness modules for the `tms` CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod helpers;
mod pack_steps;
mod pack_unit;
