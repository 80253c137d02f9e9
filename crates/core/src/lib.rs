// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod aggregator;
mod apply;
mod command;
mod error;
mod scheduler;
mod snapshot;
mod state;

#[cfg(test)]
mod tests;

pub use aggregator::{Rating, Standings, expected_score};
pub use apply::apply;
pub use command::Command;
pub use error::{CoreError, SchedulerError};
pub use scheduler::{Next, PairingScheduler};
pub use snapshot::{SNAPSHOT_SCHEMA_VERSION, SessionSnapshot};
pub use state::{Progress, Session, SessionEvent, Transition};
