// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Wall-clock budgets for long-running loops.

use std::time::{Duration, Instant};

/// A point in time after which work should stop. A deadline without a
/// budget never expires.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    /// Start the clock now.
    pub fn new(budget: Option<Duration>) -> Deadline {
        Deadline {
            start: Instant::now(),
            budget,
        }
    }

    /// A deadline that never expires.
    pub fn never() -> Deadline {
        Deadline::new(None)
    }

    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }

    pub fn expired(&self) -> bool {
        match self.budget {
            Some(budget) => self.start.elapsed() >= budget,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadlines() {
        assert!(!Deadline::never().expired());
        assert!(Deadline::new(Some(Duration::ZERO)).expired());
        assert!(!Deadline::new(Some(Duration::from_secs(3600))).expired());
    }
}
