// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use rand::Rng;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::constants::{AGN_SIZE_DEG, SFG_PROBABILITY, SFG_SIZE_DEG};

/// The kind of a synthetic source. This determines its angular size.
#[derive(
    Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum SourceClass {
    /// A compact active galactic nucleus (0.5 milliarcseconds).
    #[strum(serialize = "AGN")]
    CompactAGN,

    /// An extended star-forming galaxy (10 milliarcseconds).
    #[strum(serialize = "SFG")]
    ExtendedSFG,
}

impl SourceClass {
    /// Draw a class; star-forming galaxies make up ~15% of sources.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> SourceClass {
        if rng.gen_bool(SFG_PROBABILITY) {
            SourceClass::ExtendedSFG
        } else {
            SourceClass::CompactAGN
        }
    }

    /// \[degrees\]
    pub fn angular_size(self) -> f64 {
        match self {
            SourceClass::CompactAGN => AGN_SIZE_DEG,
            SourceClass::ExtendedSFG => SFG_SIZE_DEG,
        }
    }
}

/// A synthetic source, before any scintillation properties are derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SyntheticSource {
    /// \[Jy\]
    pub flux: f64,

    /// \[degrees\]
    pub ra: f64,

    /// \[degrees\]
    pub dec: f64,

    pub class: SourceClass,
}

impl SyntheticSource {
    /// \[degrees\]
    pub fn angular_size(&self) -> f64 {
        self.class.angular_size()
    }
}
