// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! File stuff (input/output, reading/writing) for sky rasters, catalogs and
//! survey reports.

pub(crate) mod read;
pub(crate) mod write;
