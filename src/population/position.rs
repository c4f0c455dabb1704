// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Random sky positions.

use log::{debug, trace};
use rand::prelude::*;

use super::PopulationError;
use crate::{
    constants::{CUBE_SAFETY_FACTOR, POSITION_OVERSAMPLING},
    deadline::Deadline,
    region::Region,
};

/// Draw up to `num` positions uniformly distributed on the sky. Points are
/// drawn uniformly in the cube [-1, 1]^3, those outside the unit ball are
/// discarded, and the rest are projected onto the sphere.
///
/// Returns right ascensions in [0, 360] and declinations in [-90, 90]
/// \[degrees\]. Rarely, fewer than `num` points survive.
pub fn sample_sphere<R: Rng + ?Sized>(num: usize, rng: &mut R) -> (Vec<f64>, Vec<f64>) {
    let num_draws = (num as f64 * CUBE_SAFETY_FACTOR).ceil() as usize;
    let mut ra = Vec::with_capacity(num);
    let mut dec = Vec::with_capacity(num);
    for _ in 0..num_draws {
        if ra.len() == num {
            break;
        }
        let x: f64 = rng.gen_range(-1.0..=1.0);
        let y: f64 = rng.gen_range(-1.0..=1.0);
        let z: f64 = rng.gen_range(-1.0..=1.0);
        let r = (x * x + y * y + z * z).sqrt();
        if r > 1.0 || r == 0.0 {
            continue;
        }
        let (x, y, z) = (x / r, y / r, z / r);
        dec.push((z.clamp(-1.0, 1.0)).acos().to_degrees() - 90.0);
        ra.push(y.atan2(x).to_degrees() + 180.0);
    }
    (ra, dec)
}

/// Draw `num` positions uniformly distributed within a region \[degrees\].
/// Each round draws `num` × [`POSITION_OVERSAMPLING`] positions over the
/// whole sky and keeps those inside the region, until `num` positions have
/// been gathered. Small regions can take many rounds; if `max_rounds` rounds
/// aren't enough, or the deadline expires, an error is returned.
pub fn sample_in_region<R: Rng + ?Sized>(
    num: usize,
    region: &dyn Region,
    max_rounds: usize,
    deadline: &Deadline,
    rng: &mut R,
) -> Result<(Vec<f64>, Vec<f64>), PopulationError> {
    let mut ra = Vec::with_capacity(num);
    let mut dec = Vec::with_capacity(num);
    let mut rounds = 0;
    while ra.len() < num {
        if rounds == max_rounds {
            return Err(PopulationError::RegionUnsatisfiable {
                requested: num,
                accepted: ra.len(),
                rounds,
            });
        }
        if deadline.expired() {
            return Err(PopulationError::Cancelled(
                deadline.budget().unwrap_or_default(),
            ));
        }

        let (batch_ra, batch_dec) = sample_sphere(num * POSITION_OVERSAMPLING, rng);
        let inside = region.contains(&batch_ra, &batch_dec, true);
        for ((r, d), _) in batch_ra
            .into_iter()
            .zip(batch_dec)
            .zip(inside)
            .filter(|(_, inside)| *inside)
        {
            if ra.len() == num {
                break;
            }
            ra.push(r);
            dec.push(d);
        }
        rounds += 1;
        trace!("Region sampling round {rounds}: {}/{num} positions", ra.len());
    }
    debug!("Placed {num} positions in the region after {rounds} rounds");

    Ok((ra, dec))
}
