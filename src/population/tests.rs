// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::time::Duration;

use approx::assert_abs_diff_eq;
use rand::{rngs::StdRng, SeedableRng};

use super::*;
use crate::{
    constants::{AGN_SIZE_DEG, SFG_PROBABILITY, SFG_SIZE_DEG},
    region::{RegionShape, SkyRegion},
};

fn square_region(side: f64) -> SkyRegion {
    SkyRegion::new(vec![RegionShape::ra_dec_box(0.0, side, 0.0, side)]).unwrap()
}

#[test]
fn invalid_distributions() {
    assert_eq!(
        FluxDistribution::new(3300.0, 1.0, 0.01),
        Err(PopulationError::InvalidFluxBounds {
            low: 1.0,
            upp: 0.01
        })
    );
    assert!(matches!(
        FluxDistribution::new(3300.0, 0.0, 1.0),
        Err(PopulationError::InvalidFluxBounds { .. })
    ));
    assert!(matches!(
        FluxDistribution::new(3300.0, -0.1, 1.0),
        Err(PopulationError::InvalidFluxBounds { .. })
    ));
    assert!(matches!(
        FluxDistribution::new(3300.0, 0.5, 0.5),
        Err(PopulationError::InvalidFluxBounds { .. })
    ));
    assert_eq!(
        FluxDistribution::new(-1.0, 0.01, 1.0),
        Err(PopulationError::InvalidNormalisation(-1.0))
    );
    assert_eq!(
        FluxDistribution::with_index(3300.0, 1.0, 0.01, 1.0),
        Err(PopulationError::InvalidIndex(1.0))
    );
}

#[test]
fn differential_counts_integrate_the_power_law() {
    let d = FluxDistribution::new(3300.0, 0.01, 1.0).unwrap();
    let edges = d.bin_edges();
    assert_eq!(edges.len(), 100);
    assert_abs_diff_eq!(edges[0], 0.01, epsilon = 1e-15);
    assert_eq!(edges[99], 1.0);

    let counts = d.differential_counts();
    assert_eq!(counts.len(), 99);
    assert!(counts.iter().all(|&n| n > 0.0));
    // Fainter bins hold more sources.
    assert!(counts[0] > counts[98]);
    let total: f64 = counts.iter().sum();
    let expected = 3300.0 / 0.6 * (0.01_f64.powf(-0.6) - 1.0);
    assert_abs_diff_eq!(total, expected, epsilon = 1e-8);
}

#[test]
fn small_areas_truncate_to_nothing() {
    // With the default normalisation, no bin holds a whole source in a square
    // degree.
    let d = FluxDistribution::new(3300.0, 0.01, 1.0).unwrap();
    let area = square_region(1.0).area(false);
    assert_eq!(d.expected_count(area), 0);
    let mut rng = StdRng::seed_from_u64(1);
    assert!(d.sample_fluxes(area, &mut rng).is_empty());
}

#[test]
fn calibration_reaches_target() {
    let cases = [
        (3300.0, 0.01, 1.0, square_region(10.0), 1000),
        (1000.0, 0.001, 10.0, square_region(20.0), 20000),
        (3300.0, 0.01, 1.0, square_region(1.0), 50),
        (
            500.0,
            0.05,
            2.0,
            SkyRegion::new(vec![RegionShape::cap(100.0, -40.0, 10.0)]).unwrap(),
            300,
        ),
        (3300.0, 0.01, 1.0, square_region(1.0), 7),
    ];
    for (a, low, upp, region, target) in cases {
        let d = FluxDistribution::new(a, low, upp).unwrap();
        let area = region.area(false);
        let c = d.calibrate(target, area, 1000, &Deadline::never()).unwrap();
        let t = target as f64;
        assert!(
            (c.count as f64) > 0.99 * t && (c.count as f64) < 1.01 * t,
            "target {target}, got {}",
            c.count
        );
        assert!(c.steps <= 500, "took {} steps", c.steps);
        assert_eq!(c.count, c.distribution.expected_count(area));
        // Only the normalisation changes.
        assert_eq!(c.distribution.low, low);
        assert_eq!(c.distribution.upp, upp);
        assert_eq!(c.distribution.b, d.b);

        let mut rng = StdRng::seed_from_u64(target as u64);
        assert_eq!(c.distribution.sample_fluxes(area, &mut rng).len(), c.count);
    }
}

#[test]
fn calibration_already_in_band_takes_no_steps() {
    let d = FluxDistribution::new(3300.0, 0.01, 1.0).unwrap();
    let area = square_region(10.0).area(false);
    let count = d.expected_count(area);
    let c = d.calibrate(count, area, 0, &Deadline::never()).unwrap();
    assert_eq!(c.steps, 0);
    assert_eq!(c.distribution, d);
}

#[test]
fn calibration_is_bounded() {
    let d = FluxDistribution::new(3300.0, 0.01, 1.0).unwrap();
    let area = square_region(10.0).area(false);
    let result = d.calibrate(1000, area, 10, &Deadline::never());
    assert!(matches!(
        result,
        Err(PopulationError::CalibrationDivergence {
            target: 1000,
            steps: 10,
            ..
        })
    ));

    assert_eq!(
        d.calibrate(0, area, 10, &Deadline::never()),
        Err(PopulationError::InvalidTargetCount)
    );
    assert_eq!(
        d.calibrate(10, 0.0, 10, &Deadline::never()),
        Err(PopulationError::InvalidArea(0.0))
    );
}

#[test]
fn calibration_respects_deadline() {
    let d = FluxDistribution::new(3300.0, 0.01, 1.0).unwrap();
    let area = square_region(10.0).area(false);
    let result = d.calibrate(1000, area, 1000, &Deadline::new(Some(Duration::ZERO)));
    assert_eq!(result, Err(PopulationError::Cancelled(Duration::ZERO)));
}

#[test]
fn fluxes_are_within_bounds() {
    let d = FluxDistribution::new(3300.0, 0.01, 1.0).unwrap();
    let area = square_region(30.0).area(false);
    let mut rng = StdRng::seed_from_u64(42);
    let fluxes = d.sample_fluxes(area, &mut rng);
    assert_eq!(fluxes.len(), d.expected_count(area));
    assert!(fluxes.iter().all(|s| (0.01..=1.0).contains(s)));

    // Each bin has the right number of sources.
    let edges = d.bin_edges();
    let counts = d.bin_counts(area);
    for (i, w) in edges.windows(2).enumerate() {
        let n = fluxes.iter().filter(|&&s| s > w[0] && s < w[1]).count();
        // Samples exactly on an edge are vanishingly rare.
        assert!(n.abs_diff(counts[i]) <= 1, "bin {i}: {n} vs {}", counts[i]);
    }
}

#[test]
fn sphere_positions_are_uniform() {
    let mut rng = StdRng::seed_from_u64(7);
    let (ra, dec) = sample_sphere(100_000, &mut rng);
    assert!(ra.len() > 99_000);
    assert_eq!(ra.len(), dec.len());
    assert!(ra.iter().all(|r| (0.0..=360.0).contains(r)));
    assert!(dec.iter().all(|d| (-90.0..=90.0).contains(d)));

    // sin(dec) is uniform on [-1, 1].
    let n = dec.len() as f64;
    let mean_z = dec.iter().map(|d| d.to_radians().sin()).sum::<f64>() / n;
    assert_abs_diff_eq!(mean_z, 0.0, epsilon = 0.01);
    let north = dec.iter().filter(|&&d| d > 30.0).count() as f64 / n;
    assert_abs_diff_eq!(north, 0.25, epsilon = 0.01);
    let east = ra.iter().filter(|&&r| r < 90.0).count() as f64 / n;
    assert_abs_diff_eq!(east, 0.25, epsilon = 0.01);
}

#[test]
fn region_sampling_stays_in_region() {
    let region = SkyRegion::new(vec![
        RegionShape::cap(60.0, -30.0, 3.0),
        RegionShape::ra_dec_box(355.0, 5.0, -2.0, 2.0),
    ])
    .unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let (ra, dec) = sample_in_region(500, &region, 10_000, &Deadline::never(), &mut rng).unwrap();
    assert_eq!(ra.len(), 500);
    assert!(region.contains(&ra, &dec, true).into_iter().all(|b| b));
    // Both shapes are populated.
    assert!(ra.iter().any(|&r| (55.0..65.0).contains(&r)));
    assert!(ra.iter().any(|&r| !(55.0..65.0).contains(&r)));
}

#[test]
fn region_sampling_is_bounded() {
    let tiny = SkyRegion::new(vec![RegionShape::cap(10.0, 10.0, 1e-4)]).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let result = sample_in_region(100, &tiny, 3, &Deadline::never(), &mut rng);
    assert_eq!(
        result,
        Err(PopulationError::RegionUnsatisfiable {
            requested: 100,
            accepted: 0,
            rounds: 3
        })
    );

    let result = sample_in_region(
        100,
        &tiny,
        3,
        &Deadline::new(Some(Duration::ZERO)),
        &mut rng,
    );
    assert_eq!(result, Err(PopulationError::Cancelled(Duration::ZERO)));

    // Nothing requested, nothing to do.
    let (ra, _) = sample_in_region(0, &tiny, 0, &Deadline::never(), &mut rng).unwrap();
    assert!(ra.is_empty());
}

#[test]
fn class_frequencies() {
    let mut rng = StdRng::seed_from_u64(11);
    let n = 100_000;
    let num_sfg = (0..n)
        .filter(|_| SourceClass::draw(&mut rng) == SourceClass::ExtendedSFG)
        .count();
    let frac = num_sfg as f64 / n as f64;
    assert_abs_diff_eq!(frac, SFG_PROBABILITY, epsilon = 0.005);
    assert_abs_diff_eq!(SFG_PROBABILITY, 0.15161, epsilon = 1e-12);
}

#[test]
fn class_sizes() {
    assert_eq!(SourceClass::CompactAGN.angular_size(), 0.5e-3 / 3600.0);
    assert_eq!(SourceClass::ExtendedSFG.angular_size(), 10e-3 / 3600.0);
    assert_eq!(SourceClass::CompactAGN.to_string(), "AGN");
    assert_eq!(SourceClass::ExtendedSFG.to_string(), "SFG");
}

#[test]
fn generated_populations() {
    let region = square_region(10.0);
    let d = FluxDistribution::new(3300.0, 0.01, 1.0).unwrap();
    let generator = PopulationGenerator::new(d, Some(1000), &region, SamplingLimits::default());
    let mut rng = StdRng::seed_from_u64(2024);
    let pop = generator.generate(&Deadline::never(), &mut rng).unwrap();

    let n = pop.sources.len();
    assert!(n > 990 && n < 1010);
    assert!(pop.calibration_steps > 0);
    assert_eq!(n, pop.distribution.expected_count(region.area(false)));

    let ra: Vec<f64> = pop.sources.iter().map(|s| s.ra).collect();
    let dec: Vec<f64> = pop.sources.iter().map(|s| s.dec).collect();
    assert!(region.contains(&ra, &dec, true).into_iter().all(|b| b));
    for s in &pop.sources {
        assert!((0.01..=1.0).contains(&s.flux));
        let size = s.angular_size();
        assert!(size == AGN_SIZE_DEG || size == SFG_SIZE_DEG);
        match s.class {
            SourceClass::CompactAGN => assert_eq!(size, AGN_SIZE_DEG),
            SourceClass::ExtendedSFG => assert_eq!(size, SFG_SIZE_DEG),
        }
    }

    // Same seed, same population.
    let mut rng = StdRng::seed_from_u64(2024);
    let again = generator.generate(&Deadline::never(), &mut rng).unwrap();
    assert_eq!(pop.sources, again.sources);

    // Without a target, the normalisation is untouched.
    let generator = PopulationGenerator::new(d, None, &region, SamplingLimits::default());
    let pop = generator.generate(&Deadline::never(), &mut rng).unwrap();
    assert_eq!(pop.distribution, d);
    assert_eq!(pop.calibration_steps, 0);
    assert_eq!(pop.sources.len(), d.expected_count(region.area(false)));
}
