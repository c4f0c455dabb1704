// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::{assert_abs_diff_eq, assert_relative_eq};

use super::*;
use crate::raster::tests::uniform_maps;

const FREQ: f64 = 185e6;

/// Hα of 1 ± 0.1 R and a 1 GHz scattering delay of 10 μs.
fn screen() -> ScreenProperties {
    ScreenProperties::new(Measurement::new(1.0, 0.1), 1e-5, FREQ)
}

#[test]
fn screen_chain() {
    let s = screen();
    assert_relative_eq!(s.sm.value, 2.032_292_272_635_759e-4, max_relative = 1e-12);
    assert_relative_eq!(s.sm.error, 2.032_292_272_635_759e-5, max_relative = 1e-12);
    assert_relative_eq!(s.rdiff.value, 1.100_540_574_461_51e7, max_relative = 1e-9);
    assert_relative_eq!(s.rdiff.error, 6.603_243_446_769_06e5, max_relative = 1e-9);
    assert_relative_eq!(s.tau.value, 8.537_153_424_919_204e-3, max_relative = 1e-12);
    assert_relative_eq!(s.tau.error, 8.537_153_424_919_204e-4, max_relative = 1e-12);
    assert_relative_eq!(s.rf.value, 4.902_904_093_832_379e10, max_relative = 1e-9);
    assert_relative_eq!(s.rf.error, 2.990_771_497_237_752e8, max_relative = 1e-9);
    assert_relative_eq!(s.xi.value, 4_454.996_215_138_503, max_relative = 1e-9);
    assert_relative_eq!(s.xi.error, 268.677_641_686_552_7, max_relative = 1e-9);
    assert_relative_eq!(s.theta.value, 1.342_720_686_632_47e-6, max_relative = 1e-9);
    assert_relative_eq!(s.theta.error, 8.056_324_119_794_822e-8, max_relative = 1e-9);
}

#[test]
fn compact_source_observables() {
    let s = screen();
    // A compact AGN is smaller than the scattering disk here.
    assert!(!s.resolves(AGN_SIZE_DEG));

    let m = s.modulation(AGN_SIZE_DEG);
    assert_relative_eq!(m.value, 6.077_396_249_880_33e-2, max_relative = 1e-9);
    assert_relative_eq!(m.error, 1.221_744_765_621_372e-3, max_relative = 1e-9);
    assert_eq!(m, s.modulation(0.0));

    let t0 = s.timescale(AGN_SIZE_DEG, DEFAULT_SCREEN_VELOCITY);
    assert_relative_eq!(t0.value, 692.144_497_085_023, max_relative = 1e-9);
    assert_relative_eq!(t0.error, 41.955_719_046_190_33, max_relative = 1e-9);
}

#[test]
fn resolved_sources_are_less_modulated() {
    let s = screen();
    assert!(s.resolves(SFG_SIZE_DEG));

    let point = s.modulation(0.0);
    let extended = s.modulation(SFG_SIZE_DEG);
    let factor = (s.theta.value / SFG_SIZE_DEG).powf(7.0 / 6.0);
    assert!(factor < 1.0);
    assert!(extended.value < point.value);
    assert_relative_eq!(extended.value, point.value * factor, max_relative = 1e-12);
    let expected_error = extended.value
        * ((point.error / point.value).powi(2)
            + (7.0 / 6.0 * s.theta.error / s.theta.value).powi(2))
        .sqrt();
    assert_relative_eq!(extended.error, expected_error, max_relative = 1e-12);

    // Bigger sources are suppressed more.
    assert!(s.modulation(10.0 * SFG_SIZE_DEG).value < extended.value);
}

#[test]
fn resolved_sources_vary_slowly() {
    let s = screen();
    let point = s.timescale(0.0, DEFAULT_SCREEN_VELOCITY);
    let extended = s.timescale(SFG_SIZE_DEG, DEFAULT_SCREEN_VELOCITY);
    assert_relative_eq!(
        extended.value,
        point.value * SFG_SIZE_DEG / s.theta.value,
        max_relative = 1e-12
    );
    let expected_error = extended.value
        * ((point.error / point.value).powi(2) + (s.theta.error / s.theta.value).powi(2)).sqrt();
    assert_relative_eq!(extended.error, expected_error, max_relative = 1e-12);
}

#[test]
fn timescale_scales_inversely_with_velocity() {
    let s = screen();
    let slow = s.timescale(0.0, 5e3);
    let fast = s.timescale(0.0, 20e3);
    assert_relative_eq!(slow.value, 4.0 * fast.value, max_relative = 1e-12);
}

#[test]
fn rms_variability_on_short_timescales() {
    let s = screen();
    let m = s.modulation(AGN_SIZE_DEG);
    let t0 = s.timescale(AGN_SIZE_DEG, DEFAULT_SCREEN_VELOCITY);

    let rms = s.rms_variability(AGN_SIZE_DEG, DEFAULT_SCREEN_VELOCITY, 1.0);
    assert_relative_eq!(rms.value, m.value / t0.value, max_relative = 1e-12);
    let expected_error = rms.value
        * ((m.error / m.value).powi(2) + (t0.error / t0.value).powi(2)).sqrt();
    assert_relative_eq!(rms.error, expected_error, max_relative = 1e-12);

    // Monitoring for longer than the timescale recovers the full modulation.
    let rms = s.rms_variability(AGN_SIZE_DEG, DEFAULT_SCREEN_VELOCITY, 1e4);
    assert_eq!(rms, m);
}

#[test]
fn transition_frequency() {
    assert_relative_eq!(
        screen().transition_frequency(),
        34.425_118_388_781_07,
        max_relative = 1e-9
    );
}

#[test]
fn tau_scales_with_frequency() {
    let low = ScreenProperties::new(Measurement::new(1.0, 0.1), 1e-5, 100e6);
    let high = ScreenProperties::new(Measurement::new(1.0, 0.1), 1e-5, 200e6);
    assert_relative_eq!(low.tau.value, 16.0 * high.tau.value, max_relative = 1e-12);
    assert_relative_eq!(low.tau.error, 0.1 * low.tau.value, max_relative = 1e-12);
}

#[test]
fn degenerate_screens_give_nan() {
    // No Hα means no scattering measure; this must not panic.
    let s = ScreenProperties::new(Measurement::new(0.0, 0.0), 1e-5, FREQ);
    assert!(!s.xi.is_finite());
    let m = s.modulation(AGN_SIZE_DEG);
    assert!(!m.is_finite());
}

#[test]
fn model_uses_rasters() {
    let maps = uniform_maps(1.0, 0.1, 1e-5);
    let model = ScintillationModel::at_freq(&maps, FREQ);
    assert_abs_diff_eq!(model.velocity(), DEFAULT_SCREEN_VELOCITY);
    let pos = RADec::from_degrees(150.0, -20.0);

    let ha = model.halpha(&pos);
    assert_relative_eq!(ha.value, 1.0);
    assert_relative_eq!(ha.error, 0.1, max_relative = 1e-6);
    assert_relative_eq!(
        model.scattering_measure(&pos).value,
        2.032_292_272_635_759e-4,
        max_relative = 1e-6
    );
    assert_relative_eq!(
        model.xi(&pos).value,
        4_454.996_215_138_503,
        max_relative = 1e-6
    );

    let obs = model.observables(&pos, SFG_SIZE_DEG);
    assert_eq!(obs.modulation, model.modulation(&pos, SFG_SIZE_DEG));
    assert_eq!(obs.timescale, model.timescale(&pos, SFG_SIZE_DEG));
    assert_eq!(obs.theta, model.theta(&pos));
    assert_eq!(obs.tau, model.tau(&pos));
    assert_eq!(model.rdiff(&pos), model.screen(&pos).rdiff);
    assert_eq!(model.rf(&pos), model.screen(&pos).rf);
    assert_relative_eq!(
        model.transition_frequency(&pos),
        34.425_118_388_781_07,
        max_relative = 1e-6
    );
    assert!(model.rms_variability(&pos, AGN_SIZE_DEG, 1.0).value < obs.modulation.value);
}

#[test]
fn line_of_sight_matches_individual_lookups() {
    let maps = uniform_maps(1.0, 0.1, 1e-5);
    let model = ScintillationModel::new(&maps, FREQ, 2.0 * DEFAULT_SCREEN_VELOCITY);
    let pos = RADec::from_degrees(20.0, 45.0);
    let los = model.line_of_sight(&pos, AGN_SIZE_DEG, 0.5);
    assert_abs_diff_eq!(los.ra, 20.0, epsilon = 1e-12);
    assert_abs_diff_eq!(los.dec, 45.0, epsilon = 1e-12);
    assert_eq!(los.halpha, model.halpha(&pos));
    assert_eq!(los.modulation, model.modulation(&pos, AGN_SIZE_DEG));
    assert_eq!(los.timescale, model.timescale(&pos, AGN_SIZE_DEG));
    assert_eq!(los.rms, model.rms_variability(&pos, AGN_SIZE_DEG, 0.5));
    assert_eq!(los.nu0, model.transition_frequency(&pos));
}
