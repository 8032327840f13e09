mod common;

use adas_parser::{
    formats::{qcx::{N_RESOLVED, TOTAL}, OutputMode},
    rate::{maxwell_rate, rate_coefficient},
};
use approx::assert_relative_eq;
use common::load_fixture;
use ndarray::Axis;

#[test]
fn test_rate_from_partial_cross_sections() {
    let qcx = load_fixture("qcx#h0_en2_kvi#c6", OutputMode::Labeled)
        .into_dataset()
        .unwrap();
    let energy = qcx.coord("energy").unwrap().to_f64_vec().unwrap();
    let temperatures = vec![1e3, 1e4];

    let by_n = rate_coefficient(&energy, qcx.get(N_RESOLVED).unwrap(), temperatures.clone(), 1.0)
        .unwrap();
    assert_eq!(by_n.dims(), ["temperature".to_string(), "n".to_string()]);
    assert_eq!(by_n.shape(), &[2, 4]);
    assert!(by_n.data().iter().all(|r| r.is_finite() && *r > 0.0));

    // the integral is linear: the total rate is the sum of the n-resolved rates
    let total = rate_coefficient(&energy, qcx.get(TOTAL).unwrap(), temperatures, 1.0).unwrap();
    let summed = by_n.data().sum_axis(Axis(1));
    for (a, b) in total.data().iter().zip(summed.iter()) {
        assert_relative_eq!(*a, *b, max_relative = 1e-12);
    }
}

#[test]
fn test_rate_is_repeatable() {
    let qcx = load_fixture("qcx#h0_en2_kvi#c6", OutputMode::Labeled)
        .into_dataset()
        .unwrap();
    let energy = qcx.coord("energy").unwrap().to_f64_vec().unwrap();
    let total = qcx.get(TOTAL).unwrap();

    let first = rate_coefficient(&energy, total, 5e3, 2.0).unwrap();
    let second = rate_coefficient(&energy, total, 5e3, 2.0).unwrap();
    assert_eq!(first, second);

    let cross_section: Vec<f64> = total.data().iter().copied().collect();
    assert_relative_eq!(
        first.data().iter().copied().next().unwrap(),
        maxwell_rate(&energy, &cross_section, 5e3, 2.0).unwrap(),
        max_relative = 1e-12
    );
}
