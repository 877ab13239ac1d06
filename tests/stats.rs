use radprof::math::stats::{cumulative_threshold_index, mean, std_dev};

#[test]
fn mean_basic() {
    assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    assert_eq!(mean(&[]), 0.0);
}

#[test]
fn std_dev_population() {
    let values = [8.0, 12.0];
    let m = mean(&values);
    assert!((std_dev(&values, m) - 2.0).abs() < 1e-12);
}

#[test]
fn cumulative_index_first_reaching_target() {
    let values = [1.0, 1.0, 1.0, 1.0];
    assert_eq!(cumulative_threshold_index(&values, 2.0), Some(1));
    assert_eq!(cumulative_threshold_index(&values, 2.5), Some(2));
    assert_eq!(cumulative_threshold_index(&values, 0.0), Some(0));
}

#[test]
fn cumulative_index_saturates_at_last_element() {
    let values = [1.0, 1.0];
    assert_eq!(cumulative_threshold_index(&values, 10.0), Some(1));
    assert_eq!(cumulative_threshold_index(&[], 1.0), None);
}
