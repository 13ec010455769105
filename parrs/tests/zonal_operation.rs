#![allow(missing_docs)]

use parrs::algorithm::{
    zonal_area, zonal_diversity, zonal_majority, zonal_maximum, zonal_mean, zonal_minimum, zonal_sum,
};
use parrs::array::{ArrayError, ClampMode, PartitionedArray};
use parrs::config::{Config, Context};
use parrs::runtime::{Placement, RuntimeOptions};

fn context(nr_localities: usize, placement: Placement) -> Context {
    Context::new_with_options(
        &RuntimeOptions::default()
            .with_nr_localities(nr_localities)
            .with_nr_threads_per_locality(2),
        Config::default().with_placement(placement),
    )
    .unwrap()
}

/// Zones of a 9x9 array: the zone of a cell is its row.
fn row_zones(ctx: &Context) -> PartitionedArray<u32, 2> {
    PartitionedArray::from_elements(ctx, [9, 9], (0..81).map(|idx| idx / 9).collect(), [3, 3]).unwrap()
}

#[test]
fn zonal_sum_of_rows() {
    let ctx = context(2, Placement::Blocked);
    let values = PartitionedArray::<u32, 2>::create_with_value(&ctx, [9, 9], [3, 3], 1).unwrap();
    let zones = row_zones(&ctx);
    let sums = zonal_sum(&ctx, &values, &zones).unwrap();
    assert!(sums.is_partitioned_like(&zones));
    assert_eq!(sums.localities().to_vec(), zones.localities().to_vec());
    assert_eq!(sums.gather().unwrap().to_vec(), vec![9; 81]);

    let areas = zonal_area(&ctx, &zones);
    assert_eq!(areas.gather().unwrap().to_vec(), vec![9; 81]);
}

#[test]
fn zonal_operations_are_independent_of_placement() {
    let mut results = Vec::new();
    for (nr_localities, placement) in [
        (1, Placement::Blocked),
        (3, Placement::Blocked),
        (3, Placement::RoundRobin),
        (4, Placement::HilbertCurve),
    ] {
        let ctx = context(nr_localities, placement);
        let values = PartitionedArray::from_elements(&ctx, [9, 9], (0..81u64).collect(), [3, 3]).unwrap();
        // Zones straddle partition borders
        let zones =
            PartitionedArray::from_elements(&ctx, [9, 9], (0..81u64).map(|idx| idx % 4).collect(), [3, 3]).unwrap();
        let sums = zonal_sum(&ctx, &values, &zones).unwrap().gather().unwrap().to_vec();
        let majority = zonal_majority(&ctx, &zones, &zones).unwrap().gather().unwrap().to_vec();
        results.push((sums, majority));
    }
    let zone_sum = |zone: u64| (0..81u64).filter(|idx| idx % 4 == zone).sum::<u64>();
    let expected_sums: Vec<u64> = (0..81u64).map(|idx| zone_sum(idx % 4)).collect();
    for (sums, majority) in &results {
        assert_eq!(sums, &expected_sums);
        assert_eq!(majority, &(0..81u64).map(|idx| idx % 4).collect::<Vec<_>>());
    }
}

#[test]
fn zonal_majority_tie_across_partitions() {
    let ctx = context(2, Placement::RoundRobin);
    let values = PartitionedArray::from_elements(&ctx, [6], vec![5u8, 5, 7, 7, 3, 3], [2]).unwrap();
    let zones = PartitionedArray::from_elements(&ctx, [6], vec![0u8, 0, 0, 0, 1, 1], [2]).unwrap();
    let majority = zonal_majority(&ctx, &values, &zones).unwrap();
    assert_eq!(majority.gather().unwrap().to_vec(), vec![7, 7, 7, 7, 3, 3]);
}

#[test]
fn zonal_statistics() {
    let ctx = context(2, Placement::Blocked);
    let values = PartitionedArray::from_elements(&ctx, [2, 4], vec![1i32, 2, 6, 3, 4, 5, 6, 6], [2, 3]).unwrap();
    let zones = PartitionedArray::from_elements(&ctx, [2, 4], vec![0u8, 0, 1, 1, 0, 0, 1, 1], [2, 3]).unwrap();

    let mean = zonal_mean(&ctx, &values, &zones).unwrap().gather().unwrap().to_vec();
    assert_eq!(mean, vec![3.0, 3.0, 5.25, 5.25, 3.0, 3.0, 5.25, 5.25]);
    let minimum = zonal_minimum(&ctx, &values, &zones).unwrap().gather().unwrap().to_vec();
    assert_eq!(minimum, vec![1, 1, 3, 3, 1, 1, 3, 3]);
    let maximum = zonal_maximum(&ctx, &values, &zones).unwrap().gather().unwrap().to_vec();
    assert_eq!(maximum, vec![5, 5, 6, 6, 5, 5, 6, 6]);
    let diversity = zonal_diversity(&ctx, &values, &zones).unwrap().gather().unwrap().to_vec();
    assert_eq!(diversity, vec![4, 4, 2, 2, 4, 4, 2, 2]);
    let area = zonal_area(&ctx, &zones).gather().unwrap().to_vec();
    assert_eq!(area, vec![4; 8]);
}

#[test]
fn zonal_extrema_skip_nan_across_partitions() {
    for placement in [Placement::Blocked, Placement::RoundRobin] {
        let ctx = context(2, placement);
        let values =
            PartitionedArray::from_elements(&ctx, [6], vec![f64::NAN, 3.0, 1.0, f64::NAN, f64::NAN, f64::NAN], [2])
                .unwrap();
        let zones = PartitionedArray::from_elements(&ctx, [6], vec![0u8, 0, 0, 0, 1, 1], [2]).unwrap();
        let minimum = zonal_minimum(&ctx, &values, &zones).unwrap().gather().unwrap().to_vec();
        assert_eq!(minimum[..4], [1.0; 4]);
        assert!(minimum[4..].iter().all(|v| v.is_nan()));
        let maximum = zonal_maximum(&ctx, &values, &zones).unwrap().gather().unwrap().to_vec();
        assert_eq!(maximum[..4], [3.0; 4]);
    }
}

#[test]
fn zonal_operation_on_merged_partitions() {
    let ctx = context(2, Placement::Blocked);
    let zones = PartitionedArray::<u8, 1>::create_with_value_and_clamp_mode(&ctx, [10], [4], 1, ClampMode::Merge)
        .unwrap();
    let values = PartitionedArray::<u8, 1>::create_with_value_and_clamp_mode(&ctx, [10], [4], 2, ClampMode::Merge)
        .unwrap();
    let sums = zonal_sum(&ctx, &values, &zones).unwrap();
    assert_eq!(sums.nr_partitions(), 2);
    assert_eq!(sums.gather().unwrap().to_vec(), vec![20; 10]);
}

#[test]
fn zonal_operation_incompatible_arrays() {
    let ctx = context(2, Placement::Blocked);
    let zones = row_zones(&ctx);
    let values = PartitionedArray::<u32, 2>::create(&ctx, [9, 9], [3, 4]).unwrap();
    assert!(matches!(
        zonal_sum(&ctx, &values, &zones),
        Err(ArrayError::IncompatiblePartitions)
    ));
    let values = PartitionedArray::<u32, 2>::create(&ctx, [9, 8], [3, 3]).unwrap();
    assert!(matches!(
        zonal_sum(&ctx, &values, &zones),
        Err(ArrayError::IncompatibleShape { .. })
    ));
}
