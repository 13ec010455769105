#![allow(missing_docs)]

use parrs::array::{ArrayPartitionData, ClampMode, PartitionedArray};
use parrs::config::{Config, Context};
use parrs::runtime::{LocalityId, Placement, RuntimeOptions};
use parrs::shape::{Hyperslab, PartitionGrid};

fn context(nr_localities: usize) -> Context {
    Context::new_with_options(
        &RuntimeOptions::default()
            .with_nr_localities(nr_localities)
            .with_nr_threads_per_locality(2),
        Config::default().with_validate(true),
    )
    .unwrap()
}

#[test]
fn partitioned_array_partitions_tile_the_array() {
    let ctx = context(3);
    for clamp_mode in [ClampMode::Shrink, ClampMode::Merge] {
        let array = PartitionedArray::<u8, 2>::create_with_clamp_mode(&ctx, [10, 7], [4, 3], clamp_mode).unwrap();
        array.validate().unwrap();
        let partitions = array.partitions().to_vec();
        assert_eq!(partitions.iter().map(|p| p.nr_elements()).sum::<u64>(), 70);
        for indices in &Hyperslab::new_with_shape([10, 7]).indices() {
            let containing = partitions
                .iter()
                .filter(|partition| partition.hyperslab().contains(&indices))
                .count();
            assert_eq!(containing, 1, "{indices:?} is in {containing} partitions ({clamp_mode})");
        }
    }
}

#[test]
fn partitioned_array_shrink() {
    let ctx = context(2);
    let array = PartitionedArray::<u8, 2>::create_with_clamp_mode(&ctx, [10, 7], [4, 3], ClampMode::Shrink).unwrap();
    assert_eq!(array.shape_in_partitions(), &[3, 3]);
    assert_eq!(array.partition(&[0, 0]).shape(), &[4, 3]);
    assert_eq!(array.partition(&[2, 0]).shape(), &[2, 3]);
    assert_eq!(array.partition(&[2, 2]).shape(), &[2, 1]);
    assert_eq!(array.partition(&[2, 2]).offset(), &[8, 6]);
    assert_eq!(array.partition(&[2, 2]).wait().unwrap().shape(), &[2, 1]);

    // Partitions of the same grid map array indices the same way
    let grid = PartitionGrid::new([10, 7], [4, 3]).unwrap();
    let (partition_indices, within) = grid.partition_of(&[9, 6]).unwrap();
    assert_eq!(partition_indices, [2, 2]);
    assert_eq!(within, [1, 0]);
    assert!(array.partition(&partition_indices).hyperslab().contains(&[9, 6]));
}

#[test]
fn partitioned_array_merge() {
    let ctx = context(2);
    let array =
        PartitionedArray::<u8, 2>::create_with_value_and_clamp_mode(&ctx, [10, 7], [4, 3], 7, ClampMode::Merge)
            .unwrap();
    assert_eq!(array.shape_in_partitions(), &[2, 2]);
    assert_eq!(array.partition(&[0, 0]).shape(), &[4, 3]);
    assert_eq!(array.partition(&[1, 0]).shape(), &[6, 3]);
    assert_eq!(array.partition(&[0, 1]).shape(), &[4, 4]);
    assert_eq!(array.partition(&[1, 1]).shape(), &[6, 4]);
    assert_eq!(array.localities().shape(), &[2, 2]);
    let data = array.gather().unwrap();
    assert!(data.to_vec().iter().all(|&element| element == 7));
}

#[test]
fn partitioned_array_merge_needs_two_partitions() {
    let ctx = context(1);
    // A single partition along a dimension cannot be merged: it is shrunk
    let array = PartitionedArray::<u8, 1>::create_with_clamp_mode(&ctx, [3], [5], ClampMode::Merge).unwrap();
    assert_eq!(array.shape_in_partitions(), &[1]);
    assert_eq!(array.partition(&[0]).shape(), &[3]);
    array.validate().unwrap();
}

#[test]
fn partitioned_array_default_clamp_mode() {
    let ctx = context(1);
    let array = PartitionedArray::<u8, 1>::create(&ctx, [10], [4]).unwrap();
    let shapes: Vec<_> = array.partitions().to_vec().iter().map(|p| p.shape()[0]).collect();
    assert_eq!(shapes, vec![4, 4, 2]);

    let mut ctx = ctx;
    ctx.config_mut().set_clamp_mode(ClampMode::Merge);
    let array = PartitionedArray::<u8, 1>::create(&ctx, [10], [4]).unwrap();
    let shapes: Vec<_> = array.partitions().to_vec().iter().map(|p| p.shape()[0]).collect();
    assert_eq!(shapes, vec![4, 6]);
}

#[test]
fn partitioned_array_from_elements_gather() {
    let ctx = context(3);
    let elements: Vec<u32> = (0..70).collect();
    let array = PartitionedArray::from_elements(&ctx, [10, 7], elements.clone(), [4, 3]).unwrap();
    assert_eq!(array.nr_partitions(), 9);
    assert_eq!(array.partition(&[2, 2]).wait().unwrap().to_vec(), vec![62, 69]);
    assert_eq!(array.partition(&[0, 1]).wait().unwrap().to_vec(), vec![3, 4, 5, 10, 11, 12, 17, 18, 19, 24, 25, 26]);
    assert_eq!(array.gather().unwrap().to_vec(), elements);

    assert!(PartitionedArray::from_elements(&ctx, [10, 7], vec![0u32; 69], [4, 3]).is_err());
    assert!(PartitionedArray::from_elements(&ctx, [10, 7], elements, [0, 3]).is_err());
}

#[test]
fn partitioned_array_from_data_does_not_alias() {
    let ctx = context(2);
    let mut data = ArrayPartitionData::from_vec([4], vec![1u8, 2, 3, 4]);
    let array = PartitionedArray::from_data(&ctx, &data, [2]).unwrap();
    data.fill(0);
    assert_eq!(array.gather().unwrap().to_vec(), vec![1, 2, 3, 4]);
}

#[test]
fn partitioned_array_copy_does_not_share_data() {
    let ctx = context(2);
    let array = PartitionedArray::<u16, 1>::create_with_value(&ctx, [6], [3], 2).unwrap();
    let copy = parrs::algorithm::copy(&ctx, &array);
    assert!(copy.is_partitioned_like(&array));
    assert_eq!(copy.localities().to_vec(), array.localities().to_vec());
    for (a, b) in array.partitions().to_vec().iter().zip(copy.partitions().to_vec().iter()) {
        let (a, b) = (a.wait().unwrap(), b.wait().unwrap());
        assert_eq!(*a, *b);
        assert!(!a.is_shared_with(&b));
    }
}

#[test]
fn partitioned_array_local_operations() {
    let ctx = context(2);
    let a = PartitionedArray::from_elements(&ctx, [3, 3], (0..9).collect::<Vec<i32>>(), [2, 2]).unwrap();
    let b = parrs::algorithm::fill(&ctx, [3, 3], [2, 2], 10i32).unwrap();
    let squared = parrs::algorithm::unary_local_operation(&ctx, &a, |x| x * x);
    let sum = parrs::algorithm::binary_local_operation(&ctx, &squared, &b, |x, y| x + y).unwrap();
    assert_eq!(sum.gather().unwrap().to_vec(), vec![10, 11, 14, 19, 26, 35, 46, 59, 74]);

    let c = parrs::algorithm::fill(&ctx, [3, 3], [3, 3], 10i32).unwrap();
    assert!(parrs::algorithm::binary_local_operation(&ctx, &a, &c, |x, y| x + y).is_err());
}

#[test]
fn partitioned_array_placement() {
    let ctx = Context::new_with_options(
        &RuntimeOptions::default().with_nr_localities(2),
        Config::default().with_placement(Placement::RoundRobin),
    )
    .unwrap();
    let array = PartitionedArray::<u8, 1>::create(&ctx, [8], [2]).unwrap();
    let localities: Vec<_> = array.localities().to_vec().into_iter().map(LocalityId::index).collect();
    assert_eq!(localities, vec![0, 1, 0, 1]);
    for partition in array.partitions().to_vec() {
        assert_eq!(partition.locality(), array.localities().get(partition.offset()[0] / 2));
    }

    let ctx = Context::new_with_options(
        &RuntimeOptions::default().with_nr_localities(2),
        Config::default().with_placement(Placement::Blocked),
    )
    .unwrap();
    let array = PartitionedArray::<u8, 1>::create(&ctx, [8], [2]).unwrap();
    let localities: Vec<_> = array.localities().to_vec().into_iter().map(LocalityId::index).collect();
    assert_eq!(localities, vec![0, 0, 1, 1]);
}

#[test]
fn partitioned_array_default_partitioning() {
    let ctx = context(4);
    let array = PartitionedArray::<u8, 2>::new(&ctx, [100, 100]).unwrap();
    assert!(array.nr_partitions() >= 4);
    array.validate().unwrap();
}

#[test]
fn partitioned_array_fewer_partitions_than_localities() {
    testing_logger::setup();
    let ctx = context(4);
    let array = PartitionedArray::<u8, 1>::create(&ctx, [2], [2]).unwrap();
    assert_eq!(array.nr_partitions(), 1);
    testing_logger::validate(|captured_logs| {
        let warnings: Vec<_> = captured_logs
            .iter()
            .filter(|log| log.level == log::Level::Warn)
            .collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].body.contains("fewer than the 4 localities"));
    });
}

#[test]
fn partitioned_array_empty() {
    let ctx = context(2);
    let array = PartitionedArray::<u8, 2>::create(&ctx, [0, 5], [2, 2]).unwrap();
    assert_eq!(array.nr_elements(), 0);
    array.validate().unwrap();
    assert!(array.gather().unwrap().is_empty());
}
