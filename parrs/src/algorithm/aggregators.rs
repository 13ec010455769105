//! Reference [`Aggregator`]s.
//!
//! All aggregators keep their state per zone in a hash map, and merge by combining the states of equal zones.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::ops::AddAssign;

use num::ToPrimitive;

use super::Aggregator;
use crate::array::Element;

/// The sum of the values per zone.
///
/// Integer sums do not depend on the order partitions are merged in. Float sums only do while every partial sum is
/// exactly representable, for example integral sums below 2^53; otherwise the last bits may differ between runs.
#[derive(Debug, Clone, Default)]
pub struct Sum<Z, V> {
    sums: HashMap<Z, V>,
}

impl<Z, V> Aggregator for Sum<Z, V>
where
    Z: Element + Eq + Hash,
    V: Element + AddAssign,
{
    type Zone = Z;
    type Value = V;
    type Output = V;

    fn add(&mut self, zone: Z, value: V) {
        *self.sums.entry(zone).or_default() += value;
    }

    fn merge(&mut self, other: &Self) {
        for (zone, sum) in &other.sums {
            *self.sums.entry(zone.clone()).or_default() += sum.clone();
        }
    }

    fn statistic(&self, zone: &Z) -> Option<V> {
        self.sums.get(zone).cloned()
    }
}

/// The minimum of the values per zone.
///
/// Values that are not comparable with themselves, like NaN, never replace a comparable minimum and are replaced by
/// any comparable value, whichever order values are added and states merged in.
/// The minimum of a zone holding only NaN is NaN.
#[derive(Debug, Clone, Default)]
pub struct Minimum<Z, V> {
    minima: HashMap<Z, V>,
}

impl<Z, V> Aggregator for Minimum<Z, V>
where
    Z: Element + Eq + Hash,
    V: Element + PartialOrd,
{
    type Zone = Z;
    type Value = V;
    type Output = V;

    fn add(&mut self, zone: Z, value: V) {
        self.minima
            .entry(zone)
            .and_modify(|minimum| keep_extreme(minimum, &value, Ordering::Less))
            .or_insert(value);
    }

    fn merge(&mut self, other: &Self) {
        for (zone, minimum) in &other.minima {
            self.add(zone.clone(), minimum.clone());
        }
    }

    fn statistic(&self, zone: &Z) -> Option<V> {
        self.minima.get(zone).cloned()
    }
}

/// The maximum of the values per zone.
///
/// NaN is handled like in [`Minimum`].
#[derive(Debug, Clone, Default)]
pub struct Maximum<Z, V> {
    maxima: HashMap<Z, V>,
}

impl<Z, V> Aggregator for Maximum<Z, V>
where
    Z: Element + Eq + Hash,
    V: Element + PartialOrd,
{
    type Zone = Z;
    type Value = V;
    type Output = V;

    fn add(&mut self, zone: Z, value: V) {
        self.maxima
            .entry(zone)
            .and_modify(|maximum| keep_extreme(maximum, &value, Ordering::Greater))
            .or_insert(value);
    }

    fn merge(&mut self, other: &Self) {
        for (zone, maximum) in &other.maxima {
            self.add(zone.clone(), maximum.clone());
        }
    }

    fn statistic(&self, zone: &Z) -> Option<V> {
        self.maxima.get(zone).cloned()
    }
}

/// Replace `current` by `value` if `value` is ordered `preferred` relative to it.
///
/// A value not comparable with itself never replaces a comparable one, and is always replaced by one.
fn keep_extreme<V: PartialOrd + Clone>(current: &mut V, value: &V, preferred: Ordering) {
    if value.partial_cmp(value).is_none() {
        return;
    }
    if (*current).partial_cmp(&*current).is_none() || value.partial_cmp(current) == Some(preferred) {
        *current = value.clone();
    }
}

/// The mean of the values per zone, as `f64`.
///
/// Values that cannot be represented as `f64` make the mean of their zone NaN.
/// Sums are accumulated as `f64`, so the mean is only independent of the merge order while every partial sum is
/// exactly representable, like for integer values summing to less than 2^53.
#[derive(Debug, Clone)]
pub struct Mean<Z, V> {
    sums_counts: HashMap<Z, (f64, u64)>,
    _value: std::marker::PhantomData<fn(V)>,
}

impl<Z, V> Default for Mean<Z, V> {
    fn default() -> Self {
        Self {
            sums_counts: HashMap::new(),
            _value: std::marker::PhantomData,
        }
    }
}

impl<Z, V> Aggregator for Mean<Z, V>
where
    Z: Element + Eq + Hash,
    V: Element + ToPrimitive,
{
    type Zone = Z;
    type Value = V;
    type Output = f64;

    fn add(&mut self, zone: Z, value: V) {
        let (sum, count) = self.sums_counts.entry(zone).or_default();
        *sum += value.to_f64().unwrap_or(f64::NAN);
        *count += 1;
    }

    fn merge(&mut self, other: &Self) {
        for (zone, (other_sum, other_count)) in &other.sums_counts {
            let (sum, count) = self.sums_counts.entry(zone.clone()).or_default();
            *sum += other_sum;
            *count += other_count;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn statistic(&self, zone: &Z) -> Option<f64> {
        self.sums_counts.get(zone).map(|(sum, count)| sum / *count as f64)
    }
}

/// The most frequent value per zone.
///
/// Ties are broken in favour of the larger value.
#[derive(Debug, Clone, Default)]
pub struct Majority<Z, V> {
    frequencies: HashMap<Z, HashMap<V, u64>>,
}

impl<Z, V> Aggregator for Majority<Z, V>
where
    Z: Element + Eq + Hash,
    V: Element + Eq + Hash + Ord,
{
    type Zone = Z;
    type Value = V;
    type Output = V;

    fn add(&mut self, zone: Z, value: V) {
        *self
            .frequencies
            .entry(zone)
            .or_default()
            .entry(value)
            .or_default() += 1;
    }

    fn merge(&mut self, other: &Self) {
        for (zone, other_frequencies) in &other.frequencies {
            let frequencies = self.frequencies.entry(zone.clone()).or_default();
            for (value, frequency) in other_frequencies {
                *frequencies.entry(value.clone()).or_default() += frequency;
            }
        }
    }

    fn statistic(&self, zone: &Z) -> Option<V> {
        self.frequencies.get(zone)?.iter().max_by(|(value_a, frequency_a), (value_b, frequency_b)| {
            frequency_a.cmp(frequency_b).then_with(|| value_a.cmp(value_b))
        })
        .map(|(value, _)| value.clone())
    }
}

/// The number of distinct values per zone.
#[derive(Debug, Clone, Default)]
pub struct Diversity<Z, V> {
    values: HashMap<Z, HashSet<V>>,
}

impl<Z, V> Aggregator for Diversity<Z, V>
where
    Z: Element + Eq + Hash,
    V: Element + Eq + Hash,
{
    type Zone = Z;
    type Value = V;
    type Output = u64;

    fn add(&mut self, zone: Z, value: V) {
        self.values.entry(zone).or_default().insert(value);
    }

    fn merge(&mut self, other: &Self) {
        for (zone, other_values) in &other.values {
            self.values
                .entry(zone.clone())
                .or_default()
                .extend(other_values.iter().cloned());
        }
    }

    fn statistic(&self, zone: &Z) -> Option<u64> {
        self.values.get(zone).map(|values| values.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    /// Aggregate `pairs` in chunks of `chunk_size`, merging the chunk aggregators in every possible order.
    fn merged_in_all_orders<A: Aggregator>(
        pairs: &[(A::Zone, A::Value)],
        chunk_size: usize,
        zones: &[A::Zone],
    ) -> Vec<Vec<Option<A::Output>>> {
        let chunks = pairs
            .chunks(chunk_size)
            .map(|chunk| {
                let mut aggregator = A::default();
                for (zone, value) in chunk {
                    aggregator.add(zone.clone(), value.clone());
                }
                aggregator
            })
            .collect_vec();
        (0..chunks.len())
            .permutations(chunks.len())
            .map(|order| {
                let mut merged = A::default();
                for idx in order {
                    merged.merge(&chunks[idx]);
                }
                zones.iter().map(|zone| merged.statistic(zone)).collect_vec()
            })
            .collect()
    }

    fn assert_order_independent<A: Aggregator>(pairs: &[(A::Zone, A::Value)], zones: &[A::Zone])
    where
        A::Output: PartialEq,
    {
        let results = merged_in_all_orders::<A>(pairs, 2, zones);
        assert!(results.len() > 1);
        assert!(results.iter().all_equal(), "{results:?}");
    }

    const PAIRS: [(u8, i32); 8] = [(0, 5), (1, 3), (0, 7), (0, 5), (1, -2), (0, 7), (2, 4), (1, 3)];

    #[test]
    fn sum() {
        let results = merged_in_all_orders::<Sum<u8, i32>>(&PAIRS, 3, &[0, 1, 2, 3]);
        assert_eq!(results[0], vec![Some(24), Some(4), Some(4), None]);
        assert_order_independent::<Sum<u8, i32>>(&PAIRS, &[0, 1, 2]);
    }

    #[test]
    fn minimum_maximum() {
        let minima = merged_in_all_orders::<Minimum<u8, i32>>(&PAIRS, 3, &[0, 1, 2]);
        assert_eq!(minima[0], vec![Some(5), Some(-2), Some(4)]);
        let maxima = merged_in_all_orders::<Maximum<u8, i32>>(&PAIRS, 3, &[0, 1, 2]);
        assert_eq!(maxima[0], vec![Some(7), Some(3), Some(4)]);
        assert_order_independent::<Minimum<u8, i32>>(&PAIRS, &[0, 1, 2]);
        assert_order_independent::<Maximum<u8, i32>>(&PAIRS, &[0, 1, 2]);
    }

    const PAIRS_NAN: [(u8, f64); 8] = [
        (0, f64::NAN),
        (0, 3.0),
        (1, 2.0),
        (1, f64::NAN),
        (0, 1.5),
        (2, f64::NAN),
        (1, -4.0),
        (0, f64::NAN),
    ];

    #[test]
    fn minimum_maximum_nan() {
        let minima = merged_in_all_orders::<Minimum<u8, f64>>(&PAIRS_NAN, 2, &[0, 1, 2]);
        assert_eq!(minima[0][..2], [Some(1.5), Some(-4.0)]);
        assert!(minima.iter().all(|result| result[2].is_some_and(f64::is_nan)));
        let maxima = merged_in_all_orders::<Maximum<u8, f64>>(&PAIRS_NAN, 2, &[0, 1, 2]);
        assert_eq!(maxima[0][..2], [Some(3.0), Some(2.0)]);
        assert!(maxima.iter().all(|result| result[2].is_some_and(f64::is_nan)));
        assert_order_independent::<Minimum<u8, f64>>(&PAIRS_NAN, &[0, 1]);
        assert_order_independent::<Maximum<u8, f64>>(&PAIRS_NAN, &[0, 1]);

        // A NaN state merged with a comparable one, in both orders
        let mut nan = Minimum::<u8, f64>::default();
        nan.add(0, f64::NAN);
        let mut three = Minimum::<u8, f64>::default();
        three.add(0, 3.0);
        let mut merged = nan.clone();
        merged.merge(&three);
        assert_eq!(merged.statistic(&0), Some(3.0));
        let mut merged = three.clone();
        merged.merge(&nan);
        assert_eq!(merged.statistic(&0), Some(3.0));
    }

    #[test]
    fn mean() {
        let means = merged_in_all_orders::<Mean<u8, i32>>(&PAIRS, 3, &[0, 1, 2]);
        assert_eq!(means[0], vec![Some(6.0), Some(4.0 / 3.0), Some(4.0)]);
        assert_order_independent::<Mean<u8, i32>>(&PAIRS, &[0, 1, 2]);
    }

    #[test]
    fn majority() {
        // {5, 5, 7, 7} is a tie: the larger value wins
        let majority = merged_in_all_orders::<Majority<u8, i32>>(&PAIRS, 3, &[0, 1, 2]);
        assert_eq!(majority[0], vec![Some(7), Some(3), Some(4)]);
        assert_order_independent::<Majority<u8, i32>>(&PAIRS, &[0, 1, 2]);

        let mut aggregator = Majority::<u8, i32>::default();
        for value in [5, 5, 5, 7] {
            aggregator.add(0, value);
        }
        assert_eq!(aggregator.statistic(&0), Some(5));
    }

    #[test]
    fn diversity() {
        let diversity = merged_in_all_orders::<Diversity<u8, i32>>(&PAIRS, 3, &[0, 1, 2]);
        assert_eq!(diversity[0], vec![Some(2), Some(2), Some(1)]);
        assert_order_independent::<Diversity<u8, i32>>(&PAIRS, &[0, 1, 2]);
    }
}
