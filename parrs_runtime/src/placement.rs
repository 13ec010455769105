//! Placement of partitions on localities.
//!
//! A [`PlacementPolicy`] decides, for every partition of a partition grid, which locality it is computed and stored on.
//! Policies are pure: the same grid and number of localities always result in the same placement.

use thiserror::Error;

/// A placement policy produced an invalid placement.
#[derive(Clone, Debug, Error)]
pub enum PlacementError {
    /// The number of placements does not match the number of partitions.
    #[error("placement has {got} entries, expected one per partition ({expected})")]
    IncompatibleLength {
        /// The number of placements.
        got: usize,
        /// The number of partitions.
        expected: usize,
    },
    /// A placement refers to a locality the runtime does not have.
    #[error("placement refers to locality {locality}, but there are {nr_localities} localities")]
    UnknownLocality {
        /// The index of the locality.
        locality: usize,
        /// The number of localities.
        nr_localities: usize,
    },
}

/// A policy for placing partitions on localities.
pub trait PlacementPolicy: std::fmt::Debug + Send + Sync {
    /// Return the index of the locality of each partition of a grid with `shape_in_partitions`, in row-major order of the partitions.
    fn place(&self, shape_in_partitions: &[u64], nr_localities: usize) -> Vec<usize>;
}

fn nr_partitions(shape_in_partitions: &[u64]) -> usize {
    usize::try_from(shape_in_partitions.iter().product::<u64>()).unwrap_or(usize::MAX)
}

/// Map the `idx`th of `nr_partitions` partitions onto a contiguous run of `nr_localities`.
fn map_to_localities(idx: usize, nr_partitions: usize, nr_localities: usize) -> usize {
    let locality = idx as u128 * nr_localities as u128 / nr_partitions.max(1) as u128;
    usize::try_from(locality).unwrap_or(nr_localities.saturating_sub(1))
}

/// Place partition `i` (in row-major order) on locality `i % nr_localities`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoundRobin;

impl PlacementPolicy for RoundRobin {
    fn place(&self, shape_in_partitions: &[u64], nr_localities: usize) -> Vec<usize> {
        (0..nr_partitions(shape_in_partitions))
            .map(|idx| idx % nr_localities.max(1))
            .collect()
    }
}

/// Place contiguous runs of partitions (in row-major order) on the same locality.
///
/// The runs are of (nearly) equal length, and the localities are assigned in increasing order.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blocked;

impl PlacementPolicy for Blocked {
    fn place(&self, shape_in_partitions: &[u64], nr_localities: usize) -> Vec<usize> {
        let nr_partitions = nr_partitions(shape_in_partitions);
        (0..nr_partitions)
            .map(|idx| map_to_localities(idx, nr_partitions, nr_localities))
            .collect()
    }
}

/// Place contiguous runs of partitions along a generalised Hilbert curve on the same locality.
///
/// Nearby partitions of a rank 2 grid tend to end up on the same locality.
/// Grids of other ranks are placed like [`Blocked`].
#[derive(Clone, Copy, Debug, Default)]
pub struct HilbertCurve;

impl PlacementPolicy for HilbertCurve {
    fn place(&self, shape_in_partitions: &[u64], nr_localities: usize) -> Vec<usize> {
        let &[nr_rows, nr_cols] = shape_in_partitions else {
            return Blocked.place(shape_in_partitions, nr_localities);
        };
        let nr_partitions = nr_partitions(shape_in_partitions);
        let mut placement = vec![0; nr_partitions];
        for (idx, (row, col)) in hilbert_order(nr_rows, nr_cols).into_iter().enumerate() {
            let linear = usize::try_from(row * nr_cols + col).unwrap_or(usize::MAX);
            placement[linear] = map_to_localities(idx, nr_partitions, nr_localities);
        }
        placement
    }
}

/// Return the (row, column) cells of a `nr_rows` by `nr_cols` grid in the order of a generalised Hilbert curve.
///
/// Based on the "gilbert" algorithm by Jakub Červený, which handles grids of arbitrary extents.
fn hilbert_order(nr_rows: u64, nr_cols: u64) -> Vec<(u64, u64)> {
    let mut order = Vec::new();
    if nr_rows == 0 || nr_cols == 0 {
        return order;
    }
    let (rows, cols) = (to_i64(nr_rows), to_i64(nr_cols));
    if cols >= rows {
        gilbert(&mut order, (0, 0), (cols, 0), (0, rows));
    } else {
        gilbert(&mut order, (0, 0), (0, rows), (cols, 0));
    }
    order
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn gilbert(order: &mut Vec<(u64, u64)>, (x, y): (i64, i64), (ax, ay): (i64, i64), (bx, by): (i64, i64)) {
    let w = (ax + ay).abs();
    let h = (bx + by).abs();

    // unit major and orthogonal directions
    let (dax, day) = (ax.signum(), ay.signum());
    let (dbx, dby) = (bx.signum(), by.signum());

    let mut push = |x: i64, y: i64| order.push((y.unsigned_abs(), x.unsigned_abs()));

    if h == 1 {
        // row fill
        for i in 0..w {
            push(x + i * dax, y + i * day);
        }
        return;
    }
    if w == 1 {
        // column fill
        for i in 0..h {
            push(x + i * dbx, y + i * dby);
        }
        return;
    }

    let (mut ax2, mut ay2) = (ax / 2, ay / 2);
    let (mut bx2, mut by2) = (bx / 2, by / 2);
    let w2 = (ax2 + ay2).abs();
    let h2 = (bx2 + by2).abs();

    if 2 * w > 3 * h {
        if w2 % 2 == 1 && w > 2 {
            // prefer even steps
            ax2 += dax;
            ay2 += day;
        }
        // long case: split in two parts only
        gilbert(order, (x, y), (ax2, ay2), (bx, by));
        gilbert(order, (x + ax2, y + ay2), (ax - ax2, ay - ay2), (bx, by));
    } else {
        if h2 % 2 == 1 && h > 2 {
            // prefer even steps
            bx2 += dbx;
            by2 += dby;
        }
        // standard case: one step up, one long horizontal, one step down
        gilbert(order, (x, y), (bx2, by2), (ax2, ay2));
        gilbert(order, (x + bx2, y + by2), (ax, ay), (bx - bx2, by - by2));
        gilbert(
            order,
            (x + (ax - dax) + (bx2 - dbx), y + (ay - day) + (by2 - dby)),
            (-bx2, -by2),
            (-(ax - ax2), -(ay - ay2)),
        );
    }
}

/// The built-in placement policies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Placement {
    /// See [`RoundRobin`].
    RoundRobin,
    /// See [`Blocked`].
    #[default]
    Blocked,
    /// See [`HilbertCurve`].
    HilbertCurve,
}

impl PlacementPolicy for Placement {
    fn place(&self, shape_in_partitions: &[u64], nr_localities: usize) -> Vec<usize> {
        match self {
            Self::RoundRobin => RoundRobin.place(shape_in_partitions, nr_localities),
            Self::Blocked => Blocked.place(shape_in_partitions, nr_localities),
            Self::HilbertCurve => HilbertCurve.place(shape_in_partitions, nr_localities),
        }
    }
}
