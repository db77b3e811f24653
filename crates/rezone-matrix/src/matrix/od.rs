//! Sparse origin-destination matrix.

use std::collections::{BTreeMap, BTreeSet};

use rezone_core::errors::MatrixError;
use rezone_core::types::collections::{fx_map_with_capacity, FxHashMap};
use rezone_core::Zone;

/// Sparse OD matrix keyed by `(origin, destination)`.
///
/// Only positive trip values are stored; a zero cell is simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ODMatrix<Z: Zone> {
    cells: FxHashMap<(Z, Z), f64>,
}

impl<Z: Zone> Default for ODMatrix<Z> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Z: Zone> ODMatrix<Z> {
    pub fn new() -> Self {
        Self {
            cells: FxHashMap::default(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: fx_map_with_capacity(capacity),
        }
    }

    /// Build from `(origin, destination, trips)` rows. Repeated cells are summed.
    pub fn from_cells<I>(cells: I) -> Result<Self, MatrixError>
    where
        I: IntoIterator<Item = (Z, Z, f64)>,
    {
        let iter = cells.into_iter();
        let mut matrix = Self::with_capacity(iter.size_hint().0);
        for (origin, destination, trips) in iter {
            matrix.insert(origin, destination, trips)?;
        }
        Ok(matrix)
    }

    /// Add `trips` to a cell. Zero is accepted and ignored.
    pub fn insert(&mut self, origin: Z, destination: Z, trips: f64) -> Result<(), MatrixError> {
        if !trips.is_finite() || trips < 0.0 {
            return Err(MatrixError::InvalidTrips {
                origin: origin.to_string(),
                destination: destination.to_string(),
                value: trips,
            });
        }
        if trips > 0.0 {
            *self.cells.entry((origin, destination)).or_insert(0.0) += trips;
        }
        Ok(())
    }

    /// Wrap an accumulator built by the engine. Non-positive cells are dropped.
    pub(crate) fn from_accumulator(mut cells: FxHashMap<(Z, Z), f64>) -> Self {
        cells.retain(|_, v| *v > 0.0);
        Self { cells }
    }

    pub fn get(&self, origin: &Z, destination: &Z) -> f64 {
        // Tuple keys need owned zones for lookup.
        self.cells
            .get(&(origin.clone(), destination.clone()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Number of stored (non-zero) cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.cells.values().sum()
    }

    /// Iterate stored cells in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&Z, &Z, f64)> {
        self.cells.iter().map(|((o, d), v)| (o, d, *v))
    }

    /// Stored cells sorted by origin, then destination.
    pub fn sorted_cells(&self) -> Vec<(&Z, &Z, f64)> {
        let mut cells: Vec<_> = self.iter().collect();
        cells.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        cells
    }

    /// Every zone appearing as an origin or destination.
    pub fn zones(&self) -> BTreeSet<&Z> {
        self.cells.keys().flat_map(|(o, d)| [o, d]).collect()
    }

    pub fn origins(&self) -> BTreeSet<&Z> {
        self.cells.keys().map(|(o, _)| o).collect()
    }

    pub fn destinations(&self) -> BTreeSet<&Z> {
        self.cells.keys().map(|(_, d)| d).collect()
    }

    /// Trips produced by each origin (row sums).
    pub fn origin_totals(&self) -> BTreeMap<&Z, f64> {
        let mut totals = BTreeMap::new();
        for ((o, _), v) in &self.cells {
            *totals.entry(o).or_insert(0.0) += v;
        }
        totals
    }

    /// Trips attracted by each destination (column sums).
    pub fn destination_totals(&self) -> BTreeMap<&Z, f64> {
        let mut totals = BTreeMap::new();
        for ((_, d), v) in &self.cells {
            *totals.entry(d).or_insert(0.0) += v;
        }
        totals
    }

    pub(crate) fn cells(&self) -> &FxHashMap<(Z, Z), f64> {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut FxHashMap<(Z, Z), f64> {
        &mut self.cells
    }
}

impl<Z: Zone> FromIterator<(Z, Z, f64)> for ODMatrix<Z> {
    /// Collect rows, skipping any cell that is not a finite positive value.
    fn from_iter<I: IntoIterator<Item = (Z, Z, f64)>>(iter: I) -> Self {
        let mut matrix = Self::new();
        for (o, d, v) in iter {
            if v.is_finite() && v > 0.0 {
                *matrix.cells.entry((o, d)).or_insert(0.0) += v;
            }
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ODMatrix<u32> {
        ODMatrix::from_cells(vec![(1, 2, 10.0), (2, 1, 5.0), (1, 1, 2.5), (3, 2, 0.0)]).unwrap()
    }

    #[test]
    fn test_zero_cells_are_absent() {
        let m = sample();
        assert_eq!(m.len(), 3);
        assert_eq!(m.get(&3, &2), 0.0);
        assert!(!m.zones().contains(&&3));
    }

    #[test]
    fn test_repeated_cells_accumulate() {
        let m = ODMatrix::from_cells(vec![(1, 2, 10.0), (1, 2, 4.0)]).unwrap();
        assert_eq!(m.len(), 1);
        assert_eq!(m.get(&1, &2), 14.0);
    }

    #[test]
    fn test_negative_and_nan_rejected() {
        assert!(matches!(
            ODMatrix::from_cells(vec![(1u32, 2u32, -1.0)]),
            Err(MatrixError::InvalidTrips { value, .. }) if value == -1.0
        ));
        assert!(ODMatrix::from_cells(vec![(1u32, 2u32, f64::NAN)]).is_err());
        assert!(ODMatrix::from_cells(vec![(1u32, 2u32, f64::INFINITY)]).is_err());
    }

    #[test]
    fn test_totals() {
        let m = sample();
        assert_eq!(m.total(), 17.5);
        assert_eq!(m.origin_totals()[&1], 12.5);
        assert_eq!(m.destination_totals()[&1], 7.5);
        assert_eq!(m.origins().into_iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(m.destinations().into_iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_sorted_cells() {
        let m = sample();
        let cells: Vec<_> = m.sorted_cells().into_iter().map(|(o, d, v)| (*o, *d, v)).collect();
        assert_eq!(cells, vec![(1, 1, 2.5), (1, 2, 10.0), (2, 1, 5.0)]);
    }

    #[test]
    fn test_collect_skips_invalid() {
        let m: ODMatrix<u32> = vec![(1, 1, 1.0), (1, 2, -3.0), (2, 2, f64::NAN)].into_iter().collect();
        assert_eq!(m.len(), 1);
    }
}
