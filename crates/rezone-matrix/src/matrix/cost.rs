//! Per-cell cost matrices (time, distance, generalised cost).
//!
//! Unlike trips, a zero cost is meaningful, so cells are stored whenever they
//! are supplied and an absent cell means "no cost known".

use std::collections::BTreeSet;

use rezone_core::errors::MatrixError;
use rezone_core::types::collections::{fx_map_with_capacity, FxHashMap};
use rezone_core::Zone;

#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix<Z: Zone> {
    cells: FxHashMap<(Z, Z), f64>,
}

impl<Z: Zone> Default for CostMatrix<Z> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Z: Zone> CostMatrix<Z> {
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

    /// Build from `(origin, destination, cost)` rows. A repeated cell keeps the last value.
    pub fn from_cells<I>(cells: I) -> Result<Self, MatrixError>
    where
        I: IntoIterator<Item = (Z, Z, f64)>,
    {
        let iter = cells.into_iter();
        let mut matrix = Self::with_capacity(iter.size_hint().0);
        for (origin, destination, cost) in iter {
            matrix.set(origin, destination, cost)?;
        }
        Ok(matrix)
    }

    /// Set a cell's cost. Zero is stored; negative or non-finite costs are rejected.
    pub fn set(&mut self, origin: Z, destination: Z, cost: f64) -> Result<(), MatrixError> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(MatrixError::InvalidCost {
                origin: origin.to_string(),
                destination: destination.to_string(),
                value: cost,
            });
        }
        self.cells.insert((origin, destination), cost);
        Ok(())
    }

    /// Cost of a cell, or `None` when it was never supplied.
    pub fn get(&self, origin: &Z, destination: &Z) -> Option<f64> {
        self.cells
            .get(&(origin.clone(), destination.clone()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Z, &Z, f64)> {
        self.cells.iter().map(|((o, d), v)| (o, d, *v))
    }

    /// Every zone appearing as an origin or destination.
    pub fn zones(&self) -> BTreeSet<&Z> {
        self.cells.keys().flat_map(|(o, d)| [o, d]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_cost_is_stored() {
        let costs = CostMatrix::from_cells(vec![(1u32, 2u32, 0.0), (2, 1, 4.5)]).unwrap();
        assert_eq!(costs.len(), 2);
        assert_eq!(costs.get(&1, &2), Some(0.0));
        assert_eq!(costs.get(&2, &2), None);
        assert_eq!(costs.zones().len(), 2);
    }

    #[test]
    fn test_repeated_cell_overwrites() {
        let costs = CostMatrix::from_cells(vec![(1u32, 2u32, 3.0), (1, 2, 5.0)]).unwrap();
        assert_eq!(costs.get(&1, &2), Some(5.0));
    }

    #[test]
    fn test_invalid_costs_rejected() {
        assert!(matches!(
            CostMatrix::from_cells(vec![(1u32, 2u32, -1.0)]),
            Err(MatrixError::InvalidCost { .. })
        ));
        assert!(CostMatrix::from_cells(vec![(1u32, 2u32, f64::NAN)]).is_err());
    }
}
