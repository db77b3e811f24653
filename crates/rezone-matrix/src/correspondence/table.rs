//! CorrespondenceTable: immutable index from old zone to its new-zone splits.

use std::collections::hash_map::Entry;
use std::collections::BTreeMap;

use rezone_core::config::DEFAULT_TOLERANCE;
use rezone_core::errors::{CorrespondenceError, MalformedReason};
use rezone_core::types::collections::FxHashMap;
use rezone_core::Zone;
use tracing::{debug, warn};

use super::types::{CorrespondenceRecord, Splits};

#[derive(Debug, Clone)]
struct ZoneGroup<N> {
    splits: Splits<N>,
    factor_sum: f64,
}

impl<N> ZoneGroup<N> {
    fn empty() -> Self {
        Self {
            splits: Splits::new(),
            factor_sum: 0.0,
        }
    }
}

/// A validated zone correspondence from zoning system `O` to zoning system `N`.
///
/// Built once from raw rows and never mutated afterwards. Entries keep the
/// order in which they were supplied, both across old zones and within one
/// old zone's splits.
#[derive(Debug, Clone)]
pub struct CorrespondenceTable<O: Zone, N: Zone> {
    groups: FxHashMap<O, ZoneGroup<N>>,
    order: Vec<O>,
    unbalanced: BTreeMap<O, f64>,
    tolerance: f64,
    entry_count: usize,
}

impl<O: Zone, N: Zone> CorrespondenceTable<O, N> {
    /// Validate and index raw rows.
    ///
    /// Rows are grouped by old zone. A repeated `(old, new)` pair is collapsed
    /// when its factor matches the first occurrence within `tolerance`, and
    /// rejected otherwise. Groups whose factors do not sum to 1 within
    /// `tolerance` are recorded as unbalanced but kept.
    pub fn new<I>(records: I, tolerance: f64) -> Result<Self, CorrespondenceError>
    where
        I: IntoIterator<Item = CorrespondenceRecord<O, N>>,
    {
        let mut groups: FxHashMap<O, ZoneGroup<N>> = FxHashMap::default();
        let mut order = Vec::new();
        let mut entry_count = 0usize;
        let mut collapsed = 0usize;

        for (i, record) in records.into_iter().enumerate() {
            let row = i + 1;
            let (old, new, factor) = record.validate(row)?;

            if let Some(group) = groups.get(&old) {
                if let Some((_, existing)) = group.splits.iter().find(|(n, _)| *n == new) {
                    if (existing - factor).abs() > tolerance {
                        return Err(CorrespondenceError::malformed(
                            row,
                            MalformedReason::ConflictingDuplicate {
                                old_zone: old.to_string(),
                                new_zone: new.to_string(),
                                first: *existing,
                                second: factor,
                            },
                        ));
                    }
                    collapsed += 1;
                    continue;
                }
            }

            let group = match groups.entry(old) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => {
                    order.push(e.key().clone());
                    e.insert(ZoneGroup::empty())
                }
            };
            group.splits.push((new, factor));
            group.factor_sum += factor;
            entry_count += 1;
        }

        let unbalanced: BTreeMap<O, f64> = groups
            .iter()
            .filter(|(_, g)| (g.factor_sum - 1.0).abs() > tolerance)
            .map(|(zone, g)| (zone.clone(), g.factor_sum))
            .collect();

        if collapsed > 0 {
            warn!(collapsed, "collapsed repeated correspondence rows");
        }
        if !unbalanced.is_empty() {
            warn!(
                count = unbalanced.len(),
                zones = ?unbalanced.keys().take(10).collect::<Vec<_>>(),
                "correspondence has old zones whose splitting factors do not sum to 1"
            );
        }
        debug!(
            old_zones = order.len(),
            entries = entry_count,
            unbalanced = unbalanced.len(),
            "built correspondence table"
        );

        Ok(Self {
            groups,
            order,
            unbalanced,
            tolerance,
            entry_count,
        })
    }

    /// Validate and index rows using the default tolerance.
    pub fn with_default_tolerance<I>(records: I) -> Result<Self, CorrespondenceError>
    where
        I: IntoIterator<Item = CorrespondenceRecord<O, N>>,
    {
        Self::new(records, DEFAULT_TOLERANCE)
    }

    /// Build from non-null `(old, new, factor)` triples.
    pub fn from_triples<I>(triples: I, tolerance: f64) -> Result<Self, CorrespondenceError>
    where
        I: IntoIterator<Item = (O, N, f64)>,
    {
        Self::new(triples.into_iter().map(CorrespondenceRecord::from), tolerance)
    }

    /// New-zone splits of `old`. Empty when the zone is not in the table.
    pub fn lookup(&self, old: &O) -> &[(N, f64)] {
        self.groups
            .get(old)
            .map(|g| g.splits.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, old: &O) -> bool {
        self.groups.contains_key(old)
    }

    /// Sum of `old`'s splitting factors, if the zone is present.
    pub fn factor_sum(&self, old: &O) -> Option<f64> {
        self.groups.get(old).map(|g| g.factor_sum)
    }

    pub fn is_unbalanced(&self, old: &O) -> bool {
        self.unbalanced.contains_key(old)
    }

    /// Old zones whose factors do not sum to 1, with their sums.
    pub fn unbalanced_zones(&self) -> &BTreeMap<O, f64> {
        &self.unbalanced
    }

    /// Number of distinct old zones.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of stored `(old, new)` entries after collapsing repeats.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Old zones in first-seen order.
    pub fn old_zones(&self) -> impl Iterator<Item = &O> {
        self.order.iter()
    }

    /// Distinct new zones, sorted.
    pub fn new_zones(&self) -> Vec<&N> {
        let mut zones: Vec<&N> = self
            .groups
            .values()
            .flat_map(|g| g.splits.iter().map(|(n, _)| n))
            .collect();
        zones.sort();
        zones.dedup();
        zones
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&O, &N, f64)> {
        self.order.iter().flat_map(move |old| {
            self.lookup(old)
                .iter()
                .map(move |(new, factor)| (old, new, *factor))
        })
    }

    /// A copy with every old zone's factors rescaled to sum to 1.
    ///
    /// Zones whose factors sum to zero cannot be rescaled and are left out,
    /// so they behave as missing in the result.
    pub fn normalized(&self) -> Self {
        let mut groups = FxHashMap::default();
        let mut order = Vec::with_capacity(self.order.len());
        let mut entry_count = 0usize;

        for old in &self.order {
            let Some(group) = self.groups.get(old) else {
                continue;
            };
            if group.factor_sum <= 0.0 {
                continue;
            }
            let splits: Splits<N> = group
                .splits
                .iter()
                .map(|(new, f)| (new.clone(), f / group.factor_sum))
                .collect();
            entry_count += splits.len();
            order.push(old.clone());
            groups.insert(
                old.clone(),
                ZoneGroup {
                    factor_sum: splits.iter().map(|(_, f)| f).sum(),
                    splits,
                },
            );
        }

        let dropped = self.order.len() - order.len();
        if dropped > 0 {
            warn!(dropped, "zero-sum zones removed during normalisation");
        }

        Self {
            groups,
            order,
            unbalanced: BTreeMap::new(),
            tolerance: self.tolerance,
            entry_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(&'static str, &'static str, f64)]) -> CorrespondenceTable<&'static str, &'static str> {
        CorrespondenceTable::from_triples(rows.iter().copied(), DEFAULT_TOLERANCE).unwrap()
    }

    #[test]
    fn test_lookup_preserves_split_order() {
        let t = table(&[("A", "X", 0.6), ("B", "Y", 1.0), ("A", "Y", 0.4)]);
        assert_eq!(t.lookup(&"A"), &[("X", 0.6), ("Y", 0.4)]);
        assert_eq!(t.lookup(&"B"), &[("Y", 1.0)]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.entry_count(), 3);
        assert_eq!(t.old_zones().copied().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(t.new_zones(), vec![&"X", &"Y"]);
    }

    #[test]
    fn test_lookup_absent_zone_is_empty() {
        let t = table(&[("A", "X", 1.0)]);
        assert!(t.lookup(&"Q").is_empty());
        assert!(!t.contains(&"Q"));
        assert_eq!(t.factor_sum(&"Q"), None);
    }

    #[test]
    fn test_unbalanced_zone_recorded_not_rejected() {
        let t = table(&[("A", "X", 1.0), ("B", "X", 0.5), ("B", "Y", 0.4)]);
        assert!(t.is_unbalanced(&"B"));
        assert!(!t.is_unbalanced(&"A"));
        let sum = t.unbalanced_zones()[&"B"];
        assert!((sum - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_within_tolerance_is_balanced() {
        let t = table(&[("A", "X", 0.3333333), ("A", "Y", 0.6666667)]);
        assert!(t.unbalanced_zones().is_empty());
    }

    #[test]
    fn test_negative_factor_rejected() {
        let err = CorrespondenceTable::from_triples(
            vec![("A", "X", 1.0), ("B", "X", -0.1)],
            DEFAULT_TOLERANCE,
        )
        .unwrap_err();
        assert_eq!(err.row(), 2);
        assert!(matches!(
            err,
            CorrespondenceError::Malformed {
                reason: MalformedReason::NegativeFactor { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_nan_factor_rejected() {
        let err = CorrespondenceTable::from_triples(vec![("A", "X", f64::NAN)], DEFAULT_TOLERANCE)
            .unwrap_err();
        assert!(matches!(
            err,
            CorrespondenceError::Malformed {
                reason: MalformedReason::NonFiniteFactor { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_null_zone_rejected() {
        let records = vec![
            CorrespondenceRecord::new("A", "X", 1.0),
            CorrespondenceRecord {
                old_zone: Some("B"),
                new_zone: None,
                splitting_factor: 1.0,
            },
        ];
        let err = CorrespondenceTable::with_default_tolerance(records).unwrap_err();
        assert_eq!(
            err,
            CorrespondenceError::Malformed {
                row: 2,
                reason: MalformedReason::NullZone { column: "new" },
            }
        );
    }

    #[test]
    fn test_conflicting_duplicate_rejected() {
        let err = CorrespondenceTable::from_triples(
            vec![("A", "X", 0.5), ("A", "Y", 0.5), ("A", "X", 0.7)],
            DEFAULT_TOLERANCE,
        )
        .unwrap_err();
        assert_eq!(err.row(), 3);
        assert!(err.to_string().contains("conflicting factors 0.5 and 0.7"));
    }

    #[test]
    fn test_identical_duplicate_collapsed() {
        let t = table(&[("A", "X", 0.5), ("A", "Y", 0.5), ("A", "X", 0.5)]);
        assert_eq!(t.entry_count(), 2);
        assert!(t.unbalanced_zones().is_empty());
    }

    #[test]
    fn test_entries_in_insertion_order() {
        let t = table(&[("B", "Y", 1.0), ("A", "X", 0.6), ("A", "Y", 0.4)]);
        let entries: Vec<_> = t.entries().map(|(o, n, f)| (*o, *n, f)).collect();
        assert_eq!(entries, vec![("B", "Y", 1.0), ("A", "X", 0.6), ("A", "Y", 0.4)]);
    }

    #[test]
    fn test_normalized_rescales_and_drops_zero_sum() {
        let t = table(&[("A", "X", 0.45), ("A", "Y", 0.45), ("B", "X", 0.0), ("C", "Y", 1.0)]);
        assert_eq!(t.unbalanced_zones().len(), 2);

        let n = t.normalized();
        assert!(n.unbalanced_zones().is_empty());
        assert_eq!(n.lookup(&"A"), &[("X", 0.5), ("Y", 0.5)]);
        assert!(!n.contains(&"B"));
        assert_eq!(n.len(), 2);
        assert_eq!(n.entry_count(), 3);
    }

    #[test]
    fn test_empty_table() {
        let t: CorrespondenceTable<&str, &str> =
            CorrespondenceTable::from_triples(Vec::new(), DEFAULT_TOLERANCE).unwrap();
        assert!(t.is_empty());
        assert_eq!(t.entry_count(), 0);
    }
}
