// src/dataset.rs

use serde::Serialize;
use std::ops::Index;

use crate::period::Period;
use crate::region::{Region, REGION_COUNT};

/// Population counts of every region for one quarter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopulationRecord {
    pub period: Period,
    counts: [u32; REGION_COUNT],
}

impl PopulationRecord {
    pub fn new(period: Period, counts: [u32; REGION_COUNT]) -> Self {
        Self { period, counts }
    }

    pub fn count(&self, region: Region) -> u32 {
        self.counts[region.index()]
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }
}

impl Index<Region> for PopulationRecord {
    type Output = u32;

    fn index(&self, region: Region) -> &u32 {
        &self.counts[region.index()]
    }
}

/// The whole table, ascending by period. Never mutated once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dataset {
    records: Vec<PopulationRecord>,
}

impl Dataset {
    pub fn new(records: Vec<PopulationRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[PopulationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, period: &Period) -> bool {
        self.records.iter().any(|r| r.period == *period)
    }

    /// Indices of every record labelled `period`.
    pub fn positions(&self, period: &Period) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.period == *period)
            .map(|(i, _)| i)
            .collect()
    }

    /// Records `start..=end` by index. `None` if out of bounds or inverted.
    pub fn slice(&self, start: usize, end: usize) -> Option<&[PopulationRecord]> {
        if start > end {
            return None;
        }
        self.records.get(start..=end)
    }

    pub fn first_period(&self) -> Option<Period> {
        self.records.first().map(|r| r.period)
    }

    pub fn last_period(&self) -> Option<Period> {
        self.records.last().map(|r| r.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::Quarter;
    use crate::testutil::sample_dataset;

    #[test]
    fn test_positions_unique_in_contiguous_dataset() {
        let ds = sample_dataset();
        let p = Period::new(Quarter::Q2, 2010);
        let pos = ds.positions(&p);
        assert_eq!(pos.len(), 1);
        assert_eq!(ds.records()[pos[0]].period, p);
        assert!(ds.positions(&Period::new(Quarter::Q1, 1990)).is_empty());
    }

    #[test]
    fn test_slice_is_inclusive_and_ordered() {
        let ds = sample_dataset();
        let sub = ds.slice(4, 10).unwrap();
        assert_eq!(sub.len(), 10 - 4 + 1);
        assert_eq!(sub[0].period, ds.records()[4].period);
        assert_eq!(sub[6].period, ds.records()[10].period);
        assert!(sub.windows(2).all(|w| w[0].period < w[1].period));
    }

    #[test]
    fn test_slice_rejects_inverted_and_out_of_bounds() {
        let ds = sample_dataset();
        assert!(ds.slice(5, 4).is_none());
        assert!(ds.slice(0, ds.len()).is_none());
        assert_eq!(ds.slice(3, 3).unwrap().len(), 1);
    }

    #[test]
    fn test_bounds_and_indexing() {
        let ds = sample_dataset();
        assert_eq!(ds.first_period(), Some(Period::new(Quarter::Q3, 1991)));
        assert_eq!(ds.last_period(), Some(Period::new(Quarter::Q1, 2023)));
        let first = &ds.records()[0];
        assert_eq!(first[Region::Canada], 28_030_864);
        assert_eq!(first[Region::Canada], first.count(Region::Canada));
    }
}
