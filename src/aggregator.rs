use std::fmt;

use ahash::RandomState;
use hashbrown::HashMap;

use crate::parser::Reading;

/// Running statistics for one station. Only ever created from a first reading,
/// so `count >= 1` and `min <= max` always hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationStats {
    min: f64,
    max: f64,
    sum: f64,
    count: u64,
}

impl StationStats {
    fn new(temperature: f64) -> Self {
        Self {
            min: temperature,
            max: temperature,
            sum: temperature,
            count: 1,
        }
    }

    fn add(&mut self, temperature: f64) {
        self.min = self.min.min(temperature);
        self.max = self.max.max(temperature);
        self.sum += temperature;
        self.count += 1;
    }

    fn combine(&mut self, other: &StationStats) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.count += other.count;
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// `sum / count`, kept inside `[min, max]` where float division drifts past them.
    pub fn mean(&self) -> f64 {
        (self.sum / self.count as f64).max(self.min).min(self.max)
    }
}

/// Renders as `<min>/<mean>/<max>` with one fractional digit each.
impl fmt::Display for StationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}/{:.1}/{:.1}", self.min, self.mean(), self.max)
    }
}

/// Station name to [`StationStats`], remembering the order in which each
/// station was first seen.
#[derive(Debug, Default, Clone)]
pub struct AggregateTable {
    index: HashMap<String, usize, RandomState>,
    stations: Vec<(String, StationStats)>,
}

impl AggregateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, reading: Reading<'_>) {
        match self.index.get(reading.station) {
            Some(&slot) => self.stations[slot].1.add(reading.temperature),
            None => {
                self.index
                    .insert(reading.station.to_owned(), self.stations.len());
                self.stations.push((
                    reading.station.to_owned(),
                    StationStats::new(reading.temperature),
                ));
            }
        }
    }

    /// Folds `other` into `self` key by key. Stations unknown to `self` are
    /// appended in `other`'s first-seen order, so merging tables built from
    /// consecutive parts of a file keeps the file's first-seen order.
    pub fn merge(&mut self, other: AggregateTable) {
        for (station, stats) in other.stations {
            match self.index.get(station.as_str()) {
                Some(&slot) => self.stations[slot].1.combine(&stats),
                None => {
                    self.index.insert(station.clone(), self.stations.len());
                    self.stations.push((station, stats));
                }
            }
        }
    }

    pub fn get(&self, station: &str) -> Option<&StationStats> {
        self.index.get(station).map(|&slot| &self.stations[slot].1)
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StationStats)> + '_ {
        self.stations
            .iter()
            .map(|(station, stats)| (station.as_str(), stats))
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Total number of readings folded in, i.e. input lines.
    pub fn readings(&self) -> u64 {
        self.stations.iter().map(|(_, stats)| stats.count).sum()
    }
}
