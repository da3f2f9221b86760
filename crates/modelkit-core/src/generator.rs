//! Value generation strategies used when populating fields
//!
//! - [`DefaultValueGenerator`]: deterministic type defaults
//! - [`SampleValueGenerator`]: randomized, optionally seeded sample data

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces values for one field at a time
pub trait ValueGenerator {
    /// Text for the named field
    fn string(&mut self, field: &str) -> String;

    fn boolean(&mut self) -> bool;

    fn integer(&mut self) -> i32;

    fn long(&mut self) -> i64;

    fn double(&mut self) -> f64;

    fn date_time(&mut self) -> DateTime<Utc>;

    /// One of the declared enum values
    fn enum_value<'a>(&mut self, values: &'a [String]) -> Option<&'a str>;

    /// Number of elements for an array field
    fn array_len(&mut self) -> usize;

    /// Identifier for a nested resource or relationship of `type_name`
    fn identifier(&mut self, type_name: &str) -> String;
}

/// Deterministic defaults: empty text, zero, epoch, first enum value
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValueGenerator;

impl ValueGenerator for DefaultValueGenerator {
    fn string(&mut self, _field: &str) -> String {
        String::new()
    }

    fn boolean(&mut self) -> bool {
        false
    }

    fn integer(&mut self) -> i32 {
        0
    }

    fn long(&mut self) -> i64 {
        0
    }

    fn double(&mut self) -> f64 {
        0.0
    }

    fn date_time(&mut self) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    fn enum_value<'a>(&mut self, values: &'a [String]) -> Option<&'a str> {
        values.first().map(String::as_str)
    }

    fn array_len(&mut self) -> usize {
        0
    }

    fn identifier(&mut self, type_name: &str) -> String {
        format!("{type_name}1")
    }
}

const LOREM: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
];

const DECADE_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// 2024-01-01T00:00:00Z, the latest date a seeded generator produces
const SEEDED_ANCHOR_SECS: i64 = 1_704_067_200;

/// Randomized sample data
///
/// Dates fall in the decade before the anchor instant.
#[derive(Debug, Clone)]
pub struct SampleValueGenerator {
    rng: StdRng,
    anchor: DateTime<Utc>,
}

impl SampleValueGenerator {
    /// Create generator seeded from the OS, anchored at the current time
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            anchor: Utc::now(),
        }
    }

    /// Create reproducible generator with a fixed anchor
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            anchor: DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(SEEDED_ANCHOR_SECS),
        }
    }

    /// With a different anchor instant
    #[inline]
    #[must_use]
    pub fn with_anchor(mut self, anchor: DateTime<Utc>) -> Self {
        self.anchor = anchor;
        self
    }

    /// Latest date produced
    #[inline]
    #[must_use]
    pub fn anchor(&self) -> DateTime<Utc> {
        self.anchor
    }

    fn word(&mut self) -> &'static str {
        LOREM[self.rng.random_range(0..LOREM.len())]
    }
}

impl Default for SampleValueGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueGenerator for SampleValueGenerator {
    fn string(&mut self, _field: &str) -> String {
        let count = self.rng.random_range(1..=4);
        (0..count).map(|_| self.word()).collect::<Vec<_>>().join(" ")
    }

    fn boolean(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }

    fn integer(&mut self) -> i32 {
        self.rng.random_range(0..1_000)
    }

    fn long(&mut self) -> i64 {
        self.rng.random_range(0..1_000_000)
    }

    fn double(&mut self) -> f64 {
        (self.rng.random_range(0.0..1_000.0_f64) * 100.0).round() / 100.0
    }

    fn date_time(&mut self) -> DateTime<Utc> {
        self.anchor - Duration::seconds(self.rng.random_range(0..DECADE_SECS))
    }

    fn enum_value<'a>(&mut self, values: &'a [String]) -> Option<&'a str> {
        if values.is_empty() {
            return None;
        }
        Some(values[self.rng.random_range(0..values.len())].as_str())
    }

    fn array_len(&mut self) -> usize {
        self.rng.random_range(1..=3)
    }

    fn identifier(&mut self, type_name: &str) -> String {
        format!("{type_name}{}", self.rng.random_range(0..10_000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_fixed() {
        let mut generator = DefaultValueGenerator;
        assert_eq!(generator.string("name"), "");
        assert!(!generator.boolean());
        assert_eq!(generator.integer(), 0);
        assert_eq!(generator.date_time(), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(generator.array_len(), 0);
        assert_eq!(generator.identifier("Driver"), "Driver1");

        let values = vec!["RED".to_string(), "BLUE".to_string()];
        assert_eq!(generator.enum_value(&values), Some("RED"));
    }

    #[test]
    fn seeded_samples_repeat() {
        let mut a = SampleValueGenerator::seeded(42);
        let mut b = SampleValueGenerator::seeded(42);
        assert_eq!(a.string("x"), b.string("x"));
        assert_eq!(a.long(), b.long());
        assert_eq!(a.identifier("Car"), b.identifier("Car"));
        assert_eq!(a.date_time(), b.date_time());
        assert_eq!(a.anchor(), b.anchor());
    }

    #[test]
    fn anchor_bounds_dates() {
        let anchor = DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(DECADE_SECS * 2);
        let mut generator = SampleValueGenerator::seeded(3).with_anchor(anchor);
        for _ in 0..50 {
            let at = generator.date_time();
            assert!(at <= anchor);
            assert!(at > anchor - Duration::seconds(DECADE_SECS));
        }
    }

    #[test]
    fn samples_stay_in_range() {
        let mut generator = SampleValueGenerator::seeded(7);
        let values = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let decade_ago = generator.anchor() - Duration::seconds(DECADE_SECS);

        for _ in 0..200 {
            let text = generator.string("x");
            assert!(!text.is_empty());
            assert!(text.split(' ').all(|w| LOREM.contains(&w)));

            assert!((1..=3).contains(&generator.array_len()));
            let picked = generator.enum_value(&values).unwrap();
            assert!(values.iter().any(|v| v == picked));
            assert!(generator.date_time() > decade_ago);
            assert!(generator.identifier("Car").starts_with("Car"));
        }
    }

    #[test]
    fn empty_enum_has_no_sample() {
        assert_eq!(SampleValueGenerator::seeded(1).enum_value(&[]), None);
    }
}
