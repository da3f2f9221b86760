//! Per-request factory options

use serde::{Deserialize, Serialize};

/// Options accepted by every create operation
///
/// Missing keys take their default when loaded from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryOptions {
    /// Produce a plain (unchecked) instance
    pub disable_validation: bool,
    /// Populate fields after defaults
    pub generate: bool,
    /// Use sample data instead of type defaults when generating
    pub with_sample_data: bool,
    /// Also populate optional fields when generating
    pub include_optional_fields: bool,
    /// Seed for reproducible sample data
    pub sample_seed: Option<u64>,
}

impl FactoryOptions {
    /// Create default options (validated, no generation)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With validation disabled
    #[inline]
    #[must_use]
    pub fn with_validation_disabled(mut self) -> Self {
        self.disable_validation = true;
        self
    }

    /// With field generation
    #[inline]
    #[must_use]
    pub fn with_generation(mut self) -> Self {
        self.generate = true;
        self
    }

    /// With sample data generation
    ///
    /// Implies [`with_generation`](Self::with_generation).
    #[inline]
    #[must_use]
    pub fn with_sample_data(mut self) -> Self {
        self.generate = true;
        self.with_sample_data = true;
        self
    }

    /// With optional fields populated
    #[inline]
    #[must_use]
    pub fn with_optional_fields(mut self) -> Self {
        self.include_optional_fields = true;
        self
    }

    /// With a fixed sample seed
    #[inline]
    #[must_use]
    pub fn with_sample_seed(mut self, seed: u64) -> Self {
        self.sample_seed = Some(seed);
        self
    }

    /// Generation strategy, if generation is requested
    #[inline]
    #[must_use]
    pub fn strategy(&self) -> Option<GenerationStrategy> {
        match (self.generate, self.with_sample_data) {
            (false, _) => None,
            (true, false) => Some(GenerationStrategy::Default),
            (true, true) => Some(GenerationStrategy::Sample),
        }
    }
}

/// Which value generator populates fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationStrategy {
    /// Deterministic type defaults
    Default,
    /// Randomized sample values
    Sample,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_without_generation() {
        let options = FactoryOptions::new();
        assert!(!options.disable_validation);
        assert_eq!(options.strategy(), None);
    }

    #[test]
    fn strategy_follows_flags() {
        assert_eq!(
            FactoryOptions::new().with_generation().strategy(),
            Some(GenerationStrategy::Default)
        );
        assert_eq!(
            FactoryOptions::new().with_sample_data().strategy(),
            Some(GenerationStrategy::Sample)
        );

        let sample_only = FactoryOptions {
            with_sample_data: true,
            ..FactoryOptions::default()
        };
        assert_eq!(sample_only.strategy(), None);
    }

    #[test]
    fn loads_partial_json() {
        let options: FactoryOptions =
            serde_json::from_str(r#"{ "generate": true, "sample_seed": 7 }"#).unwrap();
        assert!(options.generate);
        assert!(!options.with_sample_data);
        assert_eq!(options.sample_seed, Some(7));
    }
}
