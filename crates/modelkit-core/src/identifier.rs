//! Identifier generation for transactions created without one

use std::sync::Arc;
use uuid::Uuid;

/// Source of fresh identifiers
///
/// Called concurrently without coordination; implementations must not
/// rely on external locking.
pub trait IdentifierSource: Send + Sync + std::fmt::Debug {
    /// Produce a new identifier, never blank
    fn next_identifier(&self) -> String;
}

impl<T: IdentifierSource + ?Sized> IdentifierSource for Arc<T> {
    fn next_identifier(&self) -> String {
        (**self).next_identifier()
    }
}

/// Random UUID v4 identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4Source;

impl IdentifierSource for UuidV4Source {
    fn next_identifier(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uuid_identifiers_are_unique() {
        let source = UuidV4Source;
        let ids: HashSet<_> = (0..100).map(|_| source.next_identifier()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn uuid_identifiers_parse() {
        let id = UuidV4Source.next_identifier();
        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }
}
