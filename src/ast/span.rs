//! Byte ranges into query text, and nodes that carry one.

use serde::Serialize;
use std::ops::Range;

/// Byte range into the query text.
pub type Span = Range<usize>;

/// A query fragment together with where it was written.
///
/// Equality looks at `node` only. A query re-parsed from its own serialization
/// has different spans but compares equal to the original.
#[derive(Debug, Clone, Serialize)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    /// A node built in code rather than read from text. Its span is empty.
    pub fn synthetic(node: T) -> Self {
        Self::new(node, 0..0)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned::new(f(self.node), self.span)
    }

    /// A new node at the same location, used when a correction swaps the value.
    pub fn replaced(&self, node: T) -> Self {
        Self::new(node, self.span.clone())
    }

    pub fn into_inner(self) -> T {
        self.node
    }
}

impl<T: PartialEq> PartialEq for Spanned<T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<T: Eq> Eq for Spanned<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_keeps_location() {
        let limit = Spanned::new("25", 38..40).map(|text| text.len());
        assert_eq!(limit.node, 2);
        assert_eq!(limit.span, 38..40);
    }

    #[test]
    fn replaced_keeps_location() {
        let resource = Spanned::new("campaing", 20..28);
        let fixed = resource.replaced("campaign");
        assert_eq!(fixed.into_inner(), "campaign");
        assert_eq!(resource.span, 20..28);
    }

    #[test]
    fn equality_ignores_location() {
        let parsed = Spanned::new("campaign.id", 7..18);
        let reparsed = Spanned::new("campaign.id", 0..11);
        assert_eq!(parsed, reparsed);
        assert_ne!(parsed, Spanned::synthetic("campaign.name"));
        assert!(Spanned::synthetic(1).span.is_empty());
    }
}
