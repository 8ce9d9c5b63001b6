//! Tagged stage results: data, an expected "nothing here", or a failure.

use std::convert::Infallible;
use std::fmt;

/// Why a stage produced no data without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Miss {
    /// The expected container element is absent (layout changed, empty page).
    NoContainer,
    /// The container exists but nothing in it qualified.
    NoMatches,
}

impl fmt::Display for Miss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Miss::NoContainer => write!(f, "expected container not found"),
            Miss::NoMatches => write!(f, "no matching entries"),
        }
    }
}

/// Result of one pipeline stage for one unit of work.
#[derive(Debug)]
pub enum Outcome<T, E> {
    Found(Vec<T>),
    Empty(Miss),
    Failed(E),
}

/// Parser output: HTML parsing itself cannot fail, only come up empty.
pub type Parsed<T> = Outcome<T, Infallible>;

impl<T, E> Outcome<T, E> {
    /// `Found` with an empty list collapses to `Empty(NoMatches)`.
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Outcome::Empty(Miss::NoMatches)
        } else {
            Outcome::Found(items)
        }
    }

    /// Items if found, otherwise an empty list.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Outcome::Found(items) => items,
            Outcome::Empty(_) | Outcome::Failed(_) => Vec::new(),
        }
    }
}

impl<T> Outcome<T, Infallible> {
    /// Lifts a parser result into a stage result with a real error type.
    pub fn widen<E>(self) -> Outcome<T, E> {
        match self {
            Outcome::Found(items) => Outcome::Found(items),
            Outcome::Empty(miss) => Outcome::Empty(miss),
            Outcome::Failed(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_items_collapses_empty() {
        let o: Outcome<u8, String> = Outcome::from_items(Vec::new());
        assert!(matches!(o, Outcome::Empty(Miss::NoMatches)));
        let o: Outcome<u8, String> = Outcome::from_items(vec![1, 2]);
        assert!(matches!(o, Outcome::Found(_)));
        assert_eq!(o.into_items(), vec![1, 2]);
    }

    #[test]
    fn failed_yields_no_items() {
        let o: Outcome<u8, String> = Outcome::Failed("boom".to_string());
        assert!(o.into_items().is_empty());
    }

    #[test]
    fn widen_keeps_variant() {
        let parsed: Parsed<u8> = Outcome::Empty(Miss::NoContainer);
        let stage: Outcome<u8, String> = parsed.widen();
        assert!(matches!(stage, Outcome::Empty(Miss::NoContainer)));
    }
}
