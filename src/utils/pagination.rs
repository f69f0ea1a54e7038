//! Pagination query parsing.

use rustc_hash::FxHashMap;

use crate::database::Page;

/// Largest page size a caller can ask for.
const MAX_PAGE_SIZE: usize = 100;

/// Parse `page` and `page_size` query parameters. Anything missing or
/// unparseable falls back to the defaults; the size is clamped to 1..=100.
#[must_use]
pub fn parse_pagination(query: &FxHashMap<String, String>) -> Page {
    let number = query
        .get("page")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1);

    let size = query
        .get("page_size")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(Page::DEFAULT_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    Page::new(number, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> FxHashMap<String, String> {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_absent() {
        let page = parse_pagination(&query(&[]));

        assert_eq!(page, Page::new(1, 20));
    }

    #[test]
    fn explicit_values_are_used() {
        let page = parse_pagination(&query(&[("page", "3"), ("page_size", "50")]));

        assert_eq!(page, Page::new(3, 50));
    }

    #[test]
    fn garbage_and_extremes_are_tamed() {
        let page = parse_pagination(&query(&[("page", "zero"), ("page_size", "9999")]));

        assert_eq!(page, Page::new(1, 100));

        let page = parse_pagination(&query(&[("page", "0"), ("page_size", "0")]));

        assert_eq!(page, Page::new(1, 1));
    }
}
