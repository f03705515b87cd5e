//! Document-wide font-size statistics.

use indexmap::IndexMap;

use crate::model::Document;

/// Character mass per font size, keyed by the size rounded to one decimal
/// (stored in tenths of a point). Keys keep first-seen order so ties on the
/// maximum resolve to the size encountered first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontStats {
    histogram: IndexMap<i32, usize>,
}

/// Round a size to one decimal, expressed in tenths.
fn tenths(size: f32) -> i32 {
    (size * 10.0).round() as i32
}

impl FontStats {
    /// Accumulate the character count of every span in the document.
    pub fn from_document(doc: &Document) -> Self {
        let mut histogram: IndexMap<i32, usize> = IndexMap::new();
        for span in doc.spans() {
            *histogram.entry(tenths(span.size)).or_insert(0) += span.char_count();
        }
        FontStats { histogram }
    }

    /// The rounded size carrying the most characters.
    pub fn body_size(&self) -> Option<f32> {
        let mut best: Option<(i32, usize)> = None;
        for (&size, &count) in &self.histogram {
            match best {
                Some((_, c)) if count <= c => {}
                _ => best = Some((size, count)),
            }
        }
        best.map(|(size, _)| size as f32 / 10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::*;
    use crate::model::Document;

    #[test]
    fn test_body_size_is_dominant_size() {
        let doc = Document::new(vec![page(
            0,
            vec![
                block("Heading", 18.0, 72.0, 100.0),
                body(11.0, 200.0),
                body(11.0, 240.0),
                block("Footnote text here", 8.0, 72.0, 700.0),
            ],
        )]);
        let stats = FontStats::from_document(&doc);
        assert_eq!(stats.body_size(), Some(11.0));
    }

    #[test]
    fn test_sizes_round_to_one_decimal() {
        let doc = Document::new(vec![page(
            0,
            vec![
                block("aaaa", 10.04, 0.0, 100.0),
                block("bbbb", 9.96, 0.0, 120.0),
                block("ccccccc", 12.0, 0.0, 140.0),
            ],
        )]);
        let stats = FontStats::from_document(&doc);
        assert_eq!(stats.body_size(), Some(10.0));
        assert_eq!(stats.histogram.len(), 2);
    }

    #[test]
    fn test_ties_resolve_to_first_seen_size() {
        let doc = Document::new(vec![page(
            0,
            vec![block("abcd", 14.0, 0.0, 100.0), block("wxyz", 10.0, 0.0, 140.0)],
        )]);
        assert_eq!(FontStats::from_document(&doc).body_size(), Some(14.0));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let doc = Document::new(vec![page(
            0,
            vec![block("ééééé", 9.0, 0.0, 100.0), block("abcdef", 12.0, 0.0, 140.0)],
        )]);
        assert_eq!(FontStats::from_document(&doc).body_size(), Some(12.0));
    }

    #[test]
    fn test_empty_document_has_no_body_size() {
        let stats = FontStats::from_document(&Document::default());
        assert!(stats.histogram.is_empty());
        assert_eq!(stats.body_size(), None);
    }
}
