use crate::page::{Page, PageId};
use std::collections::BTreeMap;

/// Lowercased term → page ids in first-insertion order, no duplicates.
/// Built once after scores are available; read-only while serving queries.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    terms: BTreeMap<String, Vec<PageId>>,
}

impl InvertedIndex {
    /// Builds the index from titles and inbound anchor text, in page-id
    /// order. Anchor terms are attributed to the page that owns the
    /// anchors, i.e. the link target, not the linking page.
    pub fn build(pages: &[Page]) -> Self {
        let mut index = Self::default();
        for page in pages {
            for token in page.title.split_whitespace() {
                index.insert(token, page.id);
            }
            for anchor in page.anchors.values() {
                for token in anchor.split_whitespace() {
                    index.insert(token, page.id);
                }
            }
        }
        tracing::info!(terms = index.terms.len(), pages = pages.len(), "inverted index built");
        index
    }

    // Explicit insert-if-absent keeps first-insertion order auditable.
    fn insert(&mut self, token: &str, id: PageId) {
        let ids = self.terms.entry(token.to_lowercase()).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    pub fn lookup(&self, term: &str) -> Option<&[PageId]> {
        self.terms.get(term).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_title_and_anchor_token_is_indexed() {
        let mut a = Page::new(0);
        a.title = "Hello World".to_string();
        a.set_anchor(1, "Click Here");
        let mut b = Page::new(1);
        b.title = "World News".to_string();

        let index = InvertedIndex::build(&[a, b]);
        assert_eq!(index.lookup("hello"), Some(&[0][..]));
        assert_eq!(index.lookup("world"), Some(&[0, 1][..]));
        assert_eq!(index.lookup("click"), Some(&[0][..]));
        assert_eq!(index.lookup("here"), Some(&[0][..]));
        assert_eq!(index.lookup("news"), Some(&[1][..]));
        assert_eq!(index.lookup("missing"), None);
    }

    #[test]
    fn anchor_terms_attach_to_the_target_page() {
        // Page 2 is the source of the link, but the anchor lives on page 0,
        // so its tokens resolve to page 0.
        let mut target = Page::new(0);
        target.title = "Untitled".to_string();
        target.set_anchor(2, "rust tutorial");

        let index = InvertedIndex::build(&[target]);
        assert_eq!(index.lookup("rust"), Some(&[0][..]));
        assert_eq!(index.lookup("tutorial"), Some(&[0][..]));
    }

    #[test]
    fn duplicate_tokens_keep_first_insertion_only() {
        let mut a = Page::new(0);
        a.title = "rust rust rust".to_string();
        a.set_anchor(1, "rust");

        let index = InvertedIndex::build(&[a]);
        assert_eq!(index.lookup("rust"), Some(&[0][..]));
        assert_eq!(index.len(), 1);
    }
}
