use std::collections::BTreeMap;

pub type PageId = usize;

/// One record per unique canonical URL, indexed by its dense page id.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub id: PageId,
    pub title: String,
    pub url: String,
    /// PageRank score; meaningful only after ranking or a metadata load.
    pub score: f64,
    /// Inbound anchor text keyed by source page id. First write wins.
    pub anchors: BTreeMap<PageId, String>,
}

impl Page {
    pub fn new(id: PageId) -> Self {
        Self {
            id,
            title: String::new(),
            url: String::new(),
            score: 0.0,
            anchors: BTreeMap::new(),
        }
    }

    /// Records anchor text from `source` unless an earlier link from the
    /// same source already set one.
    pub fn set_anchor(&mut self, source: PageId, text: &str) {
        self.anchors.entry(source).or_insert_with(|| text.to_string());
    }
}
