use crate::fetch::ContentFetcher;
use crate::index::InvertedIndex;
use crate::page::{Page, PageId};
use anyhow::Result;

const SNIPPET_SIZE: usize = 20;

#[derive(Debug)]
pub enum QueryOutcome {
    /// The query had no tokens; the caller may re-prompt.
    EmptyQuery,
    /// The term is not in the index.
    TermNotFound,
    Results(Vec<SearchHit>),
}

#[derive(Debug)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub score: f64,
    pub snippet: String,
}

/// Stateless resolver over a built index and scored page records.
pub struct QueryResolver<'a> {
    index: &'a InvertedIndex,
    pages: &'a [Page],
}

impl<'a> QueryResolver<'a> {
    pub fn new(index: &'a InvertedIndex, pages: &'a [Page]) -> Self {
        Self { index, pages }
    }

    /// Resolves one raw query line into ranked, snippet-annotated hits.
    /// Snippets re-fetch each hit's body text through the fetcher.
    pub async fn resolve(&self, raw: &str, fetcher: &dyn ContentFetcher) -> Result<QueryOutcome> {
        // Single-term restriction: first whitespace token only, the rest is
        // discarded.
        let Some(term) = raw.split_whitespace().next() else {
            return Ok(QueryOutcome::EmptyQuery);
        };
        let term = term.to_lowercase();
        let Some(ids) = self.index.lookup(&term) else {
            return Ok(QueryOutcome::TermNotFound);
        };

        let mut hits = Vec::with_capacity(ids.len());
        for id in rank_by_score(ids, self.pages) {
            let page = &self.pages[id];
            let body = fetcher.fetch_body(&page.url).await?;
            hits.push(SearchHit {
                title: page.title.clone(),
                url: page.url.clone(),
                score: page.score,
                snippet: snippet(&body, &term),
            });
        }
        Ok(QueryOutcome::Results(hits))
    }
}

/// Orders matches by strictly descending score. Repeatedly extracting the
/// running maximum keeps first-inserted order among exact ties.
fn rank_by_score(ids: &[PageId], pages: &[Page]) -> Vec<PageId> {
    let mut remaining: Vec<PageId> = ids.to_vec();
    let mut ranked = Vec::with_capacity(remaining.len());
    while !remaining.is_empty() {
        let mut best = 0;
        for (pos, &id) in remaining.iter().enumerate() {
            if pages[id].score > pages[remaining[best]].score {
                best = pos;
            }
        }
        ranked.push(remaining.remove(best));
    }
    ranked
}

/// Builds a preview of up to 20 whitespace tokens around occurrences of the
/// query term. A body without the term yields its first 20 tokens verbatim;
/// otherwise the lowercased body is split on the term and each long
/// "before" segment contributes its trailing window, short segments their
/// whole text, with the literal term interspersed between segments.
pub fn snippet(body: &str, term: &str) -> String {
    let lowered = body.to_lowercase();
    let term = term.to_lowercase();
    if term.is_empty() || !lowered.contains(&term) {
        return body
            .split_whitespace()
            .take(SNIPPET_SIZE)
            .collect::<Vec<_>>()
            .join(" ");
    }

    let mut segments: Vec<&str> = lowered.split(term.as_str()).collect();
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }

    let half = SNIPPET_SIZE / 2;
    let mut out: Vec<String> = Vec::new();
    let mut budget = SNIPPET_SIZE;
    for segment in segments {
        if budget == 0 {
            break;
        }
        let words: Vec<&str> = segment.split_whitespace().collect();
        if words.len() > half {
            // Trailing window of a long "before" segment, then the term.
            // The interspersed term never counts against the budget.
            let window = &words[words.len() - (half + 1)..];
            let mut taken = 0;
            for word in window {
                if budget == 0 {
                    break;
                }
                out.push((*word).to_string());
                budget -= 1;
                taken += 1;
            }
            if taken == window.len() {
                out.push(term.clone());
            }
        } else {
            for word in &words {
                if budget == 0 {
                    break;
                }
                out.push((*word).to_string());
                budget -= 1;
            }
            if budget != 0 {
                out.push(term.clone());
            }
        }
    }
    out.join(" ")
}
