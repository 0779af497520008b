use crate::fetch::ContentFetcher;
use crate::page::{Page, PageId};
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashMap;

/// Dense adjacency matrix over the closed seed set.
/// `matrix[target][source] = 1.0` iff `source` links to `target`; the
/// diagonal is always zero.
#[derive(Debug, Clone)]
pub struct LinkGraph {
    pub n: usize,
    pub matrix: Vec<Vec<f64>>,
}

impl LinkGraph {
    pub fn new(n: usize) -> Self {
        Self { n, matrix: vec![vec![0.0; n]; n] }
    }

    pub fn add_edge(&mut self, target: PageId, source: PageId) {
        if target != source {
            self.matrix[target][source] = 1.0;
        }
    }

    /// Number of recorded edges leaving `source`.
    pub fn out_degree(&self, source: PageId) -> usize {
        (0..self.n).filter(|&t| self.matrix[t][source] != 0.0).count()
    }
}

/// Canonical form used as the identity key for seed pages: one trailing
/// slash stripped.
pub fn canonicalize_seed(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_string()
}

/// Canonical form for links discovered on a page, applied in order:
/// scheme downgrade, mobile-subdomain rewrite, trailing-slash strip,
/// `www` insertion, fragment strip.
pub fn canonicalize_link(url: &str) -> String {
    let mut link = url.replacen("https://", "http://", 1);
    if let Some(rest) = link.strip_prefix("http://m.") {
        link = format!("http://www.{rest}");
    }
    if let Some(stripped) = link.strip_suffix('/') {
        link = stripped.to_string();
    }
    if !link.starts_with("http://www") {
        link = link.replacen("http://", "http://www.", 1);
    }
    if let Some((before_fragment, _)) = link.split_once('#') {
        link = before_fragment.to_string();
    }
    link
}

/// Parses the `label,url` link list. Lines that do not split into exactly
/// two comma-separated fields are skipped silently.
pub fn parse_link_list(input: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    for line in input.lines() {
        let fields: Vec<&str> = line.trim().split(',').collect();
        if fields.len() != 2 {
            continue;
        }
        entries.push((fields[0].to_string(), fields[1].to_string()));
    }
    entries
}

/// Builds the adjacency matrix and the page records for a seed list.
///
/// Fetches may overlap up to the configured concurrency, but each result
/// lands in the slot owned by its page id and edges are applied in id
/// order, so the output is identical to a sequential build.
pub struct LinkGraphBuilder {
    concurrency: usize,
}

impl Default for LinkGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkGraphBuilder {
    pub fn new() -> Self {
        Self { concurrency: 1 }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn build(
        &self,
        entries: &[(String, String)],
        fetcher: &dyn ContentFetcher,
    ) -> Result<(LinkGraph, Vec<Page>)> {
        // Duplicate canonical URLs collapse to their first-seen page id,
        // so the id range is dense and matches the matrix dimension.
        let mut ids: HashMap<String, PageId> = HashMap::new();
        let mut urls: Vec<String> = Vec::new();
        for (_label, url) in entries {
            let url = canonicalize_seed(url);
            if !ids.contains_key(&url) {
                ids.insert(url.clone(), urls.len());
                urls.push(url);
            }
        }

        let n = urls.len();
        let mut graph = LinkGraph::new(n);
        let mut pages: Vec<Page> = (0..n).map(Page::new).collect();

        // Any fetch failure aborts the whole build; no retry, no partials.
        let contents: Vec<_> = stream::iter(urls.iter())
            .map(|url| async move {
                fetcher
                    .fetch(url)
                    .await
                    .with_context(|| format!("fetching {url}"))
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let mut edges = 0usize;
        for (source, (url, content)) in urls.iter().zip(contents).enumerate() {
            pages[source].title = content.title;
            pages[source].url = url.clone();
            for link in &content.links {
                let target_url = canonicalize_link(&link.url);
                // Self-links and links outside the seed set record nothing;
                // the graph stays bounded to the closed seed set.
                if target_url == *url {
                    continue;
                }
                let Some(&target) = ids.get(&target_url) else {
                    continue;
                };
                pages[target].set_anchor(source, &link.anchor);
                graph.add_edge(target, source);
                edges += 1;
            }
        }

        tracing::info!(pages = n, edges, "link graph built");
        Ok((graph, pages))
    }
}
