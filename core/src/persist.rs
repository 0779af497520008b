use crate::page::{Page, PageId};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

const SEPARATOR: &str = "***********************************************************";

/// Writes page records to the flat metadata format, in page-id order:
///
/// ```text
/// <id>:<title>
/// PageRank:<score>
/// Link:<url>
/// Anchors are as under:
/// <sourceId>:<anchorText>
/// ***********************************************************
/// ```
pub fn write_metadata(path: &Path, pages: &[Page]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for page in pages {
        writeln!(out, "{}:{}", page.id, page.title)?;
        writeln!(out, "PageRank:{}", page.score)?;
        writeln!(out, "Link:{}", page.url)?;
        writeln!(out, "Anchors are as under:")?;
        for (source, text) in &page.anchors {
            writeln!(out, "{source}:{text}")?;
        }
        writeln!(out, "{SEPARATOR}")?;
    }
    out.flush()?;
    tracing::info!(pages = pages.len(), path = %path.display(), "metadata written");
    Ok(())
}

/// Reads page records back. Page ids are reassigned densely in block order,
/// so a file written by [`write_metadata`] round-trips losslessly.
///
/// A PageRank or anchor line that does not parse is a hard error carrying
/// the offending line; an anchor line without a delimiter keeps its id with
/// empty text.
pub fn read_metadata(path: &Path) -> Result<Vec<Page>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut pages: Vec<Page> = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.starts_with('*') {
            if !block.is_empty() {
                pages.push(parse_block(&block, pages.len())?);
                block.clear();
            }
        } else {
            block.push(line);
        }
    }
    if !block.is_empty() {
        pages.push(parse_block(&block, pages.len())?);
    }
    tracing::info!(pages = pages.len(), path = %path.display(), "metadata loaded");
    Ok(pages)
}

fn parse_block(lines: &[&str], id: PageId) -> Result<Page> {
    let mut page = Page::new(id);
    for (pos, line) in lines.iter().enumerate() {
        match pos {
            0 => {
                // The title may itself contain ':'; keep everything after
                // the first delimiter. No delimiter means an empty title.
                page.title = line
                    .split_once(':')
                    .map(|(_, rest)| rest.to_string())
                    .unwrap_or_default();
            }
            1 => {
                let (_, value) = line
                    .split_once(':')
                    .with_context(|| format!("malformed PageRank line: {line}"))?;
                page.score = value
                    .parse()
                    .with_context(|| format!("malformed PageRank value: {line}"))?;
            }
            2 => {
                let (_, value) = line
                    .split_once(':')
                    .with_context(|| format!("malformed Link line: {line}"))?;
                page.url = value.to_string();
            }
            3 => {} // "Anchors are as under:" header
            _ => {
                let (source, text) = line.split_once(':').unwrap_or((line, ""));
                let source: PageId = source
                    .trim()
                    .parse()
                    .with_context(|| format!("malformed anchor line: {line}"))?;
                page.set_anchor(source, text);
            }
        }
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pages() -> Vec<Page> {
        let mut a = Page::new(0);
        a.title = "Rust: the book".to_string();
        a.url = "http://www.a.com".to_string();
        a.score = 0.737_285_f64;
        a.set_anchor(1, "read it");
        a.set_anchor(2, "docs: start here");

        let mut b = Page::new(1);
        b.title = "Plain".to_string();
        b.url = "http://www.b.com/sub".to_string();
        b.score = 0.15;
        vec![a, b]
    }

    #[test]
    fn metadata_round_trip_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.txt");
        let pages = sample_pages();
        write_metadata(&path, &pages).unwrap();
        let loaded = read_metadata(&path).unwrap();
        assert_eq!(loaded, pages);
    }

    #[test]
    fn anchor_line_without_delimiter_keeps_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.txt");
        let body = "0:Title\nPageRank:0.5\nLink:http://www.a.com\nAnchors are as under:\n7\n***********************************************************\n";
        fs::write(&path, body).unwrap();
        let loaded = read_metadata(&path).unwrap();
        assert_eq!(loaded[0].anchors.get(&7).map(String::as_str), Some(""));
    }

    #[test]
    fn link_line_keeps_url_colons() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.txt");
        let body = "0:Title\nPageRank:0.5\nLink:http://www.a.com:8080/x\nAnchors are as under:\n***********************************************************\n";
        fs::write(&path, body).unwrap();
        let loaded = read_metadata(&path).unwrap();
        assert_eq!(loaded[0].url, "http://www.a.com:8080/x");
    }

    #[test]
    fn malformed_score_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.txt");
        let body = "0:Title\nPageRank:not-a-number\nLink:http://www.a.com\nAnchors are as under:\n***********************************************************\n";
        fs::write(&path, body).unwrap();
        assert!(read_metadata(&path).is_err());
    }
}
