use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use linkrank_core::fetch::{ContentFetcher, OutboundLink, PageContent};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 12;
const USER_AGENT: &str = "linkrank-bot/0.1 (+https://example.com/bot)";

/// `ContentFetcher` backed by an HTTP client and an HTML parser. Relative
/// hrefs are resolved against the page URL before they reach the engine.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// A request that exceeds `timeout` fails like any other fetch error.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "fetching");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("requesting {url}"))?;
        if !resp.status().is_success() {
            bail!("{url}: HTTP {}", resp.status());
        }
        resp.text()
            .await
            .with_context(|| format!("reading body of {url}"))
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<PageContent> {
        let html = self.get_text(url).await?;
        extract_content(url, &html)
    }

    async fn fetch_body(&self, url: &str) -> Result<String> {
        let html = self.get_text(url).await?;
        Ok(extract_body(&html))
    }
}

fn extract_content(page_url: &str, html: &str) -> Result<PageContent> {
    let base = Url::parse(page_url).with_context(|| format!("invalid page url {page_url}"))?;
    let doc = Html::parse_document(html);
    let sel_title = Selector::parse("title").unwrap();
    let sel_a = Selector::parse("a[href]").unwrap();
    let sel_img = Selector::parse("img[src]").unwrap();

    let title = doc
        .select(&sel_title)
        .next()
        .map(|n| n.text().collect::<String>())
        .unwrap_or_default()
        .trim()
        .to_string();

    let mut links = Vec::new();
    for a in doc.select(&sel_a) {
        if let Some(href) = a.value().attr("href") {
            if let Some(url) = absolutize(&base, href) {
                let anchor = a.text().collect::<String>().trim().to_string();
                links.push(OutboundLink { url, anchor });
            }
        }
    }
    // Inline images count as references too; the alt text is the anchor.
    for img in doc.select(&sel_img) {
        if let Some(src) = img.value().attr("src") {
            if let Some(url) = absolutize(&base, src) {
                let anchor = img.value().attr("alt").unwrap_or("").to_string();
                links.push(OutboundLink { url, anchor });
            }
        }
    }

    Ok(PageContent { title, links, body: extract_body(html) })
}

fn extract_body(html: &str) -> String {
    let doc = Html::parse_document(html);
    let sel_body = Selector::parse("body").unwrap();
    doc.select(&sel_body)
        .next()
        .map(|n| n.text().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn absolutize(base: &Url, href: &str) -> Option<String> {
    let resolved = Url::parse(href).or_else(|_| base.join(href)).ok()?;
    if resolved.scheme().starts_with("http") {
        Some(resolved.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html>
      <head><title> Alpha Site </title></head>
      <body>
        <p>Welcome to alpha.</p>
        <a href="/about">About us</a>
        <a href="http://www.b.com/page">Bravo</a>
        <a href="mailto:someone@a.com">mail</a>
        <img src="logo.png" alt="the logo">
      </body>
    </html>"#;

    #[test]
    fn extracts_title_links_and_images() {
        let content = extract_content("http://www.a.com/", PAGE).unwrap();
        assert_eq!(content.title, "Alpha Site");
        assert_eq!(content.links.len(), 3);
        assert_eq!(content.links[0].url, "http://www.a.com/about");
        assert_eq!(content.links[0].anchor, "About us");
        assert_eq!(content.links[1].url, "http://www.b.com/page");
        assert_eq!(content.links[2].url, "http://www.a.com/logo.png");
        assert_eq!(content.links[2].anchor, "the logo");
    }

    #[test]
    fn body_text_is_flattened() {
        let body = extract_body(PAGE);
        assert!(body.contains("Welcome to alpha."));
        assert!(!body.contains('<'));
    }
}
