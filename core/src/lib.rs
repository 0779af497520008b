pub mod fetch;
pub mod graph;
pub mod index;
pub mod page;
pub mod persist;
pub mod query;
pub mod rank;

pub use fetch::{ContentFetcher, OutboundLink, PageContent};
pub use graph::{LinkGraph, LinkGraphBuilder};
pub use index::InvertedIndex;
pub use page::{Page, PageId};
pub use query::{QueryOutcome, QueryResolver, SearchHit};
pub use rank::RankEngine;
