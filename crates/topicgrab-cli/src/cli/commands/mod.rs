//! CLI command handlers.

mod crawl;

pub use crawl::run_crawl;
