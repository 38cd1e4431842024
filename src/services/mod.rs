//! Service layer shared by the CLI and the HTTP server.

pub mod crawl;

pub use crawl::Crawler;
