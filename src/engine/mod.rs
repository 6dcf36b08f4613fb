// Image cache engine: freshness, fetching and periodic refresh.

pub mod cache;
pub mod coordinator;
pub mod downloader;
pub mod scheduler;
pub mod service;
pub mod stats;
