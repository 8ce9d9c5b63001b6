pub mod config;
pub mod logging;

pub mod archive;
pub mod crawl;
pub mod download;
pub mod html;
pub mod http;
pub mod listing;
pub mod names;
pub mod outcome;
pub mod topic;
