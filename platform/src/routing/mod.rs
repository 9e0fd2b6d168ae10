//! Artifact routing: subdomain-to-storage reverse proxy

pub mod proxy;
pub mod rewrite;
