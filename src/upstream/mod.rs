//! Upstream Module
//!
//! Client for the single site this proxy mirrors.

mod client;

pub use client::UpstreamClient;
