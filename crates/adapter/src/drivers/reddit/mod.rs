mod client;
mod listing;

pub use client::{RedditClient, RedditConfig, DEFAULT_API_BASE, DEFAULT_AUTH_BASE, DEFAULT_USER_AGENT};
