pub mod client;

pub use client::{describe_error, fetch, status_reason, HttpClientBuilder};
