pub mod branches;
pub mod client;
pub mod contents;

pub use client::{GitHubClientConfig, GitHubContentsClient};
