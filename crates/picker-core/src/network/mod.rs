//! Network helpers shared by the API client and the feed.

mod retry;

pub use retry::{retry_async, RetryPolicy, RetryStats};
