pub mod alerts_feed;
pub mod filters;
pub mod insight_store;
pub mod ports;

pub use alerts_feed::{build_alerts_feed, AlertsFeed, FeedItem, FeedQuery, FeedType};
pub use insight_store::{InsightCaches, InsightStore};
