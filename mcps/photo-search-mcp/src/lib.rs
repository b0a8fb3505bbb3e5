//! Photo Search MCP Library
//!
//! Tag search over the Flickr public photo feed with a persistent history of
//! recent searches and client-side sorting, filtering and paging.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use photo_search_mcp::{Config, SearchSessionController};
//!
//! let session = SearchSessionController::from_config(&Config::load()?)?;
//! let snapshot = session.search("cats").await;
//! println!("{} photos", snapshot.projected_view.total_count);
//! ```
//!
//! # Configuration
//! Set `PHOTO_FEED_URL` / `PHOTO_FEED_TRANSPORT` env vars or configure in
//! `~/.binks/photo-search.toml`

pub mod analytics;
pub mod config;
pub mod error;
pub mod feed;
pub mod history;
pub mod init;
pub mod projector;
pub mod server;
pub mod session;
pub mod types;

pub use config::Config;
pub use error::{FeedError, StorageError};
pub use feed::PhotoFeedClient;
pub use history::SearchHistoryStore;
pub use projector::project;
pub use server::PhotoSearchMcpServer;
pub use session::{SearchSessionController, SessionSnapshot};

// Re-export parameter types for direct API usage
pub use server::{ChangeViewParams, PhotoParams, SearchParams};
