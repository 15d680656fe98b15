//! Service layer for Subcast
//!
//! Batch orchestration shared by every front end:
//!
//! - `batch`: parse community files, resolve flairs, post to each community
//! - `events`: progress event distribution
//!
//! # Example
//!
//! ```no_run
//! use libsubcast::service::batch::{self, FirstFlair};
//! use libsubcast::service::events::EventBus;
//! use libsubcast::{ApiClient, BearerToken, PostRequest};
//!
//! # async fn example() -> libsubcast::Result<()> {
//! let api = ApiClient::new("http://localhost:8000", BearerToken::new("token"))?;
//! let events = EventBus::default();
//!
//! let communities = batch::parse_communities("r/learnpython\nr/python\n");
//! let plan = batch::resolve_flairs(&api, &communities, &mut FirstFlair, &events).await?;
//! let report = batch::submit_all(&api, &plan, &PostRequest::text("Hi", "Hello"), &events).await;
//!
//! println!("Total successful posts: {}", report.success_count());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod events;

pub use batch::{BatchReport, FirstFlair, FlairSelector, Outcome, PlannedPost};
pub use events::{Event, EventBus, EventReceiver};
