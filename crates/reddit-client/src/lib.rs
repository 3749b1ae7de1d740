//! Reddit resource API client
//!
//! Wraps the token library from `reddit-auth` in a [`Session`] that keeps
//! tokens fresh, honours the rate-limit headers, retries backend failures,
//! and pages through listings.
//!
//! Call flow:
//! 1. `Session::builder(credentials)...build()` once per application
//! 2. Endpoint methods (`me`, `list_subreddit_links`, ...) run through the
//!    executor: token, throttle, send, classify
//! 3. `crawl_*` methods turn a listing endpoint into a `Stream` of pages

pub mod crawl;
pub mod error;
pub mod listeners;
pub mod listing;
pub mod metrics;
pub mod ratelimit;
pub mod session;

pub use crawl::crawl;
pub use error::{Error, ErrorClass, Result};
pub use listeners::{ListenerId, TokenListener};
pub use listing::{Listing, ListingQuery, Named, Sort, Thing, UserListing, VoteDirection};
pub use ratelimit::{MIN_REMAINING_REQUEST_THRESHOLD, RateLimiter};
pub use session::{ApiRequest, DEFAULT_MAX_RETRY, Session, SessionBuilder};
