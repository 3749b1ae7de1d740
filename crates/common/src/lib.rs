//! Types shared by the Reddit client crates and the crawler binary

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
