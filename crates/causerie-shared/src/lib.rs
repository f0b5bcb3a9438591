//! # causerie-shared
//!
//! Types shared by every Causerie crate: id newtypes, domain constants,
//! display-timestamp formatting and the cosmetic conversation palette.

pub mod color;
pub mod constants;
pub mod time;
pub mod types;

pub use types::{ChatId, MessageId, UserId};
