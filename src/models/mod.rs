//! Data models for the StudyHub resources.
//!
//! Field names follow the backend's JSON contract; videos are the one resource whose wire
//! format (snake_case) differs from the view-model the screens consume.

mod dashboard;
mod document;
mod forum;
mod params;
mod serde_helpers;
mod study_event;
mod user;
mod video;

pub use dashboard::*;
pub use document::*;
pub use forum::*;
pub use params::*;
pub use study_event::*;
pub use user::*;
pub use video::*;
