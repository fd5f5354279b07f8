pub mod api;
pub mod models;
pub mod read_marker;

pub use models::*;
pub use read_marker::{ConversationKind, ReadMarkerKey};
