pub mod backend;
pub mod client;
pub mod error;

pub use backend::Backend;
pub use client::ApiClient;
pub use error::ApiError;
