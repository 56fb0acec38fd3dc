pub mod error;
pub mod id;
pub mod time;

pub use error::{Result, StoreError};
pub use id::DocumentId;
