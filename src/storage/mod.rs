pub mod collection;
pub mod memory;
pub mod update;

pub use collection::{Collection, ID_FIELD};
pub use memory::DocumentStore;
pub use update::{UpdateOutcome, UpdateSpec};
