pub mod repository;
pub mod transaction;
pub mod version;

pub use repository::{TRANSACTION_COLLECTION, TransactionRepository};
pub use transaction::{Transaction, TransactionListing, TransactionPatch};
pub use version::{
    VERSION_COLLECTION, VersionDirectory, VersionId, VersionLookup, VersionRecord,
};
