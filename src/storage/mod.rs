pub mod dataset;
pub mod items;
pub mod table;

pub use dataset::DatasetHandle;
pub use items::Item;
pub use table::{StorageError, TableSource, TransactionTable};
