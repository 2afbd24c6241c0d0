pub mod error;
pub mod table;
pub mod csv_store;
pub mod memory;
pub mod cells;

pub use error::DatabaseError;
pub use table::{Table, TableStore};
pub use csv_store::CsvTableStore;
pub use memory::InMemoryTableStore;
