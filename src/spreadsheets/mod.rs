pub mod export_xlsx;
pub mod listings_csv;

pub use export_xlsx::listings_to_xlsx;
pub use listings_csv::{listings_from_csv, listings_to_csv};
