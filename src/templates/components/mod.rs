pub mod error;
pub mod import_form;
pub mod listing;

pub use error::error_page;
pub use import_form::import_form;
pub use listing::listing_card;
