pub mod aggregate;
pub mod criteria;
pub mod extract;
pub mod listing;
pub mod validate;

pub use aggregate::aggregate;
pub use criteria::{SearchCriteria, StartRequest};
pub use listing::{Bhk, CanonicalListing, RawListing, ReraStatus, Source};
pub use validate::validate;
