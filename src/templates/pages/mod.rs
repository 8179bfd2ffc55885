pub mod home;
pub mod results;
pub mod runs;

pub use home::home_page;
pub use results::results_page;
pub use runs::runs_page;
