pub mod driver;
pub mod report;
pub mod suite;
pub mod utils;

// Re-export common items
pub use report::generate_report;
pub use suite::run_suite;
