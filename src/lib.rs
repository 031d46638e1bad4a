// Car Rental System - Core Library
// Catalog store, search and booking; used by the CLI/TUI shell and tests

pub mod error;
pub mod catalog;
pub mod search;
pub mod booking;
pub mod config;

// Re-export commonly used types
pub use error::{RentalError, Result};
pub use catalog::{
    Car, Catalog, LoadReport, RowIssue, RowIssueKind,
    load, save, load_catalog, load_for_rewrite, save_catalog,
};
pub use search::{SearchQuery, search, search_cars};
pub use booking::{
    BookingRequest, PriceBreakdown, Receipt,
    book_car, book_car_at, book_from_form_at, render_receipt, parse_days,
    TAX_RATE, SERVICE_CHARGE_RATE,
};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
