//! Output formatting for route tables and lookups.
//!
//! - [`csv`] - CSV rows of flattened routes
//! - [`terminal`] - Field formatting and colored match reports

mod csv;
mod terminal;

pub use csv::{csv_row, print_route_rows, print_table};
pub use terminal::{format_field, match_report, print_match};
