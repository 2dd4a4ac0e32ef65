//! Loading route definitions for the binary.
//!
//! - [`route_file`] - route definition JSON and table construction

mod route_file;

pub use route_file::{build_tables, load_route_file, HopSpec, RouteFile, RouteSpec};
