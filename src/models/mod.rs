pub mod connections;
pub mod diff;
pub mod schema;
