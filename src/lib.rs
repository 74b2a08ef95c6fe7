//! Schema comparison between a primary and a comparison database.
//!
//! Providers in [`db`] introspect MySQL, PostgreSQL or a JSON dump into the
//! [`models::schema`] model. [`compare::Diff`] walks both schemas and hands
//! one [`models::diff::DiffRecord`] per check to an [`output::Output`] sink.

pub mod client;
pub mod compare;
pub mod db;
pub mod errors;
pub mod models;
pub mod output;
