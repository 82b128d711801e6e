//! Order PDF generation: data model, document builder and HTTP handlers.

pub mod builder;
pub mod handlers;
pub mod models;

pub use handlers::config;
