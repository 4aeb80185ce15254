//! Data layer for poster-style market reports

pub mod parsers;
pub mod services;
pub mod templates;
pub mod types;
