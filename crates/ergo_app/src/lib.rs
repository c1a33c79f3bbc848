//! Terminal console for the Ergodeon agent backend.
pub mod config;
pub mod console;
