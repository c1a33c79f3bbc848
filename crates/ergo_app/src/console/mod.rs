//! Line-oriented terminal presentation of a backend session.
mod app;
pub mod input;
pub mod render;
pub mod typeahead;

pub use app::{apply_action, run, Flow};
