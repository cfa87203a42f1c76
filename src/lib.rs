//! Core library surface for the amplify TUI, a tool for matching headphones
//! with amplifiers. The public modules expose an intentionally small API so
//! the `bin` target as well as the tests can reuse the same pieces: the
//! flat-file catalogs, the acoustic-electrical formulas, and the selection
//! state the presentation layer renders.

pub mod calc;
pub mod catalog;
pub mod models;
pub mod selection;
pub mod ui;

/// Convenience re-exports for the persistence layer, typically used by
/// `main.rs` to locate the catalog files and preload both catalogs.
pub use catalog::{load_amplifiers, load_headphones, CatalogError, CatalogStore};

/// The two primary domain types that other layers manipulate.
pub use models::{Amplifier, Headphone};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
