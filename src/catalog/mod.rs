//! Flat-file catalog persistence split across logical submodules.

mod amplifiers;
mod headphones;
mod store;

pub use amplifiers::{append_amplifier, load_amplifiers};
pub use headphones::{append_headphone, load_headphones};
pub use store::{CatalogError, CatalogStore};
