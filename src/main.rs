//! Binary entry point that glues the flat-file catalogs to the TUI. The
//! bootstrapping pipeline: resolve the data directory, seed starter catalogs
//! on first run, load both catalogs into memory, and drive the Ratatui event
//! loop until the user exits.

use amplify::{load_amplifiers, load_headphones, run_app, App, CatalogStore};

/// Initialize the catalog store, load the data, and launch the event loop.
///
/// Returning a `Result` bubbles up fatal initialization problems (for
/// example an unreadable data directory) to the terminal instead of crashing
/// silently.
fn main() -> anyhow::Result<()> {
    let store = CatalogStore::open()?;
    store.seed_if_missing()?;

    let headphones = load_headphones(&store)?;
    let amplifiers = load_amplifiers(&store)?;

    let mut app = App::new(store, headphones, amplifiers);
    run_app(&mut app)
}
