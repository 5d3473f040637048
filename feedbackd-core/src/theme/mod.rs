//! Theme file model, search-path loading, parent-chain resolution, and the
//! live `ThemeStore` the orchestrator reloads on SIGHUP.

mod loader;
mod model;
mod resolver;

pub use loader::load_active_theme;
pub use model::{Theme, ThemeFile, ThemeFileFeedback, ThemeFileProfile};
pub use resolver::ThemeStore;
