//! Token sale front end: page state, view selection, rendering and the
//! controller that drives reads and transactions.

pub mod app;
pub mod render;
pub mod state;

pub use app::{ActionOutcome, IcoApp};
pub use render::render_page;
pub use state::{IcoState, View};
