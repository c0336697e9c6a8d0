//! Desktop viewer: load drinks and food, filter, inspect and chart them.

pub mod app;
pub mod panels;
pub mod plot;
pub mod state;

pub use app::LatteApp;
