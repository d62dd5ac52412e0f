// Triage: severity and category classification for civic issue reports.
//
// This is the library root. `classify` holds the decision engine; the rest
// wires it to models, image fetching, the terminal and HTTP.

pub mod classify;
pub mod config;
pub mod fetch;
pub mod models;
pub mod output;
pub mod status;

#[cfg(feature = "web")]
pub mod web;
