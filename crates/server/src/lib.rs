pub mod api;
pub mod bot;
pub mod metrics;
pub mod state;
