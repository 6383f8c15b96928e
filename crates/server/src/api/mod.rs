pub mod admin;
pub mod catalog;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use routes::create_router;
