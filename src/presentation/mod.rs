pub mod admin;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
