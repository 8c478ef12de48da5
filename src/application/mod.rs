pub mod admin_service;
pub mod service;
