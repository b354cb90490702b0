pub mod recovery_service;
pub mod sale_service;
pub mod user_service;
