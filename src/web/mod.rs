pub mod auth_service;
pub mod delivery_service;
pub mod errors;
pub mod pages;
pub mod production_service;
pub mod report_service;
