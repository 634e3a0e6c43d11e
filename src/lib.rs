// Library exports for Angelic
// The binary and the integration tests both build on these modules

pub mod auth;
pub mod booking;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod feedback;
pub mod members;
pub mod reports;
pub mod routes;
pub mod state;
