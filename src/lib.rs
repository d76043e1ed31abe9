pub mod app;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod reviews;
pub mod state;
