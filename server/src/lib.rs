pub mod auth;
pub mod config;
pub mod db;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;
