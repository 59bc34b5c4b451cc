pub mod certificates;
pub mod config;
pub mod db;
pub mod environment;
pub mod errors;
pub mod normalization;
pub mod rarity;
pub mod record;
pub mod render;
pub mod request;
pub mod routes;
pub mod store;
pub mod traits;
pub mod urls;
pub mod worker;
