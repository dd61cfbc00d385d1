// src/lib.rs

//! shopscout: storefront search scraper library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod services;
pub mod utils;
