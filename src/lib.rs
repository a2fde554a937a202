#![allow(dead_code)]

pub mod cache;
pub mod classifier;
pub mod config;
pub mod context;
pub mod error;
pub mod extractor;
pub mod handler;
pub mod host;
pub mod loader;
pub mod model;
pub mod router;
pub mod scope;
pub mod server;
pub mod util;
