pub mod api;
pub mod collect;
pub mod config;
pub mod display;
pub mod error;
pub mod http_client;
pub mod logging;
pub mod model;
pub mod pages;
pub mod persist;
pub mod render;
pub mod snapshot;
pub mod stats;
