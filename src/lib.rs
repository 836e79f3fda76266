pub mod app;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod resources;

#[cfg(test)]
pub mod testing;
