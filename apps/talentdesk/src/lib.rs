pub mod api_client;
pub mod config;
pub mod errors;
pub mod models;
pub mod resume;
pub mod roster;
pub mod state;

#[cfg(test)]
mod testing;
