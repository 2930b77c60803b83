#![doc = "The `taskledger` library crate."]
#![doc = ""]
#![doc = "Multi-tenant task tracking: companies, their users, and the tasks those users own."]
#![doc = "The crate holds the domain models, storage backends, directories, authentication,"]
#![doc = "routing and error handling; `main.rs` wires them into an Actix Web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
