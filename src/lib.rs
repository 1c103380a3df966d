//! Contactbook Server - HTTP REST API for contact management
//!
//! This crate provides an HTTP server exposing CRUD and search operations
//! over a single contact collection backed by MongoDB. It supports:
//!
//! - **Create/List/Search/Update/Delete**: full contact lifecycle with
//!   required-field and email-format validation
//! - **Email uniqueness**: application-level early reject plus a unique
//!   index at the storage layer
//! - **Middleware**: CORS (open or origin-restricted), request ID tracking,
//!   structured logging, compression, timeouts
//! - **Configuration**: environment variable and file-based configuration
//! - **Graceful Shutdown**: proper signal handling for deployments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use contactbook::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     contactbook::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `POST /api/contacts` - Create a contact
//! - `GET /api/contacts` - List all contacts, newest first
//! - `GET /api/contacts/search?query=...` - Substring search on name/email
//! - `PUT /api/contacts/{id}` - Replace a contact's fields
//! - `DELETE /api/contacts/{id}` - Delete a contact
//!
//! Error responses always carry a JSON body of the form
//! `{"error": "<message>"}`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod model;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use model::{Contact, ContactInput};
pub use server::{build_router, start_server};
pub use state::ServerState;
