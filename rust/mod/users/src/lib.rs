//! Users module — session-based authentication and self-service user CRUD.
//!
//! # Resources
//!
//! - **User** — username + salted password hash, owner-editable
//! - **Session** — server-side cookie session carrying the login identity
//!   and one-shot flash messages
//!
//! # Usage
//!
//! ```ignore
//! use doorman_users::{UsersModule, service::UsersConfig};
//!
//! let module = UsersModule::new(sql, UsersConfig::default())?;
//! let router = module.routes(); // Mount under /users
//! ```
//!
//! The session middleware in [`api::middleware`] must wrap the whole
//! application so that every page (including the home page) sees the
//! current session and its pending flash messages.

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use doorman_core::Module;
use doorman_sql::SqlStore;

use crate::service::{UserService, UsersConfig};

/// Users module implementing the Module trait.
pub struct UsersModule {
    service: Arc<UserService>,
}

impl UsersModule {
    /// Create a new UsersModule, initializing the storage schema.
    pub fn new(
        sql: Arc<dyn SqlStore>,
        config: UsersConfig,
    ) -> Result<Self, doorman_core::ServiceError> {
        let service = UserService::new(sql, config).map_err(doorman_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying UserService.
    pub fn service(&self) -> &Arc<UserService> {
        &self.service
    }
}

impl Module for UsersModule {
    fn name(&self) -> &str {
        "users"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
