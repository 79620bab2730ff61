use axum::Router;

/// A business module that contributes HTTP routes.
///
/// The server binary collects all modules and nests each one's routes
/// under `/{name}`.
pub trait Module: Send + Sync {
    /// Module name, used for logging and as the route prefix.
    fn name(&self) -> &str;

    /// Return the module's routes, to be nested under `/{name}`.
    fn routes(&self) -> Router;
}
