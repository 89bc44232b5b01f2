//! Authenticated HTTP access to the DAM API
//!
//! Every outbound request passes through `AuthInterceptor`: the current
//! token is resolved from `dam_auth::TokenStore` first, and a request with
//! no usable token is never sent. A 401 response invalidates the session.
//! The clients only return typed errors; routing the user back into the
//! authorization flow is the caller's job.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod metrics;
pub mod models;

#[cfg(test)]
mod test_support;

pub use api::DamApi;
pub use client::{Blob, DamClient};
pub use config::ApiConfig;
pub use error::{Error, Result};
pub use interceptor::{AuthInterceptor, ClientKind};
pub use models::{Asset, Folder, Media};
