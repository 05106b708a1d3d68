//! REST API client module for the jobdeck backend.
//!
//! This module provides the `ApiClient` for talking to the auth and
//! profile endpoints, plus the `ApiError` classification of non-2xx
//! responses.
//!
//! The API uses JWT bearer token authentication; the token is issued by
//! `POST /auth/login` or the OAuth callback exchange.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
