//! Data models for jobdeck accounts and auth flows.
//!
//! This module contains the structures exchanged with the API:
//!
//! - `UserSummary`, `Role`, `ProfileCompletion`: account data
//! - Request bodies for register/login/verify/reset operations
//! - `AuthResponse`, `MessageResponse`, `ApiErrorBody`: response payloads

pub mod auth;
pub mod user;

pub use auth::{
    ApiErrorBody, AuthResponse, EmailRequest, LoginRequest, MessageResponse, OauthProvider,
    RegisterRequest, ResetPasswordRequest, VerifyEmailRequest,
};
pub use user::{ProfileCompletion, Role, UserSummary};
