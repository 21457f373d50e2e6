//! Naver OAuth login with JWT issuance.
//!
//! `GET /oauth/naver/login-url` hands out the provider authorize URL and a
//! one-time `state`; `GET /oauth/naver/callback` exchanges the code, reads the
//! profile, signs an access/refresh token pair and redirects the browser to the
//! front end with the tokens (or to its error page).

pub mod auth;
pub mod edge;
pub mod error;
pub mod handlers;
pub mod models;
