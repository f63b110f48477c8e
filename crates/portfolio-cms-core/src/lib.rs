//! Core library for the portfolio CMS dashboard.
//!
//! Front ends construct one [`api::RequestGateway`], wrap it in an
//! [`api::ApiClient`], and hand that to a single [`auth::SessionStore`].

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
