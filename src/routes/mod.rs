//! HTTP route handlers

pub mod auth;
pub mod company;
pub mod health;
