// src/services/mod.rs
//
// Business rules between the HTTP handlers and the repository.

pub mod admin;
pub mod auth;
pub mod filter;
pub mod notifications;
pub mod oauth;
pub mod posts;
pub mod reactions;
