// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod comments;
pub mod filter;
pub mod moderation;
pub mod notifications;
pub mod oauth;
pub mod posts;
pub mod reactions;
