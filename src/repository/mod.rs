// src/repository/mod.rs
//
// SQL access, one module per aggregate. Every function takes an executor so it
// can run against the pool or inside a transaction.

pub mod admin;
pub mod categories;
pub mod comments;
pub mod filter;
pub mod notifications;
pub mod posts;
pub mod reactions;
pub mod sessions;
pub mod users;
