// src/models/mod.rs

pub mod category;
pub mod comment;
pub mod moderation;
pub mod notification;
pub mod post;
pub mod reaction;
pub mod user;
