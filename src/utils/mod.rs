pub mod cookie;
pub mod hash;
pub mod image;
pub mod validate;
