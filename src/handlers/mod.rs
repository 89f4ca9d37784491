pub mod auth;
pub mod category;
pub mod comment;
pub mod post;
pub mod user;

pub use auth::*;
