pub mod auth;
pub mod category;
pub mod comment;
pub mod feed;
pub mod post;
pub mod user;
pub mod visibility;
