pub mod database;
pub mod jwt;
pub mod pagination;
pub mod rate_limit;
