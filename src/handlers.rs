pub mod auth;
pub mod common;
pub mod product_admin;
pub mod restaurant_admin;
