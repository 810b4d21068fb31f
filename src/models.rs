pub mod audit;
pub mod auth;
pub mod customer;
pub mod ledger;
pub mod restaurant;
