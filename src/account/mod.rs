pub mod commands;
pub mod extract;
pub mod jwt;
pub mod model;
pub mod password;

pub use extract::{AnyUser, AuthContext, Buyer, Seller};
