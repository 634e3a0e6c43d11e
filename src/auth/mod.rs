pub mod claims;
pub mod guard;
pub mod handlers;
pub mod password;
pub mod session;

pub use claims::{authorize, Claims};
