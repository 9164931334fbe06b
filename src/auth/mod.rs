mod jwt;

pub use jwt::{Caller, Claims, JwtKeys};
