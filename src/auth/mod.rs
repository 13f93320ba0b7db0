pub mod identity;
pub mod session;

pub use identity::{Identity, RequestIdentity};
