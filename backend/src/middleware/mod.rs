pub mod auth;
pub mod client_metadata;
pub mod logging;
pub mod request_id;

pub use auth::*;
pub use logging::*;
pub use request_id::*;
