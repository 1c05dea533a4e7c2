pub mod admin;
pub mod artisans;

pub use admin::*;
pub use artisans::*;
