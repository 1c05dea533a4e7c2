pub mod csv;
pub mod jwt;
pub mod pdf;
pub mod time;
