pub mod handlers;
pub mod limits;
pub mod usage;
