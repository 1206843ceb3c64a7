pub mod checkin;
pub mod conversation;
pub mod journey;
pub mod user;
