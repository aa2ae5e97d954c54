pub mod layout;
pub mod rfid;
pub mod user;
