pub mod layout;
pub mod rfid;
pub mod shared;
pub mod user;
