pub mod kezad_layout;
pub mod rfid_entry;
pub mod user;
