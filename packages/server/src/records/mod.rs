//! Concrete record kinds managed by [`crate::store::KeyedStore`].

mod layout;
mod rfid;
mod user;

pub use layout::{Layout, LayoutFields, LayoutPatch};
pub use rfid::RfidEntry;
pub use user::{User, UserFields, UserPatch};

fn require_text(value: &str, what: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{what} must not be empty"));
    }
    Ok(())
}
