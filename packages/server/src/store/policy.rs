use std::collections::HashSet;

/// Decides which business keys may be updated or deleted.
pub trait MutationPolicy: Send + Sync {
    fn is_key_mutable(&self, key: &str) -> bool;
}

/// Only the listed keys may be modified.
#[derive(Debug, Clone, Default)]
pub struct KeyAllowList {
    keys: HashSet<String>,
}

impl KeyAllowList {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl MutationPolicy for KeyAllowList {
    fn is_key_mutable(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}
