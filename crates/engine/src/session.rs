//! The "current user" pointer.
//!
//! There is one pointer for the whole process, shared by every request: two
//! operators switching users at the same time overwrite each other and the
//! last write wins. All reads and writes go through [`CurrentUser`] so the
//! sharing stays visible.

use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default)]
pub struct CurrentUser(RwLock<Option<i32>>);

impl CurrentUser {
    pub fn new(user_id: Option<i32>) -> Self {
        Self(RwLock::new(user_id))
    }

    pub fn get(&self) -> Option<i32> {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, user_id: i32) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Some(user_id);
    }

    pub fn clear(&self) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Point at `next` only if the pointer still references `expected`.
    ///
    /// Returns `true` when the pointer was changed.
    pub fn replace_if(&self, expected: i32, next: Option<i32>) -> bool {
        let mut guard = self.0.write().unwrap_or_else(PoisonError::into_inner);
        if *guard != Some(expected) {
            return false;
        }
        *guard = next;
        true
    }
}
