//! Release-once resources.

use std::fmt;

/// A resource with a single, idempotent release operation.
pub trait Disposable {
    /// Release the resource. Calling this again does nothing.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

/// Owned token for an artifact created by a registration call, such as a
/// remote cursor decoration.
///
/// Dropping the handle does not release the artifact; the adapter that
/// created it cleans up on its own disposal.
#[must_use = "keep the handle to be able to remove the artifact"]
pub struct DisposeHandle {
    release: Option<Box<dyn FnOnce()>>,
}

impl DisposeHandle {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Disposable for DisposeHandle {
    fn dispose(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    fn is_disposed(&self) -> bool {
        self.release.is_none()
    }
}

impl fmt::Debug for DisposeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposeHandle")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
