//! Name directories for mrk.
//!
//! Slack messages refer to users, channels and user groups by opaque IDs
//! (`U024BE7LH`, `C024BE91L`, `SAZ94GDB8`). This crate provides the
//! [`Directory`] trait used by the transformer to turn those IDs into
//! display names.
//!
//! # Implementations
//!
//! - [`NameDirectory`]: In-memory maps, built in code or loaded from JSON
//! - [`NullDirectory`]: Always misses, so every reference falls back
//!
//! # Example
//!
//! ```
//! use mrk_directory::{Directory, NameDirectory};
//!
//! let directory = NameDirectory::new()
//!     .with_user("U024BE7LH", "alice")
//!     .with_channel("C024BE91L", "general");
//! assert_eq!(directory.user_name("U024BE7LH"), Some("alice"));
//! assert_eq!(directory.usergroup_name("SAZ94GDB8"), None);
//! ```

mod names;

pub use names::{DirectoryError, NameDirectory};

/// Read-only lookup of display names by Slack ID.
///
/// Implementations must be safe to share between threads; the transformer
/// only ever reads from a directory.
pub trait Directory: Send + Sync {
    /// Display name of a user (`U...` or `W...` ID).
    fn user_name(&self, id: &str) -> Option<&str>;

    /// Name of a channel (`C...` ID), without the leading `#`.
    fn channel_name(&self, id: &str) -> Option<&str>;

    /// Handle of a user group (`S...` ID), without the leading `@`.
    fn usergroup_name(&self, id: &str) -> Option<&str>;
}

/// [`Directory`] that knows no names.
///
/// Use when no directory export is available. Every mention resolves to its
/// fallback placeholder.
pub struct NullDirectory;

impl Directory for NullDirectory {
    fn user_name(&self, _id: &str) -> Option<&str> {
        None
    }

    fn channel_name(&self, _id: &str) -> Option<&str> {
        None
    }

    fn usergroup_name(&self, _id: &str) -> Option<&str> {
        None
    }
}

impl<D: Directory + ?Sized> Directory for &D {
    fn user_name(&self, id: &str) -> Option<&str> {
        (**self).user_name(id)
    }

    fn channel_name(&self, id: &str) -> Option<&str> {
        (**self).channel_name(id)
    }

    fn usergroup_name(&self, id: &str) -> Option<&str> {
        (**self).usergroup_name(id)
    }
}

impl<D: Directory + ?Sized> Directory for Box<D> {
    fn user_name(&self, id: &str) -> Option<&str> {
        (**self).user_name(id)
    }

    fn channel_name(&self, id: &str) -> Option<&str> {
        (**self).channel_name(id)
    }

    fn usergroup_name(&self, id: &str) -> Option<&str> {
        (**self).usergroup_name(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_directory_always_misses() {
        let directory = NullDirectory;

        assert_eq!(directory.user_name("U024BE7LH"), None);
        assert_eq!(directory.channel_name("C024BE91L"), None);
        assert_eq!(directory.usergroup_name("SAZ94GDB8"), None);
    }

    #[test]
    fn test_boxed_directory_delegates() {
        let directory: Box<dyn Directory> =
            Box::new(NameDirectory::new().with_usergroup("SAZ94GDB8", "oncall"));

        assert_eq!(directory.usergroup_name("SAZ94GDB8"), Some("oncall"));
        assert_eq!(directory.user_name("SAZ94GDB8"), None);
    }
}
