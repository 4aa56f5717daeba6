//! Bus group names.
//!
//! Groups are opaque strings on the wire. Four kinds exist: the global
//! `displays` and `shells` groups, and one display group plus one shell
//! group per display slug.

use std::fmt;

use super::DisplaySlug;

const ALL_DISPLAYS: &str = "displays";
const ALL_SHELLS: &str = "shells";
const DISPLAY_PREFIX: &str = "display_";
const SHELL_PREFIX: &str = "shell_";

/// Name of a broadcast group on the [`crate::bus::GroupBus`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupName(String);

impl GroupName {
    /// The group every display session joins.
    #[must_use]
    pub fn all_displays() -> Self {
        Self(ALL_DISPLAYS.to_string())
    }

    /// The group every remote-shell session joins.
    #[must_use]
    pub fn all_shells() -> Self {
        Self(ALL_SHELLS.to_string())
    }

    /// The per-display group, e.g. `display_lobby`.
    #[must_use]
    pub fn display(slug: &DisplaySlug) -> Self {
        Self(format!("{DISPLAY_PREFIX}{slug}"))
    }

    /// The per-display remote-shell group, e.g. `shell_lobby`.
    #[must_use]
    pub fn shell(slug: &DisplaySlug) -> Self {
        Self(format!("{SHELL_PREFIX}{slug}"))
    }

    /// Wraps a group name received from the shared backend.
    pub(crate) fn from_wire(raw: &str) -> Self {
        Self(raw.to_string())
    }

    /// Returns the group name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn per_display_groups_are_derived_from_slug() {
        let Ok(slug) = DisplaySlug::parse("foyer") else {
            panic!("valid slug");
        };
        assert_eq!(GroupName::display(&slug).as_str(), "display_foyer");
        assert_eq!(GroupName::shell(&slug).as_str(), "shell_foyer");
    }

    #[test]
    fn global_groups_are_distinct() {
        assert_ne!(GroupName::all_displays(), GroupName::all_shells());
    }
}
