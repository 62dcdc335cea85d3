//! Mapping between `RESOLVE_*` names and the resolution bitmask.

use std::ffi::OsStr;

use walk::ResolveFlags;

use crate::error::ConfigError;

/// One recognised command-line flag name and the bit it sets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResolveFlagName {
    name: &'static str,
    flags: ResolveFlags,
}

impl ResolveFlagName {
    const fn new(name: &'static str, flags: ResolveFlags) -> Self {
        Self { name, flags }
    }

    /// The name as accepted on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }

    /// The resolution bit the name selects.
    #[must_use]
    pub const fn flags(self) -> ResolveFlags {
        self.flags
    }
}

/// Every flag name the command line accepts, in kernel bit order.
pub const RESOLVE_FLAG_NAMES: [ResolveFlagName; 6] = [
    ResolveFlagName::new("RESOLVE_NO_XDEV", ResolveFlags::NO_XDEV),
    ResolveFlagName::new("RESOLVE_NO_MAGICLINKS", ResolveFlags::NO_MAGICLINKS),
    ResolveFlagName::new("RESOLVE_NO_SYMLINKS", ResolveFlags::NO_SYMLINKS),
    ResolveFlagName::new("RESOLVE_BENEATH", ResolveFlags::BENEATH),
    ResolveFlagName::new("RESOLVE_IN_ROOT", ResolveFlags::IN_ROOT),
    ResolveFlagName::new("RESOLVE_CACHED", ResolveFlags::CACHED),
];

/// Looks up a flag by its exact, case-sensitive name.
#[must_use]
pub fn lookup(name: &OsStr) -> Option<ResolveFlags> {
    RESOLVE_FLAG_NAMES
        .iter()
        .find(|entry| name == entry.name)
        .map(|entry| entry.flags)
}

/// ORs the named flags together.
///
/// Repeated names are accepted. The first unrecognised name is returned as
/// [`ConfigError::UnknownFlag`].
pub fn parse_flags<I, S>(names: I) -> Result<ResolveFlags, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    names.into_iter().try_fold(ResolveFlags::empty(), |acc, name| {
        let name = name.as_ref();
        lookup(name)
            .map(|flag| acc | flag)
            .ok_or_else(|| ConfigError::UnknownFlag(name.to_os_string()))
    })
}
