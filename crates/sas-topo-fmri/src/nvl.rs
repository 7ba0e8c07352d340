//! The structured (nvlist-like) form an FMRI string decodes to.

/// Whether the authority identifies a single vertex (`pathnode`) or an
/// entire path from the initiator (`path`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityKind {
    Path,
    Pathnode,
}

impl AuthorityKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Pathnode => "pathnode",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(Self::Path),
            "pathnode" => Some(Self::Pathnode),
            _ => None,
        }
    }
}

/// The authority segment: `type=<kind>[:start-phy=<n>:end-phy=<n>]`.
///
/// `phy_range` is `Some((start, end))` only when the FMRI addresses a wide
/// or narrow port explicitly; both fields are present together or both
/// absent — there is no sentinel "unset" half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authority {
    pub kind: AuthorityKind,
    pub phy_range: Option<(u32, u32)>,
}

impl Authority {
    #[must_use]
    pub fn new(kind: AuthorityKind) -> Self {
        Self {
            kind,
            phy_range: None,
        }
    }

    #[must_use]
    pub fn with_phy_range(kind: AuthorityKind, start_phy: u32, end_phy: u32) -> Self {
        Self {
            kind,
            phy_range: Some((start_phy, end_phy)),
        }
    }
}

/// One `name=<hex64>` path component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathComponent {
    pub name: String,
    pub id: u64,
}

impl PathComponent {
    #[must_use]
    pub fn new(name: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

/// The full decoded form of a `sas://` FMRI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SasFmri {
    pub version: u8,
    pub authority: Authority,
    pub path: Vec<PathComponent>,
}
