/// Phase definitions for the resolution loop
///
/// This module defines every phase a resolution can be in while the
/// controller moves between fetching, scanning and redirecting.
use std::fmt;

/// Represents the current phase of a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    // ===== Active Phases =====
    /// A document is being requested
    Fetching,

    /// The fetched document is being scanned
    Scanning,

    // ===== Redirect Phases =====
    /// The document declared a different canonical URL
    RedirectCanonical,

    /// The document asked to be fetched through its escaped fragment
    RedirectFragment,

    // ===== Terminal Phases =====
    /// A preview was produced
    Done,

    /// Resolution failed and the error was returned to the caller
    Error,
}

impl Phase {
    /// Returns true if the resolution has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    /// Returns true if the phase leads to another fetch
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::RedirectCanonical | Self::RedirectFragment)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// ```text
    /// Fetching -> Scanning | Error
    /// Scanning -> Done | RedirectCanonical | RedirectFragment | Error
    /// Redirect* -> Fetching | Done | Error
    /// ```
    pub fn can_transition_to(&self, next: Phase) -> bool {
        match self {
            Self::Fetching => matches!(next, Self::Scanning | Self::Error),
            Self::Scanning => matches!(
                next,
                Self::Done | Self::RedirectCanonical | Self::RedirectFragment | Self::Error
            ),
            Self::RedirectCanonical | Self::RedirectFragment => {
                matches!(next, Self::Fetching | Self::Done | Self::Error)
            }
            Self::Done | Self::Error => false,
        }
    }

    /// Short lowercase name used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Scanning => "scanning",
            Self::RedirectCanonical => "redirect_canonical",
            Self::RedirectFragment => "redirect_fragment",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
