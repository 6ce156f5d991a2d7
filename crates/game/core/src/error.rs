//! Common error infrastructure for battle-core.
//!
//! Domain errors live next to the code that raises them ([`GeneratorError`]
//! in fighter generation, [`CombatError`] in turn resolution). This module
//! holds the shared classification used by the runtime to decide whether a
//! failure aborts a session.

use crate::ability::AbilityId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the caller may retry later
/// - **Validation**: invalid input, reject without retry
/// - **Internal**: inconsistent data (catalog/loadout mismatch), investigate
/// - **Fatal**: the session cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all battle-core errors.
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str;
}

/// Failure while deriving a fighter from an identity string.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    #[error("ability catalog holds {available} entries, a loadout needs {required}")]
    CatalogTooSmall { available: usize, required: usize },
}

impl BattleError for GeneratorError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CatalogTooSmall { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CatalogTooSmall { .. } => "generator.catalog_too_small",
        }
    }
}

/// Failure while resolving a single turn.
///
/// A turn that fails leaves both fighters untouched; the session aborts.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    #[error("fighter equips {id:?} which is not in the ability catalog")]
    UnknownAbility { id: AbilityId },

    #[error("battle already concluded after {turns} turns")]
    AlreadyConcluded { turns: u32 },
}

impl BattleError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownAbility { .. } => ErrorSeverity::Internal,
            Self::AlreadyConcluded { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownAbility { .. } => "combat.unknown_ability",
            Self::AlreadyConcluded { .. } => "combat.already_concluded",
        }
    }
}
