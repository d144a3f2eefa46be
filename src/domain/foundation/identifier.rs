//! Sequential identifier generation.
//!
//! The generator is pure: the caller supplies the current maximum sequence
//! for a kind, read inside the same transaction as the insert that will
//! consume the new identifier.

use super::{DomainError, EntityKind, ErrorCode};

/// Default zero-padded width of the numeric part (`sess_001`).
pub const DEFAULT_IDENTIFIER_WIDTH: usize = 3;

/// Produces `<prefix><zero-padded integer>` identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierGenerator {
    width: usize,
}

impl IdentifierGenerator {
    /// Creates a generator padding to `width` digits.
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }

    /// Returns the configured width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Largest sequence that still fits in the configured width.
    pub fn capacity(&self) -> u64 {
        10u64
            .checked_pow(self.width as u32)
            .map(|n| n - 1)
            .unwrap_or(u64::MAX)
    }

    /// Returns the identifier following `current_max` for `kind`.
    ///
    /// # Errors
    ///
    /// - `IdentifierExhausted` if the next integer needs more digits than
    ///   the configured width. The value is never truncated.
    pub fn next(&self, kind: EntityKind, current_max: Option<u64>) -> Result<String, DomainError> {
        let next = current_max.unwrap_or(0).saturating_add(1);
        if next > self.capacity() {
            return Err(DomainError::new(
                ErrorCode::IdentifierExhausted,
                format!(
                    "No {} identifiers left: {} does not fit in {} digits",
                    kind, next, self.width
                ),
            )
            .with_detail("kind", kind.to_string()));
        }
        Ok(format!("{}{:0width$}", kind.prefix(), next, width = self.width))
    }
}

impl Default for IdentifierGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTIFIER_WIDTH)
    }
}
