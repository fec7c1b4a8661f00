//! Error types for Project Brawl.

use thiserror::Error;

use crate::ids::NpcId;

/// Top-level error type for Brawl operations.
///
/// The simulation tick itself never fails; these errors only surface from
/// operations a host addresses to a specific handle, and from configuration
/// loading.
#[derive(Debug, Error)]
pub enum BrawlError {
    /// Handle refers to an inactive slot or an older generation of it
    #[error("stale or inactive NPC handle: {0}")]
    StaleHandle(NpcId),

    /// Handle slot lies outside the pool
    #[error("NPC slot {slot} out of range (pool capacity {capacity})")]
    SlotOutOfRange {
        /// Requested slot
        slot: u32,
        /// Pool capacity
        capacity: usize,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Brawl operations.
pub type BrawlResult<T> = Result<T, BrawlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_handle_message_names_slot() {
        let err = BrawlError::StaleHandle(NpcId::new(7, 2));
        assert_eq!(err.to_string(), "stale or inactive NPC handle: npc#7.2");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: BrawlError = io.into();
        assert!(matches!(err, BrawlError::Io(_)));
    }
}
