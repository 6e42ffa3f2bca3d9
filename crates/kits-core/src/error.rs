//! Error types for the Kits application.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for the kits domain.
///
/// Rejections that end up in front of a player (`NotFound`, `OnCooldown`,
/// `GrantFailed`) are ordinary values here; none of them is fatal to the
/// process.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum KitsError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Claim rejected because the kit was used too recently
    #[error("Kit '{kit_id}' is on cooldown for another {remaining_secs}s")]
    OnCooldown { kit_id: String, remaining_secs: u64 },

    /// Grant went through but the destination could not hold everything
    #[error("Kit '{kit_id}' delivered partially ({undelivered} item stacks left over)")]
    GrantIncomplete { kit_id: String, undelivered: usize },

    /// Grant did not happen at all
    #[error("Failed to deliver kit '{kit_id}': {reason}")]
    GrantFailed { kit_id: String, reason: String },

    /// Malformed inbound event or command
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The session was dismissed (or never opened)
    #[error("Session closed: {0}")]
    SessionClosed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl KitsError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an OnCooldown error
    pub fn on_cooldown(kit_id: impl Into<String>, remaining_secs: u64) -> Self {
        Self::OnCooldown {
            kit_id: kit_id.into(),
            remaining_secs,
        }
    }

    /// Creates a GrantFailed error
    pub fn grant_failed(kit_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::GrantFailed {
            kit_id: kit_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a Protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Creates a SessionClosed error
    pub fn session_closed(message: impl Into<String>) -> Self {
        Self::SessionClosed(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an OnCooldown rejection
    pub fn is_on_cooldown(&self) -> bool {
        matches!(self, Self::OnCooldown { .. })
    }

    /// Check if this is a GrantFailed error
    pub fn is_grant_failed(&self) -> bool {
        matches!(self, Self::GrantFailed { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this error only rejects a single player action.
    ///
    /// Returns true for the variants a session reports back as a chat message
    /// instead of logging as a fault.
    pub fn is_player_facing(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::OnCooldown { .. }
                | Self::GrantIncomplete { .. }
                | Self::GrantFailed { .. }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for KitsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for KitsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for KitsError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for KitsError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error
impl From<anyhow::Error> for KitsError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, KitsError>`.
pub type Result<T> = std::result::Result<T, KitsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_facing_classification() {
        assert!(KitsError::not_found("Kit", "gold").is_player_facing());
        assert!(KitsError::on_cooldown("basic", 12).is_player_facing());
        assert!(KitsError::grant_failed("basic", "offline").is_player_facing());
        assert!(!KitsError::protocol("bad key").is_player_facing());
        assert!(!KitsError::internal("oops").is_player_facing());
    }

    #[test]
    fn test_display_messages() {
        let err = KitsError::on_cooldown("basic", 42);
        assert_eq!(err.to_string(), "Kit 'basic' is on cooldown for another 42s");

        let err = KitsError::not_found("Kit", "gold");
        assert_eq!(err.to_string(), "Entity not found: Kit 'gold'");
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: KitsError = json_err.into();
        assert!(matches!(err, KitsError::Serialization { ref format, .. } if format == "JSON"));
    }
}
