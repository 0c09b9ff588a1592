//! Chat routing error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, GroupId, ValidationError};

/// Errors reported back to the connection that issued a command.
///
/// None of these close the connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// A required field was missing or malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The connection has not registered an identity (or is closed).
    #[error("Register an identity before sending events")]
    NotRegistered,

    /// The group named by the command does not exist.
    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    /// Membership or ownership rule violated.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Reading or writing the store failed.
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl ChatError {
    pub fn group_not_found(id: &GroupId) -> Self {
        ChatError::GroupNotFound(*id)
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        ChatError::Forbidden(reason.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ChatError::Validation(err) => err.code(),
            ChatError::NotRegistered => ErrorCode::NotRegistered,
            ChatError::GroupNotFound(_) => ErrorCode::GroupNotFound,
            ChatError::Forbidden(_) => ErrorCode::Forbidden,
            ChatError::Persistence(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for ChatError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Forbidden => ChatError::Forbidden(err.message),
            _ => ChatError::Persistence(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_the_variant() {
        assert_eq!(ChatError::NotRegistered.code(), ErrorCode::NotRegistered);
        assert_eq!(
            ChatError::group_not_found(&GroupId::new()).code(),
            ErrorCode::GroupNotFound
        );
        assert_eq!(ChatError::forbidden("nope").code(), ErrorCode::Forbidden);
        assert_eq!(
            ChatError::from(ValidationError::empty_field("receiver")).code(),
            ErrorCode::EmptyField
        );
    }

    #[test]
    fn group_not_found_names_the_group() {
        let id = GroupId::new();
        let err = ChatError::group_not_found(&id);
        assert_eq!(err, ChatError::GroupNotFound(id));
        assert_eq!(err.to_string(), format!("Group not found: {}", id));
    }

    #[test]
    fn domain_errors_become_persistence_failures() {
        let err: ChatError = DomainError::database("disk full").into();
        assert_eq!(err.code(), ErrorCode::DatabaseError);
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn validation_message_is_passed_through() {
        let err = ChatError::from(ValidationError::empty_field("content"));
        assert_eq!(err.to_string(), "Field 'content' cannot be empty");
    }
}
