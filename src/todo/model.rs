use serde::{Deserialize, Serialize};

use crate::config::MAX_TODO_LENGTH;
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i32,
    pub text: String,
}

/// Body of `POST /todos`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTodo {
    pub text: String,
}

impl NewTodo {
    /// Reject text longer than [`MAX_TODO_LENGTH`] characters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let actual = self.text.chars().count();
        if actual > MAX_TODO_LENGTH {
            return Err(ValidationError::TooLong {
                max: MAX_TODO_LENGTH,
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_todo(text: String) -> NewTodo {
        NewTodo { text }
    }

    #[test]
    fn test_validate_length_limit() {
        assert!(new_todo("a".repeat(140)).validate().is_ok());
        assert_eq!(
            new_todo("a".repeat(141)).validate(),
            Err(ValidationError::TooLong {
                max: 140,
                actual: 141
            })
        );
    }

    #[test]
    fn test_validate_counts_characters_not_bytes() {
        // 140 two-byte characters is 280 bytes but still within the limit.
        assert!(new_todo("é".repeat(140)).validate().is_ok());
        assert!(new_todo("é".repeat(141)).validate().is_err());
    }

    #[test]
    fn test_todo_json_shape() {
        let todo = Todo {
            id: 7,
            text: "buy milk".to_string(),
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json, serde_json::json!({"id": 7, "text": "buy milk"}));
    }
}
