//! 领域层统一错误定义
//!
//! 核心分类：输入校验、重复能力、容量上限与状态流转；
//! 另含邮箱唯一性与仓储查找失败。
//!
use thiserror::Error;

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 领域规则 ---
    #[error("validation error: {reason}")]
    Validation { reason: String },
    #[error("duplicate: {reason}")]
    Duplicate { reason: String },
    #[error("capacity exceeded: {reason}")]
    Capacity { reason: String },
    #[error("invalid state: {reason}")]
    State { reason: String },
    #[error("email already used: {email}")]
    EmailDejaUtilise { email: String },

    // --- 仓储 ---
    #[error("not found: {reason}")]
    NotFound { reason: String },
}

impl DomainError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn duplicate(reason: impl Into<String>) -> Self {
        Self::Duplicate {
            reason: reason.into(),
        }
    }

    pub fn capacity(reason: impl Into<String>) -> Self {
        Self::Capacity {
            reason: reason.into(),
        }
    }

    pub fn state(reason: impl Into<String>) -> Self {
        Self::State {
            reason: reason.into(),
        }
    }

    /// 错误携带的可读信息（不含分类前缀）
    pub fn reason(&self) -> String {
        match self {
            Self::Validation { reason }
            | Self::Duplicate { reason }
            | Self::Capacity { reason }
            | Self::State { reason }
            | Self::NotFound { reason } => reason.clone(),
            Self::EmailDejaUtilise { email } => {
                format!("L'email {email} est déjà utilisé dans une demande existante")
            }
        }
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category_and_reason() {
        let err = DomainError::capacity("Maximum 10 compétences autorisées");
        assert_eq!(
            err.to_string(),
            "capacity exceeded: Maximum 10 compétences autorisées"
        );
        assert_eq!(err.reason(), "Maximum 10 compétences autorisées");
    }

    #[test]
    fn email_conflict_reason_names_the_address() {
        let err = DomainError::EmailDejaUtilise {
            email: "a@b.com".to_string(),
        };
        assert_eq!(err.to_string(), "email already used: a@b.com");
        assert!(err.reason().contains("a@b.com"));
    }
}
