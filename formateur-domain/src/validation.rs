//! 构造期共用的输入校验

use crate::error::{DomainError, DomainResult};

pub(crate) fn exiger_email(email: &str, message: &str) -> DomainResult<()> {
    if email.contains('@') {
        Ok(())
    } else {
        Err(DomainError::validation(message))
    }
}

/// 去除首尾空白后至少 `min` 个字符
pub(crate) fn exiger_longueur(valeur: &str, min: usize, message: &str) -> DomainResult<()> {
    if valeur.trim().chars().count() >= min {
        Ok(())
    } else {
        Err(DomainError::validation(message))
    }
}

/// 去除首尾空白后字符数落在 `min..=max` 之内
pub(crate) fn exiger_longueur_entre(
    valeur: &str,
    min: usize,
    max: usize,
    message: &str,
) -> DomainResult<()> {
    if (min..=max).contains(&valeur.trim().chars().count()) {
        Ok(())
    } else {
        Err(DomainError::validation(message))
    }
}

pub(crate) fn exiger_non_vide(valeur: &str, message: &str) -> DomainResult<()> {
    exiger_longueur(valeur, 1, message)
}
