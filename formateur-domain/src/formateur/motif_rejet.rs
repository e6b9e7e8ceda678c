use std::fmt;

use formateur_macros::value_object;

use crate::error::{DomainError, DomainResult};
use crate::validation::exiger_longueur_entre;
use crate::value_object::ValueObject;

const MOTIF_MIN: usize = 10;
const MOTIF_MAX: usize = 500;

/// 拒绝理由：去除首尾空白后 10 到 500 个字符
#[value_object]
#[serde(try_from = "String", into = "String")]
pub struct MotifRejet(String);

impl MotifRejet {
    pub fn creer(motif: &str) -> DomainResult<Self> {
        let motif = Self(motif.trim().to_string());
        motif.validate()?;
        Ok(motif)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for MotifRejet {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        exiger_longueur_entre(
            &self.0,
            MOTIF_MIN,
            MOTIF_MAX,
            "Le motif de rejet doit contenir entre 10 et 500 caractères",
        )
    }
}

impl TryFrom<String> for MotifRejet {
    type Error = DomainError;

    fn try_from(value: String) -> DomainResult<Self> {
        Self::creer(&value)
    }
}

impl From<MotifRejet> for String {
    fn from(value: MotifRejet) -> Self {
        value.0
    }
}

impl fmt::Display for MotifRejet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
