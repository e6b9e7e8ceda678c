use std::{fmt, str::FromStr};

use chrono::{DateTime, TimeDelta, Utc};
use formateur_macros::value_object;
use serde::Deserialize;

use crate::error::{DomainError, DomainResult};
use crate::validation::exiger_non_vide;
use crate::value_object::ValueObject;

/// 近期判定窗口：5 × 365 天，不考虑闰年
const FENETRE_RECENTE_JOURS: i64 = 5 * 365;

/// 证明材料类别
#[value_object]
#[derive(Copy, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TypeJustificatif {
    Diplome,
    Certificat,
    Experience,
}

impl TypeJustificatif {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diplome => "diplome",
            Self::Certificat => "certificat",
            Self::Experience => "experience",
        }
    }
}

impl fmt::Display for TypeJustificatif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeJustificatif {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "diplome" => Ok(Self::Diplome),
            "certificat" => Ok(Self::Certificat),
            "experience" => Ok(Self::Experience),
            other => Err(DomainError::validation(format!(
                "Type de justificatif inconnu: {other}"
            ))),
        }
    }
}

/// 证明材料（学位、证书或工作经历记录）
///
/// 相等性只比较类别、标题与获得时间（精确到时刻），不比较文档地址。
#[value_object(eq = false)]
#[serde(try_from = "JustificatifBrut")]
pub struct Justificatif {
    #[serde(rename = "type")]
    type_justificatif: TypeJustificatif,
    titre: String,
    date_obtention: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url_document: Option<String>,
}

#[derive(Deserialize)]
struct JustificatifBrut {
    #[serde(rename = "type")]
    type_justificatif: TypeJustificatif,
    titre: String,
    date_obtention: DateTime<Utc>,
    #[serde(default)]
    url_document: Option<String>,
}

impl TryFrom<JustificatifBrut> for Justificatif {
    type Error = DomainError;

    fn try_from(brut: JustificatifBrut) -> DomainResult<Self> {
        Self::creer(
            brut.type_justificatif,
            &brut.titre,
            brut.date_obtention,
            brut.url_document,
        )
    }
}

impl Justificatif {
    /// 校验并创建证明材料；获得时间不得晚于调用时刻
    pub fn creer(
        type_justificatif: TypeJustificatif,
        titre: &str,
        date_obtention: DateTime<Utc>,
        url_document: Option<String>,
    ) -> DomainResult<Self> {
        let justificatif = Self {
            type_justificatif,
            titre: titre.trim().to_string(),
            date_obtention,
            url_document,
        };
        justificatif.validate()?;
        Ok(justificatif)
    }

    pub fn type_justificatif(&self) -> TypeJustificatif {
        self.type_justificatif
    }

    pub fn titre(&self) -> &str {
        &self.titre
    }

    pub fn date_obtention(&self) -> DateTime<Utc> {
        self.date_obtention
    }

    pub fn url_document(&self) -> Option<&str> {
        self.url_document.as_deref()
    }

    pub fn equals(&self, other: Option<&Justificatif>) -> bool {
        other.is_some_and(|other| self == other)
    }

    /// 获得时间距今不足五年；每次调用都以当前时刻重新计算
    pub fn est_recent(&self) -> bool {
        self.est_recent_a(Utc::now())
    }

    /// 以给定时刻为基准的近期判定
    pub fn est_recent_a(&self, instant: DateTime<Utc>) -> bool {
        instant - self.date_obtention < TimeDelta::days(FENETRE_RECENTE_JOURS)
    }

    pub fn est_diplome(&self) -> bool {
        self.type_justificatif == TypeJustificatif::Diplome
    }
}

impl PartialEq for Justificatif {
    fn eq(&self, other: &Self) -> bool {
        self.type_justificatif == other.type_justificatif
            && self.titre == other.titre
            && self.date_obtention == other.date_obtention
    }
}

impl Eq for Justificatif {}

impl ValueObject for Justificatif {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        self.verifier_a(Utc::now())
    }
}

impl Justificatif {
    // 以给定时刻为“现在”执行校验
    fn verifier_a(&self, maintenant: DateTime<Utc>) -> DomainResult<()> {
        exiger_non_vide(&self.titre, "Le titre du justificatif est obligatoire")?;
        if self.date_obtention > maintenant {
            return Err(DomainError::validation(
                "La date d'obtention ne peut pas être dans le futur",
            ));
        }
        Ok(())
    }
}
