use std::{fmt, str::FromStr};

use formateur_macros::value_object;
use serde::Deserialize;

use crate::error::{DomainError, DomainResult};
use crate::validation::{exiger_longueur, exiger_non_vide};
use crate::value_object::ValueObject;

const NOM_MIN: usize = 3;

/// 能力熟练度
#[value_object]
#[derive(Copy, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NiveauCompetence {
    Debutant,
    Intermediaire,
    Expert,
}

impl NiveauCompetence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debutant => "debutant",
            Self::Intermediaire => "intermediaire",
            Self::Expert => "expert",
        }
    }
}

impl fmt::Display for NiveauCompetence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NiveauCompetence {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debutant" => Ok(Self::Debutant),
            "intermediaire" => Ok(Self::Intermediaire),
            "expert" => Ok(Self::Expert),
            other => Err(DomainError::validation(format!(
                "Niveau de compétence inconnu: {other}"
            ))),
        }
    }
}

/// 能力：某专业领域内、特定熟练度的技能声明。
///
/// 不可变值对象，相等性为三个字段的结构相等；
/// 重复检测使用更弱的 [`Competence::meme_competence`]。
#[value_object]
#[serde(try_from = "CompetenceBrute")]
pub struct Competence {
    nom: String,
    niveau: NiveauCompetence,
    domaine_expertise: String,
}

#[derive(Deserialize)]
struct CompetenceBrute {
    nom: String,
    niveau: NiveauCompetence,
    domaine_expertise: String,
}

impl TryFrom<CompetenceBrute> for Competence {
    type Error = DomainError;

    fn try_from(brute: CompetenceBrute) -> DomainResult<Self> {
        Self::creer(&brute.nom, brute.niveau, &brute.domaine_expertise)
    }
}

impl Competence {
    /// 校验并创建能力，名称与领域均去除首尾空白后保存
    pub fn creer(
        nom: &str,
        niveau: NiveauCompetence,
        domaine_expertise: &str,
    ) -> DomainResult<Self> {
        let competence = Self {
            nom: nom.trim().to_string(),
            niveau,
            domaine_expertise: domaine_expertise.trim().to_string(),
        };
        competence.validate()?;
        Ok(competence)
    }

    pub fn nom(&self) -> &str {
        &self.nom
    }

    pub fn niveau(&self) -> NiveauCompetence {
        self.niveau
    }

    pub fn domaine_expertise(&self) -> &str {
        &self.domaine_expertise
    }

    /// 结构相等；对方缺失时返回 false
    pub fn equals(&self, other: Option<&Competence>) -> bool {
        other.is_some_and(|other| self == other)
    }

    pub fn est_expert(&self) -> bool {
        self.niveau == NiveauCompetence::Expert
    }

    /// 是否为同一项能力：仅比较名称，忽略大小写
    pub fn meme_competence(&self, other: &Competence) -> bool {
        self.nom.to_lowercase() == other.nom.to_lowercase()
    }
}

impl ValueObject for Competence {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        exiger_longueur(
            &self.nom,
            NOM_MIN,
            "Le nom de la compétence doit contenir au moins 3 caractères",
        )?;
        exiger_non_vide(
            &self.domaine_expertise,
            "Le domaine d'expertise est obligatoire",
        )
    }
}
