//! 演示配置：TOML 文件叠加 `FORMATEUR_` 前缀环境变量

use std::path::Path;

use anyhow::Context as _;
use chrono::{DateTime, NaiveDate, Utc};
use formateur_domain::{
    Competence, DomainResult, Justificatif, NiveauCompetence, TypeJustificatif,
};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Valider,
    Refuser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    /// 审核结论，应用于每个成功提交的申请
    #[serde(default = "default_decision")]
    pub decision: Decision,
    /// 每条通知在成功前模拟的投递失败次数
    #[serde(default)]
    pub echecs_simules: usize,
    /// 拒绝时附带的理由（10 到 500 个字符）
    #[serde(default)]
    pub motif_rejet: Option<String>,
    #[serde(default = "default_candidatures")]
    pub candidatures: Vec<CandidatureConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidatureConfig {
    pub email: String,
    pub nom_complet: String,
    pub competences: Vec<CompetenceConfig>,
    pub justificatifs: Vec<JustificatifConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompetenceConfig {
    pub nom: String,
    pub niveau: NiveauCompetence,
    pub domaine: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JustificatifConfig {
    #[serde(rename = "type")]
    pub type_justificatif: TypeJustificatif,
    pub titre: String,
    pub date_obtention: NaiveDate,
    #[serde(default)]
    pub url_document: Option<String>,
}

impl DemoConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("FORMATEUR"))
            .build()
            .context("failed to read config file")?;

        settings
            .try_deserialize()
            .context("failed to deserialise DemoConfig")
    }
}

impl CandidatureConfig {
    pub fn competences(&self) -> DomainResult<Vec<Competence>> {
        self.competences
            .iter()
            .map(|c| Competence::creer(&c.nom, c.niveau, &c.domaine))
            .collect()
    }

    pub fn justificatifs(&self) -> DomainResult<Vec<Justificatif>> {
        self.justificatifs
            .iter()
            .map(|j| {
                Justificatif::creer(
                    j.type_justificatif,
                    &j.titre,
                    debut_de_journee(j.date_obtention),
                    j.url_document.clone(),
                )
            })
            .collect()
    }
}

fn debut_de_journee(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn default_decision() -> Decision {
    Decision::Valider
}

fn default_candidatures() -> Vec<CandidatureConfig> {
    vec![CandidatureConfig {
        email: "jean.dupont@example.com".to_string(),
        nom_complet: "Jean Dupont".to_string(),
        competences: vec![CompetenceConfig {
            nom: "SQL".to_string(),
            niveau: NiveauCompetence::Expert,
            domaine: "data".to_string(),
        }],
        justificatifs: vec![JustificatifConfig {
            type_justificatif: TypeJustificatif::Diplome,
            titre: "Master Info".to_string(),
            date_obtention: NaiveDate::from_ymd_opt(2019, 6, 30).unwrap_or_default(),
            url_document: None,
        }],
    }]
}
