//! 讲师入驻流程演示
//!
//! 读取 `demo.toml`（或 `--config` 指定的路径）中的申请，依次完成：
//! 邮箱唯一性校验 → 提交申请 → 审核 → 通知投递（可模拟失败与重试），
//! 最后以 JSON 输出仓储中的讲师与通知。
//!
//! ```text
//! cargo run -p demo -- --config demo.toml --decision refuser --motif "Dossier incomplet"
//! ```

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use formateur_domain::domain_event::DomainEvent;
use formateur_domain::domain_service::DomainService;
use formateur_domain::entity::Entity;
use formateur_domain::repository::{FormateurRepository, InMemoryFormateurRepository};
use formateur_domain::{DomainError, Formateur, MotifRejet, Notification, VerifierUniciteEmail};
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use settings::{CandidatureConfig, Decision, DemoConfig};

#[derive(Parser)]
#[command(author, version, about = "Démo du cycle de vie formateur")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "demo.toml")]
    config: PathBuf,

    /// Override the review decision from the configuration.
    #[arg(long, value_enum)]
    decision: Option<Decision>,

    /// Reason attached when the decision is `refuser`.
    #[arg(long)]
    motif: Option<String>,
}

#[derive(Serialize)]
struct Rapport {
    formateurs: Vec<Formateur>,
    notifications: Vec<Notification>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();
    let mut cfg = DemoConfig::load(&cli.config)?;
    if let Some(decision) = cli.decision {
        cfg.decision = decision;
    }
    if cli.motif.is_some() {
        cfg.motif_rejet = cli.motif;
    }

    let repo = InMemoryFormateurRepository::new();
    let verifier = VerifierUniciteEmail::new(repo.clone());
    let mut notifications = Vec::new();

    for candidature in &cfg.candidatures {
        match soumettre(&verifier, &repo, candidature).await {
            Ok(formateur) => {
                notifications.push(notifier(
                    &formateur,
                    "Candidature reçue",
                    "Votre demande de compte formateur est en attente de validation.",
                    cfg.echecs_simules,
                )?);
            }
            Err(err) => {
                tracing::warn!(email = %candidature.email, "candidature rejetée: {err}");
            }
        }
    }

    for mut formateur in repo.find_en_attente().await? {
        let (sujet, message) = match cfg.decision {
            Decision::Valider => {
                formateur.valider()?;
                ("Compte validé", "Votre compte formateur a été validé.")
            }
            Decision::Refuser => {
                match &cfg.motif_rejet {
                    Some(motif) => formateur.refuser_avec_motif(MotifRejet::creer(motif)?)?,
                    None => formateur.refuser()?,
                }
                ("Compte refusé", "Votre demande de compte formateur a été refusée.")
            }
        };
        publier(&mut formateur);
        repo.save(&formateur).await?;
        notifications.push(notifier(&formateur, sujet, message, cfg.echecs_simules)?);
    }

    let rapport = Rapport {
        formateurs: repo.find_matching(&TousLesFormateurs).await?,
        notifications,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&rapport).context("failed to serialise report")?
    );
    Ok(())
}

async fn soumettre(
    verifier: &VerifierUniciteEmail<InMemoryFormateurRepository>,
    repo: &InMemoryFormateurRepository,
    candidature: &CandidatureConfig,
) -> Result<Formateur, DomainError> {
    verifier.execute(candidature.email.clone()).await?;
    let mut formateur = Formateur::creer(
        &candidature.email,
        &candidature.nom_complet,
        candidature.competences()?,
        candidature.justificatifs()?,
    )?;
    publier(&mut formateur);
    repo.save(&formateur).await?;
    tracing::info!(
        formateur_id = %formateur.id(),
        expertes = formateur.nombre_competences_expertes(),
        diplome = formateur.a_diplome(),
        "candidature enregistrée"
    );
    Ok(formateur)
}

// 模拟发布：事件仅写入日志
fn publier(formateur: &mut Formateur) {
    for envelope in formateur.prendre_evenements() {
        tracing::info!(
            aggregate_id = envelope.metadata.aggregate_id(),
            event_type = envelope.payload.event_type(),
            version = envelope.payload.aggregate_version(),
            "événement publié"
        );
    }
}

/// 模拟投递：前 `echecs` 次失败后重试成功
fn notifier(
    formateur: &Formateur,
    sujet: &str,
    message: &str,
    echecs: usize,
) -> Result<Notification, DomainError> {
    let mut notification =
        Notification::creer(formateur.email(), sujet, message, formateur.id().as_str())?;
    for tentative in 1..=echecs {
        notification.marquer_echec()?;
        tracing::warn!(notification_id = %notification.id(), tentative, "échec d'envoi");
        notification.reessayer_envoi()?;
    }
    notification.marquer_envoyee()?;
    tracing::info!(
        notification_id = %notification.id(),
        destinataire = notification.destinataire(),
        "notification envoyée"
    );
    Ok(notification)
}

struct TousLesFormateurs;

impl formateur_domain::specification::Specification<Formateur> for TousLesFormateurs {
    fn is_satisfied_by(&self, _candidate: &Formateur) -> bool {
        true
    }
}
