//! 通知（Notification）
//!
//! 跟踪一条与讲师申请相关的外发消息。通过 `formateur_concerne_id`
//! 弱引用讲师：只保存标识，讲师后续变化不会影响通知。
//!
//! 状态机：
//! ```text
//! en_attente ──marquer_envoyee──▶ envoyee
//!     │  ▲
//! marquer_echec  reessayer_envoi
//!     ▼  │
//!    echec ──marquer_echec──▶ echec
//! ```
use std::fmt;

use chrono::{DateTime, Utc};
use formateur_macros::{entity_id, value_object};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::formateur::FormateurId;
use crate::validation::{exiger_email, exiger_non_vide};

#[entity_id(prefix = "NOTIF")]
pub struct NotificationId(String);

#[value_object]
#[derive(Copy, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatutNotification {
    EnAttente,
    Envoyee,
    Echec,
}

impl StatutNotification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnAttente => "en_attente",
            Self::Envoyee => "envoyee",
            Self::Echec => "echec",
        }
    }
}

impl fmt::Display for StatutNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 反序列化重新执行创建时的校验，并要求 `date_envoi` 与 `envoyee` 状态一致
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "NotificationBrute")]
pub struct Notification {
    id: NotificationId,
    version: usize,
    destinataire: String,
    sujet: String,
    message: String,
    formateur_concerne_id: FormateurId,
    statut: StatutNotification,
    date_creation: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_envoi: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct NotificationBrute {
    id: NotificationId,
    version: usize,
    destinataire: String,
    sujet: String,
    message: String,
    formateur_concerne_id: FormateurId,
    statut: StatutNotification,
    date_creation: DateTime<Utc>,
    #[serde(default)]
    date_envoi: Option<DateTime<Utc>>,
}

impl TryFrom<NotificationBrute> for Notification {
    type Error = DomainError;

    fn try_from(brute: NotificationBrute) -> DomainResult<Self> {
        verifier_contenu(
            &brute.destinataire,
            &brute.sujet,
            &brute.message,
            brute.formateur_concerne_id.as_str(),
        )?;
        if brute.version == 0 {
            return Err(DomainError::validation("La version doit être au moins 1"));
        }
        let envoyee = brute.statut == StatutNotification::Envoyee;
        if envoyee != brute.date_envoi.is_some() {
            return Err(DomainError::validation(
                "La date d'envoi n'existe que pour une notification envoyée",
            ));
        }
        Ok(Self {
            id: brute.id,
            version: brute.version,
            destinataire: brute.destinataire,
            sujet: brute.sujet,
            message: brute.message,
            formateur_concerne_id: brute.formateur_concerne_id,
            statut: brute.statut,
            date_creation: brute.date_creation,
            date_envoi: brute.date_envoi,
        })
    }
}

fn verifier_contenu(
    destinataire: &str,
    sujet: &str,
    message: &str,
    formateur_concerne_id: &str,
) -> DomainResult<()> {
    exiger_email(destinataire, "Email destinataire invalide")?;
    exiger_non_vide(sujet, "Le sujet ne peut pas être vide")?;
    exiger_non_vide(message, "Le message ne peut pas être vide")?;
    exiger_non_vide(
        formateur_concerne_id,
        "L'ID du formateur concerné est obligatoire",
    )
}

impl Notification {
    /// 依次校验收件人邮箱、主题、正文与讲师标识
    pub fn creer(
        destinataire: &str,
        sujet: &str,
        message: &str,
        formateur_concerne_id: &str,
    ) -> DomainResult<Self> {
        verifier_contenu(destinataire, sujet, message, formateur_concerne_id)?;

        let notification = Self {
            id: NotificationId::generate(),
            version: 1,
            destinataire: destinataire.to_string(),
            sujet: sujet.to_string(),
            message: message.to_string(),
            formateur_concerne_id: FormateurId::new(formateur_concerne_id),
            statut: StatutNotification::EnAttente,
            date_creation: Utc::now(),
            date_envoi: None,
        };
        tracing::debug!(
            notification_id = %notification.id,
            formateur_id = %notification.formateur_concerne_id,
            "notification créée"
        );
        Ok(notification)
    }

    /// 标记为已发送并记录发送时间；重复标记视为错误
    pub fn marquer_envoyee(&mut self) -> DomainResult<()> {
        if self.statut == StatutNotification::Envoyee {
            tracing::warn!(notification_id = %self.id, "notification déjà envoyée");
            return Err(DomainError::state("La notification a déjà été envoyée"));
        }
        self.changer_statut(StatutNotification::Envoyee);
        self.date_envoi = Some(Utc::now());
        Ok(())
    }

    /// 标记投递失败；已发送的通知不可再标记失败，失败状态可重复标记
    pub fn marquer_echec(&mut self) -> DomainResult<()> {
        if self.statut == StatutNotification::Envoyee {
            tracing::warn!(notification_id = %self.id, "échec impossible: déjà envoyée");
            return Err(DomainError::state(
                "Impossible de marquer en échec une notification déjà envoyée",
            ));
        }
        self.changer_statut(StatutNotification::Echec);
        Ok(())
    }

    /// 仅失败的通知可重试，重置为待发送
    pub fn reessayer_envoi(&mut self) -> DomainResult<()> {
        if self.statut != StatutNotification::Echec {
            tracing::warn!(
                notification_id = %self.id,
                statut = %self.statut,
                "nouvel essai refusé"
            );
            return Err(DomainError::state(
                "On ne peut réessayer que les notifications en échec",
            ));
        }
        self.changer_statut(StatutNotification::EnAttente);
        Ok(())
    }

    pub fn destinataire(&self) -> &str {
        &self.destinataire
    }

    pub fn sujet(&self) -> &str {
        &self.sujet
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn formateur_concerne_id(&self) -> &FormateurId {
        &self.formateur_concerne_id
    }

    pub fn statut(&self) -> StatutNotification {
        self.statut
    }

    pub fn date_creation(&self) -> DateTime<Utc> {
        self.date_creation
    }

    pub fn date_envoi(&self) -> Option<DateTime<Utc>> {
        self.date_envoi
    }

    pub fn est_envoyee(&self) -> bool {
        self.statut == StatutNotification::Envoyee
    }

    pub fn est_en_attente(&self) -> bool {
        self.statut == StatutNotification::EnAttente
    }

    pub fn a_echoue(&self) -> bool {
        self.statut == StatutNotification::Echec
    }

    fn changer_statut(&mut self, statut: StatutNotification) {
        tracing::debug!(
            notification_id = %self.id,
            from = %self.statut,
            to = %statut,
            "statut notification modifié"
        );
        self.statut = statut;
        self.version += 1;
    }
}

impl Entity for Notification {
    const TYPE: &'static str = "notification";
    type Id = NotificationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> usize {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> Notification {
        Notification::creer(
            "jean@example.com",
            "Votre candidature",
            "Nous avons bien reçu votre demande.",
            "FORM-123",
        )
        .unwrap()
    }

    #[test]
    fn creer_starts_pending_without_send_date() {
        let n = notification();
        assert!(n.id().as_str().starts_with("NOTIF-"));
        assert!(n.est_en_attente());
        assert_eq!(n.date_envoi(), None);
        assert_eq!(n.formateur_concerne_id().as_str(), "FORM-123");
        assert_eq!(n.version(), 1);
    }

    #[test]
    fn creer_checks_fields_in_order() {
        let cases = [
            (("jean", "", "", ""), "Email destinataire invalide"),
            (("j@x", " ", "", ""), "Le sujet ne peut pas être vide"),
            (("j@x", "s", "\t", ""), "Le message ne peut pas être vide"),
            (
                ("j@x", "s", "m", "  "),
                "L'ID du formateur concerné est obligatoire",
            ),
        ];
        for ((dest, sujet, message, id), attendu) in cases {
            let err = Notification::creer(dest, sujet, message, id).unwrap_err();
            assert!(matches!(err, DomainError::Validation { .. }));
            assert_eq!(err.reason(), attendu);
        }
    }

    #[test]
    fn marquer_envoyee_stamps_date_once() {
        let mut n = notification();
        let avant = Utc::now();
        n.marquer_envoyee().unwrap();
        assert!(n.est_envoyee());
        assert!(n.date_envoi().unwrap() >= avant);

        let err = n.marquer_envoyee().unwrap_err();
        assert!(matches!(err, DomainError::State { .. }));
    }

    #[test]
    fn cannot_fail_after_send() {
        let mut n = notification();
        n.marquer_envoyee().unwrap();
        let err = n.marquer_echec().unwrap_err();
        assert!(matches!(err, DomainError::State { .. }));
        assert!(n.est_envoyee());
    }

    #[test]
    fn echec_can_be_marked_again() {
        let mut n = notification();
        n.marquer_echec().unwrap();
        n.marquer_echec().unwrap();
        assert!(n.a_echoue());
        assert_eq!(n.date_envoi(), None);
    }

    #[test]
    fn retry_only_from_echec() {
        let mut n = notification();
        let err = n.reessayer_envoi().unwrap_err();
        assert!(matches!(err, DomainError::State { .. }));

        n.marquer_echec().unwrap();
        n.reessayer_envoi().unwrap();
        assert!(n.est_en_attente());

        n.marquer_envoyee().unwrap();
        assert!(n.reessayer_envoi().is_err());
    }

    #[test]
    fn serde_round_trip_preserves_set_once_fields() {
        let mut n = notification();
        n.marquer_envoyee().unwrap();
        let json = serde_json::to_string(&n).unwrap();
        let back: Notification = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), n.id());
        assert_eq!(back.date_creation(), n.date_creation());
        assert_eq!(back.date_envoi(), n.date_envoi());
        assert_eq!(back.statut(), StatutNotification::Envoyee);
    }

    #[test]
    fn deserialize_rejects_invalid_content() {
        let json = serde_json::to_value(notification()).unwrap();

        let mut dest = json.clone();
        dest["destinataire"] = serde_json::json!("sans-arobase");
        let err = serde_json::from_value::<Notification>(dest).unwrap_err();
        assert!(err.to_string().contains("Email destinataire invalide"));

        let mut sujet = json.clone();
        sujet["sujet"] = serde_json::json!("   ");
        assert!(serde_json::from_value::<Notification>(sujet).is_err());

        let mut formateur = json.clone();
        formateur["formateur_concerne_id"] = serde_json::json!("");
        assert!(serde_json::from_value::<Notification>(formateur).is_err());

        let mut envoi_sans_statut = json;
        envoi_sans_statut["date_envoi"] = serde_json::json!(Utc::now());
        assert!(serde_json::from_value::<Notification>(envoi_sans_statut).is_err());
    }
}
