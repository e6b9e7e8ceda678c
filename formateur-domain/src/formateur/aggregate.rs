use std::fmt;

use chrono::{DateTime, Utc};
use formateur_macros::{entity_id, value_object};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::competence::Competence;
use super::events::FormateurEvent;
use super::justificatif::Justificatif;
use super::motif_rejet::MotifRejet;
use crate::domain_event::EventEnvelope;
use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::validation::{exiger_email, exiger_longueur};

/// 单个讲师可声明的能力上限
pub const MAX_COMPETENCES: usize = 10;

const NOM_COMPLET_MIN: usize = 2;

#[entity_id(prefix = "FORM")]
pub struct FormateurId(String);

/// 审核状态：`EnAttente` 为初始状态，`Valide` / `Refuse` 为审核结论
#[value_object]
#[derive(Copy, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatutFormateur {
    EnAttente,
    Valide,
    Refuse,
}

impl StatutFormateur {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnAttente => "en_attente",
            Self::Valide => "valide",
            Self::Refuse => "refuse",
        }
    }
}

impl fmt::Display for StatutFormateur {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 讲师聚合根
///
/// 不变量：
/// - 能力数量始终在 `1..=MAX_COMPETENCES` 之间，且名称（忽略大小写）互不重复；
/// - 至少一份证明材料；
/// - `id` 与 `date_creation` 创建后不再变化。
///
/// 读取能力与证明材料时返回副本，调用方无法借此修改内部状态。
/// 反序列化重新执行创建时的校验。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "FormateurBrut")]
pub struct Formateur {
    id: FormateurId,
    version: usize,
    email: String,
    nom_complet: String,
    competences: Vec<Competence>,
    justificatifs: Vec<Justificatif>,
    statut: StatutFormateur,
    date_creation: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    motif_rejet: Option<MotifRejet>,
    #[serde(skip)]
    evenements: Vec<FormateurEvent>,
}

/// 持久化形态，经 `TryFrom` 校验后才成为 `Formateur`
#[derive(Deserialize)]
struct FormateurBrut {
    id: FormateurId,
    version: usize,
    email: String,
    nom_complet: String,
    competences: Vec<Competence>,
    justificatifs: Vec<Justificatif>,
    statut: StatutFormateur,
    date_creation: DateTime<Utc>,
    #[serde(default)]
    motif_rejet: Option<MotifRejet>,
}

impl TryFrom<FormateurBrut> for Formateur {
    type Error = DomainError;

    fn try_from(brut: FormateurBrut) -> DomainResult<Self> {
        verifier_candidature(
            &brut.email,
            &brut.nom_complet,
            &brut.competences,
            &brut.justificatifs,
        )?;
        if brut.version == 0 {
            return Err(DomainError::validation("La version doit être au moins 1"));
        }
        if brut.motif_rejet.is_some() && brut.statut != StatutFormateur::Refuse {
            return Err(DomainError::validation(
                "Un motif de rejet exige le statut refuse",
            ));
        }
        Ok(Self {
            id: brut.id,
            version: brut.version,
            email: brut.email,
            nom_complet: brut.nom_complet,
            competences: brut.competences,
            justificatifs: brut.justificatifs,
            statut: brut.statut,
            date_creation: brut.date_creation,
            motif_rejet: brut.motif_rejet,
            evenements: Vec::new(),
        })
    }
}

// 创建与加载共用的校验，顺序固定
fn verifier_candidature(
    email: &str,
    nom_complet: &str,
    competences: &[Competence],
    justificatifs: &[Justificatif],
) -> DomainResult<()> {
    exiger_email(email, "Email invalide")?;
    exiger_longueur(
        nom_complet,
        NOM_COMPLET_MIN,
        "Le nom doit contenir au moins 2 caractères",
    )?;
    if competences.is_empty() {
        return Err(DomainError::validation(
            "Le formateur doit avoir au moins une compétence",
        ));
    }
    if competences.len() > MAX_COMPETENCES {
        return Err(DomainError::validation(
            "Maximum 10 compétences autorisées",
        ));
    }
    if justificatifs.is_empty() {
        return Err(DomainError::validation(
            "Le formateur doit fournir au moins un justificatif",
        ));
    }
    Ok(())
}

impl Formateur {
    /// 提交讲师申请
    ///
    /// 依次校验：邮箱含 `@`、姓名至少 2 个字符、至少一项能力、
    /// 能力不超过上限、至少一份证明材料。成功后状态为 `EnAttente`，
    /// 并记录 `FormateurEvent::Soumis`。
    pub fn creer(
        email: &str,
        nom_complet: &str,
        competences: Vec<Competence>,
        justificatifs: Vec<Justificatif>,
    ) -> DomainResult<Self> {
        verifier_candidature(email, nom_complet, &competences, &justificatifs)?;

        let date_creation = Utc::now();
        let mut formateur = Self {
            id: FormateurId::generate(),
            version: 1,
            email: email.to_string(),
            nom_complet: nom_complet.to_string(),
            competences,
            justificatifs,
            statut: StatutFormateur::EnAttente,
            date_creation,
            motif_rejet: None,
            evenements: Vec::new(),
        };
        formateur.evenements.push(FormateurEvent::Soumis {
            id: Ulid::new().to_string(),
            aggregate_version: formateur.version,
            occurred_at: date_creation,
            email: formateur.email.clone(),
        });

        tracing::debug!(
            formateur_id = %formateur.id,
            competences = formateur.competences.len(),
            justificatifs = formateur.justificatifs.len(),
            "formateur soumis"
        );
        Ok(formateur)
    }

    /// 追加能力：已达上限返回 `Capacity`，同名能力返回 `Duplicate`
    pub fn ajouter_competence(&mut self, competence: Competence) -> DomainResult<()> {
        if self.competences.len() >= MAX_COMPETENCES {
            tracing::warn!(formateur_id = %self.id, "competence refusée: capacité atteinte");
            return Err(DomainError::capacity("Maximum 10 compétences autorisées"));
        }
        if self
            .competences
            .iter()
            .any(|c| c.meme_competence(&competence))
        {
            tracing::warn!(
                formateur_id = %self.id,
                competence = competence.nom(),
                "competence refusée: doublon"
            );
            return Err(DomainError::duplicate("Cette compétence existe déjà"));
        }

        let nom = competence.nom().to_string();
        self.competences.push(competence);
        self.enregistrer(|id, aggregate_version, occurred_at| {
            FormateurEvent::CompetenceAjoutee {
                id,
                aggregate_version,
                occurred_at,
                nom,
            }
        });
        Ok(())
    }

    /// 追加证明材料，不做去重与数量限制
    pub fn ajouter_justificatif(&mut self, justificatif: Justificatif) {
        let titre = justificatif.titre().to_string();
        self.justificatifs.push(justificatif);
        self.enregistrer(|id, aggregate_version, occurred_at| {
            FormateurEvent::JustificatifAjoute {
                id,
                aggregate_version,
                occurred_at,
                titre,
            }
        });
    }

    /// 审核通过。仅拒绝重复通过；已拒绝的申请仍可改为通过，并清除拒绝理由。
    pub fn valider(&mut self) -> DomainResult<()> {
        if self.statut == StatutFormateur::Valide {
            tracing::warn!(formateur_id = %self.id, "validation refusée: déjà validé");
            return Err(DomainError::state("Le compte est déjà validé"));
        }
        self.changer_statut(StatutFormateur::Valide);
        self.motif_rejet = None;
        self.enregistrer(|id, aggregate_version, occurred_at| FormateurEvent::Valide {
            id,
            aggregate_version,
            occurred_at,
        });
        Ok(())
    }

    /// 审核拒绝。仅拒绝重复拒绝；已通过的申请仍可改为拒绝。
    pub fn refuser(&mut self) -> DomainResult<()> {
        self.rejeter(None)
    }

    /// 附带理由的审核拒绝，状态规则同 [`Formateur::refuser`]
    pub fn refuser_avec_motif(&mut self, motif: MotifRejet) -> DomainResult<()> {
        self.rejeter(Some(motif))
    }

    fn rejeter(&mut self, motif: Option<MotifRejet>) -> DomainResult<()> {
        if self.statut == StatutFormateur::Refuse {
            tracing::warn!(formateur_id = %self.id, "refus refusé: déjà refusé");
            return Err(DomainError::state("Le compte est déjà refusé"));
        }
        self.changer_statut(StatutFormateur::Refuse);
        let texte = motif.as_ref().map(|m| m.as_str().to_string());
        self.motif_rejet = motif;
        self.enregistrer(|id, aggregate_version, occurred_at| FormateurEvent::Refuse {
            id,
            aggregate_version,
            occurred_at,
            motif: texte,
        });
        Ok(())
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn nom_complet(&self) -> &str {
        &self.nom_complet
    }

    pub fn competences(&self) -> Vec<Competence> {
        self.competences.clone()
    }

    pub fn justificatifs(&self) -> Vec<Justificatif> {
        self.justificatifs.clone()
    }

    pub fn statut(&self) -> StatutFormateur {
        self.statut
    }

    pub fn date_creation(&self) -> DateTime<Utc> {
        self.date_creation
    }

    /// 拒绝理由，仅在附带理由拒绝后存在
    pub fn motif_rejet(&self) -> Option<&MotifRejet> {
        self.motif_rejet.as_ref()
    }

    pub fn est_en_attente(&self) -> bool {
        self.statut == StatutFormateur::EnAttente
    }

    pub fn est_valide(&self) -> bool {
        self.statut == StatutFormateur::Valide
    }

    pub fn nombre_competences_expertes(&self) -> usize {
        self.competences.iter().filter(|c| c.est_expert()).count()
    }

    pub fn a_diplome(&self) -> bool {
        self.justificatifs.iter().any(|j| j.est_diplome())
    }

    /// 待发布的领域事件（副本）
    pub fn evenements(&self) -> Vec<FormateurEvent> {
        self.evenements.clone()
    }

    /// 取出并清空待发布事件，封装为事件信封交给基础设施层
    pub fn prendre_evenements(&mut self) -> Vec<EventEnvelope<FormateurEvent>> {
        std::mem::take(&mut self.evenements)
            .into_iter()
            .map(|e| EventEnvelope::new::<Self>(&self.id, e))
            .collect()
    }

    /// 清空待发布事件（发布完成后由基础设施层调用）
    pub fn vider_evenements(&mut self) {
        self.evenements.clear();
    }

    fn changer_statut(&mut self, statut: StatutFormateur) {
        tracing::debug!(
            formateur_id = %self.id,
            from = %self.statut,
            to = %statut,
            "statut formateur modifié"
        );
        self.statut = statut;
    }

    // 版本递增并记录事件
    fn enregistrer(&mut self, f: impl FnOnce(String, usize, DateTime<Utc>) -> FormateurEvent) {
        self.version += 1;
        let event = f(Ulid::new().to_string(), self.version, Utc::now());
        self.evenements.push(event);
    }
}

impl Entity for Formateur {
    const TYPE: &'static str = "formateur";
    type Id = FormateurId;

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
    use crate::domain_event::DomainEvent;
    use crate::formateur::{NiveauCompetence, TypeJustificatif};
    use chrono::TimeDelta;

    fn competence(nom: &str, niveau: NiveauCompetence) -> Competence {
        Competence::creer(nom, niveau, "informatique").unwrap()
    }

    fn competences(n: usize) -> Vec<Competence> {
        (0..n)
            .map(|i| competence(&format!("Skill-{i}"), NiveauCompetence::Intermediaire))
            .collect()
    }

    fn diplome() -> Justificatif {
        Justificatif::creer(
            TypeJustificatif::Diplome,
            "Master Info",
            Utc::now() - TimeDelta::days(365),
            None,
        )
        .unwrap()
    }

    fn formateur() -> Formateur {
        Formateur::creer("a@b.com", "Jean Dupont", competences(1), vec![diplome()]).unwrap()
    }

    fn reason(err: DomainError) -> String {
        err.reason()
    }

    #[test]
    fn creer_initialises_pending_state() {
        let avant = Utc::now();
        let f = formateur();
        assert!(f.id().as_str().starts_with("FORM-"));
        assert_eq!(f.statut(), StatutFormateur::EnAttente);
        assert!(f.est_en_attente());
        assert!(!f.est_valide());
        assert!(f.date_creation() >= avant);
        assert_eq!(f.version(), 1);
        assert_eq!(f.email(), "a@b.com");
        assert_eq!(f.nom_complet(), "Jean Dupont");
    }

    #[test]
    fn creer_generates_distinct_ids() {
        let a = formateur();
        let b = formateur();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn creer_checks_preconditions_in_order() {
        let err = Formateur::creer("invalide", "J", vec![], vec![]).unwrap_err();
        assert_eq!(reason(err), "Email invalide");

        let err = Formateur::creer("a@b.com", " J ", vec![], vec![]).unwrap_err();
        assert_eq!(reason(err), "Le nom doit contenir au moins 2 caractères");

        let err = Formateur::creer("a@b.com", "Jo", vec![], vec![]).unwrap_err();
        assert_eq!(reason(err), "Le formateur doit avoir au moins une compétence");

        let err = Formateur::creer("a@b.com", "Jo", competences(11), vec![]).unwrap_err();
        assert_eq!(reason(err), "Maximum 10 compétences autorisées");

        let err = Formateur::creer("a@b.com", "Jo", competences(1), vec![]).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(
            reason(err),
            "Le formateur doit fournir au moins un justificatif"
        );
    }

    #[test]
    fn creer_accepts_exactly_ten_competences() {
        let f = Formateur::creer("a@b.com", "Jo", competences(10), vec![diplome()]).unwrap();
        assert_eq!(f.competences().len(), 10);

        let err = Formateur::creer("a@b.com", "Jo", competences(11), vec![diplome()]).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn ajouter_competence_enforces_capacity() {
        let mut f = Formateur::creer("a@b.com", "Jo", competences(10), vec![diplome()]).unwrap();
        let err = f
            .ajouter_competence(competence("Nouvelle", NiveauCompetence::Expert))
            .unwrap_err();
        assert!(matches!(err, DomainError::Capacity { .. }));
        assert_eq!(f.competences().len(), 10);
    }

    #[test]
    fn ajouter_competence_rejects_same_name_any_case() {
        let mut f = formateur();
        let err = f
            .ajouter_competence(competence("SKILL-0", NiveauCompetence::Expert))
            .unwrap_err();
        assert!(matches!(err, DomainError::Duplicate { .. }));
        assert_eq!(f.competences().len(), 1);
    }

    #[test]
    fn ajouter_competence_appends_in_order() {
        let mut f = formateur();
        f.ajouter_competence(competence("Docker", NiveauCompetence::Expert))
            .unwrap();
        f.ajouter_competence(competence("Kubernetes", NiveauCompetence::Debutant))
            .unwrap();
        let noms: Vec<String> = f.competences().iter().map(|c| c.nom().to_string()).collect();
        assert_eq!(noms, vec!["Skill-0", "Docker", "Kubernetes"]);
        assert_eq!(f.nombre_competences_expertes(), 1);
        assert_eq!(f.version(), 3);
    }

    #[test]
    fn ajouter_justificatif_accepts_duplicates() {
        let mut f = formateur();
        f.ajouter_justificatif(diplome());
        f.ajouter_justificatif(diplome());
        assert_eq!(f.justificatifs().len(), 3);
    }

    #[test]
    fn valider_twice_fails() {
        let mut f = formateur();
        f.valider().unwrap();
        assert!(f.est_valide());
        let err = f.valider().unwrap_err();
        assert!(matches!(err, DomainError::State { .. }));
        assert_eq!(f.statut(), StatutFormateur::Valide);
    }

    #[test]
    fn refuser_twice_fails() {
        let mut f = formateur();
        f.refuser().unwrap();
        let err = f.refuser().unwrap_err();
        assert!(matches!(err, DomainError::State { .. }));
        assert_eq!(f.statut(), StatutFormateur::Refuse);
    }

    // 当前行为：两个审核结论之间可以互相切换
    #[test]
    fn terminal_states_can_switch_to_each_other() {
        let mut f = formateur();
        f.valider().unwrap();
        f.refuser().unwrap();
        assert_eq!(f.statut(), StatutFormateur::Refuse);
        f.valider().unwrap();
        assert_eq!(f.statut(), StatutFormateur::Valide);
    }

    #[test]
    fn getters_return_copies() {
        let f = formateur();
        let mut copie = f.competences();
        copie.push(competence("Intrus", NiveauCompetence::Expert));
        copie.clear();
        assert_eq!(f.competences().len(), 1);

        let mut justificatifs = f.justificatifs();
        justificatifs.clear();
        assert_eq!(f.justificatifs().len(), 1);
    }

    #[test]
    fn queries_count_experts_and_diplomas() {
        let experience = Justificatif::creer(
            TypeJustificatif::Experience,
            "5 ans chez ACME",
            Utc::now(),
            None,
        )
        .unwrap();
        let f = Formateur::creer(
            "a@b.com",
            "Jo",
            vec![
                competence("Rust", NiveauCompetence::Expert),
                competence("Python", NiveauCompetence::Expert),
                competence("Go lang", NiveauCompetence::Debutant),
            ],
            vec![experience],
        )
        .unwrap();
        assert_eq!(f.nombre_competences_expertes(), 2);
        assert!(!f.a_diplome());

        let mut f = f;
        f.ajouter_justificatif(diplome());
        assert!(f.a_diplome());
    }

    #[test]
    fn events_track_lifecycle() {
        let mut f = formateur();
        f.ajouter_competence(competence("Docker", NiveauCompetence::Expert))
            .unwrap();
        f.valider().unwrap();

        let events = f.evenements();
        let types: Vec<&str> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(
            types,
            vec![
                "formateur.soumis",
                "formateur.competence_ajoutee",
                "formateur.valide"
            ]
        );
        let versions: Vec<usize> = events.iter().map(|e| e.aggregate_version()).collect();
        assert_eq!(versions, vec![1, 2, 3]);

        let envelopes = f.prendre_evenements();
        assert_eq!(envelopes.len(), 3);
        assert_eq!(envelopes[0].metadata.aggregate_id(), f.id().as_str());
        assert_eq!(envelopes[0].metadata.aggregate_type(), "formateur");
        assert!(f.evenements().is_empty());
    }

    #[test]
    fn failed_transition_records_nothing() {
        let mut f = formateur();
        f.vider_evenements();
        f.valider().unwrap();
        let version = f.version();
        assert!(f.valider().is_err());
        assert_eq!(f.version(), version);
        assert_eq!(f.evenements().len(), 1);
    }

    #[test]
    fn serde_keeps_state_and_skips_events() {
        let mut f = formateur();
        f.valider().unwrap();
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["statut"], "valide");
        assert!(json.get("evenements").is_none());

        let back: Formateur = serde_json::from_value(json).unwrap();
        assert_eq!(back.id(), f.id());
        assert_eq!(back.date_creation(), f.date_creation());
        assert_eq!(back.competences(), f.competences());
        assert!(back.evenements().is_empty());
    }

    #[test]
    fn deserialize_rejects_broken_invariants() {
        let json = serde_json::to_value(formateur()).unwrap();

        let mut sans_competence = json.clone();
        sans_competence["competences"] = serde_json::json!([]);
        let err = serde_json::from_value::<Formateur>(sans_competence).unwrap_err();
        assert!(err.to_string().contains("au moins une compétence"));

        let mut sans_justificatif = json.clone();
        sans_justificatif["justificatifs"] = serde_json::json!([]);
        assert!(serde_json::from_value::<Formateur>(sans_justificatif).is_err());

        let mut email_invalide = json.clone();
        email_invalide["email"] = serde_json::json!("no-at-sign");
        let err = serde_json::from_value::<Formateur>(email_invalide).unwrap_err();
        assert!(err.to_string().contains("Email invalide"));

        let mut trop = json.clone();
        trop["competences"] = serde_json::to_value(competences(11)).unwrap();
        assert!(serde_json::from_value::<Formateur>(trop).is_err());

        let mut version_nulle = json.clone();
        version_nulle["version"] = serde_json::json!(0);
        assert!(serde_json::from_value::<Formateur>(version_nulle).is_err());

        let mut motif_orphelin = json;
        motif_orphelin["motif_rejet"] = serde_json::json!("Dossier incomplet");
        assert!(serde_json::from_value::<Formateur>(motif_orphelin).is_err());
    }

    #[test]
    fn deserialize_revalidates_nested_value_objects() {
        let mut json = serde_json::to_value(formateur()).unwrap();
        json["competences"][0]["nom"] = serde_json::json!("  a ");
        assert!(serde_json::from_value::<Formateur>(json).is_err());
    }

    #[test]
    fn refuser_avec_motif_records_reason() {
        let mut f = formateur();
        let motif = MotifRejet::creer("Justificatifs illisibles").unwrap();
        f.refuser_avec_motif(motif.clone()).unwrap();
        assert_eq!(f.statut(), StatutFormateur::Refuse);
        assert_eq!(f.motif_rejet(), Some(&motif));

        let dernier = f.evenements().pop().unwrap();
        assert_eq!(dernier.event_type(), "formateur.refuse");
        assert!(matches!(
            dernier,
            FormateurEvent::Refuse { motif: Some(ref m), .. } if m == "Justificatifs illisibles"
        ));

        let err = f
            .refuser_avec_motif(MotifRejet::creer("Deuxième refus").unwrap())
            .unwrap_err();
        assert!(matches!(err, DomainError::State { .. }));
        assert_eq!(f.motif_rejet(), Some(&motif));

        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["motif_rejet"], "Justificatifs illisibles");
        let back: Formateur = serde_json::from_value(json).unwrap();
        assert_eq!(back.motif_rejet(), Some(&motif));
    }

    #[test]
    fn refuser_without_reason_and_later_validation_clear_motif() {
        let mut f = formateur();
        f.refuser().unwrap();
        assert!(f.motif_rejet().is_none());
        assert!(matches!(
            f.evenements().pop(),
            Some(FormateurEvent::Refuse { motif: None, .. })
        ));

        let mut f = formateur();
        f.refuser_avec_motif(MotifRejet::creer("Expérience insuffisante").unwrap())
            .unwrap();
        f.valider().unwrap();
        assert!(f.motif_rejet().is_none());
    }
}
