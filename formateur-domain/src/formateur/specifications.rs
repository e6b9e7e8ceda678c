//! 讲师查询规约，供仓储筛选与领域服务组合使用

use super::aggregate::{Formateur, StatutFormateur};
use crate::specification::Specification;

pub struct FormateurEnAttente;

impl Specification<Formateur> for FormateurEnAttente {
    fn is_satisfied_by(&self, candidate: &Formateur) -> bool {
        candidate.statut() == StatutFormateur::EnAttente
    }
}

pub struct FormateurValide;

impl Specification<Formateur> for FormateurValide {
    fn is_satisfied_by(&self, candidate: &Formateur) -> bool {
        candidate.statut() == StatutFormateur::Valide
    }
}

/// 仍占用邮箱的申请：待审核或已通过；被拒绝的申请人可以重新提交
pub struct FormateurActif;

impl Specification<Formateur> for FormateurActif {
    fn is_satisfied_by(&self, candidate: &Formateur) -> bool {
        candidate.statut() != StatutFormateur::Refuse
    }
}

/// 邮箱匹配（忽略大小写与首尾空白）
pub struct EmailCorrespond(String);

impl EmailCorrespond {
    pub fn new(email: &str) -> Self {
        Self(email.trim().to_lowercase())
    }
}

impl Specification<Formateur> for EmailCorrespond {
    fn is_satisfied_by(&self, candidate: &Formateur) -> bool {
        candidate.email().trim().to_lowercase() == self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formateur::{Competence, Justificatif, NiveauCompetence, TypeJustificatif};
    use chrono::Utc;

    fn formateur(email: &str) -> Formateur {
        Formateur::creer(
            email,
            "Alice Martin",
            vec![Competence::creer("Rust", NiveauCompetence::Expert, "systèmes").unwrap()],
            vec![Justificatif::creer(TypeJustificatif::Certificat, "RHCE", Utc::now(), None).unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn email_match_is_case_insensitive() {
        let f = formateur("Alice@Example.com");
        assert!(EmailCorrespond::new(" alice@example.COM ").is_satisfied_by(&f));
        assert!(!EmailCorrespond::new("bob@example.com").is_satisfied_by(&f));
    }

    #[test]
    fn status_specifications_follow_lifecycle() {
        let mut f = formateur("a@b.c");
        assert!(FormateurEnAttente.is_satisfied_by(&f));
        assert!(FormateurActif.is_satisfied_by(&f));
        assert!(!FormateurValide.is_satisfied_by(&f));

        f.valider().unwrap();
        assert!(FormateurValide.is_satisfied_by(&f));
        assert!(FormateurActif.is_satisfied_by(&f));

        f.refuser().unwrap();
        assert!(!FormateurActif.is_satisfied_by(&f));
        assert!(!FormateurEnAttente.is_satisfied_by(&f));
    }

    #[test]
    fn combined_specification() {
        let f = formateur("a@b.c");
        let spec = EmailCorrespond::new("A@B.C").and(FormateurActif);
        assert!(spec.is_satisfied_by(&f));
    }
}
