//! 讲师（formateur）限界上下文
//!
//! 聚合根 `Formateur` 持有能力与证明材料两类值对象，
//! 并记录提交、审核等领域事件供基础设施层发布。

mod aggregate;
mod competence;
mod events;
mod justificatif;
mod motif_rejet;
mod services;
mod specifications;

pub use aggregate::{Formateur, FormateurId, MAX_COMPETENCES, StatutFormateur};
pub use competence::{Competence, NiveauCompetence};
pub use events::FormateurEvent;
pub use justificatif::{Justificatif, TypeJustificatif};
pub use motif_rejet::MotifRejet;
pub use services::VerifierUniciteEmail;
pub use specifications::{EmailCorrespond, FormateurActif, FormateurEnAttente, FormateurValide};
