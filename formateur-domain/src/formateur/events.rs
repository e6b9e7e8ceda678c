use formateur_macros::domain_event;

/// 讲师聚合产生的领域事件
#[domain_event(prefix = "formateur")]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormateurEvent {
    /// 申请已提交
    Soumis { email: String },
    Valide {},
    Refuse {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        motif: Option<String>,
    },
    CompetenceAjoutee { nom: String },
    JustificatifAjoute { titre: String },
}
