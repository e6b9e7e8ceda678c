//! 讲师仓储（Repository）
//!
//! 领域层只定义接口：一个聚合根对应一个仓储，整体读写聚合（含能力与证明材料）。
//! 具体存储由基础设施层实现；`InMemoryFormateurRepository` 供测试与演示使用。
//!
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::formateur::{
    EmailCorrespond, Formateur, FormateurActif, FormateurEnAttente, FormateurId, FormateurValide,
    StatutFormateur,
};
use crate::specification::Specification;

/// 讲师聚合仓储
#[async_trait]
pub trait FormateurRepository: Send + Sync {
    /// 新增或更新整个聚合
    async fn save(&self, formateur: &Formateur) -> DomainResult<()>;

    async fn find(&self, id: &FormateurId) -> DomainResult<Option<Formateur>>;

    /// 返回满足规约的全部聚合，按标识排序
    async fn find_matching(
        &self,
        spec: &dyn Specification<Formateur>,
    ) -> DomainResult<Vec<Formateur>>;

    /// 删除聚合；不存在时返回 `NotFound`
    async fn delete(&self, id: &FormateurId) -> DomainResult<()>;

    /// 按邮箱查找；同一邮箱有多份申请时优先返回仍有效（待审核或已通过）的那份
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Formateur>> {
        let actif = EmailCorrespond::new(email).and(FormateurActif);
        if let Some(formateur) = self.find_matching(&actif).await?.into_iter().next() {
            return Ok(Some(formateur));
        }
        let spec = EmailCorrespond::new(email);
        Ok(self.find_matching(&spec).await?.into_iter().next())
    }

    async fn find_by_statut(&self, statut: StatutFormateur) -> DomainResult<Vec<Formateur>> {
        let spec: Box<dyn Specification<Formateur>> = match statut {
            StatutFormateur::EnAttente => Box::new(FormateurEnAttente),
            StatutFormateur::Valide => Box::new(FormateurValide),
            StatutFormateur::Refuse => Box::new(FormateurActif.not()),
        };
        self.find_matching(spec.as_ref()).await
    }

    /// 待审核的申请（管理后台列表）
    async fn find_en_attente(&self) -> DomainResult<Vec<Formateur>> {
        self.find_matching(&FormateurEnAttente).await
    }

    /// 任意状态下是否存在该邮箱的申请
    async fn exists_by_email(&self, email: &str) -> DomainResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn count_by_statut(&self, statut: StatutFormateur) -> DomainResult<usize> {
        Ok(self.find_by_statut(statut).await?.len())
    }
}

/// 内存版讲师仓储，克隆后共享同一份存储
#[derive(Clone, Default)]
pub struct InMemoryFormateurRepository {
    formateurs: Arc<RwLock<BTreeMap<FormateurId, Formateur>>>,
}

impl InMemoryFormateurRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count_all(&self) -> usize {
        self.formateurs.read().await.len()
    }

    pub async fn clear(&self) {
        self.formateurs.write().await.clear();
    }
}

#[async_trait]
impl FormateurRepository for InMemoryFormateurRepository {
    async fn save(&self, formateur: &Formateur) -> DomainResult<()> {
        let mut formateurs = self.formateurs.write().await;
        // 保存的副本不携带待发布事件
        let mut stored = formateur.clone();
        stored.vider_evenements();
        tracing::debug!(
            formateur_id = %formateur.id(),
            version = formateur.version(),
            "formateur enregistré"
        );
        formateurs.insert(formateur.id().clone(), stored);
        Ok(())
    }

    async fn find(&self, id: &FormateurId) -> DomainResult<Option<Formateur>> {
        Ok(self.formateurs.read().await.get(id).cloned())
    }

    async fn find_matching(
        &self,
        spec: &dyn Specification<Formateur>,
    ) -> DomainResult<Vec<Formateur>> {
        let formateurs = self.formateurs.read().await;
        Ok(formateurs
            .values()
            .filter(|f| spec.is_satisfied_by(f))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &FormateurId) -> DomainResult<()> {
        match self.formateurs.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(DomainError::NotFound {
                reason: format!("formateur {id}"),
            }),
        }
    }
}
