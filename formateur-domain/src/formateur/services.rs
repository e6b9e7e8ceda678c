use async_trait::async_trait;

use super::specifications::{EmailCorrespond, FormateurActif};
use crate::domain_service::DomainService;
use crate::error::{DomainError, DomainResult};
use crate::repository::FormateurRepository;
use crate::specification::Specification;

/// 领域服务：校验邮箱在进行中的申请里唯一
///
/// 待审核与已通过的申请占用邮箱；被拒绝的申请不占用，申请人可以重新提交。
/// 本服务无内部状态，仅依赖讲师仓储。
pub struct VerifierUniciteEmail<R> {
    repository: R,
}

impl<R> VerifierUniciteEmail<R>
where
    R: FormateurRepository,
{
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// 非报错版本：邮箱可用时返回 true
    pub async fn est_disponible(&self, email: &str) -> DomainResult<bool> {
        let spec = EmailCorrespond::new(email).and(FormateurActif);
        let actifs = self.repository.find_matching(&spec).await?;
        Ok(actifs.is_empty())
    }
}

#[async_trait]
impl<R> DomainService for VerifierUniciteEmail<R>
where
    R: FormateurRepository,
{
    type Input = String;
    type Output = ();
    type Error = DomainError;

    async fn execute(&self, email: Self::Input) -> Result<Self::Output, Self::Error> {
        if self.est_disponible(&email).await? {
            return Ok(());
        }
        tracing::warn!(email = %email, "email déjà utilisé par une demande active");
        Err(DomainError::EmailDejaUtilise { email })
    }
}
