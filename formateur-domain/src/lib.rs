//! 讲师入驻领域层（formateur-domain）
//!
//! 建模讲师（formateur）注册与审核的生命周期：
//! - 值对象：能力（`Competence`）与证明材料（`Justificatif`）；
//! - 聚合根：讲师（`Formateur`），持有能力与证明材料并维护审核状态；
//! - 独立实体：通知（`Notification`），以标识弱引用讲师并跟踪投递状态；
//! - 领域事件、仓储接口、规约与领域服务（邮箱唯一性校验）。
//!
//! 本 crate 不涉及持久化格式、传输协议与并发控制，
//! 仅定义领域对象、不变量与供基础设施层实现的接口。
//!
//! 典型用法：
//! 1. 使用 `Competence::creer` / `Justificatif::creer` 构造值对象；
//! 2. 通过 `VerifierUniciteEmail` 确认邮箱未被占用后调用 `Formateur::creer`；
//! 3. 审核方调用 `valider` / `refuser`，投递方驱动 `Notification` 状态流转。
//!

// 宏生成的代码以 `::formateur_domain` 路径引用本 crate
extern crate self as formateur_domain;

pub mod domain_event;
pub mod domain_service;
pub mod entity;
pub mod error;
pub mod formateur;
pub mod notification;
pub mod repository;
pub mod specification;
pub mod value_object;

mod validation;

pub use error::{DomainError, DomainResult};
pub use formateur::{
    Competence, Formateur, FormateurEvent, FormateurId, Justificatif, MotifRejet,
    NiveauCompetence, StatutFormateur, TypeJustificatif, VerifierUniciteEmail,
};
pub use notification::{Notification, NotificationId, StatutNotification};
