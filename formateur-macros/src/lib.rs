//! 领域建模辅助宏（formateur-macros）
//!
//! - `#[value_object]`：为值对象补齐通用派生；
//! - `#[entity_id]`：为实体标识包装类型生成构造、生成与转换实现；
//! - `#[domain_event]`：为事件枚举补齐元数据字段并实现 `DomainEvent`。
//!
use proc_macro::TokenStream;

mod derive_utils;
mod domain_event;
mod entity_id;
mod value_object;

/// 值对象宏
/// - 合并/追加派生：Debug, Clone, Serialize, Deserialize, PartialEq, Eq
/// - 参数：`#[value_object(eq = false)]` 跳过 PartialEq/Eq，用于自定义相等性的值对象
/// - 不派生 Default：值对象只能经由校验过的构造函数创建
#[proc_macro_attribute]
pub fn value_object(attr: TokenStream, item: TokenStream) -> TokenStream {
    value_object::expand(attr, item)
}

/// 实体 ID 宏
/// 用于 `struct FormateurId(String);` 形式的标识类型，生成：
/// - `generate()`：`<prefix>-<ULID>`，时间有序且带随机部分
/// - `new` / `as_str` / `Display` / `FromStr` / `AsRef<str>` / `From` 转换
///
/// 参数：`#[entity_id(prefix = "FORM")]`，缺省时仅生成 ULID。
/// 使用方需依赖 `ulid` 与 `serde`。
#[proc_macro_attribute]
pub fn entity_id(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity_id::expand(attr, item)
}

/// 领域事件宏
/// 仅用于具名字段变体的枚举，每个变体补齐 `id`、`aggregate_version`、`occurred_at`，
/// 并实现 `formateur_domain::domain_event::DomainEvent`。
///
/// 参数：`#[domain_event(prefix = "formateur", version = 1)]`；
/// 变体可用 `#[event(event_type = "...", event_version = N)]` 覆写。
/// 使用方需依赖 `chrono` 与 `serde`。
#[proc_macro_attribute]
pub fn domain_event(attr: TokenStream, item: TokenStream) -> TokenStream {
    domain_event::expand(attr, item)
}
