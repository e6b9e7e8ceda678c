//! 值对象（Value Object）
//!
//! 无标识、以值相等为准的对象，用于封装不可变的概念性值与校验逻辑。
//!

/// 值对象抽象
pub trait ValueObject {
    /// 业务校验失败时的错误类型
    type Error;

    /// 校验当前取值；构造函数在返回前调用，
    /// 反序列化得到的值也可据此复核
    fn validate(&self) -> Result<(), Self::Error>;
}
