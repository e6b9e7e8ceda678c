/// 规约模式的核心 trait
///
/// 用于封装业务规则，使其可复用、可组合和可测试。
/// 要求 `Send + Sync`，以便作为 `&dyn Specification<T>` 传入异步仓储。
pub trait Specification<T>: Send + Sync {
    /// 检查候选对象是否满足规约
    fn is_satisfied_by(&self, candidate: &T) -> bool;

    /// 与另一个规约进行 AND 组合
    fn and<S>(self, other: S) -> AndSpecification<T>
    where
        Self: Sized + 'static,
        S: Specification<T> + 'static,
    {
        AndSpecification::new(Box::new(self), Box::new(other))
    }

    /// 对规约进行 NOT 操作
    fn not(self) -> NotSpecification<T>
    where
        Self: Sized + 'static,
    {
        NotSpecification::new(Box::new(self))
    }
}

impl<T> Specification<T> for Box<dyn Specification<T>> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.as_ref().is_satisfied_by(candidate)
    }
}

/// AND 组合规约
pub struct AndSpecification<T> {
    left: Box<dyn Specification<T>>,
    right: Box<dyn Specification<T>>,
}

impl<T> AndSpecification<T> {
    pub fn new(left: Box<dyn Specification<T>>, right: Box<dyn Specification<T>>) -> Self {
        Self { left, right }
    }
}

impl<T> Specification<T> for AndSpecification<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.left.is_satisfied_by(candidate) && self.right.is_satisfied_by(candidate)
    }
}

/// NOT 规约
pub struct NotSpecification<T> {
    inner: Box<dyn Specification<T>>,
}

impl<T> NotSpecification<T> {
    pub fn new(inner: Box<dyn Specification<T>>) -> Self {
        Self { inner }
    }
}

impl<T> Specification<T> for NotSpecification<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        !self.inner.is_satisfied_by(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AuMoins(u32);
    impl Specification<u32> for AuMoins {
        fn is_satisfied_by(&self, candidate: &u32) -> bool {
            *candidate >= self.0
        }
    }

    struct Pair;
    impl Specification<u32> for Pair {
        fn is_satisfied_by(&self, candidate: &u32) -> bool {
            candidate % 2 == 0
        }
    }

    #[test]
    fn test_and_specification() {
        let spec = AuMoins(10).and(Pair);
        assert!(spec.is_satisfied_by(&12));
        assert!(!spec.is_satisfied_by(&11));
        assert!(!spec.is_satisfied_by(&4));
    }

    #[test]
    fn test_not_specification() {
        let spec = Pair.not();
        assert!(spec.is_satisfied_by(&3));
        assert!(!spec.is_satisfied_by(&2));
    }

    #[test]
    fn test_dyn_specification_is_usable() {
        let boxed: Box<dyn Specification<u32>> = Box::new(AuMoins(1).and(Pair.not()));
        let spec: &dyn Specification<u32> = &boxed;
        assert!(spec.is_satisfied_by(&5));
        assert!(!spec.is_satisfied_by(&6));
    }
}
