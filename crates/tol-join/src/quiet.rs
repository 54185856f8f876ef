//! 静默错误种类集合

use std::collections::HashSet;
use std::hash::Hash;

/// 静默错误种类
///
/// 作为"非首个"失败出现时，种类在此集合内的错误不会产生诊断输出。
/// 它不影响 Join 的结果：即使首个失败属于静默种类，Join 仍以它失败。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuietKinds<K: Eq + Hash> {
    kinds: HashSet<K>,
}

impl<K: Eq + Hash> QuietKinds<K> {
    /// 空集合（所有次要失败都会被报告）
    pub fn new() -> Self {
        Self {
            kinds: HashSet::new(),
        }
    }

    /// 添加一个种类，返回是否为新增
    pub fn insert(&mut self, kind: K) -> bool {
        self.kinds.insert(kind)
    }

    pub fn contains(&self, kind: &K) -> bool {
        self.kinds.contains(kind)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl<K: Eq + Hash> Default for QuietKinds<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> FromIterator<K> for QuietKinds<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self {
            kinds: iter.into_iter().collect(),
        }
    }
}

impl<K: Eq + Hash> Extend<K> for QuietKinds<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        self.kinds.extend(iter);
    }
}
