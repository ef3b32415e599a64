//! 鍵值正規化
//!
//! 管線號、物料代碼在各表之間以字串鬆散關聯，所有比對都必須經過這裡，
//! 確保每一側套用相同的正規化（去空白、轉大寫）。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 正規化後的業務代碼
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    /// 正規化任意代碼字串
    pub fn new(raw: &str) -> Self {
        Self(normalize(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 是否以指定前綴開頭（前綴同樣正規化）
    pub fn starts_with(&self, prefix: &str) -> bool {
        let prefix = normalize(prefix);
        !prefix.is_empty() && self.0.starts_with(&prefix)
    }

    /// 是否包含指定片段（片段同樣正規化）
    pub fn contains(&self, fragment: &str) -> bool {
        let fragment = normalize(fragment);
        !fragment.is_empty() && self.0.contains(&fragment)
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NormalizedKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// 去除前後空白並轉為大寫
pub fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a106b", "A106B")]
    #[case("  A106B ", "A106B")]
    #[case("sp-01\t", "SP-01")]
    #[case("", "")]
    fn test_normalize(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(NormalizedKey::new(raw).as_str(), expected);
    }

    #[test]
    fn test_keys_compare_after_normalization() {
        assert_eq!(NormalizedKey::new("pipe-6in"), NormalizedKey::new(" PIPE-6IN"));
        assert_ne!(NormalizedKey::new("PIPE-6IN"), NormalizedKey::new("PIPE-6 IN"));
    }

    #[test]
    fn test_prefix_and_fragment() {
        let key = NormalizedKey::new("tub-a106b-sch40");
        assert!(key.starts_with("tub"));
        assert!(key.contains("a106"));
        assert!(!key.starts_with(""));
        assert!(!key.contains("  "));
    }
}
