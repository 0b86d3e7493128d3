use serde::Serialize;

/// 只追加的有序日志
///
/// 不提供删除或修改接口；`recent` 返回最近 N 条的有界视图。
#[derive(Clone, Debug, Default)]
pub struct AppendLog<T> {
    entries: Vec<T>,
}

impl<T: Clone> AppendLog<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn append(&mut self, entry: T) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&T> {
        self.entries.last()
    }

    pub fn all(&self) -> Vec<T> {
        self.entries.clone()
    }

    pub fn recent(&self, window: usize) -> Vec<T> {
        let start = self.entries.len().saturating_sub(window);
        self.entries[start..].to_vec()
    }
}

impl<T: Serialize> Serialize for AppendLog<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.entries.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_is_bounded() {
        let mut log = AppendLog::new();
        for i in 0..25 {
            log.append(i);
        }
        assert_eq!(log.len(), 25);
        assert_eq!(log.recent(10), (15..25).collect::<Vec<_>>());
        assert_eq!(log.recent(100).len(), 25);
    }

    #[test]
    fn test_recent_on_empty_log() {
        let log: AppendLog<u32> = AppendLog::new();
        assert!(log.recent(10).is_empty());
        assert!(log.is_empty());
    }
}
