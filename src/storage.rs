use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::session::WorkoutSession;

/// ワークアウト履歴の永続化（新しい順）
pub trait WorkoutStore {
    /// 履歴を読み込み
    fn load(&self) -> Result<Vec<WorkoutSession>>;
    /// 履歴の先頭に追加して保存
    fn append(&mut self, session: WorkoutSession) -> Result<()>;
}

/// JSON配列ファイルによる履歴
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// 保存先パスを指定して作成（ファイルは遅延作成）
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WorkoutStore for JsonFileStore {
    fn load(&self) -> Result<Vec<WorkoutSession>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let sessions: Vec<WorkoutSession> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        debug!(count = sessions.len(), path = %self.path.display(), "workout history loaded");
        Ok(sessions)
    }

    fn append(&mut self, session: WorkoutSession) -> Result<()> {
        let mut sessions = self.load()?;
        sessions.insert(0, session);
        let json = serde_json::to_string_pretty(&sessions)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        debug!(count = sessions.len(), path = %self.path.display(), "workout history saved");
        Ok(())
    }
}

/// メモリ上の履歴（テスト用）
#[derive(Default)]
pub struct MemoryStore {
    sessions: Vec<WorkoutSession>,
}

impl WorkoutStore for MemoryStore {
    fn load(&self) -> Result<Vec<WorkoutSession>> {
        Ok(self.sessions.clone())
    }

    fn append(&mut self, session: WorkoutSession) -> Result<()> {
        self.sessions.insert(0, session);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str) -> WorkoutSession {
        WorkoutSession {
            id: id.to_string(),
            exercise_id: "tennis-serve".to_string(),
            exercise_name: "Tennis Serve".to_string(),
            date: 1_700_000_000_000,
            duration: 300,
            sets: 2,
            total_reps: 12,
            average_form_score: 84.5,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fitform-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = JsonFileStore::new(temp_path("missing.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_append_newest_first() {
        let path = temp_path("history.json");
        let _ = fs::remove_file(&path);
        let mut store = JsonFileStore::new(&path);
        store.append(session("a")).unwrap();
        store.append(session("b")).unwrap();

        let reopened = JsonFileStore::new(&path);
        let ids: Vec<_> = reopened.load().unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_errors() {
        let path = temp_path("corrupt.json");
        fs::write(&path, "{ not json").unwrap();
        let mut store = JsonFileStore::new(&path);
        assert!(store.load().is_err());
        assert!(store.append(session("x")).is_err());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::default();
        store.append(session("1")).unwrap();
        store.append(session("2")).unwrap();
        let sessions = store.load().unwrap();
        assert_eq!(sessions[0].id, "2");
        assert_eq!(sessions.len(), 2);
    }
}
