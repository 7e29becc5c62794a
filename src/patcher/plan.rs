//! Descriptor writes applied as one unit.

use crate::error::Result;
use crate::utils::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
struct PendingWrite {
    path: PathBuf,
    /// Text of the file before the write, `None` if the file is created.
    previous: Option<String>,
    contents: String,
}

/// An ordered set of file writes that is either applied completely or rolled
/// back to the previous file contents.
#[derive(Debug, Clone, Default)]
pub struct PatchPlan {
    writes: Vec<PendingWrite>,
}

impl PatchPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a write. `previous` is the current text of the file, used to
    /// restore it on rollback.
    pub fn write(&mut self, path: PathBuf, previous: Option<String>, contents: String) {
        self.writes.push(PendingWrite {
            path,
            previous,
            contents,
        });
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Writes every queued file in order.
    ///
    /// On the first failure, the files already written are restored (or removed
    /// when they did not exist) and the original error is returned.
    pub async fn apply(self) -> Result<Vec<PathBuf>> {
        let mut written: Vec<&PendingWrite> = Vec::with_capacity(self.writes.len());

        for pending in &self.writes {
            log::debug!("Writing {}", pending.path.display());
            if let Err(e) = fs::write_file_utf8(&pending.path, &pending.contents).await {
                log::warn!(
                    "Writing {} failed, restoring {} descriptors",
                    pending.path.display(),
                    written.len()
                );
                rollback(&written).await;
                return Err(e);
            }
            written.push(pending);
        }

        Ok(self.writes.into_iter().map(|w| w.path).collect())
    }
}

async fn rollback(written: &[&PendingWrite]) {
    for pending in written.iter().rev() {
        let restored = match &pending.previous {
            Some(previous) => fs::write_file_utf8(&pending.path, previous).await,
            None => fs::remove_file(&pending.path).await,
        };
        if let Err(e) = restored {
            log::warn!("Could not restore {}: {}", pending.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn applies_writes_in_order() {
        let temp = tempfile::tempdir().unwrap();
        let a = temp.path().join("a/function.json");
        let b = temp.path().join("b/function.json");

        let mut plan = PatchPlan::new();
        plan.write(a.clone(), None, "a".into());
        plan.write(b.clone(), None, "b".into());

        let written = plan.apply().await.unwrap();

        assert_eq!(written, [a.clone(), b.clone()]);
        assert_eq!(tokio::fs::read_to_string(&a).await.unwrap(), "a");
        assert_eq!(tokio::fs::read_to_string(&b).await.unwrap(), "b");
    }

    #[tokio::test]
    async fn failed_write_restores_earlier_files() {
        let temp = tempfile::tempdir().unwrap();
        let existing = temp.path().join("existing.json");
        let created = temp.path().join("created.json");
        tokio::fs::write(&existing, "before").await.unwrap();
        // A directory in place of the file makes the last write fail.
        let blocked = temp.path().join("blocked");
        tokio::fs::create_dir(&blocked).await.unwrap();

        let mut plan = PatchPlan::new();
        plan.write(existing.clone(), Some("before".into()), "after".into());
        plan.write(created.clone(), None, "new".into());
        plan.write(blocked, None, "never".into());

        assert!(plan.apply().await.is_err());
        assert_eq!(tokio::fs::read_to_string(&existing).await.unwrap(), "before");
        assert!(!created.exists());
    }
}
