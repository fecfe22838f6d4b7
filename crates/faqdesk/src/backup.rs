//! Full-file database backups.
//!
//! A backup is a byte copy of the live database file over a single backup
//! file. It is neither incremental nor versioned, and a write that commits
//! while the copy is in progress can leave a torn backup.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};

/// What caused a backup attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Process start, before serving.
    Startup,
    /// A FAQ was created.
    Create,
    /// All FAQs were listed.
    List,
    /// A FAQ was updated.
    Update,
    /// A FAQ was deleted.
    Delete,
    /// Requested explicitly by an operator.
    Manual,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Startup => write!(f, "startup"),
            Self::Create => write!(f, "create"),
            Self::List => write!(f, "list"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Which triggers produce a backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupPolicy {
    /// Master switch for automatic backups.
    pub enabled: bool,
    /// Back up before serving.
    pub on_startup: bool,
    /// Back up after deletes. Off by default: deletes historically skipped it.
    pub after_delete: bool,
}

impl Default for BackupPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            on_startup: true,
            after_delete: false,
        }
    }
}

impl BackupPolicy {
    /// Whether `trigger` should produce a backup.
    #[must_use]
    pub fn applies_to(&self, trigger: Trigger) -> bool {
        match trigger {
            Trigger::Manual => true,
            _ if !self.enabled => false,
            Trigger::Startup => self.on_startup,
            Trigger::Delete => self.after_delete,
            Trigger::Create | Trigger::List | Trigger::Update => true,
        }
    }
}

/// Copies the database file to the backup location.
#[derive(Debug, Clone)]
pub struct Backup {
    source: PathBuf,
    destination: PathBuf,
    policy: BackupPolicy,
}

impl Backup {
    /// Create a backup stage copying `source` over `destination`.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            policy: BackupPolicy::default(),
        }
    }

    /// Build the backup stage described by the configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.database_path(), config.backup_path()).with_policy(BackupPolicy {
            enabled: config.backup.enabled,
            on_startup: config.backup.on_startup,
            after_delete: config.backup.after_delete,
        })
    }

    /// Replace the trigger policy.
    #[must_use]
    pub fn with_policy(mut self, policy: BackupPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The live database file.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The backup file.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// The trigger policy.
    #[must_use]
    pub fn policy(&self) -> BackupPolicy {
        self.policy
    }

    /// Run a backup if the policy covers `trigger`.
    ///
    /// Returns the number of bytes copied, or `None` when skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy fails.
    pub async fn after(&self, trigger: Trigger) -> Result<Option<u64>> {
        if !self.policy.applies_to(trigger) {
            debug!("Skipping backup after {}", trigger);
            return Ok(None);
        }
        let bytes = self.run().await?;
        info!(
            "Backup updated after {}: {} ({} bytes)",
            trigger,
            self.destination.display(),
            bytes
        );
        Ok(Some(bytes))
    }

    /// Copy the database file over the backup file unconditionally.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination directory cannot be created or the
    /// copy fails.
    pub async fn run(&self) -> Result<u64> {
        if let Some(parent) = self.destination.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| Error::DirectoryCreate {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
        }

        tokio::fs::copy(&self.source, &self.destination)
            .await
            .map_err(|source| Error::Backup {
                source_path: self.source.clone(),
                destination: self.destination.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TempDir(PathBuf);

    impl TempDir {
        fn new() -> Self {
            let path = std::env::temp_dir().join(format!("faqdesk_backup_{}", uuid::Uuid::new_v4()));
            std::fs::create_dir_all(&path).unwrap();
            Self(path)
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = BackupPolicy::default();

        assert!(policy.applies_to(Trigger::Startup));
        assert!(policy.applies_to(Trigger::Create));
        assert!(policy.applies_to(Trigger::List));
        assert!(policy.applies_to(Trigger::Update));
        assert!(!policy.applies_to(Trigger::Delete));
        assert!(policy.applies_to(Trigger::Manual));
    }

    #[test]
    fn test_disabled_policy_only_allows_manual() {
        let policy = BackupPolicy {
            enabled: false,
            on_startup: true,
            after_delete: true,
        };

        assert!(!policy.applies_to(Trigger::Startup));
        assert!(!policy.applies_to(Trigger::Create));
        assert!(!policy.applies_to(Trigger::Delete));
        assert!(policy.applies_to(Trigger::Manual));
    }

    #[test]
    fn test_after_delete_opt_in() {
        let policy = BackupPolicy {
            after_delete: true,
            ..BackupPolicy::default()
        };
        assert!(policy.applies_to(Trigger::Delete));
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/srv/faq.db"));
        config.storage.backup_path = Some(PathBuf::from("/srv/bak/faq.db"));
        config.backup.on_startup = false;

        let backup = Backup::from_config(&config);

        assert_eq!(backup.source(), Path::new("/srv/faq.db"));
        assert_eq!(backup.destination(), Path::new("/srv/bak/faq.db"));
        assert!(!backup.policy().on_startup);
    }

    #[test]
    fn test_trigger_display() {
        assert_eq!(Trigger::Update.to_string(), "update");
        assert_eq!(Trigger::Manual.to_string(), "manual");
    }

    #[tokio::test]
    async fn test_run_copies_bytes() {
        let dir = TempDir::new();
        let source = dir.0.join("faq.db");
        std::fs::write(&source, b"live database").unwrap();
        let backup = Backup::new(&source, dir.0.join("nested").join("backup.db"));

        let copied = backup.run().await.unwrap();

        assert_eq!(copied, 13);
        assert_eq!(std::fs::read(backup.destination()).unwrap(), b"live database");
    }

    #[tokio::test]
    async fn test_run_overwrites_previous_backup() {
        let dir = TempDir::new();
        let source = dir.0.join("faq.db");
        let destination = dir.0.join("backup.db");
        std::fs::write(&destination, b"a much older and longer backup").unwrap();
        std::fs::write(&source, b"new").unwrap();

        Backup::new(&source, &destination).run().await.unwrap();

        assert_eq!(std::fs::read(&destination).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_run_missing_source() {
        let dir = TempDir::new();
        let backup = Backup::new(dir.0.join("absent.db"), dir.0.join("backup.db"));

        let err = backup.run().await.unwrap_err();

        assert!(matches!(err, Error::Backup { .. }));
        assert!(err.to_string().contains("absent.db"));
    }

    #[tokio::test]
    async fn test_after_skips_delete_by_default() {
        let dir = TempDir::new();
        let source = dir.0.join("faq.db");
        std::fs::write(&source, b"data").unwrap();
        let backup = Backup::new(&source, dir.0.join("backup.db"));

        assert_eq!(backup.after(Trigger::Delete).await.unwrap(), None);
        assert!(!backup.destination().exists());

        assert_eq!(backup.after(Trigger::Create).await.unwrap(), Some(4));
        assert!(backup.destination().exists());
    }
}
