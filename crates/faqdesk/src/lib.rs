//! `faqdesk` - A localized FAQ service
//!
//! This library provides the FAQ store, the backup stage, the message catalog
//! and the HTTP routes served by the `faqdesk` binary.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod i18n;
pub mod logging;
pub mod model;
pub mod storage;

pub use api::AppContext;
pub use backup::{Backup, BackupPolicy, Trigger};
pub use config::Config;
pub use error::{Error, Result};
pub use i18n::{Catalog, MessageKey};
pub use logging::init_logging;
pub use model::{Answer, Faq, FaqDraft, FaqId};
pub use storage::{Storage, StorageStats};
