//! User persistence.
//!
//! # Responsibilities
//! - Define the `UserStore` contract (load all, save all)
//! - Flat-file implementation, one `id|name|email|phone` line per user
//! - In-memory implementation for tests and embedding
//!
//! # Design Decisions
//! - `save` replaces the whole store, there is no partial update
//! - No locking or atomic rename; concurrent writers are unsupported
//! - A missing file is an empty store

use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::routing::HandlerError;

const FIELD_SEPARATOR: char = '|';

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt record on line {line}: {content:?}")]
    Corrupt { line: usize, content: String },

    #[error("store lock poisoned")]
    Poisoned,
}

impl From<StorageError> for HandlerError {
    fn from(err: StorageError) -> Self {
        HandlerError::Source(Box::new(err))
    }
}

/// One stored user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl User {
    fn to_line(&self) -> String {
        format!("{}|{}|{}|{}", self.id, self.name, self.email, self.phone)
    }

    fn from_line(line: &str, number: usize) -> Result<Self, StorageError> {
        let corrupt = || StorageError::Corrupt {
            line: number,
            content: line.to_string(),
        };

        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        let [id, name, email, phone] = fields[..] else {
            return Err(corrupt());
        };
        Ok(Self {
            id: id.parse().map_err(|_| corrupt())?,
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        })
    }
}

/// True when `value` can be stored without breaking the line format.
pub fn is_storable(value: &str) -> bool {
    !value.contains([FIELD_SEPARATOR, '\r', '\n'])
}

/// Next id to assign: one past the largest, or 1 for an empty store.
///
/// `None` once the largest id is `u64::MAX`.
pub fn next_id(users: &[User]) -> Option<u64> {
    match users.iter().map(|u| u.id).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

/// Storage contract consumed by the users handlers.
pub trait UserStore: Send + Sync {
    /// All users in stored order.
    fn load(&self) -> Result<Vec<User>, StorageError>;

    /// Replace the entire store with `users`.
    fn save(&self, users: &[User]) -> Result<(), StorageError>;
}

/// Users kept in a text file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl UserStore for FileStore {
    fn load(&self) -> Result<Vec<User>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| User::from_line(line.trim(), i + 1))
            .collect()
    }

    fn save(&self, users: &[User]) -> Result<(), StorageError> {
        let file = fs::File::create(&self.path).map_err(|e| self.io_error(e))?;
        let mut writer = BufWriter::new(file);
        for user in users {
            writeln!(writer, "{}", user.to_line()).map_err(|e| self.io_error(e))?;
        }
        writer.flush().map_err(|e| self.io_error(e))?;

        tracing::debug!(path = %self.path.display(), count = users.len(), "Users saved");
        Ok(())
    }
}

/// Users kept in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }
}

impl UserStore for MemoryStore {
    fn load(&self) -> Result<Vec<User>, StorageError> {
        Ok(self.users.lock().map_err(|_| StorageError::Poisoned)?.clone())
    }

    fn save(&self, users: &[User]) -> Result<(), StorageError> {
        *self.users.lock().map_err(|_| StorageError::Poisoned)? = users.to_vec();
        Ok(())
    }
}
