//! Test doubles for engine tests.

use crate::error::DistributionError;
use crate::fs_port::{FileSystemEntry, FileSystemPort, LocalFileSystem};
use crate::ports::ConfirmationPort;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Answers confirmations from a script; approves once the script runs out.
/// Every message asked is recorded.
#[derive(Default)]
pub struct ScriptedConfirm {
    answers: RefCell<VecDeque<bool>>,
    pub asked: RefCell<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn approving() -> Self {
        Self::default()
    }

    pub fn with_answers(answers: &[bool]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().copied().collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    pub fn asked_count(&self) -> usize {
        self.asked.borrow().len()
    }
}

impl ConfirmationPort for ScriptedConfirm {
    fn confirm(&self, message: &str) -> bool {
        self.asked.borrow_mut().push(message.to_string());
        self.answers.borrow_mut().pop_front().unwrap_or(true)
    }

    fn prompt_text(&self, _message: &str, default: Option<&str>) -> Option<String> {
        default.map(str::to_string)
    }
}

/// Local filesystem that fails every copy/rename/create touching one of the
/// configured folders
pub struct FailingFs {
    inner: LocalFileSystem,
    failing: Vec<PathBuf>,
    pub attempts: RefCell<Vec<PathBuf>>,
}

impl FailingFs {
    pub fn failing_in(failing: Vec<PathBuf>) -> Self {
        Self {
            inner: LocalFileSystem::new(),
            failing,
            attempts: RefCell::new(Vec::new()),
        }
    }

    fn check(&self, path: &Path) -> Result<(), DistributionError> {
        self.attempts.borrow_mut().push(path.to_path_buf());
        if self.failing.iter().any(|f| path.starts_with(f)) {
            return Err(DistributionError::io(path, "injected failure"));
        }
        Ok(())
    }
}

impl FileSystemPort for FailingFs {
    fn list_files(&self, dir: &Path) -> Result<Vec<FileSystemEntry>, DistributionError> {
        self.inner.list_files(dir)
    }

    fn list_dirs(&self, dir: &Path) -> Result<Vec<FileSystemEntry>, DistributionError> {
        self.inner.list_dirs(dir)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn create_dir(&self, path: &Path) -> Result<(), DistributionError> {
        self.check(path)?;
        self.inner.create_dir(path)
    }

    fn copy(
        &self,
        src: &Path,
        dst: &Path,
        preserve_metadata: bool,
    ) -> Result<(), DistributionError> {
        self.check(dst)?;
        self.inner.copy(src, dst, preserve_metadata)
    }

    fn rename(&self, src: &Path, dst: &Path) -> Result<(), DistributionError> {
        self.check(dst)?;
        self.inner.rename(src, dst)
    }
}
