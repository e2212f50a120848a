// SPDX-License-Identifier: BSD-3-Clause
// Copyright 2025. Triad National Security, LLC.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Mutex, PoisonError};

use log::*;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tempfile::NamedTempFile;

use crate::store::ExportStore;
use crate::Error;

/// How to get the NFS server to pick up a rewritten configuration file.
#[derive(Debug, Clone, PartialEq)]
pub enum Reload {
    Disabled,
    /// `systemctl reload` the given unit.
    Systemd(String),
    /// Send SIGHUP to the process whose pid is stored in the given file.
    Signal(PathBuf),
}

impl Reload {
    pub fn trigger(&self) -> crate::Result<()> {
        match self {
            Reload::Disabled => Ok(()),
            Reload::Systemd(unit) => {
                debug!("reloading {unit}");
                let status = Command::new("systemctl").arg("reload").arg(unit).status()?;
                if !status.success() {
                    return Err(Error::Reload(format!(
                        "systemctl reload {unit} failed: {status}"
                    )));
                }
                Ok(())
            }
            Reload::Signal(pidfile) => {
                let contents = std::fs::read_to_string(pidfile)?;
                let pid: i32 = contents.trim().parse().map_err(|_| {
                    Error::Reload(format!("{}: not a pid: {:?}", pidfile.display(), contents))
                })?;
                // kill(2) treats 0 and negative pids as process groups.
                if pid <= 0 {
                    return Err(Error::Reload(format!(
                        "{}: not a process id: {pid}",
                        pidfile.display()
                    )));
                }
                debug!("sending SIGHUP to {pid}");
                kill(Pid::from_raw(pid), Signal::SIGHUP)?;
                Ok(())
            }
        }
    }
}

/// An export configuration file, together with the means to reload the server after it changes.
///
/// Each operation is one critical section: the file is read, the operation applied, and the file
/// written and the server reloaded if needed, all under a single lock.
pub struct ExportConfig {
    path: PathBuf,
    reload: Reload,
    store: Mutex<ExportStore>,
}

impl ExportConfig {
    pub fn new<P: AsRef<Path>>(path: P, reload: Reload) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            reload,
            store: Mutex::new(ExportStore::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the current file and passes the store to `f`.
    pub fn read<T>(&self, f: impl FnOnce(&ExportStore) -> T) -> crate::Result<T> {
        // Every operation reloads the store from disk, so a panic in an earlier one cannot leave
        // anything behind.
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        self.load(&mut *store)?;
        Ok(f(&*store))
    }

    /// Loads the current file and passes the store to `f` to change. If `f` returns true, the
    /// file is rewritten and the server reloaded. Returns the result of `f`.
    ///
    /// A failed reload is only logged, since the new file is already in place by then.
    pub fn modify(&self, f: impl FnOnce(&mut ExportStore) -> bool) -> crate::Result<bool> {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        self.load(&mut *store)?;
        if !f(&mut *store) {
            return Ok(false);
        }

        self.write(&store.render())?;
        debug!("wrote {}", self.path.display());

        if let Err(e) = self.reload.trigger() {
            warn!("Unable to reload NFS server: {e}");
        }
        Ok(true)
    }

    /// Replaces the file with a renamed sibling, so readers see either the old contents or the
    /// new ones in full. The permissions of an existing file are kept.
    fn write(&self, text: &str) -> crate::Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(text.as_bytes())?;
        file.as_file().sync_all()?;
        if let Ok(meta) = std::fs::metadata(&self.path) {
            file.as_file().set_permissions(meta.permissions())?;
        }
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// A missing file is an empty configuration.
    fn load(&self, store: &mut ExportStore) -> crate::Result<()> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not exist yet", self.path.display());
                String::new()
            }
            Err(e) => return Err(e.into()),
        };
        store.load(&text)?;
        Ok(())
    }
}
