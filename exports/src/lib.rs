// SPDX-License-Identifier: BSD-3-Clause
// Copyright 2025. Triad National Security, LLC.

//! Management of the exports of an NFS Ganesha server through its generated export
//! configuration file.

pub mod config;
pub mod consts;
pub mod export;
pub mod store;

use std::fmt;

pub use config::{ExportConfig, Reload};
pub use export::{ClientId, Export};
pub use store::ExportStore;

pub type Result<T> = std::result::Result<T, Error>;

/// The errors that can arise from reading, writing or reloading an export configuration. Invalid
/// or conflicting exports are not errors: store operations report those by returning false.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Parse(ganesha_conf::ParseError),
    Signal(nix::Error),
    Reload(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Parse(e) => write!(f, "Configuration unreadable: {e}"),
            Self::Signal(e) => write!(f, "Error signalling NFS server: {e}"),
            Self::Reload(e) => write!(f, "Reload error: {e}"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ganesha_conf::ParseError> for Error {
    fn from(e: ganesha_conf::ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<nix::Error> for Error {
    fn from(e: nix::Error) -> Self {
        Self::Signal(e)
    }
}
