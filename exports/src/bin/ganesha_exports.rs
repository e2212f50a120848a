// SPDX-License-Identifier: BSD-3-Clause
// Copyright 2025. Triad National Security, LLC.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::*;

use exports::{Export, ExportConfig, ExportStore, Reload};

#[derive(Parser)]
struct Cli {
    /// The generated export configuration file.
    #[arg(long, default_value = "/etc/ganesha/exports.conf")]
    config: PathBuf,

    /// Reload this systemd unit after changing the configuration [default: nfs-ganesha.service].
    #[arg(long, conflicts_with = "reload_pidfile")]
    reload_unit: Option<String>,

    /// Send SIGHUP to the pid in this file after changing the configuration.
    #[arg(long)]
    reload_pidfile: Option<PathBuf>,

    /// Do not reload the NFS server after changing the configuration.
    #[arg(long, conflicts_with_all = ["reload_unit", "reload_pidfile"])]
    no_reload: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the identifiers of all exports.
    List,

    /// Print one export.
    Show { id: i64 },

    /// Create a new export.
    Add {
        #[arg(long)]
        id: i64,
        /// Pseudo-path the export is mounted under.
        #[arg(long)]
        name: String,
        /// Backing filesystem name.
        #[arg(long)]
        fs: String,
        #[arg(long)]
        path: String,
        #[arg(long, default_value = "RW")]
        access: String,
        #[arg(long, value_delimiter = ',', default_value = "4")]
        protocols: Vec<i64>,
        #[arg(long, value_delimiter = ',', required = true)]
        clients: Vec<String>,
    },

    /// Change the access type, protocols and clients of an export.
    Update {
        id: i64,
        #[arg(long)]
        access: String,
        #[arg(long, value_delimiter = ',', required = true)]
        protocols: Vec<i64>,
        #[arg(long, value_delimiter = ',', required = true)]
        clients: Vec<String>,
    },

    /// Delete an export.
    Remove { id: i64 },

    /// Add every export block found in another configuration file.
    Import { file: PathBuf },

    /// Print the configuration file as it would be generated, without writing it.
    Render,
}

const RELOAD_UNIT_DEFAULT: &str = "nfs-ganesha.service";

impl Cli {
    fn reload(&self) -> Reload {
        if self.no_reload {
            return Reload::Disabled;
        }
        match (&self.reload_unit, &self.reload_pidfile) {
            (Some(unit), _) => Reload::Systemd(unit.clone()),
            (None, Some(pidfile)) => Reload::Signal(pidfile.clone()),
            (None, None) => Reload::Systemd(RELOAD_UNIT_DEFAULT.to_string()),
        }
    }
}

/// Looks up an export for display, telling a missing identifier apart from a block that cannot be
/// read as an export.
fn show(store: &ExportStore, id: i64) -> Result<Export, String> {
    let block = store
        .find_by_id(id)
        .ok_or_else(|| format!("No such export: {id}"))?;
    Export::from_block(block).ok_or_else(|| format!("Export {id} is unreadable: {block}"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Cli::parse();
    let config = ExportConfig::new(&args.config, args.reload());
    debug!("using {}", config.path().display());

    match args.command {
        Command::List => {
            for id in config.read(|store| store.ids())? {
                println!("{id}");
            }
        }
        Command::Show { id } => {
            let export = config.read(|store| show(store, id))??;
            println!("{export}");
        }
        Command::Add {
            id,
            name,
            fs,
            path,
            access,
            protocols,
            clients,
        } => {
            let export = Export {
                id,
                name,
                fs,
                path,
                access,
                protocols,
                clients,
            };
            if !config.modify(|store| store.add(&export))? {
                return Err(format!("Unable to add export {id}").into());
            }
            println!("{export}");
        }
        Command::Update {
            id,
            access,
            protocols,
            clients,
        } => {
            if !config.modify(|store| store.update(id, &access, &protocols, &clients))? {
                return Err(format!("Unable to update export {id}").into());
            }
        }
        Command::Remove { id } => {
            if !config.modify(|store| store.remove(id))? {
                return Err(format!("No such export: {id}").into());
            }
        }
        Command::Import { file } => {
            let blocks = ganesha_conf::parse(&std::fs::read_to_string(&file)?)?;
            // Nothing is written unless every block is accepted.
            let added = config.modify(|store| blocks.into_iter().all(|b| store.add_block(b)))?;
            if !added {
                return Err(format!("Unable to import {}: no changes made", file.display()).into());
            }
        }
        Command::Render => {
            print!("{}", config.read(|store| store.render())?);
        }
    }

    Ok(())
}
