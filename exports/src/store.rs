// SPDX-License-Identifier: BSD-3-Clause
// Copyright 2025. Triad National Security, LLC.

use log::*;

use ganesha_conf::{Block, ParseError, Value};

use crate::consts::*;
use crate::export::Export;

/// The exports of one configuration file, held as the file's top-level blocks.
///
/// Every top-level block is kept, whatever its tag, so directives and non-export blocks are
/// written back out unchanged. The store does no I/O and no locking: see
/// [`ExportConfig`](crate::ExportConfig) for that.
///
/// Mutating operations report failure with `false` and leave the store untouched.
#[derive(Debug, Default, Clone)]
pub struct ExportStore {
    exports: Vec<Block>,
}

impl ExportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole store with the contents of a configuration file. On error the store is
    /// left as it was.
    pub fn load(&mut self, text: &str) -> Result<(), ParseError> {
        self.exports = ganesha_conf::parse(text)?;
        debug!("loaded {} blocks", self.exports.len());
        Ok(())
    }

    /// Produces the complete file: the "do not edit" banner followed by every block.
    pub fn render(&self) -> String {
        let mut out = String::from(BANNER);
        for block in self.exports.iter() {
            out.push_str(&block.serialize(0));
            out.push('\n');
        }
        out
    }

    pub fn blocks(&self) -> &[Block] {
        &self.exports
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }

    /// Identifiers of the stored exports, in file order.
    pub fn ids(&self) -> Vec<i64> {
        self.exports
            .iter()
            .filter_map(|e| e.attribute(ATTR_EXPORT_ID).and_then(Value::as_int))
            .collect()
    }

    pub fn find_by_id(&self, id: i64) -> Option<&Block> {
        self.lookup(ATTR_EXPORT_ID, &Value::Int(id))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Block> {
        self.lookup(ATTR_PSEUDO, &Value::from(name))
    }

    /// Only the top-level attributes of each block are compared.
    fn lookup(&self, key: &str, value: &Value) -> Option<&Block> {
        self.exports
            .iter()
            .find(|e| e.attribute(key) == Some(value))
    }

    fn position(&self, id: i64) -> Option<usize> {
        let id = Value::Int(id);
        self.exports
            .iter()
            .position(|e| e.attribute(ATTR_EXPORT_ID) == Some(&id))
    }

    /// Checks each of the given parameters:
    /// - the identifier is within `EXPORT_ID_MIN..=EXPORT_ID_MAX`;
    /// - no export already uses the name;
    /// - the access type is one of `ACCESS_TYPES`;
    /// - every protocol is one of `PROTOCOLS`.
    ///
    /// Parameters that are `None` are not checked.
    pub fn validate(
        &self,
        id: Option<i64>,
        name: Option<&str>,
        access: Option<&str>,
        protocols: Option<&[i64]>,
    ) -> bool {
        if let Some(id) = id {
            if !(EXPORT_ID_MIN..=EXPORT_ID_MAX).contains(&id) {
                warn!("Invalid export ID: {id}");
                return false;
            }
        }
        if let Some(name) = name {
            if self.find_by_name(name).is_some() {
                warn!("Export with name {name} already exists");
                return false;
            }
        }
        if let Some(access) = access {
            if !ACCESS_TYPES.contains(&access) {
                warn!("Invalid access type: {access}");
                return false;
            }
        }
        if let Some(protocols) = protocols {
            if !protocols.iter().all(|p| PROTOCOLS.contains(p)) {
                warn!("Invalid protocols: {protocols:?}");
                return false;
            }
        }
        true
    }

    /// Adds a new export built from `export` and the fixed defaults.
    pub fn add(&mut self, export: &Export) -> bool {
        if !self.validate(
            Some(export.id),
            Some(&export.name),
            Some(&export.access),
            Some(&export.protocols),
        ) {
            return false;
        }
        if self.find_by_id(export.id).is_some() {
            warn!("Export with ID {} already exists", export.id);
            return false;
        }

        self.exports.push(export.block());
        debug!("added export {} ({})", export.id, export.name);
        true
    }

    /// Adds an already built export block, subject to the same checks as [`ExportStore::add`].
    /// The block must carry an integer `EXPORT_ID`; the other checked attributes are looked up
    /// anywhere in the block and skipped when absent.
    pub fn add_block(&mut self, block: Block) -> bool {
        let Some(id) = block.get(ATTR_EXPORT_ID).and_then(Value::as_int) else {
            warn!("Export block has no integer {ATTR_EXPORT_ID}");
            return false;
        };
        let name = match block.get(ATTR_PSEUDO).map(Value::as_str) {
            None => None,
            Some(Some(name)) => Some(name),
            Some(None) => {
                warn!("Export {id}: {ATTR_PSEUDO} is not a string");
                return false;
            }
        };
        let access = match block.get(ATTR_ACCESS_TYPE).map(Value::as_str) {
            None => None,
            Some(Some(access)) => Some(access),
            Some(None) => {
                warn!("Export {id}: {ATTR_ACCESS_TYPE} is not a string");
                return false;
            }
        };
        let protocols = match block.get(ATTR_PROTOCOLS).map(Value::to_ints) {
            None => None,
            Some(Some(protocols)) => Some(protocols),
            Some(None) => {
                warn!("Export {id}: {ATTR_PROTOCOLS} is not a list of integers");
                return false;
            }
        };

        if !self.validate(Some(id), name, access, protocols.as_deref()) {
            return false;
        }
        if self.find_by_id(id).is_some() {
            warn!("Export with ID {id} already exists");
            return false;
        }

        self.exports.push(block);
        debug!("added export block {id}");
        true
    }

    /// Changes the access type, protocols and clients of an existing export.
    ///
    /// The values are written with [`Block::update`], which reaches every block in the export's
    /// tree that already has the attribute; that is how `CLIENTS` in the `CLIENT` child is found.
    pub fn update(&mut self, id: i64, access: &str, protocols: &[i64], clients: &[String]) -> bool {
        if !self.validate(None, None, Some(access), Some(protocols)) {
            return false;
        }
        let Some(idx) = self.position(id) else {
            warn!("No such export ID: {id}");
            return false;
        };

        let export = &mut self.exports[idx];
        let updated = export.update(ATTR_ACCESS_TYPE, &Value::from(access))
            + export.update(ATTR_PROTOCOLS, &Value::from(protocols.to_vec()))
            + export.update(ATTR_CLIENTS, &Value::from(clients.to_vec()));
        debug!("updated export {id}: {updated} attributes changed");
        true
    }

    /// Removes the export with the given identifier, if there is one.
    pub fn remove(&mut self, id: i64) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.exports.remove(idx);
                debug!("removed export {id}");
                true
            }
            None => false,
        }
    }
}
