// SPDX-License-Identifier: BSD-3-Clause
// Copyright 2025. Triad National Security, LLC.

use std::convert::Infallible;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use cidr::IpCidr;
use ganesha_conf::{Block, Value};

use crate::consts::*;

/// An NFS export, as carried by an `EXPORT` block and its `FSAL` and `CLIENT` children.
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub id: i64,
    /// The pseudo-path clients mount the export under.
    pub name: String,
    /// The backing filesystem name given to the FSAL.
    pub fs: String,
    /// Path of the exported directory within the backing filesystem.
    pub path: String,
    pub access: String,
    pub protocols: Vec<i64>,
    /// Client address patterns allowed to mount the export.
    pub clients: Vec<String>,
}

impl Export {
    /// Reads an export back out of a block tree. Returns `None` if any field is missing or does
    /// not have the expected type.
    pub fn from_block(block: &Block) -> Option<Self> {
        let string = |key: &str| block.get(key).and_then(Value::as_str).map(str::to_string);
        Some(Export {
            id: block.get(ATTR_EXPORT_ID)?.as_int()?,
            name: string(ATTR_PSEUDO)?,
            fs: string(ATTR_FSAL_FS)?,
            path: string(ATTR_PATH)?,
            access: string(ATTR_ACCESS_TYPE)?,
            protocols: block.get(ATTR_PROTOCOLS)?.to_ints()?,
            clients: block.get(ATTR_CLIENTS)?.to_strings()?,
        })
    }

    /// Builds the full `EXPORT` block for this export, filling in the fixed defaults.
    pub fn block(&self) -> Block {
        let fsal = Block::new(BLOCK_FSAL)
            .with_attribute(ATTR_FSAL_NAME, FSAL_NAME_DEFAULT)
            .with_attribute(ATTR_FSAL_USER, FSAL_USER_DEFAULT)
            .with_attribute(ATTR_FSAL_FS, self.fs.as_str());

        let client =
            Block::new(BLOCK_CLIENT).with_attribute(ATTR_CLIENTS, self.clients.clone());

        Block::new(BLOCK_EXPORT)
            .with_attribute(ATTR_EXPORT_ID, self.id)
            .with_attribute(ATTR_PATH, self.path.as_str())
            .with_attribute(ATTR_PSEUDO, self.name.as_str())
            .with_attribute(ATTR_ACCESS_TYPE, self.access.as_str())
            .with_attribute(ATTR_PROTOCOLS, self.protocols.clone())
            .with_attribute(ATTR_TRANSPORTS, TRANSPORTS_DEFAULT.to_vec())
            .with_attribute(ATTR_SECTYPE, SECTYPE_DEFAULT)
            .with_attribute(ATTR_SQUASH, SQUASH_DEFAULT)
            .with_attribute(ATTR_EXPIRE, EXPIRE_DEFAULT)
            .with_child(fsal)
            .with_child(client)
    }

    pub fn client_ids(&self) -> Vec<ClientId> {
        self.clients
            .iter()
            .map(|c| match c.parse::<ClientId>() {
                Ok(id) => id,
                Err(never) => match never {},
            })
            .collect()
    }
}

impl fmt::Display for Export {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "id:         {}", self.id)?;
        writeln!(f, "name:       {}", self.name)?;
        writeln!(f, "filesystem: {}", self.fs)?;
        writeln!(f, "path:       {}", self.path)?;
        writeln!(f, "access:     {}", self.access)?;
        let protocols: Vec<String> = self.protocols.iter().map(|p| format!("NFSv{p}")).collect();
        writeln!(f, "protocols:  {}", protocols.join(", "))?;
        write!(f, "clients:")?;
        for client in self.client_ids() {
            write!(f, "\n    {client} ({})", client.kind())?;
        }
        Ok(())
    }
}

/// The kinds of client pattern an export may list.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientId {
    Name(String),
    Addr(IpAddr),
    Netgroup(String),
    Network(IpCidr),
}

impl FromStr for ClientId {
    type Err = Infallible;

    /// Anything that is not an address, network or `@netgroup` is taken to be a host name or
    /// wildcard.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(addr) = s.parse::<IpAddr>() {
            return Ok(ClientId::Addr(addr));
        }
        if let Ok(network) = s.parse::<IpCidr>() {
            return Ok(ClientId::Network(network));
        }
        if let Some(group) = s.strip_prefix('@') {
            return Ok(ClientId::Netgroup(group.to_string()));
        }
        Ok(ClientId::Name(s.to_string()))
    }
}

impl ClientId {
    pub fn kind(&self) -> &'static str {
        match self {
            ClientId::Name(_) => "host",
            ClientId::Addr(_) => "address",
            ClientId::Netgroup(_) => "netgroup",
            ClientId::Network(_) => "network",
        }
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClientId::Name(n) => write!(f, "{n}"),
            ClientId::Addr(a) => write!(f, "{a}"),
            ClientId::Netgroup(g) => write!(f, "@{g}"),
            ClientId::Network(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share() -> Export {
        Export {
            id: 10000,
            name: "my_share".into(),
            fs: "nfs".into(),
            path: "path_to_share".into(),
            access: "RW".into(),
            protocols: vec![4],
            clients: vec!["10.69.0.0/16".into()],
        }
    }

    #[test]
    fn block_layout() {
        let block = share().block();
        assert_eq!(block.tag(), BLOCK_EXPORT);
        let keys: Vec<&str> = block.attributes().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            [
                ATTR_EXPORT_ID,
                ATTR_PATH,
                ATTR_PSEUDO,
                ATTR_ACCESS_TYPE,
                ATTR_PROTOCOLS,
                ATTR_TRANSPORTS,
                ATTR_SECTYPE,
                ATTR_SQUASH,
                ATTR_EXPIRE,
            ]
        );
        let tags: Vec<&str> = block.children().iter().map(Block::tag).collect();
        assert_eq!(tags, [BLOCK_FSAL, BLOCK_CLIENT]);
        assert_eq!(block.get(ATTR_FSAL_USER), Some(&Value::from(FSAL_USER_DEFAULT)));
    }

    #[test]
    fn block_and_back() {
        assert_eq!(Export::from_block(&share().block()), Some(share()));
    }

    #[test]
    fn from_parsed_block() {
        let text = share().block().serialize(0);
        let blocks = ganesha_conf::parse(&text).unwrap();
        // The single protocol and client read back as scalars.
        assert_eq!(blocks[0].get(ATTR_PROTOCOLS), Some(&Value::Int(4)));
        assert_eq!(Export::from_block(&blocks[0]), Some(share()));
    }

    #[test]
    fn from_incomplete_block() {
        let block = Block::new(BLOCK_EXPORT).with_attribute(ATTR_EXPORT_ID, 3);
        assert_eq!(Export::from_block(&block), None);

        let mut block = share().block();
        block.set_attribute(ATTR_EXPORT_ID, "three");
        assert_eq!(Export::from_block(&block), None);
    }

    #[test]
    fn client_kinds() {
        let parse = |s: &str| s.parse::<ClientId>().unwrap();
        assert!(matches!(parse("10.69.0.0/16"), ClientId::Network(_)));
        assert!(matches!(parse("fd00::/8"), ClientId::Network(_)));
        assert!(matches!(parse("192.168.0.7"), ClientId::Addr(_)));
        assert_eq!(parse("@admins"), ClientId::Netgroup("admins".into()));
        assert_eq!(parse("*.example.com"), ClientId::Name("*.example.com".into()));
        assert_eq!(parse("@admins").to_string(), "@admins");
        assert_eq!(parse("10.69.0.0/16").kind(), "network");
    }

    #[test]
    fn display() {
        let shown = share().to_string();
        assert!(shown.contains("protocols:  NFSv4"));
        assert!(shown.contains("10.69.0.0/16 (network)"));
    }
}
