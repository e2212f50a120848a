// SPDX-License-Identifier: BSD-3-Clause
// Copyright 2025. Triad National Security, LLC.

// Names and fixed values of the NFS Ganesha export configuration.

pub const BLOCK_EXPORT: &str = "EXPORT";
pub const BLOCK_FSAL: &str = "FSAL";
pub const BLOCK_CLIENT: &str = "CLIENT";

pub const ATTR_EXPORT_ID: &str = "EXPORT_ID";
pub const ATTR_PATH: &str = "PATH";
pub const ATTR_PSEUDO: &str = "PSEUDO";
pub const ATTR_ACCESS_TYPE: &str = "ACCESS_TYPE";
pub const ATTR_PROTOCOLS: &str = "PROTOCOLS";
pub const ATTR_TRANSPORTS: &str = "TRANSPORTS";
pub const ATTR_SECTYPE: &str = "SECTYPE";
pub const ATTR_SQUASH: &str = "SQUASH";
pub const ATTR_EXPIRE: &str = "ATTR_EXPIRATION_TIME";

pub const ATTR_FSAL_NAME: &str = "NAME";
pub const ATTR_FSAL_USER: &str = "USER_ID";
pub const ATTR_FSAL_FS: &str = "FILESYSTEM";

pub const ATTR_CLIENTS: &str = "CLIENTS";

/// Valid export identifiers, inclusive.
pub const EXPORT_ID_MIN: i64 = 1;
pub const EXPORT_ID_MAX: i64 = 65535;

pub const ACCESS_TYPES: &[&str] = &["RW", "RO", "MDONLY", "MDONLY_RO", "NONE"];
pub const PROTOCOLS: &[i64] = &[3, 4];

// Every created export gets these.
pub const TRANSPORTS_DEFAULT: &[&str] = &["UDP", "TCP"];
pub const SECTYPE_DEFAULT: &str = "sys";
pub const SQUASH_DEFAULT: &str = "no_root_squash";
pub const EXPIRE_DEFAULT: i64 = 0;
pub const FSAL_NAME_DEFAULT: &str = "CEPH";
pub const FSAL_USER_DEFAULT: &str = "admin";

/// Written at the top of every generated file.
pub const BANNER: &str = "
###############################################################
# This file has been automatically generated. Do NOT edit it. #
###############################################################

";
