//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! PathSpecs are the requests used to look files up inside a SqPack.
//!
//! A PathSpec carries any subset of a full path, a (path, name) hash pair and a full-path
//! hash, because the archives themselves only store hashes. A spec built from a real path can
//! derive all three hashes; a spec built from hashes alone cannot resolve synonym collisions,
//! as those need the literal path.
//!
//! The hash is the standard 32-bit CRC of the lowercased path bytes, bitwise-inverted.

use std::fmt;

/// This function computes the hash the archives index their paths by.
pub fn compute_hash(data: &[u8]) -> u32 {
    !crc32fast::hash(data)
}

//---------------------------------------------------------------------------//
//                              Enum & Structs
//---------------------------------------------------------------------------//

/// This struct represents a request for a file inside a SqPack.
#[derive(Clone, Debug, Default)]
pub struct PathSpec {

    /// The full path of the file, lowercased, with `/` separators.
    full_path: Option<String>,

    /// Hash of the path portion of the full path (everything before the last `/`).
    path_hash: Option<u32>,

    /// Hash of the name portion of the full path (everything after the last `/`).
    name_hash: Option<u32>,

    /// Hash of the whole full path.
    full_path_hash: Option<u32>,
}

//---------------------------------------------------------------------------//
//                              Implementations
//---------------------------------------------------------------------------//

impl PathSpec {

    /// This function builds a spec from a path, deriving all three hashes.
    ///
    /// The path is normalised first: `\` becomes `/`, and everything is ASCII-lowercased.
    /// An empty path produces a spec with nothing in it.
    pub fn new(path: &str) -> Self {
        let full_path = path.replace('\\', "/").to_ascii_lowercase();
        if full_path.is_empty() {
            return Self::default();
        }

        let (path_portion, name_portion) = match full_path.rfind('/') {
            Some(index) => (&full_path[..index], &full_path[index + 1..]),
            None => ("", full_path.as_str()),
        };

        let path_hash = compute_hash(path_portion.as_bytes());
        let name_hash = compute_hash(name_portion.as_bytes());
        let full_path_hash = compute_hash(full_path.as_bytes());

        Self {
            full_path: Some(full_path),
            path_hash: Some(path_hash),
            name_hash: Some(name_hash),
            full_path_hash: Some(full_path_hash),
        }
    }

    /// This function builds a spec from a (path, name) hash pair alone.
    pub fn from_pair_hashes(path_hash: u32, name_hash: u32) -> Self {
        Self {
            full_path: None,
            path_hash: Some(path_hash),
            name_hash: Some(name_hash),
            full_path_hash: None,
        }
    }

    /// This function builds a spec from a full-path hash alone.
    pub fn from_full_path_hash(full_path_hash: u32) -> Self {
        Self {
            full_path: None,
            path_hash: None,
            name_hash: None,
            full_path_hash: Some(full_path_hash),
        }
    }

    /// This function returns if the spec carries the literal full path.
    pub fn has_full_path(&self) -> bool {
        self.full_path.is_some()
    }

    /// This function returns if the spec carries the (path, name) hash pair.
    pub fn has_path_name_hash(&self) -> bool {
        self.path_hash.is_some() && self.name_hash.is_some()
    }

    /// This function returns if the spec carries the full-path hash.
    pub fn has_full_path_hash(&self) -> bool {
        self.full_path_hash.is_some()
    }

    /// This function returns the literal full path, if the spec carries it.
    pub fn full_path(&self) -> Option<&str> {
        self.full_path.as_deref()
    }

    /// This function returns the path-portion hash, if the spec carries it.
    pub fn path_hash(&self) -> Option<u32> {
        self.path_hash
    }

    /// This function returns the name-portion hash, if the spec carries it.
    pub fn name_hash(&self) -> Option<u32> {
        self.name_hash
    }

    /// This function returns the full-path hash, if the spec carries it.
    pub fn full_path_hash(&self) -> Option<u32> {
        self.full_path_hash
    }
}

impl From<&str> for PathSpec {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<&String> for PathSpec {
    fn from(path: &String) -> Self {
        Self::new(path)
    }
}

/// Two specs are equivalent when any matching hash pair agrees.
impl PartialEq for PathSpec {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(left), Some(right)) = (self.full_path_hash, other.full_path_hash) {
            if left == right {
                return true;
            }
        }

        if let (Some(left_path), Some(right_path)) = (self.path_hash, other.path_hash) {
            if let (Some(left_name), Some(right_name)) = (self.name_hash, other.name_hash) {
                if left_path == right_path && left_name == right_name {
                    return true;
                }
            }
        }

        false
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.full_path {
            Some(full_path) => write!(f, "{full_path}"),
            None => match (self.path_hash, self.name_hash, self.full_path_hash) {
                (Some(path_hash), Some(name_hash), _) => write!(f, "~{path_hash:08x}/~{name_hash:08x}"),
                (_, _, Some(full_path_hash)) => write!(f, "~{full_path_hash:08x}"),
                _ => write!(f, "(empty)"),
            },
        }
    }
}
