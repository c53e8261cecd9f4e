//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! This module contains the column-name schemas of the Excel sheets.
//!
//! The games don't ship column names: a sheet's header only says "column 3 is a u16 at offset
//! 8". Names are community knowledge, maintained outside the game files, so this crate treats
//! them as an external input: a JSON document mapping sheet names to ordered column name
//! lists, loaded with [`Schema::load`] and handed to the row façade when named access is
//! wanted.
//!
//! Nothing in the readers requires a schema: positional access always works.

use getset::Getters;
use serde_derive::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::{RLibError, Result};

#[cfg(test)] mod schema_test;

//---------------------------------------------------------------------------//
//                              Enum & Structs
//---------------------------------------------------------------------------//

/// This struct holds the column-name definitions of a set of sheets.
#[derive(PartialEq, Eq, Clone, Debug, Default, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct Schema {

    /// Version of the game data this schema was written against.
    version: String,

    /// The sheet definitions, by sheet name.
    sheets: BTreeMap<String, SheetDefinition>,
}

/// Column names of one sheet, in column order.
#[derive(PartialEq, Eq, Clone, Debug, Default, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct SheetDefinition {

    /// Name of the sheet.
    name: String,

    /// Name of each column, in the order the sheet's header declares them.
    columns: Vec<String>,
}

//---------------------------------------------------------------------------//
//                              Implementations
//---------------------------------------------------------------------------//

impl Schema {

    /// This function loads a schema from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = BufReader::new(File::open(path)?);
        serde_json::from_reader(file).map_err(From::from)
    }

    /// This function saves a schema to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(file, self).map_err(From::from)
    }

    /// This function creates a schema from its parts.
    pub fn new(version: &str, definitions: Vec<SheetDefinition>) -> Self {
        Self {
            version: version.to_owned(),
            sheets: definitions.into_iter().map(|definition| (definition.name.to_owned(), definition)).collect(),
        }
    }

    /// This function returns the definition of the provided sheet, if the schema has one.
    pub fn definition(&self, sheet_name: &str) -> Option<&SheetDefinition> {
        self.sheets.get(sheet_name)
    }
}

impl SheetDefinition {

    /// This function creates a definition from its parts.
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            columns: columns.iter().map(|column| (*column).to_owned()).collect(),
        }
    }

    /// This function resolves a column name to its position.
    ///
    /// Unknown names are an error, not a silent miss: a typo in a column name should fail
    /// loudly, at the lookup site.
    pub fn column_index(&self, column_name: &str) -> Result<usize> {
        self.columns.iter()
            .position(|column| column == column_name)
            .ok_or_else(|| RLibError::UnknownColumnName(column_name.to_owned(), self.name.to_owned()))
    }
}
