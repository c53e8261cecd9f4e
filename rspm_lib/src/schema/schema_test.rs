//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! Module containing tests for the column-name schemas.

use crate::error::RLibError;

use super::*;

//---------------------------------------------------------------------------//
//                                  Tests
//---------------------------------------------------------------------------//

/// Test a schema survives a save/load cycle.
#[test]
fn test_save_load_schema() {
    let folder = tempfile::tempdir().unwrap();
    let path = folder.path().join("schema.json");

    let before = Schema::new("7.0", vec![
        SheetDefinition::new("Action", &["Name", "Icon", "ActionCategory"]),
        SheetDefinition::new("Item", &["Singular", "Plural", "Description"]),
    ]);
    before.save(&path).unwrap();

    let after = Schema::load(&path).unwrap();
    assert_eq!(before, after);
}

/// Test the name resolution of a sheet definition.
#[test]
fn test_column_index() {
    let definition = SheetDefinition::new("Action", &["Name", "Icon", "ActionCategory"]);

    assert_eq!(definition.column_index("Name").unwrap(), 0);
    assert_eq!(definition.column_index("ActionCategory").unwrap(), 2);

    // Unknown names fail loudly instead of returning a miss.
    let result = definition.column_index("Nam");
    assert!(matches!(result, Err(RLibError::UnknownColumnName(..))));
}

/// Test the sheet lookup of a schema.
#[test]
fn test_definition_lookup() {
    let schema = Schema::new("7.0", vec![SheetDefinition::new("Action", &["Name"])]);
    assert!(schema.definition("Action").is_some());
    assert!(schema.definition("Item").is_none());
}
