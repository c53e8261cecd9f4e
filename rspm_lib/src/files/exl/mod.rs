//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! Exl files are the sheet lists of the Excel database. There's one that matters:
//! `exd/root.exl`, the list of every sheet the game ships.
//!
//! Unlike the rest of the Excel family this one is plain text: a `EXLT,version` signature
//! line, then one `Name,id` line per sheet. The id is the sheet's numeric handle, or `-1`
//! for sheets that only exist by name.

use getset::Getters;

use crate::binary::{ReadBytes, WriteBytes};
use crate::error::{RLibError, Result};
use crate::files::{DecodeableExtraData, Decodeable, EncodeableExtraData, Encodeable};

/// Signature every Exl file starts with.
const SIGNATURE: &str = "EXLT";

/// Path of the root sheet list within its SqPack.
pub const ROOT_LIST_PATH: &str = "exd/root.exl";

#[cfg(test)] mod exl_test;

//---------------------------------------------------------------------------//
//                              Enum & Structs
//---------------------------------------------------------------------------//

/// This holds an entire Exl sheet list decoded in memory.
#[derive(PartialEq, Eq, Clone, Debug, Default, Getters)]
#[getset(get = "pub")]
pub struct Exl {

    /// Version of the list.
    version: u32,

    /// The listed sheets, in file order, with their numeric ids (-1 when they have none).
    entries: Vec<(String, i32)>,
}

//---------------------------------------------------------------------------//
//                           Implementation of Exl
//---------------------------------------------------------------------------//

impl Decodeable for Exl {

    fn decode<R: ReadBytes>(data: &mut R, _extra_data: &Option<DecodeableExtraData>) -> Result<Self> {
        let len = data.len()? as usize;
        let text = data.read_string_u8(len)?;
        let mut lines = text.lines();

        let header = lines.next().ok_or(RLibError::DecodingExcelNotAnExl)?;
        let version = match header.split_once(',') {
            Some((SIGNATURE, version)) => version.trim().parse::<u32>().map_err(|_| RLibError::DecodingExcelNotAnExl)?,
            _ => return Err(RLibError::DecodingExcelNotAnExl),
        };

        let mut entries = vec![];
        for line in lines {
            if line.is_empty() {
                continue;
            }

            let (name, id) = line.split_once(',').ok_or(RLibError::DecodingExcelNotAnExl)?;
            let id = id.trim().parse::<i32>().map_err(|_| RLibError::DecodingExcelNotAnExl)?;
            entries.push((name.to_owned(), id));
        }

        Ok(Self {
            version,
            entries,
        })
    }
}

impl Encodeable for Exl {

    fn encode<W: WriteBytes>(&mut self, buffer: &mut W, _extra_data: &Option<EncodeableExtraData>) -> Result<()> {
        buffer.write_string_u8(&format!("{SIGNATURE},{}\r\n", self.version))?;
        for (name, id) in &self.entries {
            buffer.write_string_u8(&format!("{name},{id}\r\n"))?;
        }

        Ok(())
    }
}

impl Exl {

    /// This function creates a new Exl list from its entries.
    pub fn new(version: u32, entries: Vec<(String, i32)>) -> Self {
        Self {
            version,
            entries,
        }
    }

    /// This function returns the numeric id of the provided sheet, if the list has it.
    pub fn id_by_name(&self, name: &str) -> Option<i32> {
        self.entries.iter()
            .find(|(entry_name, _)| entry_name.eq_ignore_ascii_case(name))
            .map(|(_, id)| *id)
    }

    /// This function returns the name of the sheet with the provided id, if any has it.
    pub fn name_by_id(&self, id: i32) -> Option<&str> {
        if id == -1 {
            return None;
        }

        self.entries.iter()
            .find(|(_, entry_id)| *entry_id == id)
            .map(|(name, _)| &**name)
    }
}
