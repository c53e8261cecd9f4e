//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! This crate contains the basic functionality for reading SqPack archives and the files
//! within: the container itself, the Excel database stored in it, and the SeString rich-text
//! format its localised strings use.
//!
//! The usual flow goes like this:
//! - Open a [`SqpackReader`](crate::sqpack::SqpackReader) over the `.index` file of a
//!   category. It owns the `.index2` and `.datN` handles too.
//! - Ask it for files by path or by hash, through
//!   [`PathSpec`](crate::sqpack::path_spec::PathSpec)s. Whatever shape the entry is stored in
//!   (plain binary, model, texture), you get the recomposed file back as bytes.
//! - For the Excel database, open an [`ExcelReader`](crate::excel::ExcelReader) over a sheet
//!   name: it resolves the `.exh`/`.exd` files through the SqPack reader, handles the
//!   per-language paging, and hands out typed rows.
//! - String cells come out as [`SeString`](crate::files::sestring::SeString)s: lazy,
//!   payload-aware, and byte-identical when re-encoded.
//!
//! Everything is strictly read-only at the archive level: the per-format encoders exist
//! because the formats are symmetric and the tests build their fixtures through them, but
//! writing whole archives back is out of scope.

pub mod binary;
pub mod compression;
pub mod error;
pub mod excel;
pub mod files;
pub mod schema;
pub mod sqpack;
pub mod utils;
