//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! This module contains the decoding/encoding logic of the file formats stored inside a SqPack.
//!
//! # Known file types
//!
//! | File Type     | Decoding Supported | Encoding Supported |
//! | ------------- | ------------------ | ------------------ |
//! | [`Exh`]       | Yes                | Yes                |
//! | [`Exd`]       | Yes                | Yes                |
//! | [`Exl`]       | Yes                | Yes                |
//! | [`SeString`]  | Yes                | Yes                |
//!
//! The encoders exist because the formats are symmetric and the test suite builds its own
//! fixtures through them. Repacking whole archives is not supported.
//!
//! For more information about specific file types, including their binary format spec,
//! please **check their respective modules**.
//!
//! [`Exh`]: crate::files::exh::Exh
//! [`Exd`]: crate::files::exd::Exd
//! [`Exl`]: crate::files::exl::Exl
//! [`SeString`]: crate::files::sestring::SeString

use getset::*;

use crate::binary::{ReadBytes, WriteBytes};
use crate::error::Result;

use self::exh::Exh;

pub mod exd;
pub mod exh;
pub mod exl;
pub mod sestring;

//---------------------------------------------------------------------------//
//                              Enum & Structs
//---------------------------------------------------------------------------//

/// This is a generic struct to easily pass additional data to a [Decodeable::decode] method.
///
/// To know what you need to provide to each file type, please check their documentation.
#[derive(Clone, Default, Getters, Setters)]
#[getset(get = "pub", set = "pub")]
pub struct DecodeableExtraData<'a> {

    /// Decoded Excel header of the sheet an `.exd` page belongs to. Only for `.exd` files.
    exh: Option<&'a Exh>,

    /// Name of the file we're trying to decode.
    file_name: Option<&'a str>,
}

/// This is a generic struct to easily pass additional data to a [Encodeable::encode] method.
///
/// To know what you need to provide to each file type, please check their documentation.
#[derive(Clone, Default, Getters, Setters)]
#[getset(get = "pub", set = "pub")]
pub struct EncodeableExtraData<'a> {

    /// Decoded Excel header of the sheet an `.exd` page belongs to. Only for `.exd` files.
    exh: Option<&'a Exh>,
}

//---------------------------------------------------------------------------//
//                           Trait Definitions
//---------------------------------------------------------------------------//

/// A generic trait to implement decoding logic from anything implementing [ReadBytes](crate::binary::ReadBytes)
/// into structured types.
pub trait Decodeable: Send + Sync {

    /// This method provides a generic and expandable way to decode anything implementing [ReadBytes](crate::binary::ReadBytes)
    /// into the implementor's structure.
    ///
    /// The parameter `extra_data` contains arguments that can be used to provide additional data needed for the decoding process.
    fn decode<R: ReadBytes>(data: &mut R, extra_data: &Option<DecodeableExtraData>) -> Result<Self> where Self: Sized;
}

/// A generic trait to implement encoding logic from structured types into anything implementing [WriteBytes](crate::binary::WriteBytes).
pub trait Encodeable: Send + Sync {

    /// This method provides a generic and expandable way to encode any implementor's structure into anything
    /// implementing [WriteBytes](crate::binary::WriteBytes).
    ///
    /// The parameter `extra_data` contains arguments that can be used to provide additional data needed for the encoding process.
    fn encode<W: WriteBytes>(&mut self, buffer: &mut W, extra_data: &Option<EncodeableExtraData>) -> Result<()>;
}
