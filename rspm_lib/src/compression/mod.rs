//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! This module contains the code to compress/decompress the data blocks of a SqPack entry.
//!
//! SqPack blocks use raw DEFLATE streams (no zlib wrapper, no checksum), each one preceded
//! by a small header:
//!
//! | Bytes | Type  | Data                                               |
//! | ----- | ----- | -------------------------------------------------- |
//! |  4    | [u32] | Size of this header (always 16).                   |
//! |  4    | [u32] | Version (always 0).                                |
//! |  4    | [u32] | Compressed size, or 32000 if the block is stored.  |
//! |  4    | [u32] | Decompressed size.                                 |
//!
//! A `compressed_size` of exactly 32000 is a sentinel meaning the payload that follows is
//! stored verbatim, `decompressed_size` bytes long. Any other value means the payload is a
//! raw DEFLATE stream of `compressed_size` bytes.
//!
//! The traits [`Compressible`] and [`Decompressible`] within this module contain functions
//! to compress/decompress block payloads. Implementations of these two traits for &[[`u8`]]
//! are provided within this module.

use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

use std::io::{Read, Write};

use crate::error::{RLibError, Result};

/// Value of the `compressed_size` field of a block whose payload is stored uncompressed.
pub const COMPRESSED_SIZE_NOT_COMPRESSED: u32 = 32000;


//---------------------------------------------------------------------------//
//                                  Traits
//---------------------------------------------------------------------------//

/// Internal trait to implement compression over a data type.
pub trait Compressible {

    /// This function compress the data of a block payload, returning the compressed data.
    fn compress(&self) -> Result<Vec<u8>>;
}

/// Internal trait to implement decompression over a data type.
pub trait Decompressible {

    /// This function decompress the provided block payload into a buffer of `decompressed_size`
    /// bytes, or returns an error if the decompression failed or produced the wrong amount of data.
    fn decompress(&self, decompressed_size: usize) -> Result<Vec<u8>>;
}

//---------------------------------------------------------------------------//
//                              Implementations
//---------------------------------------------------------------------------//

impl Compressible for [u8] {
    fn compress(&self) -> Result<Vec<u8>> {
        let mut encoder = DeflateEncoder::new(Vec::with_capacity(self.len()), Compression::default());
        encoder.write_all(self)?;
        encoder.finish().map_err(From::from)
    }
}

impl Decompressible for &[u8] {
    fn decompress(&self, decompressed_size: usize) -> Result<Vec<u8>> {
        let mut decoder = DeflateDecoder::new(*self);
        let mut data = Vec::with_capacity(decompressed_size);
        decoder.read_to_end(&mut data).map_err(|_| RLibError::DataCannotBeDecompressed)?;

        if data.len() != decompressed_size {
            return Err(RLibError::DecompressedSizeMismatch(data.len(), decompressed_size));
        }

        Ok(data)
    }
}
