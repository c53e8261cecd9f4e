//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! Module with the [`WriteBytes`] trait, to write bytes from known types to a [`Writer`].
//!
//! [`Writer`]: std::io::Write

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use std::io::Write;

use crate::error::{RLibError, Result};

//---------------------------------------------------------------------------//
//                            Trait Definition
//---------------------------------------------------------------------------//

/// This trait allow us to easily write all kind of data types to something that implements [`Write`].
pub trait WriteBytes: Write {

    /// This function tries to write a bool value to `self`.
    ///
    /// It may fail if `self` cannot be written to.
    ///
    /// ```rust
    /// use rspm_lib::binary::WriteBytes;
    ///
    /// let mut data = vec![];
    /// assert!(data.write_bool(true).is_ok());
    /// assert_eq!(data, vec![1]);
    /// ```
    fn write_bool(&mut self, boolean: bool) -> Result<()> {
        WriteBytes::write_u8(self, u8::from(boolean))
    }

    /// This function tries to write a byte value to `self`.
    ///
    /// It may fail if `self` cannot be written to.
    ///
    /// ```rust
    /// use rspm_lib::binary::WriteBytes;
    ///
    /// let mut data = vec![];
    /// assert!(data.write_u8(10).is_ok());
    /// assert_eq!(data, vec![10]);
    /// ```
    fn write_u8(&mut self, value: u8) -> Result<()> {
        WriteBytesExt::write_u8(self, value).map_err(From::from)
    }

    /// This function tries to write an u16 value to `self`.
    ///
    /// It may fail if `self` cannot be written to.
    ///
    /// ```rust
    /// use rspm_lib::binary::WriteBytes;
    ///
    /// let mut data = vec![];
    /// assert!(data.write_u16(258).is_ok());
    /// assert_eq!(data, vec![2, 1]);
    /// ```
    fn write_u16(&mut self, integer: u16) -> Result<()> {
        WriteBytesExt::write_u16::<LittleEndian>(self, integer).map_err(From::from)
    }

    /// This function tries to write an u32 value to `self`.
    ///
    /// It may fail if `self` cannot be written to.
    ///
    /// ```rust
    /// use rspm_lib::binary::WriteBytes;
    ///
    /// let mut data = vec![];
    /// assert!(data.write_u32(258).is_ok());
    /// assert_eq!(data, vec![2, 1, 0, 0]);
    /// ```
    fn write_u32(&mut self, integer: u32) -> Result<()> {
        WriteBytesExt::write_u32::<LittleEndian>(self, integer).map_err(From::from)
    }

    /// This function tries to write a BigEndian u16 value to `self`.
    ///
    /// It may fail if `self` cannot be written to.
    ///
    /// ```rust
    /// use rspm_lib::binary::WriteBytes;
    ///
    /// let mut data = vec![];
    /// assert!(data.write_u16_be(258).is_ok());
    /// assert_eq!(data, vec![1, 2]);
    /// ```
    fn write_u16_be(&mut self, integer: u16) -> Result<()> {
        WriteBytesExt::write_u16::<BigEndian>(self, integer).map_err(From::from)
    }

    /// This function tries to write a BigEndian u32 value to `self`.
    ///
    /// It may fail if `self` cannot be written to.
    ///
    /// ```rust
    /// use rspm_lib::binary::WriteBytes;
    ///
    /// let mut data = vec![];
    /// assert!(data.write_u32_be(258).is_ok());
    /// assert_eq!(data, vec![0, 0, 1, 2]);
    /// ```
    fn write_u32_be(&mut self, integer: u32) -> Result<()> {
        WriteBytesExt::write_u32::<BigEndian>(self, integer).map_err(From::from)
    }

    /// This function tries to write a BigEndian u64 value to `self`.
    ///
    /// It may fail if `self` cannot be written to.
    ///
    /// ```rust
    /// use rspm_lib::binary::WriteBytes;
    ///
    /// let mut data = vec![];
    /// assert!(data.write_u64_be(10).is_ok());
    /// assert_eq!(data, vec![0, 0, 0, 0, 0, 0, 0, 10]);
    /// ```
    fn write_u64_be(&mut self, integer: u64) -> Result<()> {
        WriteBytesExt::write_u64::<BigEndian>(self, integer).map_err(From::from)
    }

    /// This function tries to write a signed byte value to `self`.
    ///
    /// It may fail if `self` cannot be written to.
    ///
    /// ```rust
    /// use rspm_lib::binary::WriteBytes;
    ///
    /// let mut data = vec![];
    /// assert!(data.write_i8(-2).is_ok());
    /// assert_eq!(data, vec![254]);
    /// ```
    fn write_i8(&mut self, integer: i8) -> Result<()> {
        WriteBytesExt::write_i8(self, integer).map_err(From::from)
    }

    /// This function tries to write a BigEndian i16 value to `self`.
    ///
    /// It may fail if `self` cannot be written to.
    ///
    /// ```rust
    /// use rspm_lib::binary::WriteBytes;
    ///
    /// let mut data = vec![];
    /// assert!(data.write_i16_be(-258).is_ok());
    /// assert_eq!(data, vec![254, 254]);
    /// ```
    fn write_i16_be(&mut self, integer: i16) -> Result<()> {
        WriteBytesExt::write_i16::<BigEndian>(self, integer).map_err(From::from)
    }

    /// This function tries to write a BigEndian i32 value to `self`.
    ///
    /// It may fail if `self` cannot be written to.
    ///
    /// ```rust
    /// use rspm_lib::binary::WriteBytes;
    ///
    /// let mut data = vec![];
    /// assert!(data.write_i32_be(10).is_ok());
    /// assert_eq!(data, vec![0, 0, 0, 10]);
    /// ```
    fn write_i32_be(&mut self, integer: i32) -> Result<()> {
        WriteBytesExt::write_i32::<BigEndian>(self, integer).map_err(From::from)
    }

    /// This function tries to write a BigEndian i64 value to `self`.
    ///
    /// It may fail if `self` cannot be written to.
    ///
    /// ```rust
    /// use rspm_lib::binary::WriteBytes;
    ///
    /// let mut data = vec![];
    /// assert!(data.write_i64_be(10).is_ok());
    /// assert_eq!(data, vec![0, 0, 0, 0, 0, 0, 0, 10]);
    /// ```
    fn write_i64_be(&mut self, integer: i64) -> Result<()> {
        WriteBytesExt::write_i64::<BigEndian>(self, integer).map_err(From::from)
    }

    /// This function tries to write a BigEndian f32 value to `self`.
    ///
    /// It may fail if `self` cannot be written to.
    ///
    /// ```rust
    /// use rspm_lib::binary::WriteBytes;
    ///
    /// let mut data = vec![];
    /// assert!(data.write_f32_be(10.0).is_ok());
    /// assert_eq!(data, vec![65, 32, 0, 0]);
    /// ```
    fn write_f32_be(&mut self, float: f32) -> Result<()> {
        WriteBytesExt::write_f32::<BigEndian>(self, float).map_err(From::from)
    }

    /// This function tries to write an UTF-8 String to `self`.
    ///
    /// It may fail if `self` cannot be written to.
    ///
    /// ```rust
    /// use rspm_lib::binary::WriteBytes;
    ///
    /// let mut data = vec![];
    /// assert!(data.write_string_u8("Wahaha").is_ok());
    /// assert_eq!(data, vec![87, 97, 104, 97, 104, 97]);
    /// ```
    fn write_string_u8(&mut self, string: &str) -> Result<()> {
        self.write_all(string.as_bytes()).map_err(From::from)
    }

    /// This function tries to write an UTF-8 String as a 00-Padded String of the provided size to `self`.
    ///
    /// This one fails if the String provided is bigger than the size we want to write.
    ///
    /// ```rust
    /// use rspm_lib::binary::WriteBytes;
    ///
    /// let mut data = vec![];
    /// assert!(data.write_string_u8_0padded("Waha", 8).is_ok());
    /// assert_eq!(data, vec![87, 97, 104, 97, 0, 0, 0, 0]);
    /// ```
    fn write_string_u8_0padded(&mut self, string: &str, size: usize) -> Result<()> {
        if string.len() > size {
            return Err(RLibError::EncodingPaddedStringError("StringU8".to_owned(), string.to_owned(), string.len(), size));
        }

        self.write_all(string.as_bytes())?;
        self.write_all(&vec![0; size - string.len()])?;
        Ok(())
    }
}

// Automatic implementation for everything that implements `Write`.
impl<W: Write> WriteBytes for W {}
