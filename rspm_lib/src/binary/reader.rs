//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! Module with the [`ReadBytes`] trait, to read bytes to known types.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

use std::io::{Read, Seek, SeekFrom};

use crate::error::Result;

//---------------------------------------------------------------------------//
//                            Trait Definition
//---------------------------------------------------------------------------//

/// This trait allow us to easily read all kind of data from a source that implements [`Read`] + [`Seek`].
pub trait ReadBytes: Read + Seek {

    /// This function returns the lenght of the data we're reading.
    ///
    /// Extracted from the nightly std.
    ///
    /// ```rust
    /// use std::io::Cursor;
    ///
    /// use rspm_lib::binary::ReadBytes;
    ///
    /// let data = vec![1, 2, 3, 4];
    /// let mut cursor = Cursor::new(data);
    /// let len = cursor.len().unwrap();
    /// assert_eq!(len, 4);
    /// ```
    fn len(&mut self) -> Result<u64> {
        let old_pos = self.stream_position()?;
        let len = self.seek(SeekFrom::End(0))?;
        // Avoid seeking a third time when we were already at the end of the
        // stream. The branch is usually way cheaper than a seek operation.
        if old_pos != len {
            self.seek(SeekFrom::Start(old_pos))?;
        }
        Ok(len)
    }

    /// This function returns if the data is empty.
    ///
    /// It's slightly faster than checking for len == 0.
    ///
    /// ```rust
    /// use std::io::Cursor;
    ///
    /// use rspm_lib::binary::ReadBytes;
    ///
    /// let data = vec![];
    /// let mut cursor = Cursor::new(data);
    /// assert!(ReadBytes::is_empty(&mut cursor).unwrap());
    /// ```
    fn is_empty(&mut self) -> Result<bool> {
        self.len().map(|len| len == 0)
    }

    /// This function returns the amount of bytes specified in the `size` argument as a [`Vec<u8>`].
    ///
    /// If `rewind` is true, the cursor will be reset to its original position once the data is returned.
    ///
    /// ```rust
    /// use std::io::Cursor;
    ///
    /// use rspm_lib::binary::ReadBytes;
    ///
    /// let data = vec![1, 2, 3, 4];
    /// let mut cursor = Cursor::new(data.to_vec());
    /// let data_read = cursor.read_slice(4, false).unwrap();
    /// assert_eq!(data, data_read);
    /// ```
    fn read_slice(&mut self, size: usize, rewind: bool) -> Result<Vec<u8>> {
        let mut data = vec![0; size];

        // If len is 0, just return.
        if size == 0 {
            return Ok(data)
        }

        self.read_exact(&mut data)?;

        if rewind {
            self.seek(SeekFrom::Current(-(size as i64)))?;
        }

        Ok(data)
    }

    /// This function tries to read a bool value from `self`.
    ///
    /// This is simple: 0 is false, anything else is true. The SqPack structs store their
    /// flags as full bytes, and the games accept any non-zero value as true.
    ///
    /// ```rust
    /// use std::io::Cursor;
    ///
    /// use rspm_lib::binary::ReadBytes;
    ///
    /// let data = vec![0, 1];
    /// let mut cursor = Cursor::new(data);
    ///
    /// assert_eq!(cursor.read_bool().unwrap(), false);
    /// assert_eq!(cursor.read_bool().unwrap(), true);
    /// assert!(cursor.read_bool().is_err());
    /// ```
    fn read_bool(&mut self) -> Result<bool> {
        let value = ReadBytes::read_u8(self)?;
        Ok(value != 0)
    }

    /// This function tries to read an unsigned byte value from `self`.
    ///
    /// It may fail if there are not enough bytes to read the value or `self` cannot be read.
    ///
    /// ```rust
    /// use std::io::Cursor;
    ///
    /// use rspm_lib::binary::ReadBytes;
    ///
    /// let data = vec![10];
    /// let mut cursor = Cursor::new(data);
    /// let data = cursor.read_u8().unwrap();
    ///
    /// assert_eq!(data, 10);
    /// assert_eq!(cursor.read_u8().is_err(), true);
    /// ```
    fn read_u8(&mut self) -> Result<u8> {
        ReadBytesExt::read_u8(self).map_err(From::from)
    }

    /// This function tries to read an u16 value from `self`.
    ///
    /// It may fail if there are not enough bytes to read the value or `self` cannot be read.
    ///
    /// ```rust
    /// use std::io::Cursor;
    ///
    /// use rspm_lib::binary::ReadBytes;
    ///
    /// let data = vec![10, 0, 10];
    /// let mut cursor = Cursor::new(data);
    /// let data = cursor.read_u16().unwrap();
    ///
    /// assert_eq!(data, 10);
    /// assert_eq!(cursor.read_u16().is_err(), true);
    /// ```
    fn read_u16(&mut self) -> Result<u16> {
        ReadBytesExt::read_u16::<LittleEndian>(self).map_err(From::from)
    }

    /// This function tries to read an u32 value from `self`.
    ///
    /// It may fail if there are not enough bytes to read the value or `self` cannot be read.
    ///
    /// ```rust
    /// use std::io::Cursor;
    ///
    /// use rspm_lib::binary::ReadBytes;
    ///
    /// let data = vec![10, 0, 0, 0, 10, 0, 0];
    /// let mut cursor = Cursor::new(data);
    /// let data = cursor.read_u32().unwrap();
    ///
    /// assert_eq!(data, 10);
    /// assert_eq!(cursor.read_u32().is_err(), true);
    /// ```
    fn read_u32(&mut self) -> Result<u32> {
        ReadBytesExt::read_u32::<LittleEndian>(self).map_err(From::from)
    }

    /// This function tries to read a BigEndian u16 value from `self`.
    ///
    /// It may fail if there are not enough bytes to read the value or `self` cannot be read.
    ///
    /// ```rust
    /// use std::io::Cursor;
    ///
    /// use rspm_lib::binary::ReadBytes;
    ///
    /// let data = vec![0, 10, 10];
    /// let mut cursor = Cursor::new(data);
    /// let data = cursor.read_u16_be().unwrap();
    ///
    /// assert_eq!(data, 10);
    /// assert_eq!(cursor.read_u16_be().is_err(), true);
    /// ```
    fn read_u16_be(&mut self) -> Result<u16> {
        ReadBytesExt::read_u16::<BigEndian>(self).map_err(From::from)
    }

    /// This function tries to read a BigEndian u32 value from `self`.
    ///
    /// It may fail if there are not enough bytes to read the value or `self` cannot be read.
    ///
    /// ```rust
    /// use std::io::Cursor;
    ///
    /// use rspm_lib::binary::ReadBytes;
    ///
    /// let data = vec![0, 0, 0, 10, 10, 0, 0];
    /// let mut cursor = Cursor::new(data);
    /// let data = cursor.read_u32_be().unwrap();
    ///
    /// assert_eq!(data, 10);
    /// assert_eq!(cursor.read_u32_be().is_err(), true);
    /// ```
    fn read_u32_be(&mut self) -> Result<u32> {
        ReadBytesExt::read_u32::<BigEndian>(self).map_err(From::from)
    }

    /// This function tries to read a BigEndian u64 value from `self`.
    ///
    /// It may fail if there are not enough bytes to read the value or `self` cannot be read.
    ///
    /// ```rust
    /// use std::io::Cursor;
    ///
    /// use rspm_lib::binary::ReadBytes;
    ///
    /// let data = vec![0, 0, 0, 0, 0, 0, 0, 10, 10];
    /// let mut cursor = Cursor::new(data);
    /// let data = cursor.read_u64_be().unwrap();
    ///
    /// assert_eq!(data, 10);
    /// assert_eq!(cursor.read_u64_be().is_err(), true);
    /// ```
    fn read_u64_be(&mut self) -> Result<u64> {
        ReadBytesExt::read_u64::<BigEndian>(self).map_err(From::from)
    }

    /// This function tries to read a signed byte value from `self`.
    ///
    /// It may fail if there are not enough bytes to read the value or `self` cannot be read.
    ///
    /// ```rust
    /// use std::io::Cursor;
    ///
    /// use rspm_lib::binary::ReadBytes;
    ///
    /// let data = vec![254];
    /// let mut cursor = Cursor::new(data);
    /// let data = cursor.read_i8().unwrap();
    ///
    /// assert_eq!(data, -2);
    /// assert_eq!(cursor.read_i8().is_err(), true);
    /// ```
    fn read_i8(&mut self) -> Result<i8> {
        ReadBytesExt::read_i8(self).map_err(From::from)
    }

    /// This function tries to read a BigEndian i16 value from `self`.
    ///
    /// It may fail if there are not enough bytes to read the value or `self` cannot be read.
    ///
    /// ```rust
    /// use std::io::Cursor;
    ///
    /// use rspm_lib::binary::ReadBytes;
    ///
    /// let data = vec![254, 254, 10];
    /// let mut cursor = Cursor::new(data);
    /// let data = cursor.read_i16_be().unwrap();
    ///
    /// assert_eq!(data, -258);
    /// assert_eq!(cursor.read_i16_be().is_err(), true);
    /// ```
    fn read_i16_be(&mut self) -> Result<i16> {
        ReadBytesExt::read_i16::<BigEndian>(self).map_err(From::from)
    }

    /// This function tries to read a BigEndian i32 value from `self`.
    ///
    /// It may fail if there are not enough bytes to read the value or `self` cannot be read.
    ///
    /// ```rust
    /// use std::io::Cursor;
    ///
    /// use rspm_lib::binary::ReadBytes;
    ///
    /// let data = vec![0, 0, 0, 10, 10, 0, 0];
    /// let mut cursor = Cursor::new(data);
    /// let data = cursor.read_i32_be().unwrap();
    ///
    /// assert_eq!(data, 10);
    /// assert_eq!(cursor.read_i32_be().is_err(), true);
    /// ```
    fn read_i32_be(&mut self) -> Result<i32> {
        ReadBytesExt::read_i32::<BigEndian>(self).map_err(From::from)
    }

    /// This function tries to read a BigEndian i64 value from `self`.
    ///
    /// It may fail if there are not enough bytes to read the value or `self` cannot be read.
    ///
    /// ```rust
    /// use std::io::Cursor;
    ///
    /// use rspm_lib::binary::ReadBytes;
    ///
    /// let data = vec![0, 0, 0, 0, 0, 0, 0, 10, 10];
    /// let mut cursor = Cursor::new(data);
    /// let data = cursor.read_i64_be().unwrap();
    ///
    /// assert_eq!(data, 10);
    /// assert_eq!(cursor.read_i64_be().is_err(), true);
    /// ```
    fn read_i64_be(&mut self) -> Result<i64> {
        ReadBytesExt::read_i64::<BigEndian>(self).map_err(From::from)
    }

    /// This function tries to read a BigEndian f32 value from `self`.
    ///
    /// It may fail if there are not enough bytes to read the value or `self` cannot be read.
    ///
    /// ```rust
    /// use std::io::Cursor;
    ///
    /// use rspm_lib::binary::ReadBytes;
    ///
    /// let data = vec![65, 32, 0, 0];
    /// let mut cursor = Cursor::new(data);
    /// let data = cursor.read_f32_be().unwrap();
    ///
    /// assert_eq!(data, 10.0);
    /// assert_eq!(cursor.read_f32_be().is_err(), true);
    /// ```
    fn read_f32_be(&mut self) -> Result<f32> {
        ReadBytesExt::read_f32::<BigEndian>(self).map_err(From::from)
    }

    /// This function tries to read an UTF-8 String value of the provided `size` from `self`.
    ///
    /// It may fail if there are not enough bytes to read the value, the value contains invalid
    /// characters for an UTF-8 String, or `self` cannot be read.
    ///
    /// ```rust
    /// use std::io::Cursor;
    ///
    /// use rspm_lib::binary::ReadBytes;
    ///
    /// let data = vec![87, 97, 104, 97, 104, 97, 104, 97, 104, 97];
    /// let mut cursor = Cursor::new(data);
    /// let data = cursor.read_string_u8(10).unwrap();
    ///
    /// assert_eq!(data, "Wahahahaha");
    /// assert_eq!(cursor.read_string_u8(10).is_err(), true);
    /// ```
    fn read_string_u8(&mut self, size: usize) -> Result<String> {
        let mut data = vec![0; size];
        self.read_exact(&mut data)?;
        String::from_utf8(data).map_err(From::from)
    }

    /// This function tries to read a 00-Padded UTF-8 String value of the provided `size` from `self`.
    ///
    /// Note that `size` here is the full lenght of the String, including the 00 bytes that act as padding.
    ///
    /// It may fail if there are not enough bytes to read the value, the value contains invalid
    /// characters for an UTF-8 String, or `self` cannot be read.
    ///
    /// ```rust
    /// use std::io::Cursor;
    ///
    /// use rspm_lib::binary::ReadBytes;
    ///
    /// let data = vec![87, 97, 104, 97, 104, 97, 0, 0, 0, 0];
    /// let mut cursor = Cursor::new(data);
    /// let data = cursor.read_string_u8_0padded(10).unwrap();
    ///
    /// assert_eq!(data, "Wahaha");
    /// assert_eq!(cursor.read_string_u8_0padded(10).is_err(), true);
    /// ```
    fn read_string_u8_0padded(&mut self, size: usize) -> Result<String> {
        let mut data = vec![0; size];
        self.read_exact(&mut data)?;

        let size_no_zeros = memchr::memchr(0, &data).unwrap_or(size);
        String::from_utf8(data[..size_no_zeros].to_vec()).map_err(From::from)
    }
}

// Automatic implementation for everything that implements `Read + Seek`.
impl<R: Read + Seek> ReadBytes for R {}
