//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! This module contains the decoder of the entries stored inside the `.datN` files of a
//! SqPack: the part that turns a stored, block-compressed entry into the file it represents.
//!
//! # Entry Structure
//!
//! Every entry starts with a 24-byte header:
//!
//! | Bytes | Type  | Data                                                        |
//! | ----- | ----- | ----------------------------------------------------------- |
//! | 4     | [u32] | Size of the header region, block tables included.           |
//! | 4     | [u32] | Type: 1 Empty, 2 Binary, 3 Model, 4 Texture.                |
//! | 4     | [u32] | Size of the decoded file.                                   |
//! | 4     | [u32] | Unknown.                                                    |
//! | 4     | [u32] | Amount of 128-byte units allocated to the entry.            |
//! | 4     | [u32] | Amount of blocks, or the model version for Model entries.   |
//!
//! What follows depends on the type. All three non-empty shapes are built out of the same
//! block primitive described in the [`compression`](crate::compression) module.
//!
//! **Binary** entries have a table of `offset: u32, block_size: u16, decompressed_size: u16`
//! locators; their blocks decode back-to-back into the output.
//!
//! **Model** entries have a single 184-byte locator summarizing eleven chunks (stack,
//! runtime, and vertex/edge-geometry/index buffers for three levels of detail), followed by a
//! flat [u16] table with the stored size of every block. The decoder rebuilds a standalone
//! model file: a synthetic 68-byte header followed by the decoded chunks in fixed order.
//!
//! **Texture** entries have one locator per mipmap plus a flat [u16] sub-block size table;
//! the texture's own header is stored verbatim at the start of the body and copied out, and
//! each mipmap's block stream decodes at the output offset the entry declares for it.

use getset::Getters;

use crate::binary::{ReadBytes, WriteBytes};
use crate::compression::{COMPRESSED_SIZE_NOT_COMPRESSED, Decompressible};
use crate::error::{RLibError, Result};

use std::io::Cursor;

/// Size in bytes of the entry header.
pub const ENTRY_HEADER_SIZE: usize = 24;

/// Size in bytes of a block header.
pub const BLOCK_HEADER_SIZE: usize = 16;

/// Size in bytes of the synthetic model file header.
pub const MODEL_HEADER_SIZE: usize = 68;

/// Amount of logical chunks of a model entry.
const MODEL_CHUNK_COUNT: usize = 11;

/// Size in bytes of the texture file header stored at the start of a texture entry's body.
const TEXTURE_HEADER_SIZE: usize = 28;


//---------------------------------------------------------------------------//
//                              Enum & Structs
//---------------------------------------------------------------------------//

/// Shapes an entry can be stored as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryType {
    Empty,
    Binary,
    Model,
    Texture,
}

/// The 24-byte header every entry starts with.
#[derive(Clone, Copy, Debug, Getters)]
#[getset(get = "pub")]
pub struct EntryHeader {

    /// Size of the header region, block tables included. The blocks live after it.
    header_size: u32,

    /// Shape of the entry.
    entry_type: EntryType,

    /// Size of the decoded file.
    decompressed_size: u32,

    /// Unknown.
    unknown_1: u32,

    /// Amount of 128-byte units allocated to the entry.
    aligned_unit_allocation_count: u32,

    /// Amount of blocks, or the model version for Model entries.
    block_count_or_version: u32,
}

/// Block locator of a Binary entry.
#[derive(Clone, Copy, Debug)]
struct BlockLocator {

    /// Offset of the block, relative to the end of the entry's header region.
    offset: u32,

    /// Stored size of the block, header and compressed payload included.
    _block_size: u16,

    /// Decompressed size of the block.
    _decompressed_size: u16,
}

/// Per-chunk table of a model entry, in file order. The logical chunk order interleaves the
/// per-LOD buffers instead: stack, runtime, then vertex/edge-geometry/index per LOD.
#[derive(Clone, Copy, Debug)]
struct ModelChunkInfo<T> {
    stack: T,
    runtime: T,
    vertex: [T; 3],
    edge_geometry_vertex: [T; 3],
    index: [T; 3],
}

/// The 184-byte block locator of a Model entry.
#[derive(Clone, Copy, Debug)]
struct ModelBlockLocator {
    _aligned_decompressed_sizes: ModelChunkInfo<u32>,
    _chunk_sizes: ModelChunkInfo<u32>,
    first_block_offsets: ModelChunkInfo<u32>,
    first_block_indices: ModelChunkInfo<u16>,
    block_count: ModelChunkInfo<u16>,
    vertex_declaration_count: u16,
    material_count: u16,
    lod_count: u8,
    enable_index_buffer_streaming: bool,
    enable_edge_geometry: bool,
    padding: u8,
}

/// Per-mipmap block locator of a Texture entry.
#[derive(Clone, Copy, Debug)]
struct TextureBlockLocator {
    first_block_offset: u32,
    _total_size: u32,
    _decompressed_size: u32,
    first_sub_block_index: u32,
    sub_block_count: u32,
}

/// The synthetic header the Model decoder prepends to the decoded chunks, so the output is a
/// standalone model file.
#[derive(Clone, Copy, Debug, Default)]
struct ModelFileHeader {
    version: u32,
    stack_memory_size: u32,
    runtime_memory_size: u32,
    vertex_declaration_count: u16,
    material_count: u16,
    vertex_data_offset: [u32; 3],
    index_data_offset: [u32; 3],
    vertex_buffer_size: [u32; 3],
    index_buffer_size: [u32; 3],
    lod_count: u8,
    enable_index_buffer_streaming: bool,
    enable_edge_geometry: bool,
    padding: u8,
}

//---------------------------------------------------------------------------//
//                              Implementations
//---------------------------------------------------------------------------//

/// This function decodes a whole entry out of a `.datN` source: it reads `read_size` bytes at
/// `offset`, and decompresses whatever shape of entry they hold into the file it represents.
pub fn decode_entry<R: ReadBytes>(data: &mut R, offset: u64, read_size: u64) -> Result<Vec<u8>> {
    data.seek(std::io::SeekFrom::Start(offset))?;
    let entry = data.read_slice(read_size as usize, false)?;

    let header = EntryHeader::decode(&mut Cursor::new(&entry))?;
    match header.entry_type {
        EntryType::Empty => Ok(vec![]),
        EntryType::Binary => decode_binary_entry(&header, &entry),
        EntryType::Model => decode_model_entry(&header, &entry),
        EntryType::Texture => decode_texture_entry(&header, &entry),
    }
}

/// This function decodes one block at `offset` within the entry: either a stored payload or a
/// raw DEFLATE stream, as the block's header says.
fn decode_block(entry: &[u8], offset: usize) -> Result<Vec<u8>> {
    let header_bytes = entry.get(offset..offset + BLOCK_HEADER_SIZE).ok_or(RLibError::DecodingBlockHeaderOutOfBounds(offset))?;
    let mut cursor = Cursor::new(header_bytes);
    let header_size = cursor.read_u32()? as usize;
    let _version = cursor.read_u32()?;
    let compressed_size = cursor.read_u32()?;
    let decompressed_size = cursor.read_u32()? as usize;

    let payload_offset = offset + header_size;
    if compressed_size == COMPRESSED_SIZE_NOT_COMPRESSED {
        let payload = entry.get(payload_offset..payload_offset + decompressed_size).ok_or(RLibError::DecodingBlockShortData(offset))?;
        Ok(payload.to_vec())
    } else {
        let payload = entry.get(payload_offset..payload_offset + compressed_size as usize).ok_or(RLibError::DecodingBlockShortData(offset))?;
        payload.decompress(decompressed_size)
    }
}

/// This function decodes a Binary entry: its blocks, concatenated in table order.
fn decode_binary_entry(header: &EntryHeader, entry: &[u8]) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(entry);
    cursor.set_position(ENTRY_HEADER_SIZE as u64);

    let mut locators = Vec::with_capacity(header.block_count_or_version as usize);
    for _ in 0..header.block_count_or_version {
        locators.push(BlockLocator {
            offset: cursor.read_u32()?,
            _block_size: cursor.read_u16()?,
            _decompressed_size: cursor.read_u16()?,
        });
    }

    let mut result = Vec::with_capacity(header.decompressed_size as usize);
    for locator in &locators {
        let block = decode_block(entry, header.header_size as usize + locator.offset as usize)?;
        result.extend_from_slice(&block);
    }

    Ok(result)
}

/// This function decodes a Model entry: a synthetic model file header, followed by the
/// decoded chunks in fixed order. The per-LOD vertex/index offsets and sizes are recorded
/// into the header as the chunks come out; the edge-geometry chunks are part of the stream
/// but not tracked by the header.
fn decode_model_entry(header: &EntryHeader, entry: &[u8]) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(entry);
    cursor.set_position(ENTRY_HEADER_SIZE as u64);
    let locator = ModelBlockLocator::decode(&mut cursor)?;

    // One stored size per block, across all chunks in order.
    let block_count = locator.first_block_indices.index[2] as usize + locator.block_count.index[2] as usize;
    let mut block_sizes = Vec::with_capacity(block_count);
    for _ in 0..block_count {
        block_sizes.push(cursor.read_u16()?);
    }

    let mut model_header = ModelFileHeader {
        version: header.block_count_or_version,
        vertex_declaration_count: locator.vertex_declaration_count,
        material_count: locator.material_count,
        lod_count: locator.lod_count,
        enable_index_buffer_streaming: locator.enable_index_buffer_streaming,
        enable_edge_geometry: locator.enable_edge_geometry,
        padding: locator.padding,
        ..Default::default()
    };

    let mut blocks: Vec<Vec<u8>> = vec![];
    let mut result_size = MODEL_HEADER_SIZE;
    for chunk in 0..MODEL_CHUNK_COUNT {
        let chunk_block_count = locator.block_count.chunk(chunk) as usize;
        if chunk_block_count == 0 {
            continue;
        }

        let chunk_start_size = result_size;
        let first_block_index = locator.first_block_indices.chunk(chunk) as usize;
        let mut offset = header.header_size as usize + locator.first_block_offsets.chunk(chunk) as usize;
        for block_index in first_block_index..first_block_index + chunk_block_count {
            let block = decode_block(entry, offset)?;
            let block_size = *block_sizes.get(block_index).ok_or(RLibError::DecodingBlockHeaderOutOfBounds(offset))?;
            result_size += block.len();
            blocks.push(block);
            offset += block_size as usize;
        }

        let produced = (result_size - chunk_start_size) as u32;
        match chunk {
            0 => model_header.stack_memory_size = produced,
            1 => model_header.runtime_memory_size = produced,
            2 | 5 | 8 => {
                model_header.vertex_buffer_size[(chunk - 2) / 3] = produced;
                model_header.vertex_data_offset[(chunk - 2) / 3] = chunk_start_size as u32;
            },
            4 | 7 | 10 => {
                model_header.index_buffer_size[(chunk - 4) / 3] = produced;
                model_header.index_data_offset[(chunk - 4) / 3] = chunk_start_size as u32;
            },
            _ => {},
        }
    }

    let mut result = Vec::with_capacity(result_size);
    model_header.encode(&mut result)?;
    for block in &blocks {
        result.extend_from_slice(block);
    }

    Ok(result)
}

/// This function decodes a Texture entry: the texture's own header copied to offset 0, then
/// each mipmap's block stream decoded at the output offset the entry declares for it.
fn decode_texture_entry(header: &EntryHeader, entry: &[u8]) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(entry);
    cursor.set_position(ENTRY_HEADER_SIZE as u64);

    let mut locators = Vec::with_capacity(header.block_count_or_version as usize);
    for _ in 0..header.block_count_or_version {
        locators.push(TextureBlockLocator {
            first_block_offset: cursor.read_u32()?,
            _total_size: cursor.read_u32()?,
            _decompressed_size: cursor.read_u32()?,
            first_sub_block_index: cursor.read_u32()?,
            sub_block_count: cursor.read_u32()?,
        });
    }

    let sub_block_total: usize = locators.iter().map(|locator| locator.sub_block_count as usize).sum();
    let mut sub_block_sizes = Vec::with_capacity(sub_block_total);
    for _ in 0..sub_block_total {
        sub_block_sizes.push(cursor.read_u16()?);
    }

    // The texture's own header sits uncompressed at the start of the body. Its `header_size`
    // field covers the mipmap offset table too, and that's how much gets copied to offset 0.
    let body_start = header.header_size as usize;
    let texture_header = entry.get(body_start..body_start + TEXTURE_HEADER_SIZE).ok_or(RLibError::DecodingBlockShortData(body_start))?;
    let mut texture_cursor = Cursor::new(texture_header);
    texture_cursor.set_position(2);
    let texture_header_size = texture_cursor.read_u16()? as usize;
    texture_cursor.set_position(14);
    let mipmap_count = texture_cursor.read_u16()? as usize;

    let mut mipmap_offsets = Vec::with_capacity(mipmap_count);
    let mut offsets_cursor = Cursor::new(entry);
    offsets_cursor.set_position((body_start + TEXTURE_HEADER_SIZE) as u64);
    for _ in 0..mipmap_count {
        mipmap_offsets.push(offsets_cursor.read_u32()? as usize);
    }

    let mut result = vec![0; header.decompressed_size as usize];
    let header_copy = entry.get(body_start..body_start + texture_header_size).ok_or(RLibError::DecodingBlockShortData(body_start))?;
    result.get_mut(..texture_header_size).ok_or(RLibError::DecodingBlockShortData(body_start))?.copy_from_slice(header_copy);

    for (mipmap_offset, locator) in mipmap_offsets.iter().zip(locators.iter()) {
        let mut offset = header.header_size as usize + locator.first_block_offset as usize;
        let mut output_offset = *mipmap_offset;

        let first = locator.first_sub_block_index as usize;
        let sizes = sub_block_sizes.get(first..first + locator.sub_block_count as usize).ok_or(RLibError::DecodingBlockHeaderOutOfBounds(offset))?;
        for sub_block_size in sizes {
            let block = decode_block(entry, offset)?;
            result.get_mut(output_offset..output_offset + block.len())
                .ok_or(RLibError::DecodingBlockShortData(offset))?
                .copy_from_slice(&block);

            offset += *sub_block_size as usize;
            output_offset += block.len();
        }
    }

    Ok(result)
}

impl EntryHeader {

    /// This function reads the 24-byte entry header.
    pub fn decode<R: ReadBytes>(data: &mut R) -> Result<Self> {
        let header_size = data.read_u32()?;
        let entry_type = EntryType::try_from_value(data.read_u32()?)?;
        let decompressed_size = data.read_u32()?;
        let unknown_1 = data.read_u32()?;
        let aligned_unit_allocation_count = data.read_u32()?;
        let block_count_or_version = data.read_u32()?;

        Ok(Self {
            header_size,
            entry_type,
            decompressed_size,
            unknown_1,
            aligned_unit_allocation_count,
            block_count_or_version,
        })
    }

    /// This function returns the amount of bytes allocated to the entry in its `.datN` file.
    pub fn allocation_size(&self) -> u64 {
        0x7F + ((self.aligned_unit_allocation_count as u64) << 7)
    }
}

impl EntryType {

    /// This function returns the entry type matching the provided on-disk value.
    fn try_from_value(value: u32) -> Result<Self> {
        match value {
            1 => Ok(Self::Empty),
            2 => Ok(Self::Binary),
            3 => Ok(Self::Model),
            4 => Ok(Self::Texture),
            _ => Err(RLibError::DecodingUnknownEntryType(value)),
        }
    }
}

impl<T: Copy> ModelChunkInfo<T> {

    /// This function returns the value of the provided logical chunk. Chunks 0 and 1 are the
    /// stack and runtime buffers; after those, each LOD contributes its vertex, edge-geometry
    /// and index buffers, in that order.
    fn chunk(&self, index: usize) -> T {
        match index {
            0 => self.stack,
            1 => self.runtime,
            2 => self.vertex[0],
            3 => self.edge_geometry_vertex[0],
            4 => self.index[0],
            5 => self.vertex[1],
            6 => self.edge_geometry_vertex[1],
            7 => self.index[1],
            8 => self.vertex[2],
            9 => self.edge_geometry_vertex[2],
            10 => self.index[2],
            _ => unreachable!("model entries have exactly 11 chunks"),
        }
    }
}

impl ModelChunkInfo<u32> {
    fn decode<R: ReadBytes>(data: &mut R) -> Result<Self> {
        Ok(Self {
            stack: data.read_u32()?,
            runtime: data.read_u32()?,
            vertex: [data.read_u32()?, data.read_u32()?, data.read_u32()?],
            edge_geometry_vertex: [data.read_u32()?, data.read_u32()?, data.read_u32()?],
            index: [data.read_u32()?, data.read_u32()?, data.read_u32()?],
        })
    }
}

impl ModelChunkInfo<u16> {
    fn decode<R: ReadBytes>(data: &mut R) -> Result<Self> {
        Ok(Self {
            stack: data.read_u16()?,
            runtime: data.read_u16()?,
            vertex: [data.read_u16()?, data.read_u16()?, data.read_u16()?],
            edge_geometry_vertex: [data.read_u16()?, data.read_u16()?, data.read_u16()?],
            index: [data.read_u16()?, data.read_u16()?, data.read_u16()?],
        })
    }
}

impl ModelBlockLocator {

    /// This function reads the 184-byte model block locator.
    fn decode<R: ReadBytes>(data: &mut R) -> Result<Self> {
        Ok(Self {
            _aligned_decompressed_sizes: ModelChunkInfo::<u32>::decode(data)?,
            _chunk_sizes: ModelChunkInfo::<u32>::decode(data)?,
            first_block_offsets: ModelChunkInfo::<u32>::decode(data)?,
            first_block_indices: ModelChunkInfo::<u16>::decode(data)?,
            block_count: ModelChunkInfo::<u16>::decode(data)?,
            vertex_declaration_count: data.read_u16()?,
            material_count: data.read_u16()?,
            lod_count: data.read_u8()?,
            enable_index_buffer_streaming: data.read_bool()?,
            enable_edge_geometry: data.read_bool()?,
            padding: data.read_u8()?,
        })
    }
}

impl ModelFileHeader {

    /// This function writes the 68-byte synthetic model file header.
    fn encode<W: WriteBytes>(&self, buffer: &mut W) -> Result<()> {
        buffer.write_u32(self.version)?;
        buffer.write_u32(self.stack_memory_size)?;
        buffer.write_u32(self.runtime_memory_size)?;
        buffer.write_u16(self.vertex_declaration_count)?;
        buffer.write_u16(self.material_count)?;

        for offset in self.vertex_data_offset {
            buffer.write_u32(offset)?;
        }
        for offset in self.index_data_offset {
            buffer.write_u32(offset)?;
        }
        for size in self.vertex_buffer_size {
            buffer.write_u32(size)?;
        }
        for size in self.index_buffer_size {
            buffer.write_u32(size)?;
        }

        buffer.write_u8(self.lod_count)?;
        buffer.write_bool(self.enable_index_buffer_streaming)?;
        buffer.write_bool(self.enable_edge_geometry)?;
        buffer.write_u8(self.padding)?;
        Ok(())
    }
}
