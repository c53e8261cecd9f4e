//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! This module contains the reader of the Excel database: the layer that turns a sheet name
//! and a row id into typed, localised cells.
//!
//! A sheet is one `.exh` header (columns, pages, languages) plus one `.exd` page file per
//! (page, language) pair, all of them entries of the `exd/` folder of the `0a0000` SqPack.
//! [`ExcelReader`] loads the header up front and the pages on demand, caching them as they
//! come, with per-page language fallback: a page missing in one requested language silently
//! tries the next one.
//!
//! Named-column access is available through an externally supplied
//! [`SheetDefinition`](crate::schema::SheetDefinition): the games don't ship column names.

use log::debug;

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Cursor;
use std::rc::Rc;

use crate::error::{RLibError, Result};
use crate::files::{DecodeableExtraData, Decodeable};
use crate::files::exd::{CellValue, Exd, RowData};
use crate::files::exh::{Exh, Language};
use crate::schema::SheetDefinition;
use crate::sqpack::SqpackReader;
use crate::sqpack::path_spec::PathSpec;


/// Folder of the SqPack where the Excel files live.
const EXCEL_FOLDER: &str = "exd";

//---------------------------------------------------------------------------//
//                              Enum & Structs
//---------------------------------------------------------------------------//

/// This struct reads one sheet of the Excel database out of a SqPack.
pub struct ExcelReader<'a> {

    /// The SqPack the sheet lives in.
    sqpack: &'a SqpackReader,

    /// Name of the sheet, as listed in `exd/root.exl`.
    name: String,

    /// The decoded header of the sheet.
    exh: Exh,

    /// The languages to try, in order. If the sheet declares `Undefined`, that's the only
    /// entry, whatever the caller asked for.
    languages: Vec<Language>,

    /// Pages already loaded, keyed by (page start id, language).
    pages: RefCell<HashMap<(u32, Language), Rc<Exd>>>,
}

/// One row of a sheet, decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct ExcelRow {

    /// Id of the row.
    row_id: u32,

    /// The decoded data of the row.
    data: RowData,
}

/// Lazy iterator over all the rows of a sheet, in page order.
pub struct ExcelRowIter<'a, 'b> {

    /// The reader the rows come from.
    reader: &'b ExcelReader<'a>,

    /// Index of the page being walked.
    page_index: usize,

    /// The page being walked, once loaded.
    page: Option<Rc<Exd>>,

    /// Position within the current page.
    row_index: usize,

    /// Set after an error, so the iterator fuses.
    done: bool,
}

//---------------------------------------------------------------------------//
//                              Implementations
//---------------------------------------------------------------------------//

impl<'a> ExcelReader<'a> {

    /// This function opens a sheet by name, loading and decoding its `.exh` header.
    ///
    /// `languages` is the caller's preference list. If the sheet is language-neutral (it
    /// declares `Undefined`), the list is ignored. Otherwise the languages the sheet doesn't
    /// provide are dropped, and if none survives this fails with a language error.
    pub fn read(sqpack: &'a SqpackReader, name: &str, languages: &[Language]) -> Result<Self> {
        let exh_path = format!("{EXCEL_FOLDER}/{name}.exh");
        let exh_data = sqpack.read(&PathSpec::new(&exh_path))?;
        let exh = Exh::decode(&mut Cursor::new(exh_data), &None)?;

        let languages = if exh.languages().contains(&Language::Undefined) {
            vec![Language::Undefined]
        } else {
            languages.iter()
                .filter(|language| exh.languages().contains(language))
                .copied()
                .collect::<Vec<_>>()
        };

        if languages.is_empty() {
            return Err(RLibError::LanguageNotSupported(name.to_owned()));
        }

        Ok(Self {
            sqpack,
            name: name.to_owned(),
            exh,
            languages,
            pages: RefCell::new(HashMap::new()),
        })
    }

    /// This function returns the decoded header of the sheet.
    pub fn exh(&self) -> &Exh {
        &self.exh
    }

    /// This function returns the name of the sheet.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// This function returns the languages the reader resolves pages against, in order.
    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// This function returns the row with the provided id, trying the reader's languages in
    /// order.
    ///
    /// Ids that fall in no page, and ids that fall inside a page's range but are skipped by
    /// it, both fail with a row-not-found error.
    pub fn row(&self, row_id: u32) -> Result<ExcelRow> {
        let pages = self.exh.pages();
        let page_index = pages.partition_point(|page| page.start_id() + page.row_count_with_skip() <= row_id);
        let page = pages.get(page_index).ok_or(RLibError::RowNotFound(row_id))?;
        if row_id < *page.start_id() {
            return Err(RLibError::RowNotFound(row_id));
        }

        let exd = self.page(page_index, &self.languages)?;
        let data = exd.row(row_id)?.clone();
        Ok(ExcelRow { row_id, data })
    }

    /// Same as [`Self::row`], but for one specific language, with no fallback.
    pub fn row_with_language(&self, language: Language, row_id: u32) -> Result<ExcelRow> {
        let pages = self.exh.pages();
        let page_index = pages.partition_point(|page| page.start_id() + page.row_count_with_skip() <= row_id);
        let page = pages.get(page_index).ok_or(RLibError::RowNotFound(row_id))?;
        if row_id < *page.start_id() {
            return Err(RLibError::RowNotFound(row_id));
        }

        let exd = self.page(page_index, &[language])?;
        let data = exd.row(row_id)?.clone();
        Ok(ExcelRow { row_id, data })
    }

    /// This function returns the ids of every row of the sheet, in page order.
    pub fn row_ids(&self) -> Result<Vec<u32>> {
        let mut ids = vec![];
        for page_index in 0..self.exh.pages().len() {
            ids.extend(self.page(page_index, &self.languages)?.row_ids());
        }

        Ok(ids)
    }

    /// This function returns a lazy iterator over all the rows of the sheet, in page order.
    /// Pages are loaded and cached as the iteration reaches them.
    pub fn rows<'b>(&'b self) -> ExcelRowIter<'a, 'b> {
        ExcelRowIter {
            reader: self,
            page_index: 0,
            page: None,
            row_index: 0,
            done: false,
        }
    }

    /// This function loads (or fetches from the cache) the provided page, trying each of the
    /// provided languages in order. The first language that has the page wins; a not-found in
    /// one language silently moves on to the next.
    fn page(&self, page_index: usize, languages: &[Language]) -> Result<Rc<Exd>> {
        let page = self.exh.pages().get(page_index).ok_or(RLibError::RowNotFound(0))?;
        let start_id = *page.start_id();

        let mut last_error = RLibError::LanguageNotSupported(self.name.to_owned());
        for language in languages {
            if let Some(exd) = self.pages.borrow().get(&(start_id, *language)) {
                return Ok(exd.clone());
            }

            let path = format!("{EXCEL_FOLDER}/{}_{}{}.exd", self.name, start_id, language.file_suffix());
            let data = match self.sqpack.read(&PathSpec::new(&path)) {
                Ok(data) => data,
                Err(RLibError::PathNotFound(path)) => {
                    debug!("page {path} not found, trying the next language");
                    last_error = RLibError::PathNotFound(path);
                    continue;
                },
                Err(error) => return Err(error),
            };

            let mut extra_data = DecodeableExtraData::default();
            extra_data.set_exh(Some(&self.exh));

            let exd = Rc::new(Exd::decode(&mut Cursor::new(data), &Some(extra_data))?);
            self.pages.borrow_mut().insert((start_id, *language), exd.clone());
            return Ok(exd);
        }

        Err(last_error)
    }
}

impl ExcelRow {

    /// This function returns the id of the row.
    pub fn row_id(&self) -> u32 {
        self.row_id
    }

    /// This function returns the decoded data of the row.
    pub fn data(&self) -> &RowData {
        &self.data
    }

    /// This function returns the cell at the provided column position.
    ///
    /// Only valid for rows of flat sheets: sub-rowed rows have one cell list per sub-row, and
    /// have to be accessed through [`Self::data`].
    pub fn cell(&self, column: usize) -> Result<&CellValue> {
        match &self.data {
            RowData::Flat(cells) => cells.get(column).ok_or(RLibError::DecodingColumnOutOfBounds(column as u16)),
            RowData::SubRows(_) => Err(RLibError::RowHasSubRows(self.row_id)),
        }
    }

    /// This function returns the cell under the provided column name, resolved through an
    /// externally supplied sheet definition. Unknown names fail loudly.
    pub fn cell_by_name(&self, definition: &SheetDefinition, column_name: &str) -> Result<&CellValue> {
        let column = definition.column_index(column_name)?;
        self.cell(column)
    }
}

impl Iterator for ExcelRowIter<'_, '_> {
    type Item = Result<ExcelRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if self.page_index >= self.reader.exh.pages().len() {
                return None;
            }

            if self.page.is_none() {
                match self.reader.page(self.page_index, &self.reader.languages) {
                    Ok(page) => self.page = Some(page),
                    Err(error) => {
                        self.done = true;
                        return Some(Err(error));
                    },
                }
            }

            let page = self.page.as_ref()?;
            match page.rows().get(self.row_index) {
                Some((row_id, data)) => {
                    let row = ExcelRow { row_id: *row_id, data: data.clone() };
                    self.row_index += 1;
                    return Some(Ok(row));
                },
                None => {
                    self.page = None;
                    self.row_index = 0;
                    self.page_index += 1;
                },
            }
        }
    }
}
