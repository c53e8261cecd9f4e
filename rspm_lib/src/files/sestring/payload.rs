//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! SePayloads are the typed tags inlined in a [`SeString`], framed as `02 type length... body 03`.
//!
//! Each payload declares how many expressions its body is expected to hold. The bounds are
//! only enforced when a payload is built explicitly from expressions: payloads read from game
//! data keep their body verbatim, so a re-encoded string is always byte-identical to its
//! source, and unknown payload types survive the round trip untouched.
//!
//! [`SeString`]: crate::files::sestring::SeString

use std::sync::OnceLock;
use std::fmt;
use std::io::Cursor;

use crate::error::{RLibError, Result};
use crate::files::sestring::expression::SeExpression;

/// The leading expression value that marks a Placeholder payload as complex.
const PLACEHOLDER_COMPLEX_MARKER: u32 = 0xC8;

/// Complex placeholder sub-kind for a map position link.
const PLACEHOLDER_KIND_POSITION: u32 = 3;

/// Complex placeholder sub-kind for a sound effect.
const PLACEHOLDER_KIND_SOUND_EFFECT: u32 = 5;

//---------------------------------------------------------------------------//
//                              Enum & Structs
//---------------------------------------------------------------------------//

/// This enum represents the known payload types, plus a catch-all for the ones we don't know.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SePayloadKind {
    ResetTime,
    Time,
    If,
    Switch,
    ActorFullName,
    IfEquals,
    IfEndsWithJongseong,
    IfEndsWithJongseongExceptRieul,
    IfActor,
    NewLine,
    FontIcon,
    ColorFill,
    ColorBorder,
    SoftHyphen,
    DialoguePageBreak,
    Italic,
    Indent,
    FontIcon2,
    Hyphen,
    Value,
    Format,
    TwoDigitValue,
    SheetReference,
    Highlight,
    Link,
    Split,
    Placeholder,
    InstanceContent,
    SheetReferenceJa,
    SheetReferenceEn,
    SheetReferenceDe,
    SheetReferenceFr,
    UiColorFill,
    UiColorBorder,
    ZeroPaddedValue,
    OrdinalValue,

    /// A payload type we don't know about. The type byte is preserved verbatim.
    Unknown(u8),
}

/// This struct represents a single payload of a [`SeString`].
///
/// The body is kept as raw bytes, and its expression list is decoded at most once, on demand.
///
/// [`SeString`]: crate::files::sestring::SeString
#[derive(Clone, Debug)]
pub struct SePayload {

    /// The type of this payload.
    kind: SePayloadKind,

    /// The raw body of this payload, without the framing.
    data: Vec<u8>,

    /// Lazily-decoded expression list of this payload.
    expressions: OnceLock<Vec<SeExpression>>,
}

/// Positional view over an `If` payload.
#[derive(Clone, Copy, Debug)]
pub struct IfView<'a> {
    pub condition: &'a SeExpression,
    pub true_value: Option<&'a SeExpression>,
    pub false_value: Option<&'a SeExpression>,
    pub misc: &'a [SeExpression],
}

/// Positional view over an `IfEquals` payload.
#[derive(Clone, Copy, Debug)]
pub struct IfEqualsView<'a> {
    pub left: &'a SeExpression,
    pub right: &'a SeExpression,
    pub true_value: Option<&'a SeExpression>,
    pub false_value: Option<&'a SeExpression>,
    pub misc: &'a [SeExpression],
}

/// Positional view over a `Switch` payload.
#[derive(Clone, Copy, Debug)]
pub struct SwitchView<'a> {
    pub condition: &'a SeExpression,
    pub cases: &'a [SeExpression],
}

/// Positional view over a `SheetReference` payload.
#[derive(Clone, Copy, Debug)]
pub struct SheetReferenceView<'a> {
    pub sheet: &'a SeExpression,
    pub row: &'a SeExpression,
    pub column: Option<&'a SeExpression>,
    pub parameters: &'a [SeExpression],
}

/// Positional view over the per-language `SheetReferenceXx` payloads.
#[derive(Clone, Copy, Debug)]
pub struct LanguageSheetReferenceView<'a> {
    pub sheet: &'a SeExpression,
    pub row: &'a SeExpression,
    pub attributes: &'a SeExpression,
    pub column: Option<&'a SeExpression>,
    pub parameters: &'a [SeExpression],
}

/// Positional view over a `ResetTime` payload.
#[derive(Clone, Copy, Debug)]
pub struct ResetTimeView<'a> {
    pub hour_utc9: &'a SeExpression,
    pub weekday: Option<&'a SeExpression>,
}

/// Positional view over a `Split` payload.
#[derive(Clone, Copy, Debug)]
pub struct SplitView<'a> {
    pub value: &'a SeExpression,
    pub separator: &'a SeExpression,
    pub index: &'a SeExpression,
}

/// Decoded view over a `Placeholder` payload.
#[derive(Clone, Copy, Debug)]
pub enum PlaceholderView<'a> {

    /// An auto-translate completion entry.
    Completion {
        group_id: &'a SeExpression,
        row_id: &'a SeExpression,
    },

    /// A map position link.
    Position(PositionView),

    /// A sound effect.
    SoundEffect {
        se_id: u32,
    },

    /// A complex placeholder of a sub-kind we don't know about.
    Other {
        sub_kind: u32,
        arguments: &'a [SeExpression],
    },
}

/// A map position link, with its raw fixed-point coordinates.
///
/// The raw coordinates are thousandths of world-space units. The display projection needs the
/// `size_factor` of the target map, which lives in an external Map sheet row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionView {
    pub territory: u32,
    pub map: u32,
    pub raw_x: i32,
    pub raw_y: i32,
    pub raw_z: i32,
}

//---------------------------------------------------------------------------//
//                              Implementations
//---------------------------------------------------------------------------//

impl SePayload {

    /// This function builds a payload from its type byte and its raw body, preserving both.
    ///
    /// No validation is performed: this is the constructor used when reading game data.
    pub fn from_raw(payload_type: u8, data: Vec<u8>) -> Self {
        Self {
            kind: SePayloadKind::from_type(payload_type),
            data,
            expressions: OnceLock::new(),
        }
    }

    /// This function builds a payload of the provided kind from a list of expressions.
    ///
    /// It fails if the amount of expressions doesn't match what the payload kind declares.
    pub fn new(kind: SePayloadKind, expressions: Vec<SeExpression>) -> Result<Self> {
        let (min, max) = kind.expression_bounds();
        if expressions.len() < min || max.is_some_and(|max| expressions.len() > max) {
            return Err(RLibError::PayloadExpressionCountMismatch(
                format!("{kind}"),
                min,
                max.map_or("inf".to_owned(), |max| max.to_string()),
                expressions.len(),
            ));
        }

        let mut data = vec![];
        for expression in &expressions {
            expression.encode(&mut data)?;
        }

        let cell = OnceLock::new();
        let _ = cell.set(expressions);

        Ok(Self {
            kind,
            data,
            expressions: cell,
        })
    }

    /// This function returns the type of this payload.
    pub fn kind(&self) -> SePayloadKind {
        self.kind
    }

    /// This function returns the raw body of this payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// This function returns the expressions of this payload, decoding them from the raw body
    /// the first time it's called.
    pub fn expressions(&self) -> Result<&[SeExpression]> {
        if let Some(expressions) = self.expressions.get() {
            return Ok(expressions);
        }

        let mut expressions = vec![];
        let mut cursor = Cursor::new(&self.data);
        let len = self.data.len() as u64;
        while cursor.position() < len {
            expressions.push(SeExpression::decode(&mut cursor)?);
        }

        Ok(self.expressions.get_or_init(|| expressions))
    }

    /// This function returns the positional view of an `If` payload.
    pub fn as_if(&self) -> Result<IfView> {
        self.check_kind(SePayloadKind::If)?;
        let expressions = self.expressions()?;
        Ok(IfView {
            condition: &expressions[0],
            true_value: expressions.get(1),
            false_value: expressions.get(2),
            misc: expressions.get(3..).unwrap_or(&[]),
        })
    }

    /// This function returns the positional view of an `IfEquals` payload.
    pub fn as_if_equals(&self) -> Result<IfEqualsView> {
        self.check_kind(SePayloadKind::IfEquals)?;
        let expressions = self.expressions()?;
        Ok(IfEqualsView {
            left: &expressions[0],
            right: &expressions[1],
            true_value: expressions.get(2),
            false_value: expressions.get(3),
            misc: expressions.get(4..).unwrap_or(&[]),
        })
    }

    /// This function returns the positional view of a `Switch` payload.
    pub fn as_switch(&self) -> Result<SwitchView> {
        self.check_kind(SePayloadKind::Switch)?;
        let expressions = self.expressions()?;
        Ok(SwitchView {
            condition: &expressions[0],
            cases: expressions.get(1..).unwrap_or(&[]),
        })
    }

    /// This function returns the positional view of a `SheetReference` payload.
    pub fn as_sheet_reference(&self) -> Result<SheetReferenceView> {
        self.check_kind(SePayloadKind::SheetReference)?;
        let expressions = self.expressions()?;
        Ok(SheetReferenceView {
            sheet: &expressions[0],
            row: &expressions[1],
            column: expressions.get(2),
            parameters: expressions.get(3..).unwrap_or(&[]),
        })
    }

    /// This function returns the positional view of a per-language `SheetReferenceXx` payload.
    pub fn as_language_sheet_reference(&self) -> Result<LanguageSheetReferenceView> {
        match self.kind {
            SePayloadKind::SheetReferenceJa |
            SePayloadKind::SheetReferenceEn |
            SePayloadKind::SheetReferenceDe |
            SePayloadKind::SheetReferenceFr => {},
            _ => return Err(RLibError::PayloadTypeMismatch(format!("{}", self.kind), "SheetReferenceXx".to_owned())),
        }

        let expressions = self.check_expression_count()?;
        Ok(LanguageSheetReferenceView {
            sheet: &expressions[0],
            row: &expressions[1],
            attributes: &expressions[2],
            column: expressions.get(3),
            parameters: expressions.get(4..).unwrap_or(&[]),
        })
    }

    /// This function returns the positional view of a `ResetTime` payload.
    pub fn as_reset_time(&self) -> Result<ResetTimeView> {
        self.check_kind(SePayloadKind::ResetTime)?;
        let expressions = self.expressions()?;
        Ok(ResetTimeView {
            hour_utc9: &expressions[0],
            weekday: expressions.get(1),
        })
    }

    /// This function returns the positional view of a `Split` payload.
    pub fn as_split(&self) -> Result<SplitView> {
        self.check_kind(SePayloadKind::Split)?;
        let expressions = self.expressions()?;
        Ok(SplitView {
            value: &expressions[0],
            separator: &expressions[1],
            index: &expressions[2],
        })
    }

    /// This function decodes the view of a `Placeholder` payload, discriminating between the
    /// completion form and the complex forms (map positions, sound effects).
    pub fn as_placeholder(&self) -> Result<PlaceholderView> {
        self.check_kind(SePayloadKind::Placeholder)?;
        let expressions = self.expressions()?;
        if expressions[0].as_uint32() != Some(PLACEHOLDER_COMPLEX_MARKER) {
            return Ok(PlaceholderView::Completion {
                group_id: &expressions[0],
                row_id: &expressions[1],
            });
        }

        let sub_kind = Self::expression_as_integer(&expressions[1])?;
        match sub_kind {
            PLACEHOLDER_KIND_POSITION if expressions.len() >= 7 => Ok(PlaceholderView::Position(PositionView {
                territory: Self::expression_as_integer(&expressions[2])?,
                map: Self::expression_as_integer(&expressions[3])?,
                raw_x: Self::expression_as_integer(&expressions[4])? as i32,
                raw_y: Self::expression_as_integer(&expressions[5])? as i32,
                raw_z: Self::expression_as_integer(&expressions[6])? as i32,
            })),
            PLACEHOLDER_KIND_SOUND_EFFECT if expressions.len() >= 3 => Ok(PlaceholderView::SoundEffect {
                se_id: Self::expression_as_integer(&expressions[2])?,
            }),
            _ => Ok(PlaceholderView::Other {
                sub_kind,
                arguments: &expressions[2..],
            }),
        }
    }

    /// Small helper to get an expression we expect to be a plain integer, or fail.
    fn expression_as_integer(expression: &SeExpression) -> Result<u32> {
        expression.as_uint32().ok_or(RLibError::DecodingStringExpressionLength)
    }

    /// Small helper to fail with a proper error when a typed view is requested over the wrong payload.
    fn check_kind(&self, expected: SePayloadKind) -> Result<()> {
        if self.kind != expected {
            return Err(RLibError::PayloadTypeMismatch(format!("{}", self.kind), format!("{expected}")));
        }

        self.check_expression_count().map(|_| ())
    }

    /// Small helper to validate the decoded expressions against the declared minimum.
    ///
    /// The minimum bound is what makes the fixed positions of the views safe to index.
    fn check_expression_count(&self) -> Result<&[SeExpression]> {
        let (min, max) = self.kind.expression_bounds();
        let expressions = self.expressions()?;
        if expressions.len() < min {
            return Err(RLibError::PayloadExpressionCountMismatch(
                format!("{}", self.kind),
                min,
                max.map_or("inf".to_owned(), |max| max.to_string()),
                expressions.len(),
            ));
        }

        Ok(expressions)
    }
}

impl PartialEq for SePayload {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.data == other.data
    }
}

impl SePayloadKind {

    /// This function returns the payload kind matching the provided type byte.
    pub fn from_type(payload_type: u8) -> Self {
        match payload_type {
            0x06 => Self::ResetTime,
            0x07 => Self::Time,
            0x08 => Self::If,
            0x09 => Self::Switch,
            0x0A => Self::ActorFullName,
            0x0C => Self::IfEquals,
            0x0D => Self::IfEndsWithJongseong,
            0x0E => Self::IfEndsWithJongseongExceptRieul,
            0x0F => Self::IfActor,
            0x10 => Self::NewLine,
            0x12 => Self::FontIcon,
            0x13 => Self::ColorFill,
            0x14 => Self::ColorBorder,
            0x16 => Self::SoftHyphen,
            0x17 => Self::DialoguePageBreak,
            0x1A => Self::Italic,
            0x1D => Self::Indent,
            0x1E => Self::FontIcon2,
            0x1F => Self::Hyphen,
            0x20 => Self::Value,
            0x22 => Self::Format,
            0x24 => Self::TwoDigitValue,
            0x28 => Self::SheetReference,
            0x29 => Self::Highlight,
            0x2B => Self::Link,
            0x2C => Self::Split,
            0x2E => Self::Placeholder,
            0x2F => Self::InstanceContent,
            0x30 => Self::SheetReferenceJa,
            0x31 => Self::SheetReferenceEn,
            0x32 => Self::SheetReferenceDe,
            0x33 => Self::SheetReferenceFr,
            0x48 => Self::UiColorFill,
            0x49 => Self::UiColorBorder,
            0x50 => Self::ZeroPaddedValue,
            0x51 => Self::OrdinalValue,
            _ => Self::Unknown(payload_type),
        }
    }

    /// This function returns the type byte of this payload kind.
    pub fn type_byte(&self) -> u8 {
        match self {
            Self::ResetTime => 0x06,
            Self::Time => 0x07,
            Self::If => 0x08,
            Self::Switch => 0x09,
            Self::ActorFullName => 0x0A,
            Self::IfEquals => 0x0C,
            Self::IfEndsWithJongseong => 0x0D,
            Self::IfEndsWithJongseongExceptRieul => 0x0E,
            Self::IfActor => 0x0F,
            Self::NewLine => 0x10,
            Self::FontIcon => 0x12,
            Self::ColorFill => 0x13,
            Self::ColorBorder => 0x14,
            Self::SoftHyphen => 0x16,
            Self::DialoguePageBreak => 0x17,
            Self::Italic => 0x1A,
            Self::Indent => 0x1D,
            Self::FontIcon2 => 0x1E,
            Self::Hyphen => 0x1F,
            Self::Value => 0x20,
            Self::Format => 0x22,
            Self::TwoDigitValue => 0x24,
            Self::SheetReference => 0x28,
            Self::Highlight => 0x29,
            Self::Link => 0x2B,
            Self::Split => 0x2C,
            Self::Placeholder => 0x2E,
            Self::InstanceContent => 0x2F,
            Self::SheetReferenceJa => 0x30,
            Self::SheetReferenceEn => 0x31,
            Self::SheetReferenceDe => 0x32,
            Self::SheetReferenceFr => 0x33,
            Self::UiColorFill => 0x48,
            Self::UiColorBorder => 0x49,
            Self::ZeroPaddedValue => 0x50,
            Self::OrdinalValue => 0x51,
            Self::Unknown(payload_type) => *payload_type,
        }
    }

    /// This function returns the amount of expressions this payload kind expects, as an
    /// inclusive `(min, max)` pair. `None` means unbounded.
    pub fn expression_bounds(&self) -> (usize, Option<usize>) {
        match self {
            Self::NewLine |
            Self::Hyphen |
            Self::Indent |
            Self::SoftHyphen => (0, Some(0)),

            // One revision of the game data declares this one with 0 expressions, another
            // with 1. We accept either and surface whatever is actually there.
            Self::DialoguePageBreak => (0, Some(1)),

            Self::ColorFill |
            Self::ColorBorder |
            Self::UiColorFill |
            Self::UiColorBorder |
            Self::Highlight |
            Self::Italic |
            Self::Value |
            Self::TwoDigitValue |
            Self::OrdinalValue |
            Self::FontIcon |
            Self::FontIcon2 |
            Self::Link |
            Self::ActorFullName |
            Self::InstanceContent |
            Self::Time => (1, Some(1)),

            Self::ZeroPaddedValue |
            Self::Format => (2, Some(2)),

            Self::ResetTime => (1, Some(2)),

            Self::If |
            Self::Switch => (1, None),

            Self::IfEquals |
            Self::SheetReference |
            Self::Placeholder => (2, None),

            Self::IfActor |
            Self::IfEndsWithJongseong |
            Self::IfEndsWithJongseongExceptRieul |
            Self::Split => (3, Some(3)),

            Self::SheetReferenceJa |
            Self::SheetReferenceEn |
            Self::SheetReferenceDe |
            Self::SheetReferenceFr => (3, None),

            Self::Unknown(_) => (0, None),
        }
    }
}

impl fmt::Display for SePayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(payload_type) => write!(f, "Unknown({payload_type:#04x})"),
            _ => write!(f, "{self:?}"),
        }
    }
}

impl PositionView {

    /// World-space X coordinate, in map units.
    pub fn world_x(&self) -> f32 {
        self.raw_x as f32 / 1000.0
    }

    /// World-space Y coordinate, in map units.
    pub fn world_y(&self) -> f32 {
        self.raw_y as f32 / 1000.0
    }

    /// World-space Z coordinate, in map units.
    pub fn world_z(&self) -> f32 {
        self.raw_z as f32 / 1000.0
    }

    /// Display X coordinate (the one shown in flags and chat), for a map of the provided size factor.
    pub fn display_x(&self, size_factor: u16) -> f32 {
        map_coordinate_to_display(self.world_x(), size_factor)
    }

    /// Display Y coordinate (the one shown in flags and chat), for a map of the provided size factor.
    pub fn display_y(&self, size_factor: u16) -> f32 {
        map_coordinate_to_display(self.world_y(), size_factor)
    }
}

/// This function projects a world-space coordinate into the display unit shown in-game.
///
/// `size_factor` comes from the Map sheet row of the target map. The projection is a documented
/// approximation, accurate to about a tenth of a display unit.
pub fn map_coordinate_to_display(world: f32, size_factor: u16) -> f32 {
    let c = size_factor as f32 / 100.0;
    40.885 / c * ((world * c + 1024.0) / 2048.0) + 1.0
}
