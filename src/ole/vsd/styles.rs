//! Style sheets and the master-chain cascade.
//!
//! Every style family comes in two shapes: a resolved struct with concrete
//! values and an optional-override struct where each field may be absent.
//! Style sheets record the optional form together with a master id per
//! family; resolving a style walks the master chain and applies the
//! overrides from the root down to the requested sheet.

use super::collector::Collector;
use super::consts::{DEFAULT_FONT_SIZE, MINUS_ONE};
use crate::common::Color;
use std::collections::{BTreeMap, HashSet};

/// Field-level "overwrite if present" merge shared by all override structs.
pub trait OptionalStyle: Default + Clone {
    fn override_with(&mut self, other: &Self);
}

macro_rules! style_family {
    (
        $(#[$meta:meta])*
        $resolved:ident / $optional:ident {
            $($(#[$fmeta:meta])* $field:ident : $ty:ty = $default:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $resolved {
            $($(#[$fmeta])* pub $field: $ty,)*
        }

        impl Default for $resolved {
            fn default() -> Self {
                Self {
                    $($field: $default,)*
                }
            }
        }

        impl $resolved {
            /// Overwrite every field the override carries.
            pub fn apply(&mut self, overrides: &$optional) {
                $(
                    if let Some(value) = overrides.$field {
                        self.$field = value;
                    }
                )*
            }

            /// Defaults with `overrides` applied.
            pub fn resolved_from(overrides: &$optional) -> Self {
                let mut style = Self::default();
                style.apply(overrides);
                style
            }
        }

        #[derive(Debug, Clone, Copy, Default, PartialEq)]
        pub struct $optional {
            $(pub $field: Option<$ty>,)*
        }

        impl OptionalStyle for $optional {
            fn override_with(&mut self, other: &Self) {
                $(
                    if other.$field.is_some() {
                        self.$field = other.$field;
                    }
                )*
            }
        }
    };
}

style_family! {
    /// Outline attributes
    LineStyle / OptionalLineStyle {
        width: f64 = 0.01,
        colour: Color = Color::BLACK,
        pattern: u8 = 1,
        start_marker: u8 = 0,
        end_marker: u8 = 0,
        cap: u8 = 0,
        rounding: f64 = 0.0,
    }
}

style_family! {
    /// Fill and shadow attributes
    FillStyle / OptionalFillStyle {
        fg_colour: Color = Color::WHITE,
        bg_colour: Color = Color::WHITE,
        pattern: u8 = 0,
        shadow_fg_colour: Color = Color::BLACK,
        shadow_bg_colour: Color = Color::BLACK,
        shadow_pattern: u8 = 0,
        shadow_offset_x: f64 = 0.0,
        shadow_offset_y: f64 = 0.0,
    }
}

style_family! {
    /// Text block layout
    TextBlockStyle / OptionalTextBlockStyle {
        left_margin: f64 = 0.0,
        right_margin: f64 = 0.0,
        top_margin: f64 = 0.0,
        bottom_margin: f64 = 0.0,
        vertical_align: u8 = 1,
        bg_filled: bool = true,
        bg_colour: Color = Color::WHITE,
        default_tab_stop: f64 = 0.5,
        text_direction: u8 = 0,
    }
}

style_family! {
    /// Character formatting
    CharStyle / OptionalCharStyle {
        font_id: u16 = 0,
        colour: Color = Color::BLACK,
        /// Height in inches
        size: f64 = DEFAULT_FONT_SIZE,
        bold: bool = false,
        italic: bool = false,
        underline: bool = false,
        double_underline: bool = false,
        strikeout: bool = false,
        double_strikeout: bool = false,
        allcaps: bool = false,
        initcaps: bool = false,
        smallcaps: bool = false,
        superscript: bool = false,
        subscript: bool = false,
    }
}

style_family! {
    /// Paragraph formatting
    ParaStyle / OptionalParaStyle {
        indent_first: f64 = 0.0,
        indent_left: f64 = 0.0,
        indent_right: f64 = 0.0,
        /// Negative values are multiples of the font height
        spacing_line: f64 = -1.2,
        spacing_before: f64 = 0.0,
        spacing_after: f64 = 0.0,
        align: u8 = 1,
        flags: u32 = 0,
    }
}

/// Style tables of one document.
#[derive(Debug, Clone)]
pub struct Styles {
    line_styles: BTreeMap<u32, OptionalLineStyle>,
    fill_styles: BTreeMap<u32, OptionalFillStyle>,
    text_block_styles: BTreeMap<u32, OptionalTextBlockStyle>,
    char_styles: BTreeMap<u32, OptionalCharStyle>,
    para_styles: BTreeMap<u32, OptionalParaStyle>,
    line_masters: BTreeMap<u32, u32>,
    fill_masters: BTreeMap<u32, u32>,
    text_masters: BTreeMap<u32, u32>,
    max_depth: usize,
}

impl Default for Styles {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Styles {
    /// Empty tables whose master-chain walks stop after `max_depth` sheets.
    pub fn new(max_depth: usize) -> Self {
        Self {
            line_styles: BTreeMap::new(),
            fill_styles: BTreeMap::new(),
            text_block_styles: BTreeMap::new(),
            char_styles: BTreeMap::new(),
            para_styles: BTreeMap::new(),
            line_masters: BTreeMap::new(),
            fill_masters: BTreeMap::new(),
            text_masters: BTreeMap::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record the master ids of a style sheet.
    pub fn add_style_masters(&mut self, id: u32, line_master: u32, fill_master: u32, text_master: u32) {
        self.line_masters.insert(id, line_master);
        self.fill_masters.insert(id, fill_master);
        self.text_masters.insert(id, text_master);
    }

    /// Record a line style, patching over anything already stored for `id`.
    pub fn add_line_style(&mut self, id: u32, style: OptionalLineStyle) {
        self.line_styles.entry(id).or_default().override_with(&style);
    }

    pub fn add_fill_style(&mut self, id: u32, style: OptionalFillStyle) {
        self.fill_styles.entry(id).or_default().override_with(&style);
    }

    pub fn add_text_block_style(&mut self, id: u32, style: OptionalTextBlockStyle) {
        self.text_block_styles.entry(id).or_default().override_with(&style);
    }

    pub fn add_char_style(&mut self, id: u32, style: OptionalCharStyle) {
        self.char_styles.entry(id).or_default().override_with(&style);
    }

    pub fn add_para_style(&mut self, id: u32, style: OptionalParaStyle) {
        self.para_styles.entry(id).or_default().override_with(&style);
    }

    /// Style sheet ids from `id` up to its root master, leaf first.
    ///
    /// The walk stops early on a repeated id or once `max_depth` sheets have
    /// been collected, keeping the chain gathered so far.
    fn master_chain(&self, id: u32, masters: &BTreeMap<u32, u32>) -> Vec<u32> {
        let mut chain = Vec::new();
        if id == MINUS_ONE {
            return chain;
        }
        let mut visited = HashSet::new();
        let mut current = id;
        loop {
            if !visited.insert(current) {
                log::debug!("style master chain of {} loops back to {}", id, current);
                break;
            }
            chain.push(current);
            if chain.len() >= self.max_depth {
                log::debug!("style master chain of {} cut at {} sheets", id, self.max_depth);
                break;
            }
            match masters.get(&current) {
                Some(&master) if master != MINUS_ONE => current = master,
                _ => break,
            }
        }
        chain
    }

    fn cascade<T: OptionalStyle>(
        &self,
        id: u32,
        table: &BTreeMap<u32, T>,
        masters: &BTreeMap<u32, u32>,
    ) -> T {
        let mut style = T::default();
        for sheet in self.master_chain(id, masters).iter().rev() {
            if let Some(overrides) = table.get(sheet) {
                style.override_with(overrides);
            }
        }
        style
    }

    pub fn optional_line_style(&self, id: u32) -> OptionalLineStyle {
        self.cascade(id, &self.line_styles, &self.line_masters)
    }

    pub fn optional_fill_style(&self, id: u32) -> OptionalFillStyle {
        self.cascade(id, &self.fill_styles, &self.fill_masters)
    }

    pub fn optional_text_block_style(&self, id: u32) -> OptionalTextBlockStyle {
        self.cascade(id, &self.text_block_styles, &self.text_masters)
    }

    pub fn optional_char_style(&self, id: u32) -> OptionalCharStyle {
        self.cascade(id, &self.char_styles, &self.text_masters)
    }

    pub fn optional_para_style(&self, id: u32) -> OptionalParaStyle {
        self.cascade(id, &self.para_styles, &self.text_masters)
    }

    pub fn line_style(&self, id: u32) -> LineStyle {
        LineStyle::resolved_from(&self.optional_line_style(id))
    }

    pub fn fill_style(&self, id: u32) -> FillStyle {
        FillStyle::resolved_from(&self.optional_fill_style(id))
    }

    pub fn text_block_style(&self, id: u32) -> TextBlockStyle {
        TextBlockStyle::resolved_from(&self.optional_text_block_style(id))
    }

    pub fn char_style(&self, id: u32) -> CharStyle {
        CharStyle::resolved_from(&self.optional_char_style(id))
    }

    pub fn para_style(&self, id: u32) -> ParaStyle {
        ParaStyle::resolved_from(&self.optional_para_style(id))
    }
}

/// Collector used by the first pass: it fills a [`Styles`] table from the
/// style-sheet events and ignores everything else.
#[derive(Debug, Default)]
pub struct StylesCollector {
    styles: Styles,
    current_sheet: Option<u32>,
}

impl StylesCollector {
    pub fn new(max_depth: usize) -> Self {
        Self {
            styles: Styles::new(max_depth),
            current_sheet: None,
        }
    }

    pub fn into_styles(self) -> Styles {
        self.styles
    }
}

impl Collector for StylesCollector {
    fn collect_style_sheet(&mut self, id: u32, _level: u32, line_master: u32, fill_master: u32, text_master: u32) {
        self.styles.add_style_masters(id, line_master, fill_master, text_master);
        self.current_sheet = Some(id);
    }

    fn collect_line_style(&mut self, _level: u32, style: &OptionalLineStyle) {
        if let Some(id) = self.current_sheet {
            self.styles.add_line_style(id, *style);
        }
    }

    fn collect_fill_style(&mut self, _level: u32, style: &OptionalFillStyle) {
        if let Some(id) = self.current_sheet {
            self.styles.add_fill_style(id, *style);
        }
    }

    fn collect_fill_style_with_offset(
        &mut self,
        level: u32,
        style: &OptionalFillStyle,
        shadow_offset_x: f64,
        shadow_offset_y: f64,
    ) {
        let mut style = *style;
        style.shadow_offset_x = Some(shadow_offset_x);
        style.shadow_offset_y = Some(shadow_offset_y);
        self.collect_fill_style(level, &style);
    }

    fn collect_text_block_style(&mut self, _level: u32, style: &OptionalTextBlockStyle) {
        if let Some(id) = self.current_sheet {
            self.styles.add_text_block_style(id, *style);
        }
    }

    // Only the first run of a sheet carries its default character format.
    fn collect_char_ix_style(&mut self, id: u32, _level: u32, _char_count: u32, style: &OptionalCharStyle) {
        if id != 0 {
            return;
        }
        if let Some(sheet) = self.current_sheet {
            self.styles.add_char_style(sheet, *style);
        }
    }

    fn collect_para_ix_style(&mut self, id: u32, _level: u32, _char_count: u32, style: &OptionalParaStyle) {
        if id != 0 {
            return;
        }
        if let Some(sheet) = self.current_sheet {
            self.styles.add_para_style(sheet, *style);
        }
    }
}
