// ABOUTME: Lays a report document out on A4 pages as drawing operations
// ABOUTME: Handles the header band, stat cards, table page breaks with repeated headers, and footers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::pdf::text_width;
use super::{Align, Color, ReportDocument, SectionBody, StatCard, Table};
use std::mem;

/// A4 width in points
pub const PAGE_WIDTH: f32 = 595.28;
/// A4 height in points
pub const PAGE_HEIGHT: f32 = 841.89;
/// 1.5 cm
pub const MARGIN: f32 = 42.52;

const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const FOOTER_HEIGHT: f32 = 24.0;
const BOTTOM: f32 = MARGIN + FOOTER_HEIGHT;

const HEADER_HEIGHT: f32 = 72.0;
const CARD_HEIGHT: f32 = 54.0;
const CARD_GAP: f32 = 10.0;
const ROW_HEIGHT: f32 = 18.0;
const CELL_PADDING: f32 = 5.0;
const TABLE_FONT: f32 = 9.0;
const LIST_FONT: f32 = 10.0;
const LIST_LINE: f32 = 14.0;
const LIST_INDENT: f32 = 12.0;

/// Standard font used for a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// Helvetica
    Regular,
    /// Helvetica-Bold
    Bold,
}

/// One drawing primitive, in PDF user space (origin bottom-left)
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Filled rectangle
    Rect {
        /// Left edge
        x: f32,
        /// Bottom edge
        y: f32,
        /// Width
        width: f32,
        /// Height
        height: f32,
        /// Fill color
        fill: Color,
    },
    /// Stroked line
    Line {
        /// Start x
        x1: f32,
        /// Start y
        y1: f32,
        /// End x
        x2: f32,
        /// End y
        y2: f32,
        /// Stroke width
        width: f32,
        /// Stroke color
        color: Color,
    },
    /// Single-line text run
    Text {
        /// Left edge
        x: f32,
        /// Baseline
        y: f32,
        /// Font size in points
        size: f32,
        /// Font
        font: Font,
        /// Fill color
        color: Color,
        /// Text, encoded when written
        text: String,
    },
}

/// Drawing operations of one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Operations in paint order
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// All text runs on the page, in paint order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Lay out a document on as many pages as it needs
#[must_use]
pub fn layout(document: &ReportDocument) -> Vec<Page> {
    let mut composer = Composer::new();
    composer.header(document);
    composer.cards(&document.stats);

    for section in &document.sections {
        composer.section_title(&section.title, section.color);
        match &section.body {
            SectionBody::Table(table) => composer.table(table),
            SectionBody::List(items) => composer.list(items),
        }
        composer.y -= 14.0;
    }

    let mut pages = composer.finish();
    let footer = document.footer();
    let total = pages.len();
    for (index, page) in pages.iter_mut().enumerate() {
        draw_footer(page, &footer, index + 1, total);
    }
    pages
}

/// Shorten `text` with an ellipsis until it fits `max_width`
fn fit(text: &str, font: Font, size: f32, max_width: f32) -> String {
    if text_width(text, font, size) <= max_width {
        return text.to_owned();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate = format!("{}...", chars.iter().collect::<String>().trim_end());
        if text_width(&candidate, font, size) <= max_width {
            return candidate;
        }
    }
    String::new()
}

/// Greedy word wrap to `max_width`; overlong words are shortened
fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_owned()
        } else {
            format!("{line} {word}")
        };
        if text_width(&candidate, font, size) <= max_width {
            line = candidate;
        } else {
            if !line.is_empty() {
                lines.push(mem::take(&mut line));
            }
            line = fit(word, font, size, max_width);
        }
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

fn draw_footer(page: &mut Page, footer: &str, number: usize, total: usize) {
    let rule_y = MARGIN + 16.0;
    page.ops.push(DrawOp::Line {
        x1: MARGIN,
        y1: rule_y,
        x2: PAGE_WIDTH - MARGIN,
        y2: rule_y,
        width: 0.5,
        color: Color::RULE,
    });
    let numbering = format!("Page {number} of {total}");
    let numbering_width = text_width(&numbering, Font::Regular, 8.0);
    page.ops.push(DrawOp::Text {
        x: MARGIN,
        y: MARGIN + 4.0,
        size: 8.0,
        font: Font::Regular,
        color: Color::GRAY,
        text: fit(footer, Font::Regular, 8.0, CONTENT_WIDTH - numbering_width - 12.0),
    });
    page.ops.push(DrawOp::Text {
        x: PAGE_WIDTH - MARGIN - numbering_width,
        y: MARGIN + 4.0,
        size: 8.0,
        font: Font::Regular,
        color: Color::GRAY,
        text: numbering,
    });
}

/// Cursor over the pages being filled, top to bottom
struct Composer {
    done: Vec<Page>,
    page: Page,
    y: f32,
}

impl Composer {
    fn new() -> Self {
        Self {
            done: Vec::new(),
            page: Page::default(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn finish(mut self) -> Vec<Page> {
        self.done.push(self.page);
        self.done
    }

    fn new_page(&mut self) {
        self.done.push(mem::take(&mut self.page));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Start a new page unless `height` still fits; returns whether it broke
    fn ensure(&mut self, height: f32) -> bool {
        if self.y - height < BOTTOM {
            self.new_page();
            true
        } else {
            false
        }
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Color) {
        self.page.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
        });
    }

    fn line(&mut self, y: f32, width: f32, color: Color) {
        self.page.ops.push(DrawOp::Line {
            x1: MARGIN,
            y1: y,
            x2: PAGE_WIDTH - MARGIN,
            y2: y,
            width,
            color,
        });
    }

    fn text(&mut self, x: f32, y: f32, size: f32, font: Font, color: Color, text: String) {
        self.page.ops.push(DrawOp::Text {
            x,
            y,
            size,
            font,
            color,
            text,
        });
    }

    fn text_right(&mut self, right: f32, y: f32, size: f32, font: Font, color: Color, text: String) {
        let x = right - text_width(&text, font, size);
        self.text(x, y, size, font, color, text);
    }

    fn header(&mut self, document: &ReportDocument) {
        let top = self.y;
        self.rect(MARGIN, top - HEADER_HEIGHT, CONTENT_WIDTH, HEADER_HEIGHT, Color::NAVY);

        let left = MARGIN + 14.0;
        let right = PAGE_WIDTH - MARGIN - 14.0;
        let half = CONTENT_WIDTH / 2.0 - 20.0;
        self.text(
            left,
            top - 30.0,
            20.0,
            Font::Bold,
            Color::WHITE,
            fit(&document.title, Font::Bold, 20.0, half),
        );
        self.text(
            left,
            top - 50.0,
            10.0,
            Font::Regular,
            Color::WHITE,
            fit(&document.subtitle, Font::Regular, 10.0, half),
        );
        self.text_right(
            right,
            top - 26.0,
            10.0,
            Font::Bold,
            Color::WHITE,
            fit(&document.generated_by, Font::Bold, 10.0, half),
        );
        self.text_right(
            right,
            top - 42.0,
            9.0,
            Font::Regular,
            Color::WHITE,
            format!("Period: {}", document.period),
        );
        self.text_right(
            right,
            top - 56.0,
            9.0,
            Font::Regular,
            Color::WHITE,
            format!("Generated: {}", super::format_datetime(document.generated_at)),
        );
        self.y = top - HEADER_HEIGHT - 16.0;
    }

    fn cards(&mut self, stats: &[StatCard]) {
        if stats.is_empty() {
            return;
        }
        let count = stats.len() as f32;
        let width = (CONTENT_WIDTH - CARD_GAP * (count - 1.0)) / count;
        let top = self.y;
        for (index, card) in stats.iter().enumerate() {
            let x = MARGIN + index as f32 * (width + CARD_GAP);
            self.rect(x, top - CARD_HEIGHT, width, CARD_HEIGHT, card.color);
            self.text(
                x + 10.0,
                top - 24.0,
                16.0,
                Font::Bold,
                Color::WHITE,
                fit(&card.value, Font::Bold, 16.0, width - 20.0),
            );
            self.text(
                x + 10.0,
                top - 42.0,
                9.0,
                Font::Regular,
                Color::WHITE,
                fit(&card.label, Font::Regular, 9.0, width - 20.0),
            );
        }
        self.y = top - CARD_HEIGHT - 20.0;
    }

    fn section_title(&mut self, title: &str, color: Color) {
        // keep the heading with at least its first two rows
        self.ensure(28.0 + 2.0 * ROW_HEIGHT);
        let top = self.y;
        self.text(
            MARGIN,
            top - 13.0,
            13.0,
            Font::Bold,
            Color::NAVY,
            fit(title, Font::Bold, 13.0, CONTENT_WIDTH),
        );
        self.line(top - 19.0, 1.5, color);
        self.y = top - 28.0;
    }

    fn table(&mut self, table: &Table) {
        let total_weight: f32 = table.columns.iter().map(|c| c.weight).sum();
        let mut edges = Vec::with_capacity(table.columns.len() + 1);
        let mut x = MARGIN;
        edges.push(x);
        for column in &table.columns {
            x += CONTENT_WIDTH * column.weight / total_weight;
            edges.push(x);
        }
        let headers: Vec<String> = table.columns.iter().map(|c| c.title.clone()).collect();

        self.table_header(table, &edges, &headers);
        if table.rows.is_empty() && !table.empty_text.is_empty() {
            self.ensure(ROW_HEIGHT);
            let baseline = self.y - ROW_HEIGHT / 2.0 - TABLE_FONT * 0.35;
            let text = fit(&table.empty_text, Font::Regular, TABLE_FONT, CONTENT_WIDTH);
            self.text(MARGIN + CELL_PADDING, baseline, TABLE_FONT, Font::Regular, Color::GRAY, text);
            self.y -= ROW_HEIGHT;
        }

        for (index, row) in table.rows.iter().enumerate() {
            if self.ensure(ROW_HEIGHT) {
                self.table_header(table, &edges, &headers);
            }
            if index % 2 == 1 {
                self.rect(MARGIN, self.y - ROW_HEIGHT, CONTENT_WIDTH, ROW_HEIGHT, Color::STRIPE);
            }
            self.table_row(table, &edges, row, Font::Regular, Color::BLACK);
            self.line(self.y, 0.5, Color::RULE);
        }

        if let Some(total) = &table.total {
            if self.ensure(ROW_HEIGHT) {
                self.table_header(table, &edges, &headers);
            }
            self.line(self.y, 1.0, Color::NAVY);
            self.table_row(table, &edges, total, Font::Bold, Color::NAVY);
        }
    }

    fn table_header(&mut self, table: &Table, edges: &[f32], headers: &[String]) {
        self.ensure(ROW_HEIGHT * 2.0);
        self.rect(MARGIN, self.y - ROW_HEIGHT, CONTENT_WIDTH, ROW_HEIGHT, Color::SLATE);
        self.table_row(table, edges, headers, Font::Bold, Color::WHITE);
    }

    /// Draw one row of cells at the cursor and move below it
    fn table_row(&mut self, table: &Table, edges: &[f32], cells: &[String], font: Font, color: Color) {
        let baseline = self.y - ROW_HEIGHT / 2.0 - TABLE_FONT * 0.35;
        for (index, column) in table.columns.iter().enumerate() {
            let (Some(cell), Some(&left), Some(&right)) =
                (cells.get(index), edges.get(index), edges.get(index + 1))
            else {
                continue;
            };
            let text = fit(cell, font, TABLE_FONT, right - left - 2.0 * CELL_PADDING);
            match column.align {
                Align::Left => self.text(left + CELL_PADDING, baseline, TABLE_FONT, font, color, text),
                Align::Right => {
                    self.text_right(right - CELL_PADDING, baseline, TABLE_FONT, font, color, text);
                }
            }
        }
        self.y -= ROW_HEIGHT;
    }

    fn list(&mut self, items: &[String]) {
        let width = CONTENT_WIDTH - LIST_INDENT;
        for item in items {
            for (index, line) in wrap(item, Font::Regular, LIST_FONT, width).into_iter().enumerate() {
                self.ensure(LIST_LINE);
                let baseline = self.y - LIST_FONT;
                if index == 0 {
                    self.text(MARGIN, baseline, LIST_FONT, Font::Bold, Color::NAVY, "-".to_owned());
                }
                self.text(MARGIN + LIST_INDENT, baseline, LIST_FONT, Font::Regular, Color::BLACK, line);
                self.y -= LIST_LINE;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::tests::at;
    use crate::reports::{Column, ReportKind, Section};

    fn document(rows: usize) -> ReportDocument {
        ReportDocument {
            kind: ReportKind::Attendance,
            title: "Attendance Report".into(),
            subtitle: "Visits".into(),
            period: "All time".into(),
            generated_by: "Iron Club".into(),
            generated_at: at(2025, 4, 1, 8, 0),
            stats: vec![StatCard::new("3", "Total visits", Color::GREEN)],
            sections: vec![Section {
                title: "Visits".into(),
                color: Color::GREEN,
                body: SectionBody::Table(Table {
                    columns: vec![Column::text("Client", 2.0), Column::number("Count", 1.0)],
                    rows: (0..rows)
                        .map(|i| vec![format!("Client {i}"), i.to_string()])
                        .collect(),
                    total: Some(vec!["Total".into(), rows.to_string()]),
                    empty_text: "Nothing here".into(),
                }),
            }],
        }
    }

    #[test]
    fn test_single_page_has_footer() {
        let pages = layout(&document(3));
        assert_eq!(pages.len(), 1);
        let texts: Vec<&str> = pages[0].texts().collect();
        assert!(texts.contains(&"Page 1 of 1"));
        assert!(texts.contains(&"Report generated automatically by Iron Club. Confidential."));
        assert!(texts.contains(&"Client 2"));
    }

    #[test]
    fn test_long_table_breaks_and_repeats_header() {
        let pages = layout(&document(120));
        assert!(pages.len() >= 3);
        let last = pages.len();
        for (index, page) in pages.iter().enumerate() {
            let texts: Vec<&str> = page.texts().collect();
            assert!(texts.contains(&"Client"), "page {} lacks the header row", index + 1);
            let numbering = format!("Page {} of {last}", index + 1);
            assert!(texts.contains(&numbering.as_str()));
        }
        let all: Vec<&str> = pages.iter().flat_map(Page::texts).collect();
        assert!(all.contains(&"Client 119"));
        assert!(all.contains(&"Total"));
    }

    #[test]
    fn test_empty_table_shows_placeholder() {
        let pages = layout(&document(0));
        assert!(pages[0].texts().any(|t| t == "Nothing here"));
    }

    #[test]
    fn test_fit_and_wrap() {
        let long = "A very long client name that cannot possibly fit";
        let fitted = fit(long, Font::Regular, 9.0, 60.0);
        assert!(fitted.ends_with("..."));
        assert!(text_width(&fitted, Font::Regular, 9.0) <= 60.0);

        let lines = wrap(long, Font::Regular, 10.0, 100.0);
        assert!(lines.len() > 1);
        assert!(lines
            .iter()
            .all(|line| text_width(line, Font::Regular, 10.0) <= 100.0));
    }
}
