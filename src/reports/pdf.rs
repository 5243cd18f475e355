// ABOUTME: Minimal PDF 1.4 writer drawing text, rectangles, and lines with base-14 Helvetica
// ABOUTME: Text is WinAnsi-encoded; Cyrillic is transliterated and other unsupported glyphs become '?'
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

//! PDF output
//!
//! Reports only need filled rectangles, lines, and single-line text runs, so
//! the writer emits uncompressed content streams against the two standard
//! Helvetica fonts. Standard fonts need no embedding but only cover the
//! WinAnsi character set, which is why text goes through [`encode`] first.
//! Glyph widths come from the Helvetica AFM metrics so the layout can measure
//! and align text.

use super::layout::{DrawOp, Font, Page, PAGE_HEIGHT, PAGE_WIDTH};
use super::Color;
use chrono::{DateTime, Utc};

/// Helvetica advance widths for codes 32..=126, in 1/1000 em
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

/// Helvetica-Bold advance widths for codes 32..=126, in 1/1000 em
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48-63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80-95
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96-111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112-126
];

/// Latin transliteration of `а`..`я`
const CYRILLIC: [&str; 32] = [
    "a", "b", "v", "g", "d", "e", "zh", "z", "i", "y", "k", "l", "m", "n", "o", "p", "r", "s",
    "t", "u", "f", "kh", "ts", "ch", "sh", "shch", "", "y", "", "e", "yu", "ya",
];

/// Encode text as WinAnsi bytes
///
/// ASCII and Latin-1 pass through, typographic punctuation maps to its
/// WinAnsi code, Cyrillic is transliterated, anything else becomes `?`.
#[must_use]
pub fn encode(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' '..='~' => out.push(c as u8),
            '\u{a0}'..='\u{ff}' => out.push(c as u8),
            '\t' | '\n' | '\r' => out.push(b' '),
            '\u{20ac}' => out.push(0x80),
            '\u{2026}' => out.push(0x85),
            '\u{2018}' => out.push(0x91),
            '\u{2019}' => out.push(0x92),
            '\u{201c}' => out.push(0x93),
            '\u{201d}' => out.push(0x94),
            '\u{2022}' => out.push(0x95),
            '\u{2013}' => out.push(0x96),
            '\u{2014}' => out.push(0x97),
            '\u{2116}' => out.extend_from_slice(b"No"),
            '\u{20bd}' => out.extend_from_slice(b"RUB"),
            'ё' => out.extend_from_slice(b"yo"),
            'Ё' => out.extend_from_slice(b"Yo"),
            'а'..='я' => out.extend_from_slice(CYRILLIC[c as usize - 'а' as usize].as_bytes()),
            'А'..='Я' => {
                let latin = CYRILLIC[c as usize - 'А' as usize].as_bytes();
                if let Some((first, rest)) = latin.split_first() {
                    out.push(first.to_ascii_uppercase());
                    out.extend_from_slice(rest);
                }
            }
            _ => out.push(b'?'),
        }
    }
    out
}

/// Advance width of one WinAnsi code in 1/1000 em
fn glyph_width(code: u8, font: Font) -> u16 {
    let (table, fallback) = match font {
        Font::Regular => (&HELVETICA_WIDTHS, 556),
        Font::Bold => (&HELVETICA_BOLD_WIDTHS, 611),
    };
    match code {
        32..=126 => table[usize::from(code - 32)],
        0x85 | 0x97 => 1000,
        0x91 | 0x92 => match font {
            Font::Regular => 222,
            Font::Bold => 278,
        },
        0x93 | 0x94 => match font {
            Font::Regular => 333,
            Font::Bold => 500,
        },
        0x95 => 350,
        0xa0 => 278,
        0xb0 => 400,
        _ => fallback,
    }
}

/// Width of `text` in points at `size`
#[must_use]
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = encode(text)
        .into_iter()
        .map(|code| u32::from(glyph_width(code, font)))
        .sum();
    units as f32 * size / 1000.0
}

/// PDF literal string body for WinAnsi bytes, keeping the file ASCII-only
fn escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(char::from(b));
            }
            32..=126 => out.push(char::from(b)),
            _ => out.push_str(&format!("\\{b:03o}")),
        }
    }
    out
}

fn num(value: f32) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_owned()
}

fn color_operands(color: Color) -> String {
    let (r, g, b) = color.unit();
    format!("{} {} {}", num(r), num(g), num(b))
}

/// Content stream drawing one page
fn content_stream(page: &Page) -> String {
    let mut out = String::new();
    for op in &page.ops {
        match op {
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                fill,
            } => {
                out.push_str(&format!(
                    "{} rg\n{} {} {} {} re f\n",
                    color_operands(*fill),
                    num(*x),
                    num(*y),
                    num(*width),
                    num(*height)
                ));
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => {
                out.push_str(&format!(
                    "{} RG\n{} w\n{} {} m {} {} l S\n",
                    color_operands(*color),
                    num(*width),
                    num(*x1),
                    num(*y1),
                    num(*x2),
                    num(*y2)
                ));
            }
            DrawOp::Text {
                x,
                y,
                size,
                font,
                color,
                text,
            } => {
                let font_name = match font {
                    Font::Regular => "F1",
                    Font::Bold => "F2",
                };
                out.push_str(&format!(
                    "{} rg\nBT /{font_name} {} Tf {} {} Td ({}) Tj ET\n",
                    color_operands(*color),
                    num(*size),
                    num(*x),
                    num(*y),
                    escape(&encode(text))
                ));
            }
        }
    }
    out
}

/// Serialize laid-out pages into a complete PDF file
///
/// Object layout: 1 catalog, 2 page tree, 3 and 4 fonts, 5 document info,
/// then a page object and its content stream for every page.
#[must_use]
pub fn write_pdf(pages: &[Page], title: &str, created: DateTime<Utc>) -> Vec<u8> {
    let page_object = |index: usize| 6 + index * 2;
    let kids = (0..pages.len())
        .map(|i| format!("{} 0 R", page_object(i)))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_owned(),
        format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_owned(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_owned(),
        format!(
            "<< /Title ({}) /Producer (fitclub_server) /CreationDate (D:{}Z) >>",
            escape(&encode(title)),
            created.format("%Y%m%d%H%M%S")
        ),
    ];
    for (index, page) in pages.iter().enumerate() {
        let content = content_stream(page);
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
            num(PAGE_WIDTH),
            num(PAGE_HEIGHT),
            page_object(index) + 1
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{content}endstream",
            content.len()
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{body}\nendobj\n", index + 1));
    }

    let xref_offset = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        objects.len() + 1
    ));
    out.into_bytes()
}
