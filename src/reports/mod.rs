// ABOUTME: Report document model, report kinds, and the service that builds and renders them
// ABOUTME: Reports are assembled from database rows into a styled document, then laid out to PDF
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

//! # Reports
//!
//! Every report goes through the same pipeline:
//!
//! 1. [`ReportService::build`] queries the database and hands the rows to the
//!    per-report builder, which produces a [`ReportDocument`]: header labels,
//!    statistic cards, and titled table or list sections.
//! 2. [`render`] either serializes the document as JSON or
//!    lays it out on A4 pages ([`layout`]) and writes the PDF ([`pdf`]).
//!
//! The builders are pure functions of their rows, so they are unit tested
//! without a database.

/// Attended visits report
pub mod attendance;
/// Expiring memberships report
pub mod expiring_memberships;
/// Page layout of a report document
pub mod layout;
/// Minimal PDF 1.4 writer
pub mod pdf;
/// Revenue report
pub mod revenue;
/// Trainer performance report
pub mod trainer_performance;

use crate::config::environment::ClubConfig;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

/// The four reports the club can export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Payments and revenue totals
    Revenue,
    /// Attended visits
    Attendance,
    /// Trainings per trainer
    TrainerPerformance,
    /// Active memberships about to end
    ExpiringMemberships,
}

impl ReportKind {
    /// Every report kind
    pub const ALL: [Self; 4] = [
        Self::Revenue,
        Self::Attendance,
        Self::TrainerPerformance,
        Self::ExpiringMemberships,
    ];

    /// URL and CLI name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Attendance => "attendance",
            Self::TrainerPerformance => "trainer_performance",
            Self::ExpiringMemberships => "expiring_memberships",
        }
    }

    /// Download file name
    #[must_use]
    pub const fn filename(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue_report.pdf",
            Self::Attendance => "attendance_report.pdf",
            Self::TrainerPerformance => "trainer_performance.pdf",
            Self::ExpiringMemberships => "expiring_memberships.pdf",
        }
    }
}

impl Display for ReportKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                AppError::invalid_input(format!(
                    "Unknown report '{s}', expected one of: revenue, attendance, trainer_performance, expiring_memberships"
                ))
            })
    }
}

/// Output format of a report download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Rendered PDF file
    #[default]
    Pdf,
    /// The document model as JSON
    Json,
}

impl ReportFormat {
    /// Parse the `format` query parameter (case-insensitive), PDF for anything unrecognized
    #[must_use]
    pub fn from_str_param(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pdf,
        }
    }

    /// MIME content type for this format
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Json => "application/json",
        }
    }

    /// Short name for logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Json => "json",
        }
    }
}

/// RGB color, serialized as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Header band and headings
    pub const NAVY: Self = Self(0x2c, 0x3e, 0x50);
    /// Table header rows
    pub const SLATE: Self = Self(0x34, 0x49, 0x5e);
    /// Positive figures
    pub const GREEN: Self = Self(0x27, 0xae, 0x60);
    /// Neutral figures
    pub const BLUE: Self = Self(0x29, 0x80, 0xb9);
    /// Figures worth attention
    pub const ORANGE: Self = Self(0xe6, 0x7e, 0x22);
    /// Urgent figures
    pub const RED: Self = Self(0xc0, 0x39, 0x2b);
    /// Secondary text
    pub const GRAY: Self = Self(0x7f, 0x8c, 0x8d);
    /// Alternate table rows
    pub const STRIPE: Self = Self(0xf9, 0xf9, 0xf9);
    /// Grid lines
    pub const RULE: Self = Self(0xdd, 0xdd, 0xdd);
    /// Body text
    pub const BLACK: Self = Self(0x22, 0x22, 0x22);
    /// Text on dark fills
    pub const WHITE: Self = Self(0xff, 0xff, 0xff);

    /// Channel values scaled to `0.0..=1.0` for PDF color operators
    #[must_use]
    pub fn unit(self) -> (f32, f32, f32) {
        (
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
        )
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Headline figure shown in a colored card under the header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    /// Formatted figure
    pub value: String,
    /// Caption under the figure
    pub label: String,
    /// Card color
    pub color: Color,
}

impl StatCard {
    /// Create a card
    pub fn new(value: impl Into<String>, label: impl Into<String>, color: Color) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            color,
        }
    }
}

/// Horizontal alignment of a table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    /// Text columns
    #[default]
    Left,
    /// Numeric columns
    Right,
}

/// Table column definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    /// Header text
    pub title: String,
    /// Relative width; columns share the page width in proportion
    pub weight: f32,
    /// Cell alignment
    pub align: Align,
}

impl Column {
    /// Left-aligned column
    pub fn text(title: impl Into<String>, weight: f32) -> Self {
        Self {
            title: title.into(),
            weight,
            align: Align::Left,
        }
    }

    /// Right-aligned column
    pub fn number(title: impl Into<String>, weight: f32) -> Self {
        Self {
            title: title.into(),
            weight,
            align: Align::Right,
        }
    }
}

/// Tabular section body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    /// Column definitions
    pub columns: Vec<Column>,
    /// Body rows, one cell per column
    pub rows: Vec<Vec<String>>,
    /// Optional bold summary row
    pub total: Option<Vec<String>>,
    /// Text shown instead of an empty body
    pub empty_text: String,
}

/// Content of a section
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum SectionBody {
    /// A table of records
    Table(Table),
    /// Bulleted recommendations
    List(Vec<String>),
}

/// Titled block of a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Heading
    pub title: String,
    /// Heading underline color
    pub color: Color,
    /// Table or list
    pub body: SectionBody,
}

/// A report ready to be rendered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
    /// Which report this is
    pub kind: ReportKind,
    /// Main heading
    pub title: String,
    /// Line under the heading
    pub subtitle: String,
    /// Covered period, e.g. `01.03.2025 - 31.03.2025`
    pub period: String,
    /// Club the report was generated for
    pub generated_by: String,
    /// Generation time
    pub generated_at: DateTime<Utc>,
    /// Headline figures
    pub stats: Vec<StatCard>,
    /// Body sections
    pub sections: Vec<Section>,
}

impl ReportDocument {
    /// Footer line printed on every page
    #[must_use]
    pub fn footer(&self) -> String {
        format!(
            "Report generated automatically by {}. Confidential.",
            self.generated_by
        )
    }
}

/// Parameters of a report request
#[derive(Debug, Clone, Copy)]
pub struct ReportParams {
    /// First day of the revenue period
    pub date_from: Option<NaiveDate>,
    /// Last day of the revenue period
    pub date_to: Option<NaiveDate>,
    /// Reference day for expiry calculations
    pub today: NaiveDate,
    /// Generation time stamped on the document
    pub now: DateTime<Utc>,
}

impl ReportParams {
    /// Parameters for a report generated right now without a period
    #[must_use]
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            date_from: None,
            date_to: None,
            today: now.date_naive(),
            now,
        }
    }
}

/// A rendered report
#[derive(Debug, Clone)]
pub struct RenderedReport {
    /// File body
    pub bytes: Vec<u8>,
    /// MIME type
    pub content_type: &'static str,
    /// Suggested download name
    pub filename: &'static str,
}

/// Builds report documents from the database and renders them
pub struct ReportService {
    database: Arc<Database>,
    club: ClubConfig,
}

impl ReportService {
    /// Create a report service
    #[must_use]
    pub const fn new(database: Arc<Database>, club: ClubConfig) -> Self {
        Self { database, club }
    }

    /// Query the rows for `kind` and assemble the document
    ///
    /// The expiring-memberships report sweeps expired memberships first so
    /// it never lists a membership that has already ended.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or the period is inverted
    pub async fn build(&self, kind: ReportKind, params: &ReportParams) -> AppResult<ReportDocument> {
        let header = Header {
            club: &self.club,
            now: params.now,
        };
        let repository = self.database.reports();

        match kind {
            ReportKind::Revenue => {
                let period = Period::new(params.date_from, params.date_to)?;
                let (from, to) = period.bounds();
                let rows = repository.revenue(from, to).await?;
                Ok(revenue::build(&header, &period, &rows))
            }
            ReportKind::Attendance => {
                let rows = repository.visits().await?;
                Ok(attendance::build(&header, &rows))
            }
            ReportKind::TrainerPerformance => {
                let rows = repository.trainer_load().await?;
                Ok(trainer_performance::build(&header, &rows))
            }
            ReportKind::ExpiringMemberships => {
                self.database
                    .memberships()
                    .refresh_expired_memberships(params.today)
                    .await?;
                let window = u64::try_from(self.club.expiring_window_days).unwrap_or(0);
                let until = params
                    .today
                    .checked_add_days(Days::new(window))
                    .unwrap_or(NaiveDate::MAX);
                let rows = repository.expiring(until).await?;
                Ok(expiring_memberships::build(
                    &header,
                    params.today,
                    self.club.expiring_window_days,
                    &rows,
                ))
            }
        }
    }
}

/// Render a document in the requested format
///
/// # Errors
///
/// Returns an error if JSON serialization fails
pub fn render(document: &ReportDocument, format: ReportFormat) -> AppResult<RenderedReport> {
    let bytes = match format {
        ReportFormat::Pdf => {
            let pages = layout::layout(document);
            pdf::write_pdf(&pages, &document.title, document.generated_at)
        }
        ReportFormat::Json => serde_json::to_vec_pretty(document)?,
    };
    Ok(RenderedReport {
        bytes,
        content_type: format.content_type(),
        filename: document.kind.filename(),
    })
}

/// Header values shared by every builder
pub struct Header<'a> {
    /// Club branding and currency
    pub club: &'a ClubConfig,
    /// Generation time
    pub now: DateTime<Utc>,
}

impl Header<'_> {
    /// Money with grouping and the configured currency suffix
    #[must_use]
    pub fn money(&self, amount: fitclub_core::models::Decimal) -> String {
        format!(
            "{} {}",
            fitclub_core::models::money::grouped(amount),
            self.club.currency
        )
    }

    /// Start a document with the shared header fields
    #[must_use]
    pub fn document(
        &self,
        kind: ReportKind,
        title: &str,
        subtitle: &str,
        period: String,
    ) -> ReportDocument {
        ReportDocument {
            kind,
            title: title.to_owned(),
            subtitle: subtitle.to_owned(),
            period,
            generated_by: self.club.name.clone(),
            generated_at: self.now,
            stats: Vec::new(),
            sections: Vec::new(),
        }
    }
}

/// Inclusive calendar-day period of the revenue report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Period {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl Period {
    /// Create a period
    ///
    /// # Errors
    ///
    /// Returns `VALUE_OUT_OF_RANGE` when `to` precedes `from`
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> AppResult<Self> {
        if let (Some(from), Some(to)) = (from, to) {
            if to < from {
                return Err(AppError::out_of_range(
                    "date_to",
                    "date_to cannot be before date_from",
                ));
            }
        }
        Ok(Self { from, to })
    }

    /// Half-open UTC bounds covering the whole of both end days
    #[must_use]
    pub fn bounds(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let start = |day: NaiveDate| day.and_time(chrono::NaiveTime::MIN).and_utc();
        (
            self.from.map(start),
            self.to
                .and_then(|day| day.checked_add_days(Days::new(1)))
                .map(start),
        )
    }

    /// Human-readable label
    #[must_use]
    pub fn label(&self) -> String {
        match (self.from, self.to) {
            (Some(from), Some(to)) => format!("{} - {}", format_date(from), format_date(to)),
            (Some(from), None) => format!("Since {}", format_date(from)),
            (None, Some(to)) => format!("Until {}", format_date(to)),
            (None, None) => "All time".to_owned(),
        }
    }
}

/// `dd.mm.yyyy`
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// `dd.mm.yyyy HH:MM`
#[must_use]
pub fn format_datetime(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%d.%m.%Y %H:%M").to_string()
}
