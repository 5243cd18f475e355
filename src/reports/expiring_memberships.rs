// ABOUTME: Expiring memberships report builder for active memberships ending within the window
// ABOUTME: Adds a contact list so staff can reach clients before their membership ends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{format_date, Color, Column, Header, ReportDocument, ReportKind, Section, SectionBody, StatCard, Table};
use crate::database::reports::ExpiringRow;
use chrono::{Days, NaiveDate};

/// Build the expiring memberships report
#[must_use]
pub fn build(
    header: &Header<'_>,
    today: NaiveDate,
    window_days: i64,
    rows: &[ExpiringRow],
) -> ReportDocument {
    let until = u64::try_from(window_days)
        .ok()
        .and_then(|days| today.checked_add_days(Days::new(days)))
        .unwrap_or(today);
    let ending_today = rows.iter().filter(|row| row.end_date <= today).count();

    let mut document = header.document(
        ReportKind::ExpiringMemberships,
        "Expiring Memberships",
        &format!("Active memberships ending within {window_days} days"),
        format!("{} - {}", format_date(today), format_date(until)),
    );
    document.stats = vec![
        StatCard::new(rows.len().to_string(), "Expiring memberships", Color::RED),
        StatCard::new(ending_today.to_string(), "Ending today", Color::ORANGE),
        StatCard::new(window_days.to_string(), "Days ahead", Color::BLUE),
    ];

    document.sections.push(Section {
        title: "Memberships".into(),
        color: Color::RED,
        body: SectionBody::Table(Table {
            columns: vec![
                Column::text("Client", 2.0),
                Column::text("Membership type", 2.0),
                Column::text("End date", 1.2),
                Column::number("Days left", 1.0),
            ],
            rows: rows
                .iter()
                .map(|row| {
                    vec![
                        row.client_name.clone(),
                        row.type_name.clone(),
                        format_date(row.end_date),
                        (row.end_date - today).num_days().to_string(),
                    ]
                })
                .collect(),
            total: None,
            empty_text: "No memberships expire in this window".into(),
        }),
    });

    if !rows.is_empty() {
        document.sections.push(Section {
            title: "Contact before expiry".into(),
            color: Color::ORANGE,
            body: SectionBody::List(
                rows.iter()
                    .map(|row| {
                        format!(
                            "Call {} at {} about renewing {} (ends {})",
                            row.client_name,
                            row.client_phone,
                            row.type_name,
                            format_date(row.end_date)
                        )
                    })
                    .collect(),
            ),
        });
    }

    document
}
