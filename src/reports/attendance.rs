// ABOUTME: Attendance report builder listing attended visits
// ABOUTME: Summarizes total visits and how many distinct clients and trainers they involve
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{format_datetime, Color, Column, Header, ReportDocument, ReportKind, Section, SectionBody, StatCard, Table};
use crate::database::reports::VisitRow;
use std::collections::HashSet;

/// Build the attendance report
#[must_use]
pub fn build(header: &Header<'_>, rows: &[VisitRow]) -> ReportDocument {
    let clients: HashSet<&str> = rows.iter().map(|row| row.client_name.as_str()).collect();
    let trainers: HashSet<&str> = rows.iter().map(|row| row.trainer_name.as_str()).collect();

    let mut document = header.document(
        ReportKind::Attendance,
        "Attendance Report",
        "Visits confirmed at trainings",
        "All time".to_owned(),
    );
    document.stats = vec![
        StatCard::new(rows.len().to_string(), "Total visits", Color::GREEN),
        StatCard::new(clients.len().to_string(), "Clients", Color::BLUE),
        StatCard::new(trainers.len().to_string(), "Trainers", Color::ORANGE),
    ];

    document.sections.push(Section {
        title: "Visits".into(),
        color: Color::GREEN,
        body: SectionBody::Table(Table {
            columns: vec![
                Column::text("Date", 1.3),
                Column::text("Client", 2.0),
                Column::text("Training", 1.8),
                Column::text("Trainer", 1.8),
            ],
            rows: rows
                .iter()
                .map(|row| {
                    vec![
                        format_datetime(row.training_time),
                        row.client_name.clone(),
                        row.training_name.clone(),
                        row.trainer_name.clone(),
                    ]
                })
                .collect(),
            total: None,
            empty_text: "No visits recorded yet".into(),
        }),
    });

    document
}
