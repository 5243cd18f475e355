// ABOUTME: Trainer performance report builder ranking trainers by trainings led
// ABOUTME: Lists trainers without trainings as scheduling recommendations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{Color, Column, Header, ReportDocument, ReportKind, Section, SectionBody, StatCard, Table};
use crate::database::reports::TrainerLoadRow;

/// Build the trainer performance report; rows arrive ordered by trainings, busiest first
#[must_use]
pub fn build(header: &Header<'_>, rows: &[TrainerLoadRow]) -> ReportDocument {
    let trainings: i64 = rows.iter().map(|row| row.trainings).sum();
    let visits: i64 = rows.iter().map(|row| row.visits).sum();

    let mut document = header.document(
        ReportKind::TrainerPerformance,
        "Trainer Performance",
        "Trainings led and visits per trainer",
        "All time".to_owned(),
    );
    document.stats = vec![
        StatCard::new(rows.len().to_string(), "Trainers", Color::BLUE),
        StatCard::new(trainings.to_string(), "Trainings", Color::GREEN),
        StatCard::new(visits.to_string(), "Visits", Color::ORANGE),
    ];

    document.sections.push(Section {
        title: "Trainers".into(),
        color: Color::BLUE,
        body: SectionBody::Table(Table {
            columns: vec![
                Column::text("Trainer", 2.0),
                Column::text("Specialization", 2.0),
                Column::number("Trainings", 1.0),
                Column::number("Visits", 1.0),
            ],
            rows: rows
                .iter()
                .map(|row| {
                    vec![
                        row.trainer_name.clone(),
                        row.specialization.clone(),
                        row.trainings.to_string(),
                        row.visits.to_string(),
                    ]
                })
                .collect(),
            total: Some(vec![
                "Total".into(),
                String::new(),
                trainings.to_string(),
                visits.to_string(),
            ]),
            empty_text: "No trainers registered".into(),
        }),
    });

    let idle: Vec<String> = rows
        .iter()
        .filter(|row| row.trainings == 0)
        .map(|row| format!("{} has no trainings scheduled", row.trainer_name))
        .collect();
    if !idle.is_empty() {
        document.sections.push(Section {
            title: "Recommendations".into(),
            color: Color::ORANGE,
            body: SectionBody::List(idle),
        });
    }

    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::tests::{at, club};

    fn row(name: &str, trainings: i64, visits: i64) -> TrainerLoadRow {
        TrainerLoadRow {
            trainer_name: name.into(),
            specialization: "Fitness".into(),
            trainings,
            visits,
        }
    }

    #[test]
    fn test_totals_and_idle_trainers() {
        let club = club();
        let header = Header {
            club: &club,
            now: at(2025, 4, 1, 8, 0),
        };
        let rows = vec![row("Ivanov Ivan", 5, 40), row("Orlova Olga", 0, 0)];
        let document = build(&header, &rows);

        assert_eq!(document.stats[1].value, "5");
        assert_eq!(document.stats[2].value, "40");
        assert_eq!(document.sections.len(), 2);
        assert_eq!(
            document.sections[1].body,
            SectionBody::List(vec!["Orlova Olga has no trainings scheduled".into()])
        );
    }

    #[test]
    fn test_no_recommendations_when_everyone_works() {
        let club = club();
        let header = Header {
            club: &club,
            now: at(2025, 4, 1, 8, 0),
        };
        let document = build(&header, &[row("Ivanov Ivan", 2, 3)]);
        assert_eq!(document.sections.len(), 1);
    }
}
