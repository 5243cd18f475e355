// ABOUTME: Revenue report builder: payment table, totals, and breakdown by payment type
// ABOUTME: Pure function of the payment rows so it can be tested without a database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use super::{format_date, Color, Column, Header, Period, ReportDocument, ReportKind, Section, SectionBody, StatCard, Table};
use crate::database::reports::RevenueRow;
use fitclub_core::models::money::MONEY_SCALE;
use fitclub_core::models::{Decimal, PaymentType};
use rust_decimal::RoundingStrategy;

/// Build the revenue report
#[must_use]
pub fn build(header: &Header<'_>, period: &Period, rows: &[RevenueRow]) -> ReportDocument {
    let total: Decimal = rows.iter().map(|row| row.amount).sum();
    let average = average(total, rows.len());

    let mut document = header.document(
        ReportKind::Revenue,
        "Revenue Report",
        "Payments received from clients",
        period.label(),
    );
    document.stats = vec![
        StatCard::new(header.money(total), "Total revenue", Color::GREEN),
        StatCard::new(rows.len().to_string(), "Payments", Color::BLUE),
        StatCard::new(header.money(average), "Average payment", Color::ORANGE),
    ];

    document.sections.push(Section {
        title: "Payments".into(),
        color: Color::GREEN,
        body: SectionBody::Table(Table {
            columns: vec![
                Column::text("Date", 1.0),
                Column::text("Client", 2.2),
                Column::number("Amount", 1.4),
                Column::text("Payment type", 1.2),
            ],
            rows: rows
                .iter()
                .map(|row| {
                    vec![
                        format_date(row.payment_date.date_naive()),
                        row.client_name.clone(),
                        header.money(row.amount),
                        row.payment_type.label().to_owned(),
                    ]
                })
                .collect(),
            total: Some(vec![
                "Total".into(),
                String::new(),
                header.money(total),
                String::new(),
            ]),
            empty_text: "No payments in this period".into(),
        }),
    });

    document.sections.push(Section {
        title: "Breakdown by payment type".into(),
        color: Color::BLUE,
        body: SectionBody::Table(Table {
            columns: vec![
                Column::text("Payment type", 2.0),
                Column::number("Payments", 1.0),
                Column::number("Amount", 1.6),
                Column::number("Share", 1.0),
            ],
            rows: PaymentType::ALL
                .iter()
                .map(|kind| {
                    let (count, sum) = rows
                        .iter()
                        .filter(|row| row.payment_type == *kind)
                        .fold((0_usize, Decimal::ZERO), |(count, sum), row| {
                            (count + 1, sum + row.amount)
                        });
                    vec![
                        kind.label().to_owned(),
                        count.to_string(),
                        header.money(sum),
                        share(sum, total),
                    ]
                })
                .collect(),
            total: None,
            empty_text: String::new(),
        }),
    });

    document
}

/// Mean payment rounded to kopecks, zero for an empty period
fn average(total: Decimal, count: usize) -> Decimal {
    total
        .checked_div(Decimal::from(count))
        .map_or(Decimal::ZERO, |mean| {
            mean.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
        })
}

/// Percentage of `part` in `whole` with one decimal
fn share(part: Decimal, whole: Decimal) -> String {
    let percent = (part * Decimal::ONE_HUNDRED)
        .checked_div(whole)
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{percent:.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::tests::{at, club};

    fn row(day: u32, client: &str, amount: i64, payment_type: PaymentType) -> RevenueRow {
        RevenueRow {
            payment_date: at(2025, 3, day, 12, 0),
            client_name: client.into(),
            amount: Decimal::from(amount),
            payment_type,
        }
    }

    #[test]
    fn test_totals_and_breakdown() {
        let club = club();
        let header = Header {
            club: &club,
            now: at(2025, 4, 1, 8, 0),
        };
        let rows = vec![
            row(1, "Petrov Pavel", 1500, PaymentType::Cash),
            row(2, "Sidorova Anna", 3000, PaymentType::Card),
            row(3, "Petrov Pavel", 1500, PaymentType::Card),
        ];
        let document = build(&header, &Period::default(), &rows);

        assert_eq!(document.title, "Revenue Report");
        assert_eq!(document.period, "All time");
        assert_eq!(document.stats[0].value, "6,000.00 RUB");
        assert_eq!(document.stats[1].value, "3");
        assert_eq!(document.stats[2].value, "2,000.00 RUB");

        let SectionBody::Table(payments) = &document.sections[0].body else {
            panic!("payments section should be a table");
        };
        assert_eq!(payments.rows.len(), 3);
        assert_eq!(payments.rows[0][0], "01.03.2025");
        assert_eq!(payments.rows[1][3], "Card");
        assert_eq!(payments.total.as_ref().unwrap()[2], "6,000.00 RUB");

        let SectionBody::Table(breakdown) = &document.sections[1].body else {
            panic!("breakdown section should be a table");
        };
        assert_eq!(breakdown.rows[0], vec!["Cash", "1", "1,500.00 RUB", "25.0%"]);
        assert_eq!(breakdown.rows[1], vec!["Card", "2", "4,500.00 RUB", "75.0%"]);
        assert_eq!(breakdown.rows[2][1], "0");
    }

    #[test]
    fn test_empty_period() {
        let club = club();
        let header = Header {
            club: &club,
            now: at(2025, 4, 1, 8, 0),
        };
        let document = build(&header, &Period::default(), &[]);
        assert_eq!(document.stats[0].value, "0.00 RUB");
        assert_eq!(document.stats[2].value, "0.00 RUB");
    }

    #[test]
    fn test_share_rounding() {
        assert_eq!(share(Decimal::from(1), Decimal::from(3)), "33.3%");
        assert_eq!(share(Decimal::from(2), Decimal::from(3)), "66.7%");
        assert_eq!(share(Decimal::ZERO, Decimal::ZERO), "0.0%");
    }

    #[test]
    fn test_average_rounds_half_away_from_zero() {
        assert_eq!(average(Decimal::new(1001, 2), 2).to_string(), "5.01");
        assert_eq!(average(Decimal::from(30), 3), Decimal::from(10));
        assert_eq!(average(Decimal::from(30), 0), Decimal::ZERO);
    }
}
