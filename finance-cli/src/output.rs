use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Formats an amount in whole won with thousands separators.
pub fn format_won(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Formats a percentage to two decimal places, or "n/a" when undefined.
pub fn format_percent(value: Option<Decimal>) -> String {
    value
        .map(|v| format!("{:.2}%", v.round_dp(2)))
        .unwrap_or_else(|| "n/a".to_string())
}

/// Formats a fractional rate (0.15) as a percentage (15%).
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

enum Row {
    Value(String, String),
    Section(String),
}

/// A titled list of label/value rows printed with aligned columns.
pub struct Report {
    title: String,
    rows: Vec<Row>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    pub fn won(
        self,
        label: &str,
        amount: Decimal,
    ) -> Self {
        self.text(label, format_won(amount))
    }

    pub fn percent(
        self,
        label: &str,
        value: Option<Decimal>,
    ) -> Self {
        self.text(label, format_percent(value))
    }

    pub fn text(
        mut self,
        label: &str,
        value: impl fmt::Display,
    ) -> Self {
        self.rows.push(Row::Value(label.to_string(), value.to_string()));
        self
    }

    pub fn section(
        mut self,
        title: &str,
    ) -> Self {
        self.rows.push(Row::Section(title.to_string()));
        self
    }
}

impl fmt::Display for Report {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let label_width = self
            .rows
            .iter()
            .filter_map(|row| match row {
                Row::Value(label, _) => Some(label.chars().count()),
                Row::Section(_) => None,
            })
            .max()
            .unwrap_or(0);
        let value_width = self
            .rows
            .iter()
            .filter_map(|row| match row {
                Row::Value(_, value) => Some(value.chars().count()),
                Row::Section(_) => None,
            })
            .max()
            .unwrap_or(0);

        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count()))?;
        for row in &self.rows {
            match row {
                Row::Value(label, value) => {
                    writeln!(f, "  {label:<label_width$}  {value:>value_width$}")?;
                }
                Row::Section(title) => {
                    writeln!(f)?;
                    writeln!(f, "{title}")?;
                }
            }
        }
        Ok(())
    }
}

/// Prints `value` as pretty JSON when `json` is set, else the text report.
pub fn emit<T, F>(
    json: bool,
    value: &T,
    report: F,
) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", report(value));
    }
    Ok(())
}
