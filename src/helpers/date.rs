//! Date helper functions

use chrono::{Datelike, NaiveDate};

const PT_MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Format a date using Moment.js-compatible format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "YYYY-MM-DD") // -> "2024-01-15"
/// ```
pub fn format_date(date: &NaiveDate, format: &str) -> String {
    let chrono_format = moment_to_chrono_format(format);
    date.format(&chrono_format).to_string()
}

/// Long, locale-aware date with a two-digit day
///
/// # Examples
/// ```ignore
/// long_date(&date, "pt-BR") // -> "25 de março de 2021"
/// long_date(&date, "en")    // -> "March 25, 2021"
/// ```
pub fn long_date(date: &NaiveDate, language: &str) -> String {
    let language = language.to_ascii_lowercase();
    if language == "pt" || language.starts_with("pt-") || language.starts_with("pt_") {
        format!(
            "{:02} de {} de {}",
            date.day(),
            PT_MONTHS[date.month0() as usize],
            date.year()
        )
    } else {
        date.format("%B %d, %Y").to_string()
    }
}

/// Date as shown next to a post: the configured format if any, otherwise
/// the long form for the site language. Unpublished posts show nothing.
pub fn display_date(date: Option<&NaiveDate>, format: Option<&str>, language: &str) -> String {
    match (date, format) {
        (None, _) => String::new(),
        (Some(date), Some(format)) => format_date(date, format),
        (Some(date), None) => long_date(date, language),
    }
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("dddd", "%A"),
        ("ddd", "%a"),
    ];

    let mut result = format.to_string();
    for (from, to) in replacements {
        result = result.replace(from, to);
    }
    result
}
