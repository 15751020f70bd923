//! "Nearby Places" console table

use crossterm::{
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use hangai_core::Place;
use std::io::{self, Write};

pub const TITLE: &str = "Nearby Places";
pub const EMPTY_MESSAGE: &str = "No places found to show.";

const HEADERS: [&str; 3] = ["Name", "Distance (km)", "Type/Tags"];

/// One formatted table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub name: String,
    pub distance: String,
    pub tags: String,
    /// Row is (one of) the closest places
    pub closest: bool,
}

/// Format the first `limit` places as table rows
pub fn rows(places: &[Place], limit: usize) -> Vec<Row> {
    let Some(first) = places.first() else {
        return Vec::new();
    };
    let closest = first.distance_km;

    places
        .iter()
        .take(limit)
        .map(|place| {
            let values = place.tag_values();
            Row {
                name: place.name.clone(),
                distance: format!("{:.2}", place.distance_km),
                tags: if values.is_empty() {
                    "-".to_string()
                } else {
                    values.join(", ")
                },
                closest: place.distance_km == closest,
            }
        })
        .collect()
}

fn widths(rows: &[Row]) -> [usize; 3] {
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in rows {
        widths[0] = widths[0].max(row.name.chars().count());
        widths[1] = widths[1].max(row.distance.chars().count());
        widths[2] = widths[2].max(row.tags.chars().count());
    }
    widths
}

fn separator(widths: &[usize; 3]) -> String {
    let parts: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    format!("+{}+", parts.join("+"))
}

fn pad(text: &str, width: usize) -> String {
    format!("{text}{}", " ".repeat(width.saturating_sub(text.chars().count())))
}

fn pad_left(text: &str, width: usize) -> String {
    format!("{}{text}", " ".repeat(width.saturating_sub(text.chars().count())))
}

fn format_row(row: &Row, widths: &[usize; 3]) -> String {
    format!(
        "| {} | {} | {} |",
        pad(&row.name, widths[0]),
        pad_left(&row.distance, widths[1]),
        pad(&row.tags, widths[2])
    )
}

/// Render the table without colours
pub fn render_plain(places: &[Place], limit: usize) -> String {
    let rows = rows(places, limit);
    if rows.is_empty() {
        return format!("{EMPTY_MESSAGE}\n");
    }

    let widths = widths(&rows);
    let line = separator(&widths);
    let mut out = format!("{TITLE}\n{line}\n");
    out.push_str(&format!(
        "| {} | {} | {} |\n",
        pad(HEADERS[0], widths[0]),
        pad_left(HEADERS[1], widths[1]),
        pad(HEADERS[2], widths[2])
    ));
    out.push_str(&line);
    out.push('\n');
    for row in &rows {
        out.push_str(&format_row(row, &widths));
        out.push('\n');
    }
    out.push_str(&line);
    out.push('\n');
    out
}

/// Print the table with the closest rows in bold green
pub fn print_table<W: Write>(out: &mut W, places: &[Place], limit: usize) -> io::Result<()> {
    let rows = rows(places, limit);
    if rows.is_empty() {
        queue!(
            out,
            SetForegroundColor(Color::Yellow),
            Print(format!("{EMPTY_MESSAGE}\n")),
            ResetColor
        )?;
        return out.flush();
    }

    let widths = widths(&rows);
    let line = separator(&widths);
    queue!(
        out,
        SetAttribute(Attribute::Italic),
        Print(format!("{TITLE}\n")),
        SetAttribute(Attribute::Reset),
        Print(format!("{line}\n")),
        SetForegroundColor(Color::Cyan),
        Print(format!("| {} ", pad(HEADERS[0], widths[0]))),
        SetForegroundColor(Color::Magenta),
        Print(format!("| {} ", pad_left(HEADERS[1], widths[1]))),
        SetForegroundColor(Color::Yellow),
        Print(format!("| {} |\n", pad(HEADERS[2], widths[2]))),
        ResetColor,
        Print(format!("{line}\n"))
    )?;

    for row in &rows {
        if row.closest {
            queue!(
                out,
                SetForegroundColor(Color::Green),
                SetAttribute(Attribute::Bold),
                Print(format_row(row, &widths)),
                SetAttribute(Attribute::Reset),
                ResetColor,
                Print("\n")
            )?;
        } else {
            queue!(out, Print(format_row(row, &widths)), Print("\n"))?;
        }
    }
    queue!(out, Print(format!("{line}\n")))?;
    out.flush()
}
