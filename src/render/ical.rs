use crate::core::calendar::CalendarItem;
use crate::core::timestamp::TsPoint;
use crate::error::Result;

/// Serialize calendar entries as an RFC 5545 VCALENDAR. Entries whose start
/// has no time and which have no end become all-day events; everything else
/// is written as a floating local datetime.
pub fn to_ics(entries: &[CalendarItem]) -> Result<String> {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//starling-actions//EN".to_string(),
    ];

    for entry in entries {
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}", escape_text(&entry.id)));
        lines.push(format!("SUMMARY:{}", escape_text(&entry.title)));

        if entry.start.time.is_none() && entry.end.is_none() {
            lines.push(format!(
                "DTSTART;VALUE=DATE:{}",
                compact_date(&entry.start, &entry.id)?
            ));
        } else {
            lines.push(format!(
                "DTSTART:{}",
                compact_datetime(&entry.start, &entry.id)?
            ));
            if let Some(end) = &entry.end {
                lines.push(format!("DTEND:{}", compact_datetime(end, &entry.id)?));
            }
        }

        let mut description = entry.body.clone();
        if !entry.people.is_empty() {
            if !description.is_empty() {
                description.push_str("\n\n");
            }
            description.push_str("People:");
            for person in &entry.people {
                description.push_str(&format!("\n- {}", person.name));
            }
        }
        if !description.is_empty() {
            lines.push(format!("DESCRIPTION:{}", escape_text(&description)));
        }
        if let Some(location) = &entry.location {
            lines.push(format!("LOCATION:{}", escape_text(location)));
        }
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());

    let mut out = String::new();
    for line in lines {
        out.push_str(&fold_line(&line));
        out.push_str("\r\n");
    }
    Ok(out)
}

/// Escape TEXT values: backslash, comma, semicolon, and literal newlines.
fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Fold a content line at 75 octets, continuing with CRLF plus a space.
/// Splits only at character boundaries, so a multibyte character never
/// straddles a fold.
fn fold_line(line: &str) -> String {
    if line.len() <= 75 {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + line.len() / 70);
    let mut budget = 75;
    for c in line.chars() {
        let width = c.len_utf8();
        if width > budget {
            out.push_str("\r\n ");
            // Continuation lines lose one octet to the leading space.
            budget = 74;
        }
        out.push(c);
        budget -= width;
    }
    out
}

fn compact_date(point: &TsPoint, id: &str) -> Result<String> {
    Ok(point.to_date(id)?.format("%Y%m%d").to_string())
}

fn compact_datetime(point: &TsPoint, id: &str) -> Result<String> {
    Ok(point.to_datetime(id)?.format("%Y%m%dT%H%M%S").to_string())
}
