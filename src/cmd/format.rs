/*!
Human output formatting for `rundeck-cli`.

  - StyleOptions::detect() / StyleOptions::plain()
  - color(role, text, &StyleOptions)
  - box_header(title, subtitle, &StyleOptions)
  - table(headers, rows, TableOpts, &StyleOptions)
  - render_results(&CommandResults, &StyleOptions)
  - pascal_to_space(header)

Everything here returns strings; printing is left to the command modules.
JSON output never goes through these helpers.

Color is on unless `NO_COLOR` is set. Width comes from `COLUMNS`
(clamped to 40..=220), defaulting to 100.
*/

use std::borrow::Cow;

use serde_json::Value;

use crate::handlers::CommandResults;

const EMPTY_TABLE: &str = "No entries.";

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub term_width: usize,
    pub padding: usize,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    pub fn detect() -> Self {
        let term_width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);

        StyleOptions {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            term_width,
            padding: 1,
        }
    }

    /// No ANSI codes, fixed width.
    #[cfg(test)]
    pub fn plain() -> Self {
        StyleOptions {
            use_color: false,
            term_width: 100,
            padding: 1,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Color                                                                      */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",
        Role::Secondary => "38;5;250",
        Role::Accent => "38;5;213",
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

/* -------------------------------------------------------------------------- */
/* Box Header                                                                 */
/* -------------------------------------------------------------------------- */

pub fn box_header(
    title: impl AsRef<str>,
    subtitle: Option<impl AsRef<str>>,
    style: &StyleOptions,
) -> String {
    let (h, v, tl, tr, bl, br) = ('─', '│', '┌', '┐', '└', '┘');

    let mut inner = color(Role::Primary, title.as_ref(), style);
    if let Some(sub) = subtitle {
        inner.push_str("  ");
        inner.push_str(&color(Role::Secondary, sub.as_ref(), style));
    }

    let max_inner = style.term_width.clamp(20, 200) - 2;
    let pad = style.padding;
    let inner_width = (display_width(&inner) + pad * 2).min(max_inner);
    let text_width = inner_width.saturating_sub(pad * 2).max(1);

    let body = if display_width(&inner) > text_width {
        wrap_text(&inner, text_width)
    } else {
        vec![inner]
    };

    let rule = h.to_string().repeat(inner_width);
    let mut lines = vec![format!("{tl}{rule}{tr}")];
    for line in body {
        let fill = text_width.saturating_sub(display_width(&line));
        lines.push(format!(
            "{v}{pad}{line}{fill}{pad}{v}",
            pad = " ".repeat(pad),
            fill = " ".repeat(fill),
        ));
    }
    lines.push(format!("{bl}{rule}{br}"));
    lines.join("\n")
}

/* -------------------------------------------------------------------------- */
/* Table                                                                      */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct TableOpts {
    /// 0 means the terminal width.
    pub max_width: usize,
    pub truncate: bool,
    pub header_sep: bool,
    pub min_col_width: usize,
}

impl Default for TableOpts {
    fn default() -> Self {
        Self {
            max_width: 0,
            truncate: true,
            header_sep: true,
            min_col_width: 4,
        }
    }
}

pub fn table(
    headers: &[&str],
    rows: &[Vec<String>],
    opts: TableOpts,
    style: &StyleOptions,
) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let limit = match opts.max_width {
        0 => style.term_width,
        w => w.min(style.term_width),
    };

    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(display_width(cell));
        }
    }
    shrink_to_fit(&mut widths, limit, opts.min_col_width);

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(color(
        Role::Accent,
        render_row(&widths, headers.iter().copied(), opts.truncate),
        style,
    ));
    if opts.header_sep {
        let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        lines.push(color(Role::Dim, sep.join("  "), style));
    }
    for row in rows {
        lines.push(render_row(
            &widths,
            row.iter().map(String::as_str),
            opts.truncate,
        ));
    }
    lines.join("\n")
}

fn render_row<'a>(
    widths: &[usize],
    mut cells: impl Iterator<Item = &'a str>,
    truncate: bool,
) -> String {
    widths
        .iter()
        .map(|&w| pad_or_truncate(cells.next().unwrap_or(""), w, truncate))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Take width from the widest columns until the row fits.
fn shrink_to_fit(widths: &mut [usize], limit: usize, min_col: usize) {
    let total = widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * 2;
    let Some(mut overflow) = total.checked_sub(limit).filter(|o| *o > 0) else {
        return;
    };
    let mut order: Vec<usize> = (0..widths.len()).collect();
    order.sort_by(|a, b| widths[*b].cmp(&widths[*a]));
    for idx in order {
        if overflow == 0 {
            break;
        }
        let spare = widths[idx].saturating_sub(min_col);
        let take = spare.min(overflow);
        widths[idx] -= take;
        overflow -= take;
    }
}

fn pad_or_truncate(s: &str, width: usize, truncate: bool) -> String {
    let len = display_width(s);
    if len <= width {
        return format!("{s}{}", " ".repeat(width - len));
    }
    if !truncate {
        return s.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }
    let plain = strip_ansi(s);
    let mut out: String = plain.chars().take(width - 1).collect();
    out.push('…');
    out
}

/* -------------------------------------------------------------------------- */
/* Command results                                                            */
/* -------------------------------------------------------------------------- */

/// Boxed title followed by either the message or a table of the records.
pub fn render_results(results: &CommandResults, style: &StyleOptions) -> String {
    let subtitle = results
        .outputs_prefix
        .as_deref()
        .map(|p| match results.outputs_key_field.as_deref() {
            Some(key) => format!("{p} (key: {key})"),
            None => p.to_string(),
        });
    let mut out = box_header(&results.title, subtitle, style);
    out.push('\n');

    if let Some(message) = &results.message {
        out.push_str(message);
        return out;
    }

    let records = results.records();
    let headers = results.headers();
    if records.is_empty() || headers.is_empty() {
        out.push_str(&color(Role::Dim, EMPTY_TABLE, style));
        return out;
    }

    let titles: Vec<String> = headers.iter().map(|h| pascal_to_space(h)).collect();
    let title_refs: Vec<&str> = titles.iter().map(String::as_str).collect();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            headers
                .iter()
                .map(|h| record.get(h).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();
    out.push_str(&table(&title_refs, &rows, TableOpts::default(), style));
    out
}

/// Strings verbatim, everything else as compact JSON.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Column title from a record key: `dateStarted` -> `Date Started`,
/// `job_id` -> `Job Id`.
pub fn pascal_to_space(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    for chunk in key.replace('_', " ").split_whitespace() {
        let mut word = String::new();
        for ch in chunk.chars() {
            let boundary = ch.is_uppercase()
                && word.chars().last().is_some_and(|p| !p.is_uppercase());
            if boundary {
                words.push(std::mem::take(&mut word));
            }
            word.push(ch);
        }
        if !word.is_empty() {
            words.push(word);
        }
    }
    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/* -------------------------------------------------------------------------- */
/* Text helpers                                                               */
/* -------------------------------------------------------------------------- */

pub fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![s.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in s.split_whitespace() {
        let needed = display_width(&current) + display_width(word) + 1;
        if !current.is_empty() && needed > max_width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Removes `ESC [ ... <letter>` sequences.
fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(ch);
    }
    Cow::Owned(out)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn box_header_contains_title_and_borders() {
        let b = box_header("Jobs List:", Some("Rundeck.Jobs"), &StyleOptions::plain());
        let lines: Vec<&str> = b.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with('┌'));
        assert!(lines[1].contains("Jobs List:  Rundeck.Jobs"));
        assert_eq!(lines[0].chars().count(), lines[1].chars().count());
    }

    #[test]
    fn table_aligns_columns() {
        let t = table(
            &["A", "B"],
            &[vec!["x".into(), "y".into()], vec!["longer".into(), "v".into()]],
            TableOpts::default(),
            &StyleOptions::plain(),
        );
        let lines: Vec<&str> = t.lines().collect();
        assert_eq!(lines[0], "A       B");
        assert_eq!(lines[1], "------  -");
        assert_eq!(lines[3], "longer  v");
    }

    #[test]
    fn table_truncates_wide_cells() {
        let style = StyleOptions {
            term_width: 40,
            ..StyleOptions::plain()
        };
        let t = table(&["K"], &[vec!["x".repeat(80)]], TableOpts::default(), &style);
        let last = t.lines().last().unwrap();
        assert_eq!(last.chars().count(), 40);
        assert!(last.ends_with('…'));
    }

    #[test]
    fn pascal_to_space_titles() {
        assert_eq!(pascal_to_space("dateStarted"), "Date Started");
        assert_eq!(pascal_to_space("job_id"), "Job Id");
        assert_eq!(pascal_to_space("id"), "Id");
        assert_eq!(pascal_to_space("serverUUID"), "Server UUID");
    }

    #[test]
    fn strip_ansi_removes_codes() {
        assert_eq!(strip_ansi("\x1b[31mRED\x1b[0m"), "RED");
    }

    #[test]
    fn render_results_table_uses_union_headers() {
        let r = CommandResults::new(
            "Job Execution Query:",
            "Rundeck.Query",
            "id",
            json!([{"id": 1, "status": "ok"}, {"id": 2, "user": "admin"}]),
        );
        let out = render_results(&r, &StyleOptions::plain());
        assert!(out.contains("Job Execution Query:"));
        assert!(out.contains("Id"));
        assert!(out.contains("Status"));
        assert!(out.contains("User"));
        assert!(out.contains("admin"));
    }

    #[test]
    fn render_results_message_and_empty() {
        let msg = CommandResults::message("Test:", "ok");
        assert!(render_results(&msg, &StyleOptions::plain()).ends_with("\nok"));

        let empty = CommandResults::new("Jobs List:", "Rundeck.Jobs", "Id", json!([]));
        assert!(render_results(&empty, &StyleOptions::plain()).ends_with(EMPTY_TABLE));
    }

    #[test]
    fn nested_values_render_as_json() {
        assert_eq!(cell_text(&json!({"unixtime": 2})), r#"{"unixtime":2}"#);
        assert_eq!(cell_text(&json!("plain")), "plain");
    }
}
