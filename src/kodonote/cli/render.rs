//! # Rendering
//!
//! Turns notebooks and command messages into terminal text through the
//! minijinja templates in `templates/`, styled by [`KODO_THEME`].
//!
//! Layout calculations (width, truncation, padding, grid columns) stay in Rust
//! because they need Unicode-aware widths. Templates only decide which style
//! each piece gets.

use super::styles::{names, KODO_THEME};
use super::templates::{LIST_TEMPLATE, MESSAGES_TEMPLATE, NOTEBOOK_TEMPLATE};
use chrono::{DateTime, Utc};
use kodonote::api::{CmdMessage, MessageLevel};
use kodonote::display::Layout;
use kodonote::model::{ContentBlock, Notebook, SectionType};
use minijinja::{Environment, Value};
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

pub const LINE_WIDTH: usize = 100;
pub const TITLE_WIDTH: usize = 40;
/// Spaces between grid columns.
pub const GRID_GAP: usize = 3;
const BODY_INDENT: &str = "    ";
const EMPTY_BLOCK: &str = "(empty)";

#[derive(Serialize)]
struct NotebookLineData {
    index: String,
    title: String,
    padding: String,
    summary: String,
    edited: String,
}

#[derive(Serialize)]
struct ListData {
    notebooks: Vec<NotebookLineData>,
}

/// One styled run of text followed by plain padding.
#[derive(Serialize, Debug, Clone)]
struct Cell {
    text: String,
    padding: String,
    style: &'static str,
}

#[derive(Serialize, Debug, Default)]
struct Line {
    cells: Vec<Cell>,
}

#[derive(Serialize)]
struct NotebookData {
    title: String,
    edited: String,
    empty: bool,
    lines: Vec<Line>,
}

#[derive(Serialize)]
struct MessageData {
    content: String,
    style: String,
}

#[derive(Serialize)]
struct MessagesData {
    messages: Vec<MessageData>,
}

fn environment(use_color: bool) -> Environment<'static> {
    let mut env = Environment::new();
    env.add_filter("style", move |value: Value, name: String| -> String {
        KODO_THEME.apply(&name, &value.to_string(), use_color)
    });
    env
}

fn render<T: Serialize>(template: &str, data: &T, use_color: bool) -> Result<String, minijinja::Error> {
    environment(use_color).render_str(template, data)
}

/// Renders the notebook catalog, one line per notebook.
pub fn render_notebook_list(notebooks: &[Notebook], use_color: bool) -> String {
    let rows = notebooks
        .iter()
        .enumerate()
        .map(|(i, notebook)| {
            let title = truncate_to_width(notebook.title(), TITLE_WIDTH);
            let padding = " ".repeat(TITLE_WIDTH.saturating_sub(title.width()) + 2);
            let count = notebook.blocks.len();
            NotebookLineData {
                index: format!("{:>3}. ", i + 1),
                title,
                padding,
                summary: format!("{} {}", count, if count == 1 { "block" } else { "blocks" }),
                edited: format_last_edited(notebook.last_edited()),
            }
        })
        .collect();

    render(LIST_TEMPLATE, &ListData { notebooks: rows }, use_color)
        .unwrap_or_else(|e| format!("Render error: {}\n", e))
}

/// Renders one notebook in the given layout. `columns` only matters for the
/// grid layout.
pub fn render_notebook(notebook: &Notebook, layout: Layout, columns: usize, use_color: bool) -> String {
    let blocks = notebook.blocks.as_slice();
    let lines = match layout {
        Layout::Row => row_lines(blocks),
        Layout::Grid => grid_lines(blocks, columns.max(1)),
    };

    let data = NotebookData {
        title: notebook.title().to_string(),
        edited: format_last_edited(notebook.last_edited()),
        empty: blocks.is_empty(),
        lines,
    };

    render(NOTEBOOK_TEMPLATE, &data, use_color).unwrap_or_else(|e| format!("Render error: {}\n", e))
}

/// Renders command messages with their level styles.
pub fn render_messages(messages: &[CmdMessage], use_color: bool) -> String {
    if messages.is_empty() {
        return String::new();
    }

    let data = MessagesData {
        messages: messages
            .iter()
            .map(|msg| {
                let style = match msg.level {
                    MessageLevel::Info => names::INFO,
                    MessageLevel::Success => names::SUCCESS,
                    MessageLevel::Warning => names::WARNING,
                    MessageLevel::Error => names::ERROR,
                };
                MessageData {
                    content: msg.content.clone(),
                    style: style.to_string(),
                }
            })
            .collect(),
    };

    render(MESSAGES_TEMPLATE, &data, use_color).unwrap_or_else(|_| {
        messages
            .iter()
            .map(|m| format!("{}\n", m.content))
            .collect()
    })
}

pub fn print_messages(messages: &[CmdMessage], use_color: bool) {
    let output = render_messages(messages, use_color);
    if !output.is_empty() {
        print!("{}", output);
    }
}

fn block_label(index: usize, block: &ContentBlock) -> Cell {
    let style = match block.section_type() {
        SectionType::Code => names::BLOCK_CODE,
        SectionType::Text => names::BLOCK_TEXT,
    };
    Cell {
        text: format!("[{}] {}", index + 1, block.section_type()),
        padding: String::new(),
        style,
    }
}

/// Body lines of a block with their style; an empty value shows a faint marker.
fn block_body(block: &ContentBlock) -> Vec<(String, &'static str)> {
    if block.value.is_empty() {
        return vec![(EMPTY_BLOCK.to_string(), names::FAINT)];
    }
    block
        .value
        .lines()
        .map(|line| (line.to_string(), names::REGULAR))
        .collect()
}

fn row_lines(blocks: &[ContentBlock]) -> Vec<Line> {
    let mut lines = Vec::new();
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        lines.push(Line {
            cells: vec![block_label(i, block)],
        });
        for (text, style) in block_body(block) {
            lines.push(Line {
                cells: vec![Cell {
                    text: format!("{}{}", BODY_INDENT, text),
                    padding: String::new(),
                    style,
                }],
            });
        }
    }
    lines
}

fn grid_lines(blocks: &[ContentBlock], columns: usize) -> Vec<Line> {
    let col_width = LINE_WIDTH.saturating_sub(GRID_GAP * (columns - 1)) / columns;
    let mut lines = Vec::new();

    for (chunk_no, chunk) in blocks.chunks(columns).enumerate() {
        if chunk_no > 0 {
            lines.push(Line::default());
        }
        let first = chunk_no * columns;

        let labels = chunk
            .iter()
            .enumerate()
            .map(|(j, block)| {
                let label = block_label(first + j, block);
                (truncate_to_width(&label.text, col_width), label.style)
            })
            .collect::<Vec<_>>();
        lines.push(grid_row(&labels, col_width));

        let bodies: Vec<Vec<(String, &'static str)>> = chunk
            .iter()
            .map(|block| {
                block_body(block)
                    .into_iter()
                    .map(|(text, style)| (truncate_to_width(&text, col_width), style))
                    .collect()
            })
            .collect();
        let height = bodies.iter().map(Vec::len).max().unwrap_or(0);

        for row in 0..height {
            let cells = bodies
                .iter()
                .map(|body| {
                    body.get(row)
                        .cloned()
                        .unwrap_or_else(|| (String::new(), names::REGULAR))
                })
                .collect::<Vec<_>>();
            lines.push(grid_row(&cells, col_width));
        }
    }
    lines
}

/// Lays cells side by side; every column but the last is padded to the
/// column width plus the gap.
fn grid_row(cells: &[(String, &'static str)], col_width: usize) -> Line {
    let last = cells.len().saturating_sub(1);
    Line {
        cells: cells
            .iter()
            .enumerate()
            .map(|(j, (text, style))| Cell {
                padding: if j == last {
                    String::new()
                } else {
                    " ".repeat(col_width.saturating_sub(text.width()) + GRID_GAP)
                },
                text: text.clone(),
                style: *style,
            })
            .collect(),
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

/// `lastEdited` is free-form; RFC 3339 values are shown relative to now.
fn format_last_edited(marker: &str) -> String {
    match DateTime::parse_from_rfc3339(marker) {
        Ok(at) => {
            let elapsed = Utc::now().signed_duration_since(at.with_timezone(&Utc));
            timeago::Formatter::new().convert(elapsed.to_std().unwrap_or_default())
        }
        Err(_) => marker.to_string(),
    }
}
