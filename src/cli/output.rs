// Output formatting utilities

use crate::models::{Board, Deal, FieldGroup, Pipeline, Template, TemplateCategory};
use crate::services::boards::BoardDetail;
use crate::services::categories::CategoryPage;
use crate::services::pipelines::PipelineDetail;
use crate::services::templates::{Paging, TemplatePage};
use chrono::Local;
use std::io::IsTerminal;

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";
const ANSI_FG_BRIGHT_BLACK: &str = "\x1b[90m";

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate, with fallback to the COLUMNS environment
/// variable and a sensible default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

/// Apply bold formatting if in TTY mode
fn bold_if_tty(text: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

fn dim_if_tty(text: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", ANSI_FG_BRIGHT_BLACK, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Format timestamp for display
pub fn format_timestamp(ts: i64) -> String {
    use chrono::TimeZone;
    match Local.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ts.to_string(),
    }
}

/// Format date for display (date only, no time)
pub fn format_date(ts: i64) -> String {
    use chrono::TimeZone;
    match Local.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => ts.to_string(),
    }
}

/// Format duration for display
pub fn format_duration(secs: i64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Shorten to `width` characters, marking the cut with ".."
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(2)).collect();
    format!("{}..", kept)
}

fn opt(value: Option<&str>) -> &str {
    value.unwrap_or("")
}

/// Render rows under a header. The last column absorbs whatever width the
/// terminal has left.
fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let tty = is_tty();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count().min(60));
        }
    }

    if let Some(last) = widths.len().checked_sub(1) {
        let fixed: usize = widths[..last].iter().sum::<usize>() + last;
        let available = get_terminal_width().saturating_sub(fixed).max(10);
        widths[last] = widths[last].min(available);
    }

    let line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", truncate(cell, widths[i]), width = widths[i]))
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end()
            .to_string()
    };

    let mut output = String::new();
    let header = line(headers.iter().map(|h| h.to_string()).collect());
    output.push_str(&bold_if_tty(&header, tty));
    output.push('\n');
    let total_width = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
    output.push_str(&"-".repeat(total_width));
    output.push('\n');
    for row in rows {
        output.push_str(&line(row.clone()));
        output.push('\n');
    }
    output
}

pub fn format_board_list(boards: &[Board]) -> String {
    if boards.is_empty() {
        return "No boards found.".to_string();
    }
    let rows: Vec<Vec<String>> = boards
        .iter()
        .map(|b| vec![b.id.clone(), format_date(b.created_ts), b.name.clone()])
        .collect();
    format_table(&["ID", "Created", "Name"], &rows)
}

pub fn format_pipeline_list(pipelines: &[Pipeline]) -> String {
    if pipelines.is_empty() {
        return "No pipelines found.".to_string();
    }
    let rows: Vec<Vec<String>> = pipelines
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.order.to_string(),
                p.status.as_str().to_string(),
                p.visibility.as_str().to_string(),
                p.name.clone(),
            ]
        })
        .collect();
    format_table(&["ID", "Order", "Status", "Visibility", "Name"], &rows)
}

fn format_stage_rows(detail: &PipelineDetail) -> String {
    if detail.stages.is_empty() {
        return "  (no stages)\n".to_string();
    }
    let mut output = String::new();
    for stage in &detail.stages {
        output.push_str(&format!(
            "  {:>3}. {} [{}] {}\n",
            stage.order,
            stage.name,
            opt(stage.probability.as_deref()),
            dim_if_tty(&stage.id, is_tty())
        ));
    }
    output
}

pub fn format_pipeline_detail(detail: &PipelineDetail) -> String {
    let tty = is_tty();
    let p = &detail.pipeline;
    let mut output = String::new();

    output.push_str(&format!("{}\n", bold_if_tty(&format!("Pipeline: {}", p.name), tty)));
    output.push_str(&format!("  ID:          {}\n", p.id));
    output.push_str(&format!("  Board:       {}\n", p.board_id));
    output.push_str(&format!("  Status:      {}\n", p.status.as_str()));
    output.push_str(&format!("  Visibility:  {}\n", p.visibility.as_str()));
    output.push_str(&format!("  Order:       {}\n", p.order));
    if let Some(ref color) = p.bg_color {
        output.push_str(&format!("  Color:       {}\n", color));
    }
    if p.start_date.is_some() || p.end_date.is_some() {
        output.push_str(&format!(
            "  Period:      {} .. {}\n",
            p.start_date.map(format_date).unwrap_or_default(),
            p.end_date.map(format_date).unwrap_or_default()
        ));
    }
    if let Some(ref metric) = p.metric {
        output.push_str(&format!("  Metric:      {}\n", metric));
    }
    if let (Some(config), Some(size)) = (&p.number_config, &p.number_size) {
        output.push_str(&format!("  Numbering:   {} ({} digits)\n", config, size));
    }
    output.push_str(&format!("  Modified:    {}\n", format_timestamp(p.modified_ts)));
    output.push_str(&format!("Stages ({}):\n", detail.stages.len()));
    output.push_str(&format_stage_rows(detail));
    output
}

pub fn format_board_detail(detail: &BoardDetail) -> String {
    let tty = is_tty();
    let mut output = String::new();
    output.push_str(&format!("{}\n", bold_if_tty(&format!("Board: {}", detail.board.name), tty)));
    output.push_str(&format!("  ID:       {}\n", detail.board.id));
    output.push_str(&format!("  Created:  {}\n", format_timestamp(detail.board.created_ts)));
    if detail.pipelines.is_empty() {
        output.push_str("No pipelines.\n");
        return output;
    }
    for pipeline in &detail.pipelines {
        output.push_str(&format!(
            "\n{} ({}, {})\n",
            bold_if_tty(&pipeline.pipeline.name, tty),
            pipeline.pipeline.status.as_str(),
            dim_if_tty(&pipeline.pipeline.id, tty)
        ));
        output.push_str(&format_stage_rows(pipeline));
    }
    output
}

pub fn format_template_page(page: &TemplatePage, paging: Paging) -> String {
    if page.list.is_empty() {
        return "No templates found.".to_string();
    }
    let rows: Vec<Vec<String>> = page
        .list
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                opt(t.content_type.as_deref()).to_string(),
                t.status.as_str().to_string(),
                format_date(t.created_ts),
                t.name.clone(),
            ]
        })
        .collect();
    let mut output = format_table(&["ID", "Type", "Status", "Created", "Name"], &rows);

    let per_page = paging.per_page.max(1);
    let pages = (page.total_count + per_page - 1) / per_page;
    output.push_str(&format!(
        "\nPage {} of {} ({} template(s))",
        paging.page,
        pages.max(1),
        page.total_count
    ));
    if page.page_info.has_next_page {
        output.push_str(&format!(", next: --page {}", paging.page + 1));
    }
    output
}

pub fn format_template_detail(template: &Template) -> String {
    let tty = is_tty();
    let mut output = String::new();
    output.push_str(&format!("{}\n", bold_if_tty(&format!("Template: {}", template.name), tty)));
    output.push_str(&format!("  ID:           {}\n", template.id));
    output.push_str(&format!("  Content type: {}\n", opt(template.content_type.as_deref())));
    output.push_str(&format!("  Plugin:       {}\n", opt(template.plugin_type.as_deref())));
    output.push_str(&format!("  Status:       {}\n", template.status.as_str()));
    if let Some(ref description) = template.description {
        output.push_str(&format!("  Description:  {}\n", description));
    }
    if let Some(ref category) = template.category {
        output.push_str(&format!("  Category:     {}\n", category));
    }
    if let Some(ref user) = template.created_by {
        output.push_str(&format!("  Created by:   {}\n", user));
    }
    output.push_str(&format!("  Created:      {}\n", format_timestamp(template.created_ts)));
    output.push_str(&format!("  Modified:     {}\n", format_timestamp(template.modified_ts)));
    output.push_str("Content:\n");
    let content = serde_json::from_str::<serde_json::Value>(&template.content)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| template.content.clone());
    output.push_str(&content);
    output.push('\n');
    output
}

pub fn format_category_list(page: &CategoryPage) -> String {
    if page.list.is_empty() {
        return "No categories found.".to_string();
    }
    let rows: Vec<Vec<String>> = page
        .list
        .iter()
        .map(|c: &TemplateCategory| {
            vec![
                c.id.clone(),
                c.code.clone(),
                c.content_type.clone(),
                opt(c.parent_id.as_deref()).to_string(),
                c.name.clone(),
            ]
        })
        .collect();
    let mut output = format_table(&["ID", "Code", "Type", "Parent", "Name"], &rows);
    output.push_str(&format!("\n{} categor{}", page.total_count, if page.total_count == 1 { "y" } else { "ies" }));
    output
}

pub fn format_field_group_list(groups: &[FieldGroup]) -> String {
    if groups.is_empty() {
        return "No field groups found.".to_string();
    }
    let rows: Vec<Vec<String>> = groups
        .iter()
        .map(|g| {
            vec![
                g.id.clone(),
                g.board_ids.len().to_string(),
                g.pipeline_ids.len().to_string(),
                g.name.clone(),
            ]
        })
        .collect();
    format_table(&["ID", "Boards", "Pipelines", "Name"], &rows)
}

pub fn format_deal(deal: &Deal) -> String {
    let mut output = String::new();
    output.push_str(&format!("Deal: {}\n", deal.name));
    output.push_str(&format!("  ID:     {}\n", deal.id));
    output.push_str(&format!("  Stage:  {}\n", deal.stage_id));
    match deal.time_track {
        Some(ref track) => {
            output.push_str(&format!(
                "  Time:   {} ({})\n",
                format_duration(track.time_spent),
                track.status.as_str()
            ));
            if let Some(start) = track.start_date {
                output.push_str(&format!("  Since:  {}\n", format_timestamp(start)));
            }
        }
        None => output.push_str("  Time:   not tracked\n"),
    }
    output
}
