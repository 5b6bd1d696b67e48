//! Plain-text rendering of tracker events and result views.

use datadesk_core::{
    FoundItem, ProgressSnapshot, QualityTier, RenderRows, ResultsView, TableBody, TableView,
    PREVIEW_ROW_LIMIT,
};

const BAR_WIDTH: usize = 20;
const MAX_CELL_WIDTH: usize = 32;

pub fn progress_line(snapshot: &ProgressSnapshot) -> String {
    let filled = usize::from(snapshot.progress.min(100)) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%  {}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        snapshot.progress,
        snapshot.message
    )
}

pub fn found_items_lines(items: &[FoundItem]) -> Vec<String> {
    let mut lines = vec![format!("Found {} PDF(s):", items.len())];
    lines.extend(items.iter().map(|item| match &item.title {
        Some(title) => format!("  - {title} <{}>", item.url),
        None => format!("  - {}", item.url),
    }));
    lines
}

pub fn results_lines(view: &ResultsView) -> Vec<String> {
    match view {
        ResultsView::NoTables { placeholder } => vec![placeholder.to_string()],
        ResultsView::Tables {
            headline,
            duration_sentence,
            tables,
        } => {
            let mut lines = vec![headline.clone()];
            lines.extend(duration_sentence.iter().cloned());
            for table in tables {
                lines.push(String::new());
                lines.extend(table_lines(table));
            }
            lines
        }
    }
}

pub fn table_lines(table: &TableView) -> Vec<String> {
    let quality = match &table.quality_label {
        Some(label) => format!("{label} ({})", tier_name(table.quality)),
        None => tier_name(table.quality).to_string(),
    };
    let mut meta = format!(
        "{} | quality {} | {}",
        table.category, quality, table.dimensions
    );
    if let Some(source) = &table.source {
        meta.push_str(&format!(" | from {source}"));
    }

    let mut lines = vec![format!("== {} ==", table.title), meta];
    match &table.body {
        TableBody::Rows(rows) => lines.extend(grid_lines(rows)),
        TableBody::NoData { placeholder } => lines.push(placeholder.to_string()),
    }
    lines
}

fn grid_lines(rows: &RenderRows) -> Vec<String> {
    let widths: Vec<usize> = rows
        .header_row
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.body_rows
                .iter()
                .filter_map(|row| row.get(index))
                .chain(std::iter::once(header))
                .map(|cell| cell.chars().count().min(MAX_CELL_WIDTH))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |cells: &[String]| -> String {
        widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let cell = cells.get(index).map(String::as_str).unwrap_or("");
                format!("{:<width$}", clip(cell), width = *width)
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![
        format_row(&rows.header_row),
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    ];
    lines.extend(rows.body_rows.iter().map(|row| format_row(row)));
    if rows.truncated {
        lines.push(format!("(showing the first {PREVIEW_ROW_LIMIT} rows)"));
    }
    lines
}

fn clip(cell: &str) -> String {
    if cell.chars().count() <= MAX_CELL_WIDTH {
        return cell.to_string();
    }
    let mut clipped: String = cell.chars().take(MAX_CELL_WIDTH - 1).collect();
    clipped.push('…');
    clipped
}

fn tier_name(tier: QualityTier) -> &'static str {
    match tier {
        QualityTier::High => "high",
        QualityTier::Medium => "medium",
        QualityTier::Low => "low",
        QualityTier::Unknown => "unknown",
    }
}
