//! Plain-text rendering

use annot_core::{Control, DashboardPage, FieldSummary, FormModel, GroupView};

/// Longest cell printed for titles and authors
const MAX_CELL: usize = 48;

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

pub fn group(view: &GroupView) -> String {
    let mut out = format!("{}\n", view.summary);
    if view.rows.is_empty() {
        out.push_str("  (no matching articles)\n");
        return out;
    }
    for row in &view.rows {
        let entry = if row.entry_coded { "*" } else { " " };
        out.push_str(&format!(
            "  {:<10}{} {:<40} {:>3}  {:<10} {:<30} {}\n",
            row.status.to_string(),
            entry,
            truncate(&row.article.article_index, 40),
            row.experiment_number,
            truncate(&row.article.date, 10),
            truncate(&row.article.author, 30),
            truncate(&row.article.title, MAX_CELL),
        ));
    }
    out
}

pub fn dashboard(page: &DashboardPage, only: Option<&str>) -> String {
    page.groups
        .iter()
        .filter(|g| only.map_or(true, |name| g.summary.name == name))
        .map(group)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn form(form: &FormModel) -> String {
    let mut out = format!("{}\n", form.heading());
    let meta = form.metadata();
    out.push_str(&format!("  experiment_number: {}\n", form.experiment_number()));
    for name in annot_core::METADATA_FIELDS {
        out.push_str(&format!("  {}: {}\n", name, meta.get(name).unwrap_or("")));
    }

    for section in form.sections() {
        out.push_str(&format!("\n[{}]\n", section.title));
        for control in &section.controls {
            let value = match &control.control {
                Control::MultiSelect { options, selected } => format!(
                    "{}  (options: {})",
                    selected.join("; "),
                    options.join(" | ")
                ),
                Control::SingleChoice { options, selected } => format!(
                    "{}  (options: {})",
                    selected.as_deref().unwrap_or(""),
                    options.join(" | ")
                ),
                Control::TextArea { value } | Control::TextInput { value } => value.clone(),
            };
            out.push_str(&format!("  {} ({}): {}\n", control.label, control.code, value));
        }
    }
    out
}

pub fn codebook(listing: &[(String, Vec<FieldSummary>)]) -> String {
    let mut out = String::new();
    for (section, fields) in listing {
        out.push_str(&format!("[{}]\n", section));
        for field in fields {
            out.push_str(&format!("  {:<24} {:<12} {}", field.code, field.kind.to_string(), field.label));
            if !field.options.is_empty() {
                out.push_str(&format!("  [{}]", field.options.join(" | ")));
            }
            out.push('\n');
        }
    }
    out
}
