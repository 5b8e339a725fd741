use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use harmonize_model::{HarmonizationReport, MappingDecision, TargetSchema};
use harmonize_standards::{DoctorReport, HarmonizerConfig};

pub fn print_decisions(report: &HarmonizationReport) {
    if report.decisions.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source column"),
        header_cell("Target field"),
        header_cell("Confidence"),
        header_cell("Basis"),
        header_cell("Transformation"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    for decision in &report.decisions {
        table.add_row(vec![
            Cell::new(&decision.source_column),
            target_cell(decision),
            Cell::new(format!("{:.2}", decision.confidence)),
            dim_cell(decision.basis.as_str()),
            dim_cell(decision.transformation_kind.as_str()),
            status_cell(decision),
        ]);
    }
    println!("Mapping decisions:");
    println!("{table}");
}

pub fn print_summary(report: &HarmonizationReport) {
    let summary = report.summary();
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Total records"), Cell::new(summary.total_records)]);
    table.add_row(vec![
        Cell::new("Fields mapped"),
        count_cell(summary.fields_mapped, Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Fields rejected"),
        count_cell(summary.fields_rejected, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Fields enriched"),
        count_cell(summary.fields_enriched, Color::Blue),
    ]);
    table.add_row(vec![
        Cell::new("Quality score")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        quality_cell(summary.quality_score),
    ]);
    println!("Summary:");
    println!("{table}");
    if !report.missing_fields.is_empty() {
        println!("Missing fields: {}", report.missing_fields.join(", "));
    }
    if let Some(digest) = &report.digest {
        println!("Input digest: {digest}");
    }
}

/// First `limit` records in schema order.
pub fn print_preview(report: &HarmonizationReport, schema: &TargetSchema, limit: usize) {
    if limit == 0 || report.enhanced_rows.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(schema.names().map(header_cell).collect::<Vec<_>>());
    apply_table_style(&mut table);
    for record in report.enhanced_rows.iter().take(limit) {
        table.add_row(
            record
                .ordered(schema)
                .map(|(_, value)| match value {
                    Some(value) => Cell::new(value.to_string()),
                    None => dim_cell("-"),
                })
                .collect::<Vec<_>>(),
        );
    }
    println!(
        "Preview ({} of {} records):",
        limit.min(report.enhanced_rows.len()),
        report.enhanced_rows.len()
    );
    println!("{table}");
}

pub fn print_schema(config: &HarmonizerConfig) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Type"),
        header_cell("Transformation"),
        header_cell("Enricher"),
        header_cell("Synonyms"),
    ]);
    apply_table_style(&mut table);
    for field in &config.fields {
        table.add_row(vec![
            Cell::new(&field.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(field.field_type.as_str()),
            Cell::new(field.transformation().as_str()),
            match field.enrich {
                Some(kind) => Cell::new(kind.as_str()).fg(Color::Green),
                None => dim_cell("-"),
            },
            Cell::new(field.synonyms.join(", ")),
        ]);
    }
    println!("Profile: {}", config.name);
    if let Some(description) = &config.description {
        println!("{description}");
    }
    println!("{table}");
}

pub fn print_doctor(report: &DoctorReport) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Check"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let counts = &report.counts;
    let rows: [(&str, String); 9] = [
        ("Config", report.origin.clone()),
        ("Acceptance", format!("{:.2}", report.acceptance)),
        ("Escalation", format!("{:.2}", report.escalation)),
        ("Classifier", report.classifier.to_string()),
        ("Fields", counts.fields.to_string()),
        ("Synonyms", counts.synonyms.to_string()),
        ("Glossary entries", counts.glossary_entries.to_string()),
        ("Enrichers", counts.enrichers.to_string()),
        (
            "Vocabulary entries",
            counts.vocabulary_entries.to_string(),
        ),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    println!("Profile: {}", report.name);
    println!("{table}");
    if report.is_clean() {
        println!("No problems found.");
    } else {
        println!("Warnings:");
        for warning in &report.warnings {
            println!("- {warning}");
        }
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn target_cell(decision: &MappingDecision) -> Cell {
    if decision.is_mapped() {
        Cell::new(&decision.target_field)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold)
    } else {
        match &decision.proposed_field {
            Some(field) => Cell::new(format!("({field})")).fg(Color::DarkGrey),
            None => dim_cell(&decision.target_field),
        }
    }
}

fn status_cell(decision: &MappingDecision) -> Cell {
    match &decision.rejection_reason {
        None => Cell::new("mapped").fg(Color::Green),
        Some(reason) => Cell::new(reason.to_string()).fg(Color::Yellow),
    }
}

fn quality_cell(score: f64) -> Cell {
    let color = if score >= 0.9 {
        Color::Green
    } else if score >= 0.6 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(format!("{score:.3}"))
        .fg(color)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
