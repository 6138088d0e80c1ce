use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use labmatch_cli::pipeline::{InspectReport, RunResult};
use labmatch_model::{OverlapStats, SourceOverlap};

pub fn print_run_summary(result: &RunResult) {
    let summary = &result.summary;
    println!("Output: {}", result.output_dir.display());
    if result.cached {
        println!("Inputs unchanged since the last run; stored outputs reused (--force to recompute).");
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Measure"), header_cell("Value")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let rows: [(&str, String); 10] = [
        ("Patients processed", summary.patients_processed.to_string()),
        ("Test types", summary.unique_test_types.to_string()),
        ("Matrix rows", summary.matrix_rows.to_string()),
        (
            "Columns (before / after pruning)",
            format!(
                "{} / {}",
                summary.columns_before_pruning, summary.columns_after_pruning
            ),
        ),
        ("Measurements", summary.total_measurements.to_string()),
        ("Non-null measurements", summary.non_null_measurements.to_string()),
        ("Fill rate", format!("{:.1}%", summary.fill_rate())),
        ("Duplicate groups", summary.duplicate_groups.to_string()),
        ("Long format rows", summary.long_format_rows.to_string()),
        ("Suffix matrix rows", summary.suffix_rows.to_string()),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    println!("{table}");

    if let Some(overlap) = &summary.overlap {
        print_overlap(overlap);
    }
    if !summary.pruned_columns.is_empty() {
        println!("Pruned columns: {}", summary.pruned_columns.join(", "));
    }
    if !result.files.is_empty() {
        let mut files = Table::new();
        files.set_header(vec![header_cell("File"), header_cell("Rows")]);
        apply_table_style(&mut files);
        align_column(&mut files, 1, CellAlignment::Right);
        for file in &result.files {
            files.add_row(vec![Cell::new(&file.name), Cell::new(file.rows)]);
        }
        println!("{files}");
    }
    if summary.has_warnings() {
        eprintln!("Warnings:");
        for warning in &summary.warnings {
            eprintln!("- {warning}");
        }
    }
}

pub fn print_inspect(report: &InspectReport) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Table"), header_cell("Rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("cohort"), Cell::new(report.cohort_rows)]);
    table.add_row(vec![Cell::new("labs"), Cell::new(report.lab_rows)]);
    table.add_row(vec![Cell::new("cancer"), Cell::new(report.cancer_rows)]);
    println!("{table}");
    if report.lab_rows_skipped > 0 {
        eprintln!(
            "Skipped {} lab rows without patient id or test type code.",
            report.lab_rows_skipped
        );
    }
    print_overlap(&report.overlap);
    println!("Fingerprint: {}", report.fingerprint);
}

fn print_overlap(overlap: &SourceOverlap) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Cohort patients"),
        header_cell("Table patients"),
        header_cell("Shared"),
        header_cell("% of cohort"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for stats in [&overlap.labs, &overlap.cancer] {
        table.add_row(overlap_row(stats));
    }
    println!("{table}");
}

fn overlap_row(stats: &OverlapStats) -> Vec<Cell> {
    let percent = Cell::new(format!("{:.1}", stats.percent_of_cohort));
    let percent = if stats.shared_patients == 0 {
        percent.fg(Color::Yellow).add_attribute(Attribute::Bold)
    } else {
        percent
    };
    vec![
        Cell::new(&stats.table),
        Cell::new(stats.cohort_patients),
        Cell::new(stats.table_patients),
        Cell::new(stats.shared_patients),
        percent,
    ]
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
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}
