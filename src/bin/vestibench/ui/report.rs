use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use vestibench::analysis::AccuracyReport;
use vestibench::cleaner::CleanSummary;

fn header(names: impl IntoIterator<Item = String>) -> Vec<Cell> {
    names
        .into_iter()
        .map(|name| Cell::new(name).fg(Color::Yellow).add_attribute(Attribute::Bold))
        .collect()
}

fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn pct(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

pub fn print_report(report: &AccuracyReport) {
    let mut models = table();
    models.set_header(header(["MODEL", "TEMPERATURE", "ACCURACY"].map(String::from)));
    for model in &report.per_model {
        for (temperature, accuracy) in &model.by_temperature {
            models.add_row(vec![
                Cell::new(&model.model).fg(Color::Green),
                Cell::new(temperature),
                Cell::new(pct(*accuracy)),
            ]);
        }
    }
    println!("{models}");

    let mut exams = table();
    exams.set_header(header(["EXAM", "MODEL", "ACCURACY"].map(String::from)));
    for exam in &report.per_exam {
        exams.add_row(vec![
            Cell::new(&exam.exam),
            Cell::new(&exam.model).fg(Color::Green),
            Cell::new(pct(exam.accuracy)),
        ]);
    }
    println!("{exams}");

    if let Some(pivot) = &report.per_area {
        let mut areas = table();
        areas.set_header(header(
            std::iter::once("AREA".to_string()).chain(pivot.models.iter().cloned()),
        ));
        for (area, cells) in &pivot.rows {
            let mut row = vec![Cell::new(area)];
            row.extend(
                cells
                    .iter()
                    .map(|c| Cell::new(c.map(pct).unwrap_or_else(|| "-".to_string()))),
            );
            areas.add_row(row);
        }
        println!("{areas}");
    }

    for path in &report.written {
        println!("saved {}", path.display());
    }
}

pub fn print_clean_summary(summary: &CleanSummary) {
    let mut files = table();
    files.set_header(header(["FILE", "OUTPUT", "CHANGED"].map(String::from)));
    for done in &summary.cleaned {
        files.add_row(vec![
            Cell::new(done.source.display()),
            Cell::new(done.output.display()).fg(Color::Green),
            Cell::new(done.changed),
        ]);
    }
    for (path, err) in &summary.failed {
        files.add_row(vec![
            Cell::new(path.display()),
            Cell::new(err).fg(Color::Red),
            Cell::new("-"),
        ]);
    }
    println!("{files}");
    println!(
        "{} cleaned, {} skipped, {} failed",
        summary.cleaned.len(),
        summary.skipped.len(),
        summary.failed.len()
    );
}
