use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

/// Table and cell creation helpers
pub fn create_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            header
                .iter()
                .map(|label| Cell::new(*label).fg(TableColor::Cyan))
                .collect::<Vec<_>>(),
        );
    table
}

pub fn seconds_cell(seconds: f64) -> Cell {
    if seconds >= 60.0 {
        Cell::new(format!("{:.1}min", seconds / 60.0))
    } else {
        Cell::new(format!("{seconds:.1}s"))
    }
}

/// Colors a fractional change: large slowdowns red, moderate yellow,
/// improvements green.
pub fn color_coded_delta_cell(delta_pct: f64) -> Cell {
    let percent = delta_pct * 100.0;
    let text = format!("{percent:+.1}%");
    if percent >= 50.0 {
        Cell::new(text).fg(TableColor::Red)
    } else if percent > 0.0 {
        Cell::new(text).fg(TableColor::Yellow)
    } else {
        Cell::new(text).fg(TableColor::Green)
    }
}

pub fn color_coded_fail_rate_cell(fail_rate: f64) -> Cell {
    let percent = fail_rate * 100.0;
    let text = format!("{percent:.1}%");
    if percent >= 50.0 {
        Cell::new(text).fg(TableColor::Red)
    } else if percent >= 25.0 {
        Cell::new(text).fg(TableColor::Yellow)
    } else {
        Cell::new(text).fg(TableColor::Green)
    }
}
