use hive_core::{Cell, CellView, World};

/// One character per cell; odd rows are indented to suggest the hex offset.
pub fn ascii_map(world: &World) -> String {
    let mut out = String::new();
    let mut current_row = None;
    for view in world.cells() {
        if current_row != Some(view.row_index) {
            if current_row.is_some() {
                out.push('\n');
            }
            if view.row_index % 2 == 1 {
                out.push(' ');
            }
            current_row = Some(view.row_index);
        } else {
            out.push(' ');
        }
        out.push(glyph(&view));
    }
    out.push('\n');
    out
}

fn glyph(view: &CellView<'_>) -> char {
    match (view.cell, view.creature) {
        (Cell::Empty, _) => '.',
        (Cell::Wall, _) => '#',
        (Cell::Food, _) => '*',
        (Cell::Toxin, _) => '!',
        (Cell::Occupied(_), Some(c)) if c.dead => 'x',
        (Cell::Occupied(_), Some(c)) if c.is_mother() => 'M',
        (Cell::Occupied(_), _) => 'o',
    }
}
