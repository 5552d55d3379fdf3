use crate::context::Options;
use crate::output::{print_json, print_table};
use serde::Serialize;
use triage_core::PaletteColor;

#[derive(Serialize)]
struct ColorRow {
    name: &'static str,
    internal: &'static str,
    hex: &'static str,
}

fn rows() -> Vec<ColorRow> {
    PaletteColor::all()
        .iter()
        .map(|c| ColorRow {
            name: c.name(),
            internal: c.internal(),
            hex: c.hex(),
        })
        .collect()
}

/// The names `triage color` accepts, with what Asana stores for each.
pub fn run(opts: &Options) -> anyhow::Result<()> {
    let rows = rows();
    if opts.json {
        return print_json(&rows);
    }
    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|r| vec![r.name.to_string(), r.internal.to_string(), r.hex.to_string()])
        .collect();
    print_table(&["NAME", "ASANA", "HEX"], &table);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_row_per_palette_color() {
        let rows = rows();
        assert_eq!(rows.len(), PaletteColor::all().len());
        let coral = rows.iter().find(|r| r.name == "coral").unwrap();
        assert_eq!((coral.internal, coral.hex), ("light-red", "#FC979A"));
    }
}
