use crate::context::{Context, Options};
use crate::output::{print_json, print_table};
use triage_core::{ViewDefinition, ViewKind};

pub fn run(opts: &Options) -> anyhow::Result<()> {
    let ctx = Context::load(opts)?;
    let initials = ctx.config.initials();
    let views = ctx.views.visible_for(initials.as_deref());

    if ctx.json {
        return print_json(&views);
    }

    let rows: Vec<Vec<String>> = views
        .iter()
        .map(|v| vec![v.key.clone(), v.title.clone(), selection(v), modes(v)])
        .collect();
    print_table(&["KEY", "TITLE", "SELECTS", "MODES"], &rows);
    Ok(())
}

fn selection(view: &ViewDefinition) -> String {
    let mut parts = Vec::new();
    if view.is_other {
        parts.push("colors not used elsewhere".to_string());
    } else if !view.colors.is_empty() {
        let names: Vec<&str> = view.colors.iter().map(|c| c.name()).collect();
        parts.push(names.join(", "));
    }
    if view.with_dates {
        parts.push("dated names".to_string());
    }
    if let Some(keyword) = &view.keyword {
        parts.push(format!("notes mention {keyword}"));
    }
    if parts.is_empty() {
        "everything".to_string()
    } else {
        parts.join("; ")
    }
}

fn modes(view: &ViewDefinition) -> String {
    let mut modes = Vec::new();
    if view.has_kind(ViewKind::List) {
        modes.push("list");
    }
    if view.has_kind(ViewKind::Review) {
        modes.push("review");
    }
    modes.join(", ")
}
