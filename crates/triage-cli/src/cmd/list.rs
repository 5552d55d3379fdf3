use crate::context::{block_on, Context, Options};
use crate::output::{print_json, print_table};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::time::Duration;
use triage_core::{FilteredView, PaletteColor, Project, Snapshot, ViewDefinition, ViewKind};

#[derive(Serialize)]
struct ListOutput<'a> {
    view: &'a str,
    title: &'a str,
    fetched_at: Option<DateTime<Utc>>,
    stale: bool,
    #[serde(flatten)]
    filtered: &'a FilteredView,
}

/// How a view is printed: a table, or one block per project with its notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Table,
    Review,
}

pub fn run(opts: &Options, key: &str) -> anyhow::Result<()> {
    show(opts, key, Layout::Table)
}

pub fn review(opts: &Options, key: &str) -> anyhow::Result<()> {
    show(opts, key, Layout::Review)
}

fn show(opts: &Options, key: &str, layout: Layout) -> anyhow::Result<()> {
    let ctx = Context::load(opts)?;
    let view = ctx.views.get(key)?;
    if layout == Layout::Review && !view.has_kind(ViewKind::Review) {
        anyhow::bail!("view '{}' has no review mode; use `triage list {}`", view.key, view.key);
    }
    let engine = ctx.engine()?;
    let snapshot = block_on(engine.get_snapshot(false))??;
    render(&ctx, view, &snapshot, layout)
}

/// Filter `snapshot` through `view` for the configured reviewer and print it.
pub fn render(
    ctx: &Context,
    view: &ViewDefinition,
    snapshot: &Snapshot,
    layout: Layout,
) -> anyhow::Result<()> {
    let viewer = ctx.config.initials();
    let today = Local::now().date_naive();
    let filtered = ctx.views.apply(snapshot, view, viewer.as_deref(), today);
    let now = Utc::now();
    let ttl = ctx.settings.cache.ttl();

    if ctx.json {
        return print_json(&ListOutput {
            view: &view.key,
            title: &view.title,
            fetched_at: snapshot.fetched_at,
            stale: snapshot.is_stale(now, ttl),
            filtered: &filtered,
        });
    }

    println!("{}", heading(view, &filtered));
    if let Some(warning) = staleness_warning(snapshot, ttl, now) {
        println!("{warning}");
    }
    if filtered.visible.is_empty() {
        println!("No projects.");
        return Ok(());
    }

    match layout {
        Layout::Table => {
            let rows: Vec<Vec<String>> = filtered.visible.iter().map(|p| row(view, p)).collect();
            if view.is_other {
                print_table(&["ID", "NAME", "COLOR", "LINK"], &rows);
            } else {
                print_table(&["ID", "NAME", "LINK"], &rows);
            }
        }
        Layout::Review => {
            for (i, project) in filtered.visible.iter().enumerate() {
                println!();
                print!("{}", review_block(i + 1, filtered.visible.len(), project));
            }
        }
    }

    if let Some(age) = snapshot.age_label(now) {
        println!();
        println!("Fetched {age} ago.");
    }
    Ok(())
}

/// `Title (N)`, plus `[H on hold]` when the viewer has held projects.
fn heading(view: &ViewDefinition, filtered: &FilteredView) -> String {
    let mut line = format!("{} ({})", view.title, filtered.visible.len());
    if filtered.held_count > 0 {
        line.push_str(&format!(" [{} on hold]", filtered.held_count));
    }
    line
}

/// Warning shown when the data is older than the cache TTL, which happens
/// when a refresh failed and the previous snapshot is still on screen.
pub fn staleness_warning(snapshot: &Snapshot, ttl: Duration, now: DateTime<Utc>) -> Option<String> {
    if !snapshot.is_stale(now, ttl) {
        return None;
    }
    Some(match snapshot.age_label(now) {
        Some(age) => format!("Data is possibly out-of-date (fetched {age} ago)."),
        None => "Data is possibly out-of-date.".to_string(),
    })
}

fn row(view: &ViewDefinition, project: &Project) -> Vec<String> {
    let mut cells = vec![project.gid.to_string(), project.name.clone()];
    if view.is_other {
        cells.push(color_label(project.color.as_deref()));
    }
    cells.push(project.permalink_url.clone().unwrap_or_default());
    cells
}

fn review_block(position: usize, total: usize, project: &Project) -> String {
    let mut out = format!("[{position}/{total}] {} ({})\n", project.name, project.gid);
    out.push_str(&format!("  color: {}\n", color_label(project.color.as_deref())));
    if let Some(created) = project.created_at {
        out.push_str(&format!("  created: {}\n", created.format("%Y-%m-%d")));
    }
    if let Some(url) = &project.permalink_url {
        out.push_str(&format!("  link: {url}\n"));
    }
    if project.notes.trim().is_empty() {
        out.push_str("  (no notes)\n");
    } else {
        for line in project.notes.lines() {
            out.push_str(&format!("  | {line}\n"));
        }
    }
    out
}

fn color_label(color: Option<&str>) -> String {
    match color {
        None => "none".to_string(),
        Some(c) => PaletteColor::from_internal(c)
            .map(|p| p.name().to_string())
            .unwrap_or_else(|| c.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use triage_core::ProjectId;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap() + chrono::Duration::seconds(secs)
    }

    #[test]
    fn heading_mentions_holds_only_when_present() {
        let view = ViewDefinition::new("babynet", "BabyNet", &[PaletteColor::Orange]);
        let mut filtered = FilteredView {
            visible: Vec::new(),
            held_count: 0,
        };
        assert_eq!(heading(&view, &filtered), "BabyNet (0)");
        filtered.held_count = 2;
        assert_eq!(heading(&view, &filtered), "BabyNet (0) [2 on hold]");
    }

    #[test]
    fn color_label_prefers_palette_name() {
        assert_eq!(color_label(Some("dark-teal")), "light-blue");
        assert_eq!(color_label(Some("light-green")), "light-green");
        assert_eq!(color_label(None), "none");
    }

    #[test]
    fn warns_only_past_the_ttl() {
        let ttl = Duration::from_secs(300);
        let snapshot = Snapshot::new(Vec::new(), at(0));
        assert_eq!(staleness_warning(&snapshot, ttl, at(299)), None);
        assert_eq!(
            staleness_warning(&snapshot, ttl, at(600)).as_deref(),
            Some("Data is possibly out-of-date (fetched 10m ago).")
        );
        assert!(staleness_warning(&Snapshot::empty(), ttl, at(0)).is_some());
    }

    #[test]
    fn review_block_quotes_every_note_line() {
        let project = Project {
            gid: ProjectId::from("7"),
            name: "Lee 5/6".into(),
            color: Some("light-red".into()),
            notes: "header\n\n10/16 called ///AJP".into(),
            created_at: None,
            permalink_url: Some("https://app.asana.com/0/7".into()),
        };
        let block = review_block(1, 2, &project);
        assert_eq!(
            block,
            "[1/2] Lee 5/6 (7)\n  color: coral\n  link: https://app.asana.com/0/7\n  | header\n  | \n  | 10/16 called ///AJP\n"
        );
    }
}
