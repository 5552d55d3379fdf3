use crate::context::{block_on, Context, Options};
use crate::output::print_json;
use chrono::{Local, NaiveDate};
use triage_core::hold::parse_hold_date;
use triage_core::{Confirmation, ProjectId};

pub fn run(opts: &Options, project: &str, text: &str) -> anyhow::Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("note text cannot be empty");
    }
    let ctx = Context::load(opts)?;
    let mutator = ctx.mutator()?;
    let id = ProjectId::from(project);
    let done = block_on(mutator.add_note(text.trim(), &id))??;
    report(&ctx, &done)
}

pub fn hold(opts: &Options, project: &str, until: &str) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let until = parse_until(until, today)?;
    let ctx = Context::load(opts)?;
    let mutator = ctx.mutator()?;
    let id = ProjectId::from(project);
    let done = block_on(mutator.add_hold(&id, until))??;
    report(&ctx, &done)
}

pub fn color(opts: &Options, project: &str, color: &str) -> anyhow::Result<()> {
    let ctx = Context::load(opts)?;
    let mutator = ctx.mutator()?;
    let id = ProjectId::from(project);
    let done = block_on(mutator.change_color(color, &id))??;
    report(&ctx, &done)
}

fn report(ctx: &Context, done: &Confirmation) -> anyhow::Result<()> {
    if ctx.json {
        return print_json(done);
    }
    println!("{} ({})", done.message, done.project_id);
    Ok(())
}

/// Accepts the note-style `M/D[/YY[YY]]` forms and ISO `YYYY-MM-DD`. The
/// date must be after `today`.
fn parse_until(raw: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let raw = raw.trim();
    let date = if raw.contains('-') {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    } else {
        parse_hold_date(raw, today)
    };
    let Some(date) = date else {
        anyhow::bail!("unrecognized date '{raw}' (use MM/DD/YY or YYYY-MM-DD)");
    };
    if date <= today {
        anyhow::bail!("hold date {date} is not in the future");
    }
    Ok(date)
}
