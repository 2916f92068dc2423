//! Calendar selection commands.

use std::fmt::Write as _;

use super::Context;
use crate::error::ClientResult;

/// One line per calendar: `[x] work  Work`.
pub fn list_output(ctx: &Context) -> ClientResult<String> {
    let calendars = ctx.source.calendars()?;
    let selected = ctx.selected_calendars()?;
    let width = calendars.iter().map(|c| c.id.len()).max().unwrap_or(0);

    let mut out = String::new();
    for calendar in &calendars {
        let mark = if selected.contains(&calendar.id) { "x" } else { " " };
        let _ = writeln!(
            out,
            "[{}] {:width$}  {}",
            mark,
            calendar.id,
            calendar.title,
            width = width
        );
    }
    Ok(out)
}

/// List calendars and whether they are watched.
pub fn list(ctx: &Context) -> ClientResult<()> {
    let out = list_output(ctx)?;
    if out.is_empty() {
        println!("No calendars.");
    } else {
        print!("{}", out);
    }
    Ok(())
}

/// Flips `id` in the stored selection. Returns whether it is selected now.
pub fn toggle_calendar(ctx: &mut Context, id: &str) -> ClientResult<bool> {
    let calendars = ctx.source.calendars()?;
    let default_id = ctx.source.default_calendar_id()?;
    Ok(ctx
        .preferences
        .toggle(id, &calendars, default_id.as_deref())?)
}

/// Select or deselect a calendar.
pub fn toggle(ctx: &mut Context, id: &str) -> ClientResult<()> {
    if toggle_calendar(ctx, id)? {
        println!("Selected {}.", id);
    } else {
        println!("Deselected {}.", id);
    }
    Ok(())
}
