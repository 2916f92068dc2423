//! Join, open and about.

use chrono::{DateTime, Utc};
use nextup_core::{Menu, MenuAction, MenuEntry, select_relevant_event};

use super::Context;
use crate::error::{ClientError, ClientResult};

/// The join action of the event shown in the status.
pub fn join_action(ctx: &Context, now: DateTime<Utc>) -> ClientResult<MenuAction> {
    let events = ctx.today(now)?;
    let Some(selected) = select_relevant_event(&events, now) else {
        return Err(ClientError::action("no upcoming meetings today"));
    };
    let link = selected.event.meeting_link().ok_or_else(|| {
        ClientError::action(format!("\"{}\" has no meeting link", selected.event.title))
    })?;
    Ok(MenuAction::OpenLink(link.url))
}

/// Open the meeting link of the event shown in the status.
pub fn join(ctx: &mut Context, now: DateTime<Utc>) -> ClientResult<()> {
    let action = join_action(ctx, now)?;
    ctx.activate(&action)
}

/// The action of the `position`th event entry (1-based).
pub fn event_action(menu: &Menu, position: usize) -> ClientResult<MenuAction> {
    position
        .checked_sub(1)
        .and_then(|index| {
            menu.entries
                .iter()
                .filter(|entry| matches!(entry, MenuEntry::Event(_)))
                .nth(index)
        })
        .and_then(MenuEntry::action)
        .ok_or_else(|| ClientError::action(format!("no event at position {}", position)))
}

/// Activate the `position`th event of the menu.
pub fn open(ctx: &mut Context, now: DateTime<Utc>, position: usize) -> ClientResult<()> {
    let events = ctx.today(now)?;
    let menu = ctx.menu(&events, now)?;
    let action = event_action(&menu, position)?;
    ctx.activate(&action)
}

/// Open the project page.
pub fn about(ctx: &mut Context) -> ClientResult<()> {
    ctx.activate(&MenuAction::About)
}
