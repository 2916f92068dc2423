//! Menu actions: open meeting links, the calendar and the project page.

use nextup_core::{MeetingLink, MenuAction};
use tracing::{debug, info};

use crate::config::DisplaySettings;
use crate::error::{ClientError, ClientResult};

/// The URL an action opens, if it opens one.
pub fn target_url<'a>(action: &'a MenuAction, display: &'a DisplaySettings) -> Option<&'a str> {
    match action {
        MenuAction::OpenLink(url) => Some(url),
        MenuAction::OpenCalendar => Some(&display.calendar_url),
        MenuAction::About => Some(&display.about_url),
        MenuAction::ToggleCalendar(_) | MenuAction::Quit => None,
    }
}

/// Opens whatever `action` points at in the default browser.
///
/// Returns false for actions that do not open anything.
pub fn open_action(action: &MenuAction, display: &DisplaySettings) -> ClientResult<bool> {
    let Some(url) = target_url(action, display) else {
        debug!(?action, "action opens nothing");
        return Ok(false);
    };
    open_url(url)?;
    Ok(true)
}

/// Opens a meeting link in the default browser.
pub fn join(link: &MeetingLink) -> ClientResult<()> {
    info!(kind = link.kind.display_name(), "joining meeting");
    open_url(&link.url)
}

/// Opens `url` in the default browser.
pub fn open_url(url: &str) -> ClientResult<()> {
    info!(url = %url, "opening URL");
    open::that(url).map_err(|e| ClientError::action(format!("failed to open {}: {}", url, e)))
}
