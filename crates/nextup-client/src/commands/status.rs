//! Status and menu output.

use chrono::{DateTime, Utc};
use nextup_core::select_relevant_event;

use super::Context;
use crate::error::{ClientError, ClientResult};

/// The status title for `now`.
pub fn status_line(ctx: &Context, now: DateTime<Utc>) -> ClientResult<String> {
    let events = ctx.today(now)?;
    let selection = select_relevant_event(&events, now);
    Ok(ctx.formatter().status_title(selection.map(|s| s.event), now))
}

/// Print the status title.
pub fn status(ctx: &Context, now: DateTime<Utc>) -> ClientResult<()> {
    println!("{}", status_line(ctx, now)?);
    Ok(())
}

/// The menu as text, or as its JSON model.
pub fn menu_output(ctx: &Context, now: DateTime<Utc>, json: bool) -> ClientResult<String> {
    let events = ctx.today(now)?;
    let menu = ctx.menu(&events, now)?;
    if json {
        serde_json::to_string_pretty(&menu)
            .map_err(|e| ClientError::action(format!("failed to serialize menu: {}", e)))
    } else {
        Ok(menu.render())
    }
}

/// Print the menu.
pub fn menu(ctx: &Context, now: DateTime<Utc>, json: bool) -> ClientResult<()> {
    print!("{}", menu_output(ctx, now, json)?);
    if json {
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{at, context};

    mod status_line {
        use super::*;

        #[test]
        fn counts_down_to_next_event() {
            let (_dir, ctx) = context();
            assert_eq!(status_line(&ctx, at(9, 15)).unwrap(), "Standup in 45 min");
            assert_eq!(status_line(&ctx, at(6, 0)).unwrap(), "Standup in 4 hours");
        }

        #[test]
        fn moves_on_after_a_third() {
            let (_dir, ctx) = context();
            assert_eq!(status_line(&ctx, at(10, 5)).unwrap(), "Standup now");
            assert_eq!(status_line(&ctx, at(10, 11)).unwrap(), "Review in 3 hours");
        }

        #[test]
        fn nothing_left_today() {
            let (_dir, ctx) = context();
            assert_eq!(status_line(&ctx, at(15, 0)).unwrap(), "No upcoming meetings");
        }

        #[test]
        fn custom_no_meeting_text() {
            let (_dir, ctx) = context();
            let mut config = ctx.config().clone();
            config.display.no_meeting_text = "Free".to_string();
            let ctx = Context::with_source(config, ctx.source(), ctx.preferences().clone())
                .with_day_boundary(ctx.boundary());
            assert_eq!(status_line(&ctx, at(15, 0)).unwrap(), "Free");
        }
    }

    mod menu_output {
        use super::*;

        #[test]
        fn text() {
            let (_dir, ctx) = context();
            let out = menu_output(&ctx, at(9, 0), false).unwrap();
            assert!(out.starts_with("Join via Google Meet... [j]\n"));
            assert!(out.contains("> 10:00 - Standup\n"));
            assert!(out.contains("  14:00 - Review\n"));
            assert!(!out.contains("Dentist"));
        }

        #[test]
        fn json_model() {
            let (_dir, ctx) = context();
            let out = menu_output(&ctx, at(9, 0), true).unwrap();
            let value: serde_json::Value = serde_json::from_str(&out).unwrap();
            let entries = value["entries"].as_array().unwrap();
            assert_eq!(entries[0]["kind"], "join");
            assert_eq!(entries[0]["link"]["url"], "https://meet.google.com/abc-defg-hij");
        }
    }
}
