use crate::availability::{RoomStatus, Snapshot};
use crate::availability::{ReservationOutcome, ReservationRequest};
use crate::commands::{
    create_error_embed, create_info_embed, create_success_embed, create_warning_embed,
    CommandResult, Context,
};
use crate::components::room_calendar::CalendarEvent;
use crate::error::BotResult;
use crate::utils::time::{
    day_window, format_clock, local_to_utc, next_occurrence, parse_time, parse_weekday,
};
use chrono::{Datelike, Utc};
use chrono_tz::Tz;
use poise::serenity_prelude as serenity;
use rust_i18n::t;
use tracing::{debug, warn};

/// Current status of every meeting room
#[poise::command(slash_command, prefix_command)]
pub async fn rooms(ctx: Context<'_>) -> CommandResult {
    ctx.defer().await?;

    let tz = ctx.data().config.read().await.tz()?;
    let snapshot = ctx.data().calendar.snapshot_today(Utc::now()).await;

    ctx.send(rooms_reply(snapshot, tz)).await?;
    Ok(())
}

/// Reply to `rooms`; a failed fetch is answered here instead of by the error handler
fn rooms_reply(snapshot: BotResult<Snapshot>, tz: Tz) -> poise::CreateReply {
    match snapshot {
        Ok(snapshot) => poise::CreateReply::default().embed(snapshot_embed(&snapshot, tz)),
        Err(e) => {
            warn!("Failed to fetch room snapshot: {}", e);
            poise::CreateReply::default()
                .embed(create_error_embed(
                    &t!("error_title", context = "rooms"),
                    &t!("rooms_error_fetching", error = e.to_string()),
                ))
                .ephemeral(true)
        }
    }
}

/// A room's bookings for today or an upcoming weekday
#[poise::command(slash_command, prefix_command)]
pub async fn schedule(
    ctx: Context<'_>,
    #[description = "Room name"] room: String,
    #[description = "Weekday, e.g. 'friday' (defaults to today)"] day: Option<String>,
) -> CommandResult {
    ctx.defer().await?;

    let tz = ctx.data().config.read().await.tz()?;
    let now = Utc::now();
    let today = now.with_timezone(&tz).date_naive();
    let day_label = day.clone().unwrap_or_else(|| today.weekday().to_string());

    let weekday = match day.as_deref().map(parse_weekday) {
        Some(None) => {
            send_not_found(ctx, &room, &day_label).await?;
            return Ok(());
        }
        Some(Some(weekday)) => Some(weekday),
        None => None,
    };

    if !ctx.data().calendar.has_room(&room).await {
        send_not_found(ctx, &room, &day_label).await?;
        return Ok(());
    }

    let window = day_window(now, tz, weekday)?;
    let events = ctx.data().calendar.room_events(&room, window).await?;
    debug!("Schedule of {} has {} events", room, events.len());

    let title = match weekday {
        Some(weekday) if weekday != today.weekday() => {
            let date = next_occurrence(today, weekday);
            t!(
                "schedule_day_title",
                room = room,
                day = weekday.to_string(),
                date = date.format("%-d.%-m.").to_string()
            )
        }
        _ => t!("schedule_today_title", room = room),
    };

    let embed = if events.is_empty() {
        create_info_embed(&title, &t!("schedule_empty", room = room))
    } else {
        let lines: Vec<String> = events.events().iter().map(|e| event_line(e, tz)).collect();
        create_info_embed(&title, &lines.join("\n"))
    };

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Reserve a room for yourself
#[poise::command(slash_command, prefix_command)]
pub async fn reserve(
    ctx: Context<'_>,
    #[description = "Room name"] room: String,
    #[description = "Start time (HH:MM)"] start: String,
    #[description = "End time (HH:MM)"] end: String,
    #[description = "Weekday (defaults to today)"] day: Option<String>,
) -> CommandResult {
    let tz = ctx.data().config.read().await.tz()?;
    let today = Utc::now().with_timezone(&tz).date_naive();

    let date = match day.as_deref() {
        Some(day) => match parse_weekday(day) {
            Some(weekday) => next_occurrence(today, weekday),
            None => {
                send_invalid_reservation(ctx, &t!("reserve_invalid_day", day = day)).await?;
                return Ok(());
            }
        },
        None => today,
    };

    let (Some(start_time), Some(end_time)) = (parse_time(&start), parse_time(&end)) else {
        send_invalid_reservation(ctx, &t!("reserve_invalid_time", start = start, end = end))
            .await?;
        return Ok(());
    };

    let request = local_to_utc(date, start_time.0, start_time.1, tz).and_then(|start| {
        let end = local_to_utc(date, end_time.0, end_time.1, tz)?;
        ReservationRequest::new(&room, &ctx.author().name, start, end)
    });
    let request = match request {
        Ok(request) => request,
        Err(e) => {
            send_invalid_reservation(ctx, &e.to_string()).await?;
            return Ok(());
        }
    };

    ctx.defer().await?;
    let outcome = ctx.data().calendar.reserve(request).await?;

    let embed = match outcome {
        ReservationOutcome::Accepted => create_success_embed(
            &t!("reserve_title"),
            &t!(
                "reserve_accepted",
                room = room,
                date = date.format("%-d.%-m.").to_string(),
                start = start,
                end = end
            ),
        ),
        ReservationOutcome::Conflict(conflicts) => {
            let lines: Vec<String> = conflicts.iter().map(|e| event_line(e, tz)).collect();
            create_warning_embed(
                &t!("reserve_title"),
                &format!("{}\n{}", t!("reserve_conflict", room = room), lines.join("\n")),
            )
        }
        ReservationOutcome::Failed(e) => create_error_embed(
            &t!("error_title", context = "reservation"),
            &t!("reserve_failed", room = room, error = e.to_string()),
        ),
    };

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

async fn send_not_found(ctx: Context<'_>, room: &str, day: &str) -> CommandResult {
    ctx.send(
        poise::CreateReply::default()
            .content(t!("schedule_not_found", room = room, day = day))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

async fn send_invalid_reservation(ctx: Context<'_>, reason: &str) -> CommandResult {
    ctx.send(
        poise::CreateReply::default()
            .embed(create_error_embed(
                &t!("error_title", context = "reservation"),
                reason,
            ))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

fn snapshot_embed(snapshot: &Snapshot, tz: Tz) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(t!("rooms_title"))
        .color(0x00_99_FF);

    for status in &snapshot.statuses {
        embed = embed.field(status.room_name.to_uppercase(), status_line(status, tz), false);
    }
    for failure in &snapshot.failures {
        embed = embed.field(
            failure.room_name.to_uppercase(),
            t!("rooms_unavailable", error = failure.reason.to_string()),
            false,
        );
    }

    embed
}

/// One line describing a room's status
pub fn status_line(status: &RoomStatus, tz: Tz) -> String {
    let organizer = status.organizer_name.clone().unwrap_or_default();
    match (status.is_in_use, status.end_time) {
        (true, Some(end)) => t!(
            "room_busy_until",
            time = format_clock(end, tz),
            organizer = organizer
        )
        .to_string(),
        (true, None) => t!("room_busy").to_string(),
        (false, Some(next)) => t!(
            "room_free_until",
            time = format_clock(next, tz),
            organizer = organizer
        )
        .to_string(),
        (false, None) => t!("room_free_rest_of_day").to_string(),
    }
}

/// One line describing a booking
pub fn event_line(event: &CalendarEvent, tz: Tz) -> String {
    let subject = if event.subject.is_empty() {
        t!("event_untitled").to_string()
    } else {
        event.subject.clone()
    };
    format!(
        "• **{} - {}** {} ({})",
        format_clock(event.start, tz),
        format_clock(event.end, tz),
        subject,
        event.organizer_name
    )
}
