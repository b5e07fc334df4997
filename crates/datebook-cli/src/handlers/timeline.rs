use chrono::{Datelike, NaiveDate, Weekday};
use datebook_domain::{
    format_date, format_display, month_grid, DateRange, DisplayEvent, PostponedView,
    SortMode,
};
use serde::Serialize;

use super::today;
use crate::cli::EventsArgs;
use crate::context::CliContext;
use crate::output;

#[derive(Serialize)]
struct DayListing {
    date: String,
    label: String,
    events: Vec<DisplayEvent>,
}

#[derive(Serialize)]
struct GridListing {
    year: i32,
    month: u32,
    week_start: String,
    weeks: Vec<Vec<GridDay>>,
}

#[derive(Serialize)]
struct GridDay {
    date: String,
    in_month: bool,
}

pub async fn handle_events(ctx: &CliContext, args: EventsArgs) -> anyhow::Result<()> {
    let from = args.from.unwrap_or_else(today);
    let range = DateRange::new(from, args.to.unwrap_or(from));

    if let Some(friend) = args.friend {
        ctx.store.view_friend(friend);
    }
    ctx.store.set_day_sort(args.sort);
    ctx.store.refresh_view().await?;

    let now = today();
    let days: Vec<DayListing> = range
        .days()
        .map(|day| DayListing {
            date: format_date(day),
            label: format_display(day),
            events: ctx.store.display_events(day, now),
        })
        .collect();

    if let Some(friend) = ctx.store.friend_meta() {
        output::output_success(serde_json::json!({ "friend": friend, "days": days }));
    } else {
        output::output_list(days);
    }
    Ok(())
}

pub async fn handle_backlog(
    ctx: &CliContext,
    view: Option<PostponedView>,
    sort: SortMode,
) -> anyhow::Result<()> {
    ctx.store.refresh_backlog().await?;
    let views = match view {
        Some(view) => vec![view],
        None => PostponedView::ALL.to_vec(),
    };

    // Partitions are listed one after the other, never interleaved
    let mut entries = Vec::new();
    for view in views {
        ctx.store.set_backlog_sort(view, sort);
        entries.extend(ctx.store.backlog_entries(view));
    }
    output::output_list(entries);
    Ok(())
}

pub fn handle_grid(month: Option<(i32, u32)>, week_start: Weekday) -> anyhow::Result<()> {
    let (year, month) = month.unwrap_or_else(|| {
        let now = today();
        (now.year(), now.month())
    });
    let grid = month_grid(year, month, week_start)?;
    let weeks: Vec<Vec<GridDay>> = grid
        .iter()
        .map(|week| {
            week.iter()
                .map(|day: &NaiveDate| GridDay {
                    date: format_date(*day),
                    in_month: day.month() == month && day.year() == year,
                })
                .collect::<Vec<_>>()
        })
        .collect();

    output::output_success(GridListing {
        year,
        month,
        week_start: week_start.to_string(),
        weeks,
    });
    Ok(())
}
