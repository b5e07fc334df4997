use datebook_domain::{DateRange, EventDraft, EventId, EventUpdate, FieldUpdate};

use crate::cli::{AddArgs, AddRangeArgs, DetailArgs, EditArgs};
use crate::context::CliContext;
use crate::output;

fn draft(title: String, details: DetailArgs) -> EventDraft {
    EventDraft {
        title,
        start_time: details.time,
        priority: details.priority,
        note: details.note,
        link: details.link,
        unlock_date: details.unlock,
    }
}

fn field<T>(value: Option<T>, clear: bool) -> FieldUpdate<T> {
    match (value, clear) {
        (_, true) => FieldUpdate::Clear,
        (Some(value), false) => FieldUpdate::Set(value),
        (None, false) => FieldUpdate::NoChange,
    }
}

pub async fn handle_add(ctx: &CliContext, args: AddArgs) -> anyhow::Result<()> {
    let draft = draft(args.title, args.details);
    match (args.backlog, args.date) {
        (Some(view), _) => {
            let entry = ctx.store.create_postponed(view, draft).await?;
            output::output_success(&entry);
        }
        (None, Some(date)) => {
            let event = ctx.store.create_event(date, draft).await?;
            output::output_success(&event);
        }
        (None, None) => anyhow::bail!("Either --date or --backlog is required"),
    }
    Ok(())
}

pub async fn handle_edit(ctx: &CliContext, args: EditArgs) -> anyhow::Result<()> {
    let update = EventUpdate {
        title: args.title,
        date: args.date,
        start_time: field(args.time, args.clear_time),
        priority: field(args.priority, args.clear_priority),
        note: field(args.note, args.clear_note),
        link: field(args.link, false),
        unlock_date: field(args.unlock, false),
    };
    if update.is_empty() {
        anyhow::bail!("Nothing to change");
    }

    ctx.store.refresh_events().await?;
    let event = ctx.store.update_event(&EventId::from(args.id), update).await?;
    output::output_success(&event);
    Ok(())
}

pub async fn handle_delete(ctx: &CliContext, id: String, postponed: bool) -> anyhow::Result<()> {
    let id = EventId::from(id);
    if postponed {
        ctx.store.delete_postponed(&id).await?;
    } else {
        ctx.store.delete_event(&id).await?;
    }
    output::output_success(serde_json::json!({ "deleted": id }));
    Ok(())
}

/// Drives the range selection the way a drag would, then submits one draft
/// per day.
pub async fn handle_add_range(ctx: &CliContext, args: AddRangeArgs) -> anyhow::Result<()> {
    let range = DateRange::new(args.from, args.to);
    ctx.store.pointer_down(args.from);
    ctx.store.pointer_enter(args.to);
    ctx.store.pointer_up();

    let template = draft(args.title, args.details);
    let drafts = range.days().map(|day| (day, template.clone())).collect();
    let events = ctx.store.create_range(drafts).await?;
    output::output_list(events);
    Ok(())
}
