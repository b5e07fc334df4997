use chrono::NaiveDate;
use datebook_client::{TransferPolicy, TransferReport};
use datebook_domain::PostponedView;

use super::to_ids;
use crate::context::CliContext;
use crate::output;

fn report(result: datebook_core::DatebookResult<TransferReport>) -> anyhow::Result<()> {
    let report = result?;
    output::output_success(&report);
    Ok(())
}

pub async fn handle_to_date(
    ctx: &CliContext,
    ids: Vec<String>,
    to: NaiveDate,
    policy: TransferPolicy,
) -> anyhow::Result<()> {
    ctx.store.refresh_events().await?;
    let ids = to_ids(ids);
    let result = match policy {
        TransferPolicy::Copy => ctx.store.copy_to_date(&ids, to).await,
        TransferPolicy::Move => ctx.store.move_to_date(&ids, to).await,
    };
    report(result)
}

pub async fn handle_postpone(
    ctx: &CliContext,
    ids: Vec<String>,
    view: PostponedView,
    policy: TransferPolicy,
) -> anyhow::Result<()> {
    ctx.store.refresh_events().await?;
    report(ctx.store.postpone(&to_ids(ids), view, policy).await)
}

pub async fn handle_reactivate(
    ctx: &CliContext,
    ids: Vec<String>,
    to: NaiveDate,
    policy: TransferPolicy,
) -> anyhow::Result<()> {
    ctx.store.refresh_backlog().await?;
    report(ctx.store.reactivate(&to_ids(ids), to, policy).await)
}

pub async fn handle_repostpone(
    ctx: &CliContext,
    ids: Vec<String>,
    view: PostponedView,
    policy: TransferPolicy,
) -> anyhow::Result<()> {
    ctx.store.refresh_backlog().await?;
    report(ctx.store.repostpone(&to_ids(ids), view, policy).await)
}
