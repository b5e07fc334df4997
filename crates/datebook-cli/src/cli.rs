use chrono::{NaiveDate, Weekday};
use clap::{Args, Parser, Subcommand, ValueEnum};
use datebook_client::TransferPolicy;
use datebook_domain::{PostponedView, SortMode};

#[derive(Parser)]
#[command(name = "datebook")]
#[command(about = "Calendar timeline and postponed backlog from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Server base URL (overrides the config file)
    #[arg(long, global = true, env = "DATEBOOK_SERVER")]
    pub server: Option<String>,

    /// Bearer token for the server
    #[arg(long, global = true, env = "DATEBOOK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Path to a config file
    #[arg(long, global = true, env = "DATEBOOK_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List events for a date or range
    Events(EventsArgs),
    /// List postponed entries
    Backlog {
        /// Only this partition
        #[arg(long)]
        view: Option<PostponedView>,
        #[arg(long, default_value = "time")]
        sort: SortMode,
    },
    /// Add a single event, or a backlog entry with --backlog
    Add(AddArgs),
    /// Edit an event in place
    Edit(EditArgs),
    /// Delete an event or a backlog entry
    Delete {
        #[arg(long)]
        id: String,
        /// The id refers to a backlog entry
        #[arg(long)]
        postponed: bool,
    },
    /// Copy events to another date
    Copy(DateTransferArgs),
    /// Move events to another date
    Move(DateTransferArgs),
    /// Shelve events into the backlog
    Postpone {
        #[arg(long = "id", required = true)]
        ids: Vec<String>,
        #[arg(long, default_value = "week")]
        view: PostponedView,
        #[arg(long, value_enum, default_value_t = PolicyArg::Move)]
        policy: PolicyArg,
    },
    /// Put backlog entries back on the calendar
    Reactivate {
        #[arg(long = "id", required = true)]
        ids: Vec<String>,
        #[arg(long)]
        to: NaiveDate,
        #[arg(long, value_enum, default_value_t = PolicyArg::Move)]
        policy: PolicyArg,
    },
    /// Move backlog entries between partitions
    Repostpone {
        #[arg(long = "id", required = true)]
        ids: Vec<String>,
        #[arg(long)]
        view: PostponedView,
        #[arg(long, value_enum, default_value_t = PolicyArg::Move)]
        policy: PolicyArg,
    },
    /// Add the same event to every day of a range
    AddRange(AddRangeArgs),
    /// Print a month grid (works offline)
    Grid {
        /// Month as YYYY-MM, defaults to the current month
        #[arg(long, value_parser = parse_month)]
        month: Option<(i32, u32)>,
        #[arg(long, default_value = "mon")]
        week_start: Weekday,
    },
    /// Keep syncing and print each refresh as a JSON line
    Watch {
        /// Seconds between refreshes (overrides the config file)
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[derive(Args)]
pub struct EventsArgs {
    /// First day, defaults to today
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day, defaults to --from
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Show a friend's calendar instead
    #[arg(long)]
    pub friend: Option<String>,
    #[arg(long, default_value = "time")]
    pub sort: SortMode,
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,
    /// Required unless --backlog is given
    #[arg(long, required_unless_present = "backlog")]
    pub date: Option<NaiveDate>,
    /// Add to this backlog partition instead of a date
    #[arg(long, conflicts_with = "date")]
    pub backlog: Option<PostponedView>,
    #[command(flatten)]
    pub details: DetailArgs,
}

#[derive(Args)]
pub struct DetailArgs {
    /// Start time, e.g. 09:30
    #[arg(long)]
    pub time: Option<String>,
    #[arg(long)]
    pub priority: Option<i64>,
    #[arg(long)]
    pub note: Option<String>,
    #[arg(long)]
    pub link: Option<String>,
    /// Keep the event hidden until this date
    #[arg(long)]
    pub unlock: Option<NaiveDate>,
}

#[derive(Args)]
pub struct EditArgs {
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long, conflicts_with = "clear_time")]
    pub time: Option<String>,
    #[arg(long)]
    pub clear_time: bool,
    #[arg(long, conflicts_with = "clear_priority")]
    pub priority: Option<i64>,
    #[arg(long)]
    pub clear_priority: bool,
    #[arg(long, conflicts_with = "clear_note")]
    pub note: Option<String>,
    #[arg(long)]
    pub clear_note: bool,
    #[arg(long)]
    pub link: Option<String>,
    #[arg(long)]
    pub unlock: Option<NaiveDate>,
}

#[derive(Args)]
pub struct DateTransferArgs {
    #[arg(long = "id", required = true)]
    pub ids: Vec<String>,
    #[arg(long)]
    pub to: NaiveDate,
}

#[derive(Args)]
pub struct AddRangeArgs {
    #[arg(long)]
    pub from: NaiveDate,
    #[arg(long)]
    pub to: NaiveDate,
    #[arg(long)]
    pub title: String,
    #[command(flatten)]
    pub details: DetailArgs,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    Copy,
    Move,
}

impl From<PolicyArg> for TransferPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Copy => TransferPolicy::Copy,
            PolicyArg::Move => TransferPolicy::Move,
        }
    }
}

fn parse_month(value: &str) -> Result<(i32, u32), String> {
    let invalid = || format!("Invalid month '{value}'. Expected YYYY-MM (e.g., 2025-02)");
    let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2025-02"), Ok((2025, 2)));
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("Feb").is_err());
    }
}
