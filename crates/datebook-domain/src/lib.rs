pub mod calendar;
pub mod date_selection;
pub mod event;
pub mod field_update;
pub mod lineage;
pub mod normalize;
pub mod patch;
pub mod sort;

pub use calendar::{format_date, format_display, month_grid, parse_date, week_bounds, DateRange};
pub use date_selection::{DateSelection, SelectionPhase};
pub use event::{
    DisplayEvent, Event, EventDraft, EventId, FriendMeta, PostponedEntry, PostponedView,
    Schedulable,
};
pub use field_update::FieldUpdate;
pub use normalize::{normalize_priority, normalize_time, PriorityInput};
pub use patch::{EventPatch, EventUpdate};
pub use sort::{sort_items, SortBy, SortMode};
