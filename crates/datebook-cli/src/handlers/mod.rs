pub mod entries;
pub mod timeline;
pub mod transfer;
pub mod watch;

use datebook_domain::EventId;

pub(crate) fn to_ids(ids: Vec<String>) -> Vec<EventId> {
    ids.into_iter().map(EventId::from).collect()
}

pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
