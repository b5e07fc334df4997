pub mod backlog;
pub mod cache;
pub mod store;
pub mod sync;
pub mod transfer;
pub mod transport;

pub use backlog::{PartitionState, Partitioned, PostponedBacklog, TransferTarget};
pub use cache::EventCache;
pub use store::{Refreshed, Store, ViewContext};
pub use sync::{SyncEvent, SyncHandle, SyncLoop, SyncOutcome, SyncScope, SyncTrigger};
pub use transfer::{
    Batch, FailedDelete, SourceRef, TransferPlan, TransferPolicy, TransferReport,
};
pub use transport::{EventTransport, HttpTransport};
