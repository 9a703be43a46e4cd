//! Live sync - ordered fan-out of ledger deltas and the dashboard reducer.

mod broadcaster;
mod dashboard_view;
mod subscription;
mod sync_model;


pub use broadcaster::LiveSyncBroadcaster;
pub use dashboard_view::{ApplyOutcome, DashboardView};
pub use subscription::Subscription;
pub use sync_model::{DeltaPayload, SyncDelta, SyncDeltaType, SyncMessage};
