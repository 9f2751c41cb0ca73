use async_trait::async_trait;

use crate::events::Event;

/// Receives every event published on the bus, in delivery order.
///
/// Implementations should return quickly; a slow observer lags the bus and
/// skips old events, it never blocks the pumps or the scheduler.
#[async_trait]
pub trait Observe: Send + Sync + 'static {
    /// Called once per observed event.
    async fn on_event(&self, event: &Event);
}
