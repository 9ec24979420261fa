use crate::availability::SlotCatalog;
use chrono::Duration;
use std::path::PathBuf;

pub trait Configuration: Clone + Send + Sync + 'static {
    fn shop_name(&self) -> String;
    fn admin_password(&self) -> String;
    fn frontend_path(&self) -> PathBuf;
    fn bind_address(&self) -> String;
    fn database_url(&self) -> Option<String>;
    fn slot_catalog(&self) -> SlotCatalog;
    /// Same-day bookings must start at least this far in the future.
    fn booking_lead_time(&self) -> Duration;
}
