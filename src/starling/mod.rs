pub mod client;

use crate::core::item::RawItem;
use crate::error::Result;

/// The query interface over the Starling action-items index. `extra` names
/// optional heavy fields (e.g. `body`) to include in the response.
pub trait ItemSource {
    fn action_items(&self, extra: &[String]) -> Result<Vec<RawItem>>;
}

pub use client::StarlingClient;
