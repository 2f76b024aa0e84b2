//! Twin resolution: reuse, supersede, or create the device's twin record.

use std::collections::HashMap;

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::twin_store::{TwinStore, TwinStoreError};

/// Baseline contents written to a freshly created (or superseded) twin.
fn default_contents() -> HashMap<String, Value> {
    HashMap::from([("temperature".to_string(), json!(0.0))])
}

/// Resolve the twin for `registration_id` and return its id.
///
/// An existing twin whose model id matches `model_id` (case-insensitive) is
/// reused as-is. A twin with a different model id, or no twin at all, leads
/// to a single create-or-replace with `model_id` and the default contents.
///
/// The overwrite carries no concurrency precondition: two resolvers racing
/// on the same registration id can clobber each other's twin. The store
/// exposes an if-absent guard, but the provisioning flow tolerates the race.
pub async fn resolve(
    store: &dyn TwinStore,
    model_id: &str,
    registration_id: &str,
) -> Result<String, TwinStoreError> {
    match store.get(registration_id).await {
        Ok(twin) if twin.model_id.eq_ignore_ascii_case(model_id) => {
            info!(twin_id = %twin.id, "reusing existing twin");
            return Ok(twin.id);
        }
        Ok(twin) => {
            warn!(
                twin_id = %twin.id,
                stored_model = %twin.model_id,
                requested_model = %model_id,
                "model id mismatch, superseding twin"
            );
        }
        Err(TwinStoreError::NotFound(_)) => {
            info!(registration_id, "no twin found, creating");
        }
        Err(e) => return Err(e),
    }

    let twin = store
        .create_or_replace(registration_id, model_id, default_contents())
        .await?;

    Ok(twin.id)
}
