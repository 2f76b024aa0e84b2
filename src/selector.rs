//! Hub-selection policy.

/// Strategy seam for choosing the target hub from the enrollment's linked
/// hubs. Alternate policies (load-based, geo-based, round-robin) plug in
/// here without touching the handler's control flow.
pub trait HubSelector: Send + Sync {
    /// Choose a hub from a non-empty, ordered candidate list.
    fn select<'a>(&self, hubs: &'a [String]) -> &'a str;
}

/// Placeholder policy: always the first linked hub.
pub struct FirstHubSelector;

impl HubSelector for FirstHubSelector {
    fn select<'a>(&self, hubs: &'a [String]) -> &'a str {
        &hubs[0]
    }
}
