//! Discovery Filter
//!
//! Service-UUID interest set applied to every advertisement the GAP engine
//! reports. Three states: unset (no scan session, every report dropped),
//! empty (accept everything), non-empty (accept on intersection with the
//! advertised UUID union).

use std::collections::HashSet;

use crate::domain::models::Advertisement;

#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    interest: Option<HashSet<String>>,
}

impl ScanFilter {
    /// Arms the filter for a scan session. An empty list accepts every
    /// discovered peripheral.
    pub fn set(&mut self, service_uuids: Vec<String>) {
        self.interest = Some(service_uuids.into_iter().collect());
    }

    /// Returns the filter to the unset state; discovery reports are dropped
    /// until the next scan session arms it again.
    pub fn clear(&mut self) {
        self.interest = None;
    }

    pub fn is_active(&self) -> bool {
        self.interest.is_some()
    }

    /// Whether an advertisement passes the interest set. Unset never
    /// accepts; callers that want to distinguish "no session" from
    /// "rejected" check [`is_active`](Self::is_active) first.
    pub fn accepts(&self, advertisement: &Advertisement) -> bool {
        match &self.interest {
            None => false,
            Some(interest) if interest.is_empty() => true,
            Some(interest) => advertisement
                .advertised_uuids()
                .any(|uuid| interest.contains(uuid)),
        }
    }
}
