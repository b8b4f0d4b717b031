/// Numbers AI requests for one session and decides which responses are
/// still wanted. Only the most recently issued request may be shown.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: u64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new request id. Ids start at 1 and only increase.
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_latest(&self, request_id: u64) -> bool {
        request_id != 0 && request_id == self.latest
    }

    #[cfg(test)]
    pub fn latest(&self) -> Option<u64> {
        (self.latest != 0).then_some(self.latest)
    }
}
