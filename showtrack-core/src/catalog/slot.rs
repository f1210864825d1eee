use tokio_util::sync::CancellationToken;

/// Per-representation in-flight slot: at most one owned fetch; starting a
/// new one cancels and replaces the old.
#[derive(Debug, Default)]
pub struct FetchSlot {
    generation: u64,
    active: Option<ActiveFetch>,
}

#[derive(Debug)]
struct ActiveFetch {
    generation: u64,
    token: CancellationToken,
}

/// Handle held by the task that owns the slot.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    generation: u64,
    token: CancellationToken,
}

impl FetchTicket {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl FetchSlot {
    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    pub fn begin(&mut self) -> FetchTicket {
        self.cancel();
        self.generation = self.generation.wrapping_add(1);
        let token = CancellationToken::new();
        self.active = Some(ActiveFetch {
            generation: self.generation,
            token: token.clone(),
        });
        FetchTicket {
            generation: self.generation,
            token,
        }
    }

    /// Cancel the owned fetch, if any. Returns whether one was running.
    pub fn cancel(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                active.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Whether `ticket` still owns the slot and may mutate the cursor.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        !ticket.is_cancelled()
            && self
                .active
                .as_ref()
                .is_some_and(|active| active.generation == ticket.generation)
    }

    /// Release the slot if `ticket` still owns it.
    pub fn finish(&mut self, ticket: &FetchTicket) {
        if self
            .active
            .as_ref()
            .is_some_and(|active| active.generation == ticket.generation)
        {
            self.active = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_cancels_previous_owner() {
        let mut slot = FetchSlot::default();
        let first = slot.begin();
        let second = slot.begin();

        assert!(first.is_cancelled());
        assert!(!slot.is_current(&first));
        assert!(slot.is_current(&second));
    }

    #[test]
    fn stale_finish_does_not_release_new_owner() {
        let mut slot = FetchSlot::default();
        let first = slot.begin();
        let second = slot.begin();

        slot.finish(&first);
        assert!(slot.is_busy());
        slot.finish(&second);
        assert!(!slot.is_busy());
    }

    #[test]
    fn cancel_reports_whether_anything_ran() {
        let mut slot = FetchSlot::default();
        assert!(!slot.cancel());
        let ticket = slot.begin();
        assert!(slot.cancel());
        assert!(ticket.is_cancelled());
        assert!(!slot.is_busy());
    }
}
