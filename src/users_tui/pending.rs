//! Per-control pending state for create and delete actions

/// Lifecycle of one mutation issued by a control.
///
/// `Idle -> Mutating -> Refreshing { seq } -> Idle`, or `Mutating -> Idle`
/// when the mutation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingFlag {
    #[default]
    Idle,
    /// The create/delete call is in flight
    Mutating,
    /// The mutation succeeded; waiting for the list fetch `seq` to settle
    Refreshing { seq: u64 },
}

impl PendingFlag {
    pub fn is_pending(&self) -> bool {
        !matches!(self, PendingFlag::Idle)
    }

    /// Enter the pending state. Returns `false` if already pending.
    pub fn begin(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        *self = PendingFlag::Mutating;
        true
    }

    /// The mutation succeeded and the follow-up fetch `seq` was started
    pub fn await_refresh(&mut self, seq: u64) {
        *self = PendingFlag::Refreshing { seq };
    }

    /// A list fetch was applied; leave the pending state if it was ours or newer
    pub fn settle_refresh(&mut self, settled_seq: u64) -> bool {
        match *self {
            PendingFlag::Refreshing { seq } if settled_seq >= seq => {
                *self = PendingFlag::Idle;
                true
            }
            _ => false,
        }
    }

    /// Drop back to idle, e.g. after a failed mutation
    pub fn reset(&mut self) {
        *self = PendingFlag::Idle;
    }
}
