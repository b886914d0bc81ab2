use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Fulfilment states an order moves through. `Cancelled` is reachable from
/// any non-terminal state; `Delivered` and `Cancelled` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// The customer-facing progression, in timeline order.
pub const PROGRESSION: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
];

impl OrderStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "processing" => Some(Self::Processing),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    fn progression_index(&self) -> Option<usize> {
        PROGRESSION.iter().position(|s| s == self)
    }

    /// Whether an admin-driven move from `self` to `next` is legal.
    /// Forward jumps along the progression may skip states; backward and
    /// same-state moves are rejected, as is any move out of a terminal state.
    pub fn can_transition(&self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == OrderStatus::Cancelled {
            return true;
        }
        match (self.progression_index(), next.progression_index()) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TimelineStep {
    pub status: OrderStatus,
    pub completed: bool,
}

/// Derive the progress timeline shown to customers: every state up to and
/// including the current one is completed. A cancelled order only keeps its
/// initial `pending` step completed.
pub fn timeline(current: OrderStatus) -> Vec<TimelineStep> {
    let reached = match current {
        OrderStatus::Cancelled => 0,
        other => other.progression_index().unwrap_or(0),
    };
    PROGRESSION
        .iter()
        .enumerate()
        .map(|(idx, status)| TimelineStep {
            status: *status,
            completed: idx <= reached,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_timeline_completes_everything_up_to_shipped() {
        let steps = timeline(OrderStatus::Shipped);
        let completed: Vec<OrderStatus> = steps
            .iter()
            .filter(|s| s.completed)
            .map(|s| s.status)
            .collect();
        assert_eq!(
            completed,
            vec![
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                OrderStatus::Processing,
                OrderStatus::Shipped
            ]
        );
        assert!(!steps[4].completed);
    }

    #[test]
    fn cancelled_timeline_only_keeps_pending() {
        let steps = timeline(OrderStatus::Cancelled);
        assert!(steps[0].completed);
        assert!(steps[1..].iter().all(|s| !s.completed));
    }

    #[test]
    fn forward_jumps_are_legal_backward_moves_are_not() {
        assert!(OrderStatus::Pending.can_transition(OrderStatus::Processing));
        assert!(OrderStatus::Pending.can_transition(OrderStatus::Delivered));
        assert!(OrderStatus::Processing.can_transition(OrderStatus::Shipped));
        assert!(!OrderStatus::Shipped.can_transition(OrderStatus::Pending));
        assert!(!OrderStatus::Confirmed.can_transition(OrderStatus::Confirmed));
    }

    #[test]
    fn cancelled_is_reachable_from_non_terminal_states_only() {
        assert!(OrderStatus::Pending.can_transition(OrderStatus::Cancelled));
        assert!(OrderStatus::Shipped.can_transition(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition(OrderStatus::Pending));
    }

    #[test]
    fn parse_round_trips_every_state() {
        for status in PROGRESSION.iter().chain([OrderStatus::Cancelled].iter()) {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(*status));
        }
        assert_eq!(OrderStatus::parse("paid"), None);
    }
}
