use crate::error::BoardError;

/// Channel sizing for the board coordinator and the pieces it tracks.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Capacity of the board coordinator's mailbox. Relays and clients block
    /// once it is full. Default: 64.
    pub board_mailbox_capacity: usize,
    /// Capacity of each piece actor's mailbox. Default: 16.
    pub piece_mailbox_capacity: usize,
    /// Capacity of the coordinate-change stream between a piece and its
    /// relay. Default: 16.
    pub move_subscription_capacity: usize,
    /// Capacity of the stream answering an enumeration request. The default
    /// of 1 hands over one piece handle at a time.
    pub enumeration_capacity: usize,
    /// Capacity of the board event broadcast. Slow subscribers lag and skip
    /// events past this point. Default: 256.
    pub event_capacity: usize,
}

impl BoardConfig {
    /// Validate configuration values.
    ///
    /// Every capacity must be at least 1: a zero-capacity tokio channel
    /// cannot be constructed.
    pub fn validate(&self) -> Result<(), BoardError> {
        let capacities = [
            ("board_mailbox_capacity", self.board_mailbox_capacity),
            ("piece_mailbox_capacity", self.piece_mailbox_capacity),
            ("move_subscription_capacity", self.move_subscription_capacity),
            ("enumeration_capacity", self.enumeration_capacity),
            ("event_capacity", self.event_capacity),
        ];
        for (name, value) in capacities {
            if value == 0 {
                return Err(BoardError::InvalidConfig {
                    reason: format!("{name} must be >= 1"),
                });
            }
        }
        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            board_mailbox_capacity: 64,
            piece_mailbox_capacity: 16,
            move_subscription_capacity: 16,
            enumeration_capacity: 1,
            event_capacity: 256,
        }
    }
}
