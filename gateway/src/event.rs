use api_types::MessageObject;

/// One item of the stream contract exposed to `StreamMessages`: event
/// type, the affected message, and a millisecond timestamp.
#[derive(Debug, Clone)]
pub struct StreamEvent {
    pub event_type: EventType,
    pub message: MessageObject,
    pub timestamp_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Create,
    Update,
    Delete,
}
