//! Topic names on the message bus

/// Single messages to classify
pub const INCOMING: &str = "messages/incoming";

/// Batches of messages to classify
pub const BATCH: &str = "messages/batch";

/// Every classified single message, merged with its result
pub const CLASSIFIED: &str = "messages/classified";

/// Original payloads classified as spam
pub const SPAM: &str = "messages/spam";

/// Original payloads classified as ham
pub const HAM: &str = "messages/ham";

/// Batch prediction responses
pub const BATCH_RESULTS: &str = "messages/batch_results";

/// Failures on the single-message path
pub const ERROR: &str = "messages/error";

/// Topics the router subscribes to after every connect
pub const SUBSCRIPTIONS: [&str; 2] = [INCOMING, BATCH];
