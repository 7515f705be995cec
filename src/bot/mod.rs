/// Update routing
pub mod dispatch;
/// Command and message handlers
pub mod handlers;
/// Outbound messaging
pub mod messaging;
