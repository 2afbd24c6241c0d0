pub mod gateway;
pub mod relay;
pub mod outbox;

pub use gateway::NotificationGateway;
pub use relay::MailRelayGateway;
pub use outbox::OutboxGateway;
