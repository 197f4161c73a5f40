pub mod coordinator;
pub mod message;
pub mod transport;
pub mod worker;

pub use {
    coordinator::Coordinator,
    message::{Message, Rank, Task, TaskResult, COORDINATOR},
    transport::{create_group, Endpoint, ProtocolError, TransportResult},
    worker::Worker,
};
