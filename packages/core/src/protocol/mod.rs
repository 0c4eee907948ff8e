// Протокол: сообщения, формат передачи и транспорт

pub mod messages;
pub mod transport;
pub mod validation;
pub mod wire;

pub use messages::{Message, MessageContent, MessageKind, Payload, TransportFrame};
pub use transport::{loopback, LoopbackReceiver, LoopbackTransport, Transport};
