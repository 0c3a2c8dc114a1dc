// Coordination layer
// Message passing and shared knowledge between agents, evaluated once per tick

pub mod hub;
pub mod knowledge;
pub mod message;
pub mod shared;

pub use hub::{CoordinationHub, HubStats};
pub use knowledge::{KnowledgeEntry, KnowledgeKey, SharedKnowledge};
pub use message::{Message, MessageKind, MessagePayload, MessageSender, Tactic};
pub use shared::SharedHub;
