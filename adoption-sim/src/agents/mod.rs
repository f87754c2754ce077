use crate::messages::{AgentId, Message};

pub mod company;
pub mod consumer;

pub use company::CompanyAgent;
pub use consumer::{Adoption, ConsumerAgent};

pub trait Agent {
    fn id(&self) -> AgentId;
    fn name(&self) -> &str;

    fn on_message(&mut self, _msg: &Message) {}
}
