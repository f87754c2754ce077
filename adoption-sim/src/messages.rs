use std::fmt;

use crate::product::ProductId;

pub type AgentId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    AttributePerception,
    PreferenceIncrease,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::AttributePerception => f.write_str("attribute_perception"),
            MessageType::PreferenceIncrease => f.write_str("preference_increase"),
        }
    }
}

/// Observed value of one product attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePerceptionPayload {
    pub product: ProductId,
    pub attribute: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceIncreasePayload {
    pub preference: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessagePayload {
    AttributePerception(AttributePerceptionPayload),
    PreferenceIncrease(PreferenceIncreasePayload),
}

/// Message travelling from one agent to another inside a communication event.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub from: AgentId,
    pub to: AgentId,
    pub payload: MessagePayload,
}

impl Message {
    pub fn new(from: AgentId, to: AgentId, payload: MessagePayload) -> Self {
        Self { from, to, payload }
    }

    pub fn attribute_perception(
        from: AgentId,
        to: AgentId,
        product: ProductId,
        attribute: impl Into<String>,
        value: f64,
    ) -> Self {
        Self::new(
            from,
            to,
            MessagePayload::AttributePerception(AttributePerceptionPayload {
                product,
                attribute: attribute.into(),
                value,
            }),
        )
    }

    pub fn preference_increase(
        from: AgentId,
        to: AgentId,
        preference: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self::new(
            from,
            to,
            MessagePayload::PreferenceIncrease(PreferenceIncreasePayload {
                preference: preference.into(),
                amount,
            }),
        )
    }

    pub fn msg_type(&self) -> MessageType {
        match self.payload {
            MessagePayload::AttributePerception(_) => MessageType::AttributePerception,
            MessagePayload::PreferenceIncrease(_) => MessageType::PreferenceIncrease,
        }
    }
}
