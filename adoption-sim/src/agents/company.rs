use tracing::debug;

use crate::agents::Agent;
use crate::communication::AdvertisementScheme;
use crate::context::SimulationContext;
use crate::error::SimResult;
use crate::messages::{AgentId, Message};
use crate::product::ProductId;

/// Agent that owns a product portfolio and advertises it to consumers.
#[derive(Debug)]
pub struct CompanyAgent {
    id: AgentId,
    name: String,
    portfolio: Vec<ProductId>,
    advertisement: AdvertisementScheme,
}

impl CompanyAgent {
    pub fn new(
        id: AgentId,
        name: impl Into<String>,
        portfolio: Vec<ProductId>,
        advertisement: AdvertisementScheme,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            portfolio,
            advertisement,
        }
    }

    /// Schedule this step's advertisement messages. Returns how many were scheduled.
    pub fn advertise(&mut self, ctx: &mut SimulationContext) -> SimResult<usize> {
        let view = CompanyView {
            id: self.id,
            portfolio: &self.portfolio,
        };
        self.advertisement.advertise_product_portfolio(&view, ctx)
    }
}

/// Read-only sender data handed to message schemes.
#[derive(Debug, Clone, Copy)]
pub struct CompanyView<'a> {
    pub id: AgentId,
    pub portfolio: &'a [ProductId],
}

impl Agent for CompanyAgent {
    fn id(&self) -> AgentId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn on_message(&mut self, msg: &Message) {
        debug!(company = self.id, from = msg.from, kind = %msg.msg_type(), "company ignores message");
    }
}
