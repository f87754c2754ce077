use tracing::debug;

use crate::agents::company::CompanyView;
use crate::communication::message_scheme::MessageScheme;
use crate::context::SimulationContext;
use crate::error::SimResult;
use crate::events::Event;

/// Wraps one message scheme and schedules everything it produces.
#[derive(Debug)]
pub struct AdvertisementScheme {
    message_scheme: MessageScheme,
}

impl AdvertisementScheme {
    pub fn new(message_scheme: MessageScheme) -> Self {
        Self { message_scheme }
    }

    /// Advertisement that never sends anything.
    pub fn empty() -> Self {
        Self::new(MessageScheme::Empty)
    }

    /// Wrap every produced message into a communication event on the shared
    /// scheduler. Returns the number of events scheduled.
    pub fn advertise_product_portfolio(
        &mut self,
        sender: &CompanyView<'_>,
        ctx: &mut SimulationContext,
    ) -> SimResult<usize> {
        let messages = self.message_scheme.create_messages(sender, ctx)?;
        let at = self.message_scheme.delivery_time(ctx.now());
        let count = messages.len();
        for msg in messages {
            ctx.schedule_event(Event::communication(at, msg));
        }
        debug!(company = sender.id, messages = count, at, "portfolio advertised");
        Ok(count)
    }
}
