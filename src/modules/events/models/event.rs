// Events driving the payment, prompt and payment link lifecycles.
//
// Each variant carries exactly the payload its handler needs, so the
// dispatcher matches exhaustively instead of inspecting untyped payloads.

use serde::{Deserialize, Serialize};

use crate::core::entity::generate_id;
use crate::core::{AppError, Result, TenancyContext};
use crate::modules::payment_links::PaymentLink;
use crate::modules::payments::{Cost, Direction, Payment};
use crate::modules::prompts::Prompt;
use crate::modules::statuses::Status;

pub const COST_SAVE: &str = "cost.save";
pub const PAYMENT_SAVE: &str = "payment.save";
pub const PAYMENT_IN_ROUTE: &str = "payment.in.route";
pub const PAYMENT_OUT_ROUTE: &str = "payment.out.route";
pub const PAYMENT_IN_QUEUE: &str = "payment.in.queue";
pub const PAYMENT_OUT_QUEUE: &str = "payment.out.queue";
pub const STATUS_SAVE: &str = "status.save";
pub const PROMPT_SAVE: &str = "prompt.save";
pub const PAYMENT_LINK_SAVE: &str = "payment_link.save";

/// Topics consumed by the gateway integration, outside this service
pub const INITIATE_PROMPT: &str = "initiate.prompt";
pub const CREATE_PAYMENT_LINK: &str = "create.payment.link";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "payload")]
pub enum Event {
    #[serde(rename = "cost.save")]
    CostSave(Cost),

    #[serde(rename = "payment.save")]
    PaymentSave(Payment),

    #[serde(rename = "payment.in.route")]
    PaymentInRoute { payment_id: String },

    #[serde(rename = "payment.out.route")]
    PaymentOutRoute { payment_id: String },

    #[serde(rename = "payment.in.queue")]
    PaymentInQueue { payment_id: String },

    #[serde(rename = "payment.out.queue")]
    PaymentOutQueue { payment_id: String },

    #[serde(rename = "status.save")]
    StatusSave(Status),

    #[serde(rename = "prompt.save")]
    PromptSave(Prompt),

    #[serde(rename = "payment_link.save")]
    PaymentLinkSave(PaymentLink),
}

impl Event {
    pub fn route(direction: Direction, payment_id: impl Into<String>) -> Self {
        let payment_id = payment_id.into();
        match direction {
            Direction::Inbound => Event::PaymentInRoute { payment_id },
            Direction::Outbound => Event::PaymentOutRoute { payment_id },
        }
    }

    pub fn queue(direction: Direction, payment_id: impl Into<String>) -> Self {
        let payment_id = payment_id.into();
        match direction {
            Direction::Inbound => Event::PaymentInQueue { payment_id },
            Direction::Outbound => Event::PaymentOutQueue { payment_id },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::CostSave(_) => COST_SAVE,
            Event::PaymentSave(_) => PAYMENT_SAVE,
            Event::PaymentInRoute { .. } => PAYMENT_IN_ROUTE,
            Event::PaymentOutRoute { .. } => PAYMENT_OUT_ROUTE,
            Event::PaymentInQueue { .. } => PAYMENT_IN_QUEUE,
            Event::PaymentOutQueue { .. } => PAYMENT_OUT_QUEUE,
            Event::StatusSave(_) => STATUS_SAVE,
            Event::PromptSave(_) => PROMPT_SAVE,
            Event::PaymentLinkSave(_) => PAYMENT_LINK_SAVE,
        }
    }

    /// Id of the entity whose lifecycle the event advances
    ///
    /// Costs travel with their payment so both land on the same queue shard.
    pub fn entity_key(&self) -> &str {
        match self {
            Event::CostSave(cost) if !cost.payment_id.is_empty() => cost.payment_id.as_str(),
            Event::CostSave(cost) => cost.meta.id.as_str(),
            Event::PaymentSave(payment) => payment.meta.id.as_str(),
            Event::PaymentInRoute { payment_id }
            | Event::PaymentOutRoute { payment_id }
            | Event::PaymentInQueue { payment_id }
            | Event::PaymentOutQueue { payment_id } => payment_id.as_str(),
            Event::StatusSave(status) => status.entity_id.as_str(),
            Event::PromptSave(prompt) => prompt.meta.id.as_str(),
            Event::PaymentLinkSave(link) => link.meta.id.as_str(),
        }
    }

    /// Reject payloads no handler could act on
    pub fn validate(&self) -> Result<()> {
        let id_field: &str = match self {
            Event::CostSave(cost) => &cost.meta.id,
            Event::PaymentSave(payment) => &payment.meta.id,
            Event::PaymentInRoute { payment_id }
            | Event::PaymentOutRoute { payment_id }
            | Event::PaymentInQueue { payment_id }
            | Event::PaymentOutQueue { payment_id } => payment_id,
            Event::StatusSave(status) => &status.entity_id,
            Event::PromptSave(prompt) => &prompt.meta.id,
            Event::PaymentLinkSave(link) => &link.meta.id,
        };

        if id_field.trim().is_empty() {
            return Err(AppError::invalid_argument(format!(
                "{} event without an id",
                self.name()
            )));
        }

        Ok(())
    }
}

/// An event in flight, with the tenancy of the call that caused it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: String,
    pub context: TenancyContext,
    pub event: Event,
}

impl EventEnvelope {
    /// Wrap a validated event
    pub fn new(context: TenancyContext, event: Event) -> Result<Self> {
        event.validate()?;
        Ok(Self {
            id: generate_id(),
            context,
            event,
        })
    }

    pub fn name(&self) -> &'static str {
        self.event.name()
    }
}

/// Payload published on the external gateway topics
#[derive(Serialize)]
pub struct ExternalEvent<'a, T: Serialize> {
    pub name: &'a str,
    pub context: &'a TenancyContext,
    pub payload: &'a T,
}
