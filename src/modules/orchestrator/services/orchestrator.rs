use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::super::models::{
    PaymentLinkRequest, PaymentRequest, PromptRequest, SearchRequest, SearchResult,
    StatusUpdateRequest,
};
use crate::core::reference::new_transaction_reference;
use crate::core::{Amount, AppError, EntityMeta, Extras, Result, TenancyContext};
use crate::modules::events::{Event, EventBus};
use crate::modules::payment_links::PaymentLink;
use crate::modules::payments::{Cost, Direction, Payment, PaymentRepository};
use crate::modules::prompts::models::{
    EXTRA_CURRENCY, EXTRA_PAYER_CONTACT, EXTRA_TRANSACTION_REF,
};
use crate::modules::prompts::Prompt;
use crate::modules::statuses::{
    EntityType, State, Status, StatusCode, StatusResponse, StatusTracker,
};

/// Extras key recording why a payment left the lifecycle early
pub const EXTRA_OUTCOME: &str = "outcome";

pub const OUTCOME_CANCELED: &str = "canceled";

const COST_DESCRIPTION: &str = "transaction cost";

/// Entry point for callers: validates requests, records the initial status
/// and hands entities to the event chain
///
/// Entities are never mutated here directly; every change travels through a
/// `*.save` event.
pub struct Orchestrator {
    payments: Arc<dyn PaymentRepository>,
    statuses: StatusTracker,
    bus: Arc<dyn EventBus>,
}

impl Orchestrator {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        statuses: StatusTracker,
        bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            payments,
            statuses,
            bus,
        }
    }

    /// Send a payment out of the system
    pub async fn send(
        &self,
        ctx: &TenancyContext,
        request: PaymentRequest,
    ) -> Result<StatusResponse> {
        let outbound = request.outbound.unwrap_or(true);
        self.submit(ctx, request, outbound).await
    }

    /// Accept a payment into the system
    pub async fn receive(
        &self,
        ctx: &TenancyContext,
        request: PaymentRequest,
    ) -> Result<StatusResponse> {
        self.submit(ctx, request, false).await
    }

    async fn submit(
        &self,
        ctx: &TenancyContext,
        request: PaymentRequest,
        outbound: bool,
    ) -> Result<StatusResponse> {
        let amount = Amount::from_wire(request.amount.as_ref())?;
        let cost_amount = Amount::from_wire(request.cost.as_ref())?;

        let meta = EntityMeta::new(request.id, ctx);
        let payment_id = meta.id.clone();

        let cost = cost_amount.map(|amount| Cost {
            meta: EntityMeta::new(None, ctx),
            payment_id: payment_id.clone(),
            amount: Some(amount),
            description: COST_DESCRIPTION.to_string(),
            extras: Extras::new(),
        });

        let payment = Payment {
            meta,
            sender: request.sender,
            recipient: request.recipient,
            amount,
            cost_ids: cost.iter().map(|c| c.meta.id.clone()).collect(),
            reference_id: request.reference_id,
            batch_id: request.batch_id,
            transaction_id: request.transaction_id,
            route_id: request.route_id.filter(|id| !id.trim().is_empty()),
            outbound,
            released_at: None,
            cancelled_at: None,
            extras: request.extras,
        };

        let status = self
            .statuses
            .record(
                ctx,
                &payment_id,
                EntityType::Payment,
                State::Created,
                StatusCode::Queued,
                Extras::new(),
            )
            .await?;

        if let Some(cost) = cost {
            self.bus.emit(ctx, Event::CostSave(cost)).await?;
        }
        self.bus.emit(ctx, Event::PaymentSave(payment)).await?;

        let direction = if outbound {
            Direction::Outbound
        } else {
            Direction::Inbound
        };
        info!(payment_id = %payment_id, direction = %direction, "Payment accepted");

        Ok(status.into())
    }

    /// Current status of an entity owned by the caller's tenancy scope
    pub async fn status(
        &self,
        ctx: &TenancyContext,
        entity_id: &str,
        entity_type: &str,
    ) -> Result<StatusResponse> {
        let entity_type: EntityType = entity_type.parse()?;
        let status = self.statuses.get_current(ctx, entity_id, entity_type).await?;
        Ok(status.into())
    }

    /// Overwrite an entity's status on behalf of an external collaborator
    ///
    /// Supplied extras are merged over the current ones.
    pub async fn status_update(
        &self,
        ctx: &TenancyContext,
        request: StatusUpdateRequest,
    ) -> Result<StatusResponse> {
        let entity_type: EntityType = request.entity_type.parse()?;
        if request.id.trim().is_empty() {
            return Err(AppError::invalid_argument("id is required"));
        }

        let current = self
            .statuses
            .get_current(ctx, &request.id, entity_type)
            .await?;
        let mut extras = current.extras;
        extras.extend(request.extras);

        let status = self
            .statuses
            .record(ctx, &request.id, entity_type, request.state, request.status, extras)
            .await?;

        info!(
            entity_id = %request.id,
            entity_type = %entity_type,
            state = %request.state,
            status = %request.status,
            "Status updated"
        );
        Ok(status.into())
    }

    /// Release an outbound payment for routing
    ///
    /// Releasing twice returns the current status without starting another
    /// routing chain.
    pub async fn release(
        &self,
        ctx: &TenancyContext,
        payment_id: &str,
    ) -> Result<StatusResponse> {
        let mut payment = self.outbound_payment(ctx, payment_id).await?;
        let current = self.current_status(ctx, payment_id).await?;

        if was_cancelled(&payment, current.as_ref()) {
            return Err(AppError::failed_precondition(format!(
                "Payment '{}' was cancelled",
                payment_id
            )));
        }

        if was_released(&payment, current.as_ref()) {
            info!(payment_id = %payment_id, "Payment already released");
            return current.map(StatusResponse::from).ok_or_else(|| {
                AppError::not_found(format!("Status for payment '{}' not found", payment_id))
            });
        }

        payment.release();
        let status = self
            .statuses
            .record(
                ctx,
                payment_id,
                EntityType::Payment,
                State::Active,
                StatusCode::Queued,
                Extras::new(),
            )
            .await?;
        self.bus.emit(ctx, Event::PaymentSave(payment)).await?;

        info!(payment_id = %payment_id, "Payment released");
        Ok(status.into())
    }

    /// Cancel an outbound payment that has not been released
    pub async fn cancel(
        &self,
        ctx: &TenancyContext,
        payment_id: &str,
    ) -> Result<StatusResponse> {
        let mut payment = self.outbound_payment(ctx, payment_id).await?;
        let current = self.current_status(ctx, payment_id).await?;

        if was_released(&payment, current.as_ref()) {
            return Err(AppError::failed_precondition(format!(
                "Payment '{}' was already released",
                payment_id
            )));
        }
        if was_cancelled(&payment, current.as_ref()) {
            return Err(AppError::failed_precondition(format!(
                "Payment '{}' was already cancelled",
                payment_id
            )));
        }

        payment.cancel();
        let mut extras = Extras::new();
        extras.insert(EXTRA_OUTCOME.to_string(), OUTCOME_CANCELED.to_string());
        let status = self
            .statuses
            .record(
                ctx,
                payment_id,
                EntityType::Payment,
                State::Inactive,
                StatusCode::Failed,
                extras,
            )
            .await?;
        self.bus.emit(ctx, Event::PaymentSave(payment)).await?;

        info!(payment_id = %payment_id, "Payment cancelled");
        Ok(status.into())
    }

    async fn outbound_payment(&self, ctx: &TenancyContext, payment_id: &str) -> Result<Payment> {
        let payment = self.payments.get_scoped(ctx, payment_id).await?;
        if !payment.outbound {
            return Err(AppError::failed_precondition(format!(
                "Payment '{}' is inbound",
                payment_id
            )));
        }
        Ok(payment)
    }

    async fn current_status(
        &self,
        ctx: &TenancyContext,
        payment_id: &str,
    ) -> Result<Option<Status>> {
        match self
            .statuses
            .get_current(ctx, payment_id, EntityType::Payment)
            .await
        {
            Ok(status) => Ok(Some(status)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Stream payments matching the request, each joined with its status
    ///
    /// Only payments owned by the caller's tenancy scope are visible. An
    /// exact id that matches nothing fails with `NotFound`; a text query that
    /// matches nothing sends nothing. Results stop early when the receiver
    /// goes away.
    pub async fn search(
        &self,
        ctx: &TenancyContext,
        request: SearchRequest,
        results: mpsc::Sender<SearchResult>,
    ) -> Result<()> {
        let payments = match request.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => vec![self.payments.get_scoped(ctx, &id).await?],
            None => {
                let query = request.query.unwrap_or_default();
                self.payments.search_scoped(ctx, &query).await?
            }
        };

        for payment in payments {
            let status = self
                .current_status(ctx, &payment.meta.id)
                .await?
                .map(StatusResponse::from);

            let payment_id = payment.meta.id.clone();
            if results.send(SearchResult { payment, status }).await.is_err() {
                warn!(payment_id = %payment_id, "Search receiver dropped, stopping");
                break;
            }
        }

        Ok(())
    }

    /// Ask a payer to authorise a payment on their device
    pub async fn initiate_prompt(
        &self,
        ctx: &TenancyContext,
        request: PromptRequest,
    ) -> Result<StatusResponse> {
        if request.recipient.contact_id.trim().is_empty() {
            return Err(AppError::invalid_argument("recipient contact_id is required"));
        }
        if request.account.account_number.trim().is_empty()
            || request.account.country_code.trim().is_empty()
        {
            return Err(AppError::invalid_argument(
                "account number and country code are required",
            ));
        }

        let amount = Amount::from_wire(request.amount.as_ref())?;
        let currency = amount
            .as_ref()
            .map(|a| a.currency.clone())
            .or_else(|| {
                request
                    .amount
                    .as_ref()
                    .map(|m| m.currency_code.trim().to_uppercase())
            })
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::invalid_argument("amount currency is required"))?;

        let reference = new_transaction_reference();
        let mut extras = request.extras;
        extras.insert(EXTRA_TRANSACTION_REF.to_string(), reference.clone());
        extras.insert(EXTRA_CURRENCY.to_string(), currency);
        extras.insert(EXTRA_PAYER_CONTACT.to_string(), request.recipient.contact_id.clone());

        let prompt = Prompt {
            meta: EntityMeta::new(request.id, ctx),
            source: request.source,
            recipient: request.recipient,
            amount,
            account_number: request.account.account_number.trim().to_string(),
            country_code: request.account.country_code.trim().to_uppercase(),
            account_name: request.account.name,
            account_id: None,
            device_id: request.device_id,
            extras,
        };
        let prompt_id = prompt.meta.id.clone();

        let mut status_extras = Extras::new();
        status_extras.insert(EXTRA_TRANSACTION_REF.to_string(), reference.clone());
        let status = self
            .statuses
            .record(
                ctx,
                &prompt_id,
                EntityType::Prompt,
                State::Created,
                StatusCode::Queued,
                status_extras,
            )
            .await?;
        self.bus.emit(ctx, Event::PromptSave(prompt)).await?;

        info!(prompt_id = %prompt_id, transaction_ref = %reference, "Prompt initiated");
        Ok(status.into())
    }

    /// Create a shareable payment link
    pub async fn create_payment_link(
        &self,
        ctx: &TenancyContext,
        request: PaymentLinkRequest,
    ) -> Result<StatusResponse> {
        let link = PaymentLink {
            meta: EntityMeta::new(request.id, ctx),
            name: request.name,
            description: request.description,
            amount: Amount::from_wire(request.amount.as_ref())?,
            open_amount: request.open_amount,
            sale_date: request.sale_date,
            expiry_date: request.expiry_date,
            customers: request.customers,
            notifications: request.notifications,
            external_reference: request.external_reference,
            extras: request.extras,
        };
        link.validate()?;
        let link_id = link.meta.id.clone();

        let status = self
            .statuses
            .record(
                ctx,
                &link_id,
                EntityType::PaymentLink,
                State::Created,
                StatusCode::Queued,
                Extras::new(),
            )
            .await?;
        self.bus.emit(ctx, Event::PaymentLinkSave(link)).await?;

        info!(payment_link_id = %link_id, "Payment link submitted");
        Ok(status.into())
    }
}

/// A release is visible on the payment once `payment.save` has run, and on
/// its status as soon as the release was recorded
fn was_released(payment: &Payment, current: Option<&Status>) -> bool {
    payment.is_released() || current.map_or(false, |s| s.state == State::Active)
}

fn was_cancelled(payment: &Payment, current: Option<&Status>) -> bool {
    payment.is_cancelled()
        || current.map_or(false, |s| {
            s.extras.get(EXTRA_OUTCOME).map(String::as_str) == Some(OUTCOME_CANCELED)
        })
}
