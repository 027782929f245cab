use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::super::models::event::{CREATE_PAYMENT_LINK, INITIATE_PROMPT};
use super::super::models::{Event, EventEnvelope, ExternalEvent};
use super::bus::EventBus;
use crate::core::{AppError, EntityMeta, Extras, Repository, Result, TenancyContext};
use crate::modules::payment_links::{PaymentLink, PaymentLinkRepository};
use crate::modules::payments::{
    Cost, CostRepository, Direction, Payment, PaymentMessage, PaymentRepository,
};
use crate::modules::prompts::models::EXTRA_TRANSACTION_REF;
use crate::modules::prompts::{Account, AccountRepository, Prompt, PromptRepository};
use crate::modules::routes::{RouteMode, RouteType, Router};
use crate::modules::statuses::{EntityType, State, Status, StatusCode, StatusTracker};
use crate::modules::transports::TransportService;

/// Extras key holding the failure reason on a failed status
pub const EXTRA_ERROR: &str = "error";

/// Transport addresses of the external gateway topics
#[derive(Debug, Clone)]
pub struct DispatcherTopics {
    pub initiate_prompt: String,
    pub create_payment_link: String,
}

/// Persistence handles used by the chain steps
#[derive(Clone)]
pub struct ChainStores {
    pub payments: Arc<dyn PaymentRepository>,
    pub costs: Arc<dyn CostRepository>,
    pub prompts: Arc<dyn PromptRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    pub payment_links: Arc<dyn PaymentLinkRepository>,
}

/// Reacts to each lifecycle event: persist, record status, emit the next step
pub struct EventDispatcher {
    stores: ChainStores,
    statuses: StatusTracker,
    router: Arc<Router>,
    transports: Arc<TransportService>,
    bus: Arc<dyn EventBus>,
    topics: DispatcherTopics,
}

impl EventDispatcher {
    pub fn new(
        stores: ChainStores,
        statuses: StatusTracker,
        router: Arc<Router>,
        transports: Arc<TransportService>,
        bus: Arc<dyn EventBus>,
        topics: DispatcherTopics,
    ) -> Self {
        Self {
            stores,
            statuses,
            router,
            transports,
            bus,
            topics,
        }
    }

    pub async fn dispatch(&self, envelope: &EventEnvelope) -> Result<()> {
        let ctx = &envelope.context;
        debug!(
            event = envelope.name(),
            event_id = %envelope.id,
            entity = envelope.event.entity_key(),
            "Dispatching event"
        );

        match &envelope.event {
            Event::CostSave(cost) => self.save_cost(cost).await,
            Event::PaymentSave(payment) => self.save_payment(ctx, payment).await,
            Event::PaymentInRoute { payment_id } => {
                self.route_payment(ctx, payment_id, Direction::Inbound).await
            }
            Event::PaymentOutRoute { payment_id } => {
                self.route_payment(ctx, payment_id, Direction::Outbound).await
            }
            Event::PaymentInQueue { payment_id } => {
                self.queue_payment(ctx, payment_id, Direction::Inbound).await
            }
            Event::PaymentOutQueue { payment_id } => {
                self.queue_payment(ctx, payment_id, Direction::Outbound).await
            }
            Event::StatusSave(status) => self.statuses.save(status).await,
            Event::PromptSave(prompt) => self.save_prompt(ctx, prompt).await,
            Event::PaymentLinkSave(link) => self.save_payment_link(ctx, link).await,
        }
    }

    async fn save_cost(&self, cost: &Cost) -> Result<()> {
        self.stores.costs.save(cost).await?;
        debug!(cost_id = %cost.meta.id, payment_id = %cost.payment_id, "Cost saved");
        Ok(())
    }

    /// `payment.save`: upsert, then branch on direction and release
    async fn save_payment(&self, ctx: &TenancyContext, payment: &Payment) -> Result<()> {
        self.stores.payments.save(payment).await?;
        let payment_id = payment.meta.id.as_str();

        if !payment.outbound {
            return self
                .bus
                .emit_next(ctx, Event::route(Direction::Inbound, payment_id))
                .await;
        }

        if payment.is_released() {
            return self
                .bus
                .emit_next(ctx, Event::route(Direction::Outbound, payment_id))
                .await;
        }

        if payment.is_cancelled() {
            info!(payment_id = %payment_id, "Cancelled payment saved");
            return Ok(());
        }

        self.record(
            ctx,
            payment_id,
            EntityType::Payment,
            State::Checked,
            StatusCode::Queued,
            Extras::new(),
        )
        .await?;
        info!(payment_id = %payment_id, "Outbound payment awaiting release");
        Ok(())
    }

    /// `payment.{in,out}.route`: pick a route; no route is a terminal failure
    async fn route_payment(
        &self,
        ctx: &TenancyContext,
        payment_id: &str,
        direction: Direction,
    ) -> Result<()> {
        let mut payment = self.stores.payments.get_by_id(payment_id).await?;

        let (mode, hint) = match direction {
            Direction::Inbound => (RouteMode::Receive, RouteType::Any),
            Direction::Outbound => (
                RouteMode::Transmit,
                self.router.outbound_hint(&payment.recipient).await?,
            ),
        };

        let resolved = self
            .router
            .resolve(
                payment_id,
                mode,
                hint,
                &payment.meta.partition_id,
                payment.route_id.as_deref(),
            )
            .await;

        let route = match resolved {
            Ok(route) => route,
            Err(e @ AppError::RoutingFailed(_)) => {
                warn!(
                    payment_id = %payment_id,
                    direction = %direction,
                    error = %e,
                    "No route for payment"
                );
                let mut extras = Extras::new();
                extras.insert(EXTRA_ERROR.to_string(), e.to_string());
                self.record(
                    ctx,
                    payment_id,
                    EntityType::Payment,
                    State::Inactive,
                    StatusCode::Failed,
                    extras,
                )
                .await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if payment.route_id.as_deref() != Some(route.meta.id.as_str()) {
            payment.assign_route(route.meta.id.clone());
            self.stores.payments.save(&payment).await?;
        }

        self.record(
            ctx,
            payment_id,
            EntityType::Payment,
            State::Active,
            StatusCode::Queued,
            Extras::new(),
        )
        .await?;
        self.bus
            .emit_next(ctx, Event::queue(direction, payment_id))
            .await?;

        info!(
            payment_id = %payment_id,
            route_id = %route.meta.id,
            direction = %direction,
            "Payment routed"
        );
        Ok(())
    }

    /// `payment.{in,out}.queue`: hand the payment to its route's transport
    async fn queue_payment(
        &self,
        ctx: &TenancyContext,
        payment_id: &str,
        direction: Direction,
    ) -> Result<()> {
        let payment = self.stores.payments.get_by_id(payment_id).await?;
        let route_id = payment.route_id.as_deref().ok_or_else(|| {
            AppError::failed_precondition(format!("Payment '{}' has no route", payment_id))
        })?;
        let route = self.router.route(route_id).await?;

        let payload = match direction {
            Direction::Inbound => serde_json::to_value(&payment)?,
            Direction::Outbound => serde_json::to_value(PaymentMessage::from(&payment))?,
        };

        self.transports.publish(&route.uri, &payload).await?;

        self.record(
            ctx,
            payment_id,
            EntityType::Payment,
            State::Active,
            StatusCode::InProcess,
            Extras::new(),
        )
        .await?;
        info!(payment_id = %payment_id, route_id = %route.meta.id, "Payment queued on route");
        Ok(())
    }

    /// `prompt.save`: resolve the account, persist, publish `initiate.prompt`
    async fn save_prompt(&self, ctx: &TenancyContext, prompt: &Prompt) -> Result<()> {
        let account = self.find_or_create_account(ctx, prompt).await?;

        let mut prompt = prompt.clone();
        prompt.account_id = Some(account.meta.id.clone());
        self.stores.prompts.save(&prompt).await?;

        let prompt_id = prompt.meta.id.as_str();
        let mut extras = Extras::new();
        if let Some(reference) = prompt.transaction_ref() {
            extras.insert(EXTRA_TRANSACTION_REF.to_string(), reference.to_string());
        }

        let missing = prompt.missing_dispatch_extras();
        if !missing.is_empty() {
            let reason = format!("prompt is missing {}", missing.join(", "));
            warn!(prompt_id = %prompt_id, reason = %reason, "Prompt not dispatched");
            extras.insert(EXTRA_ERROR.to_string(), reason);
            self.record(
                ctx,
                prompt_id,
                EntityType::Prompt,
                State::Inactive,
                StatusCode::Failed,
                extras,
            )
            .await?;
            return Ok(());
        }

        self.record(
            ctx,
            prompt_id,
            EntityType::Prompt,
            State::Created,
            StatusCode::Queued,
            extras.clone(),
        )
        .await?;
        self.publish_external(
            ctx,
            &self.topics.initiate_prompt,
            INITIATE_PROMPT,
            &prompt,
            prompt_id,
            EntityType::Prompt,
            extras,
        )
        .await
    }

    async fn find_or_create_account(
        &self,
        ctx: &TenancyContext,
        prompt: &Prompt,
    ) -> Result<Account> {
        match self
            .stores
            .accounts
            .get_by_account_number(&prompt.account_number, &prompt.country_code)
            .await
        {
            Ok(account) => Ok(account),
            Err(e) if e.is_not_found() => {
                let account = Account {
                    meta: EntityMeta::new(None, ctx),
                    account_number: prompt.account_number.clone(),
                    country_code: prompt.country_code.clone(),
                    name: prompt.account_name.clone(),
                    extras: Extras::new(),
                };
                self.stores.accounts.save(&account).await?;
                info!(
                    account_id = %account.meta.id,
                    country_code = %account.country_code,
                    "Account created for prompt"
                );
                Ok(account)
            }
            Err(e) => Err(e),
        }
    }

    /// `payment_link.save`: persist, record, publish `create.payment.link`
    async fn save_payment_link(&self, ctx: &TenancyContext, link: &PaymentLink) -> Result<()> {
        self.stores.payment_links.save(link).await?;

        let link_id = link.meta.id.as_str();
        self.record(
            ctx,
            link_id,
            EntityType::PaymentLink,
            State::Created,
            StatusCode::Queued,
            Extras::new(),
        )
        .await?;
        self.publish_external(
            ctx,
            &self.topics.create_payment_link,
            CREATE_PAYMENT_LINK,
            link,
            link_id,
            EntityType::PaymentLink,
            Extras::new(),
        )
        .await
    }

    /// Publish to a gateway topic; a failed publish marks the entity failed
    /// before the error is returned
    #[allow(clippy::too_many_arguments)]
    async fn publish_external<T: Serialize + Sync>(
        &self,
        ctx: &TenancyContext,
        address: &str,
        name: &str,
        payload: &T,
        entity_id: &str,
        entity_type: EntityType,
        mut extras: Extras,
    ) -> Result<()> {
        let message = serde_json::to_value(ExternalEvent {
            name,
            context: ctx,
            payload,
        })?;

        if let Err(e) = self.transports.publish(address, &message).await {
            extras.insert(EXTRA_ERROR.to_string(), e.to_string());
            self.record(ctx, entity_id, entity_type, State::Inactive, StatusCode::Failed, extras)
                .await?;
            return Err(e);
        }

        info!(
            entity_id = %entity_id,
            entity_type = %entity_type,
            topic = name,
            "Published to gateway"
        );
        Ok(())
    }

    async fn record(
        &self,
        ctx: &TenancyContext,
        entity_id: &str,
        entity_type: EntityType,
        state: State,
        status: StatusCode,
        extras: Extras,
    ) -> Result<Status> {
        self.statuses
            .record(ctx, entity_id, entity_type, state, status, extras)
            .await
    }
}
