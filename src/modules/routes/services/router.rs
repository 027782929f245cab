use std::sync::Arc;

use tracing::{debug, warn};

use super::super::models::{Route, RouteMode, RouteType};
use super::super::repositories::RouteRepository;
use crate::core::{AppError, Repository, Result};
use crate::modules::payments::models::Identity;
use crate::modules::profiles::ProfileService;

/// Picks the transport route a payment travels on
pub struct Router {
    routes: Arc<dyn RouteRepository>,
    profiles: Arc<dyn ProfileService>,
}

impl Router {
    pub fn new(routes: Arc<dyn RouteRepository>, profiles: Arc<dyn ProfileService>) -> Self {
        Self { routes, profiles }
    }

    /// Resolve the route for a payment
    ///
    /// A payment that already carries a route keeps it. Otherwise the first
    /// route in stable order matching the partition, mode and type hint is
    /// chosen.
    ///
    /// # Errors
    /// * `RoutingFailed` - no route matches; not worth retrying
    /// * `NotFound` - the payment's existing route id is unknown
    pub async fn resolve(
        &self,
        payment_id: &str,
        mode: RouteMode,
        hint: RouteType,
        partition_id: &str,
        existing_route_id: Option<&str>,
    ) -> Result<Route> {
        if let Some(route_id) = existing_route_id.filter(|id| !id.is_empty()) {
            debug!(payment_id = %payment_id, route_id = %route_id, "Payment already routed");
            return self.routes.get_by_id(route_id).await;
        }

        let candidates = self.routes.find_matching(partition_id, mode, hint).await?;

        // Several matches are resolved by order alone; ranking by cost or
        // preference is not modelled yet.
        let route = candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::RoutingFailed(payment_id.to_string()))?;

        debug!(
            payment_id = %payment_id,
            route_id = %route.meta.id,
            mode = %mode,
            hint = %hint,
            "Route resolved"
        );

        Ok(route)
    }

    pub async fn route(&self, route_id: &str) -> Result<Route> {
        self.routes.get_by_id(route_id).await
    }

    /// Route type hint for an outbound payment
    ///
    /// Recipients reached through a phone-like contact need a short-form
    /// route; anyone else can use any route. An unknown profile or contact
    /// falls back to `any`.
    pub async fn outbound_hint(&self, recipient: &Identity) -> Result<RouteType> {
        if recipient.profile_id.is_empty() {
            return Ok(RouteType::Any);
        }

        let profile = match self.profiles.get_profile_by_id(&recipient.profile_id).await {
            Ok(profile) => profile,
            Err(e) if e.is_not_found() => {
                warn!(profile_id = %recipient.profile_id, "Recipient profile not found");
                return Ok(RouteType::Any);
            }
            Err(e) => return Err(e),
        };

        let hint = match profile.contact(&recipient.contact_id) {
            Some(contact) if contact.is_phone_like() => RouteType::ShortForm,
            _ => RouteType::Any,
        };

        Ok(hint)
    }
}
