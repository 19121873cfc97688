//! Route lookup over the published table.
//!
//! # Responsibilities
//! - Find the route a request belongs to
//! - Return every dispatch endpoint of that route, or an explicit no-match
//!
//! # Design Decisions
//! - Works on one table snapshot, so a lookup never mixes two publishes
//! - Lowest `order` wins; ties go to the earlier table entry (route id order)
//! - Endpoint selection is left to the load balancer

use std::sync::Arc;

use axum::http::request::Parts;

use crate::routing::matcher::Matcher;
use crate::routing::table::{RouteTableSnapshot, RoutingTable};
use crate::runtime::DispatchEndpoint;

/// The route chosen for a request and its candidate endpoints.
#[derive(Debug, Clone)]
pub struct RouteSelection {
    pub route_id: String,
    pub endpoints: Vec<Arc<DispatchEndpoint>>,
}

/// Pick the best route for `req` from a table snapshot.
pub fn select(table: &RouteTableSnapshot, req: &Parts) -> Option<RouteSelection> {
    let mut best: Option<&Arc<DispatchEndpoint>> = None;
    for candidate in table.iter() {
        if best.is_some_and(|b| b.order <= candidate.order) {
            continue;
        }
        if candidate.matcher.matches(req) {
            best = Some(candidate);
        }
    }

    let best = best?;
    let endpoints = table
        .iter()
        .filter(|d| d.route_id == best.route_id)
        .cloned()
        .collect();

    Some(RouteSelection {
        route_id: best.route_id.clone(),
        endpoints,
    })
}

impl RoutingTable {
    /// Pick the best route for `req` from the current table.
    pub fn select(&self, req: &Parts) -> Option<RouteSelection> {
        select(&self.snapshot(), req)
    }
}
