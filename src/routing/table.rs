//! Published routing table.
//!
//! # Responsibilities
//! - Hold the flat list of dispatch descriptors read by the data path
//! - Replace it atomically when the reconciler publishes
//!
//! # Design Decisions
//! - `ArcSwap` so readers never lock; a reader sees either the whole old
//!   table or the whole new one
//! - Publish count kept for introspection

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::observability::metrics;
use crate::runtime::DispatchEndpoint;

/// A published table: dispatch descriptors in route-manager order.
pub type RouteTableSnapshot = Arc<Vec<Arc<DispatchEndpoint>>>;

/// Destination of the reconciler's route publication.
pub trait RouteTablePublisher: Send + Sync {
    /// Replace the live table in one atomic step.
    fn publish(&self, endpoints: Vec<Arc<DispatchEndpoint>>);
}

/// Lock-free routing table shared with the request-dispatch path.
#[derive(Debug)]
pub struct RoutingTable {
    table: ArcSwap<Vec<Arc<DispatchEndpoint>>>,
    version: AtomicU64,
}

impl RoutingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(Vec::new()),
            version: AtomicU64::new(0),
        }
    }

    /// The currently published table.
    pub fn snapshot(&self) -> RouteTableSnapshot {
        self.table.load_full()
    }

    /// Number of publishes since creation.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTablePublisher for RoutingTable {
    fn publish(&self, endpoints: Vec<Arc<DispatchEndpoint>>) {
        let count = endpoints.len();
        self.table.store(Arc::new(endpoints));
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;

        metrics::record_routing_table(count);
        tracing::debug!(version, endpoints = count, "Routing table published");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::snapshot::DesiredRoute;
    use crate::routing::matcher::AndMatcher;

    fn descriptor(route_id: &str) -> Arc<DispatchEndpoint> {
        Arc::new(DispatchEndpoint {
            route_id: route_id.into(),
            order: 0,
            backend_id: "b1".into(),
            endpoint_id: "e1".into(),
            address: "10.0.0.1:80".into(),
            matcher: Arc::new(AndMatcher::default()),
            route: Arc::new(DesiredRoute::new(route_id, "b1")),
        })
    }

    #[test]
    fn test_publish_swaps_whole_table() {
        let table = RoutingTable::new();
        let before = table.snapshot();
        assert!(before.is_empty());
        assert_eq!(table.version(), 0);

        table.publish(vec![descriptor("r1"), descriptor("r2")]);

        let after = table.snapshot();
        assert!(before.is_empty());
        assert_eq!(after.len(), 2);
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(table.version(), 1);
    }

    #[test]
    fn test_concurrent_readers_see_whole_tables() {
        let table = Arc::new(RoutingTable::new());
        table.publish(vec![descriptor("old")]);

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let table = Arc::clone(&table);
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        let snapshot = table.snapshot();
                        let ids: Vec<_> = snapshot.iter().map(|d| d.route_id.as_str()).collect();
                        assert!(ids == ["old"] || ids == ["new", "new"], "torn table: {:?}", ids);
                    }
                })
            })
            .collect();

        for _ in 0..100 {
            table.publish(vec![descriptor("new"), descriptor("new")]);
            table.publish(vec![descriptor("old")]);
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
