//! Fixtures shared by the CLI unit and behaviour tests.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tempfile::TempDir;
use tms_core::test_support::{
    PlanarDistanceProvider, base_time, depot, order, order_id, route_id, vehicle, vehicle_id,
};
use tms_core::{
    CurrentRoute, DisruptionEvent, DisruptionKind, PackRequest, ReplanRequest, SelectionRule,
};

use crate::CliError;
use crate::routing::{BoxedDistanceProvider, DistanceProviderBuilder, RoutingConfig};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write fixture");
}

pub(super) fn write_json<T: Serialize>(path: &Utf8Path, value: &T) {
    let payload = serde_json::to_string_pretty(value).expect("serialise fixture");
    write_utf8(path, payload.as_bytes());
}

/// Temporary directory holding request files.
pub(super) struct Workspace {
    _tmp: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        Self { _tmp: tmp, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }
}

/// Serves planar distances so expectations stay readable.
#[derive(Debug, Default)]
pub(super) struct PlanarProviderBuilder;

impl DistanceProviderBuilder for PlanarProviderBuilder {
    fn build(&self, _config: &RoutingConfig) -> Result<BoxedDistanceProvider, CliError> {
        Ok(Box::new(PlanarDistanceProvider))
    }
}

/// Three orders east of the depot; the 50 kg one fits only vehicle 2.
pub(super) fn pack_request() -> PackRequest {
    PackRequest {
        orders: vec![
            order(1, 1.0, 0.0, 10.0),
            order(2, 2.0, 0.0, 10.0),
            order(3, 3.0, 0.0, 50.0),
        ],
        vehicles: vec![vehicle(1, 30.0), vehicle(2, 100.0)],
        depot: depot(),
        selection: SelectionRule::NearestNeighbor,
    }
}

/// Like [`pack_request`] but with an order no vehicle can carry.
pub(super) fn oversized_pack_request() -> PackRequest {
    let mut request = pack_request();
    request.orders.push(order(4, 4.0, 0.0, 500.0));
    request
}

/// Vehicle 1 breaks down while serving orders 1 and 2; vehicle 2 is idle.
pub(super) fn replan_request() -> ReplanRequest {
    ReplanRequest {
        event: DisruptionEvent {
            kind: DisruptionKind::VehicleBreakdown,
            route_id: Some(route_id(1)),
            vehicle_id: Some(vehicle_id(1)),
            description: "gearbox failure".to_owned(),
            occurred_at: base_time(),
        },
        current_routes: vec![CurrentRoute {
            route_id: route_id(1),
            vehicle_id: vehicle_id(1),
            orders: vec![order_id(1), order_id(2)],
        }],
        orders: vec![order(1, 1.0, 0.0, 10.0), order(2, 2.0, 0.0, 10.0)],
        vehicles: vec![vehicle(1, 100.0), vehicle(2, 100.0)],
        depot: depot(),
    }
}
