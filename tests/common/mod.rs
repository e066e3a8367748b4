#![allow(dead_code)]

use cartograph::upstream::RouteRecord;
use httpmock::prelude::*;
use serde_json::json;

pub fn route(name: &str, source: &str, dest: &str, module: &str) -> RouteRecord {
    RouteRecord {
        name: name.to_string(),
        source: source.to_string(),
        dest: dest.to_string(),
        module: module.to_string(),
    }
}

pub fn sample_routes() -> Vec<RouteRecord> {
    vec![
        route("orders_in", "http-/orders/inbound", "orders.queue", "core"),
        route(
            "orders_out",
            "orders.queue",
            "https://erp.example.com/orders",
            "core",
        ),
        route(
            "billing_sync",
            "http-/billing/sync",
            "https://billing.example.com/api",
            "billing",
        ),
    ]
}

/// Wires a mock upstream route API serving the given records: `GET /routes`
/// lists their names, `GET /routes/{name}` returns the detail document.
pub fn mock_catalog(server: &MockServer, routes: &[RouteRecord]) {
    let names: Vec<&str> = routes.iter().map(|route| route.name.as_str()).collect();
    server.mock(|when, then| {
        when.method(GET).path("/routes");
        then.status(200).json_body(json!(names));
    });

    for record in routes {
        server.mock(|when, then| {
            when.method(GET).path(format!("/routes/{}", record.name));
            then.status(200).json_body(json!({
                "name": record.name,
                "source": record.source,
                "dest": record.dest,
                "module": record.module,
            }));
        });
    }
}
