//! Tests for the wire shapes shared by the list service and console clients.
//!
//! Upstream payloads come in several envelopes; list state goes back out as
//! camelCase JSON.

use console_engine::{record, unwrap_records, ListConfig, ListQueryEngine, Record};
use serde_json::{json, Value};

fn trips_engine() -> ListQueryEngine<Record> {
    let config = ListConfig::<Record>::new()
        .search_field(|r| record::field_text(r, "vehicleNumber"))
        .search_field(|r| record::field_text(r, "vendor.name"))
        .filter("status", |r, v| record::field_text(r, "status").as_deref() == Some(v))
        .items_per_page(2)
        .key(|r| record::key_of(r, "_id"));
    ListQueryEngine::new(config).unwrap()
}

fn trips_payload() -> Value {
    json!({
        "success": true,
        "data": {
            "data": [
                {"_id": "t1", "vehicleNumber": "MH12AB1234", "vendor": {"name": "Acme Logistics"}, "status": "inside"},
                {"_id": "t2", "vehicleNumber": "KA01XY9876", "vendor": {"name": "Blue Freight"}, "status": "exited"},
                {"_id": "t3", "vehicleNumber": "MH14CD5555", "vendor": null, "status": "inside"}
            ],
            "total": 3
        }
    })
}

#[cfg(test)]
mod upstream_payload_tests {
    use super::*;

    #[test]
    fn test_nested_envelope_loads() {
        let mut engine = trips_engine();
        engine.set_records(unwrap_records(trips_payload()).unwrap());

        assert_eq!(engine.stats().total_records, 3);
        assert_eq!(engine.total_pages(), 2);
    }

    #[test]
    fn test_flat_envelope_loads() {
        let payload = json!({"data": [{"_id": "v1"}]});
        assert_eq!(unwrap_records(payload).unwrap().len(), 1);
    }

    #[test]
    fn test_bare_array_loads() {
        let payload = json!([{"_id": "v1"}, {"_id": "v2"}]);
        assert_eq!(unwrap_records(payload).unwrap().len(), 2);
    }

    #[test]
    fn test_error_body_rejected() {
        let payload = json!({"success": false, "message": "Session expired"});
        assert!(unwrap_records(payload).is_err());
    }

    #[test]
    fn test_missing_nested_field_does_not_match() {
        let mut engine = trips_engine();
        engine.set_records(unwrap_records(trips_payload()).unwrap());

        engine.set_search_text("freight");
        let view = engine.view();
        assert_eq!(view.filtered_records.len(), 1);
        assert_eq!(view.filtered_records[0]["_id"], "t2");
    }
}

#[cfg(test)]
mod list_state_tests {
    use super::*;

    #[test]
    fn test_query_state_shape() {
        let mut engine = trips_engine();
        engine.set_records(unwrap_records(trips_payload()).unwrap());
        engine.set_filter_value("status", "inside");

        let json = serde_json::to_value(engine.query_state()).unwrap();
        assert_eq!(
            json,
            json!({
                "searchText": "",
                "filters": {"status": "inside"},
                "page": {"currentPage": 1, "itemsPerPage": 2}
            })
        );
    }

    #[test]
    fn test_stats_shape() {
        let mut engine = trips_engine();
        engine.set_records(unwrap_records(trips_payload()).unwrap());
        engine.go_to_page(2);

        let json = serde_json::to_value(engine.stats()).unwrap();
        assert_eq!(json["totalRecords"], 3);
        assert_eq!(json["totalFiltered"], 3);
        assert_eq!(json["currentPageSize"], 1);
        assert_eq!(json["rangeStart"], 3);
        assert_eq!(json["rangeEnd"], 3);
    }

    #[test]
    fn test_refresh_keeps_valid_page() {
        let mut engine = trips_engine();
        engine.set_records(unwrap_records(trips_payload()).unwrap());
        engine.go_to_page(2);

        let mut records = unwrap_records(trips_payload()).unwrap();
        records.push(json!({"_id": "t4", "vehicleNumber": "DL3CAF0001", "status": "exited"}));
        engine.set_records(records);

        assert_eq!(engine.page_state().current_page, 2);
        assert_eq!(engine.view().page_records.len(), 2);
    }

    #[test]
    fn test_refresh_clamps_shrunk_list() {
        let mut engine = trips_engine();
        engine.set_records(unwrap_records(trips_payload()).unwrap());
        engine.go_to_page(2);

        engine.set_records(vec![json!({"_id": "t1", "status": "inside"})]);

        assert_eq!(engine.page_state().current_page, 1);
        assert_eq!(engine.total_pages(), 1);
    }
}
