//! Property-based tests using proptest.
//!
//! These tests verify invariants that should hold for any valid input.

use std::collections::BTreeMap;

use proptest::prelude::*;

use async_logger::acl::FullMethod;
use async_logger::hub::{StatAggregator, StatSnapshot};
use async_logger::{AclTables, ServiceGroup};

// ============================================================================
// Custom Strategies
// ============================================================================

fn arb_ident() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,15}"
}

fn arb_consumer() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

fn arb_service() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("Biz"), Just("Admin")]
}

fn arb_method() -> impl Strategy<Value = String> {
    prop_oneof![Just("*".to_string()), arb_ident()]
}

/// ACL payloads built from well-formed entries
fn arb_payload() -> impl Strategy<Value = BTreeMap<String, Vec<(String, &'static str, String)>>> {
    prop::collection::btree_map(
        arb_consumer(),
        prop::collection::vec((arb_ident(), arb_service(), arb_method()), 0..6),
        0..6,
    )
}

fn render(payload: &BTreeMap<String, Vec<(String, &'static str, String)>>) -> String {
    let json: BTreeMap<&String, Vec<String>> = payload
        .iter()
        .map(|(consumer, entries)| {
            let names = entries
                .iter()
                .map(|(package, service, method)| format!("/{package}.{service}/{method}"))
                .collect();
            (consumer, names)
        })
        .collect();
    serde_json::to_string(&json).unwrap()
}

// ============================================================================
// ACL Lookup Properties
// ============================================================================

proptest! {
    #[test]
    fn wildcard_grants_every_method(
        consumer in arb_consumer(),
        package in arb_ident(),
        service in arb_service(),
        method in arb_ident(),
    ) {
        let payload = format!(r#"{{"{consumer}": ["/{package}.{service}/*"]}}"#);
        let tables = AclTables::parse(&payload).unwrap();
        let group = ServiceGroup::from_service_name(service).unwrap();

        prop_assert!(tables.table(group).lookup(&consumer, service, &method));
    }

    #[test]
    fn no_entries_for_service_denies_everything(
        consumer in arb_consumer(),
        method in arb_ident(),
    ) {
        let payload = format!(r#"{{"{consumer}": ["/logger.Admin/*"]}}"#);
        let tables = AclTables::parse(&payload).unwrap();

        prop_assert!(!tables.business.lookup(&consumer, "Biz", &method));
        prop_assert!(tables.admin.lookup(&consumer, "Admin", &method));
    }

    #[test]
    fn lookup_matches_parsed_entries(payload in arb_payload(), requested in arb_ident()) {
        let tables = AclTables::parse(&render(&payload)).unwrap();

        for (consumer, entries) in &payload {
            for service in ["Biz", "Admin"] {
                let group = ServiceGroup::from_service_name(service).unwrap();
                let expected = entries
                    .iter()
                    .any(|(_, s, m)| *s == service && (m == "*" || *m == requested));
                prop_assert_eq!(
                    tables.table(group).lookup(consumer, service, &requested),
                    expected
                );
            }
        }
    }

    #[test]
    fn unknown_consumer_is_denied(payload in arb_payload(), method in arb_ident()) {
        let tables = AclTables::parse(&render(&payload)).unwrap();
        let stranger = "Stranger-Not-Generated";

        prop_assert!(!tables.business.lookup(stranger, "Biz", &method));
        prop_assert!(!tables.admin.lookup(stranger, "Admin", &method));
    }

    #[test]
    fn non_governed_service_rejects_payload(
        consumer in arb_consumer(),
        service in arb_ident().prop_filter("governed", |s| s != "Biz" && s != "Admin"),
    ) {
        let payload = format!(r#"{{"{consumer}": ["/pkg.{service}/Call"]}}"#);
        prop_assert!(AclTables::parse(&payload).is_err());
    }
}

// ============================================================================
// Method Name Properties
// ============================================================================

proptest! {
    #[test]
    fn full_method_parse_recovers_parts(
        package in arb_ident(),
        service in arb_ident(),
        method in arb_ident(),
    ) {
        let name = format!("/{package}.{service}/{method}");
        let parsed = FullMethod::parse(&name).unwrap();

        prop_assert_eq!(parsed.service, service.as_str());
        prop_assert_eq!(parsed.method, method.as_str());
    }

    #[test]
    fn full_method_parse_never_panics(name in ".{0,40}") {
        let _ = FullMethod::parse(&name);
    }

    #[test]
    fn extra_segments_are_rejected(
        service in arb_ident(),
        method in arb_ident(),
        extra in arb_ident(),
    ) {
        let name = format!("/pkg.{service}/{method}/{extra}");
        prop_assert!(FullMethod::parse(&name).is_err());
    }
}

// ============================================================================
// Stat Aggregation Properties
// ============================================================================

proptest! {
    #[test]
    fn aggregated_counts_equal_merged_increments(
        calls in prop::collection::vec((0usize..3, 0usize..3), 0..200),
    ) {
        let consumers = ["alice", "bob", "carol"];
        let methods = ["/logger.Biz/Check", "/logger.Biz/Add", "/logger.Biz/Test"];
        let aggregator = StatAggregator::new();

        for (c, m) in &calls {
            aggregator.merge(&StatSnapshot::increment(consumers[*c], methods[*m]));
        }

        let snapshot = aggregator.take();
        prop_assert_eq!(snapshot.total_calls(), calls.len() as u64);
        prop_assert_eq!(snapshot.by_consumer.values().sum::<u64>(), calls.len() as u64);
        for (i, method) in methods.iter().enumerate() {
            let expected = calls.iter().filter(|(_, m)| *m == i).count() as u64;
            prop_assert_eq!(snapshot.method_count(method), expected);
        }
        prop_assert!(aggregator.take().is_empty());
    }
}
