//! Shared factory use across threads

use modelkit_core::{Factory, FactoryOptions, FieldValue, Typed};
use modelkit_test_utils::{sample_factory, sample_registry, SequentialIds, FLEET_NS};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const PER_THREAD: usize = 50;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn factory_is_shareable() {
    assert_send_sync::<Factory>();
    assert_send_sync::<modelkit_schema::ModelManager>();
}

#[test]
fn concurrent_transactions_get_distinct_identifiers() {
    let factory = sample_factory();
    let options = FactoryOptions::new().with_generation();

    let ids: Vec<String> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    (0..PER_THREAD)
                        .map(|_| {
                            let tx = factory
                                .create_transaction(FLEET_NS, "Sale", None, &options)
                                .unwrap();
                            assert!(tx.validate().is_ok());
                            tx.identifier().to_string()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
    });

    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), THREADS * PER_THREAD);
}

#[test]
fn concurrent_sources_do_not_repeat() {
    let ids = Arc::new(SequentialIds::new("t"));
    let factory = Factory::builder(sample_registry())
        .identifier_source(Arc::clone(&ids))
        .build();
    let options = FactoryOptions::new();

    let issued: HashSet<String> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let factory = factory.clone();
                let options = &options;
                s.spawn(move || {
                    (0..PER_THREAD)
                        .map(|_| {
                            factory
                                .create_transaction(FLEET_NS, "Inspection", None, options)
                                .unwrap()
                                .identifier()
                                .to_string()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(issued.len(), THREADS * PER_THREAD);
    assert_eq!(ids.issued(), THREADS * PER_THREAD);
}

#[test]
fn instances_do_not_share_validators() {
    let factory = sample_factory();
    let options = FactoryOptions::new().with_generation();
    let original = factory
        .create_resource(FLEET_NS, "Vehicle", Some("V-1"), &options)
        .unwrap();

    thread::scope(|s| {
        for n in 0..THREADS {
            let mut copy = original.clone();
            s.spawn(move || {
                let wheels = i32::try_from(n).unwrap();
                copy.set_field("wheels", wheels.into()).unwrap();
                assert_eq!(copy.field("wheels"), Some(&FieldValue::Integer(wheels)));
                assert!(copy.set_field("wheels", "many".into()).is_err());
            });
        }
    });

    assert_eq!(original.field("wheels"), Some(&FieldValue::Integer(4)));
}
