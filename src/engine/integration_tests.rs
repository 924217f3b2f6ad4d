// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::backends::local::processors::{ChangeTextCaseStep, PatternMatchStep};
use crate::backends::local::producers::{QueueProducer, StaticItemsProducer};
use crate::backends::local::sinks::MemorySink;
use crate::backends::stub::{FailingSink, FailingStep, IdleProducer, RecordingResource, StaticTransactional};
use crate::engine::{
    Adaptor, ComponentRegistry, HandoffError, Node, NodeMap, ProducerHandle, RestartPolicy,
    Router, RunOptions, TransactionCoordinator,
};
use crate::errors::{ProcessingError, WorkerError};
use crate::message::Message;
use crate::routing::{KindHierarchy, Topology};

/// End-to-end routing scenarios using real local collaborators
#[cfg(test)]
mod tests {
    use super::*;

    fn producer(id: &str, items: Vec<serde_json::Value>) -> ProducerHandle {
        ProducerHandle::new(
            id,
            Arc::new(StaticItemsProducer::new(items, 10)),
            Duration::from_millis(10),
        )
    }

    #[tokio::test]
    async fn test_upper_case_route_end_to_end() {
        let topology = Topology::builder(KindHierarchy::new())
            .producer("reader")
            .node("upper")
            .node("out")
            .output("reader", ["upper"])
            .output("upper", ["out"])
            .build()
            .unwrap();
        let sink = Arc::new(MemorySink::new());
        let registry = ComponentRegistry::new(
            NodeMap::from(vec![
                Node::step("upper", Arc::new(ChangeTextCaseStep::upper())),
                Node::sink("out", sink.clone()),
            ]),
            vec![producer("reader", vec![json!("a"), json!("b")])],
        );
        let adaptor = Adaptor::new(registry, Arc::new(topology), RunOptions::default());

        let report = adaptor.run().await.unwrap();

        assert_eq!(report.exit_code, 0);
        assert!(report.failures.is_empty());
        assert_eq!(sink.delivered(), vec![json!("A"), json!("B")]);

        let results = adaptor
            .router()
            .route(Message::new("reader", vec![json!("c")]))
            .await
            .unwrap();
        assert!(results.is_committed());
        assert_eq!(sink.delivered(), vec![json!("A"), json!("B"), json!("C")]);
    }

    #[tokio::test]
    async fn test_fail_fast_stops_other_workers() {
        let topology = Topology::builder(KindHierarchy::new())
            .producer("broken")
            .producer("idle")
            .node("gone")
            .output("broken", ["gone"])
            .build()
            .unwrap();
        let registry = ComponentRegistry::new(
            NodeMap::from(vec![Node::sink(
                "gone",
                Arc::new(FailingSink::new(ProcessingError::connection("remote closed"))),
            )]),
            vec![
                producer("broken", vec![json!(1)]),
                ProducerHandle::new("idle", Arc::new(IdleProducer::new()), Duration::from_secs(3600)),
            ],
        );
        let adaptor = Adaptor::new(registry, Arc::new(topology), RunOptions::default());

        let report = tokio::time::timeout(Duration::from_secs(5), adaptor.run())
            .await
            .expect("fail-fast should stop the idle worker")
            .unwrap();

        assert_eq!(report.exit_code, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].producer_id, "broken");
    }

    #[tokio::test]
    async fn test_without_fail_fast_other_workers_keep_running() {
        let topology = Topology::builder(KindHierarchy::new())
            .producer("broken")
            .producer("idle")
            .node("gone")
            .output("broken", ["gone"])
            .build()
            .unwrap();
        let registry = ComponentRegistry::new(
            NodeMap::from(vec![Node::sink(
                "gone",
                Arc::new(FailingSink::new(ProcessingError::connection("remote closed"))),
            )]),
            vec![
                producer("broken", vec![json!(1)]),
                ProducerHandle::new("idle", Arc::new(IdleProducer::new()), Duration::from_secs(3600)),
            ],
        );
        let adaptor = Arc::new(Adaptor::new(
            registry,
            Arc::new(topology),
            RunOptions {
                fail_fast: false,
                restart: RestartPolicy::never(),
            },
        ));

        let running = tokio::spawn({
            let adaptor = Arc::clone(&adaptor);
            async move { adaptor.run().await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!running.is_finished(), "the idle worker is still polling");

        adaptor.stop();
        let report = tokio::time::timeout(Duration::from_secs(5), running)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        assert_eq!(report.exit_code, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0].error, WorkerError::Routing(_)));
    }

    #[tokio::test]
    async fn test_queue_producer_acknowledges_commit_and_rollback() {
        let topology = Topology::builder(KindHierarchy::new())
            .producer("inbox")
            .node("check")
            .node("out")
            .output("inbox", ["check"])
            .output("check", ["out"])
            .build()
            .unwrap();
        let queue_producer = Arc::new(QueueProducer::new("inbox", 4, 4, true));
        let queue = queue_producer.handle();
        let sink = Arc::new(MemorySink::new());
        let registry = ComponentRegistry::new(
            NodeMap::from(vec![
                Node::step("check", Arc::new(PatternMatchStep::rejecting("bad"))),
                Node::sink("out", sink.clone()),
            ]),
            vec![ProducerHandle::new("inbox", queue_producer.clone(), Duration::from_millis(20))
                .with_transactional(queue_producer)],
        );
        let adaptor = Arc::new(Adaptor::new(
            registry,
            Arc::new(topology),
            RunOptions {
                fail_fast: true,
                restart: RestartPolicy {
                    limit: 3,
                    delay: Duration::from_millis(1),
                },
            },
        ));
        let running = tokio::spawn({
            let adaptor = Arc::clone(&adaptor);
            async move { adaptor.run().await }
        });

        assert_eq!(queue.enqueue(json!("good")).await, Ok(()));
        match queue.enqueue(json!("bad")).await {
            Err(HandoffError::RolledBack { cause }) => assert!(cause.contains("unrouted"), "cause: {cause}"),
            other => panic!("expected a rollback, got {other:?}"),
        }
        assert_eq!(queue.enqueue(json!("fine")).await, Ok(()));
        queue.close();

        let report = tokio::time::timeout(Duration::from_secs(5), running)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        assert_eq!(report.exit_code, 0, "the worker restarted after the rollback");
        assert_eq!(sink.delivered(), vec![json!("good"), json!("fine")]);
    }

    #[tokio::test]
    async fn test_queue_pushers_are_refused_after_stop() {
        let topology = Topology::builder(KindHierarchy::new())
            .producer("inbox")
            .node("out")
            .output("inbox", ["out"])
            .build()
            .unwrap();
        let queue_producer = Arc::new(QueueProducer::new("inbox", 1, 1, false));
        let queue = queue_producer.handle();
        let sink = Arc::new(MemorySink::new());
        let registry = ComponentRegistry::new(
            NodeMap::from(vec![Node::sink("out", sink.clone())]),
            vec![ProducerHandle::new("inbox", queue_producer, Duration::from_millis(20))],
        );
        let adaptor = Arc::new(Adaptor::new(registry, Arc::new(topology), RunOptions::default()));
        let running = tokio::spawn({
            let adaptor = Arc::clone(&adaptor);
            async move { adaptor.run().await }
        });

        assert_eq!(queue.enqueue(json!("a")).await, Ok(()));
        adaptor.stop();
        let report = tokio::time::timeout(Duration::from_secs(5), running)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(report.exit_code, 0);

        let late = tokio::time::timeout(Duration::from_secs(2), queue.enqueue(json!("late")))
            .await
            .expect("a push after shutdown must not block");
        assert_eq!(late, Err(HandoffError::Closed));
        assert_eq!(sink.delivered(), vec![json!("a")]);
    }

    #[tokio::test]
    async fn test_transaction_is_all_or_nothing() {
        let topology = Topology::builder(KindHierarchy::new())
            .producer("reader")
            .node("first")
            .node("second")
            .node("out")
            .output("reader", ["first"])
            .output("first", ["second"])
            .output("second", ["out"])
            .build()
            .unwrap();
        let journal = RecordingResource::journal();
        let a = Arc::new(RecordingResource::new("a", journal.clone()));
        let b = Arc::new(RecordingResource::new("b", journal.clone()));
        let sink = Arc::new(MemorySink::new());
        let router = Router::new(
            Arc::new(topology),
            Arc::new(NodeMap::from(vec![
                Node::step("first", Arc::new(ChangeTextCaseStep::upper()))
                    .with_transactional(Arc::new(StaticTransactional::new(a))),
                Node::step(
                    "second",
                    Arc::new(FailingStep::on_items(vec![json!("BOOM")], ProcessingError::connection("lost"))),
                )
                .with_transactional(Arc::new(StaticTransactional::new(b))),
                Node::sink("out", sink.clone()),
            ])),
            Arc::new(TransactionCoordinator::new()),
        );

        let results = router
            .route(Message::new("reader", vec![json!("ok")]))
            .await
            .unwrap();
        assert!(results.is_committed());
        assert_eq!(
            RecordingResource::entries(&journal),
            vec!["begin:a", "begin:b", "commit:a", "commit:b"]
        );

        journal.lock().unwrap().clear();
        let err = router
            .route(Message::new("reader", vec![json!("fine"), json!("boom")]))
            .await
            .unwrap_err();

        assert!(matches!(err, crate::errors::RoutingFailure::Fatal { ref node_id, .. } if node_id == "second"));
        assert_eq!(
            RecordingResource::entries(&journal),
            vec!["begin:a", "begin:b", "rollback:a", "rollback:b"]
        );
        assert_eq!(sink.delivered(), vec![json!("OK")], "nothing from the failed traversal reached the sink");
    }
}
