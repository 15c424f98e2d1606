// SPDX-License-Identifier: MIT OR Apache-2.0

//! `rstest` fixtures and helpers which can be injected into tests.
//!
//! The seeded store holds two groups and two actors:
//!
//! | id | kind  | name / profile | grants / owner                                   |
//! |----|-------|----------------|--------------------------------------------------|
//! | 1  | group | `Student`      | `survey.read`                                    |
//! | 2  | group | `Teacher`      | `survey.create`, `survey.read`, `survey.update`  |
//! | 1  | actor | `Student`      | owned by actor 2                                 |
//! | 2  | actor | `Teacher`      | no owner                                         |
use rstest::fixture;

use crate::actor::{Actor, ActorId};
use crate::catalog::NodeCatalog;
use crate::memory::MemoryStore;
use crate::store::{ActorStore, GroupStore};

const CRUD: [&str; 6] = ["create", "read", "update", "delete", "list", "admin"];

/// Install a `tracing` subscriber when `RUST_LOG` is set.
pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}

/// Catalog with the `user`, `group`, `school`, `survey` and `news` nodes.
#[fixture]
pub fn catalog() -> NodeCatalog {
    NodeCatalog::from_nodes(
        ["user", "group", "school", "survey", "news"]
            .into_iter()
            .map(|node| (node, CRUD)),
    )
    .expect("fixture catalog uses valid names")
}

/// Memory store holding the `Student` and `Teacher` groups and one actor of each.
#[fixture]
pub async fn seeded_store() -> MemoryStore {
    setup_logging();

    let mut store = MemoryStore::new();

    store
        .create_group("Student", &["survey.read".to_string()])
        .await
        .expect("memory store is infallible");
    store
        .create_group(
            "Teacher",
            &[
                "survey.create".to_string(),
                "survey.read".to_string(),
                "survey.update".to_string(),
            ],
        )
        .await
        .expect("memory store is infallible");

    store
        .save_actor(Actor::new(ActorId(1), "Student").with_owner(ActorId(2)))
        .await
        .expect("memory store is infallible");
    store
        .save_actor(Actor::new(ActorId(2), "Teacher"))
        .await
        .expect("memory store is infallible");

    store
}
