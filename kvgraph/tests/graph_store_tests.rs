// Behaviour of the graph store operations under every policy and backend

#[path = "testutils/mod.rs"]
mod testutils;

use kvgraph::{Edge, GraphError, GraphOptions, GraphStore, Lifecycle, VertexId};
use testutils::test_fixture::GraphFixture;

fn ids(raw: &[i64]) -> Vec<VertexId> {
    raw.iter().copied().map(VertexId).collect()
}

#[test]
fn test_vertices_then_edge() {
    for fixture in GraphFixture::all() {
        let store = fixture.store();
        assert!(store.add_vertex(1).unwrap());
        assert!(store.add_vertex(2).unwrap());
        assert!(store.add_edge(1, 2).unwrap());

        assert_eq!(store.count_vertex().unwrap(), 2, "{}", fixture.label());
        assert_eq!(store.count_edge().unwrap(), 1, "{}", fixture.label());
        assert_eq!(store.get_out_neighbours(1).unwrap(), ids(&[2]));
        assert_eq!(store.get_in_neighbours(2).unwrap(), ids(&[1]));
        assert_eq!(store.out_degree(1).unwrap(), 1);
        assert_eq!(store.in_degree(2).unwrap(), 1);
        assert_eq!(store.out_degree_fast(1).unwrap(), 1);
        assert_eq!(store.in_degree_fast(2).unwrap(), 1);
    }
}

#[test]
fn test_delete_one_of_two_edges() {
    for fixture in GraphFixture::all() {
        let store = fixture.store();
        store.add_edge(1, 2).unwrap();
        store.add_edge(1, 3).unwrap();
        assert!(store.delete_edge(1, 2).unwrap());

        assert_eq!(
            store.get_out_neighbours(1).unwrap(),
            ids(&[3]),
            "{}",
            fixture.label()
        );
        assert_eq!(store.count_edge().unwrap(), 1);
        assert!(store.get_in_neighbours(2).unwrap().is_empty());
        fixture.assert_degrees_consistent(&[1, 2, 3]);
    }
}

#[test]
fn test_add_edge_is_idempotent() {
    for fixture in GraphFixture::all() {
        let store = fixture.store();
        assert!(store.add_edge(5, 6).unwrap());
        assert!(!store.add_edge(5, 6).unwrap());

        assert_eq!(store.count_edge().unwrap(), 1, "{}", fixture.label());
        assert_eq!(store.get_out_neighbours(5).unwrap(), ids(&[6]));
        assert_eq!(store.out_degree_fast(5).unwrap(), 1);
        assert_eq!(store.in_degree_fast(6).unwrap(), 1);
    }
}

#[test]
fn test_add_vertex_is_idempotent() {
    for fixture in GraphFixture::all() {
        let store = fixture.store();
        assert!(store.add_vertex(7).unwrap());
        assert!(!store.add_vertex(7).unwrap());
        assert_eq!(store.count_vertex().unwrap(), 1, "{}", fixture.label());
    }
}

#[test]
fn test_delete_missing_edge_is_noop() {
    for fixture in GraphFixture::all() {
        let store = fixture.store();
        store.add_edge(1, 2).unwrap();
        assert!(!store.delete_edge(2, 1).unwrap());
        assert!(!store.delete_edge(9, 9).unwrap());
        assert_eq!(store.count_edge().unwrap(), 1, "{}", fixture.label());
        fixture.assert_degrees_consistent(&[1, 2, 9]);
    }
}

#[test]
fn test_add_then_delete_restores_counts() {
    for fixture in GraphFixture::all() {
        let store = fixture.store();
        store.add_edges(&[Edge::new(1, 2), Edge::new(2, 3)]).unwrap();
        let before = store.count_edge().unwrap();

        store.add_edge(3, 1).unwrap();
        store.delete_edge(3, 1).unwrap();

        assert_eq!(store.count_edge().unwrap(), before, "{}", fixture.label());
        assert!(!store.get_out_neighbours(3).unwrap().contains(&VertexId(1)));
        assert!(!store.has_edge(3, 1).unwrap());
        fixture.assert_degrees_consistent(&[1, 2, 3]);
    }
}

#[test]
fn test_unknown_vertex_has_empty_results() {
    for fixture in GraphFixture::all() {
        let store = fixture.store();
        assert!(store.get_out_neighbours(42).unwrap().is_empty());
        assert_eq!(store.get_all_neighbours(42).unwrap(), (vec![], vec![]));
        assert_eq!(store.out_degree(42).unwrap(), 0);
        assert_eq!(store.in_degree_fast(42).unwrap(), 0);
        assert!(!store.has_vertex(42).unwrap());
    }
}

#[test]
fn test_neighbours_sorted_including_negative_ids() {
    for fixture in GraphFixture::all() {
        let store = fixture.store();
        for target in [300, -1, i64::MAX, 0, i64::MIN, -70_000, 255, 256] {
            store.add_edge(10, target).unwrap();
            store.add_edge(target, 10).unwrap();
        }
        let expected = ids(&[i64::MIN, -70_000, -1, 0, 255, 256, 300, i64::MAX]);
        assert_eq!(
            store.get_out_neighbours(10).unwrap(),
            expected,
            "{}",
            fixture.label()
        );
        assert_eq!(store.get_in_neighbours(10).unwrap(), expected);
        assert_eq!(store.get_in_neighbours(i64::MIN).unwrap(), ids(&[10]));
        fixture.assert_degrees_consistent(&[10, i64::MIN, i64::MAX, 0]);
    }
}

#[test]
fn test_self_loop_counts_once_per_direction() {
    for fixture in GraphFixture::all() {
        let store = fixture.store();
        store.add_edge(3, 3).unwrap();
        assert_eq!(
            store.get_all_neighbours(3).unwrap(),
            (ids(&[3]), ids(&[3])),
            "{}",
            fixture.label()
        );
        assert_eq!(store.count_edge().unwrap(), 1);
        fixture.assert_degrees_consistent(&[3]);
    }
}

#[test]
fn test_vertex_existence_is_implicit() {
    for fixture in GraphFixture::all() {
        let store = fixture.store();
        store.add_edge(1, 2).unwrap();
        assert!(store.has_vertex(1).unwrap());
        assert!(store.has_vertex(2).unwrap());
        // only explicit markers are counted
        assert_eq!(store.count_vertex().unwrap(), 0, "{}", fixture.label());

        store.delete_edge(1, 2).unwrap();
        assert!(!store.has_vertex(1).unwrap());
    }
}

#[test]
fn test_operations_after_terminate_fail() {
    for mut fixture in GraphFixture::all() {
        fixture.store_mut().terminate().unwrap();
        let store = fixture.store();
        assert_eq!(store.lifecycle(), Lifecycle::Terminated);

        assert!(matches!(
            store.add_edge(1, 2),
            Err(GraphError::InvalidState {
                state: Lifecycle::Terminated,
                ..
            })
        ));
        assert!(matches!(
            store.get_out_neighbours(1),
            Err(GraphError::InvalidState { .. })
        ));
        assert!(matches!(
            store.in_degree_fast(1),
            Err(GraphError::InvalidState { .. })
        ));
        assert!(matches!(store.stats(), Err(GraphError::InvalidState { .. })));
    }
}

#[test]
fn test_second_terminate_is_rejected() {
    let mut store = GraphStore::open(GraphOptions::in_memory(), Default::default()).unwrap();
    store.terminate().unwrap();
    assert!(matches!(
        store.terminate(),
        Err(GraphError::AlreadyTerminated)
    ));
}

#[test]
fn test_drop_releases_sled_lock() {
    let dir = tempfile::tempdir().unwrap();
    let options = GraphOptions::sled(dir.path().join("db"));
    {
        let store = GraphStore::open(options.clone(), Default::default()).unwrap();
        store.add_edge(1, 2).unwrap();
    }
    let mut store = GraphStore::open(options, Default::default()).unwrap();
    assert_eq!(store.count_edge().unwrap(), 1);
    store.terminate().unwrap();
}

#[test]
fn test_reopen_immediately_after_terminate() {
    let dir = tempfile::tempdir().unwrap();
    let options = GraphOptions::sled(dir.path().join("db"));
    for round in 0..30i64 {
        let mut store = GraphStore::open(options.clone(), Default::default()).unwrap();
        assert!(store.add_edge(round, round + 1).unwrap());
        assert_eq!(store.count_edge().unwrap(), (round + 1) as u64);
        store.terminate().unwrap();
    }
}

#[test]
fn test_sled_without_path_fails_to_open() {
    let options = GraphOptions::default();
    assert!(matches!(
        GraphStore::open(options, Default::default()),
        Err(GraphError::OpenError(_))
    ));
}
