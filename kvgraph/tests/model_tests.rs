// Randomized operation sequences checked against a petgraph reference model

#[path = "testutils/mod.rs"]
mod testutils;

use kvgraph::codec::{KeyCodec, EDGE_COUNT_KEY};
use kvgraph::storage::{create_storage_driver, encode_counter, DriverConfig, StorageTree};
use kvgraph::{Direction, EncodingPolicy, GraphStore, StorageType, VertexId};
use petgraph::graphmap::DiGraphMap;
use std::collections::BTreeSet;
use testutils::test_fixture::GraphFixture;

const ID_RANGE: i64 = 40;

fn sorted(mut ids: Vec<i64>) -> Vec<VertexId> {
    ids.sort_unstable();
    ids.into_iter().map(VertexId).collect()
}

fn random_id(rng: &mut fastrand::Rng) -> i64 {
    // mix in ids around zero and at the extremes
    match rng.u8(0..10) {
        0 => i64::MIN + rng.i64(0..3),
        1 => i64::MAX - rng.i64(0..3),
        _ => rng.i64(-ID_RANGE..ID_RANGE),
    }
}

fn check_against_model(
    store: &GraphStore,
    model: &DiGraphMap<i64, ()>,
    markers: &BTreeSet<i64>,
    label: &str,
) {
    assert_eq!(store.count_edge().unwrap(), model.edge_count() as u64, "{}", label);
    assert_eq!(store.count_vertex().unwrap(), markers.len() as u64, "{}", label);

    for node in model.nodes() {
        let out = sorted(
            model
                .neighbors_directed(node, petgraph::Direction::Outgoing)
                .collect(),
        );
        let inn = sorted(
            model
                .neighbors_directed(node, petgraph::Direction::Incoming)
                .collect(),
        );
        assert_eq!(store.get_out_neighbours(node).unwrap(), out, "{} out({})", label, node);
        assert_eq!(store.get_in_neighbours(node).unwrap(), inn, "{} in({})", label, node);
        assert_eq!(store.out_degree_fast(node).unwrap(), out.len() as u64);
        assert_eq!(store.in_degree_fast(node).unwrap(), inn.len() as u64);
        assert_eq!(
            store.has_vertex(node).unwrap(),
            !out.is_empty() || !inn.is_empty() || markers.contains(&node),
            "{} has_vertex({})",
            label,
            node
        );
    }
}

#[test]
fn test_random_sequences_match_reference_model() {
    for (round, fixture) in GraphFixture::all().into_iter().enumerate() {
        let mut rng = fastrand::Rng::with_seed(0x6b76 + round as u64);
        let store = fixture.store();
        let mut model: DiGraphMap<i64, ()> = DiGraphMap::new();
        let mut markers = BTreeSet::new();

        for _ in 0..600 {
            let source = random_id(&mut rng);
            let target = random_id(&mut rng);
            match rng.u8(0..10) {
                0 => {
                    let added = store.add_vertex(source).unwrap();
                    assert_eq!(added, markers.insert(source));
                    model.add_node(source);
                }
                1..=5 => {
                    let existed = model.contains_edge(source, target);
                    assert_eq!(store.add_edge(source, target).unwrap(), !existed);
                    model.add_edge(source, target, ());
                }
                _ => {
                    let existed = model.remove_edge(source, target).is_some();
                    assert_eq!(store.delete_edge(source, target).unwrap(), existed);
                    model.add_node(source);
                    model.add_node(target);
                }
            }
        }

        check_against_model(store, &model, &markers, &fixture.label());
    }
}

#[test]
fn test_rebuild_repairs_tampered_counters() {
    let mut fixture =
        GraphFixture::new(EncodingPolicy::default()).expect("Failed to create fixture");
    for (source, target) in [(1, 2), (1, 3), (2, 3), (3, 1)] {
        fixture.store().add_edge(source, target).unwrap();
    }
    let options = fixture.options();
    fixture.store_mut().terminate().unwrap();

    // corrupt two counters behind the store's back
    {
        let path = options.path.clone().expect("sled fixture has a path");
        let driver = create_storage_driver(StorageType::Sled, &DriverConfig::new(path)).unwrap();
        let tree = driver.open_tree(&options.tree_name).unwrap();
        let codec = KeyCodec::new(EncodingPolicy::default());
        tree.insert(
            &codec.degree_key(VertexId(1), Direction::Out),
            &encode_counter(17),
        )
        .unwrap();
        tree.insert(EDGE_COUNT_KEY, &encode_counter(99)).unwrap();
        tree.flush().unwrap();
    }

    let mut store = GraphStore::open(options, EncodingPolicy::default()).unwrap();
    assert_eq!(store.out_degree_fast(1).unwrap(), 17);
    assert_eq!(store.out_degree(1).unwrap(), 2);

    let report = store.rebuild_counters().unwrap();
    assert_eq!(report.corrected, 2);
    assert_eq!(report.edges, 4);
    assert_eq!(report.dangling, 0);

    assert_eq!(store.out_degree_fast(1).unwrap(), 2);
    assert_eq!(store.count_edge().unwrap(), 4);
    assert!(store.rebuild_counters().unwrap().is_consistent());
    store.terminate().unwrap();
}
