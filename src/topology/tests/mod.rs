use crate::topology::{EdgeIndex, TopologyError};

#[test]
fn test_edge_index_groups_incoming_edges() {
    let edges = EdgeIndex::new(3, &[(0, 1), (2, 1), (1, 0)]).unwrap();
    assert_eq!(edges.num_nodes(), 3);
    assert_eq!(edges.num_edges(), 3);
    assert_eq!(edges.incoming(1), &[0, 1]);
    assert_eq!(edges.incoming(0), &[2]);
    assert_eq!(edges.in_degree(2), 0);
    assert_eq!(edges.isolated_nodes(), vec![2]);
    assert_eq!(edges.edge(1), (2, 1));
}

#[test]
fn test_edge_index_rejects_invalid_reference() {
    assert_eq!(
        EdgeIndex::new(3, &[(0, 1), (1, 3)]),
        Err(TopologyError::InvalidGraphReference {
            edge: 1,
            node: 3,
            num_nodes: 3
        })
    );
    assert_eq!(
        EdgeIndex::from_coo(3, vec![0, 1], vec![1]),
        Err(TopologyError::LengthMismatch { src: 2, dst: 1 })
    );
}

#[test]
fn test_undirected_expands_reciprocal_edges() {
    let edges = EdgeIndex::undirected(4, &[(0, 1), (1, 2), (2, 3), (3, 3)]).unwrap();
    assert_eq!(edges.num_edges(), 7);
    assert_eq!(edges.src(), &[0, 1, 1, 2, 2, 3, 3]);
    assert_eq!(edges.dst(), &[1, 0, 2, 1, 3, 2, 3]);
}

#[test]
fn test_with_self_loops_adds_missing_loops_only() {
    let edges = EdgeIndex::new(3, &[(0, 1), (1, 1)]).unwrap();
    let looped = edges.with_self_loops();
    // 节点1已有自环，只为节点0和2补充
    assert_eq!(looped.num_edges(), 4);
    assert_eq!(looped.edge(2), (0, 0));
    assert_eq!(looped.edge(3), (2, 2));
    assert!(looped.isolated_nodes().is_empty());
    assert_eq!(looped.incoming(1), &[0, 1]);
}

#[test]
fn test_empty_graph() {
    let edges = EdgeIndex::new(2, &[]).unwrap();
    assert_eq!(edges.num_edges(), 0);
    assert_eq!(edges.isolated_nodes(), vec![0, 1]);
}
