use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use strata_core::graph::PackageGraph;
use strata_core::Package;

/// A random acyclic graph: package `i` may only depend on packages `j < i`.
fn gen_dag() -> impl Strategy<Value = (Vec<Package>, HashMap<Package, Vec<Package>>)> {
    (1usize..10)
        .prop_flat_map(|n| {
            let edges = (0..n)
                .map(|i| proptest::collection::vec(0..i.max(1), 0..=i.min(3)))
                .collect::<Vec<_>>();
            (Just(n), edges)
        })
        .prop_map(|(n, edges)| {
            let packages: Vec<Package> = (0..n)
                .map(|i| Package::new(format!("/repo/pkg{:02}", i), "/repo"))
                .collect();
            let mut deps = HashMap::new();
            for (i, parents) in edges.into_iter().enumerate() {
                let mut unique: Vec<Package> = Vec::new();
                for j in parents {
                    if j < i && !unique.contains(&packages[j]) {
                        unique.push(packages[j].clone());
                    }
                }
                deps.insert(packages[i].clone(), unique);
            }
            (packages, deps)
        })
}

fn build(packages: &[Package], deps: &HashMap<Package, Vec<Package>>) -> PackageGraph {
    PackageGraph::from_dependencies(packages, |p| Ok(deps[p].clone())).unwrap()
}

proptest! {
    #[test]
    fn test_order_visits_every_package_once((packages, deps) in gen_dag()) {
        let graph = build(&packages, &deps);
        let order = graph.order().unwrap();

        prop_assert_eq!(order.len(), packages.len());
        let unique: HashSet<&Package> = order.iter().collect();
        prop_assert_eq!(unique.len(), packages.len());
    }

    #[test]
    fn test_order_respects_dependencies((packages, deps) in gen_dag()) {
        let graph = build(&packages, &deps);
        let order = graph.order().unwrap();
        let position: HashMap<&Package, usize> =
            order.iter().enumerate().map(|(i, p)| (p, i)).collect();

        for (child, parents) in &deps {
            for parent in parents {
                prop_assert!(position[parent] < position[child]);
            }
        }
    }

    #[test]
    fn test_inverted_order_puts_dependents_first((packages, deps) in gen_dag()) {
        let graph = build(&packages, &deps);
        let order = graph.invert().order().unwrap();
        let position: HashMap<&Package, usize> =
            order.iter().enumerate().map(|(i, p)| (p, i)).collect();

        for (child, parents) in &deps {
            for parent in parents {
                prop_assert!(position[child] < position[parent]);
            }
        }
    }

    #[test]
    fn test_levels_exceed_parent_levels((packages, deps) in gen_dag()) {
        let graph = build(&packages, &deps);
        let levels: HashMap<Package, usize> = graph
            .consume_tree(|node, level| Some((node.package().clone(), level)))
            .unwrap()
            .into_iter()
            .collect();

        for (child, parents) in &deps {
            for parent in parents {
                prop_assert!(levels[parent] < levels[child]);
            }
        }
    }

    #[test]
    fn test_expand_is_idempotent(
        (packages, deps) in gen_dag(),
        ancestors: bool,
        descendants: bool,
    ) {
        let graph = build(&packages, &deps);
        let initial = vec![packages[packages.len() / 2].clone()];

        let once: HashSet<Package> = graph
            .expand(&initial, ancestors, descendants)
            .into_iter()
            .collect();
        let again: Vec<Package> = once.iter().cloned().collect();
        let twice: HashSet<Package> = graph
            .expand(&again, ancestors, descendants)
            .into_iter()
            .collect();
        prop_assert_eq!(once, twice);
    }
}
