use std::cmp::Reverse;
use std::collections::BinaryHeap;

use thiserror::Error;

use crate::model::TypeInfo;
use crate::registry::Registry;

#[derive(Debug, Error)]
pub enum GraphError {
    /// Not every registered type made it into the ordered result. The
    /// leftover types sit on an inheritance cycle, which is a design error
    /// in the source.
    #[error("inheritance cycle among reflected types: {names}")]
    Cycle { names: String },
}

/// Topological registration order over the "base precedes derivative"
/// relation, via Kahn's algorithm.
///
/// Edges to base types outside the registry are ignored. Ties among
/// simultaneously-ready types break by registry insertion order, which keeps
/// generated output byte-stable across runs on unchanged input.
pub fn registration_order(registry: &Registry) -> Result<Vec<&TypeInfo>, GraphError> {
    let types = registry.types();
    let count = types.len();

    let mut in_degree = vec![0usize; count];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];

    for (index, ty) in types.iter().enumerate() {
        for base in &ty.base_types {
            if let Some(base_index) = registry.index_of(base) {
                dependents[base_index].push(index);
                in_degree[index] += 1;
            }
        }
    }

    // min-heap over insertion indices: the earliest-registered ready type wins
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(index, _)| Reverse(index))
        .collect();

    let mut order = Vec::with_capacity(count);
    let mut placed = vec![false; count];

    while let Some(Reverse(index)) = ready.pop() {
        placed[index] = true;
        order.push(&types[index]);
        for &dependent in &dependents[index] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }

    if order.len() != count {
        let names = types
            .iter()
            .enumerate()
            .filter(|(index, _)| !placed[*index])
            .map(|(_, ty)| ty.qualified_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(GraphError::Cycle { names });
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MethodInfo, SerializationMode, TypeInfo};

    fn type_with_bases(name: &str, bases: &[&str]) -> TypeInfo {
        let mut info = TypeInfo::new(name, name, "types.h", SerializationMode::Default);
        info.base_types = bases.iter().map(|base| (*base).to_owned()).collect();
        info.constructors.push(MethodInfo {
            name: name.to_owned(),
            return_type: magpie_ast::QualType::void(),
            returns_reference: false,
            is_const: false,
            arg_types: Vec::new(),
        });
        info
    }

    fn names(order: &[&TypeInfo]) -> Vec<String> {
        order.iter().map(|ty| ty.qualified_name.clone()).collect()
    }

    #[test]
    fn bases_precede_derivatives() {
        let mut registry = Registry::new();
        // inserted derived-first on purpose
        registry.insert_type(type_with_bases("Derived", &["Base"]));
        registry.insert_type(type_with_bases("Base", &[]));
        registry.insert_type(type_with_bases("Grandchild", &["Derived"]));

        let order = registration_order(&registry).unwrap();
        assert_eq!(names(&order), vec!["Base", "Derived", "Grandchild"]);
    }

    #[test]
    fn every_type_appears_exactly_once() {
        let mut registry = Registry::new();
        registry.insert_type(type_with_bases("A", &[]));
        registry.insert_type(type_with_bases("B", &["A"]));
        registry.insert_type(type_with_bases("C", &["A"]));
        registry.insert_type(type_with_bases("D", &["B", "C"]));

        let order = registration_order(&registry).unwrap();
        let mut sorted = names(&order);
        sorted.sort();
        assert_eq!(sorted, vec!["A", "B", "C", "D"]);

        let position = |name: &str| order
            .iter()
            .position(|ty| ty.qualified_name == name)
            .unwrap();
        assert!(position("A") < position("B"));
        assert!(position("A") < position("C"));
        assert!(position("B") < position("D"));
        assert!(position("C") < position("D"));
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let mut registry = Registry::new();
        registry.insert_type(type_with_bases("Zeta", &[]));
        registry.insert_type(type_with_bases("Alpha", &[]));
        registry.insert_type(type_with_bases("Mid", &[]));

        let order = registration_order(&registry).unwrap();
        assert_eq!(names(&order), vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn foreign_bases_are_ignored() {
        let mut registry = Registry::new();
        registry.insert_type(type_with_bases("Widget", &["QObject"]));

        let order = registration_order(&registry).unwrap();
        assert_eq!(names(&order), vec!["Widget"]);
    }

    #[test]
    fn cycles_are_reported_not_truncated() {
        let mut registry = Registry::new();
        registry.insert_type(type_with_bases("A", &["B"]));
        registry.insert_type(type_with_bases("B", &["A"]));
        registry.insert_type(type_with_bases("Free", &[]));

        let err = registration_order(&registry).unwrap_err();
        match err {
            GraphError::Cycle { names } => {
                assert!(names.contains('A'));
                assert!(names.contains('B'));
                assert!(!names.contains("Free"));
            }
        }
    }
}
