use crate::types::ConceptGraph;
use std::collections::{HashMap, HashSet};

impl ConceptGraph {
    /// `(id, defect)` for every node that carries an error
    pub fn defects(&self) -> Vec<(&str, &str)> {
        self.nodes
            .iter()
            .filter_map(|node| Some((node.id.as_str(), node.error.as_deref()?)))
            .collect()
    }

    /// True when ids are unique, every edge joins known nodes, exactly one
    /// node has no parent, every other node has exactly one, and all nodes
    /// are reachable from the root.
    pub fn is_tree(&self) -> bool {
        if self.nodes.is_empty() || self.edges.len() + 1 != self.nodes.len() {
            return false;
        }

        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        if ids.len() != self.nodes.len() {
            return false;
        }

        let mut parents: HashMap<&str, &str> = HashMap::new();
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &self.edges {
            let (source, target) = (edge.source.as_str(), edge.target.as_str());
            if !ids.contains(source) || !ids.contains(target) {
                return false;
            }
            if parents.insert(target, source).is_some() {
                return false;
            }
            children.entry(source).or_default().push(target);
        }

        let mut roots = ids.iter().filter(|id| !parents.contains_key(*id));
        let (Some(root), None) = (roots.next(), roots.next()) else {
            return false;
        };

        let mut seen = HashSet::new();
        let mut stack = vec![*root];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                return false;
            }
            if let Some(next) = children.get(current) {
                stack.extend(next.iter().copied());
            }
        }

        seen.len() == ids.len()
    }
}
