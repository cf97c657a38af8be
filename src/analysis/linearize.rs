use crate::analysis::catalog::AnalysisDescriptor;
use crate::error::{KcResult, KitcovError};
use std::collections::{HashMap, HashSet};

/// Orders a registry so that every analysis appears exactly once and every
/// requirement strictly precedes its dependents.
///
/// Equivalent to rooting the graph at a synthetic node requiring every
/// registered analysis and taking the DFS finish-time order. An unknown
/// requirement or a dependency cycle is a configuration error, raised
/// before any analysis executes.
pub fn linearize(catalog: &[AnalysisDescriptor]) -> KcResult<Vec<&AnalysisDescriptor>> {
    let mut by_name: HashMap<&str, &AnalysisDescriptor> = HashMap::with_capacity(catalog.len());
    for desc in catalog {
        if by_name.insert(desc.name, desc).is_some() {
            return Err(KitcovError::Config(format!(
                "analysis \"{}\" is registered twice",
                desc.name
            )));
        }
    }
    for desc in catalog {
        for req in desc.requires {
            if !by_name.contains_key(req) {
                return Err(KitcovError::Config(format!(
                    "analysis \"{}\" has non-existent dependency \"{}\"",
                    desc.name, req
                )));
            }
        }
    }

    let mut walk = Walk {
        by_name: &by_name,
        done: HashSet::with_capacity(catalog.len()),
        path: Vec::new(),
        order: Vec::with_capacity(catalog.len()),
    };
    for desc in catalog {
        walk.visit(desc)?;
    }
    Ok(walk.order)
}

struct Walk<'a, 'b> {
    by_name: &'b HashMap<&'a str, &'a AnalysisDescriptor>,
    done: HashSet<&'a str>,
    path: Vec<&'a str>,
    order: Vec<&'a AnalysisDescriptor>,
}

impl<'a> Walk<'a, '_> {
    fn visit(&mut self, desc: &'a AnalysisDescriptor) -> KcResult<()> {
        if let Some(pos) = self.path.iter().position(|n| *n == desc.name) {
            let mut cycle: Vec<&str> = self.path[pos..].to_vec();
            cycle.push(desc.name);
            return Err(KitcovError::Config(format!(
                "analysis dependency cycle: {}",
                cycle.join(" -> ")
            )));
        }
        if self.done.contains(desc.name) {
            return Ok(());
        }

        self.path.push(desc.name);
        for req in desc.requires {
            self.visit(self.by_name[*req])?;
        }
        self.path.pop();

        self.done.insert(desc.name);
        self.order.push(desc);
        Ok(())
    }
}
