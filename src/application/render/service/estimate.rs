use tracing::trace;

use crate::config::RenderConfig;
use crate::domain::{Environment, Node, NodeKind};

use super::walker::EntityWalker;

/// Rendered size of a single node, measured by rendering it alone.
///
/// The count includes the node's trailing separators, which a final render
/// would trim only at the very end of a chunk.
pub fn estimate(node: &Node, environment: &Environment, config: &RenderConfig) -> usize {
    Estimator::new(config, environment).node(node)
}

#[derive(Clone, Copy)]
pub(crate) struct Estimator<'a> {
    pub(crate) config: &'a RenderConfig,
    pub(crate) environment: &'a Environment,
}

impl<'a> Estimator<'a> {
    pub(crate) fn new(config: &'a RenderConfig, environment: &'a Environment) -> Self {
        Self {
            config,
            environment,
        }
    }

    pub(crate) fn node(&self, node: &Node) -> usize {
        let mut walker = EntityWalker::new(self.config, self.environment);
        walker.visit(node);
        let units = walker.units();
        trace!(
            target = "application::render::estimate",
            kind = node.kind.name(),
            units,
            "estimated node"
        );
        units
    }

    pub(crate) fn list_item(&self, list: &Node, item: &Node, number: usize) -> usize {
        let single = with_start(list, vec![item.clone()], number);
        self.node(&single).saturating_sub(1)
    }
}

pub(crate) fn with_start(list: &Node, items: Vec<Node>, start: usize) -> Node {
    let mut fragment = list.rewrap(items);
    if let NodeKind::List { start: first, .. } = &mut fragment.kind {
        *first = start;
    }
    fragment
}
