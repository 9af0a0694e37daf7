// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Reverse-mode gradient graph.
//!
//! Each tensor may hold a reference to a [`Node`]. Calling a node with an
//! upstream gradient propagates it towards the leaves:
//!
//! ```text
//!   a (Accumulate)   b (Accumulate)
//!          ▲               ▲
//!          │ g * b         │ g * a
//!          └──── c = a * b ┘
//!               (Multiply)
//!                   ▲
//!                   │ g
//! ```
//!
//! Nodes are shared (`Arc`) and only point from children to parents, so the
//! graph is acyclic and is freed when the last tensor referencing it drops.
//!
//! Only multiplication builds a [`Node::Multiply`]. Every other operation
//! produces a tensor without a node; a gradient can not flow back through
//! it. Tensors expose this through [`crate::Tensor::grad_kind`].
//!
//! Propagation does not track visits. A node reached along two paths
//! propagates twice and leaves accumulate once per arrival.
//!
//! Neither propagation nor teardown recurses, so graph depth is bounded by
//! memory rather than by the thread stack.

use crate::{Element, Tensor, TensorError};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared handle to a gradient node.
pub type NodeRef<T> = Arc<Mutex<Node<T>>>;

/// A gradient graph node.
pub enum Node<T: Element> {
    /// Discards every gradient it receives.
    NoOp,
    /// Leaf: stores every gradient it receives, in arrival order.
    Accumulate { grads: Vec<Tensor<T>> },
    /// Output of `lhs * rhs`. Forwards `g * rhs` to `parents[0]` and
    /// `g * lhs` to `parents[1]`. An operand is only kept while the
    /// opposite parent exists.
    Multiply {
        lhs: Option<Tensor<T>>,
        rhs: Option<Tensor<T>>,
        parents: [Option<NodeRef<T>>; 2],
    },
}

/// The variant of a tensor's gradient node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradKind {
    NoOp,
    Accumulate,
    Multiply,
}

impl<T: Element> Node<T> {
    pub(crate) fn shared(node: Node<T>) -> NodeRef<T> {
        Arc::new(Mutex::new(node))
    }

    /// A fresh, empty leaf.
    pub fn leaf() -> NodeRef<T> {
        Self::shared(Node::Accumulate { grads: Vec::new() })
    }

    /// A multiply node over the given operands. Operand node references are
    /// dropped; the wiring lives in `parents`.
    pub(crate) fn multiply(
        lhs: Tensor<T>,
        rhs: Tensor<T>,
        parents: [Option<NodeRef<T>>; 2],
    ) -> NodeRef<T> {
        let keep_lhs = parents[1].is_some();
        let keep_rhs = parents[0].is_some();
        Self::shared(Node::Multiply {
            lhs: keep_lhs.then(|| lhs.without_node()),
            rhs: keep_rhs.then(|| rhs.without_node()),
            parents,
        })
    }

    pub fn kind(&self) -> GradKind {
        match self {
            Node::NoOp => GradKind::NoOp,
            Node::Accumulate { .. } => GradKind::Accumulate,
            Node::Multiply { .. } => GradKind::Multiply,
        }
    }
}

impl<T: Element> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::NoOp => f.write_str("NoOp"),
            Node::Accumulate { grads } => f
                .debug_struct("Accumulate")
                .field("grads", &grads.len())
                .finish(),
            Node::Multiply { lhs, rhs, parents } => f
                .debug_struct("Multiply")
                .field("lhs", &lhs.as_ref().map(Tensor::shape))
                .field("rhs", &rhs.as_ref().map(Tensor::shape))
                .field("parents", &parents.iter().filter(|p| p.is_some()).count())
                .finish(),
        }
    }
}

impl<T: Element> Drop for Node<T> {
    // Unlinks parent chains one node at a time; the default drop would
    // recurse once per graph level.
    fn drop(&mut self) {
        let Node::Multiply { parents, .. } = self else {
            return;
        };
        let mut orphans: Vec<NodeRef<T>> = parents.iter_mut().filter_map(Option::take).collect();
        while let Some(node) = orphans.pop() {
            let Ok(mutex) = Arc::try_unwrap(node) else {
                continue;
            };
            let mut inner = mutex.into_inner().unwrap_or_else(PoisonError::into_inner);
            if let Node::Multiply { parents, .. } = &mut inner {
                orphans.extend(parents.iter_mut().filter_map(Option::take));
            }
        }
    }
}

pub(crate) fn lock<T: Element>(node: &NodeRef<T>) -> MutexGuard<'_, Node<T>> {
    node.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Invokes `node` with upstream gradient `grad`.
///
/// Nodes are visited depth first, `lhs` branch before `rhs` branch, from an
/// explicit worklist. Gradient products computed here are not recorded in
/// the graph.
pub(crate) fn propagate<T: Element>(node: &NodeRef<T>, grad: &Tensor<T>) -> Result<(), TensorError> {
    let mut pending = vec![(Arc::clone(node), grad.clone())];

    while let Some((node, grad)) = pending.pop() {
        let fan_out = {
            let mut guard = lock(&node);
            match &mut *guard {
                Node::NoOp => None,
                Node::Accumulate { grads } => {
                    grads.push(grad.clone().without_node());
                    None
                }
                Node::Multiply { lhs, rhs, parents } => {
                    Some((lhs.clone(), rhs.clone(), parents.clone()))
                }
            }
        };

        let Some((lhs, rhs, [to_lhs, to_rhs])) = fan_out else {
            continue;
        };

        // LIFO: the rhs branch goes in first so the lhs branch runs first.
        if let (Some(parent), Some(lhs)) = (to_rhs, lhs) {
            pending.push((parent, grad.mul_untracked(&lhs)?));
        }
        if let (Some(parent), Some(rhs)) = (to_lhs, rhs) {
            pending.push((parent, grad.mul_untracked(&rhs)?));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use device_runtime::{Device, DeviceConfig};

    fn device() -> Device {
        Device::new(DeviceConfig {
            memory_budget: "1M".into(),
            num_threads: Some(2),
            ..Default::default()
        })
        .unwrap()
    }

    fn grads_of(node: &NodeRef<f32>) -> Vec<Vec<f32>> {
        match &*lock(node) {
            Node::Accumulate { grads } => grads.iter().map(|g| g.to_vec().unwrap()).collect(),
            other => panic!("expected a leaf, got {other:?}"),
        }
    }

    #[test]
    fn test_leaf_accumulates_in_order() {
        let dev = device();
        let leaf = Node::leaf();
        let g1 = Tensor::from_values(&dev, &[1.0f32, 2.0], [2]).unwrap();
        let g2 = Tensor::from_values(&dev, &[3.0f32, 4.0], [2]).unwrap();
        propagate(&leaf, &g1).unwrap();
        propagate(&leaf, &g2).unwrap();
        assert_eq!(grads_of(&leaf), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_noop_discards() {
        let dev = device();
        let node = Node::shared(Node::<f32>::NoOp);
        let g = Tensor::from_values(&dev, &[1.0f32], [1]).unwrap();
        propagate(&node, &g).unwrap();
        assert_eq!(lock(&node).kind(), GradKind::NoOp);
    }

    #[test]
    fn test_multiply_fans_out_with_product_rule() {
        let dev = device();
        let a = Tensor::from_values(&dev, &[2.0f32, 3.0], [2]).unwrap();
        let b = Tensor::from_values(&dev, &[5.0f32, 7.0], [2]).unwrap();
        let (la, lb) = (Node::leaf(), Node::leaf());
        let node = Node::multiply(a, b, [Some(la.clone()), Some(lb.clone())]);

        let g = Tensor::from_values(&dev, &[1.0f32, 10.0], [2]).unwrap();
        propagate(&node, &g).unwrap();
        assert_eq!(grads_of(&la), vec![vec![5.0, 70.0]]);
        assert_eq!(grads_of(&lb), vec![vec![2.0, 30.0]]);
    }

    #[test]
    fn test_missing_parent_is_skipped() {
        let dev = device();
        let a = Tensor::from_values(&dev, &[2.0f32], [1]).unwrap();
        let b = Tensor::from_values(&dev, &[5.0f32], [1]).unwrap();
        let lb = Node::leaf();
        let node = Node::multiply(a, b, [None, Some(lb.clone())]);

        let g = Tensor::from_values(&dev, &[1.0f32], [1]).unwrap();
        propagate(&node, &g).unwrap();
        assert_eq!(grads_of(&lb), vec![vec![2.0]]);
    }

    #[test]
    fn test_operands_kept_only_for_present_parents() {
        let dev = device();
        let a = Tensor::from_values(&dev, &[2.0f32], [1]).unwrap();
        let b = Tensor::from_values(&dev, &[5.0f32], [1]).unwrap();

        let bare = Node::multiply(a.clone(), b.clone(), [None, None]);
        assert!(matches!(
            &*lock(&bare),
            Node::Multiply { lhs: None, rhs: None, .. }
        ));

        let to_lhs = Node::multiply(a, b, [Some(Node::leaf()), None]);
        assert!(matches!(
            &*lock(&to_lhs),
            Node::Multiply { lhs: None, rhs: Some(_), .. }
        ));
    }

    #[test]
    fn test_deep_chain_propagates_without_recursion() {
        let dev = device();
        let one = Tensor::from_values(&dev, &[1.0f32], [1]).unwrap();
        let leaf = Node::leaf();
        let mut head = Arc::clone(&leaf);
        for _ in 0..20_000 {
            head = Node::multiply(one.clone(), one.clone(), [Some(head), None]);
        }

        propagate(&head, &one).unwrap();
        assert_eq!(grads_of(&leaf), vec![vec![1.0]]);
    }

    #[test]
    fn test_deep_chain_drops_without_recursion() {
        let dev = device();
        let one = Tensor::from_values(&dev, &[1.0f32], [1]).unwrap();
        let leaf = Node::leaf();
        let mut head = Arc::clone(&leaf);
        for _ in 0..200_000 {
            head = Node::multiply(one.clone(), one.clone(), [Some(head), None]);
        }
        drop(head);
        assert_eq!(Arc::strong_count(&leaf), 1);
    }

    #[test]
    fn test_shared_parent_receives_both_contributions() {
        let dev = device();
        let a = Tensor::from_values(&dev, &[3.0f32], [1]).unwrap();
        let leaf = Node::leaf();
        let node = Node::multiply(a.clone(), a, [Some(leaf.clone()), Some(leaf.clone())]);

        let g = Tensor::from_values(&dev, &[1.0f32], [1]).unwrap();
        propagate(&node, &g).unwrap();
        assert_eq!(grads_of(&leaf), vec![vec![3.0], vec![3.0]]);
    }

    #[test]
    fn test_debug() {
        let leaf: NodeRef<f64> = Node::leaf();
        assert_eq!(format!("{:?}", *lock(&leaf)), "Accumulate { grads: 0 }");
    }
}
