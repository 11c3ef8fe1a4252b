use std::cmp::Ordering;

use derive_more::{Display, Error, IsVariant};

use super::node::{self, Link};
use super::{Comparator, KeyPolicy, OrderTree};

/// A broken structural invariant, as reported by [`OrderTree::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, IsVariant)]
pub enum InvariantViolation {
    #[display("the root is red")]
    RedRoot,
    #[display("a red node has a red child")]
    RedChild,
    #[display("black heights differ between siblings ({left} and {right})")]
    BlackHeight { left: usize, right: usize },
    #[display("a size counter reads {stored} but its subtree holds {actual} elements")]
    SizeMismatch { stored: usize, actual: usize },
    #[display("elements are out of order")]
    Order,
    #[display("a parent link doesn't point at the owning node")]
    ParentLink,
    #[display("a node holds an empty chain")]
    EmptyChain,
    #[display("colliding elements were admitted by a tree that rejects them")]
    UnexpectedChain,
}

use InvariantViolation::*;

pub(crate) fn validate<T, C, P>(tree: &OrderTree<T, C, P>) -> Result<(), InvariantViolation>
where
    C: Comparator<T>,
    P: KeyPolicy,
{
    if let Some(root) = tree.root {
        if root.is_red() {
            Err(RedRoot)?
        }
        if root.parent().is_some() {
            Err(ParentLink)?
        }

        let mut previous = root.minimum();
        while let Some(node) = previous.next() {
            if tree.cmp.compare(previous.key(), node.key()) != Ordering::Less {
                Err(Order)?
            }
            previous = node;
        }
    }

    check_subtree(tree, tree.root).map(|_| ())
}

/// Validates the subtree and returns its black height, counting the nil leaves.
fn check_subtree<T, C, P>(tree: &OrderTree<T, C, P>, link: Link<T>) -> Result<usize, InvariantViolation>
where
    C: Comparator<T>,
    P: KeyPolicy,
{
    let Some(node) = link else {
        return Ok(1);
    };

    let chain = node.chain();
    match chain.len() {
        0 => Err(EmptyChain)?,
        1 => (),
        _ if !P::CHAINED => Err(UnexpectedChain)?,
        _ => (),
    }
    if chain
        .as_slice()
        .iter()
        .any(|entry| tree.cmp.compare(entry, chain.key()) != Ordering::Equal)
    {
        Err(Order)?
    }

    for child in [node.left(), node.right()].into_iter().flatten() {
        if child.parent() != Some(node) {
            Err(ParentLink)?
        }
        if node.is_red() && child.is_red() {
            Err(RedChild)?
        }
    }

    let left = check_subtree(tree, node.left())?;
    let right = check_subtree(tree, node.right())?;
    if left != right {
        Err(BlackHeight { left, right })?
    }

    let actual = chain.len() + node::size_of(node.left()) + node::size_of(node.right());
    if node.size() != actual {
        Err(SizeMismatch { stored: node.size(), actual })?
    }

    Ok(left + usize::from(!node.is_red()))
}
