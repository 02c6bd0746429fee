//! Bottom-up tree rebuilding on an explicit stack.
//!
//! Conversions over nested values (owning, cloning, JSON bridging) all walk
//! the input the same way: split a node into an empty output container plus
//! its labelled children, then attach finished children to their parent.
//! Doing that with a heap stack keeps stack use flat for any nesting the
//! decoder accepts.

use std::vec;

struct Frame<N, L, C> {
    node: N,
    label: Option<L>,
    children: vec::IntoIter<(L, C)>,
}

/// Rebuild the tree rooted at `root`.
///
/// `split` maps a source node to its output node with no children attached
/// yet and the labelled source children still to visit. `attach` appends a
/// finished child to its parent under the child's label.
pub(crate) fn rebuild<N, L, C>(
    root: C,
    mut split: impl FnMut(C) -> (N, Vec<(L, C)>),
    mut attach: impl FnMut(&mut N, L, N),
) -> N {
    let (node, children) = split(root);
    let mut root = Frame {
        node,
        label: None,
        children: children.into_iter(),
    };
    let mut stack: Vec<Frame<N, L, C>> = Vec::new();

    loop {
        let frame = stack.last_mut().unwrap_or(&mut root);
        match frame.children.next() {
            Some((label, source)) => {
                let (node, children) = split(source);
                if children.is_empty() {
                    attach(&mut frame.node, label, node);
                } else {
                    stack.push(Frame {
                        node,
                        label: Some(label),
                        children: children.into_iter(),
                    });
                }
            }
            None => match stack.pop() {
                Some(done) => {
                    let parent = stack.last_mut().unwrap_or(&mut root);
                    if let Some(label) = done.label {
                        attach(&mut parent.node, label, done.node);
                    }
                }
                None => return root.node,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Tree {
        Leaf(u32),
        Node(Vec<(char, Tree)>),
    }

    fn copy(tree: &Tree) -> Tree {
        rebuild(
            tree,
            |t| match t {
                Tree::Leaf(n) => (Tree::Leaf(*n), Vec::new()),
                Tree::Node(kids) => (
                    Tree::Node(Vec::new()),
                    kids.iter().map(|(c, k)| (*c, k)).collect(),
                ),
            },
            |parent, label, child| {
                if let Tree::Node(kids) = parent {
                    kids.push((label, child));
                }
            },
        )
    }

    #[test]
    fn test_rebuild_keeps_shape_and_order() {
        let tree = Tree::Node(vec![
            ('a', Tree::Leaf(1)),
            ('b', Tree::Node(vec![('c', Tree::Leaf(2)), ('d', Tree::Node(vec![]))])),
            ('e', Tree::Leaf(3)),
        ]);
        assert_eq!(copy(&tree), tree);
        assert_eq!(copy(&Tree::Leaf(9)), Tree::Leaf(9));
    }

    #[test]
    fn test_rebuild_deep_chain() {
        let depth = 10_000;
        let mut tree = Tree::Leaf(0);
        for _ in 0..depth {
            tree = Tree::Node(vec![('x', tree)]);
        }
        let copied = copy(&tree);

        let mut levels = 0;
        let mut cursor = &copied;
        while let Tree::Node(kids) = cursor {
            cursor = &kids[0].1;
            levels += 1;
        }
        assert_eq!(levels, depth);
        assert_eq!(cursor, &Tree::Leaf(0));

        // Tear both down level by level; the test type has no iterative drop.
        for mut t in [tree, copied] {
            while let Tree::Node(mut kids) = t {
                t = kids.pop().map_or(Tree::Leaf(0), |(_, k)| k);
            }
        }
    }
}
