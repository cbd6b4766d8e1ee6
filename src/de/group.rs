//! Groups flat query items back into a tree.

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::config::{ArrayFormat, Config};
use crate::error::{Error, Result};
use crate::item::QueryItem;
use crate::path::{Path, Segment};
use crate::tree::{Node, NodeId, Slot, Tree};
use crate::value::Primitive;

/// Intermediate trie of item names.
///
/// Grouping happens in two passes: names are first split on `.` and merged
/// into this trie, then every branch is turned into a keyed or an unkeyed
/// node depending on its segments.
#[derive(Debug)]
enum Group<'i> {
    /// A freshly-created slot which has no values yet.
    Uninitialized,
    Leaf(Vec<Option<&'i str>>),
    Branch(IndexMap<&'i str, Group<'i>>),
}

fn mismatch(segments: &[&str], depth: usize) -> Error {
    let path: Path = segments[..depth].iter().map(|s| Segment::parse(s)).collect();
    Error::structural(
        &path,
        format_args!("`{path}` is used both for a value and for a nested container"),
    )
}

impl<'i> Group<'i> {
    fn insert(
        &mut self,
        segments: &[&'i str],
        depth: usize,
        value: Option<&'i str>,
    ) -> Result<()> {
        let Some(&segment) = segments.get(depth) else {
            return match self {
                Group::Uninitialized => {
                    *self = Group::Leaf(vec![value]);
                    Ok(())
                }
                Group::Leaf(values) => {
                    values.push(value);
                    Ok(())
                }
                Group::Branch(_) => Err(mismatch(segments, depth)),
            };
        };
        if let Group::Uninitialized = self {
            *self = Group::Branch(IndexMap::new());
        }
        let Group::Branch(children) = self else {
            return Err(mismatch(segments, depth));
        };
        match children.entry(segment) {
            Entry::Occupied(o) => o.into_mut().insert(segments, depth + 1, value),
            Entry::Vacant(v) => v
                .insert(Group::Uninitialized)
                .insert(segments, depth + 1, value),
        }
    }
}

pub(crate) fn group(items: &[QueryItem], config: &Config) -> Result<Tree> {
    let mut root = Group::Uninitialized;
    for item in items {
        tracing::trace!(name = %item.name, "grouping query item");
        let segments: Vec<&str> = if item.name.is_empty() {
            Vec::new()
        } else {
            item.name.split('.').collect()
        };
        if segments.len() > config.max_depth_limit() {
            return Err(Error::contract(format_args!(
                "`{}` is nested deeper than the maximum depth of {}",
                item.name,
                config.max_depth_limit()
            )));
        }
        root.insert(&segments, 0, item.value.as_deref())?;
    }

    let mut tree = Tree::new(config.max_depth_limit());
    let id = tree.root();
    build(&mut tree, id, root, config.array_format_kind())?;
    Ok(tree)
}

fn leaf(value: Option<&str>) -> Node {
    Node::Single(Slot::Primitive(value.map_or(Primitive::Nil, Primitive::from)))
}

/// Fills the already allocated node `id` from `group`.
fn build(tree: &mut Tree, id: NodeId, group: Group<'_>, array_format: ArrayFormat) -> Result<()> {
    match group {
        Group::Uninitialized => tree.replace(id, Node::Keyed(IndexMap::new())),
        Group::Leaf(values) if values.len() == 1 => tree.replace(id, leaf(values[0])),
        Group::Leaf(values) => {
            let path = tree.path(id).clone();
            if array_format == ArrayFormat::Ordered {
                return Err(Error::structural(
                    &path,
                    format_args!("`{path}` occurs {} times", values.len()),
                ));
            }
            let mut children = Vec::with_capacity(values.len());
            for value in values {
                children.push(tree.alloc(path.clone(), leaf(value))?);
            }
            tree.replace(id, Node::Unkeyed(children));
        }
        Group::Branch(children) => {
            let path = tree.path(id).clone();
            let indices: Option<Vec<usize>> = children
                .keys()
                .map(|segment| Segment::parse(segment).as_index())
                .collect();
            match indices {
                Some(indices) => {
                    let mut elements: Vec<_> =
                        indices.into_iter().zip(children.into_values()).collect();
                    elements.sort_by_key(|(index, _)| *index);
                    let mut ids = Vec::with_capacity(elements.len());
                    for (index, group) in elements {
                        let child = tree.alloc(path.appending(index), Node::Single(Slot::Empty))?;
                        build(tree, child, group, array_format)?;
                        ids.push(child);
                    }
                    tree.replace(id, Node::Unkeyed(ids));
                }
                None => {
                    let mut keyed = IndexMap::with_capacity(children.len());
                    for (key, group) in children {
                        let child = tree.alloc(path.appending(key), Node::Single(Slot::Empty))?;
                        build(tree, child, group, array_format)?;
                        keyed.insert(key.to_owned(), child);
                    }
                    tree.replace(id, Node::Keyed(keyed));
                }
            }
        }
    }
    Ok(())
}
