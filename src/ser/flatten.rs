use crate::config::ArrayFormat;
use crate::error::{Error, Result};
use crate::item::QueryItem;
use crate::tree::{Node, NodeId, Slot, Tree};

/// Flattens a tree into query items in depth-first order.
///
/// Names are the dot-joined keys of the path to each leaf. Sequence
/// elements are named by index under [`ArrayFormat::Ordered`] and repeat
/// the sequence's own name under [`ArrayFormat::Repeated`]. Empty keyed
/// containers below the root are written as an empty value so their
/// presence survives, while empty sequences produce nothing.
pub fn flatten(tree: &Tree, array_format: ArrayFormat) -> Result<Vec<QueryItem>> {
    let mut flattener = Flattener {
        tree,
        array_format,
        items: Vec::new(),
    };
    flattener.visit(tree.root(), "")?;
    Ok(flattener.items)
}

struct Flattener<'t> {
    tree: &'t Tree,
    array_format: ArrayFormat,
    items: Vec<QueryItem>,
}

impl Flattener<'_> {
    fn push(&mut self, name: &str, value: Option<String>) {
        tracing::trace!(name, "flattened query item");
        self.items.push(QueryItem {
            name: name.to_owned(),
            value,
        });
    }

    fn visit(&mut self, id: NodeId, name: &str) -> Result<()> {
        let separator = if name.is_empty() { "" } else { "." };
        match self.tree.node(id) {
            Node::Keyed(children) if children.is_empty() => {
                if !name.is_empty() {
                    self.push(name, Some(String::new()));
                }
            }
            Node::Keyed(children) => {
                for (key, child) in children {
                    self.visit(*child, &format!("{name}{separator}{key}"))?;
                }
            }
            Node::Unkeyed(children) => {
                for (index, child) in children.iter().enumerate() {
                    let element = match self.array_format {
                        ArrayFormat::Ordered => format!("{name}{separator}{index}"),
                        ArrayFormat::Repeated if name.is_empty() => index.to_string(),
                        ArrayFormat::Repeated => name.to_owned(),
                    };
                    self.visit(*child, &element)?;
                }
            }
            Node::Single(Slot::Primitive(value)) => match value.render() {
                Some(rendered) => self.push(name, Some(rendered.into_owned())),
                None if !name.is_empty() => self.push(name, None),
                None => {}
            },
            Node::Single(Slot::Nested(child)) | Node::Deferred(Some(child)) => {
                self.visit(*child, name)?;
            }
            Node::Single(Slot::Empty) => {
                return Err(Error::contract(format_args!(
                    "nothing was ever encoded to the single value container at `{}`",
                    self.tree.path(id)
                )));
            }
            Node::Deferred(None) => {
                return Err(Error::contract(format_args!(
                    "nothing was ever encoded to the delegated encoder at `{}`",
                    self.tree.path(id)
                )));
            }
        }
        Ok(())
    }
}
