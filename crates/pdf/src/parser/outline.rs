//! Bookmark tree reader.
//!
//! Entries come out flat, in depth-first order, each carrying its nesting
//! level and the page its destination resolves to.

use std::collections::{BTreeMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};

use super::backend::{decode_text_simple, resolve, resolve_dict};
use crate::OutlineItem;

/// Name trees deeper than this are treated as corrupt.
const MAX_NAME_TREE_DEPTH: usize = 32;

/// Read every bookmark of the document outline.
///
/// Returns an empty list when the catalog has no `/Outlines`. Entries whose
/// destination cannot be resolved are kept with `page: None`.
pub fn read_outline(doc: &Document) -> Vec<OutlineItem> {
    let Some(root) = doc
        .catalog()
        .ok()
        .and_then(|catalog| catalog.get(b"Outlines").ok())
        .and_then(|obj| resolve_dict(doc, obj))
    else {
        return Vec::new();
    };

    let page_numbers: BTreeMap<ObjectId, u32> =
        doc.get_pages().into_iter().map(|(num, id)| (id, num)).collect();
    let resolver = DestResolver { doc, page_numbers };

    let mut items = Vec::new();
    let mut visited: HashSet<ObjectId> = HashSet::new();
    let mut stack: Vec<(ObjectId, u32)> = Vec::new();
    if let Ok(first) = root.get(b"First").and_then(Object::as_reference) {
        stack.push((first, 1));
    }

    while let Some((id, level)) = stack.pop() {
        if !visited.insert(id) {
            log::debug!("outline cycle at object {:?}", id);
            continue;
        }
        let Ok(dict) = doc.get_dictionary(id) else {
            continue;
        };

        let title = dict
            .get(b"Title")
            .ok()
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_str().ok())
            .map(decode_text_simple)
            .unwrap_or_default()
            .trim()
            .to_string();

        let page = resolver.entry_page(dict);
        if page.is_none() {
            log::debug!("outline entry {:?} has no resolvable destination", title);
        }
        items.push(OutlineItem { title, level, page });

        // Siblings go under children so children come out first.
        if let Ok(next) = dict.get(b"Next").and_then(Object::as_reference) {
            stack.push((next, level));
        }
        if let Ok(child) = dict.get(b"First").and_then(Object::as_reference) {
            stack.push((child, level + 1));
        }
    }

    items
}

struct DestResolver<'a> {
    doc: &'a Document,
    page_numbers: BTreeMap<ObjectId, u32>,
}

impl<'a> DestResolver<'a> {
    /// `/Dest`, or the `/D` of a GoTo action.
    fn entry_page(&self, entry: &Dictionary) -> Option<u32> {
        if let Ok(dest) = entry.get(b"Dest") {
            return self.dest_page(dest, 0);
        }
        let action = entry.get(b"A").ok().and_then(|obj| resolve_dict(self.doc, obj))?;
        let is_goto = action
            .get(b"S")
            .and_then(Object::as_name)
            .is_ok_and(|s| s == b"GoTo");
        if !is_goto {
            return None;
        }
        self.dest_page(action.get(b"D").ok()?, 0)
    }

    fn dest_page(&self, dest: &Object, depth: usize) -> Option<u32> {
        if depth > 2 {
            return None;
        }
        match resolve(self.doc, dest) {
            Object::Array(parts) => match parts.first()? {
                Object::Reference(id) => self.page_numbers.get(id).copied(),
                // Remote-style destinations carry a 0-based page index.
                Object::Integer(idx) => u32::try_from(*idx).ok().map(|i| i + 1),
                _ => None,
            },
            Object::Dictionary(dict) => self.dest_page(dict.get(b"D").ok()?, depth + 1),
            Object::Name(name) | Object::String(name, _) => {
                let target = self.named_dest(name)?;
                self.dest_page(target, depth + 1)
            }
            _ => None,
        }
    }

    /// Look a name up in the catalog `/Dests` dictionary, then in the
    /// `/Names /Dests` name tree.
    fn named_dest(&self, name: &[u8]) -> Option<&'a Object> {
        let catalog = self.doc.catalog().ok()?;

        if let Some(dests) = catalog
            .get(b"Dests")
            .ok()
            .and_then(|obj| resolve_dict(self.doc, obj))
        {
            if let Ok(found) = dests.get(name) {
                return Some(found);
            }
        }

        let tree = catalog
            .get(b"Names")
            .ok()
            .and_then(|obj| resolve_dict(self.doc, obj))?
            .get(b"Dests")
            .ok()
            .and_then(|obj| resolve_dict(self.doc, obj))?;
        self.search_name_tree(tree, name, 0)
    }

    fn search_name_tree(&self, node: &'a Dictionary, name: &[u8], depth: usize) -> Option<&'a Object> {
        if depth > MAX_NAME_TREE_DEPTH {
            return None;
        }

        if let Ok(names) = node.get(b"Names").map(|obj| resolve(self.doc, obj)) {
            if let Ok(pairs) = names.as_array() {
                for pair in pairs.chunks_exact(2) {
                    if let Object::String(key, _) = resolve(self.doc, &pair[0]) {
                        if key.as_slice() == name {
                            return Some(&pair[1]);
                        }
                    }
                }
            }
        }

        let kids = node
            .get(b"Kids")
            .ok()
            .map(|obj| resolve(self.doc, obj))
            .and_then(|obj| obj.as_array().ok())?;
        kids.iter()
            .filter_map(|kid| resolve_dict(self.doc, kid))
            .find_map(|kid| self.search_name_tree(kid, name, depth + 1))
    }
}
