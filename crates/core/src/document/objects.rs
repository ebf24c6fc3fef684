//! Small lookups over `lopdf` objects: dereferencing, numbers, inherited
//! page attributes.

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::utils::{Matrix, Rect};

/// Upper bound on Parent links followed when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 64;

/// Follows a reference to its target; other objects are returned as is.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

pub(crate) fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, obj)? {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

pub(crate) fn get_dict<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    resolve_dict(doc, dict.get(key).ok()?)
}

pub(crate) fn get_array<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a [Object]> {
    match resolve(doc, dict.get(key).ok()?)? {
        Object::Array(items) => Some(items),
        _ => None,
    }
}

pub(crate) fn get_name<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a [u8]> {
    match resolve(doc, dict.get(key).ok()?)? {
        Object::Name(name) => Some(name),
        _ => None,
    }
}

pub(crate) fn get_number(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<f64> {
    as_number(resolve(doc, dict.get(key).ok()?)?)
}

pub(crate) fn as_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Reads four numbers as a normalized rectangle.
pub(crate) fn as_rect(doc: &Document, obj: &Object) -> Option<Rect> {
    let Object::Array(items) = resolve(doc, obj)? else {
        return None;
    };
    let nums: Vec<f64> = items
        .iter()
        .filter_map(|o| resolve(doc, o).and_then(as_number))
        .collect();
    let [x0, y0, x1, y1] = nums[..] else {
        return None;
    };
    Some((x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)))
}

/// Reads six numbers as an affine matrix.
pub(crate) fn as_matrix(operands: &[Object]) -> Option<Matrix> {
    let nums: Vec<f64> = operands.iter().filter_map(as_number).collect();
    let [a, b, c, d, e, f] = nums[..] else {
        return None;
    };
    Some((a, b, c, d, e, f))
}

/// Looks `key` up on a page node and then on its ancestors.
pub(crate) fn inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        node = get_dict(doc, node, b"Parent")?;
    }
    None
}
