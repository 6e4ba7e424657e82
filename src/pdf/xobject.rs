//! Form XObject embedding of source pages
//!
//! A source page is turned into a self-contained Form XObject in the output
//! document so it can be drawn at any position and scale with a single `Do`.

use std::collections::HashMap;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use crate::error::{Error, Result};

/// Maps object IDs in a source document to their copies in the output
pub type CopyCache = HashMap<ObjectId, ObjectId>;

/// Page attributes that may be inherited from ancestors in the page tree
pub const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// US Letter, used when neither the page nor its ancestors declare a MediaBox
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Guard against cyclic Parent chains in damaged files
const MAX_TREE_DEPTH: usize = 32;

/// Bounding box of an embedded page, in the source page's own units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbeddedPage {
    pub id: ObjectId,
    pub width: f32,
    pub height: f32,
}

/// Look up a page attribute, walking up the page tree when the page itself
/// does not define it.
pub fn inherited_attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = page_id;

    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_dictionary(current).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => current = *parent,
            _ => return None,
        }
    }

    None
}

/// Resolve a page's MediaBox to `[llx, lly, urx, ury]`
pub fn media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let array = inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|obj| resolve(doc, obj).as_array().ok());

    let Some(array) = array else {
        return DEFAULT_MEDIA_BOX;
    };

    let numbers: Vec<f32> = array
        .iter()
        .filter_map(|obj| extract_number(resolve(doc, obj)))
        .collect();

    match numbers.as_slice() {
        [llx, lly, urx, ury] => [
            llx.min(*urx),
            lly.min(*ury),
            llx.max(*urx),
            lly.max(*ury),
        ],
        _ => DEFAULT_MEDIA_BOX,
    }
}

/// Embed a source page into `output` as a Form XObject.
///
/// The form's BBox is the page's MediaBox and its Matrix moves the box origin
/// to (0, 0). Drawing it under `sx 0 0 sy x y cm`, with `sx = w / width` and
/// `sy = h / height`, fills a `w` by `h` rectangle at `(x, y)`.
pub fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut CopyCache,
) -> Result<EmbeddedPage> {
    let [llx, lly, urx, ury] = media_box(source, page_id);
    let content = page_content(source, page_id)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("FormType", Object::Integer(1));
    xobject_dict.set("BBox", Object::Array(vec![
        Object::Real(llx),
        Object::Real(lly),
        Object::Real(urx),
        Object::Real(ury),
    ]));
    xobject_dict.set("Matrix", Object::Array(vec![
        Object::Integer(1),
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(1),
        Object::Real(-llx),
        Object::Real(-lly),
    ]));

    if let Some(resources) = inherited_attribute(source, page_id, b"Resources") {
        xobject_dict.set("Resources", copy_object_deep(output, source, resources, cache)?);
    }

    let id = output.add_object(Stream::new(xobject_dict, content));

    Ok(EmbeddedPage {
        id,
        width: urx - llx,
        height: ury - lly,
    })
}

/// Decoded content of a page, with multiple content streams concatenated
pub fn page_content(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc.get_dictionary(page_id)?;

    let contents = match page_dict.get(b"Contents") {
        Ok(c) => resolve(doc, c),
        Err(_) => return Ok(Vec::new()), // No content = blank page
    };

    match contents {
        Object::Stream(stream) => stream_bytes(stream),
        Object::Array(parts) => {
            let mut result = Vec::new();
            for part in parts {
                if let Object::Stream(stream) = resolve(doc, part) {
                    result.extend_from_slice(&stream_bytes(stream)?);
                    result.push(b'\n');
                }
            }
            Ok(result)
        }
        _ => Ok(Vec::new()),
    }
}

/// Raw bytes of a stream with any filters removed
fn stream_bytes(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.has(b"Filter") {
        stream
            .decompressed_content()
            .map_err(|e| Error::MalformedDocument(format!("undecodable content stream: {}", e)))
    } else {
        Ok(stream.content.clone())
    }
}

/// Deep copy an object from source to output document, following references.
///
/// The target ID is reserved before the referenced object is visited, so
/// reference cycles terminate. Dangling references become `null`.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut CopyCache,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            let Ok(referenced) = source.get_object(*id) else {
                return Ok(Object::Null);
            };

            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(output, source, dict, cache)?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(output, source, &stream.dict, cache)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut CopyCache,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}

/// Follow a single level of indirection
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
