//! Page-level editing helpers for the output document

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use crate::error::Result;
use super::xobject::{copy_object_deep, inherited_attribute, page_content, CopyCache, INHERITABLE_KEYS};

/// Copy a page from `source` into `output` as a child of `parent_id`.
///
/// Inherited attributes are materialized on the copy, so the new page keeps
/// the source page's size and resources even though none of the source page
/// tree is carried over. The copied content is wrapped in `q`/`Q` so anything
/// appended later starts from a clean graphics state.
pub fn copy_page(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    parent_id: ObjectId,
    cache: &mut CopyCache,
) -> Result<ObjectId> {
    let page_dict = source.get_dictionary(page_id)?;

    // Reserve the ID up front so back-references (e.g. annotation /P) land on the copy
    let new_page_id = output.new_object_id();
    cache.insert(page_id, new_page_id);

    let mut new_page = Dictionary::new();
    for (key, value) in page_dict.iter() {
        match key.as_slice() {
            b"Parent" | b"Contents" => continue,
            _ => new_page.set(key.clone(), copy_object_deep(output, source, value, cache)?),
        }
    }

    for key in INHERITABLE_KEYS {
        if new_page.has(key) {
            continue;
        }
        if let Some(value) = inherited_attribute(source, page_id, key) {
            new_page.set(key.to_vec(), copy_object_deep(output, source, value, cache)?);
        }
    }

    let mut wrapped = b"q\n".to_vec();
    wrapped.extend_from_slice(&page_content(source, page_id)?);
    wrapped.extend_from_slice(b"\nQ\n");
    let content_id = output.add_object(Stream::new(Dictionary::new(), wrapped));

    new_page.set("Type", Object::Name(b"Page".to_vec()));
    new_page.set("Parent", Object::Reference(parent_id));
    new_page.set("Contents", Object::Reference(content_id));

    output.objects.insert(new_page_id, Object::Dictionary(new_page));
    Ok(new_page_id)
}

/// Register an XObject on a page under a name not already in use.
///
/// Returns the name actually assigned.
pub fn add_xobject_to_page_resources(
    doc: &mut Document,
    page_id: ObjectId,
    base_name: &str,
    xobject_id: ObjectId,
) -> Result<String> {
    // Resources and its XObject subdictionary may both be indirect
    let mut resources = match doc.get_dictionary(page_id)?.get(b"Resources") {
        Ok(res) => dereference_dictionary(doc, res),
        Err(_) => Dictionary::new(),
    };

    let mut xobjects = match resources.get(b"XObject") {
        Ok(xo) => dereference_dictionary(doc, xo),
        Err(_) => Dictionary::new(),
    };

    let name = unique_name(&xobjects, base_name);
    xobjects.set(name.as_bytes(), Object::Reference(xobject_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    // Set the Resources directly on the page so the page owns its copy
    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));

    Ok(name)
}

/// Append a content stream to a page's Contents
///
/// Appended content is drawn on top of the existing page content.
pub fn append_content_to_page(doc: &mut Document, page_id: ObjectId, new_content_id: ObjectId) -> Result<()> {
    let page_dict = doc.get_dictionary_mut(page_id)?;
    let existing_content = page_dict.get(b"Contents").ok().cloned();

    match existing_content {
        Some(Object::Reference(content_id)) => {
            page_dict.set("Contents", Object::Array(vec![
                Object::Reference(content_id),
                Object::Reference(new_content_id),
            ]));
        }
        Some(Object::Array(mut content_array)) => {
            content_array.push(Object::Reference(new_content_id));
            page_dict.set("Contents", Object::Array(content_array));
        }
        _ => {
            page_dict.set("Contents", Object::Array(vec![Object::Reference(new_content_id)]));
        }
    }

    Ok(())
}

fn dereference_dictionary(doc: &Document, obj: &Object) -> Dictionary {
    match obj {
        Object::Dictionary(dict) => dict.clone(),
        Object::Reference(id) => doc.get_dictionary(*id).cloned().unwrap_or_else(|_| Dictionary::new()),
        _ => Dictionary::new(),
    }
}

fn unique_name(dict: &Dictionary, base: &str) -> String {
    if !dict.has(base.as_bytes()) {
        return base.to_string();
    }

    (1..)
        .map(|n| format!("{}{}", base, n))
        .find(|candidate| !dict.has(candidate.as_bytes()))
        .unwrap_or_else(|| base.to_string())
}
