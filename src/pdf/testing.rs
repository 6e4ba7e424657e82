//! In-memory PDF fixtures for unit tests

use lopdf::{Dictionary, Document, Object, Stream};

/// Build a document with `count` pages of the given size.
///
/// Page `n` (1-based) shows the text `(Page n)` so tests can tell pages apart
/// after they have been moved between documents.
pub fn document_with_pages(count: usize, width: f32, height: f32) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    let font_id = doc.add_object(font);

    let mut kids = Vec::new();
    for n in 1..=count {
        let content = format!("BT /F1 24 Tf 72 72 Td (Page {}) Tj ET", n);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut fonts = Dictionary::new();
        fonts.set("F1", Object::Reference(font_id));
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set("MediaBox", Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(width),
            Object::Real(height),
        ]));
        page.set("Contents", Object::Reference(content_id));
        page.set("Resources", Object::Dictionary(resources));
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(count as i64));
    pages.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("fixture document should serialize");
    bytes
}

/// Overwrite (or with `None`, remove) the root page tree's declared `Count`
pub fn set_declared_count(doc: &mut Document, count: Option<usize>) {
    let pages_id = doc
        .catalog()
        .expect("fixture has a catalog")
        .get(b"Pages")
        .and_then(Object::as_reference)
        .expect("fixture catalog references its page tree");
    let pages = doc.get_dictionary_mut(pages_id).expect("page tree is a dictionary");
    match count {
        Some(n) => pages.set("Count", Object::Integer(n as i64)),
        None => {
            pages.remove(b"Count");
        }
    }
}
