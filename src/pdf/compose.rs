//! Cover spread compositing
//!
//! Builds a one-page document: a copy of the template's first page with two
//! pages of the source document drawn on top as scaled Form XObjects.

use std::path::Path;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, warn};
use crate::config::SpreadConfig;
use crate::error::{Error, Result};
use crate::layout::{Rect, SpreadLayout};
use super::metadata::load_document;
use super::page::{add_xobject_to_page_resources, append_content_to_page, copy_page};
use super::xobject::{create_page_xobject, media_box, CopyCache, EmbeddedPage};

/// The fixed canvas document. Only its first page is used.
#[derive(Debug, Clone)]
pub struct Template {
    doc: Document,
    page_id: ObjectId,
}

impl Template {
    /// Parse a template from memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = load_document(bytes)?;
        let page_id = *doc
            .get_pages()
            .values()
            .next()
            .ok_or_else(|| Error::MalformedDocument("template has no pages".to_string()))?;

        Ok(Self { doc, page_id })
    }

    /// Load a template from disk
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        Self::from_bytes(&std::fs::read(path)?)
    }

    /// Width and height of the canvas page in points
    pub fn page_size(&self) -> (f32, f32) {
        let [llx, lly, urx, ury] = media_box(&self.doc, self.page_id);
        (urx - llx, ury - lly)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }
}

/// Composes cover spreads against a shared, read-only template
#[derive(Debug, Clone)]
pub struct PageCompositor {
    template: Template,
    config: SpreadConfig,
    layout: SpreadLayout,
}

impl PageCompositor {
    /// Create a compositor, rejecting configurations that could index past
    /// the end of a validated document.
    pub fn new(template: Template, config: SpreadConfig) -> Result<Self> {
        config.validate()?;
        let layout = SpreadLayout::from_config(&config);

        let (width, height) = template.page_size();
        if !layout.fits_within(width, height) {
            warn!(
                "Spread placement extends past the {} x {} pt template page",
                width, height
            );
        }
        Ok(Self { template, config, layout })
    }

    pub fn config(&self) -> &SpreadConfig {
        &self.config
    }

    pub fn layout(&self) -> &SpreadLayout {
        &self.layout
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Compose from raw source bytes
    pub fn compose_bytes(&self, source: &[u8]) -> Result<Vec<u8>> {
        let doc = load_document(source)?;
        self.compose(&doc)
    }

    /// Compose a cover spread for an already-parsed source document
    pub fn compose(&self, source: &Document) -> Result<Vec<u8>> {
        compose(&self.template, source, &self.config, &self.layout)
    }
}

/// Build the cover spread document and serialize it.
///
/// Neither `template` nor `source` is modified; every object the output needs
/// is deep-copied into a fresh document.
pub fn compose(
    template: &Template,
    source: &Document,
    config: &SpreadConfig,
    layout: &SpreadLayout,
) -> Result<Vec<u8>> {
    let page_ids: Vec<ObjectId> = source.get_pages().values().copied().collect();
    let pick = |index: usize| {
        page_ids.get(index).copied().ok_or(Error::PageIndexOutOfRange {
            index,
            page_count: page_ids.len(),
        })
    };
    let left_source = pick(config.left_page_index)?;
    let right_source = pick(config.right_page_index)?;

    let mut output = Document::with_version("1.7");
    let pages_id = output.new_object_id();

    let mut template_cache = CopyCache::new();
    let page_id = copy_page(&mut output, &template.doc, template.page_id, pages_id, &mut template_cache)?;

    // One cache for both source pages so shared fonts and images are copied once
    let mut source_cache = CopyCache::new();
    let left = create_page_xobject(&mut output, source, left_source, &mut source_cache)?;
    let right = create_page_xobject(&mut output, source, right_source, &mut source_cache)?;

    let left_name = add_xobject_to_page_resources(&mut output, page_id, "SpreadLeft", left.id)?;
    let right_name = add_xobject_to_page_resources(&mut output, page_id, "SpreadRight", right.id)?;

    let mut ops = placement_command(&left_name, &left, &layout.left)?;
    ops.push_str(&placement_command(&right_name, &right, &layout.right)?);
    debug!(left = ?layout.left, right = ?layout.right, "placing spread pages");

    let overlay_id = output.add_object(Stream::new(Dictionary::new(), ops.into_bytes()));
    append_content_to_page(&mut output, page_id, overlay_id)?;

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(1));
    pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
    output.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = output.add_object(catalog);
    output.trailer.set("Root", Object::Reference(catalog_id));

    output.compress();

    let mut bytes = Vec::new();
    output.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Content stream operators drawing an embedded page scaled into `rect`
fn placement_command(name: &str, page: &EmbeddedPage, rect: &Rect) -> Result<String> {
    if page.width <= 0.0 || page.height <= 0.0 {
        return Err(Error::MalformedDocument(format!(
            "page has an empty MediaBox ({} x {})",
            page.width, page.height
        )));
    }

    let scale_x = rect.width / page.width;
    let scale_y = rect.height / page.height;

    Ok(format!(
        "q {} 0 0 {} {} {} cm /{} Do Q\n",
        scale_x, scale_y, rect.x, rect.y, name
    ))
}
