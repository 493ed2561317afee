//! Page-level access to fonts and content streams using lopdf
//!
//! Resource dictionaries can be inline, indirect, or inherited from an
//! ancestor `Pages` node. A `DictPath` records where a dictionary lives
//! (an indirect object plus the keys leading to it) so it can be found again
//! for writing once the read borrows have ended.

use std::collections::{BTreeMap, BTreeSet};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use log::{debug, warn};

use crate::error::Result;
use crate::watermark::{FontEntry, FontTable};

/// Location of a dictionary inside the document
#[derive(Debug, Clone, PartialEq)]
struct DictPath {
    root: ObjectId,
    keys: Vec<Vec<u8>>,
}

impl DictPath {
    fn object(root: ObjectId) -> Self {
        Self { root, keys: Vec::new() }
    }

    fn join(&self, key: &[u8]) -> Self {
        let mut keys = self.keys.clone();
        keys.push(key.to_vec());
        Self { root: self.root, keys }
    }
}

fn object_dict(object: &Object) -> Option<&Dictionary> {
    match object {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

fn object_dict_mut(object: &mut Object) -> Option<&mut Dictionary> {
    match object {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&mut stream.dict),
        _ => None,
    }
}

fn dict_at<'a>(doc: &'a Document, path: &DictPath) -> Option<&'a Dictionary> {
    let mut dict = object_dict(doc.get_object(path.root).ok()?)?;
    for key in &path.keys {
        dict = dict.get(key).ok()?.as_dict().ok()?;
    }
    Some(dict)
}

fn dict_at_mut<'a>(doc: &'a mut Document, path: &DictPath) -> Option<&'a mut Dictionary> {
    let mut dict = object_dict_mut(doc.get_object_mut(path.root).ok()?)?;
    for key in &path.keys {
        dict = dict.get_mut(key).ok()?.as_dict_mut().ok()?;
    }
    Some(dict)
}

/// Follow `key` from the dictionary at `parent` to another dictionary
fn child(doc: &Document, parent: &DictPath, key: &[u8]) -> Option<DictPath> {
    match dict_at(doc, parent)?.get(key).ok()? {
        Object::Reference(id) => {
            object_dict(doc.get_object(*id).ok()?)?;
            Some(DictPath::object(*id))
        }
        Object::Dictionary(_) => Some(parent.join(key)),
        _ => None,
    }
}

/// Resources of a page, walking up the `Parent` chain when the page has none
fn resources_path(doc: &Document, page_id: ObjectId) -> Option<DictPath> {
    let mut node = DictPath::object(page_id);
    let mut visited = BTreeSet::new();

    loop {
        if let Some(resources) = child(doc, &node, b"Resources") {
            return Some(resources);
        }

        let parent = match dict_at(doc, &node)?.get(b"Parent").ok()? {
            Object::Reference(id) => *id,
            _ => return None,
        };
        if !visited.insert(parent) {
            warn!("Cyclic Parent chain above page {:?}", page_id);
            return None;
        }
        node = DictPath::object(parent);
    }
}

fn read_differences(doc: &Document, encoding: &DictPath) -> Option<Vec<Object>> {
    let differences = match dict_at(doc, encoding)?.get(b"Differences").ok()? {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        object => object,
    };
    differences.as_array().ok().cloned()
}

/// A page's font table together with where each font's encoding lives
#[derive(Debug, Clone, Default)]
pub struct PageFonts {
    /// Fonts listed in the page's `Font` resource dictionary
    pub table: FontTable,
    encodings: BTreeMap<Vec<u8>, DictPath>,
}

impl PageFonts {
    /// Read the font resource table of a page
    ///
    /// A page without resources or without a `Font` dictionary has an empty
    /// table. Fonts that don't resolve to a dictionary are skipped.
    pub fn read(doc: &Document, page_id: ObjectId) -> Self {
        let mut fonts = PageFonts::default();

        let Some(font_path) = resources_path(doc, page_id).and_then(|res| child(doc, &res, b"Font")) else {
            debug!("Page {:?} has no font resources", page_id);
            return fonts;
        };
        let Some(font_dict) = dict_at(doc, &font_path) else {
            return fonts;
        };

        for (name, _) in font_dict.iter() {
            let Some(font) = child(doc, &font_path, name) else {
                warn!(
                    "Font {} on page {:?} does not resolve to a dictionary",
                    String::from_utf8_lossy(name),
                    page_id
                );
                continue;
            };

            let encoding = child(doc, &font, b"Encoding");
            let differences = encoding.as_ref().and_then(|path| read_differences(doc, path));
            if let Some(path) = encoding {
                fonts.encodings.insert(name.clone(), path);
            }
            fonts.table.insert(FontEntry::new(name.clone(), differences));
        }

        fonts
    }

    /// Write neutralized encodings back into the document
    ///
    /// Every entry cleared by `detect` gets its `Differences` replaced; other
    /// entries are left alone. Returns the number of encodings written.
    pub fn write_back(&self, doc: &mut Document) -> usize {
        let mut written = 0;

        for entry in self.table.neutralized() {
            let Some(path) = self.encodings.get(&entry.name) else {
                continue;
            };
            if let Some(encoding) = dict_at_mut(doc, path) {
                let differences = entry.encoding_differences.clone().unwrap_or_default();
                encoding.set("Differences", Object::Array(differences));
                written += 1;
            }
        }

        written
    }
}

/// Collect the content streams of a page in drawing order
fn content_streams(doc: &Document, page_id: ObjectId) -> Result<Vec<&Stream>> {
    let page = doc.get_object(page_id)?.as_dict()?;

    let contents = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => doc.get_object(*id)?,
        Ok(object) => object,
        Err(_) => return Ok(Vec::new()),
    };

    let mut streams = Vec::new();
    match contents {
        Object::Stream(stream) => streams.push(stream),
        Object::Array(items) => {
            for item in items {
                let object = match item {
                    Object::Reference(id) => doc.get_object(*id)?,
                    object => object,
                };
                if let Object::Stream(stream) = object {
                    streams.push(stream);
                }
            }
        }
        _ => {}
    }

    Ok(streams)
}

/// Decode the page's content streams into one operation sequence
pub fn tokenize_contents(doc: &Document, page_id: ObjectId) -> Result<Vec<Operation>> {
    let mut bytes = Vec::new();

    for stream in content_streams(doc, page_id)? {
        match stream.decompressed_content() {
            Ok(content) => bytes.extend_from_slice(&content),
            Err(_) => bytes.extend_from_slice(&stream.content),
        }
        // Streams split at token boundaries, so keep them apart
        bytes.push(b'\n');
    }

    Ok(Content::decode(&bytes)?.operations)
}

/// Replace the page's content with a single stream holding `operations`
pub fn replace_contents(doc: &mut Document, page_id: ObjectId, operations: Vec<Operation>) -> Result<()> {
    let content = Content { operations }.encode()?;
    let stream_id = doc.add_object(Stream::new(Dictionary::new(), content));

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page.set("Contents", Object::Reference(stream_id));

    Ok(())
}
