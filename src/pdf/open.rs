//! Loading and decrypting input documents
//!
//! lopdf decrypts a document while loading it only when the empty user
//! password opens it. Files protected by a real user password come back
//! with nothing but the encryption dictionary parsed, so those are read a
//! second time with the trailer's `/Encrypt` key hidden and decrypted
//! afterwards with the caller's password.

use std::path::Path;
use lopdf::{Document, Object, ObjectId, Reader};
use log::debug;
use std::collections::BTreeMap;

use crate::error::{Error, Result};

const ENCRYPT_KEY: &[u8] = b"/Encrypt";
/// Same length as `/Encrypt` so every xref offset stays valid
const HIDDEN_ENCRYPT_KEY: &[u8] = b"/Encryp_";
const OBJECT_STREAM_TYPE: &[u8] = b"ObjStm";
/// Encrypted object streams can't be unpacked until decryption
const HIDDEN_OBJECT_STREAM_TYPE: &[u8] = b"ObjStm_";

/// Load a PDF and decrypt it if needed
///
/// The returned document is always unencrypted: the `Encrypt` entry and its
/// dictionary are removed so the cleaned file is written in the clear.
pub fn open_document(path: &Path, password: &str) -> Result<Document> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let buffer = std::fs::read(path)?;
    let mut doc = Document::load_mem(&buffer)?;

    if !doc.is_encrypted() {
        return Ok(doc);
    }

    let decryption_error = |reason: String| Error::Decryption {
        path: path.to_path_buf(),
        reason,
    };

    if doc.encryption_state.is_some() {
        debug!("{}: opened with the empty user password", path.display());
        drop_encryption(&mut doc);
    } else {
        debug!("{}: user password required", path.display());
        doc = load_hidden_encryption(&buffer).map_err(|e| decryption_error(e.to_string()))?;
        doc.decrypt(password).map_err(|e| decryption_error(e.to_string()))?;
    }
    doc.encryption_state = None;

    if doc.get_pages().is_empty() {
        return Err(decryption_error("no readable pages, wrong or missing password".to_string()));
    }

    Ok(doc)
}

/// Remove the encryption dictionary from a document lopdf already decrypted
fn drop_encryption(doc: &mut Document) {
    if let Some(Object::Reference(id)) = doc.trailer.remove(b"Encrypt") {
        doc.objects.remove(&id);
    }
}

/// Parse every object of an encrypted file without decrypting anything
///
/// The returned document carries its `Encrypt` entry again, ready for
/// `Document::decrypt`.
fn load_hidden_encryption(buffer: &[u8]) -> lopdf::Result<Document> {
    let patched = hide_encrypt_key(buffer);
    let filter: fn(ObjectId, &mut Object) -> Option<(ObjectId, Object)> = hide_object_stream;

    let mut doc = Reader {
        buffer: &patched,
        document: Document::new(),
        encryption_state: None,
        raw_objects: BTreeMap::new(),
    }
    .read(Some(filter))?;

    let hidden_key = &HIDDEN_ENCRYPT_KEY[1..];
    if let Some(encrypt) = doc.trailer.remove(hidden_key) {
        doc.trailer.set("Encrypt", encrypt);
    }

    for object in doc.objects.values_mut() {
        if let Object::Stream(stream) = object {
            if stream.dict.has_type(HIDDEN_OBJECT_STREAM_TYPE) {
                stream.dict.set("Type", Object::Name(OBJECT_STREAM_TYPE.to_vec()));
            }
        }
    }

    Ok(doc)
}

/// Rename every `/Encrypt` key so the reader takes its plain loading path
fn hide_encrypt_key(buffer: &[u8]) -> Vec<u8> {
    let mut patched = buffer.to_vec();
    let mut start = 0;

    while let Some(offset) = patched[start..]
        .windows(ENCRYPT_KEY.len())
        .position(|window| window == ENCRYPT_KEY)
    {
        let at = start + offset;
        let end = at + ENCRYPT_KEY.len();
        // `/EncryptMetadata` is a different key
        if patched.get(end).map_or(true, |&byte| ends_name(byte)) {
            patched[at..end].copy_from_slice(HIDDEN_ENCRYPT_KEY);
        }
        start = end;
    }

    patched
}

fn ends_name(byte: u8) -> bool {
    byte.is_ascii_whitespace() || b"/<>[]()%{}".contains(&byte)
}

/// Load filter keeping object streams packed until they are decrypted
fn hide_object_stream(id: ObjectId, object: &mut Object) -> Option<(ObjectId, Object)> {
    if let Object::Stream(stream) = object {
        if stream.dict.has_type(OBJECT_STREAM_TYPE) {
            stream.dict.set("Type", Object::Name(HIDDEN_OBJECT_STREAM_TYPE.to_vec()));
        }
    }
    Some((id, object.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    #[test]
    fn test_open_nonexistent_file() {
        let result = open_document(Path::new("nonexistent.pdf"), "");
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_hide_encrypt_key_keeps_length() {
        let trailer = b"trailer\n<< /Size 9 /Encrypt 8 0 R /Root 1 0 R >>";
        let patched = hide_encrypt_key(trailer);

        assert_eq!(patched.len(), trailer.len());
        assert_eq!(
            patched.as_slice(),
            b"trailer\n<< /Size 9 /Encryp_ 8 0 R /Root 1 0 R >>".as_slice()
        );
    }

    #[test]
    fn test_hide_encrypt_key_skips_longer_names() {
        let dict = b"<< /EncryptMetadata false /Encrypt/X >>";
        let patched = hide_encrypt_key(dict);

        assert_eq!(patched.as_slice(), b"<< /EncryptMetadata false /Encryp_/X >>".as_slice());
    }

    #[test]
    fn test_hide_encrypt_key_at_end_of_buffer() {
        assert_eq!(hide_encrypt_key(b"<< /Encrypt").as_slice(), b"<< /Encryp_".as_slice());
        assert_eq!(hide_encrypt_key(b"no key here").as_slice(), b"no key here".as_slice());
    }

    #[test]
    fn test_hide_object_stream_renames_type() {
        let mut object = Object::Stream(Stream::new(dictionary! { "Type" => "ObjStm" }, vec![]));
        hide_object_stream((4, 0), &mut object);

        let stream = object.as_stream().unwrap();
        assert!(stream.dict.has_type(HIDDEN_OBJECT_STREAM_TYPE));
        assert!(!stream.dict.has_type(OBJECT_STREAM_TYPE));
    }

    #[test]
    fn test_hide_object_stream_leaves_other_objects() {
        let mut object = Object::Dictionary(dictionary! { "Type" => "Page" });
        let kept = hide_object_stream((2, 0), &mut object);

        assert!(kept.is_some());
        assert!(object.as_dict().unwrap().has_type(b"Page"));
    }
}
