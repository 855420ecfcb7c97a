use serde_json::Value;

use crate::status::StatusDocument;

/// Top-level key holding the base64 server icon.
pub const FAVICON_KEY: &str = "favicon";
/// Top-level key holding Forge metadata.
pub const FORGE_DATA_KEY: &str = "forgeData";
/// Key inside `forgeData` holding the encoded mod list.
pub const FORGE_BLOB_KEY: &str = "d";

/// Strip the fields that are large and useless for discovery.
///
/// `favicon` is dropped outright. If `forgeData` is an object its `d` entry is
/// dropped, but `forgeData` itself stays even when left empty. Everything else
/// passes through untouched and in its original order.
pub fn sanitize(doc: &mut StatusDocument) {
    let fields = doc.fields_mut();
    fields.shift_remove(FAVICON_KEY);
    if let Some(Value::Object(forge)) = fields.get_mut(FORGE_DATA_KEY) {
        forge.shift_remove(FORGE_BLOB_KEY);
    }
}
