use crate::{FieldMap, Record};
use syncstack_types::{is_blank, value_to_string, Exchange, Method, PropertyMap, Request, Value};

/// Per-type capability interface for records.
///
/// Every hook has a working default, so a concrete record type only
/// overrides what it needs:
/// - `defaults` / `extend` / `map_fields` run once, in that order, while a
///   record is constructed
/// - `parse` turns a response (or one fragment of a collection response) into
///   a flat property map to merge
/// - `validate` gates save/destroy before any request is built
/// - `authenticate` annotates outgoing requests
pub trait RecordHooks: Send + Sync {
    /// Store type name used when allocating the persistent row.
    fn type_name(&self) -> &str;

    /// Properties layered over the built-in `id`/`name`/`url`/`clientId`
    /// defaults. `url` and `name` here locate the remote resource.
    fn defaults(&self) -> PropertyMap {
        PropertyMap::new()
    }

    /// Called once after defaults are applied.
    fn extend(&self, record: &Record) {
        let _ = record;
    }

    /// Mapping from property name to persistent-store field name.
    fn map_fields(&self) -> FieldMap {
        FieldMap::new()
    }

    /// Extracts the server identity of one collection response fragment.
    fn identity(&self, fragment: &Value) -> Option<String> {
        let id = fragment.get("id");
        (!is_blank(id)).then(|| id.map(value_to_string).unwrap_or_default())
    }

    /// Produces the properties to merge from a response body.
    ///
    /// The default merges a JSON object body and ignores failed exchanges.
    fn parse(&self, exchange: &Exchange, body: Option<&Value>) -> Option<PropertyMap> {
        if !exchange.is_success() {
            return None;
        }
        body.and_then(Value::as_object).cloned()
    }

    /// Validates the properties for an operation (`None` for a plain
    /// validity check). Return `Err(message)` to reject.
    fn validate(&self, properties: &PropertyMap, method: Option<Method>) -> Result<(), String> {
        let _ = (properties, method);
        Ok(())
    }

    /// Annotates an outgoing request before dispatch.
    fn authenticate(&self, request: &mut Request) {
        let _ = request;
    }
}

/// Per-type capability interface for record sets.
pub trait CollectionHooks: Send + Sync {
    /// Splits a collection response into one fragment per remote record.
    ///
    /// The default accepts a JSON array body and ignores failed exchanges.
    fn parse(&self, exchange: &Exchange, body: Option<&Value>) -> Option<Vec<Value>> {
        if !exchange.is_success() {
            return None;
        }
        body.and_then(Value::as_array).cloned()
    }

    /// Annotates an outgoing collection request before dispatch.
    fn authenticate(&self, request: &mut Request) {
        let _ = request;
    }
}

/// Collection hooks with every default left in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCollection;

impl CollectionHooks for DefaultCollection {}
