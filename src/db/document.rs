// src/db/document.rs
// DOCUMENTATION: Field-path lookup and value ordering over BSON documents
// PURPOSE: Shared by filter evaluation, sorting and grouping in MemoryStore

use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use std::cmp::Ordering;

/// Render a stored `_id` the way the API exposes it
pub fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Filter value for an API identifier; None when it cannot be a stored id
pub fn parse_object_id(id: &str) -> Option<Bson> {
    ObjectId::parse_str(id).ok().map(Bson::ObjectId)
}

/// Collect every value reachable through a dotted path.
/// Arrays met along the way are traversed element by element, so
/// `addresses.city` yields the city of each address.
pub fn values_at_path<'a>(doc: &'a Document, path: &str) -> Vec<&'a Bson> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut out = Vec::new();
    if let Some((first, rest)) = segments.split_first() {
        if let Some(value) = doc.get(*first) {
            collect(value, rest, &mut out);
        }
    }
    out
}

fn collect<'a>(value: &'a Bson, segments: &[&str], out: &mut Vec<&'a Bson>) {
    let Some((head, rest)) = segments.split_first() else {
        out.push(value);
        return;
    };

    match value {
        Bson::Document(inner) => {
            if let Some(next) = inner.get(*head) {
                collect(next, rest, out);
            }
        }
        Bson::Array(items) => {
            for item in items {
                collect(item, segments, out);
            }
        }
        _ => {}
    }
}

/// First value at a dotted path, descending only through sub-documents.
pub fn value_at_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Bson::Document(inner) => inner.get(segment)?,
            _ => return None,
        };
    }
    Some(current)
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) | Some(Bson::Undefined) => 0,
        Some(Bson::Int32(_)) | Some(Bson::Int64(_)) | Some(Bson::Double(_)) => 1,
        Some(Bson::String(_)) | Some(Bson::Symbol(_)) => 2,
        Some(Bson::Document(_)) => 3,
        Some(Bson::Array(_)) => 4,
        Some(Bson::Binary(_)) => 5,
        Some(Bson::ObjectId(_)) => 6,
        Some(Bson::Boolean(_)) => 7,
        Some(Bson::DateTime(_)) => 8,
        Some(_) => 9,
    }
}

/// Total order over optional values: missing and null sort first,
/// then numbers, then strings.
pub fn compare_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let (rank_a, rank_b) = (type_rank(a), type_rank(b));
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }

    match (a, b) {
        (Some(x), Some(y)) => {
            if let (Some(nx), Some(ny)) = (as_number(x), as_number(y)) {
                return nx.partial_cmp(&ny).unwrap_or(Ordering::Equal);
            }
            match (x, y) {
                (Bson::String(sx), Bson::String(sy)) => sx.cmp(sy),
                (Bson::ObjectId(ox), Bson::ObjectId(oy)) => ox.bytes().cmp(&oy.bytes()),
                (Bson::Boolean(bx), Bson::Boolean(by)) => bx.cmp(by),
                (Bson::DateTime(dx), Bson::DateTime(dy)) => dx.cmp(dy),
                _ => Ordering::Equal,
            }
        }
        _ => Ordering::Equal,
    }
}

/// Equality that treats Int32/Int64/Double holding the same number as equal.
pub fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Numeric view used by range predicates
pub fn numeric(value: &Bson) -> Option<f64> {
    as_number(value)
}
