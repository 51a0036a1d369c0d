#![allow(clippy::unwrap_used, dead_code)]
// In-memory document store behind a wiremock server.
//
// Understands just enough of the protocol for the engine: document
// GET/POST/PUT/DELETE with revision checks, and `_find` over `_id` ranges.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use fmdb_core::{Facility, StoreConfig};

#[derive(Default)]
struct State {
    collections: HashMap<String, BTreeMap<String, Value>>,
    revisions: u64,
    /// IDs whose writes fail with a server error.
    poisoned: HashSet<String>,
}

#[derive(Clone, Default)]
pub struct FakeStore {
    state: Arc<Mutex<State>>,
}

impl FakeStore {
    /// Start a server backed by a fresh store.
    pub async fn start() -> (MockServer, FakeStore) {
        let server = MockServer::start().await;
        let store = FakeStore::default();
        Mock::given(any())
            .respond_with(store.clone())
            .mount(&server)
            .await;
        (server, store)
    }

    /// Put a document in place directly, bypassing the engine.
    pub fn seed(&self, collection: &str, doc: Value) {
        let mut state = self.state.lock().unwrap();
        let rev = next_rev(&mut state, 0);
        let id = doc["_id"].as_str().unwrap().to_owned();
        let mut doc = doc;
        doc["_rev"] = json!(rev);
        state
            .collections
            .entry(collection.to_owned())
            .or_default()
            .insert(id, doc);
    }

    pub fn get(&self, collection: &str, id: &str) -> Option<Value> {
        let state = self.state.lock().unwrap();
        state.collections.get(collection)?.get(id).cloned()
    }

    pub fn ids(&self, collection: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .collections
            .get(collection)
            .map(|docs| docs.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Make every write to `id` fail with a 500.
    pub fn poison(&self, id: &str) {
        self.state.lock().unwrap().poisoned.insert(id.to_owned());
    }
}

pub fn facility(server: &MockServer) -> Facility {
    Facility::new(StoreConfig::new(Url::parse(&server.uri()).unwrap())).unwrap()
}

fn next_rev(state: &mut State, generation: u64) -> String {
    state.revisions += 1;
    format!("{}-{:032x}", generation + 1, state.revisions)
}

fn generation(rev: &str) -> u64 {
    rev.split('-').next().and_then(|g| g.parse().ok()).unwrap_or(0)
}

fn error(status: u16, kind: &str, reason: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "error": kind, "reason": reason }))
}

fn conflict() -> ResponseTemplate {
    error(409, "conflict", "Document update conflict.")
}

fn not_found() -> ResponseTemplate {
    error(404, "not_found", "missing")
}

impl Respond for FakeStore {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let segments: Vec<String> = request
            .url
            .path_segments()
            .map(|s| s.map(percent_decode).collect())
            .unwrap_or_default();
        let rev_param = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "rev")
            .map(|(_, v)| v.into_owned());
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);

        let mut state = self.state.lock().unwrap();
        match (request.method.as_str(), segments.as_slice()) {
            ("POST", [collection, find]) if find == "_find" => find_docs(&state, collection, &body),
            ("POST", [collection]) => {
                let id = body["_id"].as_str().unwrap_or_default().to_owned();
                write(&mut state, collection, &id, None, body, true)
            }
            ("PUT", [collection, id]) => write(&mut state, collection, id, rev_param, body, false),
            ("GET", [collection, id]) => match state.collections.get(collection).and_then(|c| c.get(id)) {
                Some(doc) => ResponseTemplate::new(200).set_body_json(doc),
                None => not_found(),
            },
            ("DELETE", [collection, id]) => {
                if state.poisoned.contains(id) {
                    return error(500, "internal_server_error", "poisoned");
                }
                let docs = state.collections.entry(collection.clone()).or_default();
                let Some(current) = docs.get(id) else {
                    return not_found();
                };
                if current["_rev"].as_str() != rev_param.as_deref() {
                    return conflict();
                }
                let generation = generation(current["_rev"].as_str().unwrap_or_default());
                docs.remove(id);
                let rev = next_rev(&mut state, generation);
                ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "id": id, "rev": rev }))
            }
            _ => error(400, "bad_request", "unsupported request"),
        }
    }
}

fn write(
    state: &mut State,
    collection: &str,
    id: &str,
    rev_param: Option<String>,
    mut body: Value,
    create_only: bool,
) -> ResponseTemplate {
    if id.is_empty() {
        return error(400, "bad_request", "missing _id");
    }
    if state.poisoned.contains(id) {
        return error(500, "internal_server_error", "poisoned");
    }
    let presented = rev_param.or_else(|| body["_rev"].as_str().map(str::to_owned));
    let current = state
        .collections
        .get(collection)
        .and_then(|c| c.get(id))
        .and_then(|doc| doc["_rev"].as_str().map(str::to_owned));

    let generation = match (&current, &presented) {
        (Some(_), _) if create_only => return conflict(),
        (Some(current), Some(presented)) if current == presented => generation(current),
        (Some(_), _) => return conflict(),
        (None, Some(_)) => return conflict(),
        (None, None) => 0,
    };

    let rev = next_rev(state, generation);
    body["_rev"] = json!(rev);
    state
        .collections
        .entry(collection.to_owned())
        .or_default()
        .insert(id.to_owned(), body);
    ResponseTemplate::new(201).set_body_json(json!({ "ok": true, "id": id, "rev": rev }))
}

fn find_docs(state: &State, collection: &str, body: &Value) -> ResponseTemplate {
    let range = &body["selector"]["_id"];
    let gt = range["$gt"].as_str().unwrap_or_default();
    let lt = range["$lt"].as_str();
    let limit = body["limit"]
        .as_u64()
        .and_then(|l| usize::try_from(l).ok())
        .unwrap_or(25);

    let docs: Vec<Value> = state
        .collections
        .get(collection)
        .map(|c| {
            c.iter()
                .filter(|(id, _)| id.as_str() > gt && lt.is_none_or(|lt| id.as_str() < lt))
                .take(limit)
                .map(|(_, doc)| doc.clone())
                .collect()
        })
        .unwrap_or_default();

    ResponseTemplate::new(200).set_body_json(json!({ "docs": docs, "bookmark": "nil" }))
}

fn percent_decode(segment: &str) -> String {
    url::form_urlencoded::parse(format!("s={segment}").as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}
