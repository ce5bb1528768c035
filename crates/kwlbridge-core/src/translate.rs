// XML-to-state translation
//
// Turns a raw page body into typed, named state writes: scan the
// `<ID>`/`<VA>` pairs, infer each value's type, resolve catalog metadata,
// create the backing entry the first time an identifier is seen, and
// overwrite the value on every poll.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{error, warn};

use kwlbridge_api::page::{self, VarId};

use crate::catalog;
use crate::store::{StateMeta, StateStore, StateValue, ValueKind};

/// Infer a value's type from its raw text form.
///
/// Numeric iff the trimmed text is a finite decimal numeral; anything
/// else, including the empty string, stays as text. (The original
/// integration's `Number(v) !== NaN` check could never reject a value --
/// this is the corrected test.)
fn infer(raw: &str) -> (StateValue, ValueKind) {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => (StateValue::Number(n), ValueKind::Number),
        _ => (StateValue::Text(raw.to_owned()), ValueKind::Mixed),
    }
}

/// Stateful translator: owns the process-lifetime set of identifiers whose
/// state entries have already been created.
///
/// Only the bridge's single control-flow task mutates the created set, so
/// it needs no synchronization. A restart simply re-issues the idempotent
/// existence check for every identifier.
pub struct Translator {
    store: Arc<StateStore>,
    created: HashSet<VarId>,
}

impl Translator {
    pub fn new(store: Arc<StateStore>) -> Self {
        Self {
            store,
            created: HashSet::new(),
        }
    }

    /// Translate one page body into state writes.
    ///
    /// A malformed body aborts translation with a single warning carrying
    /// the raw content; per-identifier failures are logged and do not
    /// abort the remaining pairs.
    pub fn translate(&mut self, body: &str) {
        let pairs = match page::scan(body) {
            Ok(pairs) => pairs,
            Err(_) => {
                warn!(body = %body, "unparseable page body, skipping");
                return;
            }
        };

        for (id, raw_value) in pairs {
            let (value, kind) = infer(&raw_value);
            let resolved = catalog::resolve(&id);

            if !self.created.contains(&id) {
                let meta = StateMeta {
                    name: resolved.name.clone(),
                    variable: resolved.variable.clone(),
                    kind,
                    writable: resolved.writable,
                    min: resolved.min,
                    max: resolved.max,
                };
                self.store.create_if_absent(&resolved.path, meta);
                self.created.insert(id.clone());
            }

            if let Err(e) = self.store.set(&resolved.path, value, true) {
                error!(
                    identifier = %id,
                    path = %resolved.path,
                    variable = %resolved.variable,
                    error = %e,
                    "state write failed"
                );
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::StateChange;

    fn setup() -> (Arc<StateStore>, Translator) {
        let store = Arc::new(StateStore::new());
        let translator = Translator::new(Arc::clone(&store));
        (store, translator)
    }

    fn acked_writes(rx: &mut tokio::sync::broadcast::Receiver<StateChange>) -> Vec<StateChange> {
        let mut out = Vec::new();
        while let Ok(change) = rx.try_recv() {
            out.push(change);
        }
        out
    }

    #[test]
    fn numeric_value_creates_numeric_entry_at_catalog_path() {
        let (store, mut translator) = setup();
        translator.translate("<ID>v00104</ID><VA>18.2</VA>");

        let entry = store.get("Temperatur_Aussenluft").unwrap();
        assert_eq!(entry.meta.kind, ValueKind::Number);
        assert_eq!(entry.meta.variable, "v00104");
        assert!(!entry.meta.writable);
        assert_eq!(entry.meta.min, Some(-27.0));
        assert_eq!(entry.value, Some(StateValue::Number(18.2)));
    }

    #[test]
    fn unknown_identifier_creates_mixed_entry_at_identifier_path() {
        let (store, mut translator) = setup();
        translator.translate("<ID>v99999</ID><VA>foo</VA>");

        let entry = store.get("v99999").unwrap();
        assert_eq!(entry.meta.kind, ValueKind::Mixed);
        assert!(entry.meta.writable);
        assert_eq!(entry.value, Some(StateValue::Text("foo".into())));
    }

    #[test]
    fn non_numeric_text_is_not_misclassified_as_number() {
        // The original's NaN comparison bug would have tagged these numeric.
        for raw in ["foo", "", " ", "NaN", "inf", "12abc"] {
            let (value, kind) = infer(raw);
            assert_eq!(kind, ValueKind::Mixed, "misclassified {raw:?}");
            assert_eq!(value, StateValue::Text(raw.to_owned()));
        }
    }

    #[test]
    fn numeric_inference_accepts_decimals_and_negatives() {
        assert_eq!(infer("23.5").0, StateValue::Number(23.5));
        assert_eq!(infer("-27").0, StateValue::Number(-27.0));
        assert_eq!(infer(" 4 ").0, StateValue::Number(4.0));
    }

    #[test]
    fn one_write_per_identifier_and_one_creation_across_polls() {
        let (store, mut translator) = setup();
        let mut rx = store.subscribe();

        translator.translate("<ID>v00102</ID><VA>2</VA>");
        translator.translate("<ID>v00102</ID><VA>3</VA>");

        let writes = acked_writes(&mut rx);
        assert_eq!(writes.len(), 2);
        assert!(writes.iter().all(|w| w.ack && w.path == "Lueftungsstufe"));
        assert_eq!(writes[1].value, StateValue::Number(3.0));

        // Second poll overwrote the value without touching the metadata.
        let entry = store.get("Lueftungsstufe").unwrap();
        assert_eq!(entry.value, Some(StateValue::Number(3.0)));
        assert_eq!(entry.meta.kind, ValueKind::Number);
    }

    #[test]
    fn garbled_body_writes_nothing() {
        let (store, mut translator) = setup();
        let before = store.len();
        translator.translate("<html>not a page</html>");
        translator.translate("");
        assert_eq!(store.len(), before);
    }

    #[test]
    fn bad_pair_aborts_whole_body() {
        let (store, mut translator) = setup();
        // Valid first pair, broken second one: the body is rejected as a
        // whole, so not even the first pair is written.
        translator.translate("<ID>v00104</ID><VA>1</VA><ID>oops</ID><VA>2</VA>");
        assert!(store.get("Temperatur_Aussenluft").is_none());
    }

    #[test]
    fn multiple_pairs_in_one_body_each_get_written() {
        let (store, mut translator) = setup();
        translator.translate(
            "<ID>v00104</ID><VA>18.2</VA>\n<ID>v00105</ID><VA>21.0</VA>\n<ID>v00107</ID><VA>22.4</VA>",
        );
        assert_eq!(store.get("Temperatur_Zuluft").unwrap().value, Some(StateValue::Number(21.0)));
        assert_eq!(store.get("Temperatur_Abluft").unwrap().value, Some(StateValue::Number(22.4)));
    }
}
