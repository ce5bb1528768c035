// Datapoint catalog
//
// Static metadata for the easyControls variable set: display name (the
// storage path derives from it), access mode, raw variable for write
// commands, a human-readable remark, and optional numeric bounds.
//
// The table is built once and never mutated. Identifiers the catalog does
// not know degrade to a synthetic read-write entry named after the
// identifier itself, so new firmware variables still surface as states.

use std::collections::HashMap;
use std::sync::OnceLock;

use kwlbridge_api::VarId;

/// Access mode of a catalog entry, as the device documents it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// Static metadata for one device variable.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Display name; the storage path is derived from it.
    pub description: &'static str,
    pub access: Access,
    /// Raw variable name used in write commands (equals the identifier
    /// for every documented variable, but kept separate in the data model).
    pub variable: &'static str,
    /// Human-readable label.
    pub remark: &'static str,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Catalog metadata resolved for a concrete identifier, with the synthetic
/// fallback already applied and the storage path precomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub path: String,
    pub name: String,
    pub variable: String,
    pub writable: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

macro_rules! entry {
    ($id:literal, $desc:literal, $access:expr, $remark:literal) => {
        entry!($id, $desc, $access, $remark, None, None)
    };
    ($id:literal, $desc:literal, $access:expr, $remark:literal, $min:expr, $max:expr) => {
        (
            $id,
            CatalogEntry {
                description: $desc,
                access: $access,
                variable: $id,
                remark: $remark,
                min: $min,
                max: $max,
            },
        )
    };
}

fn table() -> &'static HashMap<&'static str, CatalogEntry> {
    static TABLE: OnceLock<HashMap<&'static str, CatalogEntry>> = OnceLock::new();
    TABLE.get_or_init(|| {
        use Access::{ReadOnly as R, ReadWrite as RW};
        HashMap::from([
            // ── Device info ──────────────────────────────────────────
            entry!("v00000", "Artikelbeschreibung", R, "Artikelbeschreibung"),
            entry!("v00001", "Referenznummer", R, "Referenznummer"),
            entry!("v00002", "MAC Adresse", R, "MAC-Adresse"),
            entry!("v00004", "Sprache", RW, "Sprache der Weboberflaeche"),
            entry!("v00005", "Datum", RW, "Datum"),
            entry!("v00006", "Uhrzeit", RW, "Uhrzeit"),
            entry!("v00007", "Sommerzeit", RW, "Sommer-/Winterzeit", Some(0.0), Some(1.0)),
            // ── Heating / bypass ─────────────────────────────────────
            entry!("v00020", "Vorheizung Status", RW, "Vorheizung ein/aus", Some(0.0), Some(1.0)),
            entry!("v00021", "Nachheizung Status", RW, "Nachheizung ein/aus", Some(0.0), Some(1.0)),
            entry!("v00033", "Bypass Raumtemperatur", RW, "Bypass: Raumtemperatur", Some(10.0), Some(40.0)),
            entry!("v00035", "Bypass Min. Aussentemperatur", RW, "Bypass: min. Aussentemperatur", Some(5.0), Some(20.0)),
            // ── Party / whisper mode ─────────────────────────────────
            entry!("v00091", "Partybetrieb Dauer", RW, "Partybetrieb: Dauer in Minuten", Some(5.0), Some(180.0)),
            entry!("v00092", "Partybetrieb Stufe", RW, "Partybetrieb: Lueftungsstufe", Some(0.0), Some(4.0)),
            entry!("v00093", "Partybetrieb Restlaufzeit", R, "Partybetrieb: Restlaufzeit in Minuten"),
            entry!("v00094", "Partybetrieb", RW, "Partybetrieb ein/aus", Some(0.0), Some(1.0)),
            entry!("v00096", "Ruhebetrieb Dauer", RW, "Ruhebetrieb: Dauer in Minuten", Some(5.0), Some(180.0)),
            entry!("v00097", "Ruhebetrieb Stufe", RW, "Ruhebetrieb: Lueftungsstufe", Some(0.0), Some(4.0)),
            entry!("v00098", "Ruhebetrieb Restlaufzeit", R, "Ruhebetrieb: Restlaufzeit in Minuten"),
            entry!("v00099", "Ruhebetrieb", RW, "Ruhebetrieb ein/aus", Some(0.0), Some(1.0)),
            // ── Ventilation ──────────────────────────────────────────
            entry!("v00101", "Betriebsart", RW, "Betriebsart (0 = Auto, 1 = Hand)", Some(0.0), Some(1.0)),
            entry!("v00102", "Lueftungsstufe", RW, "Lueftungsstufe", Some(0.0), Some(4.0)),
            entry!("v00103", "Lueftungsstufe Prozent", R, "Lueftungsstufe in Prozent", Some(0.0), Some(100.0)),
            // ── Temperatures ─────────────────────────────────────────
            entry!("v00104", "Temperatur Aussenluft", R, "Temperatur Aussenluft", Some(-27.0), Some(9998.0)),
            entry!("v00105", "Temperatur Zuluft", R, "Temperatur Zuluft", Some(-27.0), Some(9998.0)),
            entry!("v00106", "Temperatur Fortluft", R, "Temperatur Fortluft", Some(-27.0), Some(9998.0)),
            entry!("v00107", "Temperatur Abluft", R, "Temperatur Abluft", Some(-27.0), Some(9998.0)),
            // ── Sensors ──────────────────────────────────────────────
            entry!("v00110", "Feuchte Sensor 1", R, "Feuchtesensor 1 in %", Some(0.0), Some(100.0)),
            entry!("v00111", "Feuchte Sensor 2", R, "Feuchtesensor 2 in %", Some(0.0), Some(100.0)),
            entry!("v00128", "CO2 Sensor 1", R, "CO2-Sensor 1 in ppm"),
            entry!("v00129", "CO2 Sensor 2", R, "CO2-Sensor 2 in ppm"),
            // ── Fans ─────────────────────────────────────────────────
            entry!("v00348", "Drehzahl Zuluftmotor", R, "Drehzahl Zuluftmotor in U/min"),
            entry!("v00349", "Drehzahl Abluftmotor", R, "Drehzahl Abluftmotor in U/min"),
            // ── Filter / operating hours ─────────────────────────────
            entry!("v01031", "Filter Wechselintervall", RW, "Wechselintervall Filter in Monaten", Some(0.0), Some(12.0)),
            entry!("v01033", "Filter Restlaufzeit", R, "Restlaufzeit Filter in Minuten"),
            entry!("v01103", "Betriebsstunden Zuluftmotor", R, "Betriebsstunden Zuluftmotor in Minuten"),
            entry!("v01104", "Betriebsstunden Abluftmotor", R, "Betriebsstunden Abluftmotor in Minuten"),
            entry!("v01105", "Betriebsstunden Vorheizung", R, "Betriebsstunden Vorheizung in Minuten"),
            entry!("v01106", "Betriebsstunden Nachheizung", R, "Betriebsstunden Nachheizung in Minuten"),
            // ── Errors ───────────────────────────────────────────────
            entry!("v01123", "Anzahl Fehler", R, "Anzahl anstehender Fehler"),
            entry!("v01300", "Fehlermeldung", R, "Aktuelle Fehlermeldung"),
        ])
    })
}

/// Derive the storage path from a display name: spaces become underscores,
/// periods are stripped.
fn storage_path(description: &str) -> String {
    description.replace(' ', "_").replace('.', "")
}

/// Look up catalog metadata for an identifier.
///
/// Unknown identifiers produce the synthetic fallback: path and variable
/// equal to the identifier text, read-write, empty remark, no bounds.
pub fn resolve(id: &VarId) -> Resolved {
    match table().get(id.as_str()) {
        Some(entry) => Resolved {
            path: storage_path(entry.description),
            name: entry.remark.to_owned(),
            variable: entry.variable.to_owned(),
            writable: entry.access == Access::ReadWrite,
            min: entry.min,
            max: entry.max,
        },
        None => Resolved {
            path: id.as_str().to_owned(),
            name: String::new(),
            variable: id.as_str().to_owned(),
            writable: true,
            min: None,
            max: None,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(s: &str) -> VarId {
        s.parse().unwrap()
    }

    #[test]
    fn resolves_known_identifier() {
        let r = resolve(&id("v00102"));
        assert_eq!(r.path, "Lueftungsstufe");
        assert_eq!(r.variable, "v00102");
        assert!(r.writable);
        assert_eq!(r.min, Some(0.0));
        assert_eq!(r.max, Some(4.0));
    }

    #[test]
    fn read_only_entries_are_not_writable() {
        assert!(!resolve(&id("v00104")).writable);
    }

    #[test]
    fn unknown_identifier_falls_back_to_synthetic_entry() {
        let r = resolve(&id("v99999"));
        assert_eq!(r.path, "v99999");
        assert_eq!(r.variable, "v99999");
        assert!(r.writable);
        assert!(r.name.is_empty());
        assert_eq!(r.min, None);
    }

    #[test]
    fn path_normalization_replaces_spaces_and_strips_periods() {
        assert_eq!(storage_path("Bypass Min. Aussentemperatur"), "Bypass_Min_Aussentemperatur");
    }

    #[test]
    fn paths_are_unique_after_normalization() {
        let mut seen = std::collections::HashSet::new();
        for entry in table().values() {
            assert!(
                seen.insert(storage_path(entry.description)),
                "duplicate path for {}",
                entry.description
            );
        }
    }
}
