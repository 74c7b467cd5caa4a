//! JSON snapshots standing in for an application's record store.
//!
//! ```json
//! {
//!   "Car": [
//!     { "id": 1, "fullName": "Ford Model T", "createdAt": { "$timestamp": "2023-06-01T10:00:00" } }
//!   ]
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde_json::{Map, Number, Value};

use figport::{MemoryStore, Record, Scalar, Timestamp};

const TIMESTAMP_KEY: &str = "$timestamp";

/// Reads a snapshot file into a store.
pub fn load(path: &Path) -> Result<MemoryStore> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    from_json(&contents).with_context(|| format!("invalid snapshot {}", path.display()))
}

/// Reads a snapshot file, or returns an empty store if it does not exist yet.
pub fn load_or_empty(path: &Path) -> Result<MemoryStore> {
    if path.exists() { load(path) } else { Ok(MemoryStore::new()) }
}

/// Writes a store as a snapshot file.
pub fn save(store: &MemoryStore, path: &Path) -> Result<()> {
    let json = to_json(store)?;
    std::fs::write(path, json).with_context(|| format!("failed to write snapshot {}", path.display()))
}

pub fn from_json(text: &str) -> Result<MemoryStore> {
    let root: Map<String, Value> = serde_json::from_str(text)?;
    let mut store = MemoryStore::new();

    for (target_type, rows) in root {
        let Value::Array(rows) = rows else {
            bail!("{} must be an array of records", target_type);
        };
        for (i, row) in rows.into_iter().enumerate() {
            let Value::Object(fields) = row else {
                bail!("{} record {} is not an object", target_type, i + 1);
            };
            let mut record = Record::with_capacity(fields.len());
            for (name, value) in fields {
                let scalar = scalar_from_json(value)
                    .with_context(|| format!("{} record {} field {:?}", target_type, i + 1, name))?;
                record.insert(name, scalar);
            }
            store.insert(&target_type, record)?;
        }
    }

    Ok(store)
}

pub fn to_json(store: &MemoryStore) -> Result<String> {
    let mut root = Map::new();
    for target_type in store.types() {
        let mut rows = Vec::with_capacity(store.count(target_type));
        for record in store.get_all(target_type) {
            let mut fields = Map::new();
            for (name, value) in record.iter() {
                fields.insert(name.to_string(), scalar_to_json(value)?);
            }
            rows.push(Value::Object(fields));
        }
        root.insert(target_type.to_string(), Value::Array(rows));
    }
    Ok(serde_json::to_string_pretty(&Value::Object(root))?)
}

fn scalar_from_json(value: Value) -> Result<Scalar> {
    Ok(match value {
        Value::Null => Scalar::Null,
        Value::Bool(b) => Scalar::Boolean(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Scalar::Integer(i),
            None => Scalar::Float(n.as_f64().ok_or_else(|| anyhow!("number {} out of range", n))?),
        },
        Value::String(s) => Scalar::Text(s),
        Value::Object(map) => match map.get(TIMESTAMP_KEY) {
            Some(Value::String(s)) if map.len() == 1 => {
                Scalar::Timestamp(Timestamp::parse(s).map_err(|e| anyhow!("{}", e))?)
            }
            _ => bail!("objects other than {{\"{}\": ...}} are not supported", TIMESTAMP_KEY),
        },
        Value::Array(_) => bail!("arrays are not supported"),
    })
}

fn scalar_to_json(value: &Scalar) -> Result<Value> {
    Ok(match value {
        Scalar::Null => Value::Null,
        Scalar::Boolean(b) => Value::Bool(*b),
        Scalar::Integer(i) => Value::Number((*i).into()),
        Scalar::Float(f) => Value::Number(Number::from_f64(*f).ok_or_else(|| anyhow!("{} has no JSON form", f))?),
        Scalar::Text(s) => Value::String(s.clone()),
        Scalar::Timestamp(ts) => {
            let mut map = Map::new();
            map.insert(TIMESTAMP_KEY.to_string(), Value::String(ts.to_iso8601()));
            Value::Object(map)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "Car": [
            { "id": 2, "fullName": "Beetle", "rarity": 0.25, "enabled": false },
            { "fullName": "Model T", "createdAt": { "$timestamp": "1908-10-01T00:00:00" }, "shortName": null }
        ],
        "Player": []
    }"#;

    #[test]
    fn test_from_json() {
        let store = from_json(SNAPSHOT).unwrap();
        assert_eq!(store.count("Car"), 2);
        assert_eq!(store.count("Player"), 0);

        let cars: Vec<&Record> = store.get_all("Car").collect();
        assert_eq!(cars[0].get("rarity"), Some(&Scalar::Float(0.25)));
        assert_eq!(cars[0].get("enabled"), Some(&Scalar::Boolean(false)));
        // Second record had no id and was placed after id 2
        assert_eq!(cars[1].id(), Some(3));
        assert_eq!(cars[1].get("shortName"), Some(&Scalar::Null));
        assert!(matches!(cars[1].get("createdAt"), Some(Scalar::Timestamp(_))));
    }

    #[test]
    fn test_json_roundtrip() {
        let store = from_json(SNAPSHOT).unwrap();
        let again = from_json(&to_json(&store).unwrap()).unwrap();
        assert_eq!(store.get_all("Car").collect::<Vec<_>>(), again.get_all("Car").collect::<Vec<_>>());
    }

    #[test]
    fn test_rejects_unsupported_values() {
        assert!(from_json(r#"{"Car": {"id": 1}}"#).is_err());
        assert!(from_json(r#"{"Car": [{"tags": ["a"]}]}"#).is_err());
        assert!(from_json(r#"{"Car": [{"at": {"$timestamp": "soon"}}]}"#).is_err());
        assert!(from_json(r#"{"Car": [{"id": 1}, {"id": 1}]}"#).is_err());
    }

    #[test]
    fn test_load_or_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        assert_eq!(load_or_empty(&path).unwrap(), MemoryStore::new());

        save(&from_json(SNAPSHOT).unwrap(), &path).unwrap();
        assert_eq!(load_or_empty(&path).unwrap().count("Car"), 2);
    }
}
