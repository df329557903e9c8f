//! PII scrub export: a copy of the document with customer, occupancy,
//! utility and health details removed.

use super::{Document, ROOT_ELEMENT};
use crate::error::{TranslateError, TranslateResult};
use serde_json::{json, Map, Value};

/// Removed wherever they appear.
const REMOVE_ANYWHERE: &[&str] = &["HealthAndSafety", "BuildingOccupancy", "AnnualEnergyUse"];

/// Removed from the root element only.
const REMOVE_AT_ROOT: &[&str] = &["Utility", "Consumption"];

/// Produce the scrubbed copy, wrapped in its root element.
///
/// Each `Customer` is reduced to the system identifier of its person.
pub fn scrub(document: &Document) -> TranslateResult<Value> {
    let mut root = document.value().clone();

    if let Some(map) = root.as_object_mut() {
        if let Some(customers) = map.get_mut("Customer") {
            reduce_customers(customers)?;
        }
        map.retain(|key, _| !REMOVE_AT_ROOT.contains(&key.as_str()));
        if let Some(buildings) = map.get_mut("Building") {
            for building in elements_mut(buildings) {
                if let Some(b) = building.as_object_mut() {
                    b.retain(|key, _| key != "CustomerID");
                }
            }
        }
    }
    remove_anywhere(&mut root);

    let mut wrapper = Map::new();
    wrapper.insert(ROOT_ELEMENT.to_string(), root);
    Ok(Value::Object(wrapper))
}

fn reduce_customers(customers: &mut Value) -> TranslateResult<()> {
    for customer in elements_mut(customers) {
        let id = customer
            .pointer("/CustomerDetails/Person/SystemIdentifier/@id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                TranslateError::not_found("HPXML/Customer/CustomerDetails/Person/SystemIdentifier/@id")
            })?
            .to_string();
        *customer = json!({
            "CustomerDetails": {"Person": {"SystemIdentifier": {"@id": id}}}
        });
    }
    Ok(())
}

fn elements_mut(value: &mut Value) -> Vec<&mut Value> {
    match value {
        Value::Array(items) => items.iter_mut().collect(),
        other => vec![other],
    }
}

fn remove_anywhere(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| !REMOVE_ANYWHERE.contains(&key.as_str()));
            for child in map.values_mut() {
                remove_anywhere(child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(remove_anywhere),
        _ => {}
    }
}
