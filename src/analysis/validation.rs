// Post-parse validation of the model's interaction report.
// Malformed entries are dropped with a warning; the rest of the report survives.

use serde_json::{Map, Value};

use super::types::{Interaction, InteractionReport, UnknownMedication};
use crate::models::Severity;

/// Validated report plus operator-facing warnings about what was dropped.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub report: InteractionReport,
    pub warnings: Vec<String>,
}

/// Turn the parsed top-level object into an `InteractionReport`.
///
/// Missing lists become empty. Interactions without a valid severity, without
/// medications, or naming a medication the model flagged as unknown are removed.
pub fn validate_report(object: &Map<String, Value>) -> ValidationResult {
    let mut warnings = Vec::new();

    let unknown_medications = collect_unknown(object.get("unknownMedications"), &mut warnings);
    let mut report = InteractionReport {
        unknown_medications,
        interactions: Vec::new(),
        recommendations: collect_strings(object.get("recommendations"), "recommendations", &mut warnings),
        questions_for_doctor: collect_strings(
            object.get("questionsForDoctor"),
            "questionsForDoctor",
            &mut warnings,
        ),
        warnings: collect_strings(object.get("warnings"), "warnings", &mut warnings),
    };

    for (index, item) in array_items(object.get("interactions"), "interactions", &mut warnings)
        .iter()
        .enumerate()
    {
        if let Some(interaction) = parse_interaction(index, item, &report, &mut warnings) {
            report.interactions.push(interaction);
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(
            warning_count = warnings.len(),
            interactions = report.interactions.len(),
            "Interaction report validation warnings"
        );
    }

    ValidationResult { report, warnings }
}

/// Items of an optional array field. Absent or `null` is empty; other shapes warn.
fn array_items<'a>(
    value: Option<&'a Value>,
    field: &str,
    warnings: &mut Vec<String>,
) -> &'a [Value] {
    match value {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items,
        Some(_) => {
            warnings.push(format!("Field '{field}' is not a list, treated as empty"));
            &[]
        }
    }
}

fn non_blank(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn collect_strings(value: Option<&Value>, field: &str, warnings: &mut Vec<String>) -> Vec<String> {
    let items = array_items(value, field, warnings);
    let kept: Vec<String> = items.iter().filter_map(non_blank).collect();
    if kept.len() < items.len() {
        warnings.push(format!(
            "Dropped {} empty or non-text entries from '{field}'",
            items.len() - kept.len()
        ));
    }
    kept
}

fn collect_unknown(value: Option<&Value>, warnings: &mut Vec<String>) -> Vec<UnknownMedication> {
    let mut unknown = Vec::new();
    for item in array_items(value, "unknownMedications", warnings) {
        let parsed = match item {
            Value::String(_) => non_blank(item).map(|name| UnknownMedication {
                name,
                note: String::new(),
            }),
            Value::Object(fields) => fields.get("name").and_then(non_blank).map(|name| {
                UnknownMedication {
                    name,
                    note: fields.get("note").and_then(non_blank).unwrap_or_default(),
                }
            }),
            _ => None,
        };
        match parsed {
            Some(med) => unknown.push(med),
            None => warnings.push("Unknown-medication entry without a name removed".to_string()),
        }
    }
    unknown
}

fn parse_interaction(
    index: usize,
    item: &Value,
    report: &InteractionReport,
    warnings: &mut Vec<String>,
) -> Option<Interaction> {
    let Some(fields) = item.as_object() else {
        warnings.push(format!("Interaction #{index} is not an object, removed"));
        return None;
    };

    let raw_severity = fields.get("severity").and_then(Value::as_str).unwrap_or("");
    let Ok(severity) = raw_severity.trim().to_lowercase().parse::<Severity>() else {
        warnings.push(format!(
            "Interaction #{index} has invalid severity '{raw_severity}', removed"
        ));
        return None;
    };

    let medications: Vec<String> = fields
        .get("medications")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(non_blank).collect())
        .unwrap_or_default();
    if medications.is_empty() {
        warnings.push(format!("Interaction #{index} names no medications, removed"));
        return None;
    }

    if let Some(unknown) = medications.iter().find(|name| report.is_unknown(name)) {
        warnings.push(format!(
            "Interaction #{index} involves unknown medication '{unknown}', removed"
        ));
        return None;
    }

    Some(Interaction {
        severity,
        description: fields.get("description").and_then(non_blank).unwrap_or_default(),
        medications,
        what_to_do: fields.get("whatToDo").and_then(non_blank).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(value: Value) -> ValidationResult {
        validate_report(value.as_object().unwrap())
    }

    #[test]
    fn complete_report_passes_unchanged() {
        let result = validate(json!({
            "unknownMedications": [],
            "interactions": [{
                "severity": "high",
                "description": "Riziko krvácení",
                "medications": ["Warfarin", "Ibuprofen"],
                "whatToDo": "Kontaktujte lékaře"
            }],
            "recommendations": ["Užívejte ráno"],
            "questionsForDoctor": ["Mohu brát Paralen?"],
            "warnings": ["Jděte na pohotovost pokud krvácíte"]
        }));
        assert!(result.warnings.is_empty());
        let report = result.report;
        assert_eq!(report.interactions.len(), 1);
        assert_eq!(report.interactions[0].severity, Severity::High);
        assert_eq!(report.interactions[0].medications, vec!["Warfarin", "Ibuprofen"]);
        assert_eq!(report.interactions[0].what_to_do, "Kontaktujte lékaře");
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.questions_for_doctor.len(), 1);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let result = validate(json!({}));
        assert_eq!(result.report, InteractionReport::default());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn null_and_wrong_shapes_are_empty() {
        let result = validate(json!({"interactions": null, "warnings": "call 155"}));
        assert!(result.report.interactions.is_empty());
        assert!(result.report.warnings.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn invalid_severity_is_dropped() {
        let result = validate(json!({
            "interactions": [
                {"severity": "severe", "medications": ["A", "B"]},
                {"severity": "low", "medications": ["A", "C"]}
            ]
        }));
        assert_eq!(result.report.interactions.len(), 1);
        assert_eq!(result.report.interactions[0].severity, Severity::Low);
        assert!(result.warnings[0].contains("severe"));
    }

    #[test]
    fn severity_case_is_normalized() {
        let result = validate(json!({
            "interactions": [{"severity": " Critical ", "medications": ["A", "B"]}]
        }));
        assert_eq!(result.report.interactions[0].severity, Severity::Critical);
    }

    #[test]
    fn interaction_without_medications_is_dropped() {
        let result = validate(json!({
            "interactions": [
                {"severity": "medium", "medications": []},
                {"severity": "medium"},
                {"severity": "medium", "medications": [1, ""]}
            ]
        }));
        assert!(result.report.interactions.is_empty());
        assert_eq!(result.warnings.len(), 3);
    }

    #[test]
    fn interaction_with_unknown_medication_is_dropped() {
        let result = validate(json!({
            "unknownMedications": [{"name": "Bitinex", "note": "Neznámý přípravek"}],
            "interactions": [
                {"severity": "high", "medications": ["bitinex", "Warfarin"]},
                {"severity": "high", "medications": ["Warfarin", "Ibuprofen"]}
            ]
        }));
        let report = result.report;
        assert_eq!(report.unknown_medications[0].name, "Bitinex");
        assert_eq!(report.interactions.len(), 1);
        assert!(!report.interactions[0].medications.contains(&"bitinex".to_string()));
    }

    #[test]
    fn unknown_entries_accept_plain_names() {
        let result = validate(json!({
            "unknownMedications": ["Leram", {"note": "no name"}, {"name": "Bitinex"}]
        }));
        let names: Vec<_> = result
            .report
            .unknown_medications
            .iter()
            .map(|u| u.name.as_str())
            .collect();
        assert_eq!(names, vec!["Leram", "Bitinex"]);
        assert_eq!(result.report.unknown_medications[1].note, "");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn non_text_list_entries_are_skipped() {
        let result = validate(json!({"recommendations": ["Pijte vodu", 3, null, "  "]}));
        assert_eq!(result.report.recommendations, vec!["Pijte vodu"]);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn interaction_order_is_preserved() {
        let result = validate(json!({
            "interactions": [
                {"severity": "low", "medications": ["A", "B"]},
                {"severity": "critical", "medications": ["C", "D"]},
                {"severity": "medium", "medications": ["E", "F"]}
            ]
        }));
        let order: Vec<_> = result.report.interactions.iter().map(|i| i.severity).collect();
        assert_eq!(order, vec![Severity::Low, Severity::Critical, Severity::Medium]);
    }
}
