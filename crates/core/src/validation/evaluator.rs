//! Rule evaluator. Pure logic, no database access.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::rules::{label, Constraint, FieldErrors, FieldKind, FieldRule, Mode, Presence, Reference};
use crate::error::CoreError;

/// Input that passed every rule, in canonical JSON form.
#[derive(Debug, Clone, Default)]
pub struct Validated {
    /// Coerced values for every field that was supplied (explicit nulls kept).
    pub values: Map<String, Value>,
    /// Ids that still need an existence check against the store.
    pub references: Vec<Reference>,
}

impl Validated {
    /// Deserialize the canonical values into a typed DTO.
    pub fn into_dto<T: DeserializeOwned>(self) -> Result<T, CoreError> {
        serde_json::from_value(Value::Object(self.values))
            .map_err(|e| CoreError::Internal(format!("Validated input did not fit DTO: {e}")))
    }

    /// Whether `field` was supplied in the input.
    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }
}

/// Evaluate `rules` against `input`.
///
/// `current` holds the stored record (as serialized JSON) on update; it is
/// consulted for cross-field comparisons when only one side of a pair was
/// supplied. Fields not named by any rule are dropped.
pub fn validate(
    rules: &[FieldRule],
    input: &Map<String, Value>,
    mode: Mode,
    current: Option<&Map<String, Value>>,
) -> Result<Validated, FieldErrors> {
    let mut errors = FieldErrors::default();
    let mut validated = Validated::default();

    for rule in rules {
        let raw = match input.get(rule.field) {
            Some(v) => normalize_blank(v),
            None => {
                if mode == Mode::Create && rule.presence == Presence::Required {
                    errors.add(rule.field, required_message(rule.field));
                }
                continue;
            }
        };

        if raw.is_null() {
            match rule.presence {
                Presence::Required => errors.add(rule.field, required_message(rule.field)),
                Presence::Nullable => {
                    validated.values.insert(rule.field.to_string(), Value::Null);
                }
            }
            continue;
        }

        let coerced = match coerce(rule, &raw) {
            Ok(v) => v,
            Err(msg) => {
                errors.add(rule.field, msg);
                continue;
            }
        };

        for constraint in &rule.constraints {
            match constraint {
                Constraint::NonNegative => {
                    if is_negative(&coerced) {
                        errors.add(
                            rule.field,
                            format!("The {} must be at least 0.", label(rule.field)),
                        );
                    }
                }
                Constraint::AtMost(max) => {
                    if coerced.as_i64().is_some_and(|n| n > *max) {
                        errors.add(
                            rule.field,
                            format!("The {} may not be greater than {max}.", label(rule.field)),
                        );
                    }
                }
                Constraint::Exists(table) => {
                    if let Some(id) = coerced.as_i64() {
                        validated.references.push(Reference {
                            field: rule.field,
                            table: *table,
                            id,
                        });
                    }
                }
                // Needs every field coerced first; handled below.
                Constraint::AfterOrEqual(_) => {}
            }
        }

        validated.values.insert(rule.field.to_string(), coerced);
    }

    for rule in rules {
        for constraint in &rule.constraints {
            if let Constraint::AfterOrEqual(other) = constraint {
                if errors.has(rule.field) || errors.has(other) {
                    continue;
                }
                check_ordering(rule, other, &validated.values, current, &mut errors);
            }
        }
    }

    errors.into_result().map(|()| validated)
}

/// Treat blank strings as absent values, matching how HTML forms submit
/// cleared inputs.
fn normalize_blank(value: &Value) -> Value {
    match value {
        Value::String(s) if s.trim().is_empty() => Value::Null,
        other => other.clone(),
    }
}

fn required_message(field: &str) -> String {
    format!("The {} field is required.", label(field))
}

fn coerce(rule: &FieldRule, raw: &Value) -> Result<Value, String> {
    let name = label(rule.field);
    match rule.kind {
        FieldKind::Text { max } => {
            let s = raw
                .as_str()
                .ok_or_else(|| format!("The {name} must be a string."))?
                .trim();
            if s.chars().count() > max {
                return Err(format!(
                    "The {name} may not be greater than {max} characters."
                ));
            }
            Ok(Value::String(s.to_string()))
        }
        FieldKind::LongText => raw
            .as_str()
            .map(|s| Value::String(s.trim().to_string()))
            .ok_or_else(|| format!("The {name} must be a string.")),
        FieldKind::Decimal { precision, scale } => {
            let value = parse_decimal(raw)
                .ok_or_else(|| format!("The {name} must be a number."))?
                .normalize();
            if value.scale() > scale {
                return Err(format!(
                    "The {name} may not have more than {scale} decimal places."
                ));
            }
            let max = numeric_max(precision, scale);
            if value.abs() > max {
                return Err(format!("The {name} may not be greater than {max}."));
            }
            Ok(Value::String(value.to_string()))
        }
        FieldKind::Integer => parse_integer(raw)
            .filter(|n| i32::try_from(*n).is_ok())
            .map(Value::from)
            .ok_or_else(|| format!("The {name} must be an integer.")),
        FieldKind::Id => parse_integer(raw)
            .filter(|id| *id > 0)
            .map(Value::from)
            .ok_or_else(|| format!("The {name} must be a valid identifier.")),
        FieldKind::Date => raw
            .as_str()
            .and_then(parse_date)
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .ok_or_else(|| format!("The {name} is not a valid date.")),
        FieldKind::DateTime => raw
            .as_str()
            .and_then(parse_datetime)
            .map(|t| Value::String(t.to_rfc3339()))
            .ok_or_else(|| format!("The {name} is not a valid date.")),
        FieldKind::OneOf(allowed) => match raw.as_str() {
            Some(s) if allowed.contains(&s.trim()) => Ok(Value::String(s.trim().to_string())),
            _ => Err(format!("The selected {name} is invalid.")),
        },
    }
}

fn parse_decimal(raw: &Value) -> Option<Decimal> {
    match raw {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// Largest magnitude a `NUMERIC(precision, scale)` column holds.
fn numeric_max(precision: u32, scale: u32) -> Decimal {
    Decimal::from_i128_with_scale(10_i128.pow(precision) - 1, scale)
}

fn parse_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(s).map(|t| t.date_naive()))
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn is_negative(value: &Value) -> bool {
    match value {
        Value::String(s) => Decimal::from_str(s).is_ok_and(|d| d.is_sign_negative() && !d.is_zero()),
        Value::Number(n) => n.as_i64().is_some_and(|i| i < 0),
        _ => false,
    }
}

fn check_ordering(
    rule: &FieldRule,
    other: &str,
    values: &Map<String, Value>,
    current: Option<&Map<String, Value>>,
    errors: &mut FieldErrors,
) {
    let lookup = |field: &str| -> Option<String> {
        let supplied = values.get(field);
        let value = match supplied {
            Some(v) => v,
            None => current?.get(field)?,
        };
        value.as_str().map(str::to_string)
    };

    let (Some(this), Some(that)) = (lookup(rule.field), lookup(other)) else {
        return;
    };

    let in_order = match rule.kind {
        FieldKind::DateTime => match (parse_datetime(&this), parse_datetime(&that)) {
            (Some(a), Some(b)) => a >= b,
            _ => true,
        },
        _ => match (parse_date(&this), parse_date(&that)) {
            (Some(a), Some(b)) => a >= b,
            _ => true,
        },
    };

    if !in_order {
        errors.add(
            rule.field,
            format!(
                "The {} must be a date after or equal to {}.",
                label(rule.field),
                label(other)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::validation::rules::RefTable;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn range_rules() -> Vec<FieldRule> {
        vec![
            FieldRule::required("name", FieldKind::Text { max: 10 }),
            FieldRule::nullable("start_date", FieldKind::Date),
            FieldRule::nullable("end_date", FieldKind::Date)
                .with(Constraint::AfterOrEqual("start_date")),
            FieldRule::nullable(
                "budget",
                FieldKind::Decimal {
                    precision: 14,
                    scale: 2,
                },
            )
            .with(Constraint::NonNegative),
        ]
    }

    #[test]
    fn missing_required_field_on_create() {
        let errors = validate(&range_rules(), &obj(json!({})), Mode::Create, None).unwrap_err();
        assert_eq!(
            errors.get("name").unwrap(),
            &["The name field is required.".to_string()]
        );
    }

    #[test]
    fn missing_required_field_is_fine_on_update() {
        let validated =
            validate(&range_rules(), &obj(json!({"budget": 5})), Mode::Update, None).unwrap();
        assert!(!validated.contains("name"));
        assert_eq!(validated.values["budget"], "5");
    }

    #[test]
    fn explicit_null_on_required_field_fails_on_update() {
        let errors =
            validate(&range_rules(), &obj(json!({"name": null})), Mode::Update, None).unwrap_err();
        assert!(errors.has("name"));
    }

    #[test]
    fn blank_string_counts_as_missing() {
        let errors =
            validate(&range_rules(), &obj(json!({"name": "   "})), Mode::Create, None).unwrap_err();
        assert!(errors.has("name"));
    }

    #[test]
    fn text_is_trimmed_and_length_checked() {
        let validated =
            validate(&range_rules(), &obj(json!({"name": "  Tower  "})), Mode::Create, None)
                .unwrap();
        assert_eq!(validated.values["name"], "Tower");

        let errors = validate(
            &range_rules(),
            &obj(json!({"name": "a much longer name"})),
            Mode::Create,
            None,
        )
        .unwrap_err();
        assert!(errors.get("name").unwrap()[0].contains("10 characters"));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let input = obj(json!({
            "name": "Bridge",
            "start_date": "2026-05-10",
            "end_date": "2026-05-01",
        }));
        let errors = validate(&range_rules(), &input, Mode::Create, None).unwrap_err();
        assert_eq!(
            errors.get("end_date").unwrap(),
            &["The end date must be a date after or equal to start date.".to_string()]
        );
    }

    #[test]
    fn equal_dates_are_accepted() {
        let input = obj(json!({
            "name": "Bridge",
            "start_date": "2026-05-10",
            "end_date": "2026-05-10",
        }));
        assert!(validate(&range_rules(), &input, Mode::Create, None).is_ok());
    }

    #[test]
    fn update_compares_against_stored_counterpart() {
        let current = obj(json!({"start_date": "2026-06-01", "end_date": "2026-07-01"}));
        let input = obj(json!({"end_date": "2026-05-01"}));
        let errors = validate(&range_rules(), &input, Mode::Update, Some(&current)).unwrap_err();
        assert!(errors.has("end_date"));

        let input = obj(json!({"start_date": "2026-06-15"}));
        assert!(validate(&range_rules(), &input, Mode::Update, Some(&current)).is_ok());
    }

    #[test]
    fn negative_decimal_is_rejected() {
        let input = obj(json!({"name": "Depot", "budget": "-0.01"}));
        let errors = validate(&range_rules(), &input, Mode::Create, None).unwrap_err();
        assert_eq!(
            errors.get("budget").unwrap(),
            &["The budget must be at least 0.".to_string()]
        );
    }

    #[test]
    fn decimal_accepts_numbers_and_numeric_strings() {
        for raw in [json!(1250.5), json!("1250.50"), json!(" 1250.5 ")] {
            let input = obj(json!({"name": "Depot", "budget": raw}));
            let validated = validate(&range_rules(), &input, Mode::Create, None).unwrap();
            assert_eq!(validated.values["budget"], "1250.5");
        }
    }

    #[test]
    fn decimal_beyond_column_precision_is_rejected() {
        let input = obj(json!({"name": "Depot", "budget": "1000000000000"}));
        let errors = validate(&range_rules(), &input, Mode::Create, None).unwrap_err();
        assert_eq!(
            errors.get("budget").unwrap(),
            &["The budget may not be greater than 999999999999.99.".to_string()]
        );

        let input = obj(json!({"name": "Depot", "budget": "999999999999.99"}));
        assert!(validate(&range_rules(), &input, Mode::Create, None).is_ok());
    }

    #[test]
    fn decimal_with_extra_places_is_rejected_not_rounded() {
        let input = obj(json!({"name": "Depot", "budget": "10.005"}));
        let errors = validate(&range_rules(), &input, Mode::Create, None).unwrap_err();
        assert_eq!(
            errors.get("budget").unwrap(),
            &["The budget may not have more than 2 decimal places.".to_string()]
        );

        // Trailing zeros are not extra precision.
        let input = obj(json!({"name": "Depot", "budget": "10.000"}));
        let validated = validate(&range_rules(), &input, Mode::Create, None).unwrap();
        assert_eq!(validated.values["budget"], "10");
    }

    #[test]
    fn at_most_caps_integers() {
        let rules = vec![FieldRule::nullable("order", FieldKind::Integer).with(Constraint::AtMost(100))];
        assert!(validate(&rules, &obj(json!({"order": 100})), Mode::Create, None).is_ok());
        let errors =
            validate(&rules, &obj(json!({"order": 101})), Mode::Create, None).unwrap_err();
        assert_eq!(
            errors.get("order").unwrap(),
            &["The order may not be greater than 100.".to_string()]
        );
    }

    #[test]
    fn invalid_date_reports_message() {
        let input = obj(json!({"name": "Depot", "start_date": "31/12/2026"}));
        let errors = validate(&range_rules(), &input, Mode::Create, None).unwrap_err();
        assert_eq!(
            errors.get("start_date").unwrap(),
            &["The start date is not a valid date.".to_string()]
        );
    }

    #[test]
    fn datetime_accepts_form_style_input() {
        let rules = vec![
            FieldRule::required("scheduled_start", FieldKind::DateTime),
            FieldRule::required("scheduled_end", FieldKind::DateTime)
                .with(Constraint::AfterOrEqual("scheduled_start")),
        ];
        let input = obj(json!({
            "scheduled_start": "2026-03-01T08:00",
            "scheduled_end": "2026-03-01 17:30:00",
        }));
        let validated = validate(&rules, &input, Mode::Create, None).unwrap();
        assert_eq!(validated.values["scheduled_start"], "2026-03-01T08:00:00+00:00");

        let input = obj(json!({
            "scheduled_start": "2026-03-01T08:00:00Z",
            "scheduled_end": "2026-03-01T07:59:59Z",
        }));
        let errors = validate(&rules, &input, Mode::Create, None).unwrap_err();
        assert!(errors.has("scheduled_end"));
    }

    #[test]
    fn enum_membership() {
        let rules = vec![FieldRule::required(
            "status",
            FieldKind::OneOf(&["todo", "in_progress", "done"]),
        )];
        assert!(validate(&rules, &obj(json!({"status": "done"})), Mode::Create, None).is_ok());
        let errors =
            validate(&rules, &obj(json!({"status": "blocked"})), Mode::Create, None).unwrap_err();
        assert_eq!(
            errors.get("status").unwrap(),
            &["The selected status is invalid.".to_string()]
        );
    }

    #[test]
    fn exists_constraint_collects_references() {
        let rules = vec![
            FieldRule::nullable("assigned_to", FieldKind::Id)
                .with(Constraint::Exists(RefTable::Users)),
        ];
        let validated =
            validate(&rules, &obj(json!({"assigned_to": "7"})), Mode::Create, None).unwrap();
        assert_eq!(
            validated.references,
            vec![Reference {
                field: "assigned_to",
                table: RefTable::Users,
                id: 7
            }]
        );

        let validated =
            validate(&rules, &obj(json!({"assigned_to": null})), Mode::Create, None).unwrap();
        assert!(validated.references.is_empty());
        assert_eq!(validated.values["assigned_to"], Value::Null);
    }

    #[test]
    fn integer_must_fit_column() {
        let rules = vec![FieldRule::nullable("order", FieldKind::Integer)];
        assert!(validate(&rules, &obj(json!({"order": "12"})), Mode::Create, None).is_ok());
        let errors = validate(&rules, &obj(json!({"order": 4_000_000_000_i64})), Mode::Create, None)
            .unwrap_err();
        assert!(errors.has("order"));
    }

    #[test]
    fn non_positive_id_is_invalid() {
        let rules = vec![FieldRule::required("task_id", FieldKind::Id)];
        let errors =
            validate(&rules, &obj(json!({"task_id": 0})), Mode::Create, None).unwrap_err();
        assert!(errors.has("task_id"));
    }

    #[test]
    fn unknown_fields_are_dropped() {
        let validated = validate(
            &range_rules(),
            &obj(json!({"name": "Depot", "created_by": 99})),
            Mode::Create,
            None,
        )
        .unwrap();
        assert!(!validated.contains("created_by"));
    }

    #[test]
    fn every_failing_field_is_reported() {
        let input = obj(json!({"budget": "lots", "start_date": "soon"}));
        let errors = validate(&range_rules(), &input, Mode::Create, None).unwrap_err();
        assert!(errors.has("name"));
        assert!(errors.has("budget"));
        assert!(errors.has("start_date"));
    }
}
