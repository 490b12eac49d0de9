use serde_json::{Map, Value};

/// The patient profile is an open record owned by the form UI. The engine
/// never types or validates its fields; it only renders them into the
/// narrative below.
pub type PatientHistory = Map<String, Value>;

/// Combined system prompt: base instruction plus, when a profile was
/// supplied, the rendered patient narrative.
pub fn build_system_prompt(base: &str, history: Option<&PatientHistory>) -> String {
    match history {
        Some(history) => format!(
            "{}\n\nPatient History:\n{}",
            base,
            format_patient_history(history)
        ),
        None => base.to_string(),
    }
}

/// Render the profile record into the fixed clinical template. Fields the
/// form did not send print as the literal `undefined`; that matches the
/// behavior the downstream model was tuned against, so absent fields get no
/// special-casing here.
pub fn format_patient_history(history: &PatientHistory) -> String {
    let f = |key: &str| field(history, key);

    format!(
        "A {}-year-old {} {} (DOB: {}) presents with {}.\n\n\
         Residency: {}, Recent Travel: {}\n\
         Chronic conditions: {}\n\
         Medical, surgical, and immunization history: {}\n\
         Family medical history: {}\n\
         Genetic conditions: {}\n\
         Mental health: {}\n\
         At-birth complications: {}\n\
         Allergies: {}\n\
         Current medications: {}\n\
         Height: {}cm, Weight: {}kg, BMI: {}\n\
         Blood group: {}\n\
         Blood pressure: {}, Oxygen level: {}, Glucose/sugar level: {}, Heart rate: {}\n\
         Alcohol use: {}\n\
         Tobacco/nicotine use: {}\n\
         Exercise level: {}\n\
         Recreational drug use: {}\n\
         Sexual activity: {}\n\
         Caffeine intake: {}\n\
         Environmental hazards: {}\n\
         Obstetric and gynecological history: {}",
        f("age"),
        f("race"),
        f("sexAssignedAtBirth"),
        f("dob"),
        f("chiefComplaint"),
        f("residency"),
        f("recentTravel"),
        f("chronicConditions"),
        f("medicalHistory"),
        f("familyHistory"),
        f("geneticConditions"),
        f("mentalHealth"),
        f("birthComplications"),
        f("allergies"),
        f("currentMedications"),
        f("height"),
        f("weight"),
        f("bmi"),
        f("bloodGroup"),
        f("bloodPressure"),
        f("oxygenLevel"),
        f("glucoseLevel"),
        f("heartRate"),
        f("alcoholUse"),
        f("tobaccoUse"),
        f("exerciseLevel"),
        f("drugUse"),
        f("sexualActivity"),
        f("caffeineIntake"),
        f("environmentalHazards"),
        f("obGynHistory"),
    )
}

fn field(history: &PatientHistory, key: &str) -> String {
    match history.get(key) {
        None => "undefined".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn history(value: Value) -> PatientHistory {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn known_fields_are_interpolated() {
        let h = history(json!({
            "age": 45,
            "race": "Hispanic",
            "sexAssignedAtBirth": "female",
            "chiefComplaint": "chest pain"
        }));
        let narrative = format_patient_history(&h);

        assert!(narrative.starts_with("A 45-year-old Hispanic female"));
        assert!(narrative.contains("presents with chest pain."));
    }

    #[test]
    fn missing_fields_render_as_undefined() {
        let narrative = format_patient_history(&history(json!({ "age": 30 })));

        assert!(narrative.contains("A 30-year-old undefined undefined"));
        assert!(narrative.contains("Allergies: undefined"));
        assert!(narrative.contains("Obstetric and gynecological history: undefined"));
    }

    #[test]
    fn numeric_vitals_render_without_quotes() {
        let narrative = format_patient_history(&history(json!({
            "height": 172, "weight": 70, "bmi": 23.7
        })));

        assert!(narrative.contains("Height: 172cm, Weight: 70kg, BMI: 23.7"));
    }

    #[test]
    fn system_prompt_without_history_is_just_the_base() {
        assert_eq!(build_system_prompt("base prompt", None), "base prompt");
    }

    #[test]
    fn system_prompt_appends_narrative_when_history_present() {
        let h = history(json!({ "age": 30 }));
        let prompt = build_system_prompt("base prompt", Some(&h));

        assert!(prompt.starts_with("base prompt\n\nPatient History:\nA 30-year-old"));
    }
}
