use anyhow::Result;
use serde_json::json;

use super::{Capability, CapabilityId, OutputSchema};
use crate::models::{Prompt, WorkoutInput, WorkoutOutput};
use crate::services::validation::{Field, FieldRule, InputSchema};

pub const BODY_PARTS: &[&str] = &["chest", "legs", "arms", "abs", "back", "shoulders"];
pub const FITNESS_LEVELS: &[&str] = &["beginner", "intermediate", "advanced"];
pub const WORKOUT_LOCATIONS: &[&str] = &["gym", "home"];

pub const DEFAULT_DISCLAIMER: &str = "Always consult with a healthcare professional or certified personal trainer before starting any new workout program. Proper form is crucial to prevent injuries. Listen to your body and adjust as needed.";

const MIN_EXERCISES: usize = 3;
const MAX_EXERCISES: usize = 7;

pub fn capability() -> Result<Capability<WorkoutInput, WorkoutOutput>> {
    Ok(Capability {
        id: CapabilityId::WorkoutSchedule,
        input_schema: InputSchema::new(vec![
            Field::required("bodyPart", FieldRule::OneOf(BODY_PARTS)),
            Field::required("timeAvailable", FieldRule::NumberRange { min: 10.0, max: 120.0 }),
            Field::required("fitnessLevel", FieldRule::OneOf(FITNESS_LEVELS)),
            Field::required("workoutLocation", FieldRule::OneOf(WORKOUT_LOCATIONS)),
        ]),
        output_schema: OutputSchema::new(json!({
            "type": "object",
            "properties": {
                "workoutTitle": { "type": "string" },
                "exercises": {
                    "type": "array",
                    "minItems": MIN_EXERCISES,
                    "maxItems": MAX_EXERCISES,
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "sets": { "type": "string" },
                            "reps": { "type": "string" },
                            "rest": { "type": "string" }
                        },
                        "required": ["name", "sets", "reps", "rest"]
                    }
                },
                "notes": { "type": "string" },
                "disclaimer": { "type": "string", "default": DEFAULT_DISCLAIMER }
            },
            "required": ["workoutTitle", "exercises"]
        }))
        .with_default("disclaimer", json!(DEFAULT_DISCLAIMER)),
        prompt_template: prompt,
        heading_rules: Vec::new(),
        sub_heading_rules: Vec::new(),
        output_check: Some(check_exercise_count),
    })
}

/// Out-of-range counts are reported, not rejected.
fn check_exercise_count(output: &WorkoutOutput) -> Vec<String> {
    let count = output.exercises.len();
    if (MIN_EXERCISES..=MAX_EXERCISES).contains(&count) {
        Vec::new()
    } else {
        vec![format!(
            "expected {}-{} exercises, model returned {}",
            MIN_EXERCISES, MAX_EXERCISES, count
        )]
    }
}

fn prompt(input: &WorkoutInput) -> Prompt {
    let location_hint = if input.workout_location == "home" {
        "Prioritize bodyweight exercises or common household items as alternatives."
    } else {
        "Assume access to standard gym equipment."
    };

    let level_hint = match input.fitness_level.as_str() {
        "beginner" => "Focus on fundamental movements.",
        "intermediate" => "Use a mix of compound and isolation exercises.",
        _ => "Suggest more complex movements and techniques.",
    };

    Prompt::text(format!(
        "You are an expert fitness coach and personal trainer.\n\
         Create a single, targeted workout session for a user based on the body part they want to train, \
         the time they have available, their fitness level, and where they are working out.\n\
         \n\
         User Details:\n\
         - Body Part to Train: {}\n\
         - Time Available: {} minutes\n\
         - Fitness Level: {}\n\
         - Workout Location: {}\n\
         \n\
         Output Requirements:\n\
         1. Workout Title: a catchy and descriptive title for the session.\n\
         2. Exercises: {}-{} exercises, each with name, sets, reps per set and rest between sets. \
         Prioritize compound exercises if time is short. {}\n\
         3. Notes: brief notes on form, intensity, or a warm-up/cool-down.\n\
         4. Disclaimer: include this safety disclaimer verbatim: \"{}\"\n\
         \n\
         {}",
        input.body_part,
        input.time_available,
        input.fitness_level,
        input.workout_location,
        MIN_EXERCISES,
        MAX_EXERCISES,
        location_hint,
        DEFAULT_DISCLAIMER,
        level_hint,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkoutExercise;

    fn output(n: usize) -> WorkoutOutput {
        WorkoutOutput {
            workout_title: "Push".into(),
            exercises: (0..n)
                .map(|i| WorkoutExercise {
                    name: format!("Move {}", i),
                    sets: "3".into(),
                    reps: "10".into(),
                    rest: "60s".into(),
                })
                .collect(),
            notes: None,
            disclaimer: DEFAULT_DISCLAIMER.into(),
        }
    }

    #[test]
    fn test_exercise_count_is_warning_only() {
        let capability = capability().unwrap();
        assert!(capability.output_warnings(&output(5)).is_empty());
        assert_eq!(
            capability.output_warnings(&output(9)),
            vec!["expected 3-7 exercises, model returned 9".to_string()]
        );
    }

    #[test]
    fn test_prompt_mentions_location_hint() {
        let capability = capability().unwrap();
        let prompt = capability.render_prompt(&WorkoutInput {
            body_part: "legs".into(),
            time_available: 30.0,
            fitness_level: "beginner".into(),
            workout_location: "home".into(),
        });
        assert!(prompt.text.contains("Time Available: 30 minutes"));
        assert!(prompt.text.contains("bodyweight"));
        assert!(prompt.text.contains("fundamental movements"));
    }

    #[test]
    fn test_disclaimer_default_applies() {
        let capability = capability().unwrap();
        let mut raw = json!({
            "workoutTitle": "Quick Legs",
            "exercises": [{"name": "Squat", "sets": "3", "reps": "12", "rest": "60s"}]
        });
        capability.output_schema.apply_defaults(&mut raw);
        let parsed: WorkoutOutput = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.disclaimer, DEFAULT_DISCLAIMER);
    }
}
