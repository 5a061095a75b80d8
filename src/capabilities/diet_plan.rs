use anyhow::Result;
use serde_json::json;

use super::{Capability, CapabilityId, OutputSchema};
use crate::models::{DietPlanInput, DietPlanOutput, Prompt};
use crate::render::HeadingRule;
use crate::services::validation::{Field, FieldRule, InputSchema};

pub const ACTIVITY_LEVELS: &[&str] = &[
    "sedentary",
    "lightly active",
    "moderately active",
    "very active",
    "extra active",
];

pub const FITNESS_GOALS: &[&str] = &[
    "weight loss",
    "muscle gain",
    "weight maintenance",
    "general health",
];

pub const PLAN_DETAIL_LEVELS: &[&str] = &["summary", "detailed"];

pub fn capability() -> Result<Capability<DietPlanInput, DietPlanOutput>> {
    Ok(Capability {
        id: CapabilityId::DietPlan,
        input_schema: input_schema(),
        output_schema: OutputSchema::new(json!({
            "type": "object",
            "properties": {
                "dietPlan": {
                    "type": "string",
                    "description": "A personalized diet plan tailored to the user based on their input."
                }
            },
            "required": ["dietPlan"]
        })),
        prompt_template: prompt,
        heading_rules: heading_rules()?,
        sub_heading_rules: sub_heading_rules()?,
        output_check: None,
    })
}

fn input_schema() -> InputSchema {
    InputSchema::new(vec![
        Field::required("weightKg", FieldRule::NumberRange { min: 20.0, max: 300.0 }),
        Field::required("heightFt", FieldRule::NumberRange { min: 3.0, max: 8.0 }),
        Field::required("age", FieldRule::NumberRange { min: 16.0, max: 100.0 }),
        Field::required("gender", FieldRule::OneOf(&["male", "female"])),
        Field::required("fitnessGoals", FieldRule::OneOf(FITNESS_GOALS)),
        Field::optional("dietaryPreferences", FieldRule::Text { min_len: 0, max_len: 500 }),
        Field::required("activityLevel", FieldRule::OneOf(ACTIVITY_LEVELS)),
        Field::required("planDetailLevel", FieldRule::OneOf(PLAN_DETAIL_LEVELS))
            .with_default(json!("detailed")),
    ])
}

/// Day and meal headings first, then the closing sections models tend to add.
fn heading_rules() -> Result<Vec<HeadingRule>> {
    Ok(vec![
        HeadingRule::pattern(r"Day\s+\d+\s*:")?,
        HeadingRule::pattern(r"Meal\s+\d+\s*:")?,
        HeadingRule::literal("Breakfast:"),
        HeadingRule::literal("Lunch:"),
        HeadingRule::literal("Dinner:"),
        HeadingRule::pattern(r"(Morning\s+|Afternoon\s+|Evening\s+)?Snack(\s+\d+)?\s*:")?,
        HeadingRule::literal("Important Notes and Adjustments:"),
        HeadingRule::literal("Important Considerations:"),
        HeadingRule::literal("Sample Meal Plan:"),
        HeadingRule::literal("Shopping List:"),
    ])
}

fn sub_heading_rules() -> Result<Vec<HeadingRule>> {
    Ok(vec![
        HeadingRule::pattern(r"Option\s+\d+")?,
        HeadingRule::pattern(r"(Pre|Post)[-\s]Workout")?,
        HeadingRule::literal("Daily Totals"),
        HeadingRule::literal("Hydration"),
        HeadingRule::literal("Supplements"),
        HeadingRule::literal("Meal Prep"),
        HeadingRule::literal("Tips"),
        HeadingRule::literal("Notes"),
    ])
}

fn prompt(input: &DietPlanInput) -> Prompt {
    let preferences = input
        .dietary_preferences
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or("None specified");

    let detail = if input.plan_detail_level == "summary" {
        "Keep the plan short: one line per meal with the key foods."
    } else {
        "Give every meal its foods with serving sizes as bullet points."
    };

    Prompt::text(format!(
        "You are a personal nutrition and fitness coach.\n\
         \n\
         Based on the following information about the user, create a personalized diet plan \
         to help them achieve their fitness goals.\n\
         \n\
         Weight: {} kg\n\
         Height: {} ft\n\
         Age: {} years\n\
         Gender: {}\n\
         Fitness Goals: {}\n\
         Dietary Preferences: {}\n\
         Activity Level: {}\n\
         \n\
         The diet plan should include meal suggestions, nutritional information, and recommended serving sizes. {}\n\
         \n\
         Format: start each meal on its own line as \"Breakfast:\", \"Lunch:\", \"Dinner:\" or \"Snack:\" \
         (prefix with \"Day N:\" lines for multi-day plans). List foods as \"* Food: serving\" bullets and \
         close each meal with an italic line \"*Approximate Nutritional Information: ...*\". \
         End with \"Important Considerations:\".",
        input.weight_kg,
        input.height_ft,
        input.age,
        input.gender,
        input.fitness_goals,
        preferences,
        input.activity_level,
        detail,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ContentNode;

    fn input() -> DietPlanInput {
        DietPlanInput {
            weight_kg: 70.0,
            height_ft: 5.9,
            age: 30.0,
            gender: "female".into(),
            fitness_goals: "muscle gain".into(),
            dietary_preferences: None,
            activity_level: "very active".into(),
            plan_detail_level: "detailed".into(),
        }
    }

    #[test]
    fn test_prompt_embeds_profile() {
        let capability = capability().unwrap();
        let prompt = capability.render_prompt(&input());

        assert!(prompt.text.contains("Weight: 70 kg"));
        assert!(prompt.text.contains("Height: 5.9 ft"));
        assert!(prompt.text.contains("Dietary Preferences: None specified"));
        assert!(prompt.media.is_empty());
    }

    #[test]
    fn test_heading_vocabulary_splits_typical_plan() {
        let capability = capability().unwrap();
        let text = "Here is your plan.\n\n**Day 1:**\n\n🍳 **Breakfast:**\n* Eggs: 2 large\n\n**Evening Snack:**\n* Greek yogurt\n\n**Option 2**\n- Cottage cheese\n\nShopping List:\n* Eggs";

        let doc = capability.document_renderer().render(text);
        let titles: Vec<_> = doc.sections.iter().map(|s| s.title.as_str()).collect();

        assert_eq!(titles, vec!["", "Day 1", "🍳 Breakfast", "Evening Snack", "Shopping List"]);
        assert_eq!(
            doc.sections[3].nodes[1],
            ContentNode::Heading { text: "Option 2".into() }
        );
    }

    #[test]
    fn test_plan_detail_level_defaults_to_detailed() {
        let raw = json!({
            "weightKg": 80, "heightFt": "6", "age": 41, "gender": "male",
            "fitnessGoals": "weight loss", "activityLevel": "sedentary"
        });
        let validated = input_schema().validate(&raw).unwrap();
        let parsed: DietPlanInput = serde_json::from_value(validated).unwrap();

        assert_eq!(parsed.plan_detail_level, "detailed");
        assert_eq!(parsed.height_ft, 6.0);
        assert!(parsed.dietary_preferences.is_none());
    }
}
