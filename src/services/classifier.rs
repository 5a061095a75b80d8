use crate::capabilities::CapabilityId;
use crate::models::Usage;

use super::errors::GenerationError;

/// Finish reasons that describe a normal stop and say nothing about why output is missing.
const UNINFORMATIVE_FINISH_REASONS: [&str; 4] = ["stop", "length", "unknown", "unspecified"];

const SAFETY_HINT: &str =
    " This may be due to safety filters. Please review your input or adjust safety settings if possible.";

/// Classify a response that carried no usable output.
///
/// Precedence: an informative finish reason, then a bare finish message,
/// then the generic empty-output message.
pub fn classify_empty_output(capability: CapabilityId, usage: Option<&Usage>) -> GenerationError {
    let Some(usage) = usage else {
        return generic(capability);
    };

    let finish_reason = non_blank(usage.finish_reason.as_deref());
    let finish_message = non_blank(usage.finish_message.as_deref());

    if let Some(reason) = finish_reason {
        let lowered = reason.to_lowercase();
        if !UNINFORMATIVE_FINISH_REASONS.contains(&lowered.as_str()) {
            let mut message = format!("{} failed. Reason: {}.", capability.subject(), reason);
            if let Some(detail) = finish_message {
                message.push_str(&format!(" Message: {}.", detail));
            }
            if lowered == "safety" {
                message.push_str(SAFETY_HINT);
                return GenerationError::safety_refusal(message);
            }
            return GenerationError::empty_output(message);
        }
    }

    if let Some(detail) = finish_message {
        return GenerationError::empty_output(format!("{} issue: {}.", capability.subject(), detail));
    }

    generic(capability)
}

pub fn generic_empty_message(capability: CapabilityId) -> String {
    format!(
        "{} failed to generate a valid response; the output was unexpectedly empty.",
        capability.label()
    )
}

fn generic(capability: CapabilityId) -> GenerationError {
    GenerationError::empty_output(generic_empty_message(capability))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::errors::ErrorKind;

    fn usage(reason: Option<&str>, message: Option<&str>) -> Usage {
        Usage {
            finish_reason: reason.map(String::from),
            finish_message: message.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_safety_reason_is_safety_refusal() {
        let err = classify_empty_output(CapabilityId::DietPlan, Some(&usage(Some("SAFETY"), None)));

        assert_eq!(err.kind, ErrorKind::SafetyRefusal);
        assert!(err.message.starts_with("Diet plan generation failed. Reason: SAFETY."));
        assert!(err.message.to_lowercase().contains("safety filters"));
    }

    #[test]
    fn test_informative_reason_with_message() {
        let err = classify_empty_output(
            CapabilityId::WorkoutSchedule,
            Some(&usage(Some("RECITATION"), Some("copyrighted text"))),
        );

        assert_eq!(err.kind, ErrorKind::EmptyOutput);
        assert_eq!(
            err.message,
            "Workout generation failed. Reason: RECITATION. Message: copyrighted text."
        );
    }

    #[test]
    fn test_safety_with_message_keeps_both() {
        let err = classify_empty_output(
            CapabilityId::ChatCoach,
            Some(&usage(Some("safety"), Some("harm category"))),
        );
        assert_eq!(err.kind, ErrorKind::SafetyRefusal);
        assert!(err.message.contains("Message: harm category."));
        assert!(err.message.ends_with("adjust safety settings if possible."));
    }

    #[test]
    fn test_normal_reason_falls_through_to_message() {
        for reason in ["STOP", "length", "Unknown", "UNSPECIFIED"] {
            let err = classify_empty_output(
                CapabilityId::FoodImage,
                Some(&usage(Some(reason), Some("schema mismatch"))),
            );
            assert_eq!(err.kind, ErrorKind::EmptyOutput);
            assert_eq!(err.message, "Food analysis issue: schema mismatch.");
        }
    }

    #[test]
    fn test_message_only() {
        let err = classify_empty_output(CapabilityId::BodyScan, Some(&usage(None, Some("no person detected"))));
        assert_eq!(err.message, "Body scan analysis issue: no person detected.");
    }

    #[test]
    fn test_usage_without_informative_fields_is_generic() {
        let err = classify_empty_output(CapabilityId::DietPlan, Some(&usage(Some("STOP"), None)));
        assert_eq!(err.message, generic_empty_message(CapabilityId::DietPlan));

        let err = classify_empty_output(CapabilityId::DietPlan, Some(&usage(Some("  "), Some(""))));
        assert_eq!(err.message, generic_empty_message(CapabilityId::DietPlan));
    }

    #[test]
    fn test_no_usage_is_generic() {
        let err = classify_empty_output(CapabilityId::DietPlan, None);
        assert_eq!(err.kind, ErrorKind::EmptyOutput);
        assert_eq!(
            err.message,
            "Diet plan failed to generate a valid response; the output was unexpectedly empty."
        );
    }
}
