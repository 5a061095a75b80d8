pub mod inline;
pub mod markup;
pub mod sections;

pub use inline::{ContentNode, InlineRenderer};
pub use markup::HeadingRule;
pub use sections::SectionParser;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSection {
    pub title: String,
    pub nodes: Vec<ContentNode>,
}

/// Display structure for a prose answer. Derived fresh on every render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDocument {
    pub sections: Vec<RenderedSection>,
    pub generated_at: DateTime<Utc>,
}

/// Section parser and inline renderer configured for one capability.
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    parser: SectionParser,
    inline: InlineRenderer,
}

impl DocumentRenderer {
    pub fn new(heading_rules: Vec<HeadingRule>, sub_heading_rules: Vec<HeadingRule>) -> Self {
        Self {
            parser: SectionParser::new(heading_rules),
            inline: InlineRenderer::new(sub_heading_rules),
        }
    }

    pub fn render(&self, text: &str) -> RenderedDocument {
        let sections = self
            .parser
            .parse(text)
            .into_iter()
            .map(|section| RenderedSection {
                nodes: self.inline.render(&section.body),
                title: section.title,
            })
            .collect();

        RenderedDocument {
            sections,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_breakfast_and_lunch() {
        let renderer = DocumentRenderer::new(
            vec![HeadingRule::literal("Breakfast:"), HeadingRule::literal("Lunch:")],
            Vec::new(),
        );
        let text = "**Breakfast:**\n* Oats: 50g with milk\n*Approximate Nutritional Information: 300 kcal*\n\n**Lunch:**\n* Chicken and rice";

        let doc = renderer.render(text);

        assert_eq!(
            doc.sections,
            vec![
                RenderedSection {
                    title: "Breakfast".into(),
                    nodes: vec![
                        ContentNode::TitledListItem {
                            indent_level: 0,
                            title: "Oats".into(),
                            description: "50g with milk".into(),
                        },
                        ContentNode::NutritionNote {
                            text: "Approximate Nutritional Information: 300 kcal".into(),
                        },
                    ],
                },
                RenderedSection {
                    title: "Lunch".into(),
                    nodes: vec![ContentNode::ListItem {
                        indent_level: 0,
                        text: "Chicken and rice".into(),
                    }],
                },
            ]
        );
    }

    #[test]
    fn test_rendering_twice_is_structurally_equal() {
        let renderer = DocumentRenderer::new(vec![HeadingRule::literal("Dinner:")], Vec::new());
        let text = "Warm-up text\nDinner:\n- salmon\n  - **Side:** greens";
        assert_eq!(renderer.render(text).sections, renderer.render(text).sections);
    }
}
