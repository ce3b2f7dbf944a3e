//! Markdown outline rendering for `create_presentation_plan`.

use crate::action::{PresentationPlan, Slide};

/// Sections used when the request carries no slides of its own.
const TEMPLATE_SECTIONS: [(&str, &str); 6] = [
    ("Introduction", "Who we are and what this talk covers."),
    ("Problem", "The pain point or opportunity, with one concrete example."),
    ("Approach", "How the project addresses it; key design decisions."),
    ("Demo", "Walkthrough of the working system."),
    ("Next Steps", "Open milestones, risks, and what we need from the audience."),
    ("Questions", "Open floor."),
];

const DEFAULT_TITLE: &str = "Presentation Plan";
const DEFAULT_AUDIENCE: &str = "General";
const SLIDE_SEPARATOR: &str = "---\n\n";

/// File stem for an outline: lowercase, alphanumerics kept, every other run
/// of characters collapsed to a single `-`.
pub fn slugify(topic: &str) -> String {
    let mut slug = String::with_capacity(topic.len());
    for ch in topic.trim().chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "presentation-plan".to_string()
    } else {
        slug
    }
}

/// Render the full Markdown document.
pub fn render_outline(plan: &PresentationPlan) -> String {
    let title = non_empty(&plan.topic).unwrap_or(DEFAULT_TITLE);
    let audience = plan
        .audience
        .as_deref()
        .and_then(non_empty)
        .unwrap_or(DEFAULT_AUDIENCE);

    let mut out = format!("# {title}\n**Audience:** {audience}\n\n{SLIDE_SEPARATOR}");
    let template;
    let slides: &[Slide] = if plan.slides.is_empty() {
        template = template_slides();
        &template
    } else {
        &plan.slides
    };
    for (idx, slide) in slides.iter().enumerate() {
        let heading = non_empty(&slide.heading).unwrap_or("Slide Heading");
        let content = non_empty(&slide.content).unwrap_or("Slide content here.");
        out.push_str(&format!("## Slide {}: {heading}\n\n{content}\n\n", idx + 1));
        out.push_str(SLIDE_SEPARATOR);
    }
    out
}

fn template_slides() -> Vec<Slide> {
    TEMPLATE_SECTIONS
        .iter()
        .map(|(heading, content)| Slide {
            heading: heading.to_string(),
            content: content.to_string(),
        })
        .collect()
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(topic: &str, slides: Vec<Slide>) -> PresentationPlan {
        PresentationPlan {
            topic: topic.to_string(),
            audience: None,
            slides,
        }
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Q3 Review: Login & Sessions!"), "q3-review-login-sessions");
        assert_eq!(slugify("  "), "presentation-plan");
        assert_eq!(slugify("../etc"), "etc");
    }

    #[test]
    fn empty_slides_use_fixed_template() {
        let text = render_outline(&plan("Launch", Vec::new()));
        assert!(text.starts_with("# Launch\n**Audience:** General\n\n---\n\n"));
        for (idx, (heading, _)) in TEMPLATE_SECTIONS.iter().enumerate() {
            assert!(
                text.contains(&format!("## Slide {}: {heading}", idx + 1)),
                "missing {heading} in {text}"
            );
        }
    }

    #[test]
    fn explicit_slides_render_in_order() {
        let text = render_outline(&PresentationPlan {
            topic: "Demo Day".into(),
            audience: Some("Investors".into()),
            slides: vec![
                Slide {
                    heading: "Hook".into(),
                    content: "Why now".into(),
                },
                Slide {
                    heading: String::new(),
                    content: String::new(),
                },
            ],
        });
        assert!(text.contains("**Audience:** Investors"));
        assert!(text.contains("## Slide 1: Hook\n\nWhy now\n\n---\n\n"));
        assert!(text.contains("## Slide 2: Slide Heading\n\nSlide content here.\n\n"));
        assert!(!text.contains("Introduction"));
    }
}
