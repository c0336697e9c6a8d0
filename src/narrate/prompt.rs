//! Prompt templates and the deterministic metrics payload.

use serde::Serialize;

use super::client::ChatMessage;
use crate::metrics::MetricsReport;

pub const PROXY_NOTE: &str =
    "Note: Sugar not provided in source. Carbohydrates are used as a proxy for sugar.";
pub const PROXY_SECTION_NOTE: &str = "Note: Using carbohydrates as a proxy for sugar values.";
pub const PROXY_CAVEAT: &str = "Sugar not provided, carbohydrates used as proxy.";

pub const SYSTEM: &str = "\
You are a precise data analysis assistant. Identical input must produce identical output.
Rules:
1. Use only the exact values in the metrics; never estimate.
2. Follow the requested format section by section.
3. Round every number to 2 decimal places.
4. Keep table headers and item ordering exactly as requested.";

const SUMMARY_TEMPLATE: &str = "\
{proxy_note}

Summarize the nutrition metrics below using exactly these sections.

## Overall Average Comparisons
A markdown table `| Metric | Drinks | Food | Difference |` with average calories, fat (g),
carbs (g), protein (g), fiber (g), sodium when available, and the fat-to-protein ratio.

## Extremes Comparisons
A markdown table `| Category | Drinks | Food |`. Highest values come from the first entry of
each `tops` list; lowest calories from the last entry of the calorie list. Write \"No data\"
for a missing cell.

## Top-5 Highest-Calorie Items
Numbered lists for drinks and for food, `[name] - [calories] calories`.

## Top-5 Highest-Sugar (Carb) Items
{proxy_section}
Numbered lists for drinks and for food, `[name] - [value]g`.

## Overall Summary
A one-sentence headline, then three short bullet findings.

Metrics:
{metrics}";

const STRUCTURED_TEMPLATE: &str = "\
Summarize per-dataset and cross-dataset insights using only the provided aggregates and tops.
Return JSON with fields: summary_text (string), key_points (array of strings), caveats (array of strings).
{proxy_caveat}
Payload:
{metrics}";

const QUESTION_TEMPLATE: &str =
    "Answer using only these metrics. If unknown, say so.\nMetrics: {metrics}\nQuestion: {question}";

/// Pretty JSON with object keys sorted, so equal reports hash equally.
pub fn normalized_json<T: Serialize>(value: &T) -> String {
    // serde_json::Map is a BTreeMap without `preserve_order`.
    serde_json::to_value(value)
        .and_then(|v| serde_json::to_string_pretty(&v))
        .unwrap_or_else(|e| {
            log::warn!("could not serialize metrics payload: {e}");
            String::from("{}")
        })
}

pub fn summary_messages(report: &MetricsReport) -> Vec<ChatMessage> {
    let proxy = report.uses_sugar_proxy();
    let user = SUMMARY_TEMPLATE
        .replace("{proxy_note}", if proxy { PROXY_NOTE } else { "" })
        .replace("{proxy_section}", if proxy { PROXY_SECTION_NOTE } else { "" })
        .replace("{metrics}", &normalized_json(report));
    vec![ChatMessage::system(SYSTEM), ChatMessage::user(user.trim_start())]
}

pub fn structured_messages(report: &MetricsReport) -> Vec<ChatMessage> {
    let caveat = if report.uses_sugar_proxy() { PROXY_CAVEAT } else { "" };
    let user = STRUCTURED_TEMPLATE
        .replace("{proxy_caveat}", caveat)
        .replace("{metrics}", &normalized_json(report));
    vec![ChatMessage::system(SYSTEM), ChatMessage::user(user)]
}

pub fn question_messages(report: &MetricsReport, question: &str) -> Vec<ChatMessage> {
    let user = QUESTION_TEMPLATE
        .replace("{metrics}", &normalized_json(report))
        .replace("{question}", question.trim());
    vec![ChatMessage::system(SYSTEM), ChatMessage::user(user)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{MenuItem, MenuTable, Nutrient};

    fn report(food_has_sugar: bool) -> MetricsReport {
        let drinks = MenuTable::from_items(vec![MenuItem::new("Mocha")
            .with(Nutrient::Calories, 250.0)
            .with(Nutrient::SugarG, 30.0)]);
        let mut bagel = MenuItem::new("Bagel")
            .with(Nutrient::Calories, 280.0)
            .with(Nutrient::CarbsG, 56.0);
        if food_has_sugar {
            bagel.set(Nutrient::SugarG, Some(6.0));
        }
        MetricsReport::build(&drinks, &MenuTable::from_items(vec![bagel]), 5)
    }

    #[test]
    fn proxy_note_leads_the_prompt() {
        let messages = summary_messages(&report(false));
        assert_eq!(messages[0].role, "system");
        assert!(messages[1].content.starts_with(PROXY_NOTE));
        assert!(messages[1].content.contains(PROXY_SECTION_NOTE));
    }

    #[test]
    fn no_proxy_note_when_sugar_present() {
        let messages = summary_messages(&report(true));
        assert!(!messages[1].content.contains(PROXY_NOTE));
        assert!(!structured_messages(&report(true))[1].content.contains(PROXY_CAVEAT));
    }

    #[test]
    fn payload_is_deterministic() {
        assert_eq!(normalized_json(&report(false)), normalized_json(&report(false)));
        let json = normalized_json(&report(false));
        let comparisons = json.find("\"comparisons\"").unwrap();
        let drinks = json.find("\"drinks\"").unwrap();
        assert!(comparisons < drinks);
    }

    #[test]
    fn question_is_embedded() {
        let messages = question_messages(&report(true), "  Which has more protein? ");
        assert!(messages[1].content.ends_with("Question: Which has more protein?"));
    }
}
