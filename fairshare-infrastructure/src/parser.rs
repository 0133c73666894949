use fairshare_application::{AllocationRequest, RequestParseError, RequestParser};
use serde_json::error::Category;

/// Decodes allocation requests from JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRequestParser;

impl RequestParser for JsonRequestParser {
    fn parse(&self, content: &str) -> Result<AllocationRequest, RequestParseError> {
        if content.trim().is_empty() {
            return Err(RequestParseError::Empty);
        }

        serde_json::from_str(content).map_err(|err| {
            let line = err.line();
            let column = err.column();
            let detail = err.to_string();
            match err.classify() {
                Category::Data => RequestParseError::Shape {
                    line,
                    column,
                    detail,
                },
                Category::Io | Category::Syntax | Category::Eof => RequestParseError::Syntax {
                    line,
                    column,
                    detail,
                },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[test]
    fn parses_original_contract_shape() {
        let request = JsonRequestParser
            .parse(
                r#"{
                    "items": [
                        {"name": "House", "is_divisible": false},
                        {"name": "Savings", "is_divisible": true}
                    ],
                    "people": ["Ann", "Ben"],
                    "valuations": [
                        {"person": "Ann", "item": "House", "value": 70},
                        {"person": "Ann", "item": "Savings", "value": 30},
                        {"person": "Ben", "item": "House", "value": 45.5},
                        {"person": "Ben", "item": "Savings", "value": 54.5}
                    ]
                }"#,
            )
            .expect("valid request");

        assert_eq!(request.items.len(), 2);
        assert!(request.items[1].is_divisible);
        assert_eq!(request.agents[1].name(), "Ben");
        assert_eq!(request.valuations[2].value, Decimal::new(455, 1));
    }

    #[rstest]
    #[case::blank("   \n")]
    #[case::nothing("")]
    fn rejects_empty_input(#[case] content: &str) {
        assert_eq!(JsonRequestParser.parse(content), Err(RequestParseError::Empty));
    }

    #[test]
    fn reports_syntax_errors_with_position() {
        let err = JsonRequestParser
            .parse("{\n  \"items\": [\n}")
            .expect_err("malformed json");
        assert!(matches!(err, RequestParseError::Syntax { line: 3, .. }));
    }

    #[rstest]
    #[case::items_not_a_list(r#"{"items": 3}"#)]
    #[case::value_not_a_number(
        r#"{"valuations": [{"agent": "A", "item": "X", "value": [1]}]}"#
    )]
    #[case::missing_item_name(r#"{"items": [{"is_divisible": true}]}"#)]
    fn reports_shape_errors(#[case] content: &str) {
        let err = JsonRequestParser.parse(content).expect_err("wrong shape");
        assert!(matches!(err, RequestParseError::Shape { .. }));
    }
}
