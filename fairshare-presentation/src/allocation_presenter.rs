use crate::{
    csv_export::CsvWriter,
    text_table::{Alignment, TextTableBuilder},
};
use fairshare_application::{AllocationOutcome, AllocationResponse};
use fairshare_domain::{AgentAllocation, SolveQuality};
use fairshare_i18n as i18n;
use rust_decimal::Decimal;
use std::borrow::Cow;

const CSV_HEADER: [&str; 5] = ["agent", "item", "kind", "share", "satisfaction"];

pub struct AllocationPresenter;

impl AllocationPresenter {
    pub fn render_json(outcome: &AllocationOutcome) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&AllocationResponse::from(outcome))
    }

    /// Headline guarantee followed by one table row per received item.
    pub fn render_text(outcome: &AllocationOutcome) -> String {
        let headers = [
            Cow::Borrowed(i18n::AGENT),
            Cow::Borrowed(i18n::ITEM),
            Cow::Borrowed(i18n::KIND),
            Cow::Borrowed(i18n::SHARE),
            Cow::Borrowed(i18n::SATISFACTION),
        ];
        let mut builder = TextTableBuilder::new()
            .alignments(&[
                Alignment::Left,
                Alignment::Left,
                Alignment::Left,
                Alignment::Right,
                Alignment::Right,
            ])
            .headers(&headers);

        for (holding, satisfaction) in outcome
            .allocation
            .iter()
            .zip(&outcome.report.satisfactions)
        {
            let agent = holding.agent.as_str();
            let satisfaction = format!("{}%", format_decimal(satisfaction.percentage));
            if holding.is_empty() {
                builder = builder.row([
                    Cow::Borrowed(agent),
                    Cow::Borrowed(i18n::NOTHING_RECEIVED),
                    Cow::Borrowed(""),
                    Cow::Borrowed(""),
                    Cow::Owned(satisfaction),
                ]);
                continue;
            }
            for line in holding_lines(holding) {
                builder = builder.row([
                    Cow::Borrowed(agent),
                    Cow::Borrowed(line.item),
                    Cow::Borrowed(line.kind_label()),
                    Cow::Owned(format!(
                        "{}%",
                        format_decimal(line.fraction * Decimal::ONE_HUNDRED)
                    )),
                    Cow::Owned(satisfaction.clone()),
                ]);
            }
        }

        let mut text = format!(
            "{}\n\n{}",
            i18n::worst_guarantee(format_decimal(outcome.report.worst_satisfaction)),
            builder.build()
        );
        if outcome.quality == SolveQuality::Feasible {
            text.push('\n');
            text.push_str(i18n::FEASIBLE_NOTE);
            text.push('\n');
        }
        text
    }

    /// One record per agent and received item; agents with nothing get an empty item.
    pub fn render_csv(outcome: &AllocationOutcome) -> String {
        let mut writer = CsvWriter::new();
        writer.record(CSV_HEADER);

        for (holding, satisfaction) in outcome
            .allocation
            .iter()
            .zip(&outcome.report.satisfactions)
        {
            let agent = holding.agent.as_str();
            let satisfaction = format_decimal(satisfaction.percentage);
            if holding.is_empty() {
                writer.record([agent, "", "", "", satisfaction.as_str()]);
                continue;
            }
            for line in holding_lines(holding) {
                let share = format_decimal(line.fraction);
                writer.record([
                    agent,
                    line.item,
                    line.kind_key(),
                    share.as_str(),
                    satisfaction.as_str(),
                ]);
            }
        }
        writer.finish()
    }
}

struct HoldingLine<'a> {
    item: &'a str,
    divisible: bool,
    fraction: Decimal,
}

impl HoldingLine<'_> {
    fn kind_label(&self) -> &'static str {
        if self.divisible {
            i18n::DIVISIBLE
        } else {
            i18n::INDIVISIBLE
        }
    }

    fn kind_key(&self) -> &'static str {
        if self.divisible {
            "divisible"
        } else {
            "indivisible"
        }
    }
}

fn holding_lines(holding: &AgentAllocation) -> Vec<HoldingLine<'_>> {
    let whole = holding.indivisible.iter().map(|item| HoldingLine {
        item: item.as_str(),
        divisible: false,
        fraction: Decimal::ONE,
    });
    let shares = holding.divisible.iter().map(|share| HoldingLine {
        item: share.item.as_str(),
        divisible: true,
        fraction: share.fraction,
    });
    whole.chain(shares).collect()
}

/// Two decimal places at most, without trailing zeros.
pub fn format_decimal(value: Decimal) -> String {
    value.round_dp(2).normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairshare_domain::{
        AgentName, AgentSatisfaction, Allocation, DivisibleShare, FairnessReport, ItemName,
    };
    use rstest::rstest;

    fn outcome(quality: SolveQuality) -> AllocationOutcome {
        let mut alice = AgentAllocation::new(AgentName::new("Alice"));
        alice.indivisible.push(ItemName::new("Piano"));
        alice.divisible.push(DivisibleShare {
            item: ItemName::new("Savings"),
            fraction: Decimal::new(5, 1),
        });
        let mut bob = AgentAllocation::new(AgentName::new("Bob"));
        bob.divisible.push(DivisibleShare {
            item: ItemName::new("Savings"),
            fraction: Decimal::new(5, 1),
        });
        let carol = AgentAllocation::new(AgentName::new("Carol, Jr."));

        let satisfaction = |name: &str, percentage: i64| AgentSatisfaction {
            agent: AgentName::new(name),
            value: Decimal::from(percentage),
            percentage: Decimal::from(percentage),
        };

        AllocationOutcome {
            allocation: Allocation::new(vec![alice, bob, carol]),
            report: FairnessReport {
                satisfactions: vec![
                    satisfaction("Alice", 90),
                    satisfaction("Bob", 10),
                    satisfaction("Carol, Jr.", 0),
                ],
                worst_satisfaction: Decimal::ZERO,
            },
            quality,
        }
    }

    #[test]
    fn text_starts_with_the_guarantee_and_lists_every_item() {
        let text = AllocationPresenter::render_text(&outcome(SolveQuality::Optimal));

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "Every participant receives at least 0% of the value they themselves assigned to all items."
            )
        );
        assert!(text.contains("Piano"));
        assert!(text.contains("50%"));
        assert!(text.contains(i18n::NOTHING_RECEIVED));
        assert!(!text.contains(i18n::FEASIBLE_NOTE));
    }

    #[test]
    fn text_notes_unproven_optimality() {
        let text = AllocationPresenter::render_text(&outcome(SolveQuality::Feasible));
        assert!(text.trim_end().ends_with(i18n::FEASIBLE_NOTE));
    }

    #[test]
    fn csv_has_one_record_per_received_item() {
        let csv = AllocationPresenter::render_csv(&outcome(SolveQuality::Optimal));

        assert_eq!(
            csv,
            "agent,item,kind,share,satisfaction\r\n\
             Alice,Piano,indivisible,1,90\r\n\
             Alice,Savings,divisible,0.5,90\r\n\
             Bob,Savings,divisible,0.5,10\r\n\
             \"Carol, Jr.\",,,,0\r\n"
        );
    }

    #[test]
    fn json_uses_agent_names_as_keys() {
        let json = AllocationPresenter::render_json(&outcome(SolveQuality::Optimal))
            .expect("serializable");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

        assert_eq!(value["allocations"]["Alice"]["indivisible"][0], "Piano");
        assert_eq!(value["allocations"]["Bob"]["divisible"]["Savings"], 0.5);
        assert_eq!(value["quality"], "optimal");
    }

    #[rstest]
    #[case::integer(Decimal::from(90), "90")]
    #[case::trailing_zeros(Decimal::new(9000, 2), "90")]
    #[case::two_places(Decimal::new(33333, 3), "33.33")]
    #[case::half(Decimal::new(5, 1), "0.5")]
    fn formats_decimals(#[case] value: Decimal, #[case] expected: &str) {
        assert_eq!(format_decimal(value), expected);
    }
}
