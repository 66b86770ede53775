use crate::duty::engine::{calculate_duty, DutyOptions, DutyRequest};
use crate::duty::outcome::{format_money, kinds, DutyCalculationResult};
use crate::model::TariffEntry;
use crate::policy::schema::PolicyDef;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Smallest toggle impact worth reporting (one cent).
const SIGNIFICANCE_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Totals for one setting of `prefer_reciprocal_additive`, with and without
/// reciprocal tariffs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    #[serde(rename = "withRT")]
    pub with_rt: Decimal,
    #[serde(rename = "withoutRT")]
    pub without_rt: Decimal,
    pub difference: Decimal,
    /// Difference relative to the total without reciprocal tariffs, in percent.
    pub percent_difference: Decimal,
    /// "label (type)" for every component of the with-RT run.
    pub applied_tariffs: Vec<String>,
    /// Reciprocal, fentanyl and IEEPA amounts in the with-RT run.
    pub rt_amount: Decimal,
    pub section_301_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TogglePair {
    pub toggle_off: Decimal,
    pub toggle_on: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleAnalysis {
    pub is_significant_difference: bool,
    /// How much more reciprocal tariffs cost with the toggle on than off.
    pub toggle_impact: Decimal,
    pub recommendation: String,
    pub rt_impact: TogglePair,
    pub section_301_impact: TogglePair,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleComparison {
    pub toggle_off: ScenarioSummary,
    pub toggle_on: ScenarioSummary,
    pub analysis: ToggleAnalysis,
    pub breakdown: Vec<String>,
}

struct ScenarioRuns {
    with_rt: DutyCalculationResult,
    without_rt: DutyCalculationResult,
}

impl ScenarioRuns {
    fn run(
        entry: &TariffEntry,
        request: &DutyRequest,
        policy: &PolicyDef,
        now: DateTime<Utc>,
        prefer: bool,
    ) -> Self {
        let with_options = |exclude: bool| {
            request.clone().with_options(DutyOptions {
                prefer_reciprocal_additive: prefer,
                exclude_reciprocal_tariff: exclude,
            })
        };
        Self {
            with_rt: calculate_duty(Some(entry), &with_options(false), policy, now),
            without_rt: calculate_duty(Some(entry), &with_options(true), policy, now),
        }
    }

    fn summary(&self) -> ScenarioSummary {
        let difference = self.with_rt.amount - self.without_rt.amount;
        let percent_difference = if self.without_rt.amount > Decimal::ZERO {
            (difference / self.without_rt.amount * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        } else {
            Decimal::ZERO
        };
        ScenarioSummary {
            with_rt: self.with_rt.amount,
            without_rt: self.without_rt.amount,
            difference,
            percent_difference,
            applied_tariffs: self
                .with_rt
                .components
                .iter()
                .map(|c| {
                    let name = if c.label.is_empty() { &c.kind } else { &c.label };
                    format!("{name} ({})", c.kind)
                })
                .collect(),
            rt_amount: self.with_rt.amount_of(kinds::RECIPROCAL_FAMILY),
            section_301_amount: self.with_rt.amount_of(&[kinds::SECTION_301]),
        }
    }
}

/// Run all four toggle combinations for one entry and report how much the
/// Section 301 preference changes the reciprocal-tariff impact.
///
/// The options already set on `request` are ignored.
pub fn compare_reciprocal_toggles(
    entry: &TariffEntry,
    request: &DutyRequest,
    policy: &PolicyDef,
    now: DateTime<Utc>,
) -> ToggleComparison {
    let off = ScenarioRuns::run(entry, request, policy, now, false);
    let on = ScenarioRuns::run(entry, request, policy, now, true);
    let toggle_off = off.summary();
    let toggle_on = on.summary();

    let toggle_impact = toggle_on.difference - toggle_off.difference;
    let is_significant_difference = toggle_impact.abs() > SIGNIFICANCE_THRESHOLD;
    let recommendation = if !is_significant_difference {
        "Toggle state has minimal impact on duties"
    } else if toggle_impact > Decimal::ZERO {
        "Consider using toggle OFF to minimize duties"
    } else {
        "Consider using toggle ON to minimize duties"
    }
    .to_string();

    let analysis = ToggleAnalysis {
        is_significant_difference,
        toggle_impact,
        recommendation,
        rt_impact: TogglePair {
            toggle_off: toggle_off.rt_amount,
            toggle_on: toggle_on.rt_amount,
        },
        section_301_impact: TogglePair {
            toggle_off: toggle_off.section_301_amount,
            toggle_on: toggle_on.section_301_amount,
        },
    };

    let breakdown = comparison_breakdown(&off, &on, &toggle_off, &toggle_on, &analysis);
    ToggleComparison {
        toggle_off,
        toggle_on,
        analysis,
        breakdown,
    }
}

fn scenario_lines(title: &str, runs: &ScenarioRuns, summary: &ScenarioSummary) -> Vec<String> {
    let without = &runs.without_rt;
    vec![
        format!("{title}:"),
        format!("  With RT: {}", format_money(summary.with_rt)),
        format!("    - RT Amount: {}", format_money(summary.rt_amount)),
        format!(
            "    - Section 301 Amount: {}",
            format_money(summary.section_301_amount)
        ),
        format!("  Without RT: {}", format_money(summary.without_rt)),
        format!(
            "    - RT Amount: {}",
            format_money(without.amount_of(kinds::RECIPROCAL_FAMILY))
        ),
        format!(
            "    - Section 301 Amount: {}",
            format_money(without.amount_of(&[kinds::SECTION_301]))
        ),
        format!(
            "  Difference: {} ({}%)",
            format_money(summary.difference),
            summary.percent_difference
        ),
        format!("  Applied Tariffs: {}", summary.applied_tariffs.join(", ")),
    ]
}

fn comparison_breakdown(
    off: &ScenarioRuns,
    on: &ScenarioRuns,
    toggle_off: &ScenarioSummary,
    toggle_on: &ScenarioSummary,
    analysis: &ToggleAnalysis,
) -> Vec<String> {
    let rule = "----------------------------------------".to_string();
    let mut lines = vec!["Duty Comparison Analysis:".to_string(), rule.clone()];
    lines.extend(scenario_lines("Toggle OFF", off, toggle_off));
    lines.push(String::new());
    lines.extend(scenario_lines("Toggle ON", on, toggle_on));
    lines.push(String::new());
    lines.extend([
        "Analysis:".to_string(),
        format!("  Toggle Impact: {}", format_money(analysis.toggle_impact)),
        "  RT Impact:".to_string(),
        format!("    - Toggle OFF: {}", format_money(analysis.rt_impact.toggle_off)),
        format!("    - Toggle ON: {}", format_money(analysis.rt_impact.toggle_on)),
        "  Section 301 Impact:".to_string(),
        format!(
            "    - Toggle OFF: {}",
            format_money(analysis.section_301_impact.toggle_off)
        ),
        format!(
            "    - Toggle ON: {}",
            format_money(analysis.section_301_impact.toggle_on)
        ),
        format!(
            "  Significant Difference: {}",
            if analysis.is_significant_difference { "Yes" } else { "No" }
        ),
        format!("  Recommendation: {}", analysis.recommendation),
        String::new(),
        "Detailed Component Breakdown:".to_string(),
        rule,
    ]);

    for (title, result) in [
        ("Toggle OFF With RT:", &off.with_rt),
        ("Toggle OFF Without RT:", &off.without_rt),
        ("Toggle ON With RT:", &on.with_rt),
        ("Toggle ON Without RT:", &on.without_rt),
    ] {
        lines.push(title.to_string());
        lines.extend(result.breakdown.iter().cloned());
        lines.push(String::new());
    }
    lines.pop();
    lines
}
