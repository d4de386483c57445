use fw_core::enums::EntityKind;
use fw_core::sla::BudgetOverrides;
use serde::de::DeserializeOwned;

/// Parse a snake_case enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Parse `<kind>.<key>=<hours>` assignments into budget overrides.
///
/// Only the syntax is checked here; keys and hours are validated by the engine.
pub fn parse_budget_assignments(raw: &[String]) -> anyhow::Result<BudgetOverrides> {
    let mut overrides = BudgetOverrides::new();
    for assignment in raw {
        let (path, hours) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("invalid budget '{assignment}': expected KIND.KEY=HOURS"))?;
        let (kind, key) = path
            .trim()
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("invalid budget '{assignment}': expected KIND.KEY=HOURS"))?;
        let kind: EntityKind = parse_enum(kind, "kind")?;
        let hours: f64 = hours
            .trim()
            .parse()
            .map_err(|error| anyhow::anyhow!("invalid hours in '{assignment}': {error}"))?;
        overrides.set(kind, key.replace('-', "_"), hours);
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use fw_core::enums::{EntityKind, Severity};
    use pretty_assertions::assert_eq;

    use super::{parse_budget_assignments, parse_enum};

    #[test]
    fn parses_snake_case_enum() {
        let kind: EntityKind = parse_enum("report_phase", "kind").expect("kind should parse");
        assert_eq!(kind, EntityKind::ReportPhase);
    }

    #[test]
    fn parses_hyphenated_alias() {
        let kind: EntityKind = parse_enum("report-phase", "kind").expect("kind should parse");
        assert_eq!(kind, EntityKind::ReportPhase);
    }

    #[test]
    fn errors_on_invalid_enum() {
        let err = parse_enum::<Severity>("minor", "severity").expect_err("should fail");
        assert!(err.to_string().contains("invalid severity 'minor'"));
    }

    #[test]
    fn parses_budget_assignments() {
        let overrides = parse_budget_assignments(&[
            "report.in_progress=10".to_string(),
            "report-phase.pending=1.5".to_string(),
        ])
        .expect("assignments should parse");
        assert_eq!(
            overrides,
            fw_core::sla::BudgetOverrides::new()
                .with(EntityKind::Report, "in_progress", 10.0)
                .with(EntityKind::ReportPhase, "pending", 1.5)
        );
    }

    #[test]
    fn rejects_malformed_assignments() {
        for raw in ["report.in_progress", "in_progress=10", "report.global=soon", "flight.global=1"] {
            assert!(
                parse_budget_assignments(&[raw.to_string()]).is_err(),
                "{raw} should be rejected"
            );
        }
    }
}
