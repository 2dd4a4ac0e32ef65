//! Terminal output utilities.
//!
//! Provides formatting helpers for terminal output and the lookup report.

use crate::error::Result;
use crate::route::MatchResult;
use colored::Colorize;

/// Format a value as a quoted, right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
///
/// # Returns
/// A quoted, right-aligned string
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let value_str = value.to_string();
    let quoted = format!("\"{value_str}\"");
    let quoted_len = quoted.len();

    if quoted_len >= width {
        quoted
    } else {
        format!("{quoted:>width$}")
    }
}

/// Plain text report of one lookup, one line per matched hop then one per unmatched range.
///
/// # Arguments
/// * `query` - The query as the user typed it
/// * `result` - The lookup result
pub fn match_report(query: &str, result: &MatchResult) -> Result<Vec<String>> {
    let mut lines = vec![format!(
        "{} {} match={}",
        query,
        result.family(),
        result.is_match()
    )];
    for row in result.rows()? {
        let ip = if row.connected { "connected" } else { row.ip.as_str() };
        lines.push(format!("  {} -> {} {}", row.net, row.interface, ip));
    }
    for r in result.unmatched_ranges()? {
        lines.push(format!("  {} -> no route", r));
    }
    Ok(lines)
}

/// Print [`match_report`] to stdout, the first line colored by outcome.
pub fn print_match(query: &str, result: &MatchResult) -> Result<()> {
    let lines = match_report(query, result)?;
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            println!("{line}");
        } else if result.is_match() {
            println!("{}", line.green());
        } else {
            println!("{}", line.red());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IpFamily, IpNet, Network};
    use crate::route::{AddressTable, Hop, NextHop};

    #[test]
    fn test_match_report() {
        let mut at = AddressTable::new(IpFamily::V4);
        let nh = NextHop::from_hops(vec![Hop::new("Gi0/1", "", true, false, None).unwrap()]);
        at.push(&IpNet::parse("10.0.0.0/24").unwrap(), nh).unwrap();
        let r = at
            .match_network(&Network::parse("10.0.0.128-10.0.1.3").unwrap(), false, false)
            .unwrap();
        let lines = match_report("10.0.0.128-10.0.1.3", &r).unwrap();
        assert_eq!(
            lines,
            vec![
                "10.0.0.128-10.0.1.3 IPv4 match=false",
                "  10.0.0.128/25 -> Gi0/1 connected",
                "  10.0.1.0-10.0.1.3 -> no route",
            ]
        );
        print_match("10.0.0.128-10.0.1.3", &r).unwrap();
    }

    #[test]
    fn test_format_field_short() {
        assert_eq!(format_field("test", 10), "    \"test\"");
    }

    #[test]
    fn test_format_field_exact() {
        assert_eq!(format_field("test", 6), "\"test\"");
    }

    #[test]
    fn test_format_field_long() {
        assert_eq!(format_field("long_value", 5), "\"long_value\"");
    }

    #[test]
    fn test_format_field_number() {
        assert_eq!(format_field(42, 6), "  \"42\"");
    }
}
