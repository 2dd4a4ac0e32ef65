//! CSV output for flattened route rows.

use crate::route::{AddressTable, RouteRow};
use colored::Colorize;
use std::error::Error;

use super::terminal::format_field;

const HEADER: &str = r#"   "cnt",               "net",  "interface",                 "ip", "connected", "default_gw""#;

/// One CSV line for a route row.
pub fn csv_row(j: usize, row: &RouteRow) -> String {
    format!(
        r#"{j},{net},{interface},{ip},{connected},{default_gw}"#,
        j = format_field(j, 8),
        net = format_field(&row.net, 20),
        interface = format_field(&row.interface, 12),
        ip = format_field(&row.ip, 20),
        connected = format_field(row.connected, 12),
        default_gw = format_field(row.default_gw, 13),
    )
}

/// Print rows as CSV to stdout, header first.
pub fn print_route_rows(rows: &[RouteRow]) {
    println!("{HEADER}");
    for (j, row) in rows.iter().enumerate() {
        println!("{}", csv_row(j, row));
    }
}

/// Print a whole table, specific routes first and the default route last.
///
/// # Arguments
/// * `table` - The table to print
pub fn print_table(table: &AddressTable) -> Result<(), Box<dyn Error>> {
    log::info!("#Start print_table() {} routes={}", table.family(), table.len());
    let (mut rows, gws) = table
        .flatten()
        .map_err(|e| format!("Error flattening {} table: {e}", table.family()))?;
    if gws.is_empty() {
        println!("#{}# {} table has no default route", "NOTE".on_red(), table.family());
    }
    rows.extend(gws);
    print_route_rows(&rows);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{build_tables, load_route_file};

    #[test]
    fn test_csv_row() {
        let row = RouteRow {
            net: "10.0.0.0/8".to_string(),
            interface: "Gi0/1".to_string(),
            ip: "192.168.0.1".to_string(),
            connected: false,
            default_gw: false,
        };
        assert_eq!(
            csv_row(3, &row),
            r#"     "3",        "10.0.0.0/8",     "Gi0/1",       "192.168.0.1",     "false",      "false""#
        );
    }

    #[test]
    fn test_print_table_01() {
        let file = load_route_file("src/tests/test_data/routes_01.json")
            .expect("Error reading route file");
        let (v4, v6) = build_tables(&file).expect("Error building tables");
        print_table(&v4).expect("Error printing v4 table");
        print_table(&v6).expect("Error printing v6 table");

        let (rows, gws) = v4.flatten().unwrap();
        // 10.148.254.0/23 has two hops
        assert_eq!(rows.len(), 7);
        assert_eq!(gws.len(), 1);
        assert_eq!(rows[0].net, "1.1.1.0/24");
        assert_eq!(rows[2].net, "10.148.254.0/23");
        assert_eq!(rows[3].net, "10.148.254.0/23");
        assert_eq!(rows[3].interface, "Gi0/3");
    }
}
