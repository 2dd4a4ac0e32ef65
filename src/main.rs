use chrono::Local;
use network_algebra::config::Settings;
use network_algebra::input::{build_tables, load_route_file};
use network_algebra::models::{AddressSet, IpFamily, Network};
use network_algebra::output::{print_match, print_table};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    let settings = Settings::from_env();
    log4rs::init_file(&settings.log_config, Default::default())
        .map_err(|e| format!("Error initializing log4rs from {}: {e}", settings.log_config))?;
    log::info!("#Start main()");

    let mut args = std::env::args().skip(1);
    let route_file = match args.next().or_else(|| settings.route_file.clone()) {
        Some(f) => f,
        None => return Err("usage: network-algebra <route_file.json> [query ...]".into()),
    };

    let file = load_route_file(&route_file)?;
    let (v4, v6) = build_tables(&file)?;
    print_table(&v4)?;
    print_table(&v6)?;

    for query in args {
        let net = Network::parse(&query).map_err(|e| format!("Query {query}: {e}"))?;
        let table = match net.family() {
            IpFamily::V4 => &v4,
            IpFamily::V6 => &v6,
        };
        let result = table.match_network(&net, true, false)?;
        print_match(&query, &result)?;
    }

    if let Some(path) = settings.snapshot_path(Local::now().date_naive()) {
        let mut snapshot = serde_json::Map::new();
        snapshot.insert(v4.family().to_string(), serde_json::to_value(&v4)?);
        snapshot.insert(v6.family().to_string(), serde_json::to_value(&v6)?);
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| format!("Error serializing JSON: {e}"))?;
        log::warn!("Writing route tables to snapshot file: {}", path.display());
        std::fs::write(&path, json)
            .map_err(|e| format!("Error writing snapshot file {}: {e}", path.display()))?;
    }

    log::info!("#End main()");
    Ok(())
}
