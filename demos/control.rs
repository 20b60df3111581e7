use zamg::{DataKind, LatLon, Zamg, ZamgError};

#[tokio::main]
async fn main() -> Result<(), ZamgError> {
    // Set RUST_LOG=debug to see cache and transport activity
    env_logger::init();

    let mut zamg = Zamg::new();

    // Graz, Thalerhof
    let station = zamg.closest_station(46.99, 15.499).await?;
    zamg.set_default_station(&station);
    println!("Closest station: {} ({})", station, zamg.station_name()?);

    let nearby = zamg
        .find_stations()
        .location(LatLon(46.99, 15.499))
        .station_limit(3)
        .call()
        .await?;
    for s in &nearby {
        println!("  nearby: {} {}", s.id, s.name);
    }

    println!("Available parameters:");
    for code in zamg.all_parameters() {
        if let Some(info) = zamg.parameter_info(&code) {
            println!(
                "  {code:>4}  {}  [{}]",
                info.long_name.as_deref().unwrap_or("-"),
                info.unit.as_deref().unwrap_or("-")
            );
        }
    }

    zamg.set_parameters_str("TL,SO");
    zamg.refresh().await?;

    for parameter in zamg.current_parameters() {
        println!(
            "{}: {} {}",
            zamg.get_value(&parameter, DataKind::Name)?,
            zamg.get_value(&parameter, DataKind::Value)?,
            zamg.get_value(&parameter, DataKind::Unit)?,
        );
    }
    if let Some(timestamp) = zamg.last_update() {
        println!("Last update: {timestamp}");
    }

    zamg.close();
    Ok(())
}
