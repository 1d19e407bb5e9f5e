use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use terradat::Coordinate;

#[derive(Serialize)]
struct HeightResponse {
    lat: f64,
    lon: f64,
    altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(
    data_dir: Option<PathBuf>,
    cache_size: u64,
    grid_spacing: u32,
    lat: f64,
    lon: f64,
    json: bool,
) -> Result<()> {
    let service = super::build_service(data_dir, cache_size, grid_spacing)?;

    let coordinate = Coordinate::new(lat, lon);
    let outcome = service.coordinate_heights(&[coordinate]);

    if json {
        let response = match &outcome {
            Ok(altitudes) => HeightResponse {
                lat,
                lon,
                altitude: altitudes.first().copied(),
                error: None,
            },
            Err(abort) => HeightResponse {
                lat,
                lon,
                altitude: None,
                error: Some(abort.error.to_string()),
            },
        };
        println!("{}", serde_json::to_string(&response)?);
        return Ok(());
    }

    match outcome {
        Ok(altitudes) => println!("{}", altitudes[0]),
        Err(abort) => anyhow::bail!(abort.error),
    }

    Ok(())
}
