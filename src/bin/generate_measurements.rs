use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{ensure, Context, Result};
use one_billion_rows::parse_record;
use rand::seq::SliceRandom;
use rand::Rng;

const DEFAULT_STATIONS: &str = "weather_stations.csv";

#[derive(Debug, PartialEq)]
struct Station {
    name: String,
    average: f64,
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 && args.len() != 4 {
        println!("Usage: generate-measurements <OUTPUT> <SIZE> [STATIONS]");
        return Ok(());
    }

    let path = Path::new(&args[1]);
    let size = args[2]
        .replace('_', "")
        .parse::<u64>()
        .with_context(|| format!("invalid size {:?}", args[2]))?;
    let stations_path = Path::new(args.get(3).map_or(DEFAULT_STATIONS, String::as_str));

    let start = Instant::now();
    let file = File::open(stations_path)
        .with_context(|| format!("failed to read {}", stations_path.display()))?;
    let stations = load_stations(BufReader::new(file), stations_path)?;
    ensure!(!stations.is_empty(), "no stations in {}", stations_path.display());

    let out = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    generate(&stations, size, BufWriter::new(out), &mut rand::thread_rng())?;

    let bytes = fs::metadata(path)?.len();
    println!(
        "Generated {} lines ({}) in {:.3}s",
        size,
        human_size(bytes),
        start.elapsed().as_secs_f32()
    );
    Ok(())
}

/// `name;average` per line; `#` lines are comments. `path` only labels errors.
fn load_stations<R: BufRead>(reader: R, path: &Path) -> Result<Vec<Station>> {
    let mut stations = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with('#') || line.is_empty() {
            continue;
        }
        let reading = parse_record(&line)
            .with_context(|| format!("{}:{}: bad station {line:?}", path.display(), index + 1))?;
        stations.push(Station {
            name: reading.station.to_string(),
            average: reading.temperature,
        });
    }
    Ok(stations)
}

/// Writes `size` lines, each a uniformly chosen station and its average.
fn generate<W: Write, R: Rng>(stations: &[Station], size: u64, mut out: W, rng: &mut R) -> Result<()> {
    ensure!(!stations.is_empty(), "no stations to choose from");
    for _ in 0..size {
        if let Some(station) = stations.choose(rng) {
            writeln!(out, "{};{}", station.name, station.average)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn human_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    match bytes {
        size if size < KIB => format!("{}B", size),
        size if size < KIB * KIB => format!("{:.2}KiB", size as f64 / KIB as f64),
        size if size < KIB * KIB * KIB => {
            format!("{:.2}MiB", size as f64 / (KIB * KIB) as f64)
        }
        size => format!("{:.2}GiB", size as f64 / (KIB * KIB * KIB) as f64),
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    const STATIONS: &str = "# Adapted from Wikipedia\n# comment ; with a delimiter\n\
Abha;18.0\nAbidjan;26.0\n\nSão Paulo;25.7\nYakutsk;-8.8\n";

    fn stations() -> Vec<Station> {
        load_stations(STATIONS.as_bytes(), Path::new("stations.csv")).unwrap()
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let stations = stations();
        let names: Vec<_> = stations.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Abha", "Abidjan", "São Paulo", "Yakutsk"]);
        assert_eq!(
            stations[3],
            Station {
                name: "Yakutsk".to_string(),
                average: -8.8
            }
        );
    }

    #[test]
    fn bad_station_line_names_its_line() {
        let input = "# header\nAbha;18.0\nAbidjan 26.0\n";
        let err = load_stations(input.as_bytes(), Path::new("stations.csv")).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("stations.csv:3"), "{message}");
        assert!(message.contains("Abidjan 26.0"), "{message}");
    }

    #[test]
    fn writes_exactly_size_parseable_lines() {
        let stations = stations();
        let mut out = Vec::new();
        generate(&stations, 1000, &mut out, &mut StdRng::seed_from_u64(7)).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 1000);
        for line in lines {
            let reading = parse_record(line).unwrap();
            let station = stations
                .iter()
                .find(|s| s.name == reading.station)
                .unwrap_or_else(|| panic!("unknown station in {line:?}"));
            assert_eq!(reading.temperature, station.average);
        }
    }

    #[test]
    fn same_seed_same_output() {
        let stations = stations();
        let mut first = Vec::new();
        let mut second = Vec::new();
        generate(&stations, 50, &mut first, &mut StdRng::seed_from_u64(42)).unwrap();
        generate(&stations, 50, &mut second, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn zero_size_writes_nothing() {
        let mut out = Vec::new();
        generate(&stations(), 0, &mut out, &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn no_stations_is_an_error() {
        let mut out = Vec::new();
        assert!(generate(&[], 10, &mut out, &mut StdRng::seed_from_u64(1)).is_err());
    }

    #[test]
    fn human_size_picks_unit() {
        assert_eq!(human_size(512), "512B");
        assert_eq!(human_size(1536), "1.50KiB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.00MiB");
        assert_eq!(human_size(5 * 1024 * 1024 * 1024), "5.00GiB");
    }
}
