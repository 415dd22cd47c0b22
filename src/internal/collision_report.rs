#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::pedantic)]

use std::collections::HashSet;

use collision_maps::{DEFAULT_CAPACITY, DirectMap, MapError, NeighborMap, ProbingMap, Rejected};
use env_logger::Builder;
use log::{LevelFilter, info};
use plotters::prelude::*;
use rand::Rng;

// Every variant gets the default 513 slot table
const TABLE_SIZE: usize = DEFAULT_CAPACITY;
// Load factors from 0.1 to 0.95 in 10 steps
const NUM_LOAD_FACTORS: usize = 10;
const MIN_KEY_LEN: usize = 3;
const MAX_KEY_LEN: usize = 10;

const FONT_FAMILY: &str = "sans-serif";
const COLORS: [RGBColor; 3] = [
    RGBColor(220, 50, 50), // Bright red
    RGBColor(50, 90, 220), // Bright blue
    RGBColor(50, 180, 50), // Bright green
];
const LINE_WIDTH: u32 = 2;
const MARKER_SIZE: i32 = 4;
const TEXT_SIZE: i32 = 16;
const TITLE_SIZE: i32 = 35;

#[derive(Debug)]
struct Measurement {
    rejected_percent: f64,
    longest_chain: f64,
    average_probes: f64,
    worst_probes: f64,
}

fn init_logger() {
    let mut builder = Builder::new();
    builder.filter_level(LevelFilter::Info).format_timestamp_millis().parse_default_env();

    if let Err(err) = builder.try_init() {
        eprintln!("logger already initialised: {err}");
    }
}

// Distinct lowercase keys, so only hash collisions are measured
fn random_keys(rng: &mut impl Rng, count: usize) -> Vec<String> {
    let mut seen = HashSet::with_capacity(count);
    let mut keys = Vec::with_capacity(count);

    while keys.len() < count {
        let len = rng.random_range(MIN_KEY_LEN..=MAX_KEY_LEN);
        let key: String = (0..len).map(|_| char::from(rng.random_range(b'a'..=b'z'))).collect();
        if seen.insert(key.clone()) {
            keys.push(key);
        }
    }

    keys
}

// Inserts the same keys into each variant and records how they cope
fn measure(keys: &[String]) -> collision_maps::Result<Measurement> {
    let mut direct = DirectMap::with_capacity(TABLE_SIZE)?;
    let mut chained = ProbingMap::with_capacity(TABLE_SIZE)?;
    let mut neighbor = NeighborMap::with_capacity(TABLE_SIZE)?;
    let mut rejected = 0;

    for (value, key) in keys.iter().enumerate() {
        match direct.add(key, value) {
            Ok(()) => {}
            Err(Rejected { error: MapError::Collision { .. }, .. }) => rejected += 1,
            Err(err) => return Err(err.into()),
        }
        chained.add(key, value)?;
        neighbor.add(key, value)?;
    }

    let probes = keys.iter().map(|key| neighbor.probe_count(key)).collect::<Result<Vec<_>, _>>()?;
    let average_probes = probes.iter().sum::<usize>() as f64 / probes.len().max(1) as f64;
    let worst_probes = probes.iter().copied().max().unwrap_or(0) as f64;

    Ok(Measurement {
        rejected_percent: 100.0 * rejected as f64 / keys.len().max(1) as f64,
        longest_chain: chained.longest_chain() as f64,
        average_probes,
        worst_probes,
    })
}

fn draw_chart(
    path: &str,
    caption: &str,
    y_desc: &str,
    num_keys: &[usize],
    series: &[(&str, &[f64])],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_y = series
        .iter()
        .flat_map(|(_, values)| values.iter())
        .fold(0.0, |max: f64, &x| max.max(x)) *
        1.1; // Add 10% margin
    let max_y = if max_y > 0.0 { max_y } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, (FONT_FAMILY, TITLE_SIZE))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .right_y_label_area_size(10)
        .build_cartesian_2d(0..num_keys.len(), 0.0..max_y)?;

    let x_labels: Vec<String> = num_keys.iter().map(ToString::to_string).collect();

    chart
        .configure_mesh()
        .x_labels(num_keys.len())
        .x_label_formatter(&|x| x_labels.get(*x).cloned().unwrap_or_default())
        .x_desc("Number of Keys Inserted")
        .y_desc(y_desc)
        .axis_desc_style((FONT_FAMILY, TEXT_SIZE))
        .draw()?;

    for (series_idx, &(name, values)) in series.iter().enumerate() {
        let color = COLORS[series_idx % COLORS.len()];
        let line_style = ShapeStyle::from(&color).stroke_width(LINE_WIDTH);

        chart
            .draw_series(LineSeries::new(values.iter().copied().enumerate(), line_style))?
            .label(name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));

        chart.draw_series(
            values
                .iter()
                .copied()
                .enumerate()
                .map(|point| Circle::new(point, MARKER_SIZE, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();

    let load_factors: Vec<f64> = (0..NUM_LOAD_FACTORS)
        .map(|i| 0.1 + (0.95 - 0.1) * (i as f64) / ((NUM_LOAD_FACTORS - 1) as f64))
        .collect();
    let num_keys: Vec<usize> =
        load_factors.iter().map(|&load| (TABLE_SIZE as f64 * load) as usize).collect();

    info!("Load factors: {load_factors:?}");
    info!("Number of keys: {num_keys:?}");

    let mut rng = rand::rng();
    let max_keys_needed = num_keys.iter().copied().max().unwrap_or(0);
    let keys = random_keys(&mut rng, max_keys_needed);

    let mut rejected = Vec::with_capacity(num_keys.len());
    let mut longest_chain = Vec::with_capacity(num_keys.len());
    let mut average_probes = Vec::with_capacity(num_keys.len());
    let mut worst_probes = Vec::with_capacity(num_keys.len());

    for &n_keys in &num_keys {
        let measurement = measure(&keys[..n_keys])?;
        info!(
            "{n_keys} keys: DirectMap rejected {:.1}%, ProbingMap longest chain {}, \
             NeighborMap avg probes {:.2} (worst {})",
            measurement.rejected_percent,
            measurement.longest_chain,
            measurement.average_probes,
            measurement.worst_probes
        );

        rejected.push(measurement.rejected_percent);
        longest_chain.push(measurement.longest_chain);
        average_probes.push(measurement.average_probes);
        worst_probes.push(measurement.worst_probes);
    }

    draw_chart(
        "rejected_inserts.png",
        "DirectMap Inserts Rejected by Collisions",
        "Rejected inserts (%)",
        &num_keys,
        &[("DirectMap", rejected.as_slice())],
    )?;
    draw_chart(
        "longest_chain.png",
        "ProbingMap Longest Chain",
        "Entries in the longest chain",
        &num_keys,
        &[("ProbingMap", longest_chain.as_slice())],
    )?;
    draw_chart(
        "average_probes.png",
        "NeighborMap Probes per Lookup",
        "Slots inspected",
        &num_keys,
        &[("Average", average_probes.as_slice()), ("Worst case", worst_probes.as_slice())],
    )?;

    info!("Generated plot images: rejected_inserts.png, longest_chain.png, average_probes.png");

    Ok(())
}
