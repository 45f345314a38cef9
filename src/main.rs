// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use streetwise::directions::{describe_route, DirectionOptions};
use streetwise::osm::{self, Network};
use streetwise::{earth_distance, find_route, Graph, KDTree, Locate, Route, TravelMode};

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct GraphLoadError(PathBuf, #[source] osm::Error);

#[derive(Debug, thiserror::Error)]
#[error("invalid position {0:?}: expected \"LAT,LON\" in decimal degrees")]
struct PositionError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProfileArg {
    Foot,
    Bicycle,
    Motorcycle,
}

impl ProfileArg {
    fn profile(self) -> &'static osm::Profile<'static> {
        match self {
            Self::Foot => &osm::FOOT_PROFILE,
            Self::Bicycle => &osm::BICYCLE_PROFILE,
            Self::Motorcycle => &osm::MOTORCYCLE_PROFILE,
        }
    }

    fn travel_mode(self) -> TravelMode {
        match self {
            Self::Foot => TravelMode::Walk,
            Self::Bicycle => TravelMode::Bicycle,
            Self::Motorcycle => TravelMode::Motorbike,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Geojson,
    Text,
}

#[derive(Parser)]
#[command(version, about = "Find a route between two points of an OSM street network")]
struct Cli {
    /// The path to the OSM file (.osm, .osm.gz or .osm.bz2)
    osm_file: PathBuf,

    /// Start position, as "LAT,LON"
    #[arg(allow_hyphen_values = true)]
    start: String,

    /// End position, as "LAT,LON"
    #[arg(allow_hyphen_values = true)]
    goal: String,

    /// Which ways can be used, and in which direction
    #[arg(long, value_enum, default_value_t = ProfileArg::Foot)]
    profile: ProfileArg,

    /// How to print the found route
    #[arg(long, value_enum, default_value_t = OutputFormat::Geojson)]
    format: OutputFormat,

    /// Snap positions to nodes with a k-d tree instead of a linear scan
    #[arg(long)]
    kd_tree: bool,

    /// Maximum number of nodes to expand before giving up
    #[arg(long, default_value_t = streetwise::DEFAULT_STEP_LIMIT)]
    step_limit: usize,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    let start = parse_position(&cli.start)?;
    let goal = parse_position(&cli.goal)?;

    let network = load_network(&cli.osm_file, cli.profile.profile())?;
    let g = &network.graph;

    let route = if cli.kd_tree {
        match KDTree::from_graph(g) {
            Some(tree) => search_between(g, &tree, start, goal, cli.step_limit)?,
            None => search_between(g, g, start, goal, cli.step_limit)?,
        }
    } else {
        search_between(g, g, start, goal, cli.step_limit)?
    };

    let straight_line_m = earth_distance(start.0, start.1, goal.0, goal.1);
    match route.detour_ratio(straight_line_m) {
        Some(ratio) => log::info!(
            "straight-line distance {:.1} m, route is {:.2} times longer",
            straight_line_m,
            ratio
        ),
        None if !route.is_found() => {
            log::warn!("no route between {} and {}", cli.start, cli.goal)
        }
        None => {}
    }

    match cli.format {
        OutputFormat::Geojson => print_geojson(&route, g, cli.profile.travel_mode()),
        OutputFormat::Text => print_directions(&route, &network, &cli.start, &cli.goal),
    }

    Ok(())
}

fn parse_position(s: &str) -> Result<(f64, f64), PositionError> {
    streetwise::parse_lat_lon(s).ok_or_else(|| PositionError(s.to_string()))
}

fn load_network<P: AsRef<Path>>(
    path: P,
    profile: &osm::Profile<'_>,
) -> Result<Network, GraphLoadError> {
    let options = osm::Options::new(profile);
    osm::load_file(&options, path.as_ref())
        .map_err(|e| GraphLoadError(PathBuf::from(path.as_ref()), e))
}

fn search_between<L: Locate + ?Sized>(
    g: &Graph,
    locator: &L,
    start: (f64, f64),
    goal: (f64, f64),
    step_limit: usize,
) -> Result<Route, streetwise::AStarError> {
    let route = find_route(g, locator, start, goal, step_limit)?;
    log::info!("found route over {} nodes, {:.1} m", route.nodes.len(), route.cost);
    Ok(route)
}

fn print_geojson(route: &Route, g: &Graph, mode: TravelMode) {
    let (cost, minutes) = if route.is_found() {
        (
            format!("{:.1}", route.cost),
            format!("{:.1}", mode.estimate_minutes(route.cost)),
        )
    } else {
        ("null".to_string(), "null".to_string())
    };

    println!("{{");
    println!("  \"type\": \"FeatureCollection\",");
    println!("  \"features\": [");
    println!("    {{");
    println!("      \"type\": \"Feature\",");
    println!("      \"properties\": {{");
    println!("        \"cost\": {},", cost);
    println!("        \"mode\": \"{}\",", mode);
    println!("        \"minutes\": {}", minutes);
    println!("      }},");

    println!("      \"geometry\": {{");
    println!("        \"type\": \"LineString\",");
    println!("        \"coordinates\": [");

    let mut coordinates = route.coordinates(g).into_iter().peekable();
    while let Some((lat, lon)) = coordinates.next() {
        let suffix = if coordinates.peek().is_some() { "," } else { "" };
        println!("          [{}, {}]{}", lon, lat, suffix);
    }

    println!("        ]");
    println!("      }}");
    println!("    }}");
    println!("  ]");
    println!("}}");
}

fn print_directions(route: &Route, network: &Network, origin: &str, dest: &str) {
    let steps = describe_route(
        route,
        &network.graph,
        &network.metadata,
        origin,
        dest,
        &DirectionOptions::default(),
    );

    for step in steps {
        if step.distance_m > 0.0 {
            println!("{}. {} ({:.0} m)", step.ordinal, step.text, step.distance_m);
        } else {
            println!("{}. {}", step.ordinal, step.text);
        }
    }
}
