// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wander contributors

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{debug, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::path::PathBuf;
use wander_core::features::{FeatureId, Landmark, LayerKind};
use wander_core::geocoder::{Geocoder, MapboxGeocoder};
use wander_core::planner::TripPlanner;
use wander_core::popup::{FormAction, LandmarkPopup, PopupForm};
use wander_core::session::{Dialog, DialogChoice, NoticeKind};
use wander_core::walking::MapboxDirections;
use wander_core::{Backend, HttpBackend, WanderConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Trip backend base URL
    #[arg(short, long, env = "WANDER_BACKEND_URL")]
    backend: Option<String>,

    /// Config file (defaults to config.json in the config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the search prompt, landmark layers and saved destinations
    Status,
    /// List landmarks
    Landmarks {
        /// Use the full layer instead of the initial one
        #[arg(long)]
        full: bool,
        /// Print each landmark's popup markup
        #[arg(long)]
        html: bool,
    },
    /// Search places with the geocoder
    Search {
        query: Vec<String>,
        /// Add the Nth result (1-based) to the trip
        #[arg(long, conflicts_with = "save")]
        add: Option<usize>,
        /// Save the Nth result (1-based) to favorites
        #[arg(long)]
        save: Option<usize>,
    },
    /// Add a destination to the trip
    Add(TargetArgs),
    /// Save a destination to favorites
    Save(TargetArgs),
    /// List the trip's destinations
    Waypoints,
    /// Walking directions through the trip
    Directions,
    /// Walking directions between searched places, without touching the trip
    Walk {
        /// Two or more place queries, in walking order
        #[arg(required = true, num_args = 2..)]
        places: Vec<String>,
    },
    /// Remove every destination
    Clear,
    /// Ask the backend to add a generated landmark to the trip
    AddNewLandmark,
    /// Dump the backend session
    Debug,
}

#[derive(Args)]
struct TargetArgs {
    /// Landmark id
    #[arg(long, conflicts_with_all = ["lon", "lat", "name"])]
    landmark: Option<String>,
    #[arg(long, allow_hyphen_values = true, requires_all = ["lat", "name"])]
    lon: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long)]
    name: Option<String>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

fn cookie_path() -> PathBuf {
    wander_core::get_config_root().join("session_cookie.txt")
}

fn print_notices<B: Backend>(planner: &mut TripPlanner<B>) {
    for notice in planner.session.drain_notices() {
        match notice.kind {
            NoticeKind::Info => println!("{}", notice.text),
            NoticeKind::Error => eprintln!("{}", notice.text),
        }
    }
}

fn print_landmark(landmark: &Landmark) {
    println!(
        "{:>5}  {:<32} {:.5}, {:.5}",
        landmark.id.to_string(),
        landmark.name,
        landmark.position.lat,
        landmark.position.lng
    );
}

fn choose_destination(
    planner: &mut TripPlanner<HttpBackend>,
    target: &TargetArgs,
    action: FormAction,
) -> Result<()> {
    if let Some(id) = &target.landmark {
        let form = PopupForm {
            action,
            landmark_id: FeatureId::from(id.as_str()),
        };
        return Ok(planner.submit_popup(&form)?);
    }
    match (target.lon, target.lat, &target.name) {
        (Some(lon), Some(lat), Some(name)) => {
            planner.session.open_confirm([lon, lat], name);
            let choice = match action {
                FormAction::Add => DialogChoice::Add,
                FormAction::Save => DialogChoice::Save,
            };
            Ok(planner.confirm(choice)?)
        }
        _ => anyhow::bail!("Give either --landmark <id> or --lon, --lat and --name"),
    }
}

fn run(planner: &mut TripPlanner<HttpBackend>, config: &WanderConfig, command: &Commands) -> Result<()> {
    match command {
        Commands::Status => {
            let result = planner.bootstrap();
            let session = &planner.session;
            println!("{}", session.placeholder());
            println!(
                "Landmarks: {} initial, {} full",
                session.landmarks().layer(LayerKind::Initial).len(),
                session.landmarks().layer(LayerKind::Full).len()
            );
            for (i, marker) in session.route().markers().iter().enumerate() {
                println!("{:>3}. {}", i + 1, marker.title);
            }
            result?;
        }
        Commands::Landmarks { full, html } => {
            let kind = if *full { LayerKind::Full } else { LayerKind::Initial };
            let collection = planner.backend().landmarks(kind)?;
            for feature in collection.features {
                let landmark = Landmark::from_feature(feature, kind);
                print_landmark(&landmark);
                if *html {
                    println!("       {}", LandmarkPopup::for_landmark(&landmark).to_html());
                }
            }
        }
        Commands::Search { query, add, save } => {
            let query = query.join(" ");
            let geocoder = MapboxGeocoder::from_config(config)?;
            let places = geocoder.search(&query, Some(planner.session.view.center))?;
            if places.is_empty() {
                println!("No places found matching '{}'", query);
                return Ok(());
            }
            for (i, place) in places.iter().enumerate() {
                println!("{:>3}. {}", i + 1, place.place_name);
            }
            let pick = add
                .map(|n| (n, DialogChoice::Add))
                .or_else(|| save.map(|n| (n, DialogChoice::Save)));
            if let Some((n, choice)) = pick {
                let place = n
                    .checked_sub(1)
                    .and_then(|i| places.get(i))
                    .with_context(|| format!("No result number {}", n))?;
                planner.session.select_place(place);
                planner.confirm(choice)?;
            }
        }
        Commands::Add(target) => choose_destination(planner, target, FormAction::Add)?,
        Commands::Save(target) => choose_destination(planner, target, FormAction::Save)?,
        Commands::Waypoints => {
            let waypoints = planner.backend().all_waypoints()?;
            if waypoints.is_empty() {
                println!("No destinations yet.");
            }
            for (i, w) in waypoints.iter().enumerate() {
                println!(
                    "{:>3}. {} ({:.5}, {:.5})",
                    i + 1,
                    w.place_name,
                    w.coordinates[1],
                    w.coordinates[0]
                );
            }
        }
        Commands::Directions => {
            let result = planner.get_directions();
            let panel = planner.session.panel();
            for line in &panel.routes {
                print!("{}", line);
            }
            for line in &panel.duration {
                print!("{}", line);
            }
            println!();
            for (instruction, distance) in panel.instructions.iter().zip(&panel.distances) {
                println!("  {:<48} {}", instruction, distance);
            }
            result?;
        }
        Commands::Walk { places } => {
            let geocoder = MapboxGeocoder::from_config(config)?;
            let near = Some(planner.session.view.center);
            let mut labels = Vec::with_capacity(places.len());
            let mut stops = Vec::with_capacity(places.len());
            for query in places {
                let place = geocoder
                    .search(query, near)?
                    .into_iter()
                    .next()
                    .with_context(|| format!("No places found matching '{}'", query))?;
                labels.push(place.text.clone());
                stops.push(place.position());
            }
            let route = MapboxDirections::from_config(config)?.walk(&stops)?;
            println!("{}: {}", labels.join(" to "), route.duration);
            for step in &route.steps {
                println!("  {:<48} {}", step.instruction, step.distance);
            }
        }
        Commands::Clear => planner.clear()?,
        Commands::AddNewLandmark => planner.add_new_landmark()?,
        Commands::Debug => {
            planner.debug()?;
            if let Some(Dialog::Session { title, text, .. }) = planner.session.dialog() {
                println!("{}\n{}", title, text);
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = WanderConfig::load_from(path)?;
            config.apply_env();
            config
        }
        None => WanderConfig::load()?,
    };
    if let Some(url) = cli.backend {
        config.backend_url = url;
    }
    debug!("Using backend — url={}", config.backend_url);

    let backend = HttpBackend::from_config(&config)?;
    let cookies = cookie_path();
    backend
        .load_cookies(&cookies)
        .with_context(|| format!("Failed to read {}", cookies.display()))?;

    let mut planner = TripPlanner::new(backend, &config);
    let result = run(&mut planner, &config, &cli.command);
    print_notices(&mut planner);
    planner
        .backend()
        .save_cookies(&cookies)
        .with_context(|| format!("Failed to write {}", cookies.display()))?;
    result
}
