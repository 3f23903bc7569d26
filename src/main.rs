#![warn(non_snake_case)]
//! # bsp_query
//!
//! Loads a compiled collision tree (JSON) and runs a single query against
//! it. Handy for checking what a level compiler produced without booting
//! the game.
//!
//! ```text
//! bsp_query [--config <FILE>] point <TREE> <X> <Y> <Z>
//! bsp_query [--config <FILE>] move <TREE> <X> <Y> <Z> <DX> <DY> <DZ>
//! ```
//!
//! Set `RUST_LOG=debug` to see tree validation details.

use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use bsp_collision::bsp::BspTree;
use bsp_collision::{CollisionConfig, EnvironmentCollisions};
use clap::{Parser, Subcommand};
use glam::Vec3;
use log::{error, info};

#[derive(Debug, Parser)]
#[command(name = "bsp_query", about = "Run a collision query against a compiled BSP tree")]
struct Cli {
    /// Collision tuning (JSON) overriding the built-in epsilon and depth limit
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    query: Query,
}

#[derive(Debug, Subcommand)]
enum Query {
    /// Report whether a world-space point is inside an obstacle
    Point {
        /// Compiled tree (JSON)
        tree: PathBuf,
        #[arg(allow_negative_numbers = true)]
        x: f32,
        #[arg(allow_negative_numbers = true)]
        y: f32,
        #[arg(allow_negative_numbers = true)]
        z: f32,
    },
    /// Sweep a movement and report the first boundary it hits
    Move {
        /// Compiled tree (JSON)
        tree: PathBuf,
        #[arg(allow_negative_numbers = true)]
        x: f32,
        #[arg(allow_negative_numbers = true)]
        y: f32,
        #[arg(allow_negative_numbers = true)]
        z: f32,
        #[arg(allow_negative_numbers = true)]
        dx: f32,
        #[arg(allow_negative_numbers = true)]
        dy: f32,
        #[arg(allow_negative_numbers = true)]
        dz: f32,
    },
}

impl Query {
    fn tree(&self) -> &PathBuf {
        match self {
            Query::Point { tree, .. } | Query::Move { tree, .. } => tree,
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => CollisionConfig::from_path(path)?,
        None => CollisionConfig::default(),
    };
    let tree_path = cli.query.tree();
    let tree = BspTree::from_reader(BufReader::new(File::open(tree_path)?))?;
    info!(
        "Loaded {} ({} nodes, depth {})",
        tree_path.display(),
        tree.len(),
        tree.depth()
    );
    let env = EnvironmentCollisions::with_config(tree, config)?;

    match cli.query {
        Query::Point { x, y, z, .. } => {
            let blocked = env.is_point_in_obstacle(Vec3::new(x, y, z));
            println!("{}", if blocked { "obstructed" } else { "open" });
        }
        Query::Move {
            x, y, z, dx, dy, dz, ..
        } => match env.check_movement(Vec3::new(x, y, z), Vec3::new(dx, dy, dz)) {
            Some(hit) => println!(
                "hit t={} point={} normal={} distance={}",
                hit.t(),
                hit.point(),
                hit.normal(),
                hit.distance()
            ),
            None => println!("clear"),
        },
    }
    Ok(())
}

fn main() -> ExitCode {
    // Initialize logging.
    env_logger::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Query failed: {}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
