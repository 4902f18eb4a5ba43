//! Command-line tool for world files
//!
//! ```text
//! cluster-world [--config <toml>] new  <path> <x> <y> <z>
//! cluster-world [--config <toml>] info <path>
//! cluster-world [--config <toml>] pick <path> <ox> <oy> <oz> <dx> <dy> <dz>
//! ```

use anyhow::{anyhow, bail, Context, Result};
use cgmath::{Point3, Vector3};

use cluster_world::constants::blocks::DEFAULT_BLOCK_NAMES;
use cluster_world::{BlockCatalog, CubeGeometrySource, Ray, WorldConfig, WorldStore};

const USAGE: &str = "usage: cluster-world [--config <toml>] <new|info|pick> <path> [args...]";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let config = take_config(&mut args)?;

    let command = args.first().ok_or_else(|| anyhow!(USAGE))?.as_str();
    let path = args.get(1).ok_or_else(|| anyhow!(USAGE))?;
    let rest = &args[2..];

    match command {
        "new" => create(path, rest, config),
        "info" => info(path, config),
        "pick" => pick(path, rest, config),
        other => bail!("unknown command {:?}\n{}", other, USAGE),
    }
}

/// Remove `--config <path>` from `args` and load it, or fall back to defaults
fn take_config(args: &mut Vec<String>) -> Result<WorldConfig> {
    let Some(flag) = args.iter().position(|arg| arg == "--config") else {
        return Ok(WorldConfig::default());
    };
    if flag + 1 >= args.len() {
        bail!("--config needs a path\n{}", USAGE);
    }
    let path = args.remove(flag + 1);
    args.remove(flag);
    WorldConfig::load(&path).with_context(|| format!("loading configuration {}", path))
}

fn parse_numbers<T: std::str::FromStr>(args: &[String], count: usize) -> Result<Vec<T>> {
    if args.len() != count {
        bail!("expected {} numbers, got {}\n{}", count, args.len(), USAGE);
    }
    args.iter()
        .map(|arg| {
            arg.parse()
                .map_err(|_| anyhow!("{:?} is not a valid number", arg))
        })
        .collect()
}

fn create(path: &str, args: &[String], config: WorldConfig) -> Result<()> {
    let size: Vec<u32> = parse_numbers(args, 3)?;
    let source = CubeGeometrySource::new(config.cube_size);
    let catalog = BlockCatalog::from_names(DEFAULT_BLOCK_NAMES, &source)?;

    let world = WorldStore::flat(config, catalog, [size[0], size[1], size[2]])?;
    world
        .save(path)
        .with_context(|| format!("saving world to {}", path))?;
    Ok(())
}

fn info(path: &str, config: WorldConfig) -> Result<()> {
    let source = CubeGeometrySource::new(config.cube_size);
    let world = WorldStore::load(path, config, &source)
        .with_context(|| format!("loading world {}", path))?;

    let grid = world.grid();
    let [sx, sy, sz] = grid.size();
    println!("size: {} x {} x {}", sx, sy, sz);
    println!("clusters: {:?} ({} total)", grid.cluster_counts(), grid.cluster_count());
    println!("solid cells: {}", grid.solid_count());
    for (i, name) in world.block_names().iter().enumerate() {
        println!("block {}: {}", i, name);
    }
    Ok(())
}

fn pick(path: &str, args: &[String], config: WorldConfig) -> Result<()> {
    let values: Vec<f32> = parse_numbers(args, 6)?;
    let source = CubeGeometrySource::new(config.cube_size);
    let mut world = WorldStore::load(path, config, &source)
        .with_context(|| format!("loading world {}", path))?;
    world.activate_all()?;

    let ray = Ray::new(
        Point3::new(values[0], values[1], values[2]),
        Vector3::new(values[3], values[4], values[5]),
    );
    if ray.is_degenerate() {
        bail!("ray direction must be finite and non-zero");
    }
    match world.pick(&ray) {
        Some(result) => {
            println!("hit: {}", result.hit);
            println!("neighbor: {}", result.neighbor);
            println!("face: {:?}", result.face);
            println!("distance: {}", result.distance);
        }
        None => println!("no hit"),
    }
    Ok(())
}
