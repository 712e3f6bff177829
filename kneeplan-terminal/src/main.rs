/// Kneeplan Terminal - interactive resection planning console
///
/// Usage: kneeplan-terminal [landmarks.json] [--config config.json]
/// Controls:
///   - v/V e/E: varus/valgus and extension angle
///   - d/D a/A l/L: resection depth, anterior and lateral line length
///   - 1-5: toggle plane display, r: toggle resection
///   - Q/ESC: Quit

use kneeplan_core::{LandmarkStore, Planner, PlannerConfig};
use kneeplan_terminal::PlannerConsole;
use std::env;
use std::error::Error;

struct Args {
    landmarks: Option<String>,
    config: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        landmarks: None,
        config: None,
    };
    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                args.config = Some(iter.next().ok_or("--config needs a path")?);
            }
            _ if args.landmarks.is_none() => args.landmarks = Some(arg),
            _ => return Err(format!("unexpected argument: {arg}")),
        }
    }
    Ok(args)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => PlannerConfig::load(path)?,
        None => PlannerConfig::default(),
    };
    let mut planner = Planner::new(config);
    match &args.landmarks {
        Some(path) => planner.set_landmarks(LandmarkStore::load(path)?),
        None => log::warn!("no landmark file given, starting with an empty plan"),
    }

    let mut console = PlannerConsole::new(planner);
    console.run()?;
    Ok(())
}
