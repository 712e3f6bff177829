/// Example: Derive a plan from a landmark file and print it
///
/// Usage: cargo run --example plan_report -- path/to/landmarks.json [varus_deg extension_deg depth]

use kneeplan_core::{derive_plan, LandmarkStore, PlanInputs, PlaneKind, PlannerConfig};
use std::env;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let path = args
        .get(1)
        .map(String::as_str)
        .unwrap_or(concat!(env!("CARGO_MANIFEST_DIR"), "/data/sample_landmarks.json"));

    let config = PlannerConfig::default();
    let mut parameters = config.defaults;
    let numbers: Vec<f64> = args
        .iter()
        .skip(2)
        .map(|a| a.parse())
        .collect::<Result<_, _>>()?;
    if let [varus, extension, depth] = numbers[..] {
        parameters.varus_valgus_angle = varus.to_radians();
        parameters.extension_angle = extension.to_radians();
        parameters.resection_depth = depth;
    }

    let inputs = PlanInputs {
        landmarks: LandmarkStore::load(path)?,
        parameters: parameters.clamped(&config.limits),
    };
    let snapshot = derive_plan(&config, &inputs);

    println!("Landmarks: {}", path);
    for (kind, line) in snapshot.lines() {
        println!(
            "  {:<22} {:?} -> {:?} (length {:.4})",
            kind.name(),
            line.start.coords.as_slice(),
            line.end.coords.as_slice(),
            line.length()
        );
    }

    for kind in PlaneKind::ALL {
        match snapshot.frame(kind) {
            Some(frame) => println!(
                "  {:<22} anchor {:?} normal {:?}",
                kind.name(),
                frame.anchor().coords.as_slice(),
                frame.normal().as_slice()
            ),
            None => println!("  {:<22} absent", kind.name()),
        }
    }

    if let Some(solid) = &snapshot.cutting_solid {
        let mesh = solid.world_mesh();
        if let Some((min, max)) = mesh.bounds() {
            println!(
                "Cutting solid: {} triangles, bounds {:?} .. {:?}",
                mesh.triangles.len(),
                min.coords.as_slice(),
                max.coords.as_slice()
            );
        }
    } else {
        println!("Cutting solid: absent");
    }

    Ok(())
}
