use std::error::Error;

use log::{debug, info, initialize_logger};
use structopt::StructOpt;

use rarity::rarity::compute_rarity;
use rarity::request::RawTraits;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "compute-rarity",
    about = "Compute the rarity of a combination of traits"
)]
struct Opt {
    /// brown, blue, green or hazel
    #[structopt(long)]
    eye_color: Option<String>,

    /// black, brown, blonde or red
    #[structopt(long)]
    hair_color: Option<String>,

    /// A facial feature, e.g. freckles; may be repeated
    #[structopt(long = "feature")]
    facial_features: Vec<String>,

    /// A physical ability, e.g. tongueToNose; may be repeated
    #[structopt(long = "ability")]
    physical_abilities: Vec<String>,

    /// Print the full result as JSON
    #[structopt(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let opt = Opt::from_args();

    let logger = initialize_logger();
    debug!(logger, "Parsed options"; "options" => ?opt);

    let traits = RawTraits {
        eye_color: opt.eye_color,
        hair_color: opt.hair_color,
        facial_features: opt.facial_features,
        physical_abilities: opt.physical_abilities,
    }
    .validate()?;

    let result = compute_rarity(&traits);
    info!(logger, "Computed rarity"; "percentage" => result.percentage, "ratio" => &result.ratio);

    if opt.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{:.6}% ({}): {}", result.percentage, result.ratio, result.description);
    }

    Ok(())
}
