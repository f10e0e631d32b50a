use std::{env, error::Error, fs::File, io::BufWriter};

use gtfs::{GtfsFeed, InputTables};
use synthesis::{
    store::{InMemoryScheduleStore, ScheduleStore},
    Engine, SynthesisConfig,
};

use config::CliConfig;

mod config;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = CliConfig::from_args_or_env(env::args().skip(1)).ok_or(
        "usage: synthesize <input dir or zip> [output dir or zip], \
         or set SYNTHESIS_INPUT and SYNTHESIS_OUTPUT",
    )?;

    let input = InputTables::open(&config.input)?.into_input();
    let outcome = Engine::new(SynthesisConfig::from_env()).run(input);
    for error in &outcome.errors {
        log::warn!("{}", error);
    }

    let mut store = InMemoryScheduleStore::new();
    store.commit(&outcome.result)?;
    let stored = store.snapshot();

    GtfsFeed::from_result(&stored).export(&config.output, config.format)?;

    if let Some(path) = &config.result_json {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &stored)?;
        log::info!("wrote synthesis result to {}", path.display());
    }

    println!("{}", serde_json::to_string_pretty(&outcome.report())?);
    Ok(())
}
