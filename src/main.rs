use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use conformant::catalog::{
    self, Animal, Circle, Country, Dice, HasArea, HasValue, LinearCongruentialGenerator,
    PrettyTextRepresentable, StructWithValue, ClassWithValue, TextRepresentable,
};
use conformant::existentials;
use conformant::game::{DiceGame, DiceGameTracker, SnakesAndLadders};
use conformant::settings::{ReportFormat, Settings};
use conformant::Result;

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(settings: &Settings) -> Result<()> {
    let registry = catalog::registry()?;

    let values = existentials![
        2_i64,
        StructWithValue::new(3),
        true,
        ClassWithValue::new(6),
        "Word"
    ];
    for value in registry.matches::<dyn HasValue>(&values) {
        println!("{}", value.value());
    }
    let checks: Vec<String> = registry
        .test_each::<dyn HasValue>(&values)
        .iter()
        .map(bool::to_string)
        .collect();
    println!("{}", checks.join(" "));

    let shapes = existentials![Circle::new(2.0), Country::new(243_610.0), Animal::new(4)];
    for (shape, area) in shapes.iter().zip(registry.narrow_each::<dyn HasArea>(&shapes)) {
        match area {
            Some(area) => println!("Area of {} is {}", shape.type_name(), area.area()),
            None => println!("Something that doesn't have an area"),
        }
    }

    let dice = Dice::new(settings.sides, LinearCongruentialGenerator::with_seed(settings.seed));
    let mut game = SnakesAndLadders::with_final_square(settings.final_square, dice)
        .with_max_turns(settings.max_turns);
    let tracker = Arc::new(DiceGameTracker::new());
    game.set_delegate(&tracker);
    game.play();
    for line in tracker.log() {
        println!("{}", line);
    }
    println!("{}", game.pretty_text_description());
    println!("{}", game.dice().text_description());
    info!(turns = tracker.number_of_turns(), "game complete");

    let report = registry.report();
    match settings.format {
        ReportFormat::Text => print!("{}", report),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn main() -> ExitCode {
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = match Settings::load(path.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&settings);
    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}
