use std::fs::File;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{ArgAction, Args, Parser, Subcommand};
use env_logger::{Builder, Env};
use log::{debug, info, LevelFilter};

use heart_predict::batch::{run_batch, run_batch_to_file, OutputFormat};
use heart_predict::codec::{
    ChestPainType, ExerciseAngina, FastingBloodSugar, RestingEcg, Sex, Slope, Thal,
};
use heart_predict::monitor::Usage;
use heart_predict::server::{self, AppState};
use heart_predict::{
    predict_record, FeatureField, HeartError, OldpeakMode, PatientRecord, SmartcorePredictor,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[arg(
        short,
        long,
        env = "HEART_MODEL_PATH",
        default_value = "heart_disease_model.json",
        help = "Model artifact to load"
    )]
    model: PathBuf,
    #[arg(
        long,
        value_enum,
        env = "HEART_OLDPEAK",
        default_value_t = OldpeakMode::Truncate,
        help = "Whether oldpeak is truncated to an integer before prediction"
    )]
    oldpeak: OldpeakMode,
    #[arg(short, long, action = ArgAction::Count, global = true, help = "Verbose level")]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict a single patient entered as flags
    Predict(PredictArgs),
    /// Predict every row of a CSV file
    Batch {
        #[arg(short, long, help = "Input CSV path")]
        input: PathBuf,
        #[arg(short, long, help = "Output path, stdout when omitted")]
        output: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv, help = "Output format")]
        format: OutputFormat,
    },
    /// Serve the prediction form over HTTP
    Serve {
        #[arg(long, env = "HEART_ADDR", default_value = "127.0.0.1:8501")]
        addr: SocketAddr,
    },
    /// List the fields, their labels and codes, and numeric bounds
    Fields,
}

#[derive(Args, Debug)]
struct PredictArgs {
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(18..=100))]
    age: u32,
    #[arg(long, default_value = "Male", help = "Male | Female")]
    sex: Sex,
    #[arg(
        long,
        default_value = "Typical Angina",
        help = "Typical Angina | Atypical Angina | Non-Anginal Pain | Asymptomatic"
    )]
    chest_pain_type: ChestPainType,
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u32).range(80..=200))]
    resting_bp: u32,
    #[arg(long, default_value_t = 200, value_parser = clap::value_parser!(u32).range(100..=600))]
    cholesterol: u32,
    #[arg(long, default_value = "False", help = "Fasting blood sugar > 120 mg/dl: False | True")]
    fasting_bs: FastingBloodSugar,
    #[arg(
        long,
        default_value = "Normal",
        help = "Normal | ST-T Wave Abnormality | Left Ventricular Hypertrophy"
    )]
    resting_ecg: RestingEcg,
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u32).range(60..=220))]
    max_heart_rate: u32,
    #[arg(long, default_value = "False", help = "False | True")]
    exercise_angina: ExerciseAngina,
    #[arg(long, default_value_t = 2.0, value_parser = parse_oldpeak)]
    oldpeak: f64,
    #[arg(long, default_value = "Upsloping", help = "Upsloping | Flat | Downsloping")]
    slope: Slope,
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=3))]
    major_vessels: u32,
    #[arg(long, default_value = "Normal", help = "Normal | Fixed Defect | Reversable Defect")]
    thal: Thal,
    #[arg(long, help = "Print the report as JSON")]
    json: bool,
}

impl PredictArgs {
    fn record(&self) -> PatientRecord {
        PatientRecord {
            age: self.age,
            sex: self.sex,
            chest_pain_type: self.chest_pain_type,
            resting_bp: self.resting_bp,
            cholesterol: self.cholesterol,
            fasting_bs: self.fasting_bs,
            resting_ecg: self.resting_ecg,
            max_heart_rate: self.max_heart_rate,
            exercise_angina: self.exercise_angina,
            oldpeak: self.oldpeak,
            slope: self.slope,
            major_vessels: self.major_vessels,
            thal: self.thal,
        }
    }
}

fn parse_oldpeak(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=10.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not within 0.0..=10.0"))
    }
}

#[tokio::main]
async fn main() -> Result<(), HeartError> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let env = Env::new().filter("HEART_LOG");
    Builder::new()
        .filter(Some("heart_predict"), log_level)
        .parse_env(env)
        .init();

    debug!("Arguments {:#?}", cli);

    match cli.command {
        Command::Fields => print_fields(),
        Command::Predict(args) => {
            let predictor = load_predictor(&cli.model, cli.oldpeak)?;
            let report = predict_record(&predictor, &args.record(), cli.oldpeak)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
        }
        Command::Batch {
            input,
            output,
            format,
        } => {
            let predictor = load_predictor(&cli.model, cli.oldpeak)?;
            let usage = Usage::start("batch");
            let input = File::open(&input)?;
            match output {
                Some(path) => {
                    run_batch_to_file(&predictor, input, path, format, cli.oldpeak)?;
                }
                None => {
                    run_batch(&predictor, input, io::stdout().lock(), format, cli.oldpeak)?;
                }
            }
            usage.finish();
        }
        Command::Serve { addr } => {
            let predictor = load_predictor(&cli.model, cli.oldpeak)?;
            server::serve(addr, AppState::new(Arc::new(predictor), cli.oldpeak)).await?;
        }
    }

    Ok(())
}

/// The model must load before anything is predicted; failure ends the process.
fn load_predictor(path: &Path, oldpeak: OldpeakMode) -> Result<SmartcorePredictor, HeartError> {
    let predictor = SmartcorePredictor::load(path)?;
    info!("oldpeak mode: {}", oldpeak);
    Ok(predictor)
}

fn print_fields() {
    for (i, field) in FeatureField::ALL.iter().enumerate() {
        print!("{:>2}. {} ({})", i, field.key(), field.display_name());
        if let Some(table) = field.categorical() {
            let entries: Vec<String> = table
                .entries()
                .iter()
                .map(|(label, code)| format!("{label}={code}"))
                .collect();
            println!(": {}", entries.join(", "));
        } else if let Some(bounds) = field.bounds() {
            println!(": {}..={}", bounds.min, bounds.max);
        }
    }
}
