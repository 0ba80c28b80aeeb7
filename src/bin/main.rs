//! msvm command line interface
//!
//! Train, inspect and apply multiclass SVM models on LibSVM-format data.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info};
use msvm::api::Svm;
use msvm::core::{Decomposition, Result};
use msvm::data::LibSvmDataset;
use msvm::kernel::KernelSpec;
use msvm::persistence::SerializableModel;
use msvm::Dataset;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "msvm")]
#[command(about = "Multiclass Support Vector Machine training in Rust")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new multiclass model
    Train(TrainArgs),
    /// Make predictions using a trained model
    Predict(PredictArgs),
    /// Display model information
    Info(InfoArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Training data file (LibSVM format, integer class labels)
    #[arg(long)]
    data: PathBuf,

    /// Output model file
    #[arg(short, long)]
    output: PathBuf,

    /// Regularization parameter C
    #[arg(short = 'C', long, default_value = "1.0")]
    c: f64,

    /// Convergence tolerance
    #[arg(short, long, default_value = "0.001")]
    epsilon: f64,

    /// Maximum working-set iterations per subproblem
    #[arg(short, long, default_value = "10000")]
    max_iterations: usize,

    /// Decomposition strategy
    #[arg(long, default_value = "one-vs-one")]
    strategy: CliStrategy,

    /// Kernel function
    #[arg(short, long, default_value = "linear")]
    kernel: CliKernel,

    /// Gamma parameter (rbf and polynomial kernels)
    #[arg(long, default_value = "1.0")]
    gamma: f64,

    /// Polynomial degree
    #[arg(long, default_value = "3")]
    degree: u32,

    /// Polynomial independent term
    #[arg(long, default_value = "0.0")]
    coef0: f64,

    /// Maximum worker threads (0 = all cores)
    #[arg(short, long, default_value = "0")]
    jobs: usize,

    /// Fit Platt sigmoids for probability output
    #[arg(long)]
    probabilities: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliStrategy {
    #[value(name = "one-vs-one")]
    OneVsOne,
    #[value(name = "one-vs-rest")]
    OneVsRest,
}

impl From<CliStrategy> for Decomposition {
    fn from(strategy: CliStrategy) -> Self {
        match strategy {
            CliStrategy::OneVsOne => Decomposition::OneVsOne,
            CliStrategy::OneVsRest => Decomposition::OneVsRest,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliKernel {
    Linear,
    Rbf,
    Polynomial,
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Input data file (LibSVM format)
    #[arg(long)]
    data: PathBuf,

    /// Output predictions file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit calibrated per-class probabilities instead of labels
    #[arg(long)]
    probabilities: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => run_train(args),
        Commands::Predict(args) => run_predict(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    let kernel = match args.kernel {
        CliKernel::Linear => KernelSpec::Linear,
        CliKernel::Rbf => KernelSpec::Rbf { gamma: args.gamma },
        CliKernel::Polynomial => KernelSpec::Polynomial {
            degree: args.degree,
            gamma: args.gamma,
            coef0: args.coef0,
        },
    };

    info!("loading training data from {}", args.data.display());
    let dataset = LibSvmDataset::from_file(&args.data)?;
    info!(
        "loaded {} samples with {} features",
        dataset.len(),
        dataset.dim()
    );

    let model = Svm::with_kernel(kernel)
        .with_c(args.c)
        .with_tolerance(args.epsilon)
        .with_max_iterations(args.max_iterations)
        .with_decomposition(args.strategy.into())
        .with_max_parallelism(args.jobs)
        .with_probabilities(args.probabilities)
        .learn(&dataset)?;

    let accuracy = model.evaluate(&dataset)?;
    println!(
        "Trained {} machines over {} classes (training accuracy {:.2}%)",
        model.machines().len(),
        model.n_classes(),
        accuracy * 100.0
    );

    SerializableModel::from_model(&model, kernel).save_to_file(&args.output)?;
    println!("Model saved to {}", args.output.display());
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let model = SerializableModel::load_from_file(&args.model)?.into_model()?;
    let dataset = LibSvmDataset::from_file(&args.data)?;

    let mut lines = Vec::with_capacity(dataset.len());
    for i in 0..dataset.len() {
        if args.probabilities {
            let probs = model.predict_probabilities(dataset.feature(i))?;
            let formatted: Vec<String> = probs.iter().map(|p| format!("{:.6}", p)).collect();
            lines.push(formatted.join(" "));
        } else {
            lines.push(model.classify(dataset.feature(i))?.to_string());
        }
    }

    match args.output {
        Some(path) => {
            let mut file = File::create(&path)?;
            for line in &lines {
                writeln!(file, "{}", line)?;
            }
            println!("Predictions written to {}", path.display());
        }
        None => {
            for line in &lines {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn run_info(args: InfoArgs) -> Result<()> {
    let serialized = SerializableModel::load_from_file(&args.model)?;

    println!("Model file:        {}", args.model.display());
    println!("Library version:   {}", serialized.metadata.library_version);
    println!("Created at:        {}", serialized.metadata.created_at);
    println!("Decomposition:     {:?}", serialized.decomposition);
    println!("Classes:           {}", serialized.n_classes);
    println!("Binary machines:   {}", serialized.metadata.n_machines);
    println!("Support vectors:   {}", serialized.metadata.n_support_vectors);
    println!("Kernel:            {:?}", serialized.kernel);

    for machine in &serialized.machines {
        println!(
            "  {:<12} {} SVs, bias {:.6}, converged: {}",
            format!("[{}]", machine.descriptor()),
            machine.n_support_vectors(),
            machine.bias(),
            machine.converged()
        );
    }
    Ok(())
}
