use std::{path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand, ValueEnum};
use queue_model::{
    AnalyticInput, Metrics, Model, QueueError, SimulationConfig, SimulationReport,
    analytic::{ProcessSpec, Quantity, QuantityKind, Spread, TimeUnit},
    logging::init_logging,
    sim::{RunOutcome, ServiceDistribution},
    solve, simulate,
};

#[derive(Parser)]
#[command(version, about = "Single-station queueing calculator and simulator")]
struct Cli {
    /// Log level for this crate when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Print the full result as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Closed-form steady-state metrics
    Solve(SolveArgs),
    /// Discrete-event simulation of a synthetic population
    Simulate(SimulateArgs),
}

#[derive(Args)]
struct SolveArgs {
    /// JSON file holding a complete analytic input
    #[arg(long, conflicts_with_all = ["model", "arrival", "service"])]
    config: Option<PathBuf>,

    /// M/M/1, M/M/s, M/G/1, M/G/s, G/G/1 or G/G/s
    #[arg(long, default_value = "M/M/1")]
    model: Model,

    #[arg(long, short = 's', default_value_t = 1)]
    servers: u32,

    /// Arrival rate or mean interarrival time
    #[arg(long)]
    arrival: Option<f64>,
    #[arg(long, default_value = "rate")]
    arrival_kind: QuantityKind,
    #[arg(long, default_value = "min")]
    arrival_unit: TimeUnit,
    #[arg(long, conflicts_with = "arrival_variance")]
    arrival_std_dev: Option<f64>,
    #[arg(long)]
    arrival_variance: Option<f64>,
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    arrival_uniform: Option<Vec<f64>>,

    /// Service rate or mean service time
    #[arg(long)]
    service: Option<f64>,
    #[arg(long, default_value = "rate")]
    service_kind: QuantityKind,
    #[arg(long, default_value = "min")]
    service_unit: TimeUnit,
    #[arg(long, conflicts_with = "service_variance")]
    service_std_dev: Option<f64>,
    #[arg(long)]
    service_variance: Option<f64>,
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    service_uniform: Option<Vec<f64>>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Family {
    Exponential,
    Uniform,
    Normal,
}

#[derive(Args)]
struct SimulateArgs {
    /// JSON file holding a complete simulation config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mean of the Poisson table driving arrivals
    #[arg(long, default_value_t = 2.0)]
    arrival_rate: f64,

    #[arg(long, value_enum, default_value_t = Family::Exponential)]
    service: Family,
    /// Mean service time (exponential, normal)
    #[arg(long, default_value_t = 3.0)]
    mean: f64,
    /// Standard deviation (normal)
    #[arg(long, default_value_t = 1.0)]
    std_dev: f64,
    /// Minimum service time (uniform)
    #[arg(long, default_value_t = 1.0)]
    min: f64,
    /// Maximum service time (uniform)
    #[arg(long, default_value_t = 4.0)]
    max: f64,

    #[arg(long, short = 's', default_value_t = 1)]
    servers: usize,
    #[arg(long)]
    priority: bool,
    #[arg(long, requires = "priority")]
    preemption: bool,
    #[arg(long, default_value_t = queue_model::config::DEFAULT_PRIORITY_LEVELS)]
    priority_levels: u32,
    #[arg(long)]
    seed: Option<u64>,
}

fn process_spec(
    name: &str,
    value: Option<f64>,
    kind: QuantityKind,
    unit: TimeUnit,
    std_dev: Option<f64>,
    variance: Option<f64>,
    uniform: Option<&[f64]>,
) -> Result<ProcessSpec, QueueError> {
    if let Some(&[min, max]) = uniform {
        return Ok(ProcessSpec::Uniform { min, max });
    }

    let value = value.ok_or_else(|| QueueError::Config(format!("--{name} is required")))?;
    let quantity = Quantity { value, kind, unit };
    let spread = match (std_dev, variance) {
        (Some(sd), _) => Some(Spread::StdDev(sd)),
        (None, Some(var)) => Some(Spread::Variance(var)),
        (None, None) => None,
    };

    Ok(match spread {
        Some(spread) => ProcessSpec::General { quantity, spread },
        None => ProcessSpec::Markovian { quantity },
    })
}

impl SolveArgs {
    fn input(&self) -> Result<AnalyticInput, QueueError> {
        if let Some(path) = &self.config {
            let text = std::fs::read_to_string(path)?;
            return Ok(serde_json::from_str(&text)?);
        }

        Ok(AnalyticInput {
            model: self.model,
            arrival: process_spec(
                "arrival",
                self.arrival,
                self.arrival_kind,
                self.arrival_unit,
                self.arrival_std_dev,
                self.arrival_variance,
                self.arrival_uniform.as_deref(),
            )?,
            service: process_spec(
                "service",
                self.service,
                self.service_kind,
                self.service_unit,
                self.service_std_dev,
                self.service_variance,
                self.service_uniform.as_deref(),
            )?,
            servers: self.servers,
        })
    }
}

impl SimulateArgs {
    fn config(&self) -> Result<SimulationConfig, QueueError> {
        if let Some(path) = &self.config {
            return SimulationConfig::from_json_file(path);
        }

        let service = match self.service {
            Family::Exponential => ServiceDistribution::Exponential { mean: self.mean },
            Family::Uniform => ServiceDistribution::Uniform {
                min: self.min,
                max: self.max,
            },
            Family::Normal => ServiceDistribution::Normal {
                mean: self.mean,
                std_dev: self.std_dev,
            },
        };

        Ok(SimulationConfig {
            arrival_rate: self.arrival_rate,
            service,
            servers: self.servers,
            priority: self.priority,
            preemption: self.preemption,
            priority_levels: self.priority_levels,
            seed: self.seed,
        })
    }
}

fn print_metrics(m: &Metrics) {
    println!("Model: {}", m.model);
    println!("Utilization (ρ):       {:.1}%", m.rho * 100.0);
    println!("Idle probability (P0): {:.1}%", m.p0 * 100.0);
    println!("Avg in system (L):     {:.2}", m.l);
    println!("Avg in queue (Lq):     {:.2}", m.lq);
    println!("Time in system (W):    {:.2} min", m.w);
    println!("Time in queue (Wq):    {:.2} min", m.wq);
    println!("Arrival CV² (Ca²):     {:.4}", m.ca2);
    println!("Service CV² (Cs²):     {:.4}", m.cs2);
}

fn fmt_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn print_report(report: &SimulationReport) {
    println!("ρ = {:.3}, discipline {:?}", report.offered_load, report.discipline);
    if let RunOutcome::Truncated { reason, .. } = report.outcome {
        println!("warning: run truncated ({reason:?}); unfinished jobs show '-'");
    }

    println!(
        "{:>4} {:>9} {:>9} {:>5} {:>7} {:>7} {:>4} {:>5} {:>5} {:>5} {:>5} {:>5} {:>6}",
        "ID", "CumProb", "Lookup", "IA", "Arrive", "Service", "Pri", "Start", "End", "Wait", "TAT",
        "Resp", "Server"
    );
    for r in &report.timeline.records {
        println!(
            "{:>4} {:>9.5} {:>9.5} {:>5} {:>7} {:>7} {:>4} {:>5} {:>5} {:>5} {:>5} {:>5} {:>6}",
            r.id + 1,
            r.cumulative_probability,
            r.lookup_probability,
            r.inter_arrival,
            r.arrival_time,
            r.service_time,
            fmt_opt(r.priority),
            fmt_opt(r.start_time),
            fmt_opt(r.end_time),
            fmt_opt(r.waiting_time),
            fmt_opt(r.turnaround_time),
            fmt_opt(r.response_time),
            fmt_opt(r.server.map(|s| s + 1)),
        );
    }

    let summary = &report.timeline.summary;
    println!();
    println!("Customers: {}", summary.customers);
    println!("Average waiting time: {:.2}", summary.mean_waiting);
    println!("Average turnaround time: {:.2}", summary.mean_turnaround);
    println!("Average response time: {:.2}", summary.mean_response);
    for usage in &summary.servers {
        println!(
            "Server {} utilization: {:.2}%",
            usage.server + 1,
            usage.utilization * 100.0
        );
    }
    println!("Overall utilization: {:.2}%", summary.overall_utilization * 100.0);
    println!("System idle factor: {:.2}%", summary.idle_factor);
    println!(
        "Max queue length: {}",
        report.timeline.series.max_queue_length()
    );
}

fn run(cli: &Cli) -> Result<(), QueueError> {
    match &cli.command {
        Command::Solve(args) => {
            let metrics = solve(&args.input()?)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                print_metrics(&metrics);
            }
        }
        Command::Simulate(args) => {
            let report = simulate(&args.config()?)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(QueueError::Validation(errors)) => {
            for error in errors {
                eprintln!("Invalid input: {error}");
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
