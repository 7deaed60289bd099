use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use cpu_sched_sim::{
    BernoulliWorkload, Policy, Process, Registry, SchedEvent, Sim, Summary,
    scheduler::{DispatchPolicy, MultiRoundRobin, SrtfPolicy},
    summarize,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Fcfs,
    Sjf,
    Srtf,
    Rr,
    Mrr,
}

/// Simulate a CPU scheduling policy and print the resulting timeline.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[arg(short, long, value_enum, default_value_t = PolicyArg::Fcfs)]
    policy: PolicyArg,

    /// Time quantum for rr and mrr
    #[arg(short, long, default_value_t = 2)]
    quantum: u64,

    /// Processor count for mrr
    #[arg(short, long, default_value_t = 2)]
    cpus: usize,

    /// Process descriptor ID:ARRIVAL:BURST, repeatable
    #[arg(long = "process", value_name = "ID:ARRIVAL:BURST")]
    processes: Vec<String>,

    /// Generate a random workload spanning this many ticks instead
    #[arg(long, value_name = "TICKS", conflicts_with = "processes")]
    random: Option<u64>,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value_t = 0.3)]
    p_arrival: f64,

    #[arg(long, default_value_t = 0.3)]
    p_short: f64,

    #[arg(long, default_value_t = 2)]
    short: u64,

    #[arg(long, default_value_t = 6)]
    long: u64,

    /// Print every tick's events (mrr only)
    #[arg(long)]
    events: bool,

    /// Raise log verbosity, repeatable
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let registry = Registry::new(workload(&args)?).context("rejected workload")?;
    let policy = match args.policy {
        PolicyArg::Fcfs => Policy::Fcfs,
        PolicyArg::Sjf => Policy::Sjf,
        PolicyArg::Srtf => Policy::Srtf,
        PolicyArg::Rr => Policy::RoundRobin {
            quantum: args.quantum,
        },
        PolicyArg::Mrr => Policy::MultiRoundRobin {
            quantum: args.quantum,
            cpus: args.cpus,
        },
    };
    info!("simulating {} processes under {}", registry.len(), policy.name());

    if args.events {
        for (now, event) in events(&registry, policy)? {
            println!("t={now} {event:?}");
        }
    }

    let timeline = policy
        .simulate(&registry)
        .with_context(|| format!("{} simulation failed", policy.name()))?;

    print!("{timeline}");
    print_summary(&summarize(&timeline, &registry));
    Ok(())
}

fn workload(args: &Args) -> Result<Vec<Process>> {
    if let Some(ticks) = args.random {
        let shape = BernoulliWorkload {
            ticks,
            p_arrival: args.p_arrival,
            p_short: args.p_short,
            short_ticks: args.short,
            long_ticks: args.long,
            seed: args.seed,
        };
        return Ok(shape.generate());
    }

    if args.processes.is_empty() {
        return Ok(vec![
            Process::new("P1", 0, 5),
            Process::new("P2", 3, 1),
            Process::new("P3", 10, 11),
            Process::new("P4", 12, 2),
            Process::new("P5", 15, 12),
        ]);
    }

    args.processes
        .iter()
        .map(|desc| desc.parse::<Process>().map_err(anyhow::Error::from))
        .collect()
}

/// Event log of a tick-driven run. The interval-walk policies have no
/// per-tick events to report.
fn events(registry: &Registry, policy: Policy) -> Result<Vec<(u64, SchedEvent)>> {
    match policy {
        Policy::Srtf => collect_events(Sim::new(registry, 1, SrtfPolicy)),
        Policy::MultiRoundRobin { quantum, cpus } => {
            collect_events(MultiRoundRobin::new(quantum, cpus)?.sim(registry))
        }
        other => anyhow::bail!(
            "--events is only available for srtf and mrr, not {}",
            other.name()
        ),
    }
}

fn collect_events<P: DispatchPolicy>(mut sim: Sim<P>) -> Result<Vec<(u64, SchedEvent)>> {
    let mut log = Vec::new();
    while !sim.all_completed() {
        let now = sim.core.now();
        log.extend(sim.step()?.into_iter().map(|event| (now, event)));
    }
    Ok(log)
}

fn print_summary(summary: &Summary) {
    println!();
    println!(
        "{:<8} {:>7} {:>5} {:>6} {:>10} {:>10} {:>7} {:>8}",
        "id", "arrival", "burst", "start", "completion", "turnaround", "waiting", "response"
    );
    for m in &summary.processes {
        println!(
            "{:<8} {:>7} {:>5} {:>6} {:>10} {:>10} {:>7} {:>8}",
            m.id, m.arrival, m.burst, m.first_start, m.completion, m.turnaround, m.waiting, m.response
        );
    }
    println!();
    println!("Makespan: {} ticks", summary.makespan);
    println!("CPU utilization: {:.1}%", summary.utilization * 100.0);
    println!("Average turnaround time: {:.2} ticks", summary.avg_turnaround);
    println!("Average waiting time: {:.2} ticks", summary.avg_waiting);
    println!("Average response time: {:.2} ticks", summary.avg_response);
}
