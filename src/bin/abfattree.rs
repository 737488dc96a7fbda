//! AB fat-tree 生成器
//!
//! 生成拓扑图（JSON）与声明式转发策略。未指定输出文件时打印到 stdout，日志写 stderr。

use std::path::PathBuf;
use std::process::ExitCode;

use abft_rs::policy::{Failover, KatKind, Scope};
use abft_rs::synth::{GenOpts, synthesize};
use clap::Parser;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "abfattree", about = "Generate an AB fat-tree topology and its forwarding policy")]
struct Args {
    /// Ports per switch (even)
    fanout: usize,

    /// Depth of the fat tree, edge tier included
    depth: usize,

    /// Topology JSON output file (stdout if omitted)
    #[arg(short = 'o', long = "out")]
    out: Option<PathBuf>,

    /// Policy output file (stdout if omitted)
    #[arg(short = 'k', long = "kat")]
    kat: Option<PathBuf>,

    /// Emit backup ports
    #[arg(short = 'f', long = "ft", value_enum, default_value_t = Failover::NoFail)]
    failover: Failover,

    /// Include the topology relation (full) or only forwarding rules (local)
    #[arg(short = 'l', long = "local", value_enum, default_value_t = Scope::Full)]
    scope: Scope,

    /// Policy type
    #[arg(short = 't', long = "type", value_enum, default_value_t = KatKind::Tables)]
    kind: KatKind,

    /// With failover, match backup rules on any ingress port instead of each one
    #[arg(long)]
    coarse_failover: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> abft_rs::Result<()> {
    let opts = GenOpts {
        fanout: args.fanout,
        depth: args.depth,
        kind: args.kind,
        failover: args.failover,
        scope: args.scope,
        specialize_in_port: !args.coarse_failover,
    };
    let generated = synthesize(&opts)?;
    info!(
        switches = generated.network.switches().len(),
        hosts = generated.network.hosts().len(),
        rules = generated.policy.rule_count(),
        "✅ 生成完成"
    );

    match &args.out {
        Some(path) => generated.write_topology(path)?,
        None => println!("{}", generated.topology_json()?),
    }
    match &args.kat {
        Some(path) => generated.write_policy(path)?,
        None => print!("{}", generated.policy_text()),
    }
    Ok(())
}
