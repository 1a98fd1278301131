use std::path::PathBuf;
use std::time::Duration;

use clap::{Args as ClapArgs, Parser, Subcommand};
use stencil_common::{Config, ConfigBuilder, Dedupe};

/// Stencil finder - discover and apply repeated data-flow subgraphs
#[derive(Parser, Debug)]
#[command(name = "stencil")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// What to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a host graph and report its size
    Inspect(InspectArgs),
    /// Enumerate stencils in a host and pick the best combination
    Discover(DiscoverArgs),
    /// Match known stencils against a host
    Apply(ApplyArgs),
}

/// Matching options shared by every subcommand.
#[derive(ClapArgs, Debug, Clone)]
pub struct MatchArgs {
    /// Require equal arity as well as equal opcode
    #[arg(long, default_value_t = false)]
    pub strict_arity: bool,
    /// Reject host edges between matched vertices that the stencil lacks
    #[arg(long, default_value_t = false)]
    pub induced: bool,
    /// Collapse matches covering the same host vertices
    #[arg(long, value_enum, default_value = "none")]
    pub dedupe: DedupeArg,
    /// Additional opcode to keep out of stencils (repeatable)
    #[arg(long = "exclude-opcode")]
    pub exclude_opcodes: Vec<String>,
    /// Spread independent work across threads
    #[arg(short = 'p', long, default_value_t = false)]
    pub parallel: bool,
}

impl MatchArgs {
    /// Apply these options to a config builder.
    pub fn apply(&self, mut builder: ConfigBuilder) -> ConfigBuilder {
        if self.strict_arity {
            builder = builder.strict_arity();
        }
        if self.induced {
            builder = builder.induced();
        }
        for opcode in &self.exclude_opcodes {
            builder = builder.exclude_opcode(opcode.clone());
        }
        builder
            .dedupe(self.dedupe.clone().into())
            .parallel(self.parallel)
    }
}

/// Arguments of `inspect`.
#[derive(ClapArgs, Debug)]
pub struct InspectArgs {
    /// Instruction-record file
    #[arg(short = 'i', long)]
    pub input: PathBuf,
    /// Write a Graphviz diagram of the host here
    #[arg(long)]
    pub dot: Option<PathBuf>,
}

/// Arguments of `discover`.
#[derive(ClapArgs, Debug)]
pub struct DiscoverArgs {
    /// Instruction-record file
    #[arg(short = 'i', long)]
    pub input: PathBuf,
    /// Smallest stencil, in edges
    #[arg(long, default_value_t = 1)]
    pub bottom_k: usize,
    /// Largest stencil, in edges
    #[arg(long, default_value_t = 2)]
    pub top_k: usize,
    /// Number of stencils to combine
    #[arg(short = 'r', long)]
    pub combination: Option<usize>,
    /// Write the chosen stencils here
    #[arg(long)]
    pub stencils_out: Option<PathBuf>,
    /// Write the `stencil,exclusive,total` report here
    #[arg(long)]
    pub report: Option<PathBuf>,
    /// Write exclusive matches here
    #[arg(long)]
    pub matches_out: Option<PathBuf>,
    /// Write all (overlapping) matches here
    #[arg(long)]
    pub all_matches_out: Option<PathBuf>,
    /// Ceiling on candidate edge sets held per size
    #[arg(long)]
    pub max_candidates: Option<usize>,
    /// Ceiling on stencil subsets evaluated
    #[arg(long)]
    pub max_combinations: Option<usize>,
    /// Wall-clock limit per phase, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Matching options
    #[command(flatten)]
    pub matching: MatchArgs,
}

impl DiscoverArgs {
    /// Convert command-line arguments into internal configuration
    pub fn to_config(&self) -> Config {
        let mut builder = self
            .matching
            .apply(Config::builder())
            .edge_range(self.bottom_k, self.top_k);
        if let Some(n) = self.max_candidates {
            builder = builder.max_candidates(n);
        }
        if let Some(n) = self.max_combinations {
            builder = builder.max_combinations(n);
        }
        if let Some(s) = self.timeout_secs {
            builder = builder.time_limit(Duration::from_secs(s));
        }
        builder.build()
    }
}

/// Arguments of `apply`.
#[derive(ClapArgs, Debug)]
pub struct ApplyArgs {
    /// Instruction-record file
    #[arg(short = 'i', long)]
    pub input: PathBuf,
    /// Stencil document (one stencil or a list)
    #[arg(short = 's', long)]
    pub stencils: PathBuf,
    /// Write exclusive matches here
    #[arg(long)]
    pub matches_out: Option<PathBuf>,
    /// Write all (overlapping) matches here
    #[arg(long)]
    pub all_matches_out: Option<PathBuf>,
    /// Write per-instruction annotations here
    #[arg(long)]
    pub annotations_out: Option<PathBuf>,
    /// Write a Graphviz diagram with exclusive matches highlighted here
    #[arg(long)]
    pub dot: Option<PathBuf>,
    /// Matching options
    #[command(flatten)]
    pub matching: MatchArgs,
}

impl ApplyArgs {
    /// Convert command-line arguments into internal configuration
    pub fn to_config(&self) -> Config {
        self.matching.apply(Config::builder()).build()
    }
}

/// Command-line argument wrapper for Dedupe
#[derive(Debug, Clone, clap::ValueEnum)]
pub enum DedupeArg {
    /// Keep every mapping
    #[value(name = "none")]
    None,
    /// One match per covered vertex set
    #[value(name = "auto-morph")]
    AutoMorph,
}

impl From<DedupeArg> for Dedupe {
    fn from(arg: DedupeArg) -> Self {
        match arg {
            DedupeArg::None => Self::None,
            DedupeArg::AutoMorph => Self::AutoMorph,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use stencil_common::{MatchMode, MatchShape};

    use super::*;

    #[test]
    fn discover_flags_reach_the_config() {
        let args = Args::parse_from([
            "stencil",
            "discover",
            "-i",
            "host.json",
            "--top-k",
            "3",
            "-r",
            "2",
            "--strict-arity",
            "--max-combinations",
            "10",
            "--timeout-secs",
            "5",
            "--exclude-opcode",
            "phi",
        ]);
        let Command::Discover(d) = args.command else {
            panic!("expected discover");
        };
        let config = d.to_config();
        assert_eq!(config.edge_range(), 1..=3);
        assert_eq!(d.combination, Some(2));
        assert_eq!(config.match_mode, MatchMode::OpcodeAndArity);
        assert_eq!(config.budget.max_combinations, Some(10));
        assert_eq!(config.budget.time_limit, Some(Duration::from_secs(5)));
        assert!(config.is_excluded("phi"));
        assert!(config.is_excluded("store"));
    }

    #[test]
    fn apply_defaults() {
        let args = Args::parse_from(["stencil", "apply", "-i", "h.json", "-s", "s.json", "--induced"]);
        let Command::Apply(a) = args.command else {
            panic!("expected apply");
        };
        let config = a.to_config();
        assert_eq!(config.shape, MatchShape::Induced);
        assert_eq!(config.dedupe, Dedupe::None);
        assert!(!config.parallel);
    }
}
