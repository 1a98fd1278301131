//! Stencil finder CLI
//!
//! Entry point for the `stencil` command-line tool. Builds data-flow graphs
//! from instruction-record files, discovers repeated stencils, and applies
//! stencil documents to new hosts.

#[global_allocator]
/// Global allocator using jemalloc for better performance in parallel workloads.
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

mod args;

use clap::Parser;
use stencil_driver::render::render_to_file;
use stencil_driver::{DotRenderer, Driver, output, pipeline};
use tracing::{info, warn};

use args::{ApplyArgs, Args, Command, DiscoverArgs, InspectArgs};

/// Parses arguments, runs the subcommand, and prints the profile.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_ids(true)
        .init();

    let args = Args::parse();
    let driver = Driver::new_cwd()?;

    match &args.command {
        Command::Inspect(a) => inspect(&driver, a)?,
        Command::Discover(a) => discover(&driver, a)?,
        Command::Apply(a) => apply(&driver, a)?,
    }

    stencil_subgraph::report();
    Ok(())
}

fn inspect(driver: &Driver, args: &InspectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (key, host) = driver.get_or_load_host(&args.input)?;

    println!("{}", key.path().display());
    println!("  vertices:     {}", host.graph.num_vertices());
    println!("  instructions: {}", host.graph.num_instructions());
    println!("  edges:        {}", host.graph.num_edges());
    println!("  dangling:     {}", host.dangling.len());

    if let Some(path) = &args.dot {
        render_to_file(&DotRenderer::default(), &host.graph, &[], path);
    }
    Ok(())
}

fn discover(driver: &Driver, args: &DiscoverArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.to_config();
    let (_, host) = driver.get_or_load_host(&args.input)?;

    info!("discovering stencils in {}", args.input.display());
    let outcome = pipeline::discover(&host.graph, &config, args.combination);
    for reason in &outcome.exceeded {
        warn!("partial result: {}", reason);
    }

    let rows = outcome.report_rows();
    println!("{:>10} {:>10}  stencil", "exclusive", "total");
    for row in &rows {
        println!("{:>10} {:>10}  {}", row.exclusive, row.total, row.stencil);
    }

    let exclusive = outcome.exclusive_matches();
    println!(
        "{}",
        stencil_subgraph::static_instruction_coverage(&host.graph, &exclusive)
    );

    if let Some(path) = &args.stencils_out {
        output::write_stencils(path, &outcome.stencils())?;
    }
    if let Some(path) = &args.report {
        output::write_report(path, &rows)?;
    }
    if let Some(path) = &args.matches_out {
        output::write_matches(path, &exclusive)?;
    }
    if let Some(path) = &args.all_matches_out {
        output::write_matches(path, &outcome.all_matches())?;
    }
    Ok(())
}

fn apply(driver: &Driver, args: &ApplyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.to_config();
    let (_, host) = driver.get_or_load_host(&args.input)?;
    let stencils = driver.load_stencils(&args.stencils)?;

    let outcome = pipeline::apply(&host.graph, &stencils, &config);
    println!(
        "{} matches, {} exclusive",
        outcome.all_matches.len(),
        outcome.exclusive_matches.len()
    );
    println!("{}", outcome.static_coverage);
    println!(
        "{}/{} ({:.2}%) vertices consumed by sequential matching",
        outcome.coverage.removed,
        outcome.coverage.total,
        100.0 * outcome.coverage.fraction()
    );

    if let Some(path) = &args.matches_out {
        output::write_matches(path, &outcome.exclusive_matches)?;
    }
    if let Some(path) = &args.all_matches_out {
        output::write_matches(path, &outcome.all_matches)?;
    }
    if let Some(path) = &args.annotations_out {
        output::write_annotations(path, &outcome.exclusive_matches)?;
    }
    if let Some(path) = &args.dot {
        render_to_file(&DotRenderer::default(), &host.graph, &outcome.exclusive_matches, path);
    }
    Ok(())
}
