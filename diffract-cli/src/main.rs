mod cli;
mod config;
mod logger;
mod output;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use diffract::ResultBundle;
use log::{debug, error, info};

use crate::cli::Cli;
use crate::config::ExperimentConfig;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logger::init(logger::level_filter(cli.verbose, cli.quiet)) {
        eprintln!("failed to install logger: {e}");
    }
    if let Err(e) = run(&cli) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    debug!("arguments: {cli:?}");
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to build global thread pool")?;
    }

    let config = ExperimentConfig::from_path(&cli.config)?;
    let experiment = config.build()?;
    let rotations = config.rotations()?;
    info!(
        "{} particle(s) on a {:?} detector at {:.3} nm",
        experiment.particles().count(),
        experiment.detector().shape(),
        experiment.source().wavelength() * 1e9
    );

    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;

    if rotations.is_empty() {
        let bundle = experiment.run()?;
        write_bundle(&cli.output, &bundle, None, cli.coherent)?;
    } else {
        let bundles = experiment.run_rotations(&rotations, config.rotation_convention)?;
        for (i, bundle) in bundles.iter().enumerate() {
            write_bundle(&cli.output, bundle, Some(i), cli.coherent)?;
        }
    }
    Ok(())
}

fn write_bundle(
    dir: &Path,
    bundle: &ResultBundle,
    rotation: Option<usize>,
    coherent: bool,
) -> Result<()> {
    let suffix = rotation.map(|i| format!("_r{i:03}")).unwrap_or_default();
    for (name, result) in bundle.iter() {
        let path = dir.join(format!("{}{suffix}.csv", output::file_stem(name)));
        output::write_intensity(&path, result)?;
        info!(
            "{name}: {:.4e} photons -> {}",
            result.total_intensity(),
            path.display()
        );
    }
    if coherent {
        if let Some(sum) = bundle.coherent_sum() {
            let path = dir.join(format!("coherent{suffix}.csv"));
            output::write_intensity(&path, &sum)?;
            info!("coherent sum: {:.4e} photons", sum.total_intensity());
        }
    }
    Ok(())
}
