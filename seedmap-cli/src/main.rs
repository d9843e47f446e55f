use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use seedmap_core::{AlignStats, Genome, KmerIndex, ReadSet, Reporter, ScanStats, Scanner};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

mod config;
mod output;

use config::Config;

#[derive(Parser)]
#[command(name = "seedmap")]
#[command(about = "SeedMap - k-mer seeded short read mapper")]
#[command(version)]
#[command(long_about = "
SeedMap maps short reads against a single reference sequence. Reads are indexed
by their k-mers, the genome is streamed once, and a local alignment is only
computed where enough seeds cluster inside a window.

Examples:
  seedmap genome.fa reads.fa
  seedmap -k 10 -n 3 -w 50 --pretty genome.fa.gz reads.fq > hits.txt
  seedmap --threads 8 --progress --output hits.txt genome.fa reads.fa
")]
pub struct Cli {
    /// Reference genome (FASTA, optionally gzipped); exactly one sequence
    #[arg(required_unless_present = "print_config")]
    pub genome: Option<PathBuf>,

    /// Reads (FASTA/FASTQ, optionally gzipped)
    #[arg(required_unless_present = "print_config")]
    pub reads: Option<PathBuf>,

    /// K-mer length
    #[arg(short = 'k', long)]
    pub kmer_len: Option<u32>,

    /// K-mer matches per window
    #[arg(short = 'n', long)]
    pub num_matches: Option<u32>,

    /// K-mer taboo length
    #[arg(short = 't', long)]
    pub taboo_len: Option<u32>,

    /// K-mer window length
    #[arg(short = 'w', long)]
    pub window_len: Option<u32>,

    /// Maximum hits per read
    #[arg(short = 'o', long)]
    pub max_outputs: Option<u32>,

    /// S-W match value
    #[arg(short = 'm', long, allow_negative_numbers = true)]
    pub match_value: Option<i32>,

    /// S-W mismatch value
    #[arg(short = 'i', long, allow_negative_numbers = true)]
    pub mismatch_value: Option<i32>,

    /// S-W gap open penalty
    #[arg(short = 'g', long, allow_negative_numbers = true)]
    pub gap_open: Option<i32>,

    /// S-W gap extend penalty
    #[arg(short = 'e', long, allow_negative_numbers = true)]
    pub gap_extend: Option<i32>,

    /// S-W hit threshold
    #[arg(short = 's', long, allow_negative_numbers = true)]
    pub threshold: Option<i32>,

    /// Pretty print alignments
    #[arg(short = 'p', long)]
    pub pretty: bool,

    /// Print scan progress bar
    #[arg(short = 'b', long)]
    pub progress: bool,

    /// Write results here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the effective configuration to this file
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    pub print_config: bool,

    /// Number of threads to use
    #[arg(long)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Command-line values take precedence over the configuration file
    fn apply_overrides(&self, config: &mut Config) {
        let seed = &mut config.seed;
        if let Some(v) = self.kmer_len { seed.kmer_len = v; }
        if let Some(v) = self.num_matches { seed.num_matches = v; }
        if let Some(v) = self.taboo_len { seed.taboo_len = v; }
        if let Some(v) = self.window_len { seed.window_len = v; }
        if let Some(v) = self.max_outputs { seed.max_outputs = v; }

        let scoring = &mut config.scoring;
        if let Some(v) = self.match_value { scoring.match_value = v; }
        if let Some(v) = self.mismatch_value { scoring.mismatch_value = v; }
        if let Some(v) = self.gap_open { scoring.gap_open = v; }
        if let Some(v) = self.gap_extend { scoring.gap_extend = v; }
        if let Some(v) = self.threshold { scoring.threshold = v; }

        if let Some(v) = self.threads { config.general.threads = v; }
        if self.progress { config.general.progress = true; }
        if self.pretty { config.output.pretty = true; }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn log_settings(config: &Config) {
    let seed = &config.seed;
    let scoring = &config.scoring;
    log::info!("Settings:");
    log::info!("    kmer length:                {}", seed.kmer_len);
    log::info!("    kmer matches per window:    {}", seed.num_matches);
    log::info!("    kmer taboo length:          {}", seed.taboo_len);
    log::info!("    kmer window length:         {}", seed.window_len);
    log::info!("    maximum hits per read:      {}", seed.max_outputs);
    log::info!("    S-W match value:            {}", scoring.match_value);
    log::info!("    S-W mismatch value:         {}", scoring.mismatch_value);
    log::info!("    S-W gap open penalty:       {}", scoring.gap_open);
    log::info!("    S-W gap extend penalty:     {}", scoring.gap_extend);
    log::info!("    S-W hit threshold:          {}", scoring.threshold);
    log::info!("    threads:                    {}", config.general.threads);
}

fn log_aligner_stats(label: &str, stats: &AlignStats, seconds: f64) {
    let cells = stats.cells as f64 / 1.0e6;
    log::info!("    {}:", label);
    log::info!("        Invocations:            {}", stats.invocations);
    log::info!("        Cells Computed:         {:.2} million", cells);
    if seconds > 0.0 {
        log::info!("        Cells per Second:       {:.2} million", cells / seconds);
    }
}

fn log_statistics(stats: &ScanStats, scan_secs: f64, full: &AlignStats, report_secs: f64, matched: usize) {
    log::info!("Statistics:");
    log::info!("    Kmer Scan:");
    log::info!("        Run-time:               {:.2} seconds", scan_secs);
    log::info!("        Total Kmers:            {}", stats.kmers);
    log::info!("        Seed Hits:              {}", stats.seed_hits);
    log::info!("        Taboo Skips:            {}", stats.taboo_skips);
    log::info!("        Triggers:               {} ({} accepted)", stats.triggers, stats.accepted);
    log_aligner_stats("Bounded Smith-Waterman", &stats.scorer, scan_secs);
    log_aligner_stats("Full Smith-Waterman", full, report_secs);
    log::info!("    General:");
    log::info!("        Reads matched:          {}", matched);
}

fn make_progress_bar(enabled: bool, len: u64) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len);
    bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(4));
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent:>3}% scanned",
    ) {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    })
}

fn run(genome_path: &Path, reads_path: &Path, config: &Config, output_path: Option<&Path>) -> Result<()> {
    let genome = Genome::load(genome_path)
        .with_context(|| format!("Failed to load genome: {}", genome_path.display()))?;
    let reads = ReadSet::load(reads_path)
        .with_context(|| format!("Failed to load reads: {}", reads_path.display()))?;

    let index = KmerIndex::build(&reads, config.seed.kmer_len).context("Failed to build k-mer index")?;

    let bar = make_progress_bar(config.general.progress, genome.len() as u64);
    let report_progress = |pos: u64| bar.set_position(pos);

    let mut scanner = Scanner::new(&genome, &reads, &index, config.seed.clone(), config.scoring.clone())?
        .with_progress(&report_progress);

    let scan_start = Instant::now();
    let stats = if config.general.threads > 1 {
        scanner.run_parallel(config.general.threads)
    } else {
        scanner.run()
    };
    let scan_secs = scan_start.elapsed().as_secs_f64();
    bar.finish_and_clear();

    let report_start = Instant::now();
    let mut reporter = Reporter::new(
        &genome,
        &reads,
        config.seed.clone(),
        &config.scoring,
        config.output.pretty,
    )
    .with_flank(config.output.flank);
    let mapped = reporter.report(scanner.states());
    let report_secs = report_start.elapsed().as_secs_f64();

    let mut out = open_output(output_path)?;
    if config.output.pretty {
        output::write_pretty(&mut out, &mapped)?;
    } else {
        output::write_normal(&mut out, &mapped)?;
    }
    out.flush().context("Failed to write results")?;

    log_statistics(&stats, scan_secs, &reporter.aligner_stats(), report_secs, mapped.len());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose, cli.quiet);

    if cli.print_config {
        print!("{}", Config::example_toml()?);
        return Ok(());
    }

    // Load configuration
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    log_settings(&config);

    if let Some(path) = &cli.save_config {
        config.save_to_file(path)?;
        log::info!("Configuration written to: {}", path.display());
    }

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.general.threads)
        .build_global()
        .context("Failed to set thread count")?;

    let (Some(genome), Some(reads)) = (cli.genome.as_deref(), cli.reads.as_deref()) else {
        anyhow::bail!("both a genome file and a reads file are required");
    };

    run(genome, reads, &config, cli.output.as_deref())
}
