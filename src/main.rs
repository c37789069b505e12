mod extract;
mod model;
mod sink;
mod source;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::model::{Course, MeetingTime};
use crate::sink::SinkDb;
use crate::source::SourceDb;

#[derive(Parser)]
#[command(name = "catalog_migrator", about = "Normalize a scraped course catalog into a relational store")]
struct Cli {
    /// Scraped catalog database (read-only)
    #[arg(long, global = true, default_value = "data/catalog.db")]
    source: PathBuf,

    /// Normalized output database
    #[arg(long, global = true, default_value = "data/normalized.db")]
    sink: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full refresh: extract every course's schedule into the sink
    Run {
        /// Skip courses whose fragment fails extraction instead of aborting
        #[arg(long)]
        skip_bad: bool,
    },
    /// Extract one course's schedule and print it without writing
    Preview {
        root_number: i32,
        serial_number: i32,
        /// Print the extracted records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show sink row counts
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { skip_bad } => run_migration(&cli.source, &cli.sink, skip_bad),
        Commands::Preview {
            root_number,
            serial_number,
            json,
        } => preview(&cli.source, root_number, serial_number, json),
        Commands::Stats => stats(&cli.sink),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn run_migration(source: &Path, sink: &Path, skip_bad: bool) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let source = SourceDb::open(source)?;
    let sink = SinkDb::open(sink)?;
    sink.init_schema()?;

    let lecturers = extract::lecturers::normalize(source.fetch_lecturer_fields()?);
    let lecturers = sink.insert_lecturers(&lecturers)?;
    info!("Saved {} lecturers", lecturers.len());

    let courses = source.fetch_courses()?;
    if courses.is_empty() {
        println!("Source catalog is empty. Nothing to migrate.");
        return Ok(());
    }
    let courses = sink.insert_courses(&courses)?;
    println!("Migrating schedules for {} courses...", courses.len());

    let pb = ProgressBar::new(courses.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut meetings: Vec<MeetingTime> = Vec::new();
    let mut skipped = 0usize;

    for chunk in courses.chunks(500) {
        // Fragment fetches stay sequential on the connection; extraction fans out.
        let mut fragments: Vec<(i64, &Course, String)> = Vec::with_capacity(chunk.len());
        for course in chunk {
            let id = course
                .id
                .context("course inserted without a generated id")?;
            let fragment = source.fetch_fragment(course.root_number, course.serial_number)?;
            fragments.push((id, course, fragment));
        }

        let results: Vec<_> = fragments
            .par_iter()
            .map(|(id, course, fragment)| (*course, extract::extract_schedule(*id, fragment)))
            .collect();

        for (course, result) in results {
            match result {
                Ok(rows) => meetings.extend(rows),
                Err(err) if skip_bad => {
                    warn!(
                        "Skipping course {}/{}: {}",
                        course.root_number, course.serial_number, err
                    );
                    skipped += 1;
                }
                Err(err) => {
                    return Err(err).with_context(|| {
                        format!(
                            "extracting schedule for course {}/{}",
                            course.root_number, course.serial_number
                        )
                    });
                }
            }
        }
        pb.inc(chunk.len() as u64);
    }
    pb.finish_and_clear();

    sink.insert_meetings(&meetings)?;
    if skipped > 0 {
        println!(
            "Saved {} meeting times ({} courses skipped).",
            meetings.len(),
            skipped
        );
    } else {
        println!("Saved {} meeting times.", meetings.len());
    }
    Ok(())
}

fn preview(source: &Path, root_number: i32, serial_number: i32, json: bool) -> anyhow::Result<()> {
    let source = SourceDb::open(source)?;
    let fragment = source
        .fetch_fragment(root_number, serial_number)
        .with_context(|| format!("course {}/{} not found in source", root_number, serial_number))?;
    let meetings = extract::extract_schedule(0, &fragment)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&meetings)?);
        return Ok(());
    }

    if meetings.is_empty() {
        println!("No meeting times.");
        return Ok(());
    }
    println!("{:<18} | {:<18} | {}", "Start", "End", "Assessment");
    println!("{}", "-".repeat(52));
    for m in &meetings {
        println!(
            "{:<18} | {:<18} | {}",
            m.start.format("%Y-%m-%d %H:%M"),
            m.end.format("%Y-%m-%d %H:%M"),
            if m.assessment { "yes" } else { "no" }
        );
    }
    println!("\n{} meeting times", meetings.len());
    Ok(())
}

fn stats(sink: &Path) -> anyhow::Result<()> {
    let sink = SinkDb::open(sink)?;
    let s = sink.stats()?;
    println!("Lecturers:   {}", s.lecturers);
    println!("Courses:     {}", s.courses);
    println!("Meetings:    {}", s.meetings);
    println!("Assessments: {}", s.assessments);
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
