use anyhow::bail;
use clap::Parser;
use foto_report::cli::{Cli, Commands};
use foto_report::job::{JobRequest, JobRunner, JobStore};
use foto_report::source::{scan_photo_dir, PhotoReference};
use foto_report::{template, EngineConfig};
use indicatif::{ProgressBar, ProgressStyle};
use rand::distr::Alphanumeric;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = EngineConfig::load()?;

    match cli.command {
        Commands::Run {
            template,
            photo,
            photo_dir,
            output,
            job_id,
            timeout,
        } => {
            println!("📷 foto-report - report generation\n");

            if let Some(dir) = output {
                config.output_dir = dir;
            }
            if let Some(secs) = timeout {
                config.job_timeout_secs = secs;
            }

            // 1. Collect photos
            println!("[1/3] collecting photos...");
            let mut photos: Vec<PhotoReference> = Vec::new();
            if let Some(dir) = &photo_dir {
                photos.extend(scan_photo_dir(dir)?);
            }
            for arg in &photo {
                photos.push(parse_photo_arg(arg));
            }
            println!("✔ {} photos queued\n", photos.len());

            // 2. Run the job, feeding the progress bar from the store
            println!("[2/3] running job...");
            let store = Arc::new(JobStore::new(Duration::from_secs(config.record_ttl_secs)));
            let verbose = cli.verbose;
            let runner = JobRunner::new(config, Arc::clone(&store));
            let job_id = job_id.unwrap_or_else(generate_job_id);
            let request = JobRequest {
                job_id: job_id.clone(),
                template,
                photos,
            };

            let bar = ProgressBar::new(100);
            bar.set_style(
                ProgressStyle::with_template("{bar:30} {pos:>3}% {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );

            let run = runner.run(request);
            tokio::pin!(run);
            let result = loop {
                tokio::select! {
                    result = &mut run => break result,
                    _ = tokio::time::sleep(Duration::from_millis(200)) => {
                        if let Some(progress) = store.get_progress(&job_id) {
                            bar.set_position(progress.percent as u64);
                            bar.set_message(progress.message.clone());
                        }
                    }
                }
            };
            bar.finish_and_clear();
            println!("✔ job {} finished\n", job_id);

            // 3. Summary
            println!("[3/3] result:");
            for outcome in &result.processed_photos {
                if outcome.success {
                    let place = match (&outcome.sheet, outcome.row, outcome.col) {
                        (Some(sheet), Some(row), Some(col)) => {
                            format!("{} R{}C{}", sheet, row + 1, col + 1)
                        }
                        _ => "placed".to_string(),
                    };
                    let mark = if outcome.overflow { "(overflow)" } else { "" };
                    println!("  ✔ {} → {} {}", outcome.file_name, place, mark);
                } else {
                    println!(
                        "  ✖ {} → {}",
                        outcome.file_name,
                        outcome.error.as_deref().unwrap_or("failed")
                    );
                }
            }
            println!(
                "  {}/{} photos placed",
                result.successful_placements, result.total_processed
            );

            if verbose {
                println!("\n{}", serde_json::to_string_pretty(&result)?);
            }

            if result.success {
                if let Some(path) = &result.download_path {
                    println!("\n✅ report saved: {}", path);
                }
            } else {
                bail!(
                    "job failed: {}",
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
        }

        Commands::Inspect { template: path } => {
            println!("🔍 foto-report - template inspection\n");

            let structure = template::analyze(&path, config.scan_row_limit)?;
            println!("template: {}", structure.source.display());
            println!("worksheets: {}\n", structure.worksheets.len());

            for sheet in &structure.worksheets {
                println!(
                    "• {} [{}] {}x{}",
                    sheet.name,
                    sheet.kind.as_str(),
                    sheet.rows,
                    sheet.cols
                );
                for placeholder in &sheet.placeholders {
                    println!(
                        "    slot R{}C{} [{}] {:?}",
                        placeholder.row + 1,
                        placeholder.col + 1,
                        placeholder.category.as_str(),
                        placeholder.label
                    );
                }
                if !sheet.merged.is_empty() {
                    println!("    merged ranges: {}", sheet.merged.len());
                }
                for image in &sheet.images {
                    println!(
                        "    existing image at R{}C{} ({}x{}px)",
                        image.row + 1,
                        image.col + 1,
                        image.width_px,
                        image.height_px
                    );
                }
            }
            println!("\ntotal placeholders: {}", structure.placeholder_count());
        }

        Commands::Config {
            set_output_dir,
            set_timeout,
            show,
        } => {
            let mut changed = false;

            if let Some(dir) = set_output_dir {
                config.output_dir = dir;
                changed = true;
            }
            if let Some(secs) = set_timeout {
                config.job_timeout_secs = secs;
                changed = true;
            }
            if changed {
                config.save()?;
                println!("✔ settings saved");
            }

            if show || !changed {
                println!("settings:");
                println!("  output dir: {}", config.output_dir.display());
                println!("  job timeout: {}s", config.job_timeout_secs);
                println!("  fetch concurrency: {}", config.fetch_concurrency);
                println!("  record TTL: {}s", config.record_ttl_secs);
                println!("  scan row limit: {}", config.scan_row_limit);
                println!("  report slug: {}", config.report_slug);
            }
        }
    }

    Ok(())
}

/// URLs become remote references, everything else is a local path.
fn parse_photo_arg(arg: &str) -> PhotoReference {
    if arg.starts_with("http://") || arg.starts_with("https://") {
        PhotoReference::remote(arg)
    } else {
        PhotoReference::local(arg)
    }
}

fn generate_job_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    format!("job-{}-{}", chrono::Local::now().format("%Y%m%d%H%M%S"), suffix)
}
