//! CLI interface for string table conversion

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cli::progress::{GEAR, LOOKING_GLASS, batch_bar, print_done, print_step};
use crate::converter::{ConvertOptions, ConvertPhase, batch_convert};
use crate::formats::rst::RstVersion;

pub fn execute(
    paths: &[PathBuf],
    hashes: Option<&Path>,
    output_dir: Option<&Path>,
    version: Option<RstVersion>,
    v5_variant: RstVersion,
    quiet: bool,
) -> anyhow::Result<()> {
    let start = Instant::now();

    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)?;
    }

    if !quiet {
        print_step(1, 2, LOOKING_GLASS, "Loading hash lists...");
    }
    let names = super::load_hash_names(hashes)?;
    if !quiet {
        println!("      {} names", names.len());
        print_step(2, 2, GEAR, &format!("Converting {} files...", paths.len()));
    }

    let options = ConvertOptions {
        v5_variant,
        version_override: version,
    };

    let pb = batch_bar(paths.len() as u64, "Converting", quiet);
    let result = batch_convert(paths, output_dir, &names, &options, |progress| {
        if progress.phase == ConvertPhase::Converting {
            pb.set_position(progress.current as u64);
        }
    });
    pb.finish_and_clear();

    if !quiet {
        for (source, dest) in &result.converted {
            println!("  {} -> {}", source.display(), dest.display());
        }
        for (source, error) in &result.failures {
            println!("  FAILED {}: {}", source.display(), error);
        }
        println!(
            "Converted {} files, {} failed",
            result.success_count, result.fail_count
        );
        print_done(start.elapsed());
    }

    if result.fail_count > 0 {
        anyhow::bail!(
            "{} of {} files failed to convert",
            result.fail_count,
            paths.len()
        );
    }

    Ok(())
}
