use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::{fs, path::PathBuf};
use yaz0::{DecodedAsset, Decompressor, Profile, ProfileSet};

#[derive(Parser, Debug)]
struct Arguments {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the header and stream statistics of a Yaz0 file
    Info { input: PathBuf },

    /// Decompress a single Yaz0 file
    Decode {
        input: PathBuf,

        #[command(flatten)]
        args: DecodeArgs,
    },

    /// Decompress every file below a directory that matches an asset profile
    Extract {
        dir: PathBuf,

        #[command(flatten)]
        args: ExtractArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Arguments::parse();
    colog::init();

    match args.command {
        Commands::Info { input } => info(input)?,
        Commands::Decode { input, args } => decode(input, args)?,
        Commands::Extract { dir, args } => extract(dir, args)?,
    }

    Ok(())
}

fn info(input: PathBuf) -> anyhow::Result<()> {
    let src = fs::read(&input).with_context(|| format!("Failed to read {}", input.display()))?;
    let asset = DecodedAsset::from_compressed(input.clone(), &src, None)
        .with_context(|| format!("Failed to decode {}", input.display()))?;

    println!("file:          {}", input.display());
    println!("decoded size:  {:#x} ({} bytes)", asset.data.len(), asset.data.len());
    println!("stream size:   {:#x} ({} bytes)", asset.bytes_read, asset.bytes_read);
    println!("trailing data: {} bytes", asset.trailing_bytes(src.len()));
    println!("crc:           {:#010x}", asset.crc);

    Ok(())
}

#[derive(Args, Debug, Clone)]
struct DecodeArgs {
    /// Where to write the decompressed data, defaults to the input with a .bin extension
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Refuse files that declare a larger decompressed size than this
    #[arg(long)]
    max_len: Option<usize>,
}

fn decode(input: PathBuf, args: DecodeArgs) -> anyhow::Result<()> {
    let src = fs::read(&input).with_context(|| format!("Failed to read {}", input.display()))?;

    let mut decompressor = Decompressor::new(&src)
        .with_context(|| format!("Failed to decode {}", input.display()))?;
    if let Some(limit) = args.max_len {
        decompressor = decompressor
            .with_limit(limit)
            .with_context(|| format!("Refusing to decode {}", input.display()))?;
    }
    let result = decompressor
        .decompress()
        .with_context(|| format!("Failed to decode {}", input.display()))?;

    let out = args.out.unwrap_or_else(|| input.with_extension("bin"));
    fs::write(&out, &result.data).with_context(|| format!("Failed to write {}", out.display()))?;

    log::info!(
        "Decoded {} -> {} ({} bytes)",
        input.display(),
        out.display(),
        result.data.len()
    );

    Ok(())
}

#[derive(Args, Debug, Clone)]
struct ExtractArgs {
    /// The output directory to write decompressed files to
    #[arg(short, long, default_value = "extracted")]
    out_dir: PathBuf,

    /// Overwrite the output directory if it already exists
    #[arg(long)]
    force: bool,

    /// Which asset profile selects and validates the files
    #[arg(short, long, default_value = "avatar")]
    profile: String,

    /// Supply additional asset profiles
    #[arg(long)]
    profile_file: Option<PathBuf>,
}

fn extract(dir: PathBuf, args: ExtractArgs) -> anyhow::Result<()> {
    use indicatif::ProgressBar;
    use rayon::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    let additional = match &args.profile_file {
        Some(path) => ProfileSet::load(path).with_context(|| "Failed to load profile file")?,
        None => ProfileSet::default(),
    };
    let profile = Profile::find(&args.profile, &additional).with_context(|| {
        let known = ProfileSet::inbuilt()
            .iter()
            .chain(additional.profiles.iter())
            .map(|profile| profile.name.as_str())
            .collect::<Vec<_>>();
        format!(
            "Unknown asset profile '{}', known profiles: {}",
            args.profile,
            known.join(", ")
        )
    })?;

    log::info!("Scanning {} for '{}' assets...", dir.display(), profile.name);
    let files = yaz0::scan(&dir, &profile);
    if files.is_empty() {
        log::warn!("No matching files found");
        return Ok(());
    }

    if args.force && args.out_dir.exists() {
        fs::remove_dir_all(&args.out_dir)
            .with_context(|| "Failed to clean up old output directory")?;
    }
    fs::create_dir(&args.out_dir).with_context(|| "Failed to create output directory")?;

    let progress = ProgressBar::new(files.len() as u64);
    let failed = AtomicUsize::new(0);

    files.par_iter().for_each(|path| {
        progress.inc(1);

        let result = DecodedAsset::open(path, Some(profile.as_ref()))
            .map_err(anyhow::Error::from)
            .and_then(|asset| {
                let relative = asset.path.strip_prefix(&dir).unwrap_or(&asset.path);
                let out = args.out_dir.join(relative).with_extension("bin");

                if let Some(parent) = out.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&out, &asset.data)?;

                Ok((out, asset.crc))
            });

        match result {
            Ok((out, crc)) => {
                progress.println(format!("{} (crc {:#010x})", out.display(), crc));
            }
            Err(err) => {
                failed.fetch_add(1, Ordering::SeqCst);
                progress.suspend(|| log::warn!("Failed to extract {}: {:#}", path.display(), err));
            }
        }
    });

    progress.finish_and_clear();

    let failed = failed.load(Ordering::SeqCst);
    log::info!(
        "Done! Extracted {} of {} files",
        files.len() - failed,
        files.len()
    );

    Ok(())
}
