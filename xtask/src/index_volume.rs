//! Pre-index a volume directory on the host.
//!
//! Runs the same pagination the firmware runs, but with no page limit,
//! and writes the same record files the firmware would. Point it at a
//! directory, copy the directory to a card, and every book opens
//! instantly on the device.

use anyhow::{anyhow, bail, Result};
use book::catalog::is_text_name;
use book::paginate::{cold_scan, PaginateError};
use book::store;
use book::BookIndex;
use clap::Args;
use platform::config::PageGrid;
use platform::storage::{DirEntry, File, Storage};
use platform::storage_local::LocalFileStorage;
use std::path::PathBuf;

/// Arguments for `xtask index-volume`.
#[derive(Args)]
pub struct IndexVolumeArgs {
    /// Directory that will become the card's root.
    volume: PathBuf,
    /// Characters per line of the target panel.
    #[arg(long, default_value_t = 38)]
    chars_per_line: u16,
    /// Text lines per page of the target panel.
    #[arg(long, default_value_t = 25)]
    lines_per_page: u16,
}

pub async fn run(args: IndexVolumeArgs) -> Result<()> {
    let Some(root) = args.volume.to_str() else {
        bail!("volume path is not valid UTF-8");
    };
    if !args.volume.is_dir() {
        bail!("{root} is not a directory");
    }
    let grid = PageGrid {
        chars_per_line: args.chars_per_line,
        lines_per_page: args.lines_per_page,
    };
    let mut storage = LocalFileStorage::new(root);

    let mut names = Vec::new();
    storage
        .list_dir("/", &mut |e: &DirEntry| {
            if !e.is_dir && is_text_name(e.name.as_str()) {
                names.push(e.name.to_string());
            }
        })
        .await
        .map_err(|e| anyhow!("cannot list {root}: {e}"))?;
    names.sort();

    let mut indexed = 0usize;
    for name in &names {
        match index_one(&mut storage, name, &grid).await? {
            Some(pages) => {
                println!("{name}: {pages} pages");
                indexed = indexed.saturating_add(1);
            }
            None => eprintln!("{name}: too many pages for the device index, skipped"),
        }
    }
    println!("indexed {indexed} of {} text files", names.len());
    Ok(())
}

async fn index_one(
    storage: &mut LocalFileStorage,
    name: &str,
    grid: &PageGrid,
) -> Result<Option<usize>> {
    let path = store::book_path(name);
    let mut file = storage
        .open_file(path.as_str())
        .await
        .map_err(|e| anyhow!("cannot open {name}: {e}"))?;
    let size = file.size();

    let index: BookIndex = match cold_scan(&mut file, grid, u32::MAX).await {
        Ok(index) => index,
        Err(PaginateError::Index(_)) => return Ok(None),
        Err(PaginateError::Storage(e)) => bail!("cannot read {name}: {e}"),
    };
    drop(file);

    store::save(storage, name, &index, store::stored_size(size))
        .await
        .map_err(|e| anyhow!("cannot write index for {name}: {e}"))?;
    Ok(Some(index.page_count()))
}
