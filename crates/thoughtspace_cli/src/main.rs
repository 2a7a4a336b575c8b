//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `thoughtspace_core` linkage without the Flutter runtime.
//! - Print the saved spaces of a store file for quick on-disk inspection.
//!
//! Usage: `thoughtspace_cli [STORE_PATH]`

use std::process::ExitCode;
use thoughtspace_core::model::timestamp;
use thoughtspace_core::{SpaceRepository, SqliteKvStore};

fn main() -> ExitCode {
    println!("thoughtspace_core ping={}", thoughtspace_core::ping());
    println!("thoughtspace_core version={}", thoughtspace_core::core_version());

    let Some(path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let store = match SqliteKvStore::open(&path) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("failed to open store `{path}`: {err}");
            return ExitCode::FAILURE;
        }
    };
    let repo = SpaceRepository::new(&store);

    match repo.get_current_space_id() {
        Ok(Some(space_id)) => println!("current_space={space_id}"),
        Ok(None) => println!("current_space=<none>"),
        Err(err) => eprintln!("failed to read current space: {err}"),
    }

    match repo.get_spaces_metadata() {
        Ok(entries) => {
            for entry in entries {
                println!(
                    "{}\t{}\t{}\tupdated={}",
                    entry.id,
                    entry.name,
                    entry.summary(),
                    timestamp::format(&entry.updated_at)
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to read spaces: {err}");
            ExitCode::FAILURE
        }
    }
}
