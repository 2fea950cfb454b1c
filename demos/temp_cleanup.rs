use std::error::Error;
use std::fs::{self, File};
use std::io::Write;

use scopekit::{defer, scope_exit, unique_resource_checked};
use tracing::{info, metadata::LevelFilter};

fn allocate_slot(succeed: bool) -> u32 {
    if succeed {
        7
    } else {
        0
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let dir = std::env::temp_dir().join("scopekit-demo");
    fs::create_dir_all(&dir)?;
    defer! {
        info!("removing {}", dir.display());
        let _ = fs::remove_dir_all(&dir);
    }

    // discard the half-written file on any exit path short of the commit
    let path = dir.join("scratch.txt");
    let mut file = File::create(&path)?;
    let discard_scratch = scope_exit(|| {
        info!("discarding {}", path.display());
        let _ = fs::remove_file(&path);
    });
    writeln!(file, "hello from scopekit")?;
    info!("wrote {}", path.display());
    discard_scratch.release();

    let slot = unique_resource_checked(allocate_slot(true), 0, |slot: &mut u32| {
        info!(slot = *slot, "releasing slot");
    });
    info!(slot = *slot.get(), "slot acquired");

    Ok(())
}
