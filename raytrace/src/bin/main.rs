//! Raytrace - Standalone Player
//!
//! Runs a WGSL compute kernel into the window every frame.
//!
//! # Usage
//!
//! ```bash
//! raytrace
//! raytrace --kernel my_kernel.wgsl --entry shade
//! raytrace --fullscreen --no-vsync
//! raytrace -f --save-config
//! ```
//!
//! # Keyboard Shortcuts
//!
//! - ESC: Quit
//! - F11: Toggle fullscreen

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use raytrace::player::{PlayerConfig, run};
use raytrace_core::app::config;

#[derive(Parser)]
#[command(name = "raytrace")]
#[command(author, version, about = "Raytrace - compute kernel frame player")]
struct Args {
    /// WGSL kernel to run instead of the bundled ray tracer
    #[arg(long, value_name = "FILE")]
    kernel: Option<PathBuf>,

    /// Compute entry point to dispatch (default: the first one declared)
    #[arg(long, value_name = "NAME")]
    entry: Option<String>,

    /// Start in fullscreen mode (borderless window, scales to fit)
    #[arg(long, short = 'f')]
    fullscreen: bool,

    /// Present without waiting for vertical sync
    #[arg(long)]
    no_vsync: bool,

    /// Write the resulting settings to the config file
    #[arg(long)]
    save_config: bool,
}

impl Args {
    /// Apply command line overrides on top of the config file.
    fn apply(self, mut config: PlayerConfig) -> (PlayerConfig, bool) {
        if let Some(kernel) = self.kernel {
            config.kernel.path = Some(kernel);
        }
        if let Some(entry) = self.entry {
            config.kernel.entry_point = Some(entry);
        }
        if self.fullscreen {
            config.video.fullscreen = true;
        }
        if self.no_vsync {
            config.video.vsync = false;
        }
        (config, self.save_config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Validate kernel path exists
    if let Some(path) = &args.kernel {
        if !path.exists() {
            anyhow::bail!("Kernel file not found: {}", path.display());
        }
    }

    let (config, save_config) = args.apply(config::load());

    if save_config {
        let path = config::save(&config).context("Failed to save config")?;
        println!("Saved config to {}", path.display());
    }

    run(config)
}
