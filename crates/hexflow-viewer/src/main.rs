mod cli;

use anyhow::Result;
use clap::Parser;
use winit::dpi::LogicalSize;

use hexflow_engine::device::GpuInit;
use hexflow_engine::host::HostConfig;
use hexflow_engine::logging::{init_logging, LoggingConfig};
use hexflow_engine::window::{Runtime, RuntimeConfig};
use hexflow_pipes::{PipeScene, PipeSceneConfig};

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        env_filter: cli.log_filter.clone(),
        ..Default::default()
    });

    // Shader colors are authored for a display-space target.
    let mut gpu_init = GpuInit {
        prefer_srgb: false,
        ..Default::default()
    };
    if cli.no_vsync {
        gpu_init = gpu_init.without_vsync();
    }

    log::info!("starting {} ({}x{}, aspect {})", cli.title, cli.width, cli.height, cli.aspect);

    Runtime::run(
        RuntimeConfig {
            title: cli.title,
            initial_size: LogicalSize::new(cli.width, cli.height),
        },
        gpu_init,
        HostConfig::with_aspect(cli.aspect),
        PipeScene::new(PipeSceneConfig::default()),
    )
}
