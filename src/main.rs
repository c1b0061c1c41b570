use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use eddy::app::AppContext;
use eddy::cli::{commands, Cli, Commands, ConfigAction};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "eddy=debug" } else { "eddy=info" })
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut ctx = AppContext::new(cli.config)?;

    match cli.command {
        Commands::Extract {
            urls,
            input,
            output_dir,
            headed,
            stall_threshold,
            max_cycles,
            no_delay,
            preset,
        } => {
            if let Some(preset) = preset {
                ctx.config.extraction = preset.apply(&ctx.config.extraction);
            }
            if headed {
                ctx.config.browser.headless = false;
            }
            if let Some(n) = stall_threshold {
                ctx.config.extraction.stall_threshold = n;
            }
            if let Some(n) = max_cycles {
                ctx.config.extraction.max_scroll_cycles = n;
            }
            if output_dir.is_some() {
                ctx.config.output.output_dir = output_dir;
            }

            let posts = commands::collect_posts(&urls, input.as_deref())?;
            commands::extract(&ctx, posts, !no_delay).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Path => commands::show_config_path(&ctx)?,
            ConfigAction::Show => commands::show_config(&ctx)?,
        },
    }

    Ok(())
}
