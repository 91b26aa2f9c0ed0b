use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kinetic::{
    ContainerKey, EntryState, HostEvent, MotionRuntime, PageSpec, RecordingSink, RuntimeConfig,
    SharedHost, SimulatedHost, store_keys,
};

#[derive(Parser, Debug)]
#[command(name = "kinetic", version)]
struct Cli {
    /// Runtime configuration JSON.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print behavior and composition metadata as JSON without loading lazy entries.
    List,
    /// Mount a synthetic page on a simulated host and print a frame report.
    Simulate(SimulateArgs),
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Composition id; the configured default when omitted.
    #[arg(long)]
    composition: Option<String>,

    /// Page URL, read for development overrides.
    #[arg(long)]
    url: Option<String>,

    /// Number of synthetic sections.
    #[arg(long, default_value_t = 5)]
    sections: usize,

    /// Frames to run after input is applied.
    #[arg(long, default_value_t = 120)]
    frames: usize,

    /// Wheel delta (px) to apply before the run. Repeatable.
    #[arg(long, allow_negative_numbers = true)]
    wheel: Vec<f64>,

    /// Key to press before the run (e.g. ArrowDown, End). Repeatable.
    #[arg(long)]
    key: Vec<String>,

    /// Section id to follow as an in-page link before the run.
    #[arg(long)]
    anchor: Option<String>,

    /// Native scroll offset (px) to report before the run.
    #[arg(long)]
    scroll: Option<f64>,

    /// Viewport height (px).
    #[arg(long, default_value_t = 800.0)]
    viewport_height: f64,
}

#[derive(serde::Serialize)]
struct Listed<M> {
    #[serde(flatten)]
    meta: M,
    state: Option<EntryState>,
}

#[derive(serde::Serialize)]
struct SimulationReport {
    composition: String,
    driver: Option<String>,
    frames: usize,
    position: Option<f64>,
    velocity: Option<f64>,
    mode: Option<String>,
    active_section: Option<usize>,
    style_writes: usize,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => RuntimeConfig::load(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => RuntimeConfig::default(),
    };
    match cli.cmd {
        Command::List => cmd_list(config),
        Command::Simulate(args) => cmd_simulate(config, args).await,
    }
}

fn cmd_list(config: RuntimeConfig) -> anyhow::Result<()> {
    let (_recording, sink) = RecordingSink::shared();
    let rt = MotionRuntime::new(config, None, sink)?;
    rt.ensure_initialized()?;

    let behaviors: Vec<_> = rt
        .behaviors()
        .list_meta()
        .into_iter()
        .map(|meta| Listed {
            state: rt.behaviors().state(&meta.id),
            meta,
        })
        .collect();
    let compositions: Vec<_> = rt
        .compositions()
        .list_meta()
        .into_iter()
        .map(|meta| Listed {
            state: rt.compositions().state(&meta.id),
            meta,
        })
        .collect();
    let out = serde_json::json!({
        "behaviors": behaviors,
        "compositions": compositions,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

async fn cmd_simulate(config: RuntimeConfig, args: SimulateArgs) -> anyhow::Result<()> {
    let host = SimulatedHost::new();
    let shared: SharedHost = host.clone();
    let (recording, sink) = RecordingSink::shared();
    let mut rt = MotionRuntime::new(config, Some(shared), sink)?;
    if let Some(url) = &args.url {
        rt = rt.with_url(url).context("read development overrides")?;
    }
    rt.ensure_initialized()?;

    let container = ContainerKey::Viewport;
    let mut page = PageSpec::with_sections((0..args.sections).map(|i| format!("section-{i}")));
    page.composition = args.composition.clone();
    let mounted = rt
        .mount_page(container.clone(), &page)
        .await
        .context("mount page")?;

    host.dispatch(
        &container,
        HostEvent::Resize {
            width: 1280.0,
            height: args.viewport_height,
        },
    );
    host.advance_frame();

    if let Some(offset) = args.scroll {
        let max_offset = (args.sections.saturating_sub(1)) as f64 * args.viewport_height;
        host.dispatch(&container, HostEvent::Scroll { offset, max_offset });
    }
    for delta_y in &args.wheel {
        host.dispatch(
            &container,
            HostEvent::Wheel {
                delta_x: 0.0,
                delta_y: *delta_y,
            },
        );
    }
    for key in &args.key {
        host.dispatch(&container, HostEvent::Key { key: key.clone() });
    }
    if let Some(fragment) = args.anchor {
        host.dispatch(&container, HostEvent::AnchorNavigate { fragment });
    }
    host.advance_frames(args.frames);

    let store = mounted.store();
    let report = SimulationReport {
        composition: mounted.composition().to_owned(),
        driver: store.text(store_keys::DRIVER_KIND),
        frames: args.frames + 1,
        position: store.number(store_keys::SCROLL_POSITION),
        velocity: store.number(store_keys::SCROLL_VELOCITY),
        mode: store.text(store_keys::MOMENTUM_MODE),
        active_section: store.index(store_keys::ACTIVE_SECTION),
        style_writes: recording.borrow().write_count(),
    };
    mounted.unmount();

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
